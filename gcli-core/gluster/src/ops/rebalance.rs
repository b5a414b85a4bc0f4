//! rebalance

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::TaskStatus;
use crate::parser::parse_rebalance_status;

fn rebalance(volume: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("rebalance").arg(volume)
}

pub fn rebalance_fix_layout_cmd(volume: &str) -> GlusterCommand {
    rebalance(volume).arg("fix-layout").arg("start")
}

pub fn rebalance_start_cmd(volume: &str, force: bool) -> GlusterCommand {
    rebalance(volume).arg("start").flag("force", force)
}

pub fn rebalance_stop_cmd(volume: &str) -> GlusterCommand {
    rebalance(volume).arg("stop")
}

pub fn rebalance_status_cmd(volume: &str) -> GlusterCommand {
    rebalance(volume).arg("status").xml()
}

impl GlusterClient {
    /// 只修复目录布局，不迁移数据
    pub async fn rebalance_fix_layout(&self, volume: &str) -> Result<()> {
        self.run(rebalance_fix_layout_cmd(volume)).await
    }

    pub async fn rebalance_start(&self, volume: &str, force: bool) -> Result<()> {
        self.run(rebalance_start_cmd(volume, force)).await
    }

    pub async fn rebalance_stop(&self, volume: &str) -> Result<()> {
        self.run(rebalance_stop_cmd(volume)).await
    }

    /// 查询各节点 rebalance 进度
    pub async fn rebalance_status(&self, volume: &str) -> Result<TaskStatus> {
        let output = self.execute(rebalance_status_cmd(volume)).await?;
        parse_rebalance_status(&output)
    }
}
