//! 分层（旧版本功能）：`gluster volume tier ...`
//!
//! 各版本的 tier 状态输出结构不一致，状态类查询原样返回文本。

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;

/// detach 阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierDetachAction {
    Start,
    Stop,
    Commit,
    Status,
}

impl TierDetachAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Commit => "commit",
            Self::Status => "status",
        }
    }
}

fn tier(volume: &str) -> GlusterCommand {
    GlusterCommand::tier().arg(volume)
}

pub fn tier_status_cmd(volume: &str) -> GlusterCommand {
    tier(volume).arg("status")
}

pub fn tier_start_cmd(volume: &str, force: bool) -> GlusterCommand {
    tier(volume).arg("start").flag("force", force)
}

/// `tier <vol> attach [replica n] <bricks...> [force]`
pub fn tier_attach_cmd(
    volume: &str,
    bricks: &[String],
    replica: Option<u32>,
    force: bool,
) -> GlusterCommand {
    tier(volume)
        .arg("attach")
        .opt("replica", replica)
        .args(bricks)
        .flag("force", force)
}

pub fn tier_detach_cmd(volume: &str, action: TierDetachAction, force: bool) -> GlusterCommand {
    tier(volume)
        .arg("detach")
        .arg(action.as_str())
        .flag("force", force)
}

impl GlusterClient {
    pub async fn tier_status(&self, volume: &str) -> Result<String> {
        self.execute(tier_status_cmd(volume)).await
    }

    pub async fn tier_start(&self, volume: &str, force: bool) -> Result<()> {
        self.run(tier_start_cmd(volume, force)).await
    }

    /// 挂载热层
    pub async fn tier_attach(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
        force: bool,
    ) -> Result<()> {
        self.run(tier_attach_cmd(volume, bricks, replica, force))
            .await
    }

    /// 卸载热层的某个阶段，返回命令输出
    pub async fn tier_detach(
        &self,
        volume: &str,
        action: TierDetachAction,
        force: bool,
    ) -> Result<String> {
        self.execute(tier_detach_cmd(volume, action, force)).await
    }
}
