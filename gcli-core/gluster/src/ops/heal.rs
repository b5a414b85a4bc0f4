//! 自修复：`gluster volume heal ...`

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::HealBrickInfo;
use crate::params::HealInfoType;
use crate::parser::parse_heal_info;

/// 脑裂解决策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitBrainPolicy {
    /// 以较大的文件为准
    BiggerFile(String),
    /// 以修改时间最新的文件为准
    LatestMtime(String),
    /// 以指定 brick 为源，`file` 为 None 时处理该 brick 上的全部脑裂文件
    SourceBrick { brick: String, file: Option<String> },
}

fn heal(volume: &str) -> GlusterCommand {
    GlusterCommand::heal().arg(volume)
}

pub fn heal_enable_cmd(volume: &str) -> GlusterCommand {
    heal(volume).arg("enable")
}

pub fn heal_disable_cmd(volume: &str) -> GlusterCommand {
    heal(volume).arg("disable")
}

pub fn heal_full_cmd(volume: &str) -> GlusterCommand {
    heal(volume).arg("full")
}

pub fn heal_statistics_cmd(volume: &str) -> GlusterCommand {
    heal(volume).arg("statistics")
}

pub fn heal_info_cmd(volume: &str, info_type: Option<HealInfoType>) -> GlusterCommand {
    heal(volume).arg("info").arg_opt(info_type).xml()
}

pub fn heal_split_brain_cmd(volume: &str, policy: &SplitBrainPolicy) -> GlusterCommand {
    let cmd = heal(volume).arg("split-brain");
    match policy {
        SplitBrainPolicy::BiggerFile(file) => cmd.arg("bigger-file").arg(file),
        SplitBrainPolicy::LatestMtime(file) => cmd.arg("latest-mtime").arg(file),
        SplitBrainPolicy::SourceBrick { brick, file } => {
            cmd.arg("source-brick").arg(brick).arg_opt(file.as_deref())
        }
    }
}

impl GlusterClient {
    pub async fn heal_enable(&self, volume: &str) -> Result<()> {
        self.run(heal_enable_cmd(volume)).await
    }

    pub async fn heal_disable(&self, volume: &str) -> Result<()> {
        self.run(heal_disable_cmd(volume)).await
    }

    /// 触发全量修复
    pub async fn heal_full(&self, volume: &str) -> Result<()> {
        self.run(heal_full_cmd(volume)).await
    }

    /// 修复统计，原样返回文本
    pub async fn heal_statistics(&self, volume: &str) -> Result<String> {
        self.execute(heal_statistics_cmd(volume)).await
    }

    /// 待修复条目，`info_type` 取值 healed / heal-failed / split-brain
    pub async fn heal_info(
        &self,
        volume: &str,
        info_type: Option<&str>,
    ) -> Result<Vec<HealBrickInfo>> {
        let info_type = info_type.map(str::parse::<HealInfoType>).transpose()?;
        let output = self.execute(heal_info_cmd(volume, info_type)).await?;
        parse_heal_info(&output)
    }

    /// 按策略解决脑裂
    pub async fn heal_split_brain(&self, volume: &str, policy: &SplitBrainPolicy) -> Result<String> {
        self.execute(heal_split_brain_cmd(volume, policy)).await
    }
}
