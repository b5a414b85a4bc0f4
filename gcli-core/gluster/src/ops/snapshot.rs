//! 快照：`gluster snapshot ...`

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::{SnapshotInfo, SnapshotStatus};
use crate::parser::{parse_snapshot_info, parse_snapshot_list, parse_snapshot_status};

/// info / status / delete 的查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope<'a> {
    All,
    Snapshot(&'a str),
    Volume(&'a str),
}

impl SnapshotScope<'_> {
    fn apply(self, cmd: GlusterCommand) -> GlusterCommand {
        match self {
            Self::All => cmd,
            Self::Snapshot(name) => cmd.arg(name),
            Self::Volume(volume) => cmd.arg("volume").arg(volume),
        }
    }
}

/// `snapshot config <vol>` 的可选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub snap_max_hard_limit: Option<u32>,
    pub snap_max_soft_limit: Option<u32>,
    pub auto_delete: Option<bool>,
    pub activate_on_create: Option<bool>,
}

fn enable_disable(value: bool) -> &'static str {
    if value {
        "enable"
    } else {
        "disable"
    }
}

pub fn snapshot_activate_cmd(snapshot: &str, force: bool) -> GlusterCommand {
    GlusterCommand::snapshot().arg("activate").arg(snapshot).flag("force", force)
}

pub fn snapshot_clone_cmd(clone: &str, snapshot: &str) -> GlusterCommand {
    GlusterCommand::snapshot().arg("clone").arg(clone).arg(snapshot)
}

/// `snapshot create <snap> <vol> [no-timestamp] [description d] [force]`
pub fn snapshot_create_cmd(
    volume: &str,
    snapshot: &str,
    no_timestamp: bool,
    description: Option<&str>,
    force: bool,
) -> GlusterCommand {
    GlusterCommand::snapshot()
        .arg("create")
        .arg(snapshot)
        .arg(volume)
        .flag("no-timestamp", no_timestamp)
        .opt("description", description.filter(|d| !d.is_empty()))
        .flag("force", force)
}

pub fn snapshot_deactivate_cmd(snapshot: &str) -> GlusterCommand {
    GlusterCommand::snapshot().arg("deactivate").arg(snapshot)
}

pub fn snapshot_delete_cmd(scope: SnapshotScope<'_>) -> GlusterCommand {
    scope.apply(GlusterCommand::snapshot().arg("delete"))
}

pub fn snapshot_info_cmd(scope: SnapshotScope<'_>) -> GlusterCommand {
    scope.apply(GlusterCommand::snapshot().arg("info")).xml()
}

pub fn snapshot_status_cmd(scope: SnapshotScope<'_>) -> GlusterCommand {
    scope.apply(GlusterCommand::snapshot().arg("status")).xml()
}

pub fn snapshot_list_cmd(volume: Option<&str>) -> GlusterCommand {
    GlusterCommand::snapshot().arg("list").arg_opt(volume).xml()
}

pub fn snapshot_restore_cmd(snapshot: &str) -> GlusterCommand {
    GlusterCommand::snapshot().arg("restore").arg(snapshot)
}

pub fn snapshot_config_cmd(volume: &str, config: &SnapshotConfig) -> GlusterCommand {
    GlusterCommand::snapshot()
        .arg("config")
        .arg(volume)
        .opt("snap-max-hard-limit", config.snap_max_hard_limit)
        .opt("snap-max-soft-limit", config.snap_max_soft_limit)
        .opt("auto-delete", config.auto_delete.map(enable_disable))
        .opt("activate-on-create", config.activate_on_create.map(enable_disable))
}

impl GlusterClient {
    pub async fn snapshot_activate(&self, snapshot: &str, force: bool) -> Result<()> {
        self.run(snapshot_activate_cmd(snapshot, force)).await
    }

    /// 从快照克隆出新卷
    pub async fn snapshot_clone(&self, clone: &str, snapshot: &str) -> Result<()> {
        self.run(snapshot_clone_cmd(clone, snapshot)).await
    }

    /// 创建快照
    ///
    /// 不指定 `no_timestamp` 时 gluster 会在快照名后追加时间戳。
    pub async fn snapshot_create(
        &self,
        volume: &str,
        snapshot: &str,
        no_timestamp: bool,
        description: Option<&str>,
        force: bool,
    ) -> Result<()> {
        self.run(snapshot_create_cmd(volume, snapshot, no_timestamp, description, force))
            .await
    }

    pub async fn snapshot_deactivate(&self, snapshot: &str) -> Result<()> {
        self.run(snapshot_deactivate_cmd(snapshot)).await
    }

    pub async fn snapshot_delete(&self, scope: SnapshotScope<'_>) -> Result<()> {
        self.run(snapshot_delete_cmd(scope)).await
    }

    pub async fn snapshot_info(&self, scope: SnapshotScope<'_>) -> Result<Vec<SnapshotInfo>> {
        let output = self.execute(snapshot_info_cmd(scope)).await?;
        parse_snapshot_info(&output)
    }

    pub async fn snapshot_status(&self, scope: SnapshotScope<'_>) -> Result<Vec<SnapshotStatus>> {
        let output = self.execute(snapshot_status_cmd(scope)).await?;
        parse_snapshot_status(&output)
    }

    /// 列出快照名
    pub async fn snapshot_list(&self, volume: Option<&str>) -> Result<Vec<String>> {
        let output = self.execute(snapshot_list_cmd(volume)).await?;
        parse_snapshot_list(&output)
    }

    pub async fn snapshot_restore(&self, snapshot: &str) -> Result<()> {
        self.run(snapshot_restore_cmd(snapshot)).await
    }

    pub async fn snapshot_config(&self, volume: &str, config: &SnapshotConfig) -> Result<()> {
        self.run(snapshot_config_cmd(volume, config)).await
    }
}
