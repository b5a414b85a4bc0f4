//! 卷管理：`gluster volume ...`

use tracing::{debug, info};

use super::nonzero;
use crate::aggregate::{group_subvolumes, reconcile_volume_status};
use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::{
    GroupedVolumeStatus, VolumeInfo, VolumeOption, VolumeProfile, VolumeState, VolumeStatus,
};
use crate::params::{LockKind, ProfileInfoOp, TransportType};
use crate::parser::{
    parse_volume_info, parse_volume_list, parse_volume_options, parse_volume_profile_info,
    parse_volume_status,
};

/// 创建卷的可选参数，数值为 0 表示不指定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeCreateOptions {
    pub replica: u32,
    pub stripe: u32,
    pub arbiter: u32,
    pub disperse: u32,
    pub disperse_data: u32,
    pub redundancy: u32,
    pub transport: TransportType,
    pub force: bool,
}

/// clear-locks 的锁范围
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockRange {
    pub inode: Option<String>,
    pub entry: Option<String>,
    pub posix: Option<String>,
}

pub fn volume_start_cmd(volume: &str, force: bool) -> GlusterCommand {
    GlusterCommand::volume().arg("start").arg(volume).flag("force", force)
}

pub fn volume_stop_cmd(volume: &str, force: bool) -> GlusterCommand {
    GlusterCommand::volume().arg("stop").arg(volume).flag("force", force)
}

pub fn volume_delete_cmd(volume: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("delete").arg(volume)
}

/// `volume create <name> [replica n] [stripe n] [arbiter n] [disperse n]
/// [disperse-data n] [redundancy n] [transport t] <bricks...> [force]`
pub fn volume_create_cmd(
    volume: &str,
    bricks: &[String],
    options: &VolumeCreateOptions,
) -> GlusterCommand {
    let transport = (options.transport != TransportType::Tcp).then_some(options.transport);
    GlusterCommand::volume()
        .arg("create")
        .arg(volume)
        .opt("replica", nonzero(options.replica))
        .opt("stripe", nonzero(options.stripe))
        .opt("arbiter", nonzero(options.arbiter))
        .opt("disperse", nonzero(options.disperse))
        .opt("disperse-data", nonzero(options.disperse_data))
        .opt("redundancy", nonzero(options.redundancy))
        .opt("transport", transport)
        .args(bricks)
        .flag("force", options.force)
}

pub fn volume_info_cmd(volume: Option<&str>) -> GlusterCommand {
    GlusterCommand::volume().arg("info").arg_opt(volume).xml()
}

/// `volume status <vol|all> detail`
pub fn volume_status_detail_cmd(volume: Option<&str>) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("status")
        .arg(volume.unwrap_or("all"))
        .arg("detail")
        .xml()
}

pub fn volume_list_cmd() -> GlusterCommand {
    GlusterCommand::volume().arg("list").xml()
}

/// `volume set <vol> <key> <value> [<key> <value> ...]`
pub fn volume_set_cmd(volume: &str, options: &[(String, String)]) -> GlusterCommand {
    options
        .iter()
        .fold(GlusterCommand::volume().arg("set").arg(volume), |cmd, (k, v)| {
            cmd.arg(k).arg(v)
        })
}

/// `volume get <vol> <opt|all>`
pub fn volume_get_cmd(volume: &str, option: Option<&str>) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("get")
        .arg(volume)
        .arg(option.unwrap_or("all"))
        .xml()
}

pub fn volume_reset_cmd(volume: &str, option: Option<&str>, force: bool) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("reset")
        .arg(volume)
        .arg_opt(option)
        .flag("force", force)
}

pub fn volume_log_rotate_cmd(volume: &str, brick: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("log").arg(volume).arg("rotate").arg(brick)
}

pub fn volume_sync_cmd(hostname: &str, volume: Option<&str>) -> GlusterCommand {
    GlusterCommand::volume().arg("sync").arg(hostname).arg_opt(volume)
}

/// `volume clear-locks <vol> <path> kind <kind> [inode r] [entry b] [posix r]`
pub fn volume_clear_locks_cmd(
    volume: &str,
    path: &str,
    kind: LockKind,
    range: &LockRange,
) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("clear-locks")
        .arg(volume)
        .arg(path)
        .arg("kind")
        .arg(kind)
        .opt("inode", range.inode.as_deref())
        .opt("entry", range.entry.as_deref())
        .opt("posix", range.posix.as_deref())
}

pub fn volume_barrier_cmd(volume: &str, enable: bool) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("barrier")
        .arg(volume)
        .arg(if enable { "enable" } else { "disable" })
}

pub fn volume_profile_start_cmd(volume: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("profile").arg(volume).arg("start")
}

pub fn volume_profile_stop_cmd(volume: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("profile").arg(volume).arg("stop")
}

/// `volume profile <vol> info <op> [peek]`，`peek` 只对 incremental 生效
pub fn volume_profile_info_cmd(volume: &str, op: ProfileInfoOp, peek: bool) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("profile")
        .arg(volume)
        .arg("info")
        .arg(op)
        .flag("peek", op == ProfileInfoOp::Incremental && peek)
        .xml()
}

impl GlusterClient {
    /// 启动卷
    pub async fn volume_start(&self, volume: &str, force: bool) -> Result<()> {
        self.run(volume_start_cmd(volume, force)).await
    }

    /// 停止卷
    pub async fn volume_stop(&self, volume: &str, force: bool) -> Result<()> {
        self.run(volume_stop_cmd(volume, force)).await
    }

    /// 重启卷：先停止再启动
    pub async fn volume_restart(&self, volume: &str, force: bool) -> Result<()> {
        self.volume_stop(volume, force).await?;
        self.volume_start(volume, force).await
    }

    /// 删除卷
    pub async fn volume_delete(&self, volume: &str) -> Result<()> {
        self.run(volume_delete_cmd(volume)).await
    }

    /// 创建卷
    ///
    /// # Arguments
    /// * `volume` - 卷名
    /// * `bricks` - `host:path` 列表，顺序决定子卷划分
    /// * `options` - 副本/分散等参数
    pub async fn volume_create(
        &self,
        volume: &str,
        bricks: &[String],
        options: &VolumeCreateOptions,
    ) -> Result<()> {
        info!("创建卷 {}，{} 个 brick", volume, bricks.len());
        self.run(volume_create_cmd(volume, bricks, options)).await
    }

    /// 查询卷信息，`volume` 为 None 时返回全部卷
    pub async fn volume_info(&self, volume: Option<&str>) -> Result<Vec<VolumeInfo>> {
        let output = self.execute(volume_info_cmd(volume)).await?;
        parse_volume_info(&output)
    }

    /// 查询卷拓扑并合并运行时状态
    ///
    /// 未启动的卷不会出现在 status 输出中，其 brick 全部按离线处理。
    pub async fn volume_status_detail(&self, volume: Option<&str>) -> Result<Vec<VolumeStatus>> {
        let volumes = self.volume_info(volume).await?;

        let any_started = volumes.iter().any(|v| v.status == VolumeState::Started);
        let live = if any_started {
            let output = self.execute(volume_status_detail_cmd(volume)).await?;
            parse_volume_status(&output)?
        } else {
            debug!("没有已启动的卷，跳过 status 查询");
            Vec::new()
        };

        Ok(reconcile_volume_status(volumes, &live))
    }

    /// 查询卷状态并按子卷分组，计算健康状态和容量
    pub async fn volume_status_grouped(
        &self,
        volume: Option<&str>,
    ) -> Result<Vec<GroupedVolumeStatus>> {
        self.volume_status_detail(volume)
            .await?
            .into_iter()
            .map(group_subvolumes)
            .collect()
    }

    /// 列出卷名
    pub async fn volume_list(&self) -> Result<Vec<String>> {
        let output = self.execute(volume_list_cmd()).await?;
        parse_volume_list(&output)
    }

    /// 设置卷选项
    pub async fn volume_set(&self, volume: &str, options: &[(String, String)]) -> Result<()> {
        self.run(volume_set_cmd(volume, options)).await
    }

    /// 读取卷选项，`option` 为 None 时返回全部
    pub async fn volume_get(&self, volume: &str, option: Option<&str>) -> Result<Vec<VolumeOption>> {
        let output = self.execute(volume_get_cmd(volume, option)).await?;
        parse_volume_options(&output)
    }

    /// 重置卷选项
    pub async fn volume_reset(&self, volume: &str, option: Option<&str>, force: bool) -> Result<()> {
        self.run(volume_reset_cmd(volume, option, force)).await
    }

    /// 轮转 brick 日志
    pub async fn volume_log_rotate(&self, volume: &str, brick: &str) -> Result<()> {
        self.run(volume_log_rotate_cmd(volume, brick)).await
    }

    /// 从指定节点同步卷配置
    pub async fn volume_sync(&self, hostname: &str, volume: Option<&str>) -> Result<()> {
        self.run(volume_sync_cmd(hostname, volume)).await
    }

    /// 清除路径上的锁，`kind` 取值 blocked / granted / all
    pub async fn volume_clear_locks(
        &self,
        volume: &str,
        path: &str,
        kind: &str,
        range: &LockRange,
    ) -> Result<String> {
        let kind: LockKind = kind.parse()?;
        self.execute(volume_clear_locks_cmd(volume, path, kind, range))
            .await
    }

    /// 开启或关闭 barrier
    pub async fn volume_barrier(&self, volume: &str, enable: bool) -> Result<()> {
        self.run(volume_barrier_cmd(volume, enable)).await
    }

    pub async fn volume_profile_start(&self, volume: &str) -> Result<()> {
        self.run(volume_profile_start_cmd(volume)).await
    }

    pub async fn volume_profile_stop(&self, volume: &str) -> Result<()> {
        self.run(volume_profile_stop_cmd(volume)).await
    }

    /// 查询 profile 统计，`op` 取值 peek / incremental / cumulative / clear
    pub async fn volume_profile_info(
        &self,
        volume: &str,
        op: &str,
        peek: bool,
    ) -> Result<VolumeProfile> {
        let op: ProfileInfoOp = op.parse()?;
        let output = self
            .execute(volume_profile_info_cmd(volume, op, peek))
            .await?;
        parse_volume_profile_info(&output, op == ProfileInfoOp::Clear)
    }
}
