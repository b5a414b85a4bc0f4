//! 异地复制：`gluster volume geo-replication ...`
//!
//! 从端标识 `user@host::volume` 与其后的动词始终是两个独立参数。

use std::collections::BTreeMap;
use std::fmt;

use tracing::info;

use crate::aggregate::reconcile_georep_status;
use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::GeorepSession;
use crate::parser::{parse_georep_config, parse_georep_status};

const DEFAULT_SSH_PORT: u16 = 22;

/// 从端（secondary）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeorepSlave {
    pub user: String,
    pub host: String,
    pub volume: String,
}

impl GeorepSlave {
    /// 用户默认为 root
    pub fn new(host: impl Into<String>, volume: impl Into<String>) -> Self {
        Self {
            user: "root".to_string(),
            host: host.into(),
            volume: volume.into(),
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

impl fmt::Display for GeorepSlave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}::{}", self.user, self.host, self.volume)
    }
}

/// 创建会话的可选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeorepCreateOptions {
    pub ssh_port: u16,
    pub push_pem: bool,
    pub no_verify: bool,
    pub force: bool,
}

impl Default for GeorepCreateOptions {
    fn default() -> Self {
        Self {
            ssh_port: DEFAULT_SSH_PORT,
            push_pem: true,
            no_verify: false,
            force: false,
        }
    }
}

fn session(volume: &str, slave: &GeorepSlave) -> GlusterCommand {
    GlusterCommand::georep().arg(volume).arg(slave)
}

/// `system:: execute gsec_create [container]`
pub fn gsec_create_cmd(ssh_key_prefix: bool) -> GlusterCommand {
    GlusterCommand::system()
        .arg("gsec_create")
        .flag("container", ssh_key_prefix)
}

pub fn georep_create_cmd(
    volume: &str,
    slave: &GeorepSlave,
    options: &GeorepCreateOptions,
) -> GlusterCommand {
    let port = (options.ssh_port != DEFAULT_SSH_PORT).then_some(options.ssh_port);
    session(volume, slave)
        .arg("create")
        .opt("ssh-port", port)
        .flag("push-pem", options.push_pem)
        .flag("no-verify", options.no_verify)
        .flag("force", options.force)
}

pub fn georep_start_cmd(volume: &str, slave: &GeorepSlave, force: bool) -> GlusterCommand {
    session(volume, slave).arg("start").flag("force", force)
}

pub fn georep_stop_cmd(volume: &str, slave: &GeorepSlave, force: bool) -> GlusterCommand {
    session(volume, slave).arg("stop").flag("force", force)
}

pub fn georep_delete_cmd(volume: &str, slave: &GeorepSlave, reset_sync_time: bool) -> GlusterCommand {
    session(volume, slave)
        .arg("delete")
        .flag("reset-sync-time", reset_sync_time)
}

pub fn georep_pause_cmd(volume: &str, slave: &GeorepSlave, force: bool) -> GlusterCommand {
    session(volume, slave).arg("pause").flag("force", force)
}

pub fn georep_resume_cmd(volume: &str, slave: &GeorepSlave, force: bool) -> GlusterCommand {
    session(volume, slave).arg("resume").flag("force", force)
}

pub fn georep_config_set_cmd(
    volume: &str,
    slave: &GeorepSlave,
    key: &str,
    value: &str,
) -> GlusterCommand {
    session(volume, slave).arg("config").arg(key).arg(value)
}

/// 重置配置项：`config !<key>`
pub fn georep_config_reset_cmd(volume: &str, slave: &GeorepSlave, key: &str) -> GlusterCommand {
    session(volume, slave).arg("config").arg(format!("!{}", key))
}

pub fn georep_config_get_cmd(volume: &str, slave: &GeorepSlave, key: Option<&str>) -> GlusterCommand {
    session(volume, slave).arg("config").arg_opt(key).xml()
}

/// `[<vol> [<slave>]] status`，未指定主卷时忽略从端
pub fn georep_status_cmd(volume: Option<&str>, slave: Option<&GeorepSlave>) -> GlusterCommand {
    let cmd = GlusterCommand::georep();
    let cmd = match volume {
        Some(volume) => cmd.arg(volume).arg_opt(slave),
        None => cmd,
    };
    cmd.arg("status").xml()
}

impl GlusterClient {
    /// 生成并分发 geo-replication 公钥
    pub async fn georep_gsec_create(&self, ssh_key_prefix: bool) -> Result<()> {
        self.run(gsec_create_cmd(ssh_key_prefix)).await
    }

    /// 创建会话
    pub async fn georep_create(
        &self,
        volume: &str,
        slave: &GeorepSlave,
        options: &GeorepCreateOptions,
    ) -> Result<()> {
        info!("创建 geo-replication 会话 {} -> {}", volume, slave);
        self.run(georep_create_cmd(volume, slave, options)).await
    }

    pub async fn georep_start(&self, volume: &str, slave: &GeorepSlave, force: bool) -> Result<()> {
        self.run(georep_start_cmd(volume, slave, force)).await
    }

    pub async fn georep_stop(&self, volume: &str, slave: &GeorepSlave, force: bool) -> Result<()> {
        self.run(georep_stop_cmd(volume, slave, force)).await
    }

    /// 先停止再启动
    pub async fn georep_restart(&self, volume: &str, slave: &GeorepSlave, force: bool) -> Result<()> {
        self.georep_stop(volume, slave, force).await?;
        self.georep_start(volume, slave, force).await
    }

    pub async fn georep_delete(
        &self,
        volume: &str,
        slave: &GeorepSlave,
        reset_sync_time: bool,
    ) -> Result<()> {
        self.run(georep_delete_cmd(volume, slave, reset_sync_time))
            .await
    }

    pub async fn georep_pause(&self, volume: &str, slave: &GeorepSlave, force: bool) -> Result<()> {
        self.run(georep_pause_cmd(volume, slave, force)).await
    }

    pub async fn georep_resume(&self, volume: &str, slave: &GeorepSlave, force: bool) -> Result<()> {
        self.run(georep_resume_cmd(volume, slave, force)).await
    }

    pub async fn georep_config_set(
        &self,
        volume: &str,
        slave: &GeorepSlave,
        key: &str,
        value: &str,
    ) -> Result<()> {
        self.run(georep_config_set_cmd(volume, slave, key, value))
            .await
    }

    pub async fn georep_config_reset(&self, volume: &str, slave: &GeorepSlave, key: &str) -> Result<()> {
        self.run(georep_config_reset_cmd(volume, slave, key)).await
    }

    /// 读取会话配置，`key` 为 None 时返回全部
    pub async fn georep_config_get(
        &self,
        volume: &str,
        slave: &GeorepSlave,
        key: Option<&str>,
    ) -> Result<BTreeMap<String, String>> {
        let output = self
            .execute(georep_config_get_cmd(volume, slave, key))
            .await?;
        parse_georep_config(&output)
    }

    /// 查询会话状态，并用主卷拓扑补齐未上报的 brick
    ///
    /// 同时指定主卷和从端时，即使会话没有任何实时记录也会返回该会话，
    /// 其所有 pair 为 `Offline`。
    pub async fn georep_status(
        &self,
        volume: Option<&str>,
        slave: Option<&GeorepSlave>,
    ) -> Result<Vec<GeorepSession>> {
        let output = self.execute(georep_status_cmd(volume, slave)).await?;
        let live = parse_georep_status(&output)?;
        let volumes = self.volume_info(volume).await?;

        let requested_slave = slave.map(|s| s.to_string());
        let requested = volume.zip(requested_slave.as_deref());
        reconcile_georep_status(live, &volumes, requested)
    }
}
