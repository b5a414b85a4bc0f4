//! CLI 配置管理
//!
//! 配置文件位于 `~/.config/gcli/config.toml`，命令行参数优先于配置文件。

use anyhow::{Context, Result};
use gcli_gluster::{GlusterConfig, RemoteTarget};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// gluster 可执行文件路径
    pub gluster_path: Option<String>,

    /// glusterd socket 路径
    pub glusterd_socket: Option<String>,

    /// 默认远程节点
    pub remote: Option<RemoteConfig>,

    /// 命令超时（秒）
    pub timeout: Option<u64>,
}

/// 远程节点配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// 主机地址
    pub host: String,

    /// SSH 私钥路径，支持 `~`
    pub ssh_key: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

/// 命令行上的覆盖项
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gluster_path: Option<String>,
    pub glusterd_socket: Option<String>,
    pub remote_host: Option<String>,
    pub ssh_key: Option<String>,
    pub ssh_user: Option<String>,
    pub timeout: Option<u64>,
}

impl CliConfig {
    /// 获取配置文件路径
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("无法获取用户主目录")?;
        Ok(home.join(".config").join("gcli").join("config.toml"))
    }

    /// 加载配置，文件不存在时使用默认值
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("解析配置文件失败: {:?}", path))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建配置目录失败: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("序列化配置失败")?;

        fs::write(&path, content).with_context(|| format!("写入配置文件失败: {:?}", path))?;

        Ok(())
    }

    /// 合并命令行参数，生成客户端配置
    pub fn resolve(&self, overrides: &Overrides) -> Result<GlusterConfig> {
        let mut config = GlusterConfig::default();

        if let Some(path) = overrides.gluster_path.as_ref().or(self.gluster_path.as_ref()) {
            config = config.gluster_path(path.clone());
        }
        if let Some(socket) = overrides
            .glusterd_socket
            .as_ref()
            .or(self.glusterd_socket.as_ref())
        {
            config = config.glusterd_socket(socket.clone());
        }
        if let Some(secs) = overrides.timeout.or(self.timeout) {
            config = config.command_timeout(Duration::from_secs(secs));
        }

        let remote = match (&overrides.remote_host, &self.remote) {
            (Some(host), file) => {
                let key = overrides
                    .ssh_key
                    .clone()
                    .or_else(|| file.as_ref().map(|r| r.ssh_key.clone()))
                    .context("指定 --remote-host 时必须提供 --ssh-key")?;
                let user = overrides
                    .ssh_user
                    .clone()
                    .or_else(|| file.as_ref().map(|r| r.user.clone()))
                    .unwrap_or_else(default_user);
                let port = file.as_ref().map(|r| r.port).unwrap_or_else(default_port);
                Some((host.clone(), key, user, port))
            }
            (None, Some(file)) => Some((
                file.host.clone(),
                overrides.ssh_key.clone().unwrap_or_else(|| file.ssh_key.clone()),
                overrides.ssh_user.clone().unwrap_or_else(|| file.user.clone()),
                file.port,
            )),
            (None, None) => None,
        };

        if let Some((host, key, user, port)) = remote {
            let key = shellexpand::tilde(&key).into_owned();
            config = config.remote(RemoteTarget::new(host, key).user(user).port(port));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_local() {
        let config = CliConfig::default().resolve(&Overrides::default()).unwrap();
        assert_eq!(config, GlusterConfig::default());
    }

    #[test]
    fn test_parse_file() {
        let config = CliConfig::parse(
            r#"
gluster_path = "/usr/sbin/gluster"
timeout = 30

[remote]
host = "node1"
ssh_key = "/root/.ssh/id_rsa"
"#,
        )
        .unwrap();
        assert_eq!(config.gluster_path.as_deref(), Some("/usr/sbin/gluster"));
        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.user, "root");
        assert_eq!(remote.port, 22);

        let resolved = config.resolve(&Overrides::default()).unwrap();
        assert_eq!(resolved.gluster_path, "/usr/sbin/gluster");
        assert_eq!(resolved.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(resolved.remote.unwrap().host, "node1");
    }

    #[test]
    fn test_flags_override_file() {
        let config = CliConfig {
            remote: Some(RemoteConfig {
                host: "node1".to_string(),
                ssh_key: "/keys/a".to_string(),
                user: "admin".to_string(),
                port: 2222,
            }),
            ..Default::default()
        };
        let overrides = Overrides {
            remote_host: Some("node2".to_string()),
            ..Default::default()
        };
        let remote = config.resolve(&overrides).unwrap().remote.unwrap();
        assert_eq!(remote.host, "node2");
        assert_eq!(remote.user, "admin");
        assert_eq!(remote.port, 2222);
        assert_eq!(remote.key_path, PathBuf::from("/keys/a"));
    }

    #[test]
    fn test_remote_host_requires_key() {
        let overrides = Overrides {
            remote_host: Some("node2".to_string()),
            ..Default::default()
        };
        assert!(CliConfig::default().resolve(&overrides).is_err());
    }
}
