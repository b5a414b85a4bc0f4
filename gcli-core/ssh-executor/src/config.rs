//! SSH 配置

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// SSH 认证方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    /// 私钥认证
    Key {
        /// 私钥路径（支持 ~ 开头）
        key_path: PathBuf,
    },
    /// 使用默认密钥（~/.ssh/id_rsa, ~/.ssh/id_ed25519 等）
    DefaultKey,
}

/// SSH 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    /// 主机地址
    pub host: String,
    /// 端口（默认 22）
    #[serde(default = "default_port")]
    pub port: u16,
    /// 用户名
    pub username: String,
    /// 认证方式
    pub auth: AuthMethod,
    /// 连接超时
    #[serde(with = "duration_secs", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// 命令执行超时（None 表示一直等待命令结束）
    #[serde(with = "duration_secs::option", default)]
    pub command_timeout: Option<Duration>,
    /// 主连接空闲保持时间
    #[serde(with = "duration_secs", default = "default_control_persist")]
    pub control_persist: Duration,
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_control_persist() -> Duration {
    Duration::from_secs(600)
}

impl SshConfig {
    /// 使用私钥认证创建配置
    ///
    /// # Arguments
    /// * `host` - 主机地址
    /// * `username` - 用户名
    /// * `key_path` - 私钥路径
    pub fn with_key(
        host: impl Into<String>,
        username: impl Into<String>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: username.into(),
            auth: AuthMethod::Key {
                key_path: key_path.into(),
            },
            connect_timeout: default_connect_timeout(),
            command_timeout: None,
            control_persist: default_control_persist(),
        }
    }

    /// 使用默认密钥认证创建配置
    ///
    /// 将尝试使用 ~/.ssh/id_rsa, ~/.ssh/id_ed25519 等默认密钥
    pub fn with_default_key(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: username.into(),
            auth: AuthMethod::DefaultKey,
            connect_timeout: default_connect_timeout(),
            command_timeout: None,
            control_persist: default_control_persist(),
        }
    }

    /// 设置端口
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 设置连接超时
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 设置命令执行超时
    pub fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// 设置主连接空闲保持时间
    pub fn control_persist(mut self, persist: Duration) -> Self {
        self.control_persist = persist;
        self
    }

    /// 获取 SSH 地址字符串（host:port 格式）
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取登录目标（user@host 格式）
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// 以秒为单位序列化 Duration，用于 `#[serde(with = "...")]`
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => serializer.serialize_some(&d.as_secs()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let secs = Option::<u64>::deserialize(deserializer)?;
            Ok(secs.map(Duration::from_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_config() {
        let config = SshConfig::with_key("192.168.1.100", "root", "/root/.ssh/gluster.pem");
        assert_eq!(config.host, "192.168.1.100");
        assert_eq!(config.port, 22);
        assert_eq!(config.destination(), "root@192.168.1.100");
        assert!(matches!(config.auth, AuthMethod::Key { .. }));
        assert_eq!(config.command_timeout, None);
    }

    #[test]
    fn test_config_builder() {
        let config = SshConfig::with_default_key("host", "root")
            .port(2222)
            .connect_timeout(Duration::from_secs(10))
            .command_timeout(Some(Duration::from_secs(120)));
        assert_eq!(config.port, 2222);
        assert_eq!(config.address(), "host:2222");
        assert_eq!(config.connect_timeout.as_secs(), 10);
        assert_eq!(config.command_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_config_equality_tracks_key() {
        let a = SshConfig::with_key("node1", "root", "/keys/a.pem");
        let b = SshConfig::with_key("node1", "root", "/keys/b.pem");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let json = r#"{"host":"node1","username":"root","auth":"DefaultKey"}"#;
        let config: SshConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.port, 22);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.command_timeout, None);
    }
}
