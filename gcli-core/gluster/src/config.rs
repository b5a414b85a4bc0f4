//! Gluster 客户端配置

use std::path::PathBuf;
use std::time::Duration;

use gcli_ssh_executor::SshConfig;
use serde::{Deserialize, Serialize};

/// 默认 gluster 可执行文件
pub const DEFAULT_GLUSTER_PATH: &str = "gluster";

/// 远程执行目标（主机 + 私钥）
///
/// 两个目标相等当且仅当主机、用户、端口和私钥路径都相同，
/// 执行器据此判断是否需要重建连接。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteTarget {
    /// 主机名或 IP
    pub host: String,
    /// 私钥路径
    pub key_path: PathBuf,
    /// 登录用户（默认 root）
    #[serde(default = "default_user")]
    pub user: String,
    /// SSH 端口（默认 22）
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    22
}

impl RemoteTarget {
    /// 以 root 用户、22 端口创建远程目标
    pub fn new(host: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            key_path: key_path.into(),
            user: default_user(),
            port: default_port(),
        }
    }

    /// 设置登录用户
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// 设置端口
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 转换为 SSH 配置
    pub fn ssh_config(&self, command_timeout: Option<Duration>) -> SshConfig {
        SshConfig::with_key(&self.host, &self.user, &self.key_path)
            .port(self.port)
            .command_timeout(command_timeout)
    }
}

/// Gluster 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlusterConfig {
    /// gluster 可执行文件路径
    #[serde(default = "default_gluster_path")]
    pub gluster_path: String,
    /// glusterd socket 路径（设置后每条命令都带 --glusterd-sock）
    #[serde(default)]
    pub glusterd_socket: Option<PathBuf>,
    /// 默认远程目标（None 表示在本机执行）
    #[serde(default)]
    pub remote: Option<RemoteTarget>,
    /// 命令执行超时（None 表示一直等待）
    #[serde(default, with = "gcli_ssh_executor::duration_secs::option")]
    pub command_timeout: Option<Duration>,
}

fn default_gluster_path() -> String {
    DEFAULT_GLUSTER_PATH.to_string()
}

impl Default for GlusterConfig {
    fn default() -> Self {
        Self {
            gluster_path: default_gluster_path(),
            glusterd_socket: None,
            remote: None,
            command_timeout: None,
        }
    }
}

impl GlusterConfig {
    /// 设置 gluster 可执行文件路径
    pub fn gluster_path(mut self, path: impl Into<String>) -> Self {
        self.gluster_path = path.into();
        self
    }

    /// 设置 glusterd socket 路径
    pub fn glusterd_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.glusterd_socket = Some(path.into());
        self
    }

    /// 设置默认远程目标
    pub fn remote(mut self, target: RemoteTarget) -> Self {
        self.remote = Some(target);
        self
    }

    /// 设置命令执行超时
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// 为一组命令参数加上固定前缀
    ///
    /// `<gluster_path> [--glusterd-sock=<path>] --mode=script <tokens...>`
    pub fn argv(&self, tokens: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(tokens.len() + 3);
        argv.push(self.gluster_path.clone());
        if let Some(socket) = &self.glusterd_socket {
            argv.push(format!("--glusterd-sock={}", socket.display()));
        }
        argv.push("--mode=script".to_string());
        argv.extend(tokens.iter().cloned());
        argv
    }
}
