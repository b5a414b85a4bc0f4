//! SSH 客户端实现
//!
//! 使用系统 ssh 命令执行远程命令，通过 ControlMaster 复用同一条主连接

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{AuthMethod, SshConfig};
use crate::error::{Result, SshError};

/// 命令执行输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 标准输出
    pub stdout: String,
    /// 标准错误
    pub stderr: String,
    /// 退出码（被信号终止时为 None）
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// 检查命令是否成功执行
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 获取合并的输出（stdout + stderr）
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// SSH 客户端（使用系统 ssh 命令）
///
/// 建立连接时启动一个 ControlMaster 主连接，后续命令都通过该连接复用，
/// 直到调用 [`SshClient::disconnect`] 或空闲超过 `control_persist`。
#[derive(Debug)]
pub struct SshClient {
    config: SshConfig,
    control_path: PathBuf,
}

impl SshClient {
    /// 连接到 SSH 服务器（验证连接）
    pub async fn connect(config: SshConfig) -> Result<Self> {
        info!("正在连接 SSH: {}@{}", config.username, config.address());

        if let AuthMethod::Key { key_path } = &config.auth {
            let expanded = expand_path(key_path);
            if !expanded.exists() {
                return Err(SshError::KeyLoadError(format!(
                    "私钥文件不存在: {}",
                    expanded.display()
                )));
            }
        }

        let control_path = control_path_for(&config);
        let client = Self {
            config,
            control_path,
        };

        // 验证连接（执行简单命令），同时拉起主连接
        debug!("验证 SSH 连接...");
        let output = client.execute("echo connected").await?;

        if output.stdout.trim() != "connected" {
            return Err(SshError::ConnectionError(format!(
                "SSH 连接验证失败: {}",
                output.combined_output()
            )));
        }

        info!(
            "SSH 连接成功: {}@{}",
            client.config.username,
            client.config.address()
        );
        Ok(client)
    }

    /// 执行命令
    pub async fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!("执行命令: {}", command);

        match self.config.command_timeout {
            Some(limit) => timeout(limit, self.execute_internal(command))
                .await
                .map_err(|_| SshError::TimeoutError(format!("命令执行超时: {}", command)))?,
            None => self.execute_internal(command).await,
        }
    }

    /// 执行参数列表，按 shell 规则拼接为单条命令
    pub async fn execute_args(&self, args: &[String]) -> Result<CommandOutput> {
        self.execute(&shell_join(args)).await
    }

    /// 执行命令内部实现
    async fn execute_internal(&self, command: &str) -> Result<CommandOutput> {
        let mut cmd = self.ssh_command();
        cmd.arg(self.config.destination()).arg(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| SshError::ExecutionError(format!("启动 SSH 进程失败: {}", e)))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SshError::ExecutionError(format!("等待 SSH 进程失败: {}", e)))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
        };

        // ssh 自身失败时固定返回 255
        if result.exit_code == Some(255) {
            if is_auth_failure(&result.stderr) {
                return Err(SshError::AuthenticationError(result.stderr));
            }
            if is_transport_failure(&result.stderr) {
                return Err(SshError::ConnectionError(result.stderr));
            }
        }

        debug!(
            "命令执行完成, 退出码: {:?}, stdout 长度: {}, stderr 长度: {}",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }

    /// 构造带通用参数的 ssh 命令
    fn ssh_command(&self) -> Command {
        let mut cmd = Command::new("ssh");

        if let AuthMethod::Key { key_path } = &self.config.auth {
            cmd.arg("-i").arg(expand_path(key_path));
        }

        cmd.arg("-o")
            .arg("StrictHostKeyChecking=no")
            .arg("-o")
            .arg("UserKnownHostsFile=/dev/null")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg(format!(
                "ConnectTimeout={}",
                self.config.connect_timeout.as_secs()
            ))
            .arg("-o")
            .arg("ControlMaster=auto")
            .arg("-o")
            .arg(format!("ControlPath={}", self.control_path.display()))
            .arg("-o")
            .arg(format!(
                "ControlPersist={}",
                self.config.control_persist.as_secs()
            ))
            .arg("-p")
            .arg(self.config.port.to_string());

        cmd
    }

    /// 关闭主连接
    pub async fn disconnect(self) -> Result<()> {
        let mut cmd = self.ssh_command();
        cmd.arg("-O").arg("exit").arg(self.config.destination());
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        let output = cmd.output().await?;
        if !output.status.success() {
            // 主连接可能已因空闲超时退出
            warn!(
                "关闭 SSH 主连接失败: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    /// 获取配置
    pub fn config(&self) -> &SshConfig {
        &self.config
    }
}

/// 将参数列表拼接为可在远端 shell 中执行的命令字符串
///
/// 仅包含安全字符的参数原样输出，其余参数使用单引号包裹
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@,=+%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

fn is_auth_failure(stderr: &str) -> bool {
    stderr.contains("Permission denied") || stderr.contains("Authentication failed")
}

fn is_transport_failure(stderr: &str) -> bool {
    stderr.lines().any(|l| l.starts_with("ssh:"))
        || stderr.contains("Connection refused")
        || stderr.contains("Connection timed out")
        || stderr.contains("Host key verification failed")
}

/// 计算主连接的 socket 路径
fn control_path_for(config: &SshConfig) -> PathBuf {
    let dir = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
    dir.join(format!(
        "gcli-ssh-{}@{}-{}",
        config.username, config.host, config.port
    ))
}

/// 展开路径（处理 ~ 等）
fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
            return PathBuf::from(expanded);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output() {
        let output = CommandOutput {
            stdout: "hello".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert!(output.is_success());
        assert_eq!(output.combined_output(), "hello");

        let failed = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            exit_code: Some(1),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.combined_output(), "out\nerr");
    }

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("/etc/hosts");
        assert_eq!(expand_path(&path), path);
    }

    #[test]
    fn test_shell_join() {
        let args: Vec<String> = ["gluster", "--mode=script", "volume", "info", "--xml"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(shell_join(&args), "gluster --mode=script volume info --xml");

        let args = vec![
            "snapshot".to_string(),
            "description".to_string(),
            "nightly backup".to_string(),
            "it's".to_string(),
            "!sync-jobs".to_string(),
        ];
        assert_eq!(
            shell_join(&args),
            r"snapshot description 'nightly backup' 'it'\''s' '!sync-jobs'"
        );
    }

    #[test]
    fn test_failure_classification() {
        assert!(is_auth_failure("root@node1: Permission denied (publickey)."));
        assert!(is_transport_failure(
            "ssh: Could not resolve hostname node9: Name or service not known"
        ));
        assert!(!is_transport_failure("volume info: failed: Volume gv9 does not exist"));
    }

    #[test]
    fn test_control_path_per_target() {
        let a = control_path_for(&SshConfig::with_default_key("node1", "root"));
        let b = control_path_for(&SshConfig::with_default_key("node2", "root"));
        assert_ne!(a, b);
        assert!(a.to_string_lossy().contains("root@node1-22"));
    }
}
