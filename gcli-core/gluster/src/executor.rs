//! 命令执行器
//!
//! 本地模式直接启动 gluster 子进程；远程模式通过缓存的 SSH 会话执行，
//! 只有目标（主机、用户、端口、私钥）或命令超时变化时才重建会话。

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use gcli_ssh_executor::{shell_join, SshClient, SshConfig, SshError};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::RemoteTarget;
use crate::error::{GlusterError, Result};

/// 一次命令执行的原始结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// 退出码（被信号终止时为 -1）
    pub exit_status: i32,
    /// 标准输出
    pub stdout: String,
    /// 标准错误
    pub stderr: String,
}

impl ExecutionResult {
    pub fn new(exit_status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// 构造一个成功结果
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }
}

/// 执行请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// 完整参数（第一个元素是 gluster 可执行文件）
    pub argv: Vec<String>,
    /// 远程目标，None 表示在本机执行
    pub remote: Option<RemoteTarget>,
    /// 命令执行超时
    pub timeout: Option<Duration>,
}

/// 命令执行接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 执行命令并返回退出码和输出
    async fn run(&self, request: &ExecRequest) -> Result<ExecutionResult>;
}

/// 默认执行器：本地子进程或远程 SSH
#[derive(Debug, Default)]
pub struct CommandExecutor {
    session: Mutex<Option<SshClient>>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在本机启动子进程执行
    async fn run_local(&self, request: &ExecRequest) -> Result<ExecutionResult> {
        let (program, args) = request
            .argv
            .split_first()
            .ok_or_else(|| GlusterError::SpawnError("命令为空".to_string()))?;

        debug!("本地执行: {}", request.argv.join(" "));

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GlusterError::SpawnError(format!("{}: {}", program, e)))?;

        let wait = child.wait_with_output();
        let output = match request.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| GlusterError::Timeout(request.argv.join(" ")))??,
            None => wait.await?,
        };

        let result = ExecutionResult {
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "本地执行完成, 退出码: {}, stdout 长度: {}, stderr 长度: {}",
            result.exit_status,
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }

    /// 通过缓存的 SSH 会话执行
    async fn run_remote(
        &self,
        target: &RemoteTarget,
        request: &ExecRequest,
    ) -> Result<ExecutionResult> {
        let wanted = target.ssh_config(request.timeout);
        let mut session = self.session.lock().await;

        if needs_reconnect(session.as_ref().map(SshClient::config), &wanted) {
            if let Some(previous) = session.take() {
                info!(
                    "远程目标变更: {} -> {}",
                    previous.config().destination(),
                    wanted.destination()
                );
                if let Err(e) = previous.disconnect().await {
                    warn!("关闭旧 SSH 连接失败: {}", e);
                }
            }

            let client = SshClient::connect(wanted)
                .await
                .map_err(|e| connection_error(target, e))?;
            *session = Some(client);
        }

        let client = session
            .as_ref()
            .ok_or_else(|| GlusterError::Connection {
                host: target.host.clone(),
                message: "SSH 会话不可用".to_string(),
            })?;

        let command = shell_join(&request.argv);
        debug!("远程执行 [{}]: {}", target.host, command);

        let output = client.execute(&command).await.map_err(|e| match e {
            SshError::TimeoutError(msg) => GlusterError::Timeout(msg),
            e if e.is_connect_failure() => connection_error(target, e),
            e => GlusterError::SshError(e),
        })?;

        Ok(ExecutionResult {
            exit_status: output.exit_code.unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// 关闭缓存的 SSH 会话
    pub async fn close(&self) -> Result<()> {
        if let Some(client) = self.session.lock().await.take() {
            client.disconnect().await.map_err(GlusterError::SshError)?;
        }
        Ok(())
    }
}

/// 缓存会话的配置与本次请求不一致（或尚无会话）时需要重新连接
fn needs_reconnect(cached: Option<&SshConfig>, wanted: &SshConfig) -> bool {
    cached != Some(wanted)
}

fn connection_error(target: &RemoteTarget, err: SshError) -> GlusterError {
    GlusterError::Connection {
        host: format!("{}@{}", target.user, target.host),
        message: err.to_string(),
    }
}

#[async_trait]
impl CommandRunner for CommandExecutor {
    async fn run(&self, request: &ExecRequest) -> Result<ExecutionResult> {
        match &request.remote {
            Some(target) => self.run_remote(target, request).await,
            None => self.run_local(request).await,
        }
    }
}
