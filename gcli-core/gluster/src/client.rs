//! Gluster 客户端
//!
//! 客户端持有显式配置和一个命令执行器，所有操作都是它的方法。
//! 远程目标可以写在配置里，也可以通过 [`GlusterClient::remote_session`]
//! 临时切换，作用域结束（包括提前返回和出错）时自动恢复。

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::command::GlusterCommand;
use crate::config::{GlusterConfig, RemoteTarget};
use crate::error::Result;
use crate::executor::{CommandExecutor, CommandRunner, ExecRequest};
use crate::normalize::normalize;

/// Gluster 客户端
pub struct GlusterClient {
    config: GlusterConfig,
    runner: Arc<dyn CommandRunner>,
    remote: Mutex<Option<RemoteTarget>>,
}

impl GlusterClient {
    /// 使用默认执行器（本地子进程 / 系统 ssh）创建客户端
    pub fn new(config: GlusterConfig) -> Self {
        Self::with_runner(config, Arc::new(CommandExecutor::new()))
    }

    /// 使用自定义执行器创建客户端
    ///
    /// # Arguments
    /// * `config` - 客户端配置，其中的 `remote` 作为初始远程目标
    /// * `runner` - 命令执行器
    pub fn with_runner(config: GlusterConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let remote = Mutex::new(config.remote.clone());
        Self {
            config,
            runner,
            remote,
        }
    }

    pub fn config(&self) -> &GlusterConfig {
        &self.config
    }

    /// 返回共享同一执行器、但固定指向另一个远程目标的客户端
    ///
    /// 需要同时操作多个集群时使用，互不影响。
    pub fn for_remote(&self, target: RemoteTarget) -> GlusterClient {
        let config = self.config.clone().remote(target);
        Self::with_runner(config, Arc::clone(&self.runner))
    }

    fn remote_slot(&self) -> MutexGuard<'_, Option<RemoteTarget>> {
        self.remote.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 当前生效的远程目标，None 表示本机执行
    pub fn active_remote(&self) -> Option<RemoteTarget> {
        self.remote_slot().clone()
    }

    /// 进入远程会话：守卫存活期间所有调用都发往 `target`
    ///
    /// 守卫释放时恢复进入前的目标。同一客户端上的守卫应按嵌套顺序释放。
    ///
    /// # Example
    /// ```ignore
    /// let session = client.remote_session(RemoteTarget::new("node1", "/root/.ssh/id_rsa"));
    /// let peers = session.peer_status().await?;
    /// ```
    pub fn remote_session(&self, target: RemoteTarget) -> RemoteSession<'_> {
        info!("进入远程会话: {}@{}", target.user, target.host);
        let previous = self.remote_slot().replace(target);
        RemoteSession {
            client: self,
            previous,
        }
    }

    /// 构造执行请求
    pub fn request(&self, command: &GlusterCommand) -> ExecRequest {
        ExecRequest {
            argv: self.config.argv(&command.tokens()),
            remote: self.active_remote(),
            timeout: self.config.command_timeout,
        }
    }

    /// 执行命令并归一化结果，返回去除首尾空白的 stdout
    pub async fn execute(&self, command: GlusterCommand) -> Result<String> {
        let request = self.request(&command);
        match &request.remote {
            Some(target) => info!("执行 [{}]: {}", target.host, command),
            None => info!("执行: {}", command),
        }

        let result = self.runner.run(&request).await?;
        debug!(
            "退出码: {}, stdout {} 字节, stderr {} 字节",
            result.exit_status,
            result.stdout.len(),
            result.stderr.len()
        );

        normalize(result, command.expects_xml())
    }

    /// 执行命令并丢弃输出
    pub(crate) async fn run(&self, command: GlusterCommand) -> Result<()> {
        self.execute(command).await.map(|_| ())
    }
}

/// 远程会话守卫
///
/// 通过 `Deref` 直接调用客户端方法；释放时恢复之前的远程目标。
pub struct RemoteSession<'a> {
    client: &'a GlusterClient,
    previous: Option<RemoteTarget>,
}

impl Deref for RemoteSession<'_> {
    type Target = GlusterClient;

    fn deref(&self) -> &GlusterClient {
        self.client
    }
}

impl Drop for RemoteSession<'_> {
    fn drop(&mut self) {
        let previous = self.previous.take();
        debug!(
            "退出远程会话, 恢复目标: {}",
            previous
                .as_ref()
                .map(|t| t.host.as_str())
                .unwrap_or("本机")
        );
        *self.client.remote_slot() = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlusterError;
    use crate::executor::{ExecutionResult, MockCommandRunner};

    fn target(host: &str) -> RemoteTarget {
        RemoteTarget::new(host, "/root/.ssh/id_rsa")
    }

    #[tokio::test]
    async fn test_execute_builds_full_argv() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|req| {
                req.argv
                    == vec![
                        "/usr/sbin/gluster",
                        "--glusterd-sock=/run/gd.sock",
                        "--mode=script",
                        "volume",
                        "list",
                        "--xml",
                    ]
                    && req.remote.is_none()
            })
            .times(1)
            .returning(|_| Ok(ExecutionResult::success("  <cliOutput/>\n")));

        let config = GlusterConfig::default()
            .gluster_path("/usr/sbin/gluster")
            .glusterd_socket("/run/gd.sock");
        let client = GlusterClient::with_runner(config, Arc::new(runner));
        let out = client
            .execute(GlusterCommand::volume().arg("list").xml())
            .await
            .unwrap();
        assert_eq!(out, "<cliOutput/>");
    }

    #[tokio::test]
    async fn test_remote_session_routes_and_restores() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|req| req.remote.as_ref().map(|t| t.host.as_str()) == Some("node1"))
            .times(1)
            .returning(|_| Ok(ExecutionResult::success("ok")));
        runner
            .expect_run()
            .withf(|req| req.remote.is_none())
            .times(1)
            .returning(|_| Ok(ExecutionResult::success("ok")));

        let client = GlusterClient::with_runner(GlusterConfig::default(), Arc::new(runner));
        {
            let session = client.remote_session(target("node1"));
            session.execute(GlusterCommand::peer().arg("status")).await.unwrap();
            assert_eq!(client.active_remote(), Some(target("node1")));
        }
        assert_eq!(client.active_remote(), None);
        client.execute(GlusterCommand::peer().arg("status")).await.unwrap();
    }

    #[tokio::test]
    async fn test_remote_session_restores_on_error() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(ExecutionResult::new(1, "", "peer probe: failed")));

        let config = GlusterConfig::default().remote(target("default"));
        let client = GlusterClient::with_runner(config, Arc::new(runner));

        async fn probe(client: &GlusterClient) -> Result<()> {
            let session = client.remote_session(target("node2"));
            session.run(GlusterCommand::peer().arg("probe").arg("h3")).await?;
            Ok(())
        }

        let err = probe(&client).await.unwrap_err();
        assert!(matches!(err, GlusterError::Command { code: 1, .. }));
        assert_eq!(client.active_remote(), Some(target("default")));
    }

    #[test]
    fn test_nested_sessions() {
        let client =
            GlusterClient::with_runner(GlusterConfig::default(), Arc::new(MockCommandRunner::new()));
        let outer = client.remote_session(target("a"));
        {
            let _inner = outer.remote_session(target("b"));
            assert_eq!(client.active_remote(), Some(target("b")));
        }
        assert_eq!(client.active_remote(), Some(target("a")));
        drop(outer);
        assert_eq!(client.active_remote(), None);
    }

    #[test]
    fn test_for_remote_is_independent() {
        let client =
            GlusterClient::with_runner(GlusterConfig::default(), Arc::new(MockCommandRunner::new()));
        let other = client.for_remote(target("c"));
        assert_eq!(other.active_remote(), Some(target("c")));
        assert_eq!(client.active_remote(), None);
    }
}
