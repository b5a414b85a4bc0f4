//! nfs-ganesha 开关与版本查询

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;

pub fn nfs_ganesha_cmd(enable: bool) -> GlusterCommand {
    GlusterCommand::global()
        .arg("nfs-ganesha")
        .arg(if enable { "enable" } else { "disable" })
}

pub fn version_cmd() -> GlusterCommand {
    GlusterCommand::global().arg("--version")
}

/// `gluster --version` 输出的第一行
pub fn first_line(output: &str) -> String {
    output.lines().next().unwrap_or_default().trim().to_string()
}

impl GlusterClient {
    pub async fn nfs_ganesha_enable(&self) -> Result<()> {
        self.run(nfs_ganesha_cmd(true)).await
    }

    pub async fn nfs_ganesha_disable(&self) -> Result<()> {
        self.run(nfs_ganesha_cmd(false)).await
    }

    /// 版本字符串，如 `glusterfs 10.3`
    pub async fn version(&self) -> Result<String> {
        let output = self.execute(version_cmd()).await?;
        Ok(first_line(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::GlusterConfig;
    use crate::executor::{ExecutionResult, MockCommandRunner};

    #[tokio::test]
    async fn test_version_first_line() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|req| req.argv.last().map(String::as_str) == Some("--version"))
            .returning(|_| {
                Ok(ExecutionResult::success(
                    "glusterfs 10.3\nRepository revision: git://git.gluster.org/glusterfs.git\n",
                ))
            });
        let client = GlusterClient::with_runner(GlusterConfig::default(), Arc::new(runner));
        assert_eq!(client.version().await.unwrap(), "glusterfs 10.3");
    }

    #[test]
    fn test_nfs_ganesha() {
        assert_eq!(nfs_ganesha_cmd(false).tokens(), vec!["nfs-ganesha", "disable"]);
        assert_eq!(first_line(""), "");
    }
}
