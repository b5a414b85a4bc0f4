//! brick 增删替换

use tracing::info;

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::TaskStatus;
use crate::parser::parse_remove_brick_status;

/// remove-brick 阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveBrickAction {
    Start,
    Stop,
    Commit,
    Status,
    /// 不迁移数据，直接移除
    Force,
}

impl RemoveBrickAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Commit => "commit",
            Self::Status => "status",
            Self::Force => "force",
        }
    }
}

/// `volume add-brick <vol> [stripe n] [replica n] [arbiter n] <bricks...> [force]`
pub fn add_brick_cmd(
    volume: &str,
    bricks: &[String],
    stripe: Option<u32>,
    replica: Option<u32>,
    arbiter: Option<u32>,
    force: bool,
) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("add-brick")
        .arg(volume)
        .opt("stripe", stripe)
        .opt("replica", replica)
        .opt("arbiter", arbiter)
        .args(bricks)
        .flag("force", force)
}

/// `volume remove-brick <vol> [replica n] <bricks...> <action> [force]`
///
/// `Status` 阶段请求 XML 输出。
pub fn remove_brick_cmd(
    volume: &str,
    bricks: &[String],
    replica: Option<u32>,
    action: RemoveBrickAction,
    force: bool,
) -> GlusterCommand {
    let cmd = GlusterCommand::volume()
        .arg("remove-brick")
        .arg(volume)
        .opt("replica", replica)
        .args(bricks)
        .arg(action.as_str())
        .flag("force", force && action != RemoveBrickAction::Force);
    if action == RemoveBrickAction::Status {
        cmd.xml()
    } else {
        cmd
    }
}

/// `volume replace-brick <vol> <src> <new> commit [force]`
pub fn replace_brick_cmd(volume: &str, source: &str, new_brick: &str, force: bool) -> GlusterCommand {
    GlusterCommand::volume()
        .arg("replace-brick")
        .arg(volume)
        .arg(source)
        .arg(new_brick)
        .arg("commit")
        .flag("force", force)
}

impl GlusterClient {
    /// 向卷中添加 brick
    pub async fn brick_add(
        &self,
        volume: &str,
        bricks: &[String],
        stripe: Option<u32>,
        replica: Option<u32>,
        arbiter: Option<u32>,
        force: bool,
    ) -> Result<()> {
        info!("卷 {} 添加 brick: {:?}", volume, bricks);
        self.run(add_brick_cmd(volume, bricks, stripe, replica, arbiter, force))
            .await
    }

    /// 开始迁移并移除 brick
    pub async fn brick_remove_start(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
        force: bool,
    ) -> Result<()> {
        self.run(remove_brick_cmd(volume, bricks, replica, RemoveBrickAction::Start, force))
            .await
    }

    pub async fn brick_remove_stop(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
        force: bool,
    ) -> Result<()> {
        self.run(remove_brick_cmd(volume, bricks, replica, RemoveBrickAction::Stop, force))
            .await
    }

    pub async fn brick_remove_commit(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
        force: bool,
    ) -> Result<()> {
        self.run(remove_brick_cmd(volume, bricks, replica, RemoveBrickAction::Commit, force))
            .await
    }

    /// 不迁移数据直接移除 brick
    pub async fn brick_remove_force(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
    ) -> Result<()> {
        self.run(remove_brick_cmd(volume, bricks, replica, RemoveBrickAction::Force, false))
            .await
    }

    /// 查询 remove-brick 迁移进度
    pub async fn brick_remove_status(
        &self,
        volume: &str,
        bricks: &[String],
        replica: Option<u32>,
        force: bool,
    ) -> Result<TaskStatus> {
        let output = self
            .execute(remove_brick_cmd(volume, bricks, replica, RemoveBrickAction::Status, force))
            .await?;
        parse_remove_brick_status(&output)
    }

    /// 替换 brick
    pub async fn brick_replace(
        &self,
        volume: &str,
        source: &str,
        new_brick: &str,
        force: bool,
    ) -> Result<()> {
        info!("卷 {} 替换 brick {} -> {}", volume, source, new_brick);
        self.run(replace_brick_cmd(volume, source, new_brick, force))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bricks() -> Vec<String> {
        vec!["h1:/b2".to_string(), "h2:/b2".to_string()]
    }

    #[test]
    fn test_add_brick() {
        assert_eq!(
            add_brick_cmd("gv0", &bricks(), None, Some(3), Some(1), true).tokens(),
            vec!["volume", "add-brick", "gv0", "replica", "3", "arbiter", "1", "h1:/b2", "h2:/b2", "force"]
        );
        assert_eq!(
            add_brick_cmd("gv0", &bricks(), None, None, None, false).user_args(),
            &["add-brick", "gv0", "h1:/b2", "h2:/b2"]
        );
    }

    #[test]
    fn test_remove_brick_actions() {
        assert_eq!(
            remove_brick_cmd("gv0", &bricks(), Some(2), RemoveBrickAction::Start, false).tokens(),
            vec!["volume", "remove-brick", "gv0", "replica", "2", "h1:/b2", "h2:/b2", "start"]
        );

        let status = remove_brick_cmd("gv0", &bricks(), None, RemoveBrickAction::Status, false);
        assert!(status.expects_xml());
        assert_eq!(status.user_args().last().map(String::as_str), Some("status"));

        let forced = remove_brick_cmd("gv0", &bricks(), None, RemoveBrickAction::Force, true);
        assert_eq!(forced.user_args(), &["remove-brick", "gv0", "h1:/b2", "h2:/b2", "force"]);
        assert!(!forced.expects_xml());
    }

    #[test]
    fn test_replace_brick() {
        assert_eq!(
            replace_brick_cmd("gv0", "h1:/b1", "h3:/b1", false).user_args(),
            &["replace-brick", "gv0", "h1:/b1", "h3:/b1", "commit"]
        );
    }
}
