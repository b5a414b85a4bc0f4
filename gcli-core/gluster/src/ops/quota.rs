//! 目录配额：`gluster volume quota ...`

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::{QuotaObjectLimit, QuotaPathLimit};
use crate::parser::{parse_quota_list_objects, parse_quota_list_paths};

fn quota(volume: &str, verb: &str) -> GlusterCommand {
    GlusterCommand::quota().arg(volume).arg(verb)
}

/// `volume inode-quota <vol> enable`，属于 volume 子系统
pub fn inode_quota_enable_cmd(volume: &str) -> GlusterCommand {
    GlusterCommand::volume().arg("inode-quota").arg(volume).arg("enable")
}

pub fn quota_enable_cmd(volume: &str) -> GlusterCommand {
    quota(volume, "enable")
}

pub fn quota_disable_cmd(volume: &str) -> GlusterCommand {
    quota(volume, "disable")
}

pub fn quota_list_paths_cmd(volume: &str, paths: &[String]) -> GlusterCommand {
    quota(volume, "list").args(paths).xml()
}

pub fn quota_list_objects_cmd(volume: &str, paths: &[String]) -> GlusterCommand {
    quota(volume, "list-objects").args(paths).xml()
}

pub fn quota_remove_path_cmd(volume: &str, path: &str) -> GlusterCommand {
    quota(volume, "remove").arg(path)
}

pub fn quota_remove_objects_cmd(volume: &str, path: &str) -> GlusterCommand {
    quota(volume, "remove-objects").arg(path)
}

pub fn quota_default_soft_limit_cmd(volume: &str, percent: u32) -> GlusterCommand {
    quota(volume, "default-soft-limit").arg(percent)
}

/// `limit-usage <path> <size> [percent]`，size 形如 `10GB`
pub fn quota_limit_usage_cmd(
    volume: &str,
    path: &str,
    size: &str,
    percent: Option<u32>,
) -> GlusterCommand {
    quota(volume, "limit-usage").arg(path).arg(size).arg_opt(percent)
}

pub fn quota_limit_objects_cmd(
    volume: &str,
    path: &str,
    count: u64,
    percent: Option<u32>,
) -> GlusterCommand {
    quota(volume, "limit-objects").arg(path).arg(count).arg_opt(percent)
}

pub fn quota_alert_time_cmd(volume: &str, alert_time: &str) -> GlusterCommand {
    quota(volume, "alert-time").arg(alert_time)
}

pub fn quota_soft_timeout_cmd(volume: &str, timeout: &str) -> GlusterCommand {
    quota(volume, "soft-timeout").arg(timeout)
}

pub fn quota_hard_timeout_cmd(volume: &str, timeout: &str) -> GlusterCommand {
    quota(volume, "hard-timeout").arg(timeout)
}

impl GlusterClient {
    pub async fn quota_inode_enable(&self, volume: &str) -> Result<()> {
        self.run(inode_quota_enable_cmd(volume)).await
    }

    pub async fn quota_enable(&self, volume: &str) -> Result<()> {
        self.run(quota_enable_cmd(volume)).await
    }

    pub async fn quota_disable(&self, volume: &str) -> Result<()> {
        self.run(quota_disable_cmd(volume)).await
    }

    /// 列出容量配额，`paths` 为空时列出全部
    pub async fn quota_list_paths(
        &self,
        volume: &str,
        paths: &[String],
    ) -> Result<Vec<QuotaPathLimit>> {
        let output = self.execute(quota_list_paths_cmd(volume, paths)).await?;
        parse_quota_list_paths(&output)
    }

    /// 列出对象数配额
    pub async fn quota_list_objects(
        &self,
        volume: &str,
        paths: &[String],
    ) -> Result<Vec<QuotaObjectLimit>> {
        let output = self.execute(quota_list_objects_cmd(volume, paths)).await?;
        parse_quota_list_objects(&output)
    }

    pub async fn quota_remove_path(&self, volume: &str, path: &str) -> Result<()> {
        self.run(quota_remove_path_cmd(volume, path)).await
    }

    pub async fn quota_remove_objects(&self, volume: &str, path: &str) -> Result<()> {
        self.run(quota_remove_objects_cmd(volume, path)).await
    }

    pub async fn quota_default_soft_limit(&self, volume: &str, percent: u32) -> Result<()> {
        self.run(quota_default_soft_limit_cmd(volume, percent)).await
    }

    pub async fn quota_limit_usage(
        &self,
        volume: &str,
        path: &str,
        size: &str,
        percent: Option<u32>,
    ) -> Result<()> {
        self.run(quota_limit_usage_cmd(volume, path, size, percent))
            .await
    }

    pub async fn quota_limit_objects(
        &self,
        volume: &str,
        path: &str,
        count: u64,
        percent: Option<u32>,
    ) -> Result<()> {
        self.run(quota_limit_objects_cmd(volume, path, count, percent))
            .await
    }

    pub async fn quota_alert_time(&self, volume: &str, alert_time: &str) -> Result<()> {
        self.run(quota_alert_time_cmd(volume, alert_time)).await
    }

    pub async fn quota_soft_timeout(&self, volume: &str, timeout: &str) -> Result<()> {
        self.run(quota_soft_timeout_cmd(volume, timeout)).await
    }

    pub async fn quota_hard_timeout(&self, volume: &str, timeout: &str) -> Result<()> {
        self.run(quota_hard_timeout_cmd(volume, timeout)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_prefixes() {
        assert_eq!(
            inode_quota_enable_cmd("gv0").tokens(),
            vec!["volume", "inode-quota", "gv0", "enable"]
        );
        assert_eq!(
            quota_enable_cmd("gv0").tokens(),
            vec!["volume", "quota", "gv0", "enable"]
        );
    }

    #[test]
    fn test_quota_lists() {
        let paths = vec!["/a".to_string(), "/b".to_string()];
        assert_eq!(
            quota_list_paths_cmd("gv0", &paths).tokens(),
            vec!["volume", "quota", "gv0", "list", "/a", "/b", "--xml"]
        );
        assert_eq!(
            quota_list_objects_cmd("gv0", &[]).user_args(),
            &["gv0", "list-objects"]
        );
    }

    #[test]
    fn test_quota_limits() {
        assert_eq!(
            quota_limit_usage_cmd("gv0", "/data", "10GB", Some(80)).user_args(),
            &["gv0", "limit-usage", "/data", "10GB", "80"]
        );
        assert_eq!(
            quota_limit_objects_cmd("gv0", "/data", 1000, None).user_args(),
            &["gv0", "limit-objects", "/data", "1000"]
        );
        assert_eq!(
            quota_default_soft_limit_cmd("gv0", 70).user_args(),
            &["gv0", "default-soft-limit", "70"]
        );
    }
}
