//! bitrot / 配额 / 自愈命令

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::{GlusterClient, HealBrickInfo, QuotaPathLimit, ScrubNodeStatus, NOT_AVAILABLE};

use super::output::{human_bytes, output_formatted, print_json, print_table, success, TableRow};
use crate::{BitrotAction, HealAction, QuotaAction};

pub async fn handle_bitrot(client: &GlusterClient, action: BitrotAction, format: &str) -> Result<()> {
    match action {
        BitrotAction::Enable { volume } => {
            client.bitrot_enable(&volume).await?;
            success(&format!("卷 {} 已启用 bitrot", volume.cyan().bold()));
        }
        BitrotAction::Disable { volume } => {
            client.bitrot_disable(&volume).await?;
            success(&format!("卷 {} 已禁用 bitrot", volume.cyan().bold()));
        }
        BitrotAction::Throttle { volume, value } => {
            client.bitrot_scrub_throttle(&volume, &value).await?;
            success(&format!("{}: scrub-throttle = {}", volume.cyan().bold(), value.yellow()));
        }
        BitrotAction::Frequency { volume, value } => {
            client.bitrot_scrub_frequency(&volume, &value).await?;
            success(&format!("{}: scrub-frequency = {}", volume.cyan().bold(), value.yellow()));
        }
        BitrotAction::Status { volume } => {
            let status = client.bitrot_scrub_status(&volume).await?;
            if format == "json" {
                return print_json(&status);
            }
            println!("{}", status.volume.cyan().bold());
            println!("  状态:     {}", status.state.as_deref().unwrap_or("N/A"));
            println!("  速度:     {}", status.throttle.as_deref().unwrap_or("N/A"));
            println!("  周期:     {}", status.frequency.as_deref().unwrap_or("N/A"));
            println!();
            print_table(&status.nodes);
        }
    }
    Ok(())
}

pub async fn handle_quota(client: &GlusterClient, action: QuotaAction, format: &str) -> Result<()> {
    match action {
        QuotaAction::Enable { volume } => {
            client.quota_enable(&volume).await?;
            success(&format!("卷 {} 已启用配额", volume.cyan().bold()));
        }
        QuotaAction::Disable { volume } => {
            client.quota_disable(&volume).await?;
            success(&format!("卷 {} 已禁用配额", volume.cyan().bold()));
        }
        QuotaAction::List { volume, paths } => {
            let limits = client.quota_list_paths(&volume, &paths).await?;
            output_formatted(&limits, format)?;
        }
        QuotaAction::LimitUsage {
            volume,
            path,
            size,
            soft_limit,
        } => {
            client
                .quota_limit_usage(&volume, &path, &size, soft_limit)
                .await?;
            success(&format!("{}:{} 上限 {}", volume.cyan().bold(), path, size.yellow()));
        }
        QuotaAction::Remove { volume, path } => {
            client.quota_remove_path(&volume, &path).await?;
            success(&format!("{}:{} 配额已移除", volume.cyan().bold(), path));
        }
    }
    Ok(())
}

pub async fn handle_heal(client: &GlusterClient, action: HealAction, format: &str) -> Result<()> {
    match action {
        HealAction::Info { volume, info_type } => {
            let bricks = client.heal_info(&volume, info_type.as_deref()).await?;
            output_formatted(&bricks, format)?;
        }
        HealAction::Full { volume } => {
            client.heal_full(&volume).await?;
            success(&format!("卷 {} 已触发全量自愈", volume.cyan().bold()));
        }
        HealAction::Statistics { volume } => {
            println!("{}", client.heal_statistics(&volume).await?);
        }
    }
    Ok(())
}

impl TableRow for ScrubNodeStatus {
    fn headers() -> Vec<&'static str> {
        vec!["NODE", "RUNNING", "SCRUBBED", "SKIPPED", "ERRORS", "LAST COMPLETED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.node.clone(),
            self.scrub_running.clone().unwrap_or_default(),
            self.scrubbed_files.to_string(),
            self.skipped_files.to_string(),
            self.error_count.to_string(),
            self.last_completed_time.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for QuotaPathLimit {
    fn headers() -> Vec<&'static str> {
        vec!["PATH", "HARD LIMIT", "SOFT LIMIT", "USED", "AVAILABLE", "EXCEEDED"]
    }

    fn row(&self) -> Vec<String> {
        if let Some(error) = &self.error {
            return vec![
                self.path.clone(),
                error.red().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ];
        }
        let exceeded = match (self.hard_limit_exceeded, self.soft_limit_exceeded) {
            (Some(true), _) => "hard".red().to_string(),
            (_, Some(true)) => "soft".yellow().to_string(),
            (None, None) => NOT_AVAILABLE.to_string(),
            _ => "no".to_string(),
        };
        vec![
            self.path.clone(),
            bytes_or_not_available(self.hard_limit),
            self.soft_limit_percent
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            bytes_or_not_available(self.used_space),
            bytes_or_not_available(self.avail_space),
            exceeded,
        ]
    }
}

fn bytes_or_not_available(bytes: Option<u64>) -> String {
    bytes
        .map(human_bytes)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl TableRow for HealBrickInfo {
    fn headers() -> Vec<&'static str> {
        vec!["BRICK", "STATUS", "ENTRIES"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.entries
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_row_without_limit() {
        let limit = QuotaPathLimit {
            path: "/scratch".to_string(),
            hard_limit: None,
            soft_limit_percent: None,
            soft_limit_value: None,
            used_space: Some(4096),
            avail_space: None,
            soft_limit_exceeded: None,
            hard_limit_exceeded: None,
            error: None,
        };
        assert_eq!(
            limit.row(),
            vec!["/scratch", "N/A", "N/A", "4.0 KiB", "N/A", "N/A"]
        );
    }

    #[test]
    fn test_quota_row_within_limit() {
        let limit = QuotaPathLimit {
            path: "/data".to_string(),
            hard_limit: Some(1024),
            soft_limit_percent: Some("80%".to_string()),
            soft_limit_value: Some(819),
            used_space: Some(0),
            avail_space: Some(1024),
            soft_limit_exceeded: Some(false),
            hard_limit_exceeded: Some(false),
            error: None,
        };
        assert_eq!(
            limit.row(),
            vec!["/data", "1.0 KiB", "80%", "0 B", "1.0 KiB", "no"]
        );
    }
}
