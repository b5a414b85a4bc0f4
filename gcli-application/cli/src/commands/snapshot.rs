//! 快照命令

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::{GlusterClient, SnapshotInfo, SnapshotScope};

use super::output::{output_formatted, print_json, success, TableRow};
use crate::SnapshotAction;

pub async fn handle(client: &GlusterClient, action: SnapshotAction, format: &str) -> Result<()> {
    match action {
        SnapshotAction::List { volume } => {
            let names = client.snapshot_list(volume.as_deref()).await?;
            if format == "json" {
                return print_json(&names);
            }
            if names.is_empty() {
                println!("{}", "没有快照".yellow());
            }
            for name in names {
                println!("{}", name);
            }
        }
        SnapshotAction::Info { snapshot } => {
            let scope = snapshot
                .as_deref()
                .map(SnapshotScope::Snapshot)
                .unwrap_or(SnapshotScope::All);
            let snapshots = client.snapshot_info(scope).await?;
            output_formatted(&snapshots, format)?;
        }
        SnapshotAction::Create {
            snapshot,
            volume,
            description,
            no_timestamp,
            force,
        } => {
            client
                .snapshot_create(&volume, &snapshot, no_timestamp, description.as_deref(), force)
                .await?;
            success(&format!(
                "卷 {} 的快照 {} 创建成功",
                volume.cyan().bold(),
                snapshot.yellow()
            ));
        }
        SnapshotAction::Delete { snapshot } => {
            client.snapshot_delete(SnapshotScope::Snapshot(&snapshot)).await?;
            success(&format!("快照 {} 已删除", snapshot.yellow()));
        }
        SnapshotAction::Restore { snapshot } => {
            client.snapshot_restore(&snapshot).await?;
            success(&format!("快照 {} 已恢复", snapshot.yellow()));
        }
    }
    Ok(())
}

impl TableRow for SnapshotInfo {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "VOLUME", "STATUS", "CREATED", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        let volume = self.volumes.first();
        vec![
            self.name.clone(),
            volume
                .and_then(|v| v.origin.as_ref())
                .map(|o| o.name.clone())
                .unwrap_or_default(),
            volume.map(|v| v.status.clone()).unwrap_or_default(),
            self.create_time.clone(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}
