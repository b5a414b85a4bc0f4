//! 卷管理命令

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::{
    BrickStatus, GlusterClient, GroupedVolumeStatus, TaskNodeStatus, TransportType, VolumeCreateOptions,
    VolumeInfo, VolumeOption,
};
use serde::Serialize;

use super::output::{self, health, human_bytes, output_formatted, print_json, print_table, TableRow};
use crate::{RebalanceAction, VolumeAction};

pub async fn handle(client: &GlusterClient, action: VolumeAction, format: &str) -> Result<()> {
    match action {
        VolumeAction::List => {
            for name in client.volume_list().await? {
                println!("{}", name);
            }
        }
        VolumeAction::Info { volume } => {
            let volumes = client.volume_info(volume.as_deref()).await?;
            output_formatted(&volumes, format)?;
        }
        VolumeAction::Status { volume, bricks } => {
            let grouped = client.volume_status_grouped(volume.as_deref()).await?;
            show_status(&grouped, bricks, format)?;
        }
        VolumeAction::Create {
            volume,
            bricks,
            replica,
            arbiter,
            disperse,
            redundancy,
            transport,
            force,
        } => {
            let options = VolumeCreateOptions {
                replica,
                arbiter,
                disperse,
                redundancy,
                transport: transport.parse::<TransportType>()?,
                force,
                ..Default::default()
            };
            client.volume_create(&volume, &bricks, &options).await?;
            output::success(&format!("卷 {} 创建成功", volume.cyan().bold()));
        }
        VolumeAction::Start { volume, force } => {
            client.volume_start(&volume, force).await?;
            output::success(&format!("卷 {} 已启动", volume.cyan().bold()));
        }
        VolumeAction::Stop { volume, force } => {
            client.volume_stop(&volume, force).await?;
            output::success(&format!("卷 {} 已停止", volume.cyan().bold()));
        }
        VolumeAction::Restart { volume, force } => {
            client.volume_restart(&volume, force).await?;
            output::success(&format!("卷 {} 已重启", volume.cyan().bold()));
        }
        VolumeAction::Delete { volume } => {
            client.volume_delete(&volume).await?;
            output::success(&format!("卷 {} 已删除", volume.cyan().bold()));
        }
        VolumeAction::Set { volume, key, value } => {
            client.volume_set(&volume, &[(key.clone(), value.clone())]).await?;
            output::success(&format!("{}: {} = {}", volume.cyan().bold(), key, value.yellow()));
        }
        VolumeAction::Get { volume, option } => {
            let options = client.volume_get(&volume, option.as_deref()).await?;
            output_formatted(&options, format)?;
        }
        VolumeAction::Reset { volume, option, force } => {
            client.volume_reset(&volume, option.as_deref(), force).await?;
            output::success(&format!(
                "{}: 已重置 {}",
                volume.cyan().bold(),
                option.as_deref().unwrap_or("全部选项")
            ));
        }
    }
    Ok(())
}

pub async fn handle_rebalance(
    client: &GlusterClient,
    action: RebalanceAction,
    format: &str,
) -> Result<()> {
    match action {
        RebalanceAction::Start { volume, fix_layout, force } => {
            if fix_layout {
                client.rebalance_fix_layout(&volume).await?;
            } else {
                client.rebalance_start(&volume, force).await?;
            }
            output::success(&format!("卷 {} 重平衡已启动", volume.cyan().bold()));
        }
        RebalanceAction::Stop { volume } => {
            client.rebalance_stop(&volume).await?;
            output::success(&format!("卷 {} 重平衡已停止", volume.cyan().bold()));
        }
        RebalanceAction::Status { volume } => {
            let status = client.rebalance_status(&volume).await?;
            if format == "json" {
                print_json(&status)?;
            } else {
                if let Some(id) = &status.task_id {
                    println!("任务: {}\n", id.yellow());
                }
                print_table(&status.nodes);
            }
        }
    }
    Ok(())
}

fn show_status(grouped: &[GroupedVolumeStatus], bricks: bool, format: &str) -> Result<()> {
    if format == "json" {
        return print_json(grouped);
    }

    if bricks {
        let rows: Vec<BrickRow<'_>> = grouped
            .iter()
            .flat_map(|v| {
                v.subvolumes.iter().flat_map(move |s| {
                    s.bricks.iter().map(move |b| BrickRow {
                        volume: &v.volume.name,
                        subvolume: &s.name,
                        brick: b,
                    })
                })
            })
            .collect();
        print_table(&rows);
    } else {
        print_table(grouped);
    }
    Ok(())
}

impl TableRow for VolumeInfo {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "TYPE", "STATUS", "BRICKS", "TRANSPORT", "SNAPSHOTS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{:?}", self.volume_type),
            format!("{:?}", self.status),
            self.brick_count.to_string(),
            self.transport.to_string(),
            self.snapshot_count.to_string(),
        ]
    }
}

impl TableRow for GroupedVolumeStatus {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "STATUS", "HEALTH", "SUBVOLUMES", "USED", "TOTAL", "INODES USED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.volume.name.clone(),
            format!("{:?}", self.volume.status),
            health(self.health),
            self.subvolumes.len().to_string(),
            human_bytes(self.usage.size_used),
            human_bytes(self.usage.size_total),
            format!("{}/{}", self.usage.inodes_used, self.usage.inodes_total),
        ]
    }
}

#[derive(Serialize)]
struct BrickRow<'a> {
    volume: &'a str,
    subvolume: &'a str,
    brick: &'a BrickStatus,
}

impl TableRow for BrickRow<'_> {
    fn headers() -> Vec<&'static str> {
        vec!["VOLUME", "SUBVOLUME", "BRICK", "ONLINE", "PID", "PORT", "USED", "TOTAL"]
    }

    fn row(&self) -> Vec<String> {
        let online = if self.brick.online {
            "Y".green().to_string()
        } else {
            "N".red().to_string()
        };
        vec![
            self.volume.to_string(),
            self.subvolume.to_string(),
            self.brick.name.clone(),
            online,
            self.brick
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.brick.ports.tcp.clone(),
            human_bytes(self.brick.size_used),
            human_bytes(self.brick.size_total),
        ]
    }
}

impl TableRow for VolumeOption {
    fn headers() -> Vec<&'static str> {
        vec!["OPTION", "VALUE"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.value.clone()]
    }
}

impl TableRow for TaskNodeStatus {
    fn headers() -> Vec<&'static str> {
        vec!["NODE", "FILES", "SIZE", "SCANNED", "FAILURES", "SKIPPED", "STATUS", "RUNTIME"]
    }

    fn row(&self) -> Vec<String> {
        let c = &self.counters;
        vec![
            self.name.clone(),
            c.files.to_string(),
            human_bytes(c.size),
            c.lookups.to_string(),
            c.failures.to_string(),
            c.skipped.to_string(),
            c.status.clone(),
            format!("{:.0}s", c.runtime),
        ]
    }
}
