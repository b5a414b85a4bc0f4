//! geo-replication 命令

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::{GeorepPairStatus, GeorepSlave, GlusterClient};

use super::output::{print_json, print_table, success, TableRow};
use crate::GeorepAction;

pub async fn handle(client: &GlusterClient, action: GeorepAction, format: &str) -> Result<()> {
    match action {
        GeorepAction::Status {
            volume,
            slave_host,
            slave_volume,
            slave_user,
        } => {
            let slave = slave_host
                .zip(slave_volume)
                .map(|(host, vol)| GeorepSlave::new(host, vol).user(slave_user));
            let sessions = client
                .georep_status(volume.as_deref(), slave.as_ref())
                .await?;

            if format == "json" {
                return print_json(&sessions);
            }
            if sessions.is_empty() {
                println!("{}", "没有 geo-replication 会话".yellow());
            }
            for session in &sessions {
                println!(
                    "{} {} {}",
                    session.master_volume.cyan().bold(),
                    "->".bright_black(),
                    session.slave.cyan()
                );
                print_table(&session.pairs);
                println!();
            }
        }
        GeorepAction::Start {
            volume,
            slave_host,
            slave_volume,
            slave_user,
            force,
        } => {
            let slave = GeorepSlave::new(slave_host, slave_volume).user(slave_user);
            client.georep_start(&volume, &slave, force).await?;
            success(&format!("会话 {} -> {} 已启动", volume.cyan().bold(), slave));
        }
        GeorepAction::Stop {
            volume,
            slave_host,
            slave_volume,
            slave_user,
            force,
        } => {
            let slave = GeorepSlave::new(slave_host, slave_volume).user(slave_user);
            client.georep_stop(&volume, &slave, force).await?;
            success(&format!("会话 {} -> {} 已停止", volume.cyan().bold(), slave));
        }
    }
    Ok(())
}

impl TableRow for GeorepPairStatus {
    fn headers() -> Vec<&'static str> {
        vec!["MASTER BRICK", "SLAVE NODE", "STATUS", "CRAWL", "LAST SYNCED"]
    }

    fn row(&self) -> Vec<String> {
        let status = match self.status.as_str() {
            "Active" | "Passive" => self.status.green().to_string(),
            "Offline" | "Faulty" => self.status.red().to_string(),
            _ => self.status.yellow().to_string(),
        };
        vec![
            self.brick_name(),
            self.slave_node.clone(),
            status,
            self.crawl_status.clone(),
            self.last_synced.clone(),
        ]
    }
}
