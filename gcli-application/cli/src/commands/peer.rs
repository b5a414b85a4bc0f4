//! 集群节点命令

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::{GlusterClient, PeerRecord};

use super::output::{output_formatted, success, TableRow};
use crate::PeerAction;

pub async fn handle(client: &GlusterClient, action: PeerAction, format: &str) -> Result<()> {
    match action {
        PeerAction::Status => output_formatted(&client.peer_status().await?, format)?,
        PeerAction::Pool => output_formatted(&client.peer_pool().await?, format)?,
        PeerAction::Probe { host } => {
            let message = client.peer_probe(&host).await?;
            success(&format!("{}: {}", host.cyan().bold(), message));
        }
        PeerAction::Detach { host } => {
            let message = client.peer_detach(&host).await?;
            success(&format!("{}: {}", host.cyan().bold(), message));
        }
        PeerAction::DetachAll => {
            let message = client.peer_detach_all().await?;
            success(&message);
        }
    }
    Ok(())
}

impl TableRow for PeerRecord {
    fn headers() -> Vec<&'static str> {
        vec!["UUID", "HOSTNAME", "CONNECTED", "STATE"]
    }

    fn row(&self) -> Vec<String> {
        let connected = if self.is_connected() {
            "Connected".green().to_string()
        } else {
            "Disconnected".red().to_string()
        };
        vec![
            self.uuid.clone(),
            self.hostname.clone(),
            connected,
            self.state.clone().unwrap_or_default(),
        ]
    }
}
