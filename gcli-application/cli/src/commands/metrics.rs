//! 本机指标命令

use anyhow::Result;
use gcli_gluster::metrics::{local_processes, BrickDiskStats, BrickUtilization, ProcessDetails, ProcessInfo};
use gcli_gluster::GlusterClient;

use super::output::{human_bytes, output_formatted, TableRow};
use crate::MetricsAction;

pub async fn handle(client: &GlusterClient, action: MetricsAction, format: &str) -> Result<()> {
    match action {
        MetricsAction::Processes => output_formatted(&local_processes().await?, format)?,
        MetricsAction::Utilization { volume } => {
            let bricks = client.local_utilization(volume.as_deref()).await?;
            output_formatted(&bricks, format)?;
        }
        MetricsAction::Diskstats { volume } => {
            let bricks = client.local_diskstats(volume.as_deref()).await?;
            output_formatted(&bricks, format)?;
        }
    }
    Ok(())
}

fn describe(info: &ProcessInfo) -> (&'static str, String) {
    match info {
        ProcessInfo::Glusterd { .. } => ("glusterd", String::new()),
        ProcessInfo::Glusterfsd {
            volume, brick_path, ..
        } => (
            "glusterfsd",
            format!(
                "{}:{}",
                volume.as_deref().unwrap_or("?"),
                brick_path.as_deref().unwrap_or("?")
            ),
        ),
        ProcessInfo::Gsyncd { role } => (
            "gsyncd",
            role.as_ref()
                .map(|r| format!("{:?}", r).to_lowercase())
                .unwrap_or_default(),
        ),
        ProcessInfo::Glustereventsd => ("glustereventsd", String::new()),
    }
}

impl TableRow for ProcessDetails {
    fn headers() -> Vec<&'static str> {
        vec!["PID", "NAME", "DETAIL", "CPU%", "MEM%", "RSS", "ELAPSED"]
    }

    fn row(&self) -> Vec<String> {
        let (name, detail) = describe(&self.info);
        vec![
            self.pid.to_string(),
            name.to_string(),
            detail,
            format!("{:.1}", self.percentage_cpu),
            format!("{:.1}", self.percentage_memory),
            human_bytes(self.resident_memory.saturating_mul(1024)),
            format!("{}s", self.elapsed_time_sec),
        ]
    }
}

impl TableRow for BrickUtilization {
    fn headers() -> Vec<&'static str> {
        vec!["VOLUME", "BRICK", "SIZE", "USED", "AVAILABLE", "INODES USED"]
    }

    fn row(&self) -> Vec<String> {
        let size = self.block_size.saturating_mul(self.blocks_total);
        let used = self
            .block_size
            .saturating_mul(self.blocks_total.saturating_sub(self.blocks_free));
        let avail = self.block_size.saturating_mul(self.blocks_avail);
        vec![
            self.brick.volume.clone(),
            self.brick.brick.clone(),
            human_bytes(size),
            human_bytes(used),
            human_bytes(avail),
            format!(
                "{}/{}",
                self.inodes_total.saturating_sub(self.inodes_free),
                self.inodes_total
            ),
        ]
    }
}

impl TableRow for BrickDiskStats {
    fn headers() -> Vec<&'static str> {
        vec!["VOLUME", "BRICK", "DEVICE", "READS", "WRITES", "IO MS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.brick.volume.clone(),
            self.brick.brick.clone(),
            self.device.clone(),
            self.stats.reads_completed.to_string(),
            self.stats.writes_completed.to_string(),
            self.stats.time_spent_doing_ios.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcli_gluster::metrics::GsyncdRole;

    #[test]
    fn test_describe_brick_process() {
        let info = ProcessInfo::Glusterfsd {
            node_id: None,
            server: Some("node1".to_string()),
            brick_path: Some("/bricks/b1".to_string()),
            volume: Some("gv0".to_string()),
        };
        assert_eq!(describe(&info), ("glusterfsd", "gv0:/bricks/b1".to_string()));
    }

    #[test]
    fn test_describe_gsyncd_role() {
        let info = ProcessInfo::Gsyncd {
            role: Some(GsyncdRole::Worker),
        };
        assert_eq!(describe(&info), ("gsyncd", "worker".to_string()));
    }
}
