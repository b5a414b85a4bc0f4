//! 本机 brick 所在磁盘的 IO 统计（`/proc/diskstats`）

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use super::LocalBrick;
use crate::error::Result;

const PROC_DISKSTATS: &str = "/proc/diskstats";
const UNKNOWN: &str = "unknown";

/// `/proc/diskstats` 的一行，时间单位为毫秒
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStat {
    pub major_number: u64,
    pub minor_number: u64,
    pub reads_completed: u64,
    pub reads_merged: u64,
    pub sectors_read: u64,
    pub time_spent_reading: u64,
    pub writes_completed: u64,
    pub writes_merged: u64,
    pub sectors_written: u64,
    pub time_spent_writing: u64,
    pub ios_currently_in_progress: u64,
    pub time_spent_doing_ios: u64,
    pub weighted_time_spent_doing_ios: u64,
}

/// 单个 brick 的磁盘统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickDiskStats {
    #[serde(flatten)]
    pub brick: LocalBrick,
    /// `df --output=source` 给出的源设备
    pub fs: String,
    /// 设备名（解析符号链接后），如 `dm-0`
    pub device: String,
    #[serde(flatten)]
    pub stats: DiskStat,
}

/// 按设备名索引 `/proc/diskstats`，列数不足的行跳过
pub fn parse_diskstats(content: &str) -> HashMap<String, DiskStat> {
    let mut stats = HashMap::new();
    for line in content.lines() {
        let row: Vec<&str> = line.split_whitespace().collect();
        if row.len() < 14 {
            continue;
        }
        let n = |idx: usize| row[idx].parse::<u64>().unwrap_or(0);
        stats.insert(
            row[2].to_string(),
            DiskStat {
                major_number: n(0),
                minor_number: n(1),
                reads_completed: n(3),
                reads_merged: n(4),
                sectors_read: n(5),
                time_spent_reading: n(6),
                writes_completed: n(7),
                writes_merged: n(8),
                sectors_written: n(9),
                time_spent_writing: n(10),
                ios_currently_in_progress: n(11),
                time_spent_doing_ios: n(12),
                weighted_time_spent_doing_ios: n(13),
            },
        );
    }
    stats
}

/// `df` 输出的最后一行（第一行是表头）
fn df_source(stdout: &str) -> Option<String> {
    stdout
        .trim()
        .lines()
        .last()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

/// 源设备对应的设备名；`/dev/mapper/*` 之类的符号链接取其目标
async fn device_name(source: &str) -> String {
    let target = match tokio::fs::symlink_metadata(source).await {
        Ok(meta) if meta.file_type().is_symlink() => tokio::fs::read_link(source)
            .await
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| source.to_string()),
        _ => source.to_string(),
    };
    Path::new(&target)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(target)
}

async fn brick_source(path: &str) -> Option<String> {
    let output = Command::new("df")
        .arg("--output=source")
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await;
    match output {
        Ok(out) if out.status.success() => df_source(&String::from_utf8_lossy(&out.stdout)),
        Ok(out) => {
            warn!(
                "df {} 失败: {}",
                path,
                String::from_utf8_lossy(&out.stderr).trim()
            );
            None
        }
        Err(e) => {
            warn!("无法执行 df: {}", e);
            None
        }
    }
}

pub(super) async fn collect(bricks: Vec<LocalBrick>) -> Result<Vec<BrickDiskStats>> {
    let content = tokio::fs::read_to_string(PROC_DISKSTATS).await?;
    let table = parse_diskstats(&content);
    debug!("{} 中有 {} 个设备", PROC_DISKSTATS, table.len());

    let mut result = Vec::with_capacity(bricks.len());
    for brick in bricks {
        let entry = match brick_source(brick.path()).await {
            Some(fs) => {
                let device = device_name(&fs).await;
                let stats = table.get(&device).cloned().unwrap_or_default();
                BrickDiskStats {
                    brick,
                    fs,
                    device,
                    stats,
                }
            }
            None => BrickDiskStats {
                brick,
                fs: UNKNOWN.to_string(),
                device: UNKNOWN.to_string(),
                stats: DiskStat::default(),
            },
        };
        result.push(entry);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS: &str = "\
 253       0 vda 12034 40 912340 5120 8812 3021 402112 9021 0 10230 14141 0 0 0 0
 253       1 vda1 11900 40 910000 5100 8800 3021 402000 9000 0 10200 14100
 252       0 dm-0 300 0 2400 10 20 0 160 5 1 15 15
   7       0 loop0 1
";

    #[test]
    fn test_parse_diskstats() {
        let stats = parse_diskstats(DISKSTATS);
        assert_eq!(stats.len(), 3);
        let vda = &stats["vda"];
        assert_eq!(vda.major_number, 253);
        assert_eq!(vda.reads_completed, 12034);
        assert_eq!(vda.sectors_written, 402112);
        assert_eq!(vda.weighted_time_spent_doing_ios, 14141);
        assert_eq!(stats["dm-0"].ios_currently_in_progress, 1);
        assert!(!stats.contains_key("loop0"));
    }

    #[test]
    fn test_df_source_skips_header() {
        assert_eq!(
            df_source("Filesystem\n/dev/mapper/vg-bricks\n").as_deref(),
            Some("/dev/mapper/vg-bricks")
        );
        assert_eq!(df_source(""), None);
    }

    #[tokio::test]
    async fn test_device_name_of_plain_path() {
        assert_eq!(device_name("/nonexistent/dev/sdz1").await, "sdz1");
    }
}
