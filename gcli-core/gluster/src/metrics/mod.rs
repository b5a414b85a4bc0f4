//! 本机指标采集
//!
//! 只读取本机信息：gluster 进程、本机 brick 的文件系统使用量和磁盘 IO 统计。
//! 判断 brick 是否属于本机依赖 `glusterd.info` 中的节点 UUID，
//! 因此这些方法应在不带远程目标的客户端上调用。

mod diskstats;
mod process;
mod utilization;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::GlusterClient;
use crate::error::Result;
use crate::models::VolumeInfo;

pub use diskstats::{parse_diskstats, BrickDiskStats, DiskStat};
pub use process::{
    local_processes, parse_ps_line, GsyncdRole, ProcessDetails, ProcessInfo, PsRow,
};
pub use utilization::BrickUtilization;

/// 本机节点 UUID 所在文件
pub const GLUSTERD_INFO_PATH: &str = "/var/lib/glusterd/glusterd.info";

/// 属于本机的 brick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBrick {
    pub volume: String,
    /// 在卷 brick 列表中的下标
    pub brick_index: usize,
    pub node_id: String,
    /// `host:path`
    pub brick: String,
}

impl LocalBrick {
    /// brick 在本机上的路径
    pub fn path(&self) -> &str {
        self.brick
            .split_once(':')
            .map(|(_, path)| path)
            .unwrap_or(&self.brick)
    }
}

/// 从 `glusterd.info` 内容中取出 `UUID=`
pub fn parse_node_id(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("UUID="))
        .map(|uuid| uuid.trim().to_string())
        .filter(|uuid| !uuid.is_empty())
}

/// 读取本机节点 UUID
pub async fn read_node_id(path: impl AsRef<Path>) -> Result<Option<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_node_id(&content))
}

/// 按节点 UUID 筛选本机 brick，保持卷和 brick 顺序
pub fn local_bricks(volumes: &[VolumeInfo], node_id: &str) -> Vec<LocalBrick> {
    volumes
        .iter()
        .flat_map(|volume| {
            volume
                .bricks
                .iter()
                .enumerate()
                .filter(|(_, brick)| brick.uuid == node_id)
                .map(|(idx, brick)| LocalBrick {
                    volume: volume.name.clone(),
                    brick_index: idx,
                    node_id: brick.uuid.clone(),
                    brick: brick.name.clone(),
                })
        })
        .collect()
}

impl GlusterClient {
    /// 列出本机 brick
    pub async fn local_bricks(&self, volume: Option<&str>) -> Result<Vec<LocalBrick>> {
        let node_id = read_node_id(GLUSTERD_INFO_PATH).await?;
        let Some(node_id) = node_id else {
            debug!("{} 中没有 UUID", GLUSTERD_INFO_PATH);
            return Ok(Vec::new());
        };
        let volumes = self.volume_info(volume).await?;
        Ok(local_bricks(&volumes, &node_id))
    }

    /// 本机 brick 的 statvfs 信息
    pub async fn local_utilization(&self, volume: Option<&str>) -> Result<Vec<BrickUtilization>> {
        let bricks = self.local_bricks(volume).await?;
        bricks.into_iter().map(utilization::statvfs_brick).collect()
    }

    /// 本机 brick 所在磁盘的 IO 统计
    pub async fn local_diskstats(&self, volume: Option<&str>) -> Result<Vec<BrickDiskStats>> {
        let bricks = self.local_bricks(volume).await?;
        diskstats::collect(bricks).await
    }
}
