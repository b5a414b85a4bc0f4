//! 本机 brick 文件系统使用量

use nix::sys::statvfs::statvfs;
use serde::{Deserialize, Serialize};

use super::LocalBrick;
use crate::error::Result;

/// 单个 brick 的 statvfs 信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickUtilization {
    #[serde(flatten)]
    pub brick: LocalBrick,
    /// f_frsize
    pub block_size: u64,
    pub blocks_total: u64,
    pub blocks_free: u64,
    pub blocks_avail: u64,
    pub inodes_total: u64,
    pub inodes_free: u64,
    pub inodes_avail: u64,
}

pub(super) fn statvfs_brick(brick: LocalBrick) -> Result<BrickUtilization> {
    let stat = statvfs(brick.path()).map_err(std::io::Error::from)?;
    Ok(BrickUtilization {
        block_size: stat.fragment_size() as u64,
        blocks_total: stat.blocks() as u64,
        blocks_free: stat.blocks_free() as u64,
        blocks_avail: stat.blocks_available() as u64,
        inodes_total: stat.files() as u64,
        inodes_free: stat.files_free() as u64,
        inodes_avail: stat.files_available() as u64,
        brick,
    })
}
