//! Gluster 数据模型
//!
//! 所有解析结果都是显式类型：必需字段缺失在解析阶段报错，
//! 只有各版本间确实可能缺失的遥测字段才是 `Option` 或带默认值。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 离线或未知字段的占位值
pub const NOT_AVAILABLE: &str = "N/A";

/// 卷拓扑类型（由 typeStr 大写并把 `-` 替换为 `_` 得到）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeType {
    Distribute,
    Stripe,
    Replicate,
    StripedReplicate,
    Disperse,
    Tier,
    DistributedStripe,
    DistributedReplicate,
    DistributedStripedReplicate,
    DistributedDisperse,
}

impl VolumeType {
    /// 从 typeStr 解析（如 `Distributed-Replicate`）
    pub fn from_type_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        let value = match normalized.as_str() {
            "DISTRIBUTE" => Self::Distribute,
            "STRIPE" => Self::Stripe,
            "REPLICATE" => Self::Replicate,
            "STRIPED_REPLICATE" => Self::StripedReplicate,
            "DISPERSE" => Self::Disperse,
            "TIER" => Self::Tier,
            "DISTRIBUTED_STRIPE" => Self::DistributedStripe,
            "DISTRIBUTED_REPLICATE" => Self::DistributedReplicate,
            "DISTRIBUTED_STRIPED_REPLICATE" => Self::DistributedStripedReplicate,
            "DISTRIBUTED_DISPERSE" => Self::DistributedDisperse,
            _ => return None,
        };
        Some(value)
    }
}

/// 卷状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeState {
    Created,
    Started,
    Stopped,
}

impl VolumeState {
    /// 从 statusStr 解析
    pub fn from_status_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Created" => Some(Self::Created),
            "Started" => Some(Self::Started),
            "Stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

/// 卷传输类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "RDMA")]
    Rdma,
    #[serde(rename = "TCP,RDMA")]
    TcpRdma,
}

impl Transport {
    /// 由 XML 中的数字编码转换："0" → TCP，"1" → RDMA，其它 → TCP,RDMA
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Tcp,
            "1" => Self::Rdma,
            _ => Self::TcpRdma,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Rdma => "RDMA",
            Self::TcpRdma => "TCP,RDMA",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Brick 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrickType {
    #[default]
    Brick,
    Arbiter,
}

/// 拆分 `host:path` 形式的 brick 名
pub fn split_brick_name(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or((name, ""))
}

/// 卷拓扑中的一个 brick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickRef {
    /// `host:path`，卷内唯一
    pub name: String,
    /// 所属节点 UUID
    pub uuid: String,
    pub brick_type: BrickType,
}

impl BrickRef {
    pub fn hostname(&self) -> &str {
        split_brick_name(&self.name).0
    }

    pub fn path(&self) -> &str {
        split_brick_name(&self.name).1
    }

    pub fn is_arbiter(&self) -> bool {
        self.brick_type == BrickType::Arbiter
    }
}

/// 卷选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeOption {
    pub name: String,
    pub value: String,
}

/// 卷信息（`volume info`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub uuid: String,
    pub volume_type: VolumeType,
    pub status: VolumeState,
    pub brick_count: u32,
    pub distribute_count: u32,
    pub stripe_count: u32,
    pub replica_count: u32,
    pub arbiter_count: u32,
    pub disperse_count: u32,
    pub disperse_redundancy_count: u32,
    pub transport: Transport,
    pub snapshot_count: u32,
    /// 按拓扑顺序排列
    pub bricks: Vec<BrickRef>,
    /// 按输出顺序排列
    pub options: Vec<VolumeOption>,
}

impl VolumeInfo {
    /// 查找选项值
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }

    /// 每个子卷包含的 brick 数
    pub fn subvol_brick_count(&self) -> u32 {
        if self.replica_count > 1 {
            self.replica_count
        } else if self.disperse_count > 0 {
            self.disperse_count
        } else {
            1
        }
    }
}

/// Brick 端口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickPorts {
    pub tcp: String,
    pub rdma: String,
}

impl BrickPorts {
    /// 两个端口都不可用
    pub fn unavailable() -> Self {
        Self {
            tcp: NOT_AVAILABLE.to_string(),
            rdma: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Brick 运行状态（`volume status detail` 与拓扑合并后）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickStatus {
    /// `host:path`
    pub name: String,
    pub hostname: String,
    pub path: String,
    pub uuid: String,
    pub brick_type: BrickType,
    pub online: bool,
    pub pid: Option<u32>,
    pub ports: BrickPorts,
    pub size_total: u64,
    pub size_free: u64,
    pub size_used: u64,
    pub inodes_total: u64,
    pub inodes_free: u64,
    pub inodes_used: u64,
    pub device: String,
    pub block_size: u64,
    pub mount_options: String,
    pub fs_name: String,
}

impl BrickStatus {
    /// 离线默认记录：保留拓扑中的身份字段，其余清零或置为 N/A
    pub fn offline(brick: &BrickRef) -> Self {
        Self {
            name: brick.name.clone(),
            hostname: brick.hostname().to_string(),
            path: brick.path().to_string(),
            uuid: brick.uuid.clone(),
            brick_type: brick.brick_type,
            online: false,
            pid: None,
            ports: BrickPorts::unavailable(),
            size_total: 0,
            size_free: 0,
            size_used: 0,
            inodes_total: 0,
            inodes_free: 0,
            inodes_used: 0,
            device: NOT_AVAILABLE.to_string(),
            block_size: 0,
            mount_options: NOT_AVAILABLE.to_string(),
            fs_name: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_arbiter(&self) -> bool {
        self.brick_type == BrickType::Arbiter
    }
}

/// 合并后的卷状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStatus {
    pub volume: VolumeInfo,
    /// 与 `volume.bricks` 等长同序
    pub bricks: Vec<BrickStatus>,
}

/// 健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Up,
    Degraded,
    Partial,
    Down,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Up => "up",
            Self::Degraded => "degraded",
            Self::Partial => "partial",
            Self::Down => "down",
        };
        f.write_str(s)
    }
}

/// 子卷冗余模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubvolumeType {
    Replicate,
    Disperse,
    Distribute,
}

impl SubvolumeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replicate => "replicate",
            Self::Disperse => "disperse",
            Self::Distribute => "distribute",
        }
    }
}

/// 子卷：共享一个冗余单元的一组连续 brick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subvolume {
    /// `{volume}-{type}-{index}`
    pub name: String,
    pub subvol_type: SubvolumeType,
    pub replica_count: u32,
    pub disperse_count: u32,
    pub disperse_redundancy_count: u32,
    pub bricks: Vec<BrickStatus>,
    pub health: HealthState,
}

/// 容量与 inode 汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub size_total: u64,
    pub size_used: u64,
    pub size_free: u64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
}

/// 按子卷分组后的卷状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedVolumeStatus {
    pub volume: VolumeInfo,
    pub subvolumes: Vec<Subvolume>,
    pub health: HealthState,
    pub usage: VolumeUsage,
}

/// 节点连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerState {
    Connected,
    Disconnected,
}

/// 集群节点（`peer status` / `pool list`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub uuid: String,
    pub hostname: String,
    pub connected: PeerState,
    /// 如 `Peer in Cluster`
    pub state: Option<String>,
}

impl PeerRecord {
    pub fn is_connected(&self) -> bool {
        self.connected == PeerState::Connected
    }
}

/// profile 块大小统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStat {
    /// 格式化后的块大小（如 `4KB`）
    pub size: String,
    pub reads: u64,
    pub writes: u64,
}

/// profile 文件操作统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FopStat {
    pub name: String,
    pub hits: u64,
    pub max_latency: f64,
    pub min_latency: f64,
    pub avg_latency: f64,
}

/// 一段时间内的 profile 统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub block_stats: Vec<BlockStat>,
    pub fop_stats: Vec<FopStat>,
    pub total_read_bytes: u64,
    pub total_write_bytes: u64,
    pub duration: u64,
}

/// 单个 brick 的 profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickProfile {
    pub brick_name: String,
    pub cumulative: Option<ProfileStats>,
    pub interval: Option<ProfileStats>,
}

/// 清除统计后的单个 brick 结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickProfileClear {
    pub brick_name: String,
    pub clear_stats: String,
}

/// `volume profile info` 结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VolumeProfile {
    Stats {
        volume: String,
        bricks: Vec<BrickProfile>,
    },
    Cleared {
        volume: String,
        bricks: Vec<BrickProfileClear>,
    },
}

/// rebalance / remove-brick 计数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCounters {
    pub files: u64,
    pub size: u64,
    pub lookups: u64,
    pub failures: u64,
    pub skipped: u64,
    pub status_code: i32,
    pub status: String,
    /// 秒
    pub runtime: f64,
}

/// 单个节点上的任务进度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNodeStatus {
    pub name: String,
    pub id: String,
    #[serde(flatten)]
    pub counters: TaskCounters,
}

/// rebalance / remove-brick 状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: Option<String>,
    pub nodes: Vec<TaskNodeStatus>,
    pub aggregate: TaskCounters,
}

/// 目录容量配额
///
/// 未设置限额的目录各限额字段为 `N/A`，解析为 `None`；
/// 无法统计的目录只带 `error`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaPathLimit {
    pub path: String,
    pub hard_limit: Option<u64>,
    /// 如 `80%`
    pub soft_limit_percent: Option<String>,
    pub soft_limit_value: Option<u64>,
    pub used_space: Option<u64>,
    pub avail_space: Option<u64>,
    pub soft_limit_exceeded: Option<bool>,
    pub hard_limit_exceeded: Option<bool>,
    /// `<errstr>`，如 `No such file or directory`
    pub error: Option<String>,
}

/// 目录对象数配额
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaObjectLimit {
    pub path: String,
    pub hard_limit: Option<u64>,
    pub soft_limit_percent: Option<String>,
    pub soft_limit_value: Option<u64>,
    pub file_count: Option<u64>,
    pub dir_count: Option<u64>,
    pub available: Option<u64>,
    pub soft_limit_exceeded: Option<bool>,
    pub hard_limit_exceeded: Option<bool>,
    pub error: Option<String>,
}

/// 待修复条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealEntry {
    pub gfid: Option<String>,
    pub path: String,
}

/// 单个 brick 的 heal 信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealBrickInfo {
    pub name: String,
    pub host_uuid: String,
    pub status: String,
    /// brick 不可达时为 None（输出为 `-`）
    pub entries: Option<u64>,
    pub files: Vec<HealEntry>,
}

/// 快照的源卷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotOrigin {
    pub name: String,
    pub snap_count: u32,
    pub snap_remaining: u32,
}

/// 快照卷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVolume {
    pub name: String,
    pub status: String,
    pub origin: Option<SnapshotOrigin>,
}

/// `snapshot info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub name: String,
    pub uuid: String,
    pub description: Option<String>,
    pub create_time: String,
    pub volumes: Vec<SnapshotVolume>,
}

/// 快照 brick 状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBrickStatus {
    pub path: String,
    pub volume_group: Option<String>,
    pub running: bool,
    pub pid: Option<u32>,
    pub data_percentage: Option<String>,
    pub lv_size: Option<String>,
}

/// `snapshot status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStatus {
    pub name: String,
    pub uuid: String,
    pub bricks: Vec<SnapshotBrickStatus>,
}

/// 单个节点的 scrub 状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubNodeStatus {
    pub node: String,
    pub scrub_running: Option<String>,
    pub scrubbed_files: u64,
    pub skipped_files: u64,
    pub last_completed_time: Option<String>,
    pub last_duration: Option<String>,
    pub error_count: u64,
}

/// `volume bitrot <vol> scrub status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubStatus {
    pub volume: String,
    pub state: Option<String>,
    pub throttle: Option<String>,
    pub frequency: Option<String>,
    pub bitrot_log_file: Option<String>,
    pub scrub_log_file: Option<String>,
    pub nodes: Vec<ScrubNodeStatus>,
}

/// geo-replication 单个主 brick 的同步状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeorepPairStatus {
    pub master_volume: String,
    pub slave_volume: String,
    pub master_node: String,
    pub master_brick: String,
    pub slave_user: String,
    pub slave: String,
    pub slave_node: String,
    pub status: String,
    pub crawl_status: String,
    pub entry: String,
    pub data: String,
    pub meta: String,
    pub failures: String,
    pub checkpoint_completed: String,
    pub master_node_uuid: String,
    pub last_synced: String,
    pub checkpoint_time: String,
    pub checkpoint_completion_time: String,
}

impl GeorepPairStatus {
    /// `master_node:master_brick`
    pub fn brick_name(&self) -> String {
        format!("{}:{}", self.master_node, self.master_brick)
    }
}

/// geo-replication 会话（主卷 + 从端）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeorepSession {
    pub master_volume: String,
    /// `user@host::volume`
    pub slave: String,
    /// 与主卷 brick 顺序一致
    pub pairs: Vec<GeorepPairStatus>,
}
