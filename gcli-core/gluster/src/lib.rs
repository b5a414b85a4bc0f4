//! GCLI Gluster 客户端库
//!
//! 把 gluster 管理命令封装成类型化的异步方法：
//! - 构造命令（子系统前缀、条件参数、`--xml`）
//! - 本机子进程或 SSH 远程执行，统一归一化退出码与 XML 内嵌的 `opRet`
//! - 解析 XML 输出为类型化记录
//! - 合并卷拓扑与运行时状态：子卷分组、健康度、容量、geo-replication 离线补齐
//! - 本机指标：进程、brick 使用量、磁盘 IO
//!
//! # 示例
//!
//! ```ignore
//! use gcli_gluster::{GlusterClient, GlusterConfig, RemoteTarget};
//!
//! let client = GlusterClient::new(GlusterConfig::default());
//!
//! // 本机执行
//! for volume in client.volume_status_grouped(None).await? {
//!     println!("{}: {}", volume.volume.name, volume.health);
//! }
//!
//! // 在作用域内切换到远程节点
//! {
//!     let session = client.remote_session(RemoteTarget::new("node1", "/root/.ssh/id_rsa"));
//!     session.volume_start("gv0", false).await?;
//! }
//! ```

pub mod aggregate;
mod client;
mod command;
mod config;
mod error;
mod executor;
pub mod metrics;
pub mod models;
mod normalize;
pub mod ops;
mod params;
pub mod parser;

pub use client::{GlusterClient, RemoteSession};
pub use command::{GlusterCommand, Subsystem};
pub use config::{GlusterConfig, RemoteTarget, DEFAULT_GLUSTER_PATH};
pub use error::{GlusterError, Result};
pub use executor::{CommandExecutor, CommandRunner, ExecRequest, ExecutionResult};
pub use models::*;
pub use normalize::normalize;
pub use ops::bricks::RemoveBrickAction;
pub use ops::georep::{GeorepCreateOptions, GeorepSlave};
pub use ops::heal::SplitBrainPolicy;
pub use ops::snapshot::{SnapshotConfig, SnapshotScope};
pub use ops::tier::TierDetachAction;
pub use ops::volume::{LockRange, VolumeCreateOptions};
pub use params::{
    HealInfoType, LockKind, ProfileInfoOp, ScrubFrequency, ScrubThrottle, TransportType,
};
pub use parser::format_block_size;
