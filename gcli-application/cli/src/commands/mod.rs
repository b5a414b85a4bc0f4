//! CLI 命令处理模块

pub mod config;
pub mod features; // bitrot / quota / heal
pub mod georep;
pub mod metrics;
pub mod output; // 表格/JSON 输出
pub mod peer;
pub mod snapshot;
pub mod volume; // 卷与重平衡
