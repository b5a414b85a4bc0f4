//! 各子命令的封装
//!
//! 每个模块提供两层：
//! - `*_cmd` 纯函数：参数 → [`GlusterCommand`](crate::GlusterCommand)，不执行任何命令
//! - `GlusterClient` 上的异步方法：构造、执行、解析
//!
//! 枚举型参数以字符串传入的方法会先校验，失败时不会发起任何调用。

pub mod bitrot;
pub mod bricks;
pub mod georep;
pub mod heal;
pub mod peer;
pub mod quota;
pub mod rebalance;
pub mod snapshot;
pub mod system;
pub mod tier;
pub mod volume;

/// 非零时才输出的计数参数
pub(crate) fn nonzero(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}
