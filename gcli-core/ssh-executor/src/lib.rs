//! GCLI SSH 执行器
//!
//! 提供 SSH 远程命令执行能力，支持：
//! - SSH 私钥认证 / 默认密钥认证
//! - 基于 ControlMaster 的主连接复用
//! - 命令执行和输出捕获
//!
//! # 示例
//!
//! ```ignore
//! use gcli_ssh_executor::{SshClient, SshConfig};
//!
//! let config = SshConfig::with_key("192.168.1.100", "root", "~/.ssh/gluster.pem");
//! let client = SshClient::connect(config).await?;
//! let output = client.execute("gluster --mode=script peer status").await?;
//! println!("{}", output.stdout);
//! ```

mod client;
mod config;
mod error;

pub use client::{shell_join, CommandOutput, SshClient};
pub use config::{duration_secs, AuthMethod, SshConfig};
pub use error::{Result, SshError};
