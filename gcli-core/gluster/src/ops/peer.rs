//! 集群节点管理

use tracing::{info, warn};

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::{GlusterError, Result};
use crate::models::PeerRecord;
use crate::parser::{parse_peer_status, parse_pool_list};

pub fn peer_probe_cmd(host: &str) -> GlusterCommand {
    GlusterCommand::peer().arg("probe").arg(host)
}

pub fn peer_detach_cmd(host: &str) -> GlusterCommand {
    GlusterCommand::peer().arg("detach").arg(host)
}

pub fn peer_status_cmd() -> GlusterCommand {
    GlusterCommand::peer().arg("status").xml()
}

/// `pool list` 没有 `peer` 前缀
pub fn pool_list_cmd() -> GlusterCommand {
    GlusterCommand::global().arg("pool").arg("list").xml()
}

impl GlusterClient {
    /// 把节点加入集群
    pub async fn peer_probe(&self, host: &str) -> Result<String> {
        self.execute(peer_probe_cmd(host)).await
    }

    /// `peer_probe` 的别名
    pub async fn peer_attach(&self, host: &str) -> Result<String> {
        self.peer_probe(host).await
    }

    /// 把节点移出集群
    pub async fn peer_detach(&self, host: &str) -> Result<String> {
        self.execute(peer_detach_cmd(host)).await
    }

    /// 移出所有节点
    ///
    /// 只对已连接的节点发起 detach；未连接的节点和失败的 detach
    /// 都会记为错误，全部处理完后合并成一个返回码为 1 的命令错误。
    /// 成功时返回每行 `<host> <输出>`。
    pub async fn peer_detach_all(&self) -> Result<String> {
        let peers = self.peer_status().await?;
        let mut outputs = Vec::new();
        let mut errors = Vec::new();

        for peer in &peers {
            if !peer.is_connected() {
                warn!("节点 {} 未连接，跳过", peer.hostname);
                errors.push(format!("{} is not connected", peer.hostname));
                continue;
            }
            match self.peer_detach(&peer.hostname).await {
                Ok(out) => outputs.push(format!("{} {}", peer.hostname, out)),
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !errors.is_empty() {
            return Err(GlusterError::command(1, "", errors.join("\n")));
        }
        info!("已移出 {} 个节点", outputs.len());
        Ok(outputs.join("\n"))
    }

    /// 查询其它节点的状态（不含本机）
    pub async fn peer_status(&self) -> Result<Vec<PeerRecord>> {
        let output = self.execute(peer_status_cmd()).await?;
        parse_peer_status(&output)
    }

    /// 查询集群所有节点（含本机）
    pub async fn peer_pool(&self) -> Result<Vec<PeerRecord>> {
        let output = self.execute(pool_list_cmd()).await?;
        parse_pool_list(&output)
    }
}
