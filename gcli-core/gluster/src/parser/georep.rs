//! geo-replication 输出：status / config
//!
//! 这里只解析实时上报的会话；与卷拓扑对齐、补全离线记录在
//! [`crate::aggregate::reconcile_georep_status`] 中完成。

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use super::{element, from_xml, or_not_available, required};
use crate::error::Result;
use crate::models::{GeorepPairStatus, GeorepSession};

#[derive(Debug, Deserialize)]
struct GeorepOutput {
    #[serde(rename = "geoRep")]
    geo_rep: Option<RawGeoRep>,
}

#[derive(Debug, Deserialize)]
struct RawGeoRep {
    #[serde(default)]
    volume: Vec<RawGeorepVolume>,
}

#[derive(Debug, Deserialize)]
struct RawGeorepVolume {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sessions: RawSessions,
}

#[derive(Debug, Default, Deserialize)]
struct RawSessions {
    #[serde(default)]
    session: Vec<RawSession>,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    #[serde(default)]
    session_slave: String,
    #[serde(default)]
    pair: Vec<RawPair>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    #[serde(default)]
    master_node: String,
    #[serde(default)]
    master_brick: String,
    #[serde(default)]
    slave_user: String,
    #[serde(default)]
    slave: String,
    #[serde(default)]
    slave_node: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    crawl_status: String,
    #[serde(default)]
    entry: String,
    #[serde(default)]
    data: String,
    #[serde(default)]
    meta: String,
    #[serde(default)]
    failures: String,
    #[serde(default)]
    checkpoint_completed: String,
    #[serde(default)]
    master_node_uuid: String,
    #[serde(default)]
    last_synced: String,
    #[serde(default)]
    checkpoint_time: String,
    #[serde(default)]
    checkpoint_completion_time: String,
}

/// 从会话标识中取出 `user@host::volume`
///
/// 会话标识形如 `<主卷 uuid>:ssh://root@host::svol:<从卷 uuid>`，
/// 旧版本只有 `ssh://root@host::svol`。
pub fn session_slave_spec(session_slave: &str) -> String {
    let spec = session_slave.trim();
    let spec = match spec.find("://") {
        Some(idx) => &spec[idx + 3..],
        None => spec,
    };
    match spec.split_once("::") {
        Some((host, rest)) => {
            let volume = rest.split(':').next().unwrap_or(rest);
            format!("{}::{}", host, volume)
        }
        None => spec.to_string(),
    }
}

/// 从卷名：`::` 分隔的最后一段
pub(crate) fn slave_volume_of(slave: &str) -> String {
    slave.rsplit("::").next().unwrap_or(slave).to_string()
}

fn convert_pair(master_volume: &str, raw: RawPair) -> Result<GeorepPairStatus> {
    let slave = required(&raw.slave, "pair/slave")?;
    let slave = slave.strip_prefix("ssh://").unwrap_or(&slave).to_string();
    Ok(GeorepPairStatus {
        master_volume: master_volume.to_string(),
        slave_volume: slave_volume_of(&slave),
        master_node: required(&raw.master_node, "pair/master_node")?,
        master_brick: required(&raw.master_brick, "pair/master_brick")?,
        slave_user: or_not_available(&raw.slave_user),
        slave,
        slave_node: or_not_available(&raw.slave_node),
        status: required(&raw.status, "pair/status")?,
        crawl_status: or_not_available(&raw.crawl_status),
        entry: or_not_available(&raw.entry),
        data: or_not_available(&raw.data),
        meta: or_not_available(&raw.meta),
        failures: or_not_available(&raw.failures),
        checkpoint_completed: or_not_available(&raw.checkpoint_completed),
        master_node_uuid: or_not_available(&raw.master_node_uuid),
        last_synced: or_not_available(&raw.last_synced),
        checkpoint_time: or_not_available(&raw.checkpoint_time),
        checkpoint_completion_time: or_not_available(&raw.checkpoint_completion_time),
    })
}

/// 解析 `volume geo-replication ... status --xml`（`geoRep/volume/sessions/session/pair`）
///
/// 返回实时上报的会话，pair 顺序与输出一致，可能缺少离线 brick。
pub fn parse_georep_status(xml: &str) -> Result<Vec<GeorepSession>> {
    let output: GeorepOutput = from_xml(xml)?;
    let geo_rep = element(output.geo_rep, "geoRep")?;

    let mut sessions = Vec::new();
    for volume in geo_rep.volume {
        let master_volume = required(&volume.name, "volume/name")?;
        for session in volume.sessions.session {
            let slave = session_slave_spec(&required(&session.session_slave, "session_slave")?);
            let pairs = session
                .pair
                .into_iter()
                .map(|p| convert_pair(&master_volume, p))
                .collect::<Result<Vec<_>>>()?;
            sessions.push(GeorepSession {
                master_volume: master_volume.clone(),
                slave,
                pairs,
            });
        }
    }

    debug!("解析到 {} 个 geo-replication 会话", sessions.len());
    Ok(sessions)
}

#[derive(Debug, Deserialize)]
struct GeorepConfigOutput {
    #[serde(rename = "geoRep")]
    geo_rep: Option<RawGeorepConfig>,
}

#[derive(Debug, Deserialize)]
struct RawGeorepConfig {
    config: Option<BTreeMap<String, String>>,
}

/// 解析 `volume geo-replication ... config [key] --xml`（`geoRep/config/*`）
pub fn parse_georep_config(xml: &str) -> Result<BTreeMap<String, String>> {
    let output: GeorepConfigOutput = from_xml(xml)?;
    let config = element(element(output.geo_rep, "geoRep")?.config, "geoRep/config")?;
    Ok(config
        .into_iter()
        .map(|(k, v)| (k, v.trim().to_string()))
        .collect())
}
