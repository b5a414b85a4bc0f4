//! 各功能子命令的输出：peer / quota / heal / snapshot / bitrot

use serde::Deserialize;
use tracing::debug;

use super::{
    available, element, from_xml, number, number_or_default, number_or_none, optional, required,
};
use crate::error::{GlusterError, Result};
use crate::models::{
    HealBrickInfo, HealEntry, PeerRecord, PeerState, QuotaObjectLimit, QuotaPathLimit,
    ScrubNodeStatus, ScrubStatus, SnapshotBrickStatus, SnapshotInfo, SnapshotOrigin,
    SnapshotStatus, SnapshotVolume,
};

// ---- peer status / pool list ----

#[derive(Debug, Deserialize)]
struct PeerStatusOutput {
    #[serde(rename = "peerStatus")]
    peer_status: Option<RawPeerStatus>,
}

#[derive(Debug, Deserialize)]
struct RawPeerStatus {
    #[serde(default)]
    peer: Vec<RawPeer>,
}

#[derive(Debug, Deserialize)]
struct RawPeer {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    connected: String,
    #[serde(rename = "stateStr", default)]
    state_str: String,
}

fn convert_peer(raw: RawPeer) -> Result<PeerRecord> {
    let connected = match raw.connected.trim() {
        "0" => PeerState::Disconnected,
        "1" => PeerState::Connected,
        other => {
            return Err(GlusterError::ParseError(format!(
                "未知的 connected 取值: {}",
                other
            )))
        }
    };
    Ok(PeerRecord {
        uuid: required(&raw.uuid, "peer/uuid")?,
        hostname: required(&raw.hostname, "peer/hostname")?,
        connected,
        state: optional(&raw.state_str),
    })
}

fn parse_peers(xml: &str) -> Result<Vec<PeerRecord>> {
    let output: PeerStatusOutput = from_xml(xml)?;
    element(output.peer_status, "peerStatus")?
        .peer
        .into_iter()
        .map(convert_peer)
        .collect()
}

/// 解析 `peer status --xml`（`peerStatus/peer`）
pub fn parse_peer_status(xml: &str) -> Result<Vec<PeerRecord>> {
    parse_peers(xml)
}

/// 解析 `pool list --xml`，结构与 peer status 相同，包含本机
pub fn parse_pool_list(xml: &str) -> Result<Vec<PeerRecord>> {
    parse_peers(xml)
}

// ---- quota list ----

#[derive(Debug, Deserialize)]
struct QuotaOutput {
    #[serde(rename = "volQuota")]
    vol_quota: Option<RawQuota>,
}

#[derive(Debug, Deserialize)]
struct RawQuota {
    #[serde(default)]
    limit: Vec<RawLimit>,
}

#[derive(Debug, Deserialize)]
struct RawLimit {
    #[serde(default)]
    path: String,
    #[serde(default)]
    hard_limit: String,
    #[serde(default)]
    soft_limit_percent: String,
    #[serde(default)]
    soft_limit_value: String,
    #[serde(default)]
    used_space: String,
    #[serde(default)]
    avail_space: String,
    #[serde(default)]
    file_count: String,
    #[serde(default)]
    dir_count: String,
    #[serde(default)]
    available: String,
    #[serde(default)]
    sl_exceeded: String,
    #[serde(default)]
    hl_exceeded: String,
    #[serde(default)]
    errstr: String,
}

/// Yes/No 标志，缺失或 N/A 时为 None
fn yes_no(value: &str, field: &'static str) -> Result<Option<bool>> {
    let Some(value) = available(value) else {
        return Ok(None);
    };
    match value.as_str() {
        "Yes" | "yes" => Ok(Some(true)),
        "No" | "no" => Ok(Some(false)),
        other => Err(GlusterError::ParseError(format!(
            "字段 {} 不是 Yes/No: {}",
            field, other
        ))),
    }
}

fn quota_limits(xml: &str) -> Result<Vec<RawLimit>> {
    let output: QuotaOutput = from_xml(xml)?;
    Ok(element(output.vol_quota, "volQuota")?.limit)
}

/// 解析 `volume quota <vol> list --xml`（`volQuota/limit`）
pub fn parse_quota_list_paths(xml: &str) -> Result<Vec<QuotaPathLimit>> {
    quota_limits(xml)?
        .into_iter()
        .map(|l| {
            Ok(QuotaPathLimit {
                path: required(&l.path, "path")?,
                hard_limit: number_or_none(&l.hard_limit, "hard_limit")?,
                soft_limit_percent: available(&l.soft_limit_percent),
                soft_limit_value: number_or_none(&l.soft_limit_value, "soft_limit_value")?,
                used_space: number_or_none(&l.used_space, "used_space")?,
                avail_space: number_or_none(&l.avail_space, "avail_space")?,
                soft_limit_exceeded: yes_no(&l.sl_exceeded, "sl_exceeded")?,
                hard_limit_exceeded: yes_no(&l.hl_exceeded, "hl_exceeded")?,
                error: optional(&l.errstr),
            })
        })
        .collect()
}

/// 解析 `volume quota <vol> list-objects --xml`（`volQuota/limit`）
pub fn parse_quota_list_objects(xml: &str) -> Result<Vec<QuotaObjectLimit>> {
    quota_limits(xml)?
        .into_iter()
        .map(|l| {
            Ok(QuotaObjectLimit {
                path: required(&l.path, "path")?,
                hard_limit: number_or_none(&l.hard_limit, "hard_limit")?,
                soft_limit_percent: available(&l.soft_limit_percent),
                soft_limit_value: number_or_none(&l.soft_limit_value, "soft_limit_value")?,
                file_count: number_or_none(&l.file_count, "file_count")?,
                dir_count: number_or_none(&l.dir_count, "dir_count")?,
                available: number_or_none(&l.available, "available")?,
                soft_limit_exceeded: yes_no(&l.sl_exceeded, "sl_exceeded")?,
                hard_limit_exceeded: yes_no(&l.hl_exceeded, "hl_exceeded")?,
                error: optional(&l.errstr),
            })
        })
        .collect()
}

// ---- heal info ----

#[derive(Debug, Deserialize)]
struct HealInfoOutput {
    #[serde(rename = "healInfo")]
    heal_info: Option<RawHealInfo>,
}

#[derive(Debug, Deserialize)]
struct RawHealInfo {
    #[serde(default)]
    bricks: RawHealBricks,
}

#[derive(Debug, Default, Deserialize)]
struct RawHealBricks {
    #[serde(default)]
    brick: Vec<RawHealBrick>,
}

#[derive(Debug, Deserialize)]
struct RawHealBrick {
    /// hostUuid 是属性而不是子元素
    #[serde(rename = "@hostUuid", default)]
    host_uuid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "numberOfEntries", default)]
    number_of_entries: String,
    #[serde(default)]
    file: Vec<RawHealFile>,
}

#[derive(Debug, Deserialize)]
struct RawHealFile {
    #[serde(rename = "@gfid", default)]
    gfid: String,
    #[serde(rename = "$text", default)]
    path: String,
}

/// 解析 `volume heal <vol> info [type] --xml`（`healInfo/bricks/brick`）
pub fn parse_heal_info(xml: &str) -> Result<Vec<HealBrickInfo>> {
    let output: HealInfoOutput = from_xml(xml)?;
    let bricks = element(output.heal_info, "healInfo")?.bricks.brick;
    bricks
        .into_iter()
        .map(|b| {
            let entries = match b.number_of_entries.trim() {
                "" | "-" => None,
                n => Some(number(n, "numberOfEntries")?),
            };
            Ok(HealBrickInfo {
                name: required(&b.name, "brick/name")?,
                host_uuid: required(&b.host_uuid, "brick@hostUuid")?,
                status: b.status.trim().to_string(),
                entries,
                files: b
                    .file
                    .into_iter()
                    .map(|f| HealEntry {
                        gfid: optional(&f.gfid),
                        path: f.path.trim().to_string(),
                    })
                    .collect(),
            })
        })
        .collect()
}

// ---- snapshot list / info / status ----

#[derive(Debug, Deserialize)]
struct SnapListOutput {
    #[serde(rename = "snapList")]
    snap_list: Option<RawSnapList>,
}

#[derive(Debug, Deserialize)]
struct RawSnapList {
    #[serde(default)]
    snapshot: Vec<String>,
}

/// 解析 `snapshot list --xml`（`snapList/snapshot`）
pub fn parse_snapshot_list(xml: &str) -> Result<Vec<String>> {
    let output: SnapListOutput = from_xml(xml)?;
    Ok(element(output.snap_list, "snapList")?
        .snapshot
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[derive(Debug, Deserialize)]
struct SnapInfoOutput {
    #[serde(rename = "snapInfo")]
    snap_info: Option<RawSnapshots>,
}

#[derive(Debug, Deserialize)]
struct SnapStatusOutput {
    #[serde(rename = "snapStatus")]
    snap_status: Option<RawSnapshots>,
}

#[derive(Debug, Deserialize)]
struct RawSnapshots {
    #[serde(default)]
    snapshots: RawSnapshotList,
}

#[derive(Debug, Default, Deserialize)]
struct RawSnapshotList {
    #[serde(default)]
    snapshot: Vec<RawSnapshot>,
}

/// info 与 status 共用，各自只用到其中一部分字段
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    name: String,
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "createTime", default)]
    create_time: String,
    #[serde(rename = "snapVolume", default)]
    snap_volume: Vec<RawSnapVolume>,
    #[serde(default)]
    volume: Vec<RawSnapStatusVolume>,
}

#[derive(Debug, Deserialize)]
struct RawSnapVolume {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "originVolume")]
    origin_volume: Option<RawOriginVolume>,
}

#[derive(Debug, Deserialize)]
struct RawOriginVolume {
    #[serde(default)]
    name: String,
    #[serde(rename = "snapCount", default)]
    snap_count: String,
    #[serde(rename = "snapRemaining", default)]
    snap_remaining: String,
}

#[derive(Debug, Deserialize)]
struct RawSnapStatusVolume {
    #[serde(default)]
    brick: Vec<RawSnapBrick>,
}

#[derive(Debug, Deserialize)]
struct RawSnapBrick {
    #[serde(default)]
    path: String,
    #[serde(rename = "volumeGroup", default)]
    volume_group: String,
    #[serde(default)]
    brick_running: String,
    #[serde(default)]
    pid: String,
    #[serde(default)]
    data_percentage: String,
    #[serde(rename = "lvSize", default)]
    lv_size: String,
}

/// 解析 `snapshot info --xml`（`snapInfo/snapshots/snapshot`）
pub fn parse_snapshot_info(xml: &str) -> Result<Vec<SnapshotInfo>> {
    let output: SnapInfoOutput = from_xml(xml)?;
    let snapshots = element(output.snap_info, "snapInfo")?.snapshots.snapshot;
    snapshots
        .into_iter()
        .map(|s| {
            let volumes = s
                .snap_volume
                .into_iter()
                .map(|v| {
                    let origin = v
                        .origin_volume
                        .map(|o| {
                            Ok::<_, GlusterError>(SnapshotOrigin {
                                name: required(&o.name, "originVolume/name")?,
                                snap_count: number_or_default(&o.snap_count, "snapCount")?,
                                snap_remaining: number_or_default(
                                    &o.snap_remaining,
                                    "snapRemaining",
                                )?,
                            })
                        })
                        .transpose()?;
                    Ok(SnapshotVolume {
                        name: required(&v.name, "snapVolume/name")?,
                        status: v.status.trim().to_string(),
                        origin,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(SnapshotInfo {
                name: required(&s.name, "snapshot/name")?,
                uuid: required(&s.uuid, "snapshot/uuid")?,
                description: optional(&s.description),
                create_time: s.create_time.trim().to_string(),
                volumes,
            })
        })
        .collect()
}

/// 解析 `snapshot status --xml`（`snapStatus/snapshots/snapshot`）
pub fn parse_snapshot_status(xml: &str) -> Result<Vec<SnapshotStatus>> {
    let output: SnapStatusOutput = from_xml(xml)?;
    let snapshots = element(output.snap_status, "snapStatus")?.snapshots.snapshot;
    snapshots
        .into_iter()
        .map(|s| {
            let bricks = s
                .volume
                .into_iter()
                .flat_map(|v| v.brick)
                .map(|b| {
                    Ok(SnapshotBrickStatus {
                        path: required(&b.path, "brick/path")?,
                        volume_group: optional(&b.volume_group),
                        running: b.brick_running.trim().eq_ignore_ascii_case("yes"),
                        pid: b.pid.trim().parse::<u32>().ok().filter(|pid| *pid > 0),
                        data_percentage: optional(&b.data_percentage),
                        lv_size: optional(&b.lv_size),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(SnapshotStatus {
                name: required(&s.name, "snapshot/name")?,
                uuid: required(&s.uuid, "snapshot/uuid")?,
                bricks,
            })
        })
        .collect()
}

// ---- bitrot scrub status ----

#[derive(Debug, Deserialize)]
struct BitrotOutput {
    #[serde(rename = "volBitrot")]
    vol_bitrot: Option<RawBitrot>,
}

#[derive(Debug, Deserialize)]
struct RawBitrot {
    #[serde(rename = "volName", default)]
    vol_name: String,
    #[serde(default)]
    state_scrub: String,
    #[serde(default)]
    scrub_impact: String,
    #[serde(default)]
    scrub_freq: String,
    #[serde(default)]
    bitrot_log_file: String,
    #[serde(default)]
    scrub_log_file: String,
    #[serde(default)]
    node: Vec<RawScrubNode>,
}

#[derive(Debug, Deserialize)]
struct RawScrubNode {
    #[serde(rename = "nodeName", default)]
    node_name: String,
    #[serde(rename = "scrubRunning", default)]
    scrub_running: String,
    #[serde(rename = "numberOfScrubbedFiles", default)]
    scrubbed_files: String,
    #[serde(rename = "numberOfSkippedFiles", default)]
    skipped_files: String,
    #[serde(rename = "lastScrubCompletedTime", default)]
    last_completed_time: String,
    #[serde(rename = "lastScrubDuration", default)]
    last_duration: String,
    #[serde(rename = "errorCount", default)]
    error_count: String,
}

/// 解析 `volume bitrot <vol> scrub status --xml`（`volBitrot`）
pub fn parse_bitrot_scrub_status(xml: &str) -> Result<ScrubStatus> {
    let output: BitrotOutput = from_xml(xml)?;
    let raw = element(output.vol_bitrot, "volBitrot")?;

    let nodes = raw
        .node
        .into_iter()
        .map(|n| {
            Ok(ScrubNodeStatus {
                node: required(&n.node_name, "nodeName")?,
                scrub_running: optional(&n.scrub_running),
                scrubbed_files: number_or_default(&n.scrubbed_files, "numberOfScrubbedFiles")?,
                skipped_files: number_or_default(&n.skipped_files, "numberOfSkippedFiles")?,
                last_completed_time: optional(&n.last_completed_time),
                last_duration: optional(&n.last_duration),
                error_count: number_or_default(&n.error_count, "errorCount")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("解析到 {} 个 scrub 节点", nodes.len());

    Ok(ScrubStatus {
        volume: required(&raw.vol_name, "volName")?,
        state: optional(&raw.state_scrub),
        throttle: optional(&raw.scrub_impact),
        frequency: optional(&raw.scrub_freq),
        bitrot_log_file: optional(&raw.bitrot_log_file),
        scrub_log_file: optional(&raw.scrub_log_file),
        nodes,
    })
}
