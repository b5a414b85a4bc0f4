//! 卷相关输出：info / list / status detail / get / profile

use serde::Deserialize;
use tracing::debug;

use super::{element, format_block_size, from_xml, number, number_or_default, or_not_available, required};
use crate::error::{GlusterError, Result};
use crate::models::{
    BlockStat, BrickPorts, BrickProfile, BrickProfileClear, BrickRef, BrickStatus, BrickType,
    FopStat, ProfileStats, Transport, VolumeInfo, VolumeOption, VolumeProfile, VolumeState,
    VolumeType, NOT_AVAILABLE,
};

// ---- volume info ----

#[derive(Debug, Deserialize)]
struct VolInfoOutput {
    #[serde(rename = "volInfo")]
    vol_info: Option<RawVolInfo>,
}

#[derive(Debug, Deserialize)]
struct RawVolInfo {
    volumes: Option<RawVolumes>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVolumes {
    #[serde(default)]
    volume: Vec<RawVolume>,
}

#[derive(Debug, Deserialize)]
struct RawVolume {
    #[serde(default)]
    name: String,
    #[serde(default)]
    id: String,
    #[serde(rename = "statusStr", default)]
    status_str: String,
    #[serde(rename = "snapshotCount", default)]
    snapshot_count: String,
    #[serde(rename = "brickCount", default)]
    brick_count: String,
    #[serde(rename = "distCount", default)]
    dist_count: String,
    #[serde(rename = "stripeCount", default)]
    stripe_count: String,
    #[serde(rename = "replicaCount", default)]
    replica_count: String,
    #[serde(rename = "arbiterCount", default)]
    arbiter_count: String,
    #[serde(rename = "disperseCount", default)]
    disperse_count: String,
    #[serde(rename = "redundancyCount", default)]
    redundancy_count: String,
    #[serde(rename = "typeStr", default)]
    type_str: String,
    #[serde(default)]
    transport: String,
    #[serde(default)]
    bricks: RawBricks,
    #[serde(default)]
    options: RawOptions,
}

#[derive(Debug, Default, Deserialize)]
struct RawBricks {
    #[serde(default)]
    brick: Vec<RawBrick>,
}

#[derive(Debug, Deserialize)]
struct RawBrick {
    #[serde(default)]
    name: String,
    #[serde(rename = "hostUuid", default)]
    host_uuid: String,
    #[serde(rename = "isArbiter", default)]
    is_arbiter: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    #[serde(default)]
    option: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

fn convert_volume(raw: RawVolume) -> Result<VolumeInfo> {
    let name = required(&raw.name, "name")?;
    let type_str = required(&raw.type_str, "typeStr")?;
    let volume_type = VolumeType::from_type_str(&type_str)
        .ok_or_else(|| GlusterError::ParseError(format!("未知卷类型: {}", type_str)))?;
    let status_str = required(&raw.status_str, "statusStr")?;
    let status = VolumeState::from_status_str(&status_str)
        .ok_or_else(|| GlusterError::ParseError(format!("未知卷状态: {}", status_str)))?;

    let bricks = raw
        .bricks
        .brick
        .into_iter()
        .map(|b| {
            Ok(BrickRef {
                name: required(&b.name, "brick/name")?,
                uuid: required(&b.host_uuid, "brick/hostUuid")?,
                brick_type: if b.is_arbiter.trim() == "1" {
                    BrickType::Arbiter
                } else {
                    BrickType::Brick
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let brick_count: u32 = number(&raw.brick_count, "brickCount")?;
    if brick_count as usize != bricks.len() {
        return Err(GlusterError::ParseError(format!(
            "卷 {} 的 brickCount 为 {}，实际 brick 数为 {}",
            name,
            brick_count,
            bricks.len()
        )));
    }

    let options = raw
        .options
        .option
        .into_iter()
        .map(|o| {
            Ok(VolumeOption {
                name: required(&o.name, "option/name")?,
                value: o.value.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VolumeInfo {
        uuid: required(&raw.id, "id")?,
        volume_type,
        status,
        brick_count,
        distribute_count: number(&raw.dist_count, "distCount")?,
        stripe_count: number_or_default(&raw.stripe_count, "stripeCount")?,
        replica_count: number(&raw.replica_count, "replicaCount")?,
        arbiter_count: number_or_default(&raw.arbiter_count, "arbiterCount")?,
        disperse_count: number_or_default(&raw.disperse_count, "disperseCount")?,
        disperse_redundancy_count: number_or_default(&raw.redundancy_count, "redundancyCount")?,
        transport: Transport::from_code(&required(&raw.transport, "transport")?),
        snapshot_count: number_or_default(&raw.snapshot_count, "snapshotCount")?,
        bricks,
        options,
        name,
    })
}

/// 解析 `volume info --xml`（`volInfo/volumes/volume`）
pub fn parse_volume_info(xml: &str) -> Result<Vec<VolumeInfo>> {
    let output: VolInfoOutput = from_xml(xml)?;
    let vol_info = element(output.vol_info, "volInfo")?;
    let volumes = vol_info
        .volumes
        .unwrap_or_default()
        .volume
        .into_iter()
        .map(convert_volume)
        .collect::<Result<Vec<_>>>()?;
    debug!("解析到 {} 个卷", volumes.len());
    Ok(volumes)
}

// ---- volume list ----

#[derive(Debug, Deserialize)]
struct VolListOutput {
    #[serde(rename = "volList")]
    vol_list: Option<RawVolList>,
}

#[derive(Debug, Deserialize)]
struct RawVolList {
    #[serde(default)]
    volume: Vec<String>,
}

/// 解析 `volume list --xml`（`volList/volume`）
pub fn parse_volume_list(xml: &str) -> Result<Vec<String>> {
    let output: VolListOutput = from_xml(xml)?;
    let list = element(output.vol_list, "volList")?;
    Ok(list
        .volume
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

// ---- volume status detail ----

#[derive(Debug, Deserialize)]
struct VolStatusOutput {
    #[serde(rename = "volStatus")]
    vol_status: Option<RawVolStatus>,
}

#[derive(Debug, Deserialize)]
struct RawVolStatus {
    #[serde(default)]
    volumes: RawStatusVolumes,
}

#[derive(Debug, Default, Deserialize)]
struct RawStatusVolumes {
    #[serde(default)]
    volume: Vec<RawStatusVolume>,
}

#[derive(Debug, Deserialize)]
struct RawStatusVolume {
    #[serde(default)]
    node: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    peerid: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    port: String,
    ports: Option<RawPorts>,
    #[serde(default)]
    pid: String,
    #[serde(rename = "sizeTotal", default)]
    size_total: String,
    #[serde(rename = "sizeFree", default)]
    size_free: String,
    #[serde(default)]
    device: String,
    #[serde(rename = "blockSize", default)]
    block_size: String,
    #[serde(rename = "mntOptions", default)]
    mnt_options: String,
    #[serde(rename = "fsName", default)]
    fs_name: String,
    #[serde(rename = "inodesTotal", default)]
    inodes_total: String,
    #[serde(rename = "inodesFree", default)]
    inodes_free: String,
}

#[derive(Debug, Deserialize)]
struct RawPorts {
    #[serde(default)]
    tcp: String,
    #[serde(default)]
    rdma: String,
}

fn convert_node(raw: RawNode) -> Result<BrickStatus> {
    let hostname = required(&raw.hostname, "node/hostname")?;
    let path = required(&raw.path, "node/path")?;
    let online = required(&raw.status, "node/status")? == "1";

    // 旧版本（如 3.6）没有 ports 结构，只有 port
    let ports = match raw.ports {
        Some(ports) => BrickPorts {
            tcp: or_not_available(&ports.tcp),
            rdma: or_not_available(&ports.rdma),
        },
        None => BrickPorts {
            tcp: or_not_available(&raw.port),
            rdma: NOT_AVAILABLE.to_string(),
        },
    };

    let pid = raw
        .pid
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|pid| *pid > 0)
        .and_then(|pid| u32::try_from(pid).ok());

    let size_total: u64 = number_or_default(&raw.size_total, "sizeTotal")?;
    let size_free: u64 = number_or_default(&raw.size_free, "sizeFree")?;
    let inodes_total: u64 = number_or_default(&raw.inodes_total, "inodesTotal")?;
    let inodes_free: u64 = number_or_default(&raw.inodes_free, "inodesFree")?;

    Ok(BrickStatus {
        name: format!("{}:{}", hostname, path),
        hostname,
        path,
        uuid: raw.peerid.trim().to_string(),
        brick_type: BrickType::Brick,
        online,
        pid,
        ports,
        size_total,
        size_free,
        size_used: size_total.saturating_sub(size_free),
        inodes_total,
        inodes_free,
        inodes_used: inodes_total.saturating_sub(inodes_free),
        device: or_not_available(&raw.device),
        block_size: number_or_default(&raw.block_size, "blockSize")?,
        mount_options: or_not_available(&raw.mnt_options),
        fs_name: or_not_available(&raw.fs_name),
    })
}

/// 解析 `volume status ... detail --xml` 中的节点记录（`volStatus/volumes/volume/node`）
///
/// 返回的是原始运行时记录，brick 类型尚未与拓扑对齐，
/// 见 [`crate::aggregate::reconcile_volume_status`]。
pub fn parse_volume_status(xml: &str) -> Result<Vec<BrickStatus>> {
    let output: VolStatusOutput = from_xml(xml)?;
    let status = element(output.vol_status, "volStatus")?;
    let nodes = status
        .volumes
        .volume
        .into_iter()
        .flat_map(|v| v.node)
        .map(convert_node)
        .collect::<Result<Vec<_>>>()?;
    debug!("解析到 {} 条节点状态", nodes.len());
    Ok(nodes)
}

// ---- volume get ----

#[derive(Debug, Deserialize)]
struct VolGetoptsOutput {
    #[serde(rename = "volGetopts")]
    vol_getopts: Option<RawGetopts>,
}

#[derive(Debug, Deserialize)]
struct RawGetopts {
    #[serde(rename = "Opt", default)]
    opt: Vec<RawOpt>,
}

#[derive(Debug, Deserialize)]
struct RawOpt {
    #[serde(rename = "Option", default)]
    option: String,
    #[serde(rename = "Value", default)]
    value: String,
}

/// 解析 `volume get --xml`（`volGetopts/Opt`）
pub fn parse_volume_options(xml: &str) -> Result<Vec<VolumeOption>> {
    let output: VolGetoptsOutput = from_xml(xml)?;
    let getopts = element(output.vol_getopts, "volGetopts")?;
    getopts
        .opt
        .into_iter()
        .map(|o| {
            Ok(VolumeOption {
                name: required(&o.option, "Opt/Option")?,
                value: o.value.trim().to_string(),
            })
        })
        .collect()
}

// ---- volume profile info ----

#[derive(Debug, Deserialize)]
struct VolProfileOutput {
    #[serde(rename = "volProfile")]
    vol_profile: Option<RawVolProfile>,
}

#[derive(Debug, Deserialize)]
struct RawVolProfile {
    #[serde(default)]
    volname: String,
    #[serde(default)]
    brick: Vec<RawProfileBrick>,
}

#[derive(Debug, Deserialize)]
struct RawProfileBrick {
    #[serde(rename = "brickName", default)]
    brick_name: String,
    #[serde(rename = "clearStats", default)]
    clear_stats: String,
    #[serde(rename = "cumulativeStats")]
    cumulative: Option<RawStats>,
    #[serde(rename = "intervalStats")]
    interval: Option<RawStats>,
}

#[derive(Debug, Deserialize)]
struct RawStats {
    #[serde(rename = "blockStats", default)]
    block_stats: RawBlockStats,
    #[serde(rename = "fopStats", default)]
    fop_stats: RawFopStats,
    #[serde(rename = "totalRead", default)]
    total_read: String,
    #[serde(rename = "totalWrite", default)]
    total_write: String,
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawBlockStats {
    #[serde(default)]
    block: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    size: String,
    #[serde(default)]
    reads: String,
    #[serde(default)]
    writes: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawFopStats {
    #[serde(default)]
    fop: Vec<RawFop>,
}

#[derive(Debug, Deserialize)]
struct RawFop {
    #[serde(default)]
    name: String,
    #[serde(default)]
    hits: String,
    #[serde(rename = "maxLatency", default)]
    max_latency: String,
    #[serde(rename = "minLatency", default)]
    min_latency: String,
    #[serde(rename = "avgLatency", default)]
    avg_latency: String,
}

fn convert_stats(raw: RawStats) -> Result<ProfileStats> {
    let block_stats = raw
        .block_stats
        .block
        .into_iter()
        .map(|b| {
            Ok(BlockStat {
                size: format_block_size(number(&b.size, "block/size")?),
                reads: number(&b.reads, "block/reads")?,
                writes: number(&b.writes, "block/writes")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let fop_stats = raw
        .fop_stats
        .fop
        .into_iter()
        .map(|f| {
            Ok(FopStat {
                name: required(&f.name, "fop/name")?,
                hits: number(&f.hits, "fop/hits")?,
                max_latency: number(&f.max_latency, "fop/maxLatency")?,
                min_latency: number(&f.min_latency, "fop/minLatency")?,
                avg_latency: number(&f.avg_latency, "fop/avgLatency")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProfileStats {
        block_stats,
        fop_stats,
        total_read_bytes: number(&raw.total_read, "totalRead")?,
        total_write_bytes: number(&raw.total_write, "totalWrite")?,
        duration: number(&raw.duration, "duration")?,
    })
}

/// 解析 `volume profile <vol> info [op] --xml`（`volProfile`）
///
/// `clear` 操作的输出结构不同，由 `cleared` 选择解析方式。
pub fn parse_volume_profile_info(xml: &str, cleared: bool) -> Result<VolumeProfile> {
    let output: VolProfileOutput = from_xml(xml)?;
    let profile = element(output.vol_profile, "volProfile")?;
    let volume = required(&profile.volname, "volname")?;

    if cleared {
        let bricks = profile
            .brick
            .into_iter()
            .map(|b| {
                Ok(BrickProfileClear {
                    brick_name: required(&b.brick_name, "brickName")?,
                    clear_stats: b.clear_stats.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(VolumeProfile::Cleared { volume, bricks });
    }

    let bricks = profile
        .brick
        .into_iter()
        .map(|b| {
            Ok(BrickProfile {
                brick_name: required(&b.brick_name, "brickName")?,
                cumulative: b.cumulative.map(convert_stats).transpose()?,
                interval: b.interval.map(convert_stats).transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(VolumeProfile::Stats { volume, bricks })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUME_INFO: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cliOutput>
  <opRet>0</opRet>
  <opErrno>0</opErrno>
  <opErrstr/>
  <volInfo>
    <volumes>
      <volume>
        <name>gv0</name>
        <id>7f1b7e2a-3c55-4a3e-9d7c-1b1e2f3a4b5c</id>
        <status>1</status>
        <statusStr>Started</statusStr>
        <snapshotCount>2</snapshotCount>
        <brickCount>3</brickCount>
        <distCount>1</distCount>
        <stripeCount>1</stripeCount>
        <replicaCount>3</replicaCount>
        <arbiterCount>1</arbiterCount>
        <disperseCount>0</disperseCount>
        <redundancyCount>0</redundancyCount>
        <type>2</type>
        <typeStr>Replicate</typeStr>
        <transport>0</transport>
        <bricks>
          <brick uuid="u1">h1:/bricks/b1<name>h1:/bricks/b1</name><hostUuid>u1</hostUuid><isArbiter>0</isArbiter></brick>
          <brick uuid="u2">h2:/bricks/b1<name>h2:/bricks/b1</name><hostUuid>u2</hostUuid><isArbiter>0</isArbiter></brick>
          <brick uuid="u3">h3:/bricks/b1<name>h3:/bricks/b1</name><hostUuid>u3</hostUuid><isArbiter>1</isArbiter></brick>
        </bricks>
        <optCount>2</optCount>
        <options>
          <option><name>performance.client-io-threads</name><value>off</value></option>
          <option><name>transport.address-family</name><value>inet</value></option>
        </options>
      </volume>
      <count>1</count>
    </volumes>
  </volInfo>
</cliOutput>"#;

    #[test]
    fn test_parse_volume_info() {
        let volumes = parse_volume_info(VOLUME_INFO).unwrap();
        assert_eq!(volumes.len(), 1);
        let v = &volumes[0];
        assert_eq!(v.name, "gv0");
        assert_eq!(v.volume_type, VolumeType::Replicate);
        assert_eq!(v.status, VolumeState::Started);
        assert_eq!(v.replica_count, 3);
        assert_eq!(v.arbiter_count, 1);
        assert_eq!(v.snapshot_count, 2);
        assert_eq!(v.transport, Transport::Tcp);
        assert_eq!(v.bricks.len(), 3);
        assert_eq!(v.bricks[2].name, "h3:/bricks/b1");
        assert_eq!(v.bricks[2].brick_type, BrickType::Arbiter);
        assert_eq!(v.option("transport.address-family"), Some("inet"));
    }

    #[test]
    fn test_brick_count_mismatch_is_parse_error() {
        let xml = VOLUME_INFO.replace("<brickCount>3</brickCount>", "<brickCount>4</brickCount>");
        let err = parse_volume_info(&xml).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_missing_required_field_aborts() {
        let xml = VOLUME_INFO.replace("<replicaCount>3</replicaCount>", "");
        assert!(parse_volume_info(&xml).unwrap_err().is_parse_error());

        let xml = VOLUME_INFO.replace("<replicaCount>3</replicaCount>", "<replicaCount>x</replicaCount>");
        assert!(parse_volume_info(&xml).unwrap_err().is_parse_error());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_volume_info("<cliOutput><volInfo>").is_err());
        assert!(parse_volume_info("<cliOutput><opRet>0</opRet></cliOutput>")
            .unwrap_err()
            .is_parse_error());
    }

    #[test]
    fn test_parse_volume_list() {
        let xml = "<cliOutput><opRet>0</opRet><volList><count>2</count><volume>gv0</volume><volume>gv1</volume></volList></cliOutput>";
        assert_eq!(parse_volume_list(xml).unwrap(), vec!["gv0", "gv1"]);
    }

    #[test]
    fn test_parse_volume_status_with_and_without_ports() {
        let xml = r#"<cliOutput><opRet>0</opRet><volStatus><volumes><volume>
<volName>gv0</volName><nodeCount>2</nodeCount>
<node><hostname>h1</hostname><path>/bricks/b1</path><peerid>u1</peerid><status>1</status>
<port>49152</port><ports><tcp>49152</tcp><rdma>N/A</rdma></ports><pid>2001</pid>
<sizeTotal>1000</sizeTotal><sizeFree>400</sizeFree><device>/dev/vdb</device><blockSize>4096</blockSize>
<mntOptions>rw,noatime</mntOptions><fsName>xfs</fsName><inodesTotal>100</inodesTotal><inodesFree>90</inodesFree></node>
<node><hostname>h2</hostname><path>/bricks/b1</path><peerid>u2</peerid><status>0</status>
<port>49153</port><pid>-1</pid></node>
</volume></volumes></volStatus></cliOutput>"#;
        let nodes = parse_volume_status(xml).unwrap();
        assert_eq!(nodes.len(), 2);

        let first = &nodes[0];
        assert_eq!(first.name, "h1:/bricks/b1");
        assert!(first.online);
        assert_eq!(first.pid, Some(2001));
        assert_eq!(first.size_used, 600);
        assert_eq!(first.inodes_used, 10);
        assert_eq!(first.ports.tcp, "49152");
        assert_eq!(first.fs_name, "xfs");

        let second = &nodes[1];
        assert!(!second.online);
        assert_eq!(second.pid, None);
        assert_eq!(second.ports.tcp, "49153");
        assert_eq!(second.ports.rdma, "N/A");
        assert_eq!(second.size_total, 0);
        assert_eq!(second.device, "N/A");
    }

    #[test]
    fn test_parse_volume_options() {
        let xml = "<cliOutput><opRet>0</opRet><volGetopts><count>2</count>\
<Opt><Option>cluster.quorum-type</Option><Value>auto</Value></Opt>\
<Opt><Option>features.shard</Option><Value>on</Value></Opt></volGetopts></cliOutput>";
        let options = parse_volume_options(xml).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, "cluster.quorum-type");
        assert_eq!(options[1].value, "on");
    }

    #[test]
    fn test_parse_profile_info() {
        let xml = r#"<cliOutput><opRet>0</opRet><volProfile><volname>gv0</volname><profileOp>3</profileOp><brickCount>1</brickCount>
<brick><brickName>h1:/bricks/b1</brickName>
<cumulativeStats>
<blockStats><block><size>4096</size><reads>10</reads><writes>3</writes></block><block><size>1048576</size><reads>0</reads><writes>7</writes></block></blockStats>
<fopStats><fop><name>WRITE</name><hits>10</hits><avgLatency>12.5</avgLatency><minLatency>2.0</minLatency><maxLatency>40.25</maxLatency></fop></fopStats>
<duration>120</duration><totalRead>40960</totalRead><totalWrite>7352320</totalWrite>
</cumulativeStats>
</brick></volProfile></cliOutput>"#;
        let profile = parse_volume_profile_info(xml, false).unwrap();
        match profile {
            VolumeProfile::Stats { volume, bricks } => {
                assert_eq!(volume, "gv0");
                let stats = bricks[0].cumulative.as_ref().unwrap();
                assert_eq!(stats.block_stats[0].size, "4KB");
                assert_eq!(stats.block_stats[1].size, "1024KB");
                assert_eq!(stats.fop_stats[0].max_latency, 40.25);
                assert_eq!(stats.duration, 120);
                assert!(bricks[0].interval.is_none());
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn test_parse_profile_clear() {
        let xml = "<cliOutput><opRet>0</opRet><volProfile><volname>gv0</volname>\
<brick><brickName>h1:/bricks/b1</brickName><clearStats>Cleared stats.</clearStats></brick></volProfile></cliOutput>";
        match parse_volume_profile_info(xml, true).unwrap() {
            VolumeProfile::Cleared { bricks, .. } => {
                assert_eq!(bricks[0].clear_stats, "Cleared stats.");
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }
}
