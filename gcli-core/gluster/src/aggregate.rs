//! 多次查询结果的合并与汇总
//!
//! - 卷拓扑 + 运行时状态 → 合并后的卷状态
//! - 按子卷分组，计算健康状态与容量
//! - geo-replication 实时会话 + 卷拓扑 → 覆盖全部主 brick 的会话状态

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{GlusterError, Result};
use crate::models::{
    split_brick_name, BrickRef, BrickStatus, GeorepPairStatus, GeorepSession, GroupedVolumeStatus,
    HealthState, Subvolume, SubvolumeType, VolumeInfo, VolumeStatus, VolumeUsage, NOT_AVAILABLE,
};
use crate::parser::slave_volume_of;

/// 用运行时状态补全卷拓扑
///
/// 只有运行时记录存在且在线时才采用，否则替换为离线默认记录；
/// brick 类型始终以拓扑为准。输出的 brick 数量和顺序与拓扑一致。
pub fn reconcile_volume_status(volumes: Vec<VolumeInfo>, live: &[BrickStatus]) -> Vec<VolumeStatus> {
    let by_name: HashMap<&str, &BrickStatus> =
        live.iter().map(|node| (node.name.as_str(), node)).collect();

    volumes
        .into_iter()
        .map(|volume| {
            let bricks = volume
                .bricks
                .iter()
                .map(|brick| match by_name.get(brick.name.as_str()) {
                    Some(status) if status.online => {
                        let mut status = (*status).clone();
                        status.brick_type = brick.brick_type;
                        if status.uuid.is_empty() {
                            status.uuid = brick.uuid.clone();
                        }
                        status
                    }
                    _ => {
                        debug!("brick {} 不在线或未上报状态，使用离线默认值", brick.name);
                        BrickStatus::offline(brick)
                    }
                })
                .collect();
            VolumeStatus { volume, bricks }
        })
        .collect()
}

fn subvolume_type(volume: &VolumeInfo) -> SubvolumeType {
    if volume.replica_count > 1 {
        SubvolumeType::Replicate
    } else if volume.disperse_count > 0 {
        SubvolumeType::Disperse
    } else {
        SubvolumeType::Distribute
    }
}

/// 子卷健康状态
pub fn subvolume_health(
    subvol_type: SubvolumeType,
    bricks: &[BrickStatus],
    redundancy: u32,
) -> HealthState {
    let total = bricks.len();
    let online = bricks.iter().filter(|b| b.online).count();
    if online == total {
        return HealthState::Up;
    }

    match subvol_type {
        SubvolumeType::Replicate => {
            if online >= total.div_ceil(2) {
                HealthState::Partial
            } else {
                HealthState::Down
            }
        }
        SubvolumeType::Disperse => {
            if total - online <= redundancy as usize {
                HealthState::Partial
            } else {
                HealthState::Down
            }
        }
        SubvolumeType::Distribute => HealthState::Down,
    }
}

/// 卷健康状态
///
/// 默认 up；任一子卷 down → degraded；任一子卷 partial 且尚未 degraded → partial；
/// 没有任何 up 的子卷 → down。
pub fn volume_health(subvolumes: &[Subvolume]) -> HealthState {
    let mut health = HealthState::Up;
    for subvol in subvolumes {
        match subvol.health {
            HealthState::Down => health = HealthState::Degraded,
            HealthState::Partial if health != HealthState::Degraded => {
                health = HealthState::Partial
            }
            _ => {}
        }
    }

    if !subvolumes.iter().any(|s| s.health == HealthState::Up) {
        health = HealthState::Down;
    }
    health
}

/// 卷容量汇总
///
/// 每个子卷在非仲裁 brick 中取最大已用量和最大总量；
/// 分散卷再乘以数据 brick 数（disperse − redundancy）；各子卷求和。
pub fn volume_usage(subvolumes: &[Subvolume]) -> VolumeUsage {
    let mut usage = VolumeUsage::default();

    for subvol in subvolumes {
        let data_bricks = subvol.bricks.iter().filter(|b| !b.is_arbiter());
        let mut size_used = 0u64;
        let mut size_total = 0u64;
        let mut inodes_used = 0u64;
        let mut inodes_total = 0u64;
        for brick in data_bricks {
            size_used = size_used.max(brick.size_used);
            size_total = size_total.max(brick.size_total);
            inodes_used = inodes_used.max(brick.inodes_used);
            inodes_total = inodes_total.max(brick.inodes_total);
        }

        let factor = match subvol.subvol_type {
            SubvolumeType::Disperse => u64::from(
                subvol
                    .disperse_count
                    .saturating_sub(subvol.disperse_redundancy_count),
            ),
            _ => 1,
        };

        usage.size_used += size_used * factor;
        usage.size_total += size_total * factor;
        usage.inodes_used += inodes_used * factor;
        usage.inodes_total += inodes_total * factor;
    }

    usage.size_free = usage.size_total.saturating_sub(usage.size_used);
    usage.inodes_free = usage.inodes_total.saturating_sub(usage.inodes_used);
    usage
}

/// 按子卷分组并计算健康状态和容量
///
/// 每个子卷包含 `subvol_brick_count` 个连续 brick；brick 数不能整除时报解析错误。
pub fn group_subvolumes(status: VolumeStatus) -> Result<GroupedVolumeStatus> {
    let VolumeStatus { volume, bricks } = status;
    let per_subvol = volume.subvol_brick_count() as usize;
    if bricks.len() % per_subvol != 0 {
        return Err(GlusterError::ParseError(format!(
            "卷 {} 有 {} 个 brick，无法按每组 {} 个划分子卷",
            volume.name,
            bricks.len(),
            per_subvol
        )));
    }

    let subvol_type = subvolume_type(&volume);
    let subvolumes: Vec<Subvolume> = bricks
        .chunks(per_subvol)
        .enumerate()
        .map(|(index, chunk)| Subvolume {
            name: format!("{}-{}-{}", volume.name, subvol_type.as_str(), index),
            subvol_type,
            replica_count: volume.replica_count,
            disperse_count: volume.disperse_count,
            disperse_redundancy_count: volume.disperse_redundancy_count,
            health: subvolume_health(subvol_type, chunk, volume.disperse_redundancy_count),
            bricks: chunk.to_vec(),
        })
        .collect();

    let health = volume_health(&subvolumes);
    let usage = volume_usage(&subvolumes);
    debug!(
        "卷 {} 分为 {} 个子卷, 健康状态: {}",
        volume.name,
        subvolumes.len(),
        health
    );

    Ok(GroupedVolumeStatus {
        volume,
        subvolumes,
        health,
        usage,
    })
}

/// 缺省用户为 root 的从端标识，仅用于比较
fn canonical_slave(slave: &str) -> String {
    let slave = slave.trim();
    let slave = slave.strip_prefix("ssh://").unwrap_or(slave);
    if slave.contains('@') {
        slave.to_string()
    } else {
        format!("root@{}", slave)
    }
}

/// 登记一个会话，返回用于查找实时 pair 的键
fn register_session(keys: &mut Vec<(String, String)>, master: &str, slave: &str) -> (String, String) {
    let key = (master.to_string(), canonical_slave(slave));
    let known = keys
        .iter()
        .any(|(m, s)| *m == key.0 && canonical_slave(s) == key.1);
    if !known {
        let slave = slave.trim();
        let slave = slave.strip_prefix("ssh://").unwrap_or(slave);
        keys.push((master.to_string(), slave.to_string()));
    }
    key
}

/// 为未上报的 brick 合成离线记录
fn offline_pair(master_volume: &str, slave: &str, brick: &BrickRef) -> GeorepPairStatus {
    let (node, path) = split_brick_name(&brick.name);
    let slave_user = slave
        .split_once('@')
        .map(|(user, _)| user)
        .unwrap_or("root");
    let na = || NOT_AVAILABLE.to_string();

    GeorepPairStatus {
        master_volume: master_volume.to_string(),
        slave_volume: slave_volume_of(slave),
        master_node: node.to_string(),
        master_brick: path.to_string(),
        slave_user: slave_user.to_string(),
        slave: slave.to_string(),
        slave_node: na(),
        status: "Offline".to_string(),
        crawl_status: na(),
        entry: na(),
        data: na(),
        meta: na(),
        failures: na(),
        checkpoint_completed: na(),
        master_node_uuid: brick.uuid.clone(),
        last_synced: na(),
        checkpoint_time: na(),
        checkpoint_completion_time: na(),
    }
}

/// 合并 geo-replication 实时状态与主卷拓扑
///
/// 每个会话输出的 pair 与主卷 brick 一一对应、顺序一致；
/// 未上报的 brick 合成为 `Offline`。`requested` 为调用方显式查询的
/// `(主卷, user@host::volume)`，即使实时查询没有返回任何会话也会输出。
pub fn reconcile_georep_status(
    live: Vec<GeorepSession>,
    volumes: &[VolumeInfo],
    requested: Option<(&str, &str)>,
) -> Result<Vec<GeorepSession>> {
    // (主卷, 从端) 保持首次出现的顺序
    let mut keys: Vec<(String, String)> = Vec::new();
    let mut pairs: HashMap<(String, String), HashMap<String, GeorepPairStatus>> = HashMap::new();

    for session in live {
        let key = register_session(&mut keys, &session.master_volume, &session.slave);
        let entry = pairs.entry(key).or_default();
        for pair in session.pairs {
            entry.insert(pair.brick_name(), pair);
        }
    }

    if let Some((master, slave)) = requested {
        register_session(&mut keys, master, slave);
    }

    let mut sessions = Vec::with_capacity(keys.len());
    for (master_volume, slave) in keys {
        let volume = volumes
            .iter()
            .find(|v| v.name == master_volume)
            .ok_or_else(|| {
                GlusterError::ParseError(format!(
                    "geo-replication 会话引用了未知主卷: {}",
                    master_volume
                ))
            })?;

        let mut live_pairs = pairs
            .remove(&(master_volume.clone(), canonical_slave(&slave)))
            .unwrap_or_default();

        let session_pairs: Vec<GeorepPairStatus> = volume
            .bricks
            .iter()
            .map(|brick| match live_pairs.remove(&brick.name) {
                Some(pair) => pair,
                None => offline_pair(&master_volume, &slave, brick),
            })
            .collect();

        if !live_pairs.is_empty() {
            warn!(
                "会话 {} -> {} 上报了 {} 个不属于主卷拓扑的 brick",
                master_volume,
                slave,
                live_pairs.len()
            );
        }

        sessions.push(GeorepSession {
            master_volume,
            slave,
            pairs: session_pairs,
        });
    }

    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrickType, Transport, VolumeState, VolumeType};

    fn volume(name: &str, replica: u32, disperse: u32, redundancy: u32, bricks: usize) -> VolumeInfo {
        VolumeInfo {
            name: name.to_string(),
            uuid: format!("{}-uuid", name),
            volume_type: if disperse > 0 {
                VolumeType::DistributedDisperse
            } else if replica > 1 {
                VolumeType::DistributedReplicate
            } else {
                VolumeType::Distribute
            },
            status: VolumeState::Started,
            brick_count: bricks as u32,
            distribute_count: 1,
            stripe_count: 1,
            replica_count: replica,
            arbiter_count: 0,
            disperse_count: disperse,
            disperse_redundancy_count: redundancy,
            transport: Transport::Tcp,
            snapshot_count: 0,
            bricks: (0..bricks)
                .map(|i| BrickRef {
                    name: format!("h{}:/bricks/{}", i, name),
                    uuid: format!("u{}", i),
                    brick_type: BrickType::Brick,
                })
                .collect(),
            options: Vec::new(),
        }
    }

    fn online(brick: &BrickRef, total: u64, free: u64) -> BrickStatus {
        let mut status = BrickStatus::offline(brick);
        status.online = true;
        status.pid = Some(100);
        status.size_total = total;
        status.size_free = free;
        status.size_used = total - free;
        status.inodes_total = 1000;
        status.inodes_free = 900;
        status.inodes_used = 100;
        status
    }

    fn bricks_with(states: &[bool]) -> Vec<BrickStatus> {
        let vol = volume("v", 1, 0, 0, states.len());
        vol.bricks
            .iter()
            .zip(states)
            .map(|(b, up)| if *up { online(b, 100, 50) } else { BrickStatus::offline(b) })
            .collect()
    }

    #[test]
    fn test_replica_three_health() {
        let t = SubvolumeType::Replicate;
        assert_eq!(subvolume_health(t, &bricks_with(&[true, false, false]), 0), HealthState::Down);
        assert_eq!(subvolume_health(t, &bricks_with(&[true, true, false]), 0), HealthState::Partial);
        assert_eq!(subvolume_health(t, &bricks_with(&[true, true, true]), 0), HealthState::Up);
    }

    #[test]
    fn test_disperse_health() {
        let t = SubvolumeType::Disperse;
        let two_down = bricks_with(&[true, true, true, true, false, false]);
        let three_down = bricks_with(&[true, true, true, false, false, false]);
        assert_eq!(subvolume_health(t, &two_down, 2), HealthState::Partial);
        assert_eq!(subvolume_health(t, &three_down, 2), HealthState::Down);
    }

    #[test]
    fn test_distribute_brick_down() {
        assert_eq!(
            subvolume_health(SubvolumeType::Distribute, &bricks_with(&[false]), 0),
            HealthState::Down
        );
    }

    #[test]
    fn test_missing_live_brick_is_offline() {
        let vol = volume("gv0", 2, 0, 0, 4);
        let mut live: Vec<BrickStatus> = vol.bricks[..3].iter().map(|b| online(b, 100, 40)).collect();
        // 上报但离线的记录同样替换为默认值
        live[1].online = false;
        live[1].size_total = 999;

        let merged = reconcile_volume_status(vec![vol.clone()], &live);
        let bricks = &merged[0].bricks;
        assert_eq!(bricks.len(), 4);
        let names: Vec<&str> = bricks.iter().map(|b| b.name.as_str()).collect();
        let expected: Vec<&str> = vol.bricks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, expected);
        assert!(bricks[0].online);
        assert!(!bricks[1].online);
        assert_eq!(bricks[1].size_total, 0);
        assert!(!bricks[3].online);
        assert_eq!(bricks[3].inodes_total, 0);
        assert_eq!(bricks[3].ports.tcp, "N/A");
    }

    #[test]
    fn test_topology_brick_type_wins() {
        let mut vol = volume("gv0", 3, 0, 0, 3);
        vol.bricks[2].brick_type = BrickType::Arbiter;
        let live: Vec<BrickStatus> = vol.bricks.iter().map(|b| online(b, 100, 40)).collect();
        let merged = reconcile_volume_status(vec![vol], &live);
        assert_eq!(merged[0].bricks[2].brick_type, BrickType::Arbiter);
    }

    #[test]
    fn test_grouping_partitions_in_order() {
        let vol = volume("gv0", 3, 0, 0, 9);
        let live: Vec<BrickStatus> = vol.bricks.iter().map(|b| online(b, 100, 40)).collect();
        let merged = reconcile_volume_status(vec![vol.clone()], &live).remove(0);
        let grouped = group_subvolumes(merged).unwrap();

        assert_eq!(grouped.subvolumes.len(), 3);
        assert!(grouped.subvolumes.iter().all(|s| s.bricks.len() == 3));
        assert_eq!(grouped.subvolumes[1].name, "gv0-replicate-1");
        let flattened: Vec<String> = grouped
            .subvolumes
            .iter()
            .flat_map(|s| s.bricks.iter().map(|b| b.name.clone()))
            .collect();
        let expected: Vec<String> = vol.bricks.iter().map(|b| b.name.clone()).collect();
        assert_eq!(flattened, expected);
        assert_eq!(grouped.health, HealthState::Up);
    }

    #[test]
    fn test_grouping_rejects_uneven_partition() {
        let mut vol = volume("gv0", 3, 0, 0, 3);
        vol.bricks.pop();
        let merged = reconcile_volume_status(vec![vol], &[]).remove(0);
        assert!(group_subvolumes(merged).unwrap_err().is_parse_error());
    }

    #[test]
    fn test_volume_health_rollup() {
        let sub = |health| Subvolume {
            name: "s".to_string(),
            subvol_type: SubvolumeType::Replicate,
            replica_count: 2,
            disperse_count: 0,
            disperse_redundancy_count: 0,
            bricks: Vec::new(),
            health,
        };
        use HealthState::*;
        assert_eq!(volume_health(&[sub(Up), sub(Up)]), Up);
        assert_eq!(volume_health(&[sub(Up), sub(Partial)]), Partial);
        assert_eq!(volume_health(&[sub(Up), sub(Down), sub(Partial)]), Degraded);
        assert_eq!(volume_health(&[sub(Partial), sub(Up), sub(Down)]), Degraded);
        assert_eq!(volume_health(&[sub(Partial), sub(Partial)]), Down);
        assert_eq!(volume_health(&[]), Down);
    }

    #[test]
    fn test_usage_replicate_excludes_arbiter() {
        let mut vol = volume("gv0", 3, 0, 0, 6);
        vol.bricks[2].brick_type = BrickType::Arbiter;
        vol.bricks[5].brick_type = BrickType::Arbiter;
        let live: Vec<BrickStatus> = vol
            .bricks
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if b.brick_type == BrickType::Arbiter {
                    online(b, 10_000, 0)
                } else {
                    online(b, 1000, 1000 - 100 * (i as u64 + 1))
                }
            })
            .collect();
        let merged = reconcile_volume_status(vec![vol], &live).remove(0);
        let usage = group_subvolumes(merged).unwrap().usage;

        // 子卷 0: max used = 200；子卷 1: max used = 500
        assert_eq!(usage.size_total, 2000);
        assert_eq!(usage.size_used, 700);
        assert_eq!(usage.size_free, 1300);
        assert_eq!(usage.inodes_total, 2000);
        assert_eq!(usage.inodes_used, 200);
    }

    #[test]
    fn test_usage_disperse_multiplies_data_bricks() {
        let vol = volume("ec", 1, 6, 2, 6);
        let live: Vec<BrickStatus> = vol.bricks.iter().map(|b| online(b, 100, 60)).collect();
        let merged = reconcile_volume_status(vec![vol], &live).remove(0);
        let grouped = group_subvolumes(merged).unwrap();
        assert_eq!(grouped.subvolumes[0].name, "ec-disperse-0");
        assert_eq!(grouped.usage.size_total, 400);
        assert_eq!(grouped.usage.size_used, 160);
        assert_eq!(grouped.usage.size_free, 240);
    }

    #[test]
    fn test_georep_zero_sessions_synthesizes_offline() {
        let vol = volume("gv0", 1, 0, 0, 2);
        let sessions =
            reconcile_georep_status(Vec::new(), &[vol], Some(("gv0", "root@host::svol"))).unwrap();
        assert_eq!(sessions.len(), 1);
        let pairs = &sessions[0].pairs;
        assert_eq!(pairs.len(), 2);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.status, "Offline");
            assert_eq!(pair.slave_user, "root");
            assert_eq!(pair.slave_volume, "svol");
            assert_eq!(pair.master_node, format!("h{}", i));
            assert_eq!(pair.master_node_uuid, format!("u{}", i));
        }
    }

    #[test]
    fn test_georep_user_and_default_user() {
        let vol = volume("gv0", 1, 0, 0, 1);
        let sessions =
            reconcile_georep_status(Vec::new(), &[vol.clone()], Some(("gv0", "geo@h2::svol"))).unwrap();
        assert_eq!(sessions[0].pairs[0].slave_user, "geo");

        let sessions = reconcile_georep_status(Vec::new(), &[vol], Some(("gv0", "h2::svol"))).unwrap();
        assert_eq!(sessions[0].pairs[0].slave_user, "root");
    }

    #[test]
    fn test_georep_merges_live_pairs_in_topology_order() {
        let vol = volume("gv0", 1, 0, 0, 3);
        let live_pair = {
            let mut pair = offline_pair("gv0", "root@h9::svol", &vol.bricks[1]);
            pair.status = "Active".to_string();
            pair
        };
        let live = vec![GeorepSession {
            master_volume: "gv0".to_string(),
            slave: "root@h9::svol".to_string(),
            pairs: vec![live_pair],
        }];

        // 请求的从端省略了用户名，仍应视为同一会话
        let sessions = reconcile_georep_status(live, &[vol], Some(("gv0", "h9::svol"))).unwrap();
        assert_eq!(sessions.len(), 1);
        let statuses: Vec<&str> = sessions[0].pairs.iter().map(|p| p.status.as_str()).collect();
        assert_eq!(statuses, vec!["Offline", "Active", "Offline"]);
    }

    #[test]
    fn test_georep_unknown_master_volume() {
        let err = reconcile_georep_status(Vec::new(), &[], Some(("gv0", "h::s"))).unwrap_err();
        assert!(err.is_parse_error());
    }
}
