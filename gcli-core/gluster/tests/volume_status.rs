//! 卷状态合并与子卷分组的端到端场景

mod common;

use common::{client, has_args, RecordingRunner, VOL0_INFO, VOL0_STATUS};
use gcli_gluster::{ExecutionResult, HealthState, SubvolumeType};

fn vol0_runner() -> std::sync::Arc<RecordingRunner> {
    RecordingRunner::new(|argv| {
        if has_args(argv, &["volume", "info"]) {
            ExecutionResult::success(VOL0_INFO)
        } else if has_args(argv, &["volume", "status"]) {
            ExecutionResult::success(VOL0_STATUS)
        } else {
            ExecutionResult::new(1, "", "unexpected command")
        }
    })
}

#[tokio::test]
async fn test_status_detail_lists_every_brick() {
    let runner = vol0_runner();
    let client = client(runner.clone());

    let volumes = client.volume_status_detail(Some("vol0")).await.unwrap();
    assert_eq!(volumes.len(), 1);

    let bricks = &volumes[0].bricks;
    let names: Vec<&str> = bricks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["node1:/bricks/b1", "node2:/bricks/b1", "node1:/bricks/b2", "node2:/bricks/b2"]
    );
    assert_eq!(bricks.iter().filter(|b| b.online).count(), 3);

    let missing = &bricks[3];
    assert!(!missing.online);
    assert_eq!(missing.uuid, "u2");
    assert_eq!(missing.size_total, 0);
    assert_eq!(missing.pid, None);
    assert_eq!(missing.ports.tcp, "N/A");

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        vec!["gluster", "--mode=script", "volume", "status", "vol0", "detail", "--xml"]
    );
}

#[tokio::test]
async fn test_grouped_health_and_usage() {
    let client = client(vol0_runner());

    let grouped = client.volume_status_grouped(Some("vol0")).await.unwrap();
    let vol0 = &grouped[0];

    assert_eq!(vol0.subvolumes.len(), 2);
    assert_eq!(vol0.subvolumes[0].name, "vol0-replicate-0");
    assert_eq!(vol0.subvolumes[0].subvol_type, SubvolumeType::Replicate);
    assert_eq!(vol0.subvolumes[0].health, HealthState::Up);
    assert_eq!(vol0.subvolumes[1].health, HealthState::Partial);
    assert_eq!(vol0.health, HealthState::Partial);

    // 子卷 0：max(4000, 5000) / 10000；子卷 1：1000 / 20000
    assert_eq!(vol0.usage.size_used, 6000);
    assert_eq!(vol0.usage.size_total, 30000);
    assert_eq!(vol0.usage.size_free, 24000);
    assert_eq!(vol0.usage.inodes_used, 70);
    assert_eq!(vol0.usage.inodes_total, 1300);

    let flattened: Vec<&str> = vol0
        .subvolumes
        .iter()
        .flat_map(|s| s.bricks.iter().map(|b| b.name.as_str()))
        .collect();
    let original: Vec<&str> = vol0.volume.bricks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(flattened, original);
}

#[tokio::test]
async fn test_stopped_volume_skips_status_query() {
    let stopped = VOL0_INFO.replace("<statusStr>Started</statusStr>", "<statusStr>Stopped</statusStr>");
    let runner = RecordingRunner::new(move |argv| {
        if has_args(argv, &["volume", "info"]) {
            ExecutionResult::success(stopped.clone())
        } else {
            ExecutionResult::new(2, "", "Volume vol0 is not started")
        }
    });
    let client = client(runner.clone());

    let grouped = client.volume_status_grouped(None).await.unwrap();
    assert_eq!(runner.calls().len(), 1);
    assert!(grouped[0].volume.bricks.len() == 4);
    assert_eq!(grouped[0].health, HealthState::Down);
    assert!(grouped[0]
        .subvolumes
        .iter()
        .all(|s| s.health == HealthState::Down));
}

#[tokio::test]
async fn test_embedded_failure_surfaces_as_command_error() {
    let runner = RecordingRunner::new(|_| {
        ExecutionResult::success(
            "<cliOutput><opRet>-1</opRet><opErrno>30800</opErrno><opErrstr>Volume vol9 does not exist</opErrstr></cliOutput>",
        )
    });
    let client = client(runner);

    let err = client.volume_info(Some("vol9")).await.unwrap_err();
    assert_eq!(err.code(), Some(-1));
    assert!(err.to_string().contains("Volume vol9 does not exist"));
}
