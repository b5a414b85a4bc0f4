//! 参数校验发生在执行之前

mod common;

use common::{client, RecordingRunner};
use gcli_gluster::{ExecutionResult, GlusterError};

#[tokio::test]
async fn test_invalid_scrub_throttle_never_invokes() {
    let runner = RecordingRunner::new(|_| ExecutionResult::success(""));
    let client = client(runner.clone());

    let err = client
        .bitrot_scrub_throttle("gv0", "turbo")
        .await
        .unwrap_err();
    assert!(matches!(err, GlusterError::Validation { param: "scrub-throttle", .. }));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_valid_throttle_reaches_runner() {
    let runner = RecordingRunner::new(|_| ExecutionResult::success("volume bitrot: success"));
    let client = client(runner.clone());

    client.bitrot_scrub_throttle("gv0", "LAZY").await.unwrap();
    assert_eq!(
        runner.calls(),
        vec![vec!["gluster", "--mode=script", "volume", "bitrot", "gv0", "scrub-throttle", "lazy"]]
    );
}
