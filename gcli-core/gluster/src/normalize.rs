//! 执行结果归一化
//!
//! 主信号是退出码；对请求了 `--xml` 的命令，还要检查输出中的 `opRet`：
//! 进程成功但 `opRet < 0` 时同样视为命令失败。

use tracing::debug;

use crate::error::{GlusterError, Result};
use crate::executor::ExecutionResult;
use crate::parser::{from_xml, CliStatus};

/// 从 XML 输出中取出内嵌的失败（opRet < 0）
///
/// 先尝试 stdout，再尝试 stderr；两者都无法解析时返回 None。
fn embedded_failure(result: &ExecutionResult) -> Option<GlusterError> {
    let status = [&result.stdout, &result.stderr]
        .into_iter()
        .filter(|body| !body.trim().is_empty())
        .find_map(|body| from_xml::<CliStatus>(body).ok())?;

    let op_ret: i32 = status.op_ret.trim().parse().ok()?;
    if op_ret >= 0 {
        return None;
    }

    debug!(
        "opRet={}, opErrno={}, opErrstr={}",
        op_ret, status.op_errno, status.op_errstr
    );
    Some(GlusterError::command(op_ret, "", status.op_errstr.trim()))
}

/// 把执行结果转换为成功输出（去除首尾空白的 stdout）或命令错误
///
/// `expects_xml` 为 false 时不做 opRet 检查。
pub fn normalize(result: ExecutionResult, expects_xml: bool) -> Result<String> {
    if result.exit_status != 0 {
        return Err(GlusterError::command(
            result.exit_status,
            result.stdout.trim(),
            result.stderr.trim(),
        ));
    }

    if expects_xml {
        if let Some(err) = embedded_failure(&result) {
            return Err(err);
        }
    }

    Ok(result.stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP_FAILED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cliOutput><opRet>-1</opRet><opErrno>30800</opErrno><opErrstr>Volume gv9 does not exist</opErrstr><volInfo/></cliOutput>"#;

    #[test]
    fn test_nonzero_exit() {
        let err = normalize(ExecutionResult::new(1, " out \n", " volume stop: failed \n"), false)
            .unwrap_err();
        match err {
            GlusterError::Command { code, stdout, stderr } => {
                assert_eq!(code, 1);
                assert_eq!(stdout, "out");
                assert_eq!(stderr, "volume stop: failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_embedded_failure_in_stdout() {
        let err = normalize(ExecutionResult::success(OP_FAILED), true).unwrap_err();
        match err {
            GlusterError::Command { code, stdout, stderr } => {
                assert_eq!(code, -1);
                assert_eq!(stdout, "");
                assert_eq!(stderr, "Volume gv9 does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_embedded_failure_falls_back_to_stderr() {
        let result = ExecutionResult::new(0, "", OP_FAILED);
        assert_eq!(normalize(result, true).unwrap_err().code(), Some(-1));
    }

    #[test]
    fn test_plain_text_commands_skip_op_ret_check() {
        let out = normalize(ExecutionResult::success(OP_FAILED), false).unwrap();
        assert!(out.starts_with("<?xml"));
    }

    #[test]
    fn test_unparseable_payload_is_not_an_error() {
        let out = normalize(ExecutionResult::success("volume start: gv0: success\n"), true).unwrap();
        assert_eq!(out, "volume start: gv0: success");
    }

    #[test]
    fn test_zero_op_ret_passes() {
        let xml = "<cliOutput><opRet>0</opRet><opErrno>0</opErrno><opErrstr/></cliOutput>";
        assert_eq!(normalize(ExecutionResult::success(xml), true).unwrap(), xml);
    }
}
