//! Gluster 错误定义

use thiserror::Error;

/// Gluster 操作结果类型
pub type Result<T> = std::result::Result<T, GlusterError>;

/// Gluster 错误类型
#[derive(Error, Debug)]
pub enum GlusterError {
    /// 参数不在允许范围内（执行前即失败）
    #[error("无效参数 {param}: {value}（允许值: {allowed}）")]
    Validation {
        param: &'static str,
        value: String,
        allowed: String,
    },

    /// 命令执行失败：非零退出码，或 XML 中 opRet 为负
    #[error("gluster 命令失败 (返回码 {code}): {}", failure_detail(.stdout, .stderr))]
    Command {
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// 输出结构不符合预期
    #[error("解析错误: {0}")]
    ParseError(String),

    /// XML 反序列化错误
    #[error("XML 解析错误: {0}")]
    XmlError(#[from] quick_xml::DeError),

    /// 无法建立远程连接
    #[error("无法建立到 {host} 的 SSH 连接: {message}")]
    Connection { host: String, message: String },

    /// SSH 错误
    #[error("SSH 错误: {0}")]
    SshError(gcli_ssh_executor::SshError),

    /// 本地进程启动失败
    #[error("启动 gluster 进程失败: {0}")]
    SpawnError(String),

    /// 命令执行超时
    #[error("命令执行超时: {0}")]
    Timeout(String),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),
}

fn failure_detail<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    }
}

impl GlusterError {
    /// 构造命令失败错误
    pub fn command(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Command {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// 是否为输出解析失败
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError(_) | Self::XmlError(_))
    }

    /// 是否为参数校验失败
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// 命令失败时的返回码
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Command { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display_prefers_stderr() {
        let err = GlusterError::command(1, "", "volume start: gv0: failed: Volume gv0 does not exist");
        assert_eq!(err.code(), Some(1));
        assert!(err.to_string().contains("does not exist"));

        let err = GlusterError::command(2, "Usage: volume info", "");
        assert!(err.to_string().contains("Usage"));
    }

    #[test]
    fn test_error_kinds() {
        assert!(GlusterError::ParseError("x".into()).is_parse_error());
        let err = GlusterError::Validation {
            param: "throttle",
            value: "fast".into(),
            allowed: "lazy, normal, aggressive".into(),
        };
        assert!(err.is_validation_error());
        assert_eq!(err.code(), None);
    }
}
