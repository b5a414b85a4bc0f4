//! 枚举型命令参数
//!
//! gluster 对非法枚举值的报错文本在各版本间并不可靠，
//! 所以这些参数在构造命令之前就按允许值列表校验。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GlusterError;

/// 定义一个只接受固定取值的参数类型
macro_rules! allowed_values {
    (
        $(#[$meta:meta])*
        $name:ident, $param:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            /// 全部允许值
            pub const ALLOWED: &'static [&'static str] = &[$($value),+];

            /// 命令行中使用的取值
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = GlusterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err(GlusterError::Validation {
                        param: $param,
                        value: s.to_string(),
                        allowed: Self::ALLOWED.join(", "),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

allowed_values! {
    /// 位衰减扫描节流级别
    ScrubThrottle, "scrub-throttle" {
        Lazy => "lazy",
        Normal => "normal",
        Aggressive => "aggressive",
    }
}

allowed_values! {
    /// 位衰减扫描频率
    ScrubFrequency, "scrub-frequency" {
        Hourly => "hourly",
        Daily => "daily",
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
    }
}

allowed_values! {
    /// clear-locks 锁类型
    LockKind, "kind" {
        Blocked => "blocked",
        Granted => "granted",
        All => "all",
    }
}

allowed_values! {
    /// profile info 操作类型
    ProfileInfoOp, "profile-info-op" {
        Peek => "peek",
        Incremental => "incremental",
        Cumulative => "cumulative",
        Clear => "clear",
    }
}

allowed_values! {
    /// heal info 子类型
    HealInfoType, "heal-info-type" {
        Healed => "healed",
        HealFailed => "heal-failed",
        SplitBrain => "split-brain",
    }
}

allowed_values! {
    /// 卷传输类型（创建卷时使用）
    TransportType, "transport" {
        Tcp => "tcp",
        Rdma => "rdma",
        TcpRdma => "tcp,rdma",
    }
}

impl Default for TransportType {
    fn default() -> Self {
        Self::Tcp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("LAZY".parse::<ScrubThrottle>().unwrap(), ScrubThrottle::Lazy);
        assert_eq!(
            "Heal-Failed".parse::<HealInfoType>().unwrap(),
            HealInfoType::HealFailed
        );
        assert_eq!(
            "tcp,rdma".parse::<TransportType>().unwrap(),
            TransportType::TcpRdma
        );
    }

    #[test]
    fn test_invalid_value_is_validation_error() {
        let err = "fast".parse::<ScrubThrottle>().unwrap_err();
        match err {
            GlusterError::Validation {
                param,
                value,
                allowed,
            } => {
                assert_eq!(param, "scrub-throttle");
                assert_eq!(value, "fast");
                assert_eq!(allowed, "lazy, normal, aggressive");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!("yearly".parse::<ScrubFrequency>().is_err());
        assert!("shared".parse::<LockKind>().is_err());
        assert!("total".parse::<ProfileInfoOp>().is_err());
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(ScrubFrequency::Biweekly.to_string(), "biweekly");
        assert_eq!(LockKind::All.as_str(), "all");
        assert_eq!(TransportType::default(), TransportType::Tcp);
        assert_eq!(ProfileInfoOp::ALLOWED.len(), 4);
    }
}
