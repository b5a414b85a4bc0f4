//! gluster `--xml` 输出解析
//!
//! 每个命令族先用 quick-xml 反序列化成只含字符串字段的原始结构，
//! 再转换为 [`crate::models`] 中的类型化记录。转换时：
//! - 必需字段为空或缺失 → `ParseError`，整条记录作废
//! - 数字字段无法解析 → `ParseError`，带字段名
//! - 各版本可能缺失的遥测字段 → 默认值

mod features;
mod georep;
mod task;
mod volume;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{GlusterError, Result};
use crate::models::NOT_AVAILABLE;

pub use features::{
    parse_bitrot_scrub_status, parse_heal_info, parse_peer_status, parse_pool_list,
    parse_quota_list_objects, parse_quota_list_paths, parse_snapshot_info,
    parse_snapshot_list, parse_snapshot_status,
};
pub use georep::{parse_georep_config, parse_georep_status, session_slave_spec};
pub(crate) use georep::slave_volume_of;
pub use task::{parse_rebalance_status, parse_remove_brick_status};
pub use volume::{
    parse_volume_info, parse_volume_list, parse_volume_options, parse_volume_profile_info,
    parse_volume_status,
};

/// 反序列化整个 `cliOutput` 文档
pub(crate) fn from_xml<T: DeserializeOwned>(xml: &str) -> Result<T> {
    Ok(quick_xml::de::from_str(xml.trim())?)
}

/// 所有 `--xml` 输出共有的返回码部分
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CliStatus {
    #[serde(rename = "opRet", default)]
    pub op_ret: String,
    #[serde(rename = "opErrno", default)]
    pub op_errno: String,
    #[serde(rename = "opErrstr", default)]
    pub op_errstr: String,
}

/// 取出必需的子元素
pub(crate) fn element<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or_else(|| GlusterError::ParseError(format!("缺少元素 {}", name)))
}

/// 必需的文本字段
pub(crate) fn required(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GlusterError::ParseError(format!("缺少字段 {}", field)));
    }
    Ok(value.to_string())
}

/// 必需的数字字段
pub(crate) fn number<T: FromStr>(value: &str, field: &'static str) -> Result<T> {
    let value = required(value, field)?;
    value
        .parse()
        .map_err(|_| GlusterError::ParseError(format!("字段 {} 不是数字: {}", field, value)))
}

/// 可缺失的数字字段，缺失或 N/A 时取默认值
pub(crate) fn number_or_default<T: FromStr + Default>(value: &str, field: &'static str) -> Result<T> {
    let value = value.trim();
    if value.is_empty() || value == NOT_AVAILABLE {
        return Ok(T::default());
    }
    number(value, field)
}

/// 可缺失的数字字段，缺失或 N/A 时为 None
pub(crate) fn number_or_none<T: FromStr>(value: &str, field: &'static str) -> Result<Option<T>> {
    match available(value) {
        Some(value) => number(&value, field).map(Some),
        None => Ok(None),
    }
}

/// 空文本或 N/A 视为缺失
pub(crate) fn available(value: &str) -> Option<String> {
    optional(value).filter(|v| v != NOT_AVAILABLE)
}

/// 空文本视为缺失
pub(crate) fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 空文本替换为 N/A
pub(crate) fn or_not_available(value: &str) -> String {
    optional(value).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// 把字节数格式化为最大的、数值严格超过其因子的单位（1024 进制，取整）
///
/// `0 → "0B"`，`1024 → "1024B"`，`1025 → "1KB"`
pub fn format_block_size(size: u64) -> String {
    const UNITS: [(u64, &str); 6] = [
        (1 << 50, "PB"),
        (1 << 40, "TB"),
        (1 << 30, "GB"),
        (1 << 20, "MB"),
        (1 << 10, "KB"),
        (1, "B"),
    ];

    let (factor, suffix) = UNITS
        .iter()
        .copied()
        .find(|(factor, _)| size > *factor)
        .unwrap_or((1, "B"));
    format!("{}{}", size / factor, suffix)
}
