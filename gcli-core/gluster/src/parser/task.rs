//! rebalance / remove-brick 状态输出
//!
//! 两者的 XML 结构相同，只是根元素不同（`volRebalance` / `volRemoveBrick`）。

use serde::Deserialize;

use super::{element, from_xml, number, optional, required};
use crate::error::Result;
use crate::models::{TaskCounters, TaskNodeStatus, TaskStatus};

#[derive(Debug, Deserialize)]
struct RebalanceOutput {
    #[serde(rename = "volRebalance")]
    vol_rebalance: Option<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RemoveBrickOutput {
    #[serde(rename = "volRemoveBrick")]
    vol_remove_brick: Option<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(rename = "task-id", default)]
    task_id: String,
    #[serde(default)]
    node: Vec<RawCounters>,
    aggregate: Option<RawCounters>,
}

/// `node` 与 `aggregate` 共用，后者没有 nodeName / id
#[derive(Debug, Deserialize)]
struct RawCounters {
    #[serde(rename = "nodeName", default)]
    node_name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    files: String,
    #[serde(default)]
    size: String,
    #[serde(default)]
    lookups: String,
    #[serde(default)]
    failures: String,
    #[serde(default)]
    skipped: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "statusStr", default)]
    status_str: String,
    #[serde(default)]
    runtime: String,
}

fn convert_counters(raw: &RawCounters) -> Result<TaskCounters> {
    Ok(TaskCounters {
        files: number(&raw.files, "files")?,
        size: number(&raw.size, "size")?,
        lookups: number(&raw.lookups, "lookups")?,
        failures: number(&raw.failures, "failures")?,
        skipped: number(&raw.skipped, "skipped")?,
        status_code: number(&raw.status, "status")?,
        status: required(&raw.status_str, "statusStr")?,
        runtime: number(&raw.runtime, "runtime")?,
    })
}

fn convert_task(raw: RawTask) -> Result<TaskStatus> {
    let nodes = raw
        .node
        .into_iter()
        .map(|n| {
            Ok(TaskNodeStatus {
                name: required(&n.node_name, "nodeName")?,
                id: required(&n.id, "id")?,
                counters: convert_counters(&n)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TaskStatus {
        task_id: optional(&raw.task_id),
        nodes,
        aggregate: convert_counters(&element(raw.aggregate, "aggregate")?)?,
    })
}

/// 解析 `volume rebalance <vol> status --xml`（`volRebalance/node`、`volRebalance/aggregate`）
pub fn parse_rebalance_status(xml: &str) -> Result<TaskStatus> {
    let output: RebalanceOutput = from_xml(xml)?;
    convert_task(element(output.vol_rebalance, "volRebalance")?)
}

/// 解析 `volume remove-brick ... status --xml`（`volRemoveBrick/node`、`volRemoveBrick/aggregate`）
pub fn parse_remove_brick_status(xml: &str) -> Result<TaskStatus> {
    let output: RemoveBrickOutput = from_xml(xml)?;
    convert_task(element(output.vol_remove_brick, "volRemoveBrick")?)
}
