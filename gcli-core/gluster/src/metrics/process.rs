//! 本机 gluster 进程
//!
//! `ps` 只提供资源占用；`comm` 列会截断且无法还原带空格的参数，
//! 所以进程身份从 `/proc/<pid>/cmdline` 读取，再按可执行文件名分派解析。

use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{read_node_id, GLUSTERD_INFO_PATH};
use crate::error::{GlusterError, Result};

/// 需要采集的进程名
const GLUSTER_PROCESSES: &[&str] = &[
    "glusterd",
    "glusterfsd",
    "glustershd",
    "glusterfs",
    // gsyncd、glustereventsd
    "python",
    // gsyncd 建立的 ssh 连接
    "ssh",
];

/// `ps` 输出的一行
#[derive(Debug, Clone, PartialEq)]
pub struct PsRow {
    pub pid: u32,
    pub pcpu: f64,
    pub pmem: f64,
    pub rsz: u64,
    pub vsz: u64,
    pub etimes: u64,
}

/// gsyncd 进程角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GsyncdRole {
    Worker,
    Agent,
    Monitor,
    Slave,
}

/// 按进程类型解析出的身份信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum ProcessInfo {
    Glusterd {
        node_id: Option<String>,
    },
    Glusterfsd {
        node_id: Option<String>,
        server: Option<String>,
        brick_path: Option<String>,
        volume: Option<String>,
    },
    Gsyncd {
        role: Option<GsyncdRole>,
    },
    Glustereventsd,
}

/// 一个 gluster 进程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub hostname: String,
    #[serde(flatten)]
    pub info: ProcessInfo,
    pub percentage_cpu: f64,
    pub percentage_memory: f64,
    /// KB
    pub resident_memory: u64,
    /// KB
    pub virtual_memory: u64,
    pub elapsed_time_sec: u64,
}

/// 解析器共享的本机信息
struct HostContext {
    hostname: String,
    node_id: Option<String>,
}

type CmdlineParser = fn(&[String], &HostContext) -> Option<ProcessInfo>;

/// 进程名 → 解析器；以 `*` 结尾的模式按前缀匹配
const PARSERS: &[(&str, CmdlineParser)] = &[
    ("glusterd", parse_glusterd),
    ("glusterfsd", parse_glusterfsd),
    ("python*", parse_python),
];

fn find_parser(command: &str) -> Option<CmdlineParser> {
    PARSERS
        .iter()
        .find(|(pattern, _)| match pattern.strip_suffix('*') {
            Some(prefix) => command.starts_with(prefix),
            None => command == *pattern,
        })
        .map(|(_, parser)| *parser)
}

/// 取出 `--name value` 或 `--name=value` 的值
fn option_value(args: &[String], name: &str) -> Option<String> {
    let inline = format!("{}=", name);
    args.iter().enumerate().find_map(|(idx, arg)| {
        if arg == name {
            args.get(idx + 1).cloned()
        } else {
            arg.strip_prefix(&inline).map(str::to_string)
        }
    })
}

fn parse_glusterd(_args: &[String], host: &HostContext) -> Option<ProcessInfo> {
    Some(ProcessInfo::Glusterd {
        node_id: host.node_id.clone(),
    })
}

fn parse_glusterfsd(args: &[String], host: &HostContext) -> Option<ProcessInfo> {
    // volfile-id 形如 gv0.node1.bricks-b1
    let volume = option_value(args, "--volfile-id")
        .and_then(|id| id.split('.').next().map(str::to_string));
    Some(ProcessInfo::Glusterfsd {
        node_id: host.node_id.clone(),
        server: option_value(args, "-s"),
        brick_path: option_value(args, "--brick-name"),
        volume,
    })
}

fn parse_python(args: &[String], _host: &HostContext) -> Option<ProcessInfo> {
    let script = args.get(1)?;
    if script.contains("glustereventsd") {
        return Some(ProcessInfo::Glustereventsd);
    }
    if script.contains("gsyncd") {
        let has = |flag: &str| args.iter().any(|a| a == flag);
        let role = if has("--feedback-fd") {
            Some(GsyncdRole::Worker)
        } else if has("--agent") {
            Some(GsyncdRole::Agent)
        } else if has("--monitor") {
            Some(GsyncdRole::Monitor)
        } else if has("--listen") {
            Some(GsyncdRole::Slave)
        } else {
            None
        };
        return Some(ProcessInfo::Gsyncd { role });
    }
    None
}

/// 解析 `ps -o pid,pcpu,pmem,rsz,vsz,etimes,comm` 的一行
///
/// 列数不是 7（如 `python <defunct>`）或数字无法解析时返回 None。
pub fn parse_ps_line(line: &str) -> Option<PsRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [pid, pcpu, pmem, rsz, vsz, etimes, _comm] = fields.as_slice() else {
        return None;
    };
    Some(PsRow {
        pid: pid.parse().ok()?,
        pcpu: pcpu.parse().ok()?,
        pmem: pmem.parse().ok()?,
        rsz: rsz.parse().ok()?,
        vsz: vsz.parse().ok()?,
        etimes: etimes.parse().ok()?,
    })
}

/// 拆分 `/proc/<pid>/cmdline`（NUL 分隔）
fn split_cmdline(raw: &[u8]) -> Vec<String> {
    let raw = String::from_utf8_lossy(raw);
    let trimmed = raw.trim_matches('\0');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('\0').map(str::to_string).collect()
}

/// 解析单个进程，没有对应解析器时返回 None
fn describe(row: PsRow, args: &[String], host: &HostContext) -> Option<ProcessDetails> {
    let command = args.first()?.rsplit('/').next()?;
    let Some(parser) = find_parser(command) else {
        debug!("进程 {} ({}) 没有解析器，跳过", row.pid, command);
        return None;
    };
    let info = parser(args, host)?;
    Some(ProcessDetails {
        pid: row.pid,
        hostname: host.hostname.clone(),
        info,
        percentage_cpu: row.pcpu,
        percentage_memory: row.pmem,
        resident_memory: row.rsz,
        virtual_memory: row.vsz,
        elapsed_time_sec: row.etimes,
    })
}

fn short_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|name| name.into_string().ok())
        .map(|name| name.split('.').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

/// 采集本机 gluster 进程
///
/// 没有匹配的进程时 `ps` 返回非零，此时结果为空。
pub async fn local_processes() -> Result<Vec<ProcessDetails>> {
    let output = Command::new("ps")
        .args(["--no-header", "-ww", "-o", "pid,pcpu,pmem,rsz,vsz,etimes,comm", "-C"])
        .arg(GLUSTER_PROCESSES.join(","))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| GlusterError::SpawnError(format!("ps: {}", e)))?;

    if !output.status.success() {
        debug!("ps 没有找到 gluster 进程");
        return Ok(Vec::new());
    }

    let node_id = match read_node_id(GLUSTERD_INFO_PATH).await {
        Ok(id) => id,
        Err(e) => {
            warn!("读取节点 UUID 失败: {}", e);
            None
        }
    };
    let host = HostContext {
        hostname: short_hostname(),
        node_id,
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut details = Vec::new();
    for row in stdout.lines().filter_map(parse_ps_line) {
        // 进程可能已经退出
        let Ok(raw) = tokio::fs::read(format!("/proc/{}/cmdline", row.pid)).await else {
            continue;
        };
        let args = split_cmdline(&raw);
        if let Some(process) = describe(row, &args, &host) {
            details.push(process);
        }
    }

    debug!("采集到 {} 个 gluster 进程", details.len());
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> HostContext {
        HostContext {
            hostname: "node1".to_string(),
            node_id: Some("n1".to_string()),
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn row() -> PsRow {
        parse_ps_line(" 6959  0.5  0.6 12840 713660  504076 glusterfsd").unwrap()
    }

    #[test]
    fn test_parse_ps_line() {
        let row = row();
        assert_eq!(row.pid, 6959);
        assert_eq!(row.pcpu, 0.5);
        assert_eq!(row.rsz, 12840);
        assert_eq!(row.etimes, 504076);
        assert!(parse_ps_line("30916  0.0  0.0     0      0       7 python <defunct>").is_none());
        assert!(parse_ps_line("").is_none());
    }

    #[test]
    fn test_split_cmdline() {
        assert_eq!(
            split_cmdline(b"/usr/sbin/glusterd\0-p\0/var/run/glusterd.pid\0"),
            args(&["/usr/sbin/glusterd", "-p", "/var/run/glusterd.pid"])
        );
        assert!(split_cmdline(b"").is_empty());
    }

    #[test]
    fn test_glusterfsd_dispatch() {
        let cmdline = args(&[
            "/usr/sbin/glusterfsd",
            "-s",
            "node1",
            "--volfile-id",
            "gv0.node1.bricks-b1",
            "--brick-name=/bricks/b1",
        ]);
        let details = describe(row(), &cmdline, &host()).unwrap();
        assert_eq!(details.hostname, "node1");
        assert_eq!(
            details.info,
            ProcessInfo::Glusterfsd {
                node_id: Some("n1".to_string()),
                server: Some("node1".to_string()),
                brick_path: Some("/bricks/b1".to_string()),
                volume: Some("gv0".to_string()),
            }
        );
    }

    #[test]
    fn test_python_dispatch() {
        let gsyncd = args(&["/usr/bin/python3", "/usr/libexec/glusterfs/python/syncdaemon/gsyncd.py", "--monitor"]);
        assert_eq!(
            describe(row(), &gsyncd, &host()).unwrap().info,
            ProcessInfo::Gsyncd {
                role: Some(GsyncdRole::Monitor)
            }
        );
        let events = args(&["python3.9", "/usr/sbin/glustereventsd", "--pid-file=/run/e.pid"]);
        assert_eq!(
            describe(row(), &events, &host()).unwrap().info,
            ProcessInfo::Glustereventsd
        );
        assert!(describe(row(), &args(&["python3", "/opt/other.py"]), &host()).is_none());
    }

    #[test]
    fn test_no_parser_is_skipped() {
        assert!(describe(row(), &args(&["/usr/sbin/glustershd"]), &host()).is_none());
        assert!(describe(row(), &args(&["ssh", "-oControlMaster=auto"]), &host()).is_none());
        assert!(describe(row(), &[], &host()).is_none());
    }

    #[test]
    fn test_serialized_name_tag() {
        let details = describe(row(), &args(&["/usr/sbin/glusterd"]), &host()).unwrap();
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "glusterd");
        assert_eq!(json["node_id"], "n1");
        assert_eq!(json["pid"], 6959);
    }
}
