//! 集成测试公共工具：按参数应答并记录调用的执行器

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gcli_gluster::{
    CommandRunner, ExecRequest, ExecutionResult, GlusterClient, GlusterConfig, Result,
};

pub const VOL0_INFO: &str = include_str!("../fixtures/vol0_info.xml");
pub const VOL0_STATUS: &str = include_str!("../fixtures/vol0_status_detail.xml");
pub const GEOREP_EMPTY: &str = include_str!("../fixtures/georep_status_empty.xml");
pub const GEOREP_GV1_INFO: &str = include_str!("../fixtures/gv1_info.xml");

type Responder = Box<dyn Fn(&[String]) -> ExecutionResult + Send + Sync>;

/// 记录每次请求，并按参数返回预设输出
pub struct RecordingRunner {
    calls: Mutex<Vec<ExecRequest>>,
    respond: Responder,
}

impl RecordingRunner {
    pub fn new(respond: impl Fn(&[String]) -> ExecutionResult + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|req| req.argv.clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, request: &ExecRequest) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(request.clone());
        Ok((self.respond)(&request.argv))
    }
}

pub fn client(runner: Arc<RecordingRunner>) -> GlusterClient {
    GlusterClient::with_runner(GlusterConfig::default(), runner)
}

/// argv 中是否依次包含这些参数
pub fn has_args(argv: &[String], wanted: &[&str]) -> bool {
    argv.windows(wanted.len())
        .any(|window| window.iter().zip(wanted).all(|(a, b)| a == b))
}
