//! 位衰减检测：`gluster volume bitrot ...`

use tracing::info;

use crate::client::GlusterClient;
use crate::command::GlusterCommand;
use crate::error::Result;
use crate::models::ScrubStatus;
use crate::params::{ScrubFrequency, ScrubThrottle};
use crate::parser::parse_bitrot_scrub_status;

fn bitrot(volume: &str) -> GlusterCommand {
    GlusterCommand::bitrot().arg(volume)
}

pub fn bitrot_enable_cmd(volume: &str) -> GlusterCommand {
    bitrot(volume).arg("enable")
}

pub fn bitrot_disable_cmd(volume: &str) -> GlusterCommand {
    bitrot(volume).arg("disable")
}

pub fn scrub_throttle_cmd(volume: &str, throttle: ScrubThrottle) -> GlusterCommand {
    bitrot(volume).arg("scrub-throttle").arg(throttle)
}

pub fn scrub_frequency_cmd(volume: &str, frequency: ScrubFrequency) -> GlusterCommand {
    bitrot(volume).arg("scrub-frequency").arg(frequency)
}

pub fn scrub_pause_cmd(volume: &str) -> GlusterCommand {
    bitrot(volume).arg("scrub").arg("pause")
}

pub fn scrub_resume_cmd(volume: &str) -> GlusterCommand {
    bitrot(volume).arg("scrub").arg("resume")
}

pub fn scrub_status_cmd(volume: &str) -> GlusterCommand {
    bitrot(volume).arg("scrub").arg("status").xml()
}

impl GlusterClient {
    pub async fn bitrot_enable(&self, volume: &str) -> Result<()> {
        self.run(bitrot_enable_cmd(volume)).await
    }

    pub async fn bitrot_disable(&self, volume: &str) -> Result<()> {
        self.run(bitrot_disable_cmd(volume)).await
    }

    /// 设置扫描节流，取值 lazy / normal / aggressive
    pub async fn bitrot_scrub_throttle(&self, volume: &str, throttle: &str) -> Result<()> {
        let throttle: ScrubThrottle = throttle.parse()?;
        info!("卷 {} scrub-throttle -> {}", volume, throttle);
        self.run(scrub_throttle_cmd(volume, throttle)).await
    }

    /// 设置扫描频率，取值 hourly / daily / weekly / biweekly / monthly
    pub async fn bitrot_scrub_frequency(&self, volume: &str, frequency: &str) -> Result<()> {
        let frequency: ScrubFrequency = frequency.parse()?;
        info!("卷 {} scrub-frequency -> {}", volume, frequency);
        self.run(scrub_frequency_cmd(volume, frequency)).await
    }

    pub async fn bitrot_scrub_pause(&self, volume: &str) -> Result<()> {
        self.run(scrub_pause_cmd(volume)).await
    }

    pub async fn bitrot_scrub_resume(&self, volume: &str) -> Result<()> {
        self.run(scrub_resume_cmd(volume)).await
    }

    pub async fn bitrot_scrub_status(&self, volume: &str) -> Result<ScrubStatus> {
        let output = self.execute(scrub_status_cmd(volume)).await?;
        parse_bitrot_scrub_status(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::GlusterConfig;
    use crate::error::GlusterError;
    use crate::executor::{ExecutionResult, MockCommandRunner};

    #[test]
    fn test_scrub_commands() {
        assert_eq!(
            scrub_throttle_cmd("gv0", ScrubThrottle::Aggressive).tokens(),
            vec!["volume", "bitrot", "gv0", "scrub-throttle", "aggressive"]
        );
        assert_eq!(
            scrub_status_cmd("gv0").tokens(),
            vec!["volume", "bitrot", "gv0", "scrub", "status", "--xml"]
        );
    }

    #[tokio::test]
    async fn test_invalid_throttle_never_executes() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let client = GlusterClient::with_runner(GlusterConfig::default(), Arc::new(runner));

        let err = client.bitrot_scrub_throttle("gv0", "fast").await.unwrap_err();
        match err {
            GlusterError::Validation { param, value, allowed } => {
                assert_eq!(param, "scrub-throttle");
                assert_eq!(value, "fast");
                assert_eq!(allowed, "lazy, normal, aggressive");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = client.bitrot_scrub_frequency("gv0", "yearly").await.unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_valid_frequency_is_lowercased() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|req| req.argv.last().map(String::as_str) == Some("weekly"))
            .times(1)
            .returning(|_| Ok(ExecutionResult::success("volume bitrot: success")));
        let client = GlusterClient::with_runner(GlusterConfig::default(), Arc::new(runner));
        client.bitrot_scrub_frequency("gv0", "Weekly").await.unwrap();
    }
}
