//! 配置文件命令

use anyhow::{Context, Result};
use colored::Colorize;
use gcli_gluster::GlusterConfig;

use crate::config::{CliConfig, RemoteConfig};
use crate::ConfigAction;

pub fn handle(action: ConfigAction, mut file_config: CliConfig, resolved: &GlusterConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{} {}", "配置文件:".bold(), CliConfig::config_path()?.display());
            println!();
            let content = toml::to_string_pretty(resolved).context("序列化配置失败")?;
            println!("{}", content);
        }
        ConfigAction::SetRemote {
            host,
            ssh_key,
            user,
            port,
        } => {
            file_config.remote = Some(RemoteConfig {
                host: host.clone(),
                ssh_key,
                user,
                port,
            });
            file_config.save()?;
            println!(
                "{} 默认远程节点已设置为 {}",
                "✓".green().bold(),
                host.cyan().bold()
            );
        }
    }
    Ok(())
}
