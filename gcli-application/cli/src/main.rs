//! GCLI 命令行应用

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use gcli_gluster::GlusterClient;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{CliConfig, Overrides};

#[derive(Parser)]
#[command(name = "gcli")]
#[command(about = "GCLI - GlusterFS 集群管理工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别（也可通过 RUST_LOG 设置）
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// 输出格式 (table/json)
    #[arg(short = 'f', long, default_value = "table", global = true)]
    format: String,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// 连接参数，优先级高于配置文件
#[derive(Args, Debug, Clone)]
struct ConnectionArgs {
    /// gluster 可执行文件路径
    #[arg(long, global = true)]
    gluster_path: Option<String>,

    /// glusterd socket 路径
    #[arg(long, global = true)]
    glusterd_socket: Option<String>,

    /// 在远程节点上执行（通过 SSH）
    #[arg(short = 'H', long, global = true)]
    remote_host: Option<String>,

    /// SSH 私钥路径
    #[arg(short = 'k', long, global = true)]
    ssh_key: Option<String>,

    /// SSH 用户名
    #[arg(short = 'u', long, global = true)]
    ssh_user: Option<String>,

    /// 命令超时（秒）
    #[arg(short, long, global = true)]
    timeout: Option<u64>,
}

impl From<ConnectionArgs> for Overrides {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            gluster_path: args.gluster_path,
            glusterd_socket: args.glusterd_socket,
            remote_host: args.remote_host,
            ssh_key: args.ssh_key,
            ssh_user: args.ssh_user,
            timeout: args.timeout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 卷管理
    Volume {
        #[command(subcommand)]
        action: VolumeAction,
    },

    /// 重平衡
    Rebalance {
        #[command(subcommand)]
        action: RebalanceAction,
    },

    /// 集群节点管理
    Peer {
        #[command(subcommand)]
        action: PeerAction,
    },

    /// geo-replication 会话
    #[command(name = "georep", alias = "geo-replication")]
    Georep {
        #[command(subcommand)]
        action: GeorepAction,
    },

    /// bitrot 检测
    Bitrot {
        #[command(subcommand)]
        action: BitrotAction,
    },

    /// 配额管理
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },

    /// 自愈
    Heal {
        #[command(subcommand)]
        action: HealAction,
    },

    /// 快照管理
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// 本机指标
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },

    /// 配置文件管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 显示 gluster 版本
    Version,
}

#[derive(Subcommand)]
pub enum VolumeAction {
    /// 列出卷名
    List,
    /// 卷信息
    Info {
        /// 卷名（默认全部）
        volume: Option<String>,
    },
    /// 卷状态（按子卷分组）
    Status {
        /// 卷名（默认全部）
        volume: Option<String>,
        /// 逐个 brick 显示详细状态
        #[arg(long)]
        bricks: bool,
    },
    /// 创建卷
    Create {
        volume: String,
        /// brick 列表（host:path），顺序决定子卷划分
        #[arg(required = true)]
        bricks: Vec<String>,
        #[arg(long, default_value = "0")]
        replica: u32,
        #[arg(long, default_value = "0")]
        arbiter: u32,
        #[arg(long, default_value = "0")]
        disperse: u32,
        #[arg(long, default_value = "0")]
        redundancy: u32,
        /// 传输类型 (tcp/rdma/tcp,rdma)
        #[arg(long, default_value = "tcp")]
        transport: String,
        #[arg(long)]
        force: bool,
    },
    /// 启动卷
    Start {
        volume: String,
        #[arg(long)]
        force: bool,
    },
    /// 停止卷
    Stop {
        volume: String,
        #[arg(long)]
        force: bool,
    },
    /// 重启卷
    Restart {
        volume: String,
        #[arg(long)]
        force: bool,
    },
    /// 删除卷
    Delete { volume: String },
    /// 设置卷选项
    Set {
        volume: String,
        key: String,
        value: String,
    },
    /// 查看卷选项
    Get {
        volume: String,
        /// 选项名（默认全部）
        option: Option<String>,
    },
    /// 重置卷选项
    Reset {
        volume: String,
        option: Option<String>,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum RebalanceAction {
    /// 启动重平衡
    Start {
        volume: String,
        /// 只修复布局
        #[arg(long, conflicts_with = "force")]
        fix_layout: bool,
        #[arg(long)]
        force: bool,
    },
    /// 停止重平衡
    Stop { volume: String },
    /// 重平衡进度
    Status { volume: String },
}

#[derive(Subcommand)]
pub enum PeerAction {
    /// 节点状态
    Status,
    /// 存储池（含本机）
    Pool,
    /// 加入节点
    Probe { host: String },
    /// 移除节点
    Detach { host: String },
    /// 移除所有已连接节点
    DetachAll,
}

#[derive(Subcommand)]
pub enum GeorepAction {
    /// 会话状态
    Status {
        /// 主卷
        volume: Option<String>,
        /// 从端主机
        #[arg(requires = "volume")]
        slave_host: Option<String>,
        /// 从端卷
        #[arg(requires = "slave_host")]
        slave_volume: Option<String>,
        /// 从端用户
        #[arg(long, default_value = "root")]
        slave_user: String,
    },
    /// 启动会话
    Start {
        volume: String,
        slave_host: String,
        slave_volume: String,
        #[arg(long, default_value = "root")]
        slave_user: String,
        #[arg(long)]
        force: bool,
    },
    /// 停止会话
    Stop {
        volume: String,
        slave_host: String,
        slave_volume: String,
        #[arg(long, default_value = "root")]
        slave_user: String,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum BitrotAction {
    /// 启用 bitrot
    Enable { volume: String },
    /// 禁用 bitrot
    Disable { volume: String },
    /// 设置 scrub 速度 (lazy/normal/aggressive)
    Throttle { volume: String, value: String },
    /// 设置 scrub 周期 (hourly/daily/weekly/biweekly/monthly)
    Frequency { volume: String, value: String },
    /// scrub 状态
    Status { volume: String },
}

#[derive(Subcommand)]
pub enum QuotaAction {
    /// 启用配额
    Enable { volume: String },
    /// 禁用配额
    Disable { volume: String },
    /// 列出容量配额
    List {
        volume: String,
        /// 只列出这些目录
        paths: Vec<String>,
    },
    /// 设置容量上限
    LimitUsage {
        volume: String,
        path: String,
        /// 如 10GB
        size: String,
        /// 软限制百分比
        #[arg(long)]
        soft_limit: Option<u32>,
    },
    /// 移除目录配额
    Remove { volume: String, path: String },
}

#[derive(Subcommand)]
pub enum HealAction {
    /// 待自愈条目
    Info {
        volume: String,
        /// healed/heal-failed/split-brain
        #[arg(long = "type")]
        info_type: Option<String>,
    },
    /// 触发全量自愈
    Full { volume: String },
    /// 自愈统计
    Statistics { volume: String },
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// 列出快照
    List {
        /// 只列出该卷的快照
        volume: Option<String>,
    },
    /// 快照详情
    Info {
        /// 快照名（默认全部）
        snapshot: Option<String>,
    },
    /// 创建快照
    Create {
        snapshot: String,
        volume: String,
        #[arg(long)]
        description: Option<String>,
        /// 不追加时间戳
        #[arg(long)]
        no_timestamp: bool,
        #[arg(long)]
        force: bool,
    },
    /// 删除快照
    Delete { snapshot: String },
    /// 恢复快照
    Restore { snapshot: String },
}

#[derive(Subcommand)]
pub enum MetricsAction {
    /// 本机 gluster 进程
    Processes,
    /// 本机 brick 容量
    Utilization {
        /// 卷名（默认全部）
        volume: Option<String>,
    },
    /// 本机 brick 磁盘 IO
    Diskstats {
        volume: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示合并后的配置
    Show,
    /// 保存默认远程节点
    SetRemote {
        host: String,
        /// SSH 私钥路径
        ssh_key: String,
        #[arg(long, default_value = "root")]
        user: String,
        #[arg(long, default_value = "22")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("GCLI 启动");

    let file_config = CliConfig::load()?;
    let overrides = Overrides::from(cli.connection);

    let gluster_config = file_config.resolve(&overrides)?;
    debug!("客户端配置: {:?}", gluster_config);
    let client = GlusterClient::new(gluster_config);
    let format = cli.format.as_str();

    // 处理命令
    match cli.command {
        Commands::Volume { action } => commands::volume::handle(&client, action, format).await?,
        Commands::Rebalance { action } => {
            commands::volume::handle_rebalance(&client, action, format).await?
        }
        Commands::Peer { action } => commands::peer::handle(&client, action, format).await?,
        Commands::Georep { action } => commands::georep::handle(&client, action, format).await?,
        Commands::Bitrot { action } => {
            commands::features::handle_bitrot(&client, action, format).await?
        }
        Commands::Quota { action } => {
            commands::features::handle_quota(&client, action, format).await?
        }
        Commands::Heal { action } => commands::features::handle_heal(&client, action, format).await?,
        Commands::Snapshot { action } => {
            commands::snapshot::handle(&client, action, format).await?
        }
        Commands::Metrics { action } => commands::metrics::handle(&client, action, format).await?,
        Commands::Version => println!("{}", client.version().await?),
        Commands::Config { action } => {
            commands::config::handle(action, file_config, client.config())?
        }
    }

    Ok(())
}
