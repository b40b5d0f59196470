// apps/mh_cli/src/main.rs

//! MariHydro 边界处理命令行工具
//!
//! 读取块布置（JSON，缺省时用内置的 8³ 入口/出口布置），在其上驱动
//! `mh_boundary` 的边界处理器集合。
//!
//! # 子命令
//!
//! - `run`: 构建东西相邻的两个块，双向交换幽灵层后并行执行边界处理
//! - `info`: 打印布置与标志名到掩码的映射
//! - `validate`: 检查布置文件，构建块并检查标记后的一致性
//!
//! # 日志
//!
//! 各库通过 `log` 门面输出；这里安装的 `tracing` 订阅器同时接收这些记录。
//! `--log-level debug` 可看到集合构造与每次打包/解包的统计，
//! `trace` 会逐单元打印标志分派。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// MariHydro 边界处理命令行工具
#[derive(Parser)]
#[command(name = "mh_cli")]
#[command(author = "MariHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MariHydro block boundary handling driver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建两个相邻块，执行边界处理与幽灵层交换
    Run(commands::run::RunArgs),
    /// 显示块布置与标志映射
    Info(commands::info::InfoArgs),
    /// 验证块布置文件
    Validate(commands::validate::ValidateArgs),
}

/// 解析日志级别，无法识别时退回 info
fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
