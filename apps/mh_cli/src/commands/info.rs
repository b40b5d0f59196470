// apps/mh_cli/src/commands/info.rs

//! 信息显示命令

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mh_boundary::Block;
use tracing::info;

use super::load_setup;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 块布置文件路径（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 以 JSON 输出布置
    #[arg(long)]
    pub json: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== MariHydro 信息 ===");

    let setup = load_setup(args.config.as_deref())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&setup)?);
        return Ok(());
    }

    println!("=== 块布置 ===");
    println!("尺寸: {:?}", setup.size);
    println!("幽灵层: {}", setup.ghost_layers);
    println!("初值: {}", setup.initial_value);
    for handler in &setup.handlers {
        println!("处理器 '{}' (域标志 '{}')", handler.uid, handler.domain_flag);
        for boundary in &handler.boundaries {
            let region = boundary
                .region
                .map(|r| r.to_interval().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  - {} {:?} value={} region={}", boundary.name, boundary.kind, boundary.value, region);
        }
    }

    let block = Block::from_setup("block", &setup)?;
    println!();
    println!("=== 标志映射 ===");
    for (name, mask) in block.collection().flag_mapping() {
        println!("  {:<16} 0x{:08x}", name, mask);
    }

    Ok(())
}
