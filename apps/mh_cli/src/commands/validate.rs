// apps/mh_cli/src/commands/validate.rs

//! 布置验证命令
//!
//! 检查布置本身，再实际构建一个块并检查标记后的一致性。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use mh_boundary::Block;
use mh_config::BlockSetupConfig;
use tracing::{error, info};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 块布置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MariHydro 布置验证 ===");

    let setup = BlockSetupConfig::from_file(&args.config)
        .with_context(|| format!("无法解析 {}", args.config.display()))?;

    if let Err(e) = setup.validate() {
        error!("布置无效: {}", e);
        bail!("验证失败: {}", e);
    }

    let mut block = Block::from_setup("block", &setup).context("构建块失败")?;
    block.mark_regions(&setup).context("标记几何失败")?;
    if !block.collection().check_consistency(setup.ghost_layers) {
        bail!("标记后边界处理器不一致");
    }

    println!("✓ {} 验证通过", args.config.display());
    Ok(())
}
