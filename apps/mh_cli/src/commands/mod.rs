// apps/mh_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use mh_config::BlockSetupConfig;
use tracing::info;

/// 加载块布置，未指定文件时使用默认布置
pub fn load_setup(path: Option<&Path>) -> Result<BlockSetupConfig> {
    match path {
        Some(path) => {
            info!("加载块布置: {}", path.display());
            BlockSetupConfig::from_file(path).with_context(|| format!("无法加载块布置 {}", path.display()))
        }
        None => {
            info!("使用默认块布置");
            Ok(BlockSetupConfig::default())
        }
    }
}
