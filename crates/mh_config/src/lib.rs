// crates/mh_config/src/lib.rs

//! MariHydro Config Layer
//!
//! 配置层，提供两类配置：
//!
//! - [`block`]: 层次化配置块 [`ConfigBlock`]，边界条件据此构造自己的参数对象
//! - [`setup`]: 块/边界处理器布置 [`BlockSetupConfig`]，供命令行驱动使用
//! - [`error`]: 配置错误类型
//!
//! 所有配置均以 JSON 表示，经 serde 反序列化。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod error;
pub mod setup;

// 重导出核心类型
pub use block::ConfigBlock;
pub use error::{ConfigError, ConfigResult};
pub use setup::{BlockSetupConfig, BoundaryKindConfig, BoundarySetup, HandlerSetup, RegionConfig};
