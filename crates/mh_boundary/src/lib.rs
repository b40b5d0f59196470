// crates/mh_boundary/src/lib.rs

//! MariHydro 边界处理层
//!
//! 在块结构网格的单个块上，把若干独立实现的边界处理器组合成一次统一的边界处理。
//!
//! - [`handler`]: 边界处理器接口 [`BoundaryHandler`]
//! - [`collection`]: 边界处理器集合 [`BoundaryHandlingCollection`]
//! - [`handling`]: 参考处理器 [`BoundaryHandling`](handling::BoundaryHandling) 及其边界条件
//! - [`block`]: 由布置构建块、相邻块之间的幽灵层交换
//! - [`sweep`]: 多块并行边界处理
//! - [`config`]: 边界条件参数对象
//! - [`flag`]: 以掩码或名称指定标志
//! - [`error`]: 错误类型
//!
//! # 分派规则
//!
//! 集合按处理器列表顺序查找所有权掩码包含该标志的处理器，由第一个匹配者执行；
//! 不属于任何处理器的标志直接写在标志场上。构造时保证所有权掩码两两不相交，
//! 因此"第一个匹配者"也是唯一的匹配者。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod collection;
pub mod config;
pub mod error;
pub mod flag;
pub mod handler;
pub mod handling;
pub mod sweep;

pub use block::{exchange, Block};
pub use collection::BoundaryHandlingCollection;
pub use config::{BoundaryConfiguration, NullConfiguration};
pub use error::{BoundaryError, BoundaryResult};
pub use flag::FlagSelector;
pub use handler::BoundaryHandler;
pub use sweep::{sweep_blocks, BlockSweep};
