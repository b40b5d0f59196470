// crates/mh_field/src/lib.rs

//! MariHydro 场数据层
//!
//! 提供带幽灵层的块内场存储：
//!
//! - [`ghost_field`]: 泛型幽灵层场 [`GhostLayerField`]
//! - [`flag_field`]: 位掩码标志场 [`FlagField`] 及其 名称↔位 注册表
//! - [`error`]: 场层错误类型
//!
//! 标志场由边界处理器集合与各边界处理器共同引用，
//! 因此以 [`SharedFlagField`]（`Arc<RwLock<_>>`）形式共享，身份用 `Arc::ptr_eq` 判断。
//!
//! # 示例
//!
//! ```
//! use mh_field::{FlagField, shared};
//! use mh_foundation::Cell;
//!
//! let mut field = FlagField::new(4, 4, 4, 1).unwrap();
//! let fluid = field.register_flag("fluid").unwrap();
//! field.add_flag(Cell::new(0, 0, 0), fluid);
//! assert!(field.is_flag_set(Cell::new(0, 0, 0), fluid));
//!
//! let handle = shared(field);
//! assert_eq!(handle.read().nr_of_ghost_layers(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flag_field;
pub mod ghost_field;

use parking_lot::RwLock;
use std::sync::Arc;

pub use error::{FieldError, FieldResult};
pub use flag_field::{is_flag, FlagField, FlagMask, FLAG_BITS};
pub use ghost_field::GhostLayerField;

/// 标量场（边界处理器作用的数值场）
pub type ScalarField = GhostLayerField<f64>;

/// 共享标志场句柄
pub type SharedFlagField = Arc<RwLock<FlagField>>;

/// 共享标量场句柄
pub type SharedScalarField = Arc<RwLock<ScalarField>>;

/// 包装为共享句柄
pub fn shared<T>(value: T) -> Arc<RwLock<T>> {
    Arc::new(RwLock::new(value))
}
