// crates/mh_foundation/src/lib.rs

//! MariHydro Foundation Layer
//!
//! 块结构网格的基础抽象层，被 `mh_field`、`mh_boundary` 共同依赖。
//!
//! # 模块概览
//!
//! - [`cell`]: 单元坐标 [`Cell`] 与闭区间 [`CellInterval`]
//! - [`stencil`]: D3Q27 方向枚举 [`Direction`]
//! - [`uid`]: 带类型标记的字符串标识符 [`Uid`]
//! - [`buffer`]: 幽灵层交换用的字节缓冲区
//! - [`error`]: 统一错误类型
//!
//! # 示例
//!
//! ```
//! use mh_foundation::{Cell, CellInterval, Direction};
//!
//! let cells = CellInterval::from_bounds(0, 0, 0, 1, 1, 1);
//! assert_eq!(cells.num_cells(), 8);
//! assert!(cells.contains(Cell::new(1, 0, 1)));
//! assert_eq!(Direction::E.inverse(), Direction::W);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod cell;
pub mod error;
pub mod stencil;
pub mod uid;

// 重导出常用类型
pub use buffer::{RecvBuffer, SendBuffer};
pub use cell::{Cell, CellIdx, CellInterval};
pub use error::{MhError, MhResult};
pub use stencil::Direction;
pub use uid::{
    BoundaryHandlingCollectionUid, BoundaryHandlingUid, BoundaryUid, FlagUid, Uid,
};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::buffer::{RecvBuffer, SendBuffer};
    pub use crate::cell::{Cell, CellIdx, CellInterval};
    pub use crate::error::{MhError, MhResult};
    pub use crate::stencil::Direction;
    pub use crate::uid::{BoundaryHandlingUid, BoundaryUid, FlagUid};
}
