// crates/mh_boundary/src/sweep.rs

//! 多块边界处理
//!
//! 每个块的集合彼此独立，块与块之间用 rayon 并行；单个集合内部始终串行。

use rayon::prelude::*;

use crate::collection::BoundaryHandlingCollection;

/// 对一个块执行完整边界处理的函数对象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSweep {
    ghost_layers: usize,
}

impl BlockSweep {
    /// 处理区域含 `ghost_layers` 层幽灵层
    pub fn new(ghost_layers: usize) -> Self {
        Self { ghost_layers }
    }

    /// 包含的幽灵层数
    pub fn ghost_layers(&self) -> usize {
        self.ghost_layers
    }

    /// 处理一个块
    pub fn apply(&self, collection: &mut BoundaryHandlingCollection) {
        collection.run_treatment(self.ghost_layers);
    }
}

/// 并行处理多个块
pub fn sweep_blocks(blocks: &mut [BoundaryHandlingCollection], ghost_layers: usize) {
    let sweep = BlockSweep::new(ghost_layers);
    blocks.par_iter_mut().for_each(|collection| sweep.apply(collection));
    log::debug!("完成 {} 个块的边界处理", blocks.len());
}
