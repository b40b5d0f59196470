// crates/mh_boundary/src/handler.rs

//! 边界处理器接口
//!
//! 一个边界处理器拥有一组标志位：
//!
//! - **域掩码**：被视为有效内部单元的标志
//! - **边界掩码**：执行边界处理的标志
//!
//! 两者之并为所有权掩码。集合只通过本接口与处理器交互，
//! 处理器之间互不感知。
//!
//! # 标志位约定
//!
//! 集合在委托之前会整理原始标志位，处理器只需维护自己的状态：
//!
//! - `set_flag`: 调用时该位尚未置位，处理器负责置位并登记
//! - `remove_flag`: 调用时该位已置位，处理器负责清位并注销
//! - `clear`: 处理器清除单元上自己拥有的全部标志
//! - `unpack`: 调用时 `mask` 中的位尚未置位，处理器读取负载后置位

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mh_config::ConfigBlock;
use mh_field::{FlagMask, SharedFlagField};
use mh_foundation::{BoundaryHandlingUid, BoundaryUid, Cell, CellIdx, CellInterval, Direction, RecvBuffer, SendBuffer};

use crate::config::BoundaryConfiguration;
use crate::error::BoundaryResult;

/// 边界处理器
pub trait BoundaryHandler: Any + Send + Sync + fmt::Display {
    // =========================================================================
    // 身份与几何
    // =========================================================================

    /// 处理器 UID
    fn uid(&self) -> &BoundaryHandlingUid;

    /// 引用的标志场
    fn flag_field(&self) -> &SharedFlagField;

    /// 标志场外包围盒（含全部幽灵层）
    fn outer_bb(&self) -> CellInterval;

    // =========================================================================
    // 掩码
    // =========================================================================

    /// 域掩码
    fn domain_mask(&self) -> FlagMask;

    /// 边界掩码
    fn boundary_mask(&self) -> FlagMask;

    /// 所有权掩码
    fn ownership_mask(&self) -> FlagMask {
        self.domain_mask() | self.boundary_mask()
    }

    /// 单元上没有本处理器的任何标志
    fn is_empty(&self, cell: Cell) -> bool;

    // =========================================================================
    // 边界条件查询
    // =========================================================================

    /// 承载的边界条件 UID
    fn boundary_uids(&self) -> Vec<BoundaryUid>;

    /// 是否承载该边界条件
    fn contains_boundary_condition(&self, uid: &BoundaryUid) -> bool {
        self.boundary_uids().iter().any(|u| u == uid)
    }

    /// 是否有边界条件使用该标志位
    fn contains_boundary_condition_flag(&self, flag: FlagMask) -> bool;

    /// 边界条件使用的标志位，未承载时为 0
    fn boundary_mask_of(&self, uid: &BoundaryUid) -> FlagMask;

    /// 使用该标志位的边界条件
    fn boundary_uid(&self, flag: FlagMask) -> Option<BoundaryUid>;

    /// 由配置块构造边界条件参数
    fn create_boundary_configuration(
        &self,
        uid: &BoundaryUid,
        config: &ConfigBlock,
    ) -> BoundaryResult<Arc<dyn BoundaryConfiguration>>;

    // =========================================================================
    // 维护
    // =========================================================================

    /// 内部状态与标志场是否一致
    fn check_consistency(&self, interval: &CellInterval) -> bool;

    /// 重建区间内的近边界缓存
    fn refresh(&mut self, interval: &CellInterval);

    /// 重建最外 `thickness` 层的近边界缓存
    fn refresh_outermost_layer(&mut self, thickness: CellIdx) {
        let outer = self.outer_bb();
        let inner = outer.expanded(-thickness);
        let slabs = (0..3).flat_map(|axis| {
            let mut low = outer;
            low.set_max_of(axis, inner.min_of(axis) - 1);
            let mut high = outer;
            high.set_min_of(axis, inner.max_of(axis) + 1);
            [low, high]
        });
        let slabs: Vec<CellInterval> = slabs.filter(|s| !s.is_empty()).collect();
        for slab in &slabs {
            self.refresh(slab);
        }
    }

    // =========================================================================
    // 标志修改
    // =========================================================================

    /// 置位并登记
    fn set_flag(&mut self, flag: FlagMask, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()>;

    /// 区间置位
    fn set_flag_interval(
        &mut self,
        flag: FlagMask,
        interval: &CellInterval,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        for cell in interval {
            self.set_flag(flag, cell, param)?;
        }
        Ok(())
    }

    /// 清位并注销
    fn remove_flag(&mut self, flag: FlagMask, cell: Cell);

    /// 清除单元上本处理器拥有的全部标志
    fn clear(&mut self, cell: Cell);

    // =========================================================================
    // 边界处理
    // =========================================================================

    /// 处理区间内的边界单元
    fn execute_interval(&mut self, interval: &CellInterval);

    /// 处理单个单元
    fn execute_cell(&mut self, cell: Cell) {
        self.execute_interval(&CellInterval::single(cell));
    }

    /// 处理单元列表
    fn execute_cells(&mut self, cells: &[Cell]) {
        for &cell in cells {
            self.execute_cell(cell);
        }
    }

    /// 处理前钩子
    fn before_boundary_treatment(&mut self) {}

    /// 处理后钩子
    fn after_boundary_treatment(&mut self) {}

    // =========================================================================
    // 幽灵层交换
    // =========================================================================

    /// 写出单元负载，`mask` 为单元的完整掩码
    fn pack(&self, buffer: &mut SendBuffer, mask: FlagMask, cell: Cell);

    /// 读入单元负载并置位 `mask` 中的标志
    fn unpack(&mut self, buffer: &mut RecvBuffer, mask: FlagMask, cell: Cell) -> BoundaryResult<()>;

    /// 接收 `direction` 方向邻块数据的幽灵层区间
    fn unpacking_interval(&self, direction: Direction, layers: usize) -> CellInterval {
        let field = self.flag_field().read();
        debug_assert!(layers <= field.nr_of_ghost_layers());

        let sizes = [field.x_size(), field.y_size(), field.z_size()];
        let mut interval = field.ghost_layer_interval(layers);
        for (axis, &size) in sizes.iter().enumerate() {
            match direction.component(axis) {
                1 => interval.set_min_of(axis, size as CellIdx),
                -1 => interval.set_max_of(axis, -1),
                _ => {}
            }
        }
        interval
    }

    /// 发往 `direction` 方向邻块的内部区间
    fn packing_interval(&self, direction: Direction, layers: usize) -> CellInterval {
        let (cx, cy, cz) = direction.offset();
        let l = layers as CellIdx;
        self.unpacking_interval(direction, layers)
            .shifted(-l * cx, -l * cy, -l * cz)
    }

    // =========================================================================
    // 向下转型
    // =========================================================================

    /// 用于按具体类型取回处理器
    fn as_any(&self) -> &dyn Any;

    /// 用于按具体类型取回处理器（可变）
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
