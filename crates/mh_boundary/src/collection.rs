// crates/mh_boundary/src/collection.rs

//! 边界处理器集合
//!
//! 一个网格块上的多个边界处理器共用同一个标志场。集合按固定顺序持有这些处理器，
//! 把每个操作分派给所有权掩码包含该标志的第一个处理器；不属于任何处理器的标志
//! 直接在原始标志场上读写。
//!
//! # 构造约束
//!
//! 1. 标志场至少有 1 层幽灵层
//! 2. 处理器列表非空
//! 3. 所有处理器引用同一个标志场（`Arc::ptr_eq`）和相同的外包围盒
//! 4. 处理器 UID 两两不同
//! 5. 边界 UID 在整个集合内两两不同
//! 6. 不同处理器的所有权掩码两两不相交
//!
//! # 区域参数
//!
//! 每个操作都有单元、区间（`*_interval`）、单元序列（`*_cells`）以及
//! 幽灵层数（`*_with_ghost_layers`）几种形式。区间先与外包围盒求交，
//! 交集为空时不做任何事。
//!
//! # 锁
//!
//! 集合只持有标志场的短期读写锁，调用处理器之前总是先释放。
//!
//! # 示例
//!
//! ```
//! use mh_boundary::handling::{BoundaryHandling, Boundary, DirichletBoundary};
//! use mh_boundary::{BoundaryHandlingCollection, NullConfiguration};
//! use mh_field::{shared, FlagField, GhostLayerField};
//! use mh_foundation::Cell;
//!
//! let mut flags = FlagField::new(4, 4, 4, 1).unwrap();
//! let fluid = flags.register_flag("fluid").unwrap();
//! let inlet = flags.register_flag("inlet").unwrap();
//! let flags = shared(flags);
//! let values = shared(GhostLayerField::new(4, 4, 4, 1, 0.0).unwrap());
//!
//! let conditions: Vec<Box<dyn Boundary>> = vec![Box::new(DirichletBoundary::new("inlet", inlet, 1.0))];
//! let handling = BoundaryHandling::new("fluid", flags.clone(), values, fluid, conditions).unwrap();
//! let mut collection = BoundaryHandlingCollection::new("block", flags, vec![Box::new(handling)]).unwrap();
//!
//! collection.set_flag("inlet", Cell::new(-1, 0, 0), &NullConfiguration).unwrap();
//! assert_eq!(collection.boundary_uid(inlet).unwrap().identifier(), "inlet");
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use mh_config::ConfigBlock;
use mh_field::{is_flag, FlagMask, SharedFlagField, FLAG_BITS};
use mh_foundation::{
    BoundaryHandlingCollectionUid, BoundaryHandlingUid, BoundaryUid, Cell, CellIdx, CellInterval, Direction,
    FlagUid, RecvBuffer, SendBuffer,
};

use crate::config::BoundaryConfiguration;
use crate::error::{BoundaryError, BoundaryResult};
use crate::flag::FlagSelector;
use crate::handler::BoundaryHandler;

/// 邻块标志位 -> 本地掩码
type FlagTranslation = [FlagMask; FLAG_BITS as usize];

/// 边界处理器集合
pub struct BoundaryHandlingCollection {
    uid: BoundaryHandlingCollectionUid,
    flag_field: SharedFlagField,
    outer_bb: CellInterval,
    handlers: Vec<Box<dyn BoundaryHandler>>,
}

impl BoundaryHandlingCollection {
    /// 创建集合并检查构造约束
    pub fn new(
        uid: impl Into<BoundaryHandlingCollectionUid>,
        flag_field: SharedFlagField,
        handlers: Vec<Box<dyn BoundaryHandler>>,
    ) -> BoundaryResult<Self> {
        let uid = uid.into();
        let collection = uid.to_string();

        let (ghost_layers, outer_bb) = {
            let flags = flag_field.read();
            (flags.nr_of_ghost_layers(), flags.outer_interval())
        };
        if ghost_layers == 0 {
            return Err(BoundaryError::NoGhostLayers { collection });
        }
        if handlers.is_empty() {
            return Err(BoundaryError::EmptyHandlerList { collection });
        }

        for handler in &handlers {
            if !Arc::ptr_eq(handler.flag_field(), &flag_field) || handler.outer_bb() != outer_bb {
                return Err(BoundaryError::FlagFieldMismatch {
                    collection,
                    handler: handler.uid().to_string(),
                });
            }
        }

        let mut handler_uids = HashSet::new();
        for handler in &handlers {
            if !handler_uids.insert(handler.uid().clone()) {
                return Err(BoundaryError::DuplicateHandlerUid {
                    collection,
                    handler: handler.uid().to_string(),
                });
            }
        }

        let mut boundary_uids = HashSet::new();
        for boundary in handlers.iter().flat_map(|h| h.boundary_uids()) {
            if boundary_uids.contains(&boundary) {
                return Err(BoundaryError::DuplicateBoundaryUid {
                    collection,
                    boundary: boundary.to_string(),
                });
            }
            boundary_uids.insert(boundary);
        }

        for (i, first) in handlers.iter().enumerate() {
            for second in &handlers[i + 1..] {
                let overlap = first.ownership_mask() & second.ownership_mask();
                if overlap != 0 {
                    return Err(BoundaryError::OverlappingOwnership {
                        collection,
                        first: first.uid().to_string(),
                        second: second.uid().to_string(),
                        overlap,
                    });
                }
            }
        }

        log::debug!(
            "创建边界处理器集合 '{}': {} 个处理器, 外包围盒 {}",
            uid,
            handlers.len(),
            outer_bb
        );

        Ok(Self {
            uid,
            flag_field,
            outer_bb,
            handlers,
        })
    }

    // =========================================================================
    // 基本信息
    // =========================================================================

    /// 集合 UID
    pub fn uid(&self) -> &BoundaryHandlingCollectionUid {
        &self.uid
    }

    /// 标志场
    pub fn flag_field(&self) -> &SharedFlagField {
        &self.flag_field
    }

    /// 外包围盒
    pub fn outer_bb(&self) -> CellInterval {
        self.outer_bb
    }

    /// 处理器列表
    pub fn handlers(&self) -> &[Box<dyn BoundaryHandler>] {
        &self.handlers
    }

    /// 处理器个数
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// 含 `n` 层幽灵层的区间
    pub fn ghost_layer_interval(&self, n: usize) -> CellInterval {
        self.flag_field.read().ghost_layer_interval(n)
    }

    /// 名称 -> 掩码 映射
    pub fn flag_mapping(&self) -> BTreeMap<String, FlagMask> {
        self.flag_field.read().mapping()
    }

    fn resolve(&self, flag: impl Into<FlagSelector>) -> BoundaryResult<FlagMask> {
        flag.into().resolve(&self.flag_field.read())
    }

    /// 所有权掩码包含 `flag` 的第一个处理器
    fn owner(&self, flag: FlagMask) -> Option<usize> {
        self.handlers
            .iter()
            .position(|h| h.ownership_mask() & flag == flag)
    }

    /// 构造时保证列表非空
    fn first_handler(&self) -> &dyn BoundaryHandler {
        self.handlers[0].as_ref()
    }

    // =========================================================================
    // 单元分类
    // =========================================================================

    /// 没有任何处理器占用该单元
    pub fn is_empty(&self, cell: Cell) -> bool {
        debug_assert!(self.outer_bb.contains(cell));
        self.handlers.iter().all(|h| h.is_empty(cell))
    }

    /// 每个处理器都占用该单元
    pub fn considered_by_all_handlers(&self, cell: Cell) -> bool {
        debug_assert!(self.outer_bb.contains(cell));
        self.handlers.iter().all(|h| !h.is_empty(cell))
    }

    /// 区间内每个单元都被所有处理器占用
    pub fn considered_by_all_handlers_interval(&self, interval: &CellInterval) -> bool {
        debug_assert!(self.outer_bb.contains_interval(interval));
        interval.iter().all(|cell| self.considered_by_all_handlers(cell))
    }

    /// 序列中每个单元都被所有处理器占用
    pub fn considered_by_all_handlers_cells(&self, cells: impl IntoIterator<Item = Cell>) -> bool {
        cells.into_iter().all(|cell| self.considered_by_all_handlers(cell))
    }

    /// 含 `n` 层幽灵层的区域内每个单元都被所有处理器占用
    pub fn considered_by_all_handlers_with_ghost_layers(&self, n: usize) -> bool {
        let interval = self.ghost_layer_interval(n);
        self.considered_by_all_handlers_interval(&interval)
    }

    // =========================================================================
    // 查找
    // =========================================================================

    /// 按 UID 取处理器
    pub fn handler(&self, uid: &BoundaryHandlingUid) -> BoundaryResult<&dyn BoundaryHandler> {
        self.handlers
            .iter()
            .find(|h| h.uid() == uid)
            .map(|h| h.as_ref())
            .ok_or_else(|| self.handler_not_found(uid))
    }

    /// 按 UID 和具体类型取处理器
    pub fn boundary_handling<T: BoundaryHandler>(&self, uid: &BoundaryHandlingUid) -> BoundaryResult<&T> {
        self.handlers
            .iter()
            .filter(|h| h.uid() == uid)
            .find_map(|h| h.as_any().downcast_ref::<T>())
            .ok_or_else(|| self.handler_not_found(uid))
    }

    /// 按 UID 和具体类型取处理器（可变）
    pub fn boundary_handling_mut<T: BoundaryHandler>(
        &mut self,
        uid: &BoundaryHandlingUid,
    ) -> BoundaryResult<&mut T> {
        let err = self.handler_not_found(uid);
        self.handlers
            .iter_mut()
            .filter(|h| h.uid() == uid)
            .find_map(|h| h.as_any_mut().downcast_mut::<T>())
            .ok_or(err)
    }

    fn handler_not_found(&self, uid: &BoundaryHandlingUid) -> BoundaryError {
        BoundaryError::HandlerNotFound {
            collection: self.uid.to_string(),
            handler: uid.to_string(),
        }
    }

    /// 所有权掩码包含 `flag` 的处理器个数
    pub fn number_of_matching_handlers(&self, flag: FlagMask) -> usize {
        debug_assert!(is_flag(flag));
        self.handlers
            .iter()
            .filter(|h| h.ownership_mask() & flag == flag)
            .count()
    }

    /// 域掩码包含 `flag` 的处理器个数
    pub fn number_of_matching_handlers_for_domain(&self, flag: FlagMask) -> usize {
        debug_assert!(is_flag(flag));
        self.handlers
            .iter()
            .filter(|h| h.domain_mask() & flag == flag)
            .count()
    }

    /// 边界掩码包含 `flag` 的处理器个数
    pub fn number_of_matching_handlers_for_boundary(&self, flag: FlagMask) -> usize {
        debug_assert!(is_flag(flag));
        self.handlers
            .iter()
            .filter(|h| h.boundary_mask() & flag == flag)
            .count()
    }

    /// 是否有处理器承载该边界条件
    pub fn contains_boundary_condition(&self, uid: &BoundaryUid) -> bool {
        self.handlers.iter().any(|h| h.contains_boundary_condition(uid))
    }

    /// 是否有处理器以该标志承载边界条件，未注册的名称返回 false
    pub fn contains_boundary_condition_flag(&self, flag: impl Into<FlagSelector>) -> bool {
        match self.resolve(flag) {
            Ok(mask) => self.handlers.iter().any(|h| h.contains_boundary_condition_flag(mask)),
            Err(_) => false,
        }
    }

    /// 边界条件的标志位，无处理器承载时为 0
    pub fn boundary_mask(&self, uid: &BoundaryUid) -> FlagMask {
        self.handlers
            .iter()
            .find(|h| h.contains_boundary_condition(uid))
            .map_or(0, |h| h.boundary_mask_of(uid))
    }

    /// 使用该标志的边界条件
    pub fn boundary_uid(&self, flag: impl Into<FlagSelector>) -> BoundaryResult<BoundaryUid> {
        let flag = self.resolve(flag)?;
        debug_assert!(is_flag(flag));

        let name = {
            let flags = self.flag_field.read();
            if !flags.is_registered(flag) {
                return Err(BoundaryError::UnregisteredFlag {
                    collection: self.uid.to_string(),
                    flag,
                });
            }
            flags.flag_uid(flag).map(FlagUid::to_string)
        };

        self.handlers
            .iter()
            .find_map(|h| h.boundary_uid(flag))
            .ok_or_else(|| BoundaryError::UnhandledFlag {
                collection: self.uid.to_string(),
                flag: name.unwrap_or_else(|| format!("0x{:08x}", flag)),
            })
    }

    /// 由承载该边界条件的处理器构造参数
    pub fn create_boundary_configuration(
        &self,
        uid: &BoundaryUid,
        config: &ConfigBlock,
    ) -> BoundaryResult<Arc<dyn BoundaryConfiguration>> {
        match self.handlers.iter().find(|h| h.contains_boundary_condition(uid)) {
            Some(handler) => handler.create_boundary_configuration(uid, config),
            None => Err(BoundaryError::BoundaryNotFound {
                collection: self.uid.to_string(),
                boundary: uid.to_string(),
            }),
        }
    }

    /// 全部边界 UID（按处理器顺序）
    pub fn boundary_uids(&self) -> Vec<BoundaryUid> {
        self.handlers.iter().flat_map(|h| h.boundary_uids()).collect()
    }

    // =========================================================================
    // 置位
    // =========================================================================

    /// 置位，单元在外包围盒之外时不做任何事
    ///
    /// 调用前该标志不得已置位（调试构建中检查）。
    pub fn set_flag(
        &mut self,
        flag: impl Into<FlagSelector>,
        cell: Cell,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        if !self.outer_bb.contains(cell) {
            return Ok(());
        }
        debug_assert!(!self.flag_field.read().is_flag_set(cell, flag));
        self.set_flag_at(flag, cell, param)
    }

    /// 区间置位，区间先与外包围盒求交
    pub fn set_flag_interval(
        &mut self,
        flag: impl Into<FlagSelector>,
        interval: &CellInterval,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        let local = self.outer_bb.intersect(interval);
        if local.is_empty() {
            return Ok(());
        }

        match self.owner(flag) {
            Some(i) => {
                {
                    let mut flags = self.flag_field.write();
                    for cell in &local {
                        flags.remove_flag(cell, flag);
                    }
                }
                self.handlers[i].set_flag_interval(flag, &local, param)
            }
            None => {
                let mut flags = self.flag_field.write();
                for cell in &local {
                    flags.add_flag(cell, flag);
                }
                Ok(())
            }
        }
    }

    /// 对序列中的单元置位
    pub fn set_flag_cells(
        &mut self,
        flag: impl Into<FlagSelector>,
        cells: impl IntoIterator<Item = Cell>,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        for cell in cells {
            self.set_flag(flag, cell, param)?;
        }
        Ok(())
    }

    fn set_flag_at(&mut self, flag: FlagMask, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()> {
        debug_assert!(self.outer_bb.contains(cell));

        match self.owner(flag) {
            Some(i) => {
                self.flag_field.write().remove_flag(cell, flag);
                log::trace!("集合 '{}': 单元 {} 标志 0x{:08x} -> '{}'", self.uid, cell, flag, self.handlers[i].uid());
                self.handlers[i].set_flag(flag, cell, param)
            }
            None => {
                self.flag_field.write().add_flag(cell, flag);
                Ok(())
            }
        }
    }

    // =========================================================================
    // 强制置位
    // =========================================================================

    /// 强制置位：先移除同一所有权组中已有的标志，再置位
    pub fn force_flag(
        &mut self,
        flag: impl Into<FlagSelector>,
        cell: Cell,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        if !self.outer_bb.contains(cell) {
            return Ok(());
        }
        self.force_flag_at(flag, cell, param)
    }

    /// 区间强制置位
    pub fn force_flag_interval(
        &mut self,
        flag: impl Into<FlagSelector>,
        interval: &CellInterval,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        let local = self.outer_bb.intersect(interval);
        for cell in &local {
            self.force_flag_at(flag, cell, param)?;
        }
        Ok(())
    }

    /// 对序列中的单元强制置位
    pub fn force_flag_cells(
        &mut self,
        flag: impl Into<FlagSelector>,
        cells: impl IntoIterator<Item = Cell>,
        param: &dyn BoundaryConfiguration,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        for cell in cells {
            self.force_flag(flag, cell, param)?;
        }
        Ok(())
    }

    fn force_flag_at(&mut self, flag: FlagMask, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()> {
        let to_remove = self.flags_to_remove(flag, cell);
        for bit in 0..FLAG_BITS {
            let single: FlagMask = 1 << bit;
            if to_remove & single != 0 {
                self.remove_flag_at(single, cell);
            }
        }
        self.set_flag_at(flag, cell, param)
    }

    /// 所有权掩码包含 `flag` 的处理器在该单元上已置的位
    fn flags_to_remove(&self, flag: FlagMask, cell: Cell) -> FlagMask {
        let current = self.flag_field.read().get(cell);
        self.handlers
            .iter()
            .map(|h| h.ownership_mask())
            .filter(|&ownership| ownership & flag == flag)
            .fold(0, |acc, ownership| acc | (ownership & current))
    }

    // =========================================================================
    // 清位
    // =========================================================================

    /// 清位，未置位时不做任何事
    pub fn remove_flag(&mut self, flag: impl Into<FlagSelector>, cell: Cell) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        self.remove_flag_checked(flag, cell);
        Ok(())
    }

    /// 区间清位
    pub fn remove_flag_interval(&mut self, flag: impl Into<FlagSelector>, interval: &CellInterval) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        let local = self.outer_bb.intersect(interval);
        for cell in &local {
            self.remove_flag_checked(flag, cell);
        }
        Ok(())
    }

    /// 对序列中的单元清位
    pub fn remove_flag_cells(
        &mut self,
        flag: impl Into<FlagSelector>,
        cells: impl IntoIterator<Item = Cell>,
    ) -> BoundaryResult<()> {
        let flag = self.resolve(flag)?;
        for cell in cells {
            self.remove_flag_checked(flag, cell);
        }
        Ok(())
    }

    /// 在含 `n` 层幽灵层的区域内清位
    pub fn remove_flag_with_ghost_layers(&mut self, flag: impl Into<FlagSelector>, n: usize) -> BoundaryResult<()> {
        let interval = self.ghost_layer_interval(n);
        self.remove_flag_interval(flag, &interval)
    }

    fn remove_flag_checked(&mut self, flag: FlagMask, cell: Cell) {
        if !self.outer_bb.contains(cell) || !self.flag_field.read().is_flag_set(cell, flag) {
            return;
        }
        self.remove_flag_at(flag, cell);
    }

    fn remove_flag_at(&mut self, flag: FlagMask, cell: Cell) {
        debug_assert!(self.outer_bb.contains(cell));

        if let Some(i) = self.owner(flag) {
            self.flag_field.write().add_flag(cell, flag);
            self.handlers[i].remove_flag(flag, cell);
        }
        self.flag_field.write().remove_flag(cell, flag);
    }

    // =========================================================================
    // 清除
    // =========================================================================

    /// 清除单元上所有处理器拥有的标志，不属于任何处理器的标志保留
    pub fn clear(&mut self, cell: Cell) {
        if self.outer_bb.contains(cell) {
            self.clear_at(cell);
        }
    }

    /// 区间清除
    pub fn clear_interval(&mut self, interval: &CellInterval) {
        let local = self.outer_bb.intersect(interval);
        for cell in &local {
            self.clear_at(cell);
        }
    }

    /// 清除序列中的单元
    pub fn clear_cells(&mut self, cells: impl IntoIterator<Item = Cell>) {
        for cell in cells {
            self.clear(cell);
        }
    }

    /// 清除含 `n` 层幽灵层的区域
    pub fn clear_with_ghost_layers(&mut self, n: usize) {
        let interval = self.ghost_layer_interval(n);
        self.clear_interval(&interval);
    }

    /// 每个处理器都面对清除前的单元状态；被清除位之并最后统一清除
    fn clear_at(&mut self, cell: Cell) {
        let flag_field = &self.flag_field;
        let mut removed: FlagMask = 0;
        for handler in self.handlers.iter_mut() {
            let before = flag_field.read().get(cell);
            handler.clear(cell);
            let mut flags = flag_field.write();
            removed |= before ^ flags.get(cell);
            flags.set(cell, before);
        }
        self.flag_field.write().remove_mask(cell, removed);
    }

    // =========================================================================
    // 维护
    // =========================================================================

    /// 重建含 `n` 层幽灵层区域的近边界缓存
    pub fn refresh(&mut self, n: usize) {
        let interval = self.ghost_layer_interval(n);
        self.refresh_interval(&interval);
    }

    /// 重建区间内的近边界缓存
    pub fn refresh_interval(&mut self, interval: &CellInterval) {
        for handler in self.handlers.iter_mut() {
            handler.refresh(interval);
        }
    }

    /// 重建最外 `thickness` 层的近边界缓存
    pub fn refresh_outermost_layer(&mut self, thickness: CellIdx) {
        for handler in self.handlers.iter_mut() {
            handler.refresh_outermost_layer(thickness);
        }
    }

    /// 含 `n` 层幽灵层区域内所有处理器是否一致
    pub fn check_consistency(&self, n: usize) -> bool {
        let interval = self.ghost_layer_interval(n);
        self.check_consistency_interval(&interval)
    }

    /// 区间内所有处理器是否一致
    pub fn check_consistency_interval(&self, interval: &CellInterval) -> bool {
        self.handlers.iter().all(|h| h.check_consistency(interval))
    }

    // =========================================================================
    // 边界处理
    // =========================================================================

    /// 依次调用各处理器的处理前钩子
    pub fn before_boundary_treatment(&mut self) {
        for handler in self.handlers.iter_mut() {
            handler.before_boundary_treatment();
        }
    }

    /// 处理含 `n` 层幽灵层的区域
    pub fn treat(&mut self, n: usize) {
        let interval = self.ghost_layer_interval(n);
        self.treat_interval(&interval);
    }

    /// 处理单个单元
    pub fn treat_cell(&mut self, cell: Cell) {
        for handler in self.handlers.iter_mut() {
            handler.execute_cell(cell);
        }
    }

    /// 处理区间
    pub fn treat_interval(&mut self, interval: &CellInterval) {
        for handler in self.handlers.iter_mut() {
            handler.execute_interval(interval);
        }
    }

    /// 处理序列中的单元
    pub fn treat_cells(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let cells: Vec<Cell> = cells.into_iter().collect();
        for handler in self.handlers.iter_mut() {
            handler.execute_cells(&cells);
        }
    }

    /// 依次调用各处理器的处理后钩子
    pub fn after_boundary_treatment(&mut self) {
        for handler in self.handlers.iter_mut() {
            handler.after_boundary_treatment();
        }
    }

    /// 完整的一次边界处理：前钩子、处理、后钩子
    pub fn run_treatment(&mut self, n: usize) {
        self.before_boundary_treatment();
        self.treat(n);
        self.after_boundary_treatment();
    }

    // =========================================================================
    // 幽灵层交换
    // =========================================================================

    /// 发往 `direction` 方向邻块的内部区间
    pub fn packing_interval(&self, direction: Direction, layers: usize) -> CellInterval {
        self.first_handler().packing_interval(direction, layers)
    }

    /// 接收 `direction` 方向邻块数据的幽灵层区间
    pub fn unpacking_interval(&self, direction: Direction, layers: usize) -> CellInterval {
        self.first_handler().unpacking_interval(direction, layers)
    }

    /// 打包发往 `direction` 方向邻块的 `layers` 层
    ///
    /// `assume_identical` 为 false 时先写出本地 名称->掩码 字典。
    /// 每个单元写出原始掩码，再由所有权掩码与之相交的处理器依次写出负载。
    pub fn pack(&self, buffer: &mut SendBuffer, direction: Direction, layers: usize, assume_identical: bool) {
        debug_assert!(layers <= self.flag_field.read().nr_of_ghost_layers());
        let start = buffer.len();

        if !assume_identical {
            buffer.put_mapping(&self.flag_mapping());
        }

        let interval = self.packing_interval(direction, layers);
        let masks: Vec<(Cell, FlagMask)> = {
            let flags = self.flag_field.read();
            interval.iter().map(|cell| (cell, flags.get(cell))).collect()
        };

        for (cell, mask) in masks {
            buffer.put(mask);
            for handler in &self.handlers {
                if handler.ownership_mask() & mask != 0 {
                    handler.pack(buffer, mask, cell);
                }
            }
        }

        log::debug!(
            "集合 '{}': 打包 {} 方向 {} 层, {} 个单元, {} 字节",
            self.uid,
            direction,
            layers,
            interval.num_cells(),
            buffer.len() - start
        );
    }

    /// 解包来自邻块的数据
    ///
    /// `direction` 为本块上接收数据的幽灵层方向，即发送方方向的反向。
    /// 接收区间先整体清除，之后逐单元写入翻译后的掩码并交给相关处理器解包负载。
    pub fn unpack(
        &mut self,
        buffer: &mut RecvBuffer,
        direction: Direction,
        layers: usize,
        assume_identical: bool,
    ) -> BoundaryResult<()> {
        debug_assert!(layers <= self.flag_field.read().nr_of_ghost_layers());

        let translation = if assume_identical {
            None
        } else {
            self.neighbor_flag_translation(buffer)?
        };

        let interval = self.unpacking_interval(direction, layers);
        self.clear_interval(&interval);

        for cell in &interval {
            let raw: FlagMask = buffer.get()?;
            let mask = match &translation {
                Some(table) => translate_mask(raw, table),
                None => raw,
            };

            self.flag_field.write().set(cell, mask);
            for handler in self.handlers.iter_mut() {
                let owned = handler.ownership_mask() & mask;
                if owned != 0 {
                    self.flag_field.write().remove_mask(cell, owned);
                    handler.unpack(buffer, owned, cell)?;
                }
            }
        }

        log::debug!(
            "集合 '{}': 解包 {} 方向 {} 层, {} 个单元",
            self.uid,
            direction,
            layers,
            interval.num_cells()
        );
        Ok(())
    }

    /// 读取邻块字典并建立翻译表，映射与本地一致时返回 `None`
    fn neighbor_flag_translation(&self, buffer: &mut RecvBuffer) -> BoundaryResult<Option<FlagTranslation>> {
        let neighbor = buffer.get_mapping::<FlagMask>()?;
        let flags = self.flag_field.read();

        let mut table: FlagTranslation = [0; FLAG_BITS as usize];
        let mut identical = true;
        for (name, &neighbor_mask) in &neighbor {
            let local = flags.flag(&FlagUid::new(name)).ok_or_else(|| BoundaryError::UnknownNeighborFlag {
                collection: self.uid.to_string(),
                flag: name.clone(),
            })?;
            identical &= local == neighbor_mask;
            for bit in 0..FLAG_BITS {
                if neighbor_mask & (1 << bit) != 0 {
                    table[bit as usize] = local;
                }
            }
        }

        Ok(if identical { None } else { Some(table) })
    }
}

/// 按翻译表映射掩码，未出现在表中的位丢弃
fn translate_mask(mask: FlagMask, table: &FlagTranslation) -> FlagMask {
    (0..FLAG_BITS)
        .filter(|&bit| mask & (1 << bit) != 0)
        .fold(0, |acc, bit| acc | table[bit as usize])
}

/// 集合之间永不相等
impl PartialEq for BoundaryHandlingCollection {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl fmt::Display for BoundaryHandlingCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========================= BoundaryHandlingCollection =========================")?;
        writeln!(f)?;
        writeln!(f, "Identifier: {}", self.uid)?;
        writeln!(f)?;
        writeln!(f, "Included Boundary Handlers:")?;
        writeln!(f)?;
        for handler in &self.handlers {
            write!(f, "{}", handler)?;
        }
        writeln!(f)?;
        writeln!(f, "========================= BoundaryHandlingCollection =========================")
    }
}

impl fmt::Debug for BoundaryHandlingCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryHandlingCollection")
            .field("uid", &self.uid)
            .field("outer_bb", &self.outer_bb)
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.uid().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NullConfiguration;
    use crate::handling::{Boundary, BoundaryHandling, DirichletBoundary, ZeroGradientBoundary};
    use mh_field::{shared, FlagField, GhostLayerField};

    struct Fixture {
        collection: BoundaryHandlingCollection,
        fluid: FlagMask,
        inlet: FlagMask,
        outlet: FlagMask,
        solid: FlagMask,
        marker: FlagMask,
    }

    fn fixture() -> Fixture {
        let mut flags = FlagField::new(4, 3, 2, 1).unwrap();
        let fluid = flags.register_flag("fluid").unwrap();
        let inlet = flags.register_flag("inlet").unwrap();
        let outlet = flags.register_flag("outlet").unwrap();
        let solid = flags.register_flag("solid").unwrap();
        let marker = flags.register_flag("marker").unwrap();
        let flags = shared(flags);
        let values = shared(GhostLayerField::new(4, 3, 2, 1, 0.0).unwrap());

        let a: Vec<Box<dyn Boundary>> = vec![Box::new(DirichletBoundary::new("inlet", inlet, 1.0))];
        let b: Vec<Box<dyn Boundary>> = vec![Box::new(ZeroGradientBoundary::new("outlet", outlet))];
        let ha = BoundaryHandling::new("a", flags.clone(), values.clone(), fluid, a).unwrap();
        let hb = BoundaryHandling::new("b", flags.clone(), values, solid, b).unwrap();
        let collection = BoundaryHandlingCollection::new("block", flags, vec![Box::new(ha), Box::new(hb)]).unwrap();

        Fixture {
            collection,
            fluid,
            inlet,
            outlet,
            solid,
            marker,
        }
    }

    #[test]
    fn test_routing_and_raw_flags() {
        let Fixture {
            mut collection,
            inlet,
            marker,
            ..
        } = fixture();
        let c = Cell::new(0, 0, 0);

        collection.set_flag(inlet, c, &NullConfiguration).unwrap();
        collection.set_flag("marker", c, &NullConfiguration).unwrap();
        assert_eq!(collection.flag_field().read().get(c), inlet | marker);

        let a = collection.boundary_handling::<BoundaryHandling>(&"a".into()).unwrap();
        let dirichlet = a.condition(&"inlet".into()).unwrap();
        assert!(dirichlet.is_registered(c));

        assert_eq!(collection.number_of_matching_handlers(inlet), 1);
        assert_eq!(collection.number_of_matching_handlers(marker), 0);
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let Fixture { mut collection, fluid, .. } = fixture();
        collection.set_flag(fluid, Cell::new(10, 0, 0), &NullConfiguration).unwrap();
        collection.remove_flag(fluid, Cell::new(10, 0, 0)).unwrap();
        collection.clear(Cell::new(-5, 0, 0));

        let flags = collection.flag_field().read();
        assert!(collection.outer_bb().iter().all(|c| flags.get(c) == 0));
    }

    #[test]
    fn test_force_flag_replaces_same_group() {
        let Fixture {
            mut collection,
            fluid,
            inlet,
            solid,
            ..
        } = fixture();
        let c = Cell::new(1, 1, 1);

        collection.set_flag(fluid, c, &NullConfiguration).unwrap();
        collection.set_flag(solid, c, &NullConfiguration).unwrap();
        collection.force_flag(inlet, c, &NullConfiguration).unwrap();
        collection.force_flag(inlet, c, &NullConfiguration).unwrap();

        assert_eq!(collection.flag_field().read().get(c), inlet | solid);
        assert!(collection.check_consistency(1));
    }

    #[test]
    fn test_clear_keeps_unowned_bits() {
        let Fixture {
            mut collection,
            inlet,
            outlet,
            marker,
            ..
        } = fixture();
        let c = Cell::new(2, 0, 1);

        collection.set_flag(inlet, c, &NullConfiguration).unwrap();
        collection.set_flag(outlet, c, &NullConfiguration).unwrap();
        collection.set_flag(marker, c, &NullConfiguration).unwrap();
        collection.clear(c);

        assert_eq!(collection.flag_field().read().get(c), marker);
        assert!(collection.is_empty(c));
        assert!(collection.check_consistency(1));
    }

    #[test]
    fn test_lookup_errors() {
        let Fixture { collection, fluid, .. } = fixture();

        assert!(matches!(
            collection.boundary_uid(fluid),
            Err(BoundaryError::UnhandledFlag { flag, .. }) if flag == "fluid"
        ));
        assert!(matches!(
            collection.boundary_uid(1u32 << 20),
            Err(BoundaryError::UnregisteredFlag { .. })
        ));
        assert!(matches!(collection.boundary_uid("nope"), Err(BoundaryError::UnknownFlag(_))));
        assert!(matches!(
            collection.boundary_handling::<BoundaryHandling>(&"zzz".into()),
            Err(BoundaryError::HandlerNotFound { .. })
        ));
        assert!(matches!(
            collection.create_boundary_configuration(&"nope".into(), &ConfigBlock::empty("x")),
            Err(BoundaryError::BoundaryNotFound { .. })
        ));
        assert!(!collection.contains_boundary_condition_flag("nope"));
        assert!(collection.contains_boundary_condition_flag("outlet"));
        assert_eq!(collection.boundary_mask(&"nope".into()), 0);
    }

    #[test]
    fn test_pack_appends_to_buffer() {
        let Fixture {
            mut collection, inlet, ..
        } = fixture();
        collection.set_flag(inlet, Cell::new(3, 1, 0), &NullConfiguration).unwrap();

        let mut fresh = SendBuffer::new();
        collection.pack(&mut fresh, Direction::E, 1, false);

        let mut shared_buffer = SendBuffer::new();
        shared_buffer.put(7u64);
        let prefix = shared_buffer.len();
        collection.pack(&mut shared_buffer, Direction::E, 1, false);

        assert_eq!(shared_buffer.len() - prefix, fresh.len());
        assert_eq!(&shared_buffer.as_bytes()[prefix..], fresh.as_bytes());
    }

    #[test]
    fn test_translate_mask() {
        let mut table: FlagTranslation = [0; FLAG_BITS as usize];
        table[0] = 1 << 3;
        table[2] = 1 << 0;
        assert_eq!(translate_mask(0b101, &table), 0b1001);
        assert_eq!(translate_mask(0b010, &table), 0);
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn test_never_equal_and_display() {
        let Fixture { collection, .. } = fixture();
        assert!(collection != collection);
        let text = collection.to_string();
        assert!(text.contains("Identifier: block"));
        assert!(text.contains("BoundaryHandling 'a'"));
        assert!(text.contains("BoundaryHandling 'b'"));
    }
}
