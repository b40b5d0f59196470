// crates/mh_boundary/src/handling/mod.rs

//! 参考边界处理器
//!
//! [`BoundaryHandling`] 拥有一个域标志和若干边界条件（[`Boundary`]），
//! 每个边界条件占用一个标志位。处理器维护：
//!
//! - 每个边界条件的登记单元（置位/清位/解包时同步）
//! - 近边界缓存：D3Q26 邻域内存在边界单元的域单元
//!
//! 边界处理时遍历区间内的边界单元，交给对应边界条件更新数值场。
//!
//! # 子模块
//!
//! - [`dirichlet`]: 固定值边界
//! - [`zero_gradient`]: 零梯度边界

pub mod dirichlet;
pub mod zero_gradient;

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use mh_config::{BoundaryKindConfig, ConfigBlock, HandlerSetup};
use mh_field::{is_flag, FlagField, FlagMask, ScalarField, SharedFlagField, SharedScalarField};
use mh_foundation::{
    BoundaryHandlingUid, BoundaryUid, Cell, CellInterval, Direction, FlagUid, RecvBuffer, SendBuffer,
};

use crate::config::BoundaryConfiguration;
use crate::error::{BoundaryError, BoundaryResult};
use crate::handler::BoundaryHandler;

pub use dirichlet::{DirichletBoundary, DirichletConfiguration};
pub use zero_gradient::ZeroGradientBoundary;

// ============================================================
// 边界条件接口
// ============================================================

/// 单个边界条件
///
/// 占用一个标志位，管理该标志所在单元的私有数据。
pub trait Boundary: fmt::Debug + Send + Sync {
    /// 边界 UID
    fn uid(&self) -> &BoundaryUid;

    /// 占用的标志位
    fn mask(&self) -> FlagMask;

    /// 由配置块构造参数
    fn create_configuration(&self, config: &ConfigBlock) -> BoundaryResult<Arc<dyn BoundaryConfiguration>>;

    /// 登记单元
    fn register_cell(&mut self, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()>;

    /// 注销单元
    fn unregister_cell(&mut self, cell: Cell);

    /// 单元是否已登记
    fn is_registered(&self, cell: Cell) -> bool;

    /// 更新边界单元的数值
    fn treat(&self, cell: Cell, flags: &FlagField, domain_mask: FlagMask, values: &mut ScalarField);

    /// 写出单元负载
    fn pack_cell(&self, buffer: &mut SendBuffer, cell: Cell);

    /// 读入单元负载并登记单元
    fn unpack_cell(&mut self, buffer: &mut RecvBuffer, cell: Cell) -> BoundaryResult<()>;

    /// 处理前钩子
    fn before_treatment(&mut self) {}

    /// 处理后钩子
    fn after_treatment(&mut self) {}

    /// 用于按具体类型取回边界条件
    fn as_any(&self) -> &dyn Any;
}

// ============================================================
// 参考处理器
// ============================================================

/// 参考边界处理器
pub struct BoundaryHandling {
    uid: BoundaryHandlingUid,
    flag_field: SharedFlagField,
    values: SharedScalarField,
    outer_bb: CellInterval,
    domain_mask: FlagMask,
    boundary_mask: FlagMask,
    conditions: Vec<Box<dyn Boundary>>,
    near_boundary: BTreeSet<Cell>,
}

impl BoundaryHandling {
    /// 创建处理器
    ///
    /// 每个边界条件必须占用一个已注册的标志位，且与其他边界条件和域掩码互不重叠。
    pub fn new(
        uid: impl Into<BoundaryHandlingUid>,
        flag_field: SharedFlagField,
        values: SharedScalarField,
        domain_mask: FlagMask,
        conditions: Vec<Box<dyn Boundary>>,
    ) -> BoundaryResult<Self> {
        let uid = uid.into();
        let outer_bb = flag_field.read().outer_interval();

        if values.read().outer_interval() != outer_bb {
            return Err(BoundaryError::invalid_parameter(format!(
                "处理器 '{}': 数值场与标志场尺寸不一致",
                uid
            )));
        }

        let mut boundary_mask: FlagMask = 0;
        {
            let flags = flag_field.read();
            if domain_mask != 0 && !flags.is_registered(domain_mask) {
                return Err(BoundaryError::invalid_parameter(format!(
                    "处理器 '{}': 域掩码 0x{:08x} 含未注册位",
                    uid, domain_mask
                )));
            }
            for condition in &conditions {
                let mask = condition.mask();
                if !is_flag(mask) || !flags.is_registered(mask) {
                    return Err(BoundaryError::invalid_parameter(format!(
                        "处理器 '{}': 边界 '{}' 的标志 0x{:08x} 不是已注册的单一标志",
                        uid,
                        condition.uid(),
                        mask
                    )));
                }
                if mask & (boundary_mask | domain_mask) != 0 {
                    return Err(BoundaryError::invalid_parameter(format!(
                        "处理器 '{}': 边界 '{}' 的标志与其他标志重叠",
                        uid,
                        condition.uid()
                    )));
                }
                boundary_mask |= mask;
            }
        }

        let mut seen = BTreeSet::new();
        for condition in &conditions {
            if !seen.insert(condition.uid().clone()) {
                return Err(BoundaryError::invalid_parameter(format!(
                    "处理器 '{}': 边界 '{}' 重复",
                    uid,
                    condition.uid()
                )));
            }
        }

        log::debug!(
            "创建边界处理器 '{}': 域掩码 0x{:08x}, 边界掩码 0x{:08x}, {} 个边界条件",
            uid,
            domain_mask,
            boundary_mask,
            conditions.len()
        );

        Ok(Self {
            uid,
            flag_field,
            values,
            outer_bb,
            domain_mask,
            boundary_mask,
            conditions,
            near_boundary: BTreeSet::new(),
        })
    }

    /// 按布置创建处理器，标志名不存在时注册
    pub fn from_setup(
        setup: &HandlerSetup,
        flag_field: SharedFlagField,
        values: SharedScalarField,
    ) -> BoundaryResult<Self> {
        let mut conditions: Vec<Box<dyn Boundary>> = Vec::with_capacity(setup.boundaries.len());
        let domain_mask = {
            let mut flags = flag_field.write();
            let domain_mask = register_or_get(&mut flags, &setup.domain_flag)?;
            for boundary in &setup.boundaries {
                let mask = register_or_get(&mut flags, &boundary.name)?;
                let condition: Box<dyn Boundary> = match boundary.kind {
                    BoundaryKindConfig::Dirichlet => {
                        Box::new(DirichletBoundary::new(boundary.name.as_str(), mask, boundary.value))
                    }
                    BoundaryKindConfig::ZeroGradient => {
                        Box::new(ZeroGradientBoundary::new(boundary.name.as_str(), mask))
                    }
                };
                conditions.push(condition);
            }
            domain_mask
        };
        Self::new(setup.uid.as_str(), flag_field, values, domain_mask, conditions)
    }

    /// 数值场
    pub fn values(&self) -> &SharedScalarField {
        &self.values
    }

    /// 边界条件
    pub fn conditions(&self) -> &[Box<dyn Boundary>] {
        &self.conditions
    }

    /// 按 UID 取边界条件
    pub fn condition(&self, uid: &BoundaryUid) -> Option<&dyn Boundary> {
        self.conditions.iter().find(|c| c.uid() == uid).map(|c| c.as_ref())
    }

    /// 是否为近边界域单元
    pub fn is_near_boundary(&self, cell: Cell) -> bool {
        self.near_boundary.contains(&cell)
    }

    /// 近边界域单元数
    pub fn near_boundary_len(&self) -> usize {
        self.near_boundary.len()
    }

    fn condition_index(&self, flag: FlagMask) -> Option<usize> {
        self.conditions.iter().position(|c| c.mask() == flag)
    }

    fn compute_near_boundary(&self, flags: &FlagField, cell: Cell) -> bool {
        flags.is_part_of_mask_set(cell, self.domain_mask)
            && Direction::D3Q26.iter().any(|&dir| {
                let n = cell.neighbor(dir);
                flags.contains(n) && flags.is_part_of_mask_set(n, self.boundary_mask)
            })
    }

    fn refresh_cell(&mut self, flags: &FlagField, cell: Cell) {
        if self.compute_near_boundary(flags, cell) {
            self.near_boundary.insert(cell);
        } else {
            self.near_boundary.remove(&cell);
        }
    }

    /// 单元及其 D3Q26 邻居的近边界状态
    fn refresh_around(&mut self, cell: Cell) {
        let flag_field = Arc::clone(&self.flag_field);
        let flags = flag_field.read();
        let outer_bb = self.outer_bb;
        let region = CellInterval::single(cell).expanded(1).intersect(&outer_bb);
        for c in &region {
            self.refresh_cell(&flags, c);
        }
    }
}

fn register_or_get(flags: &mut FlagField, name: &str) -> BoundaryResult<FlagMask> {
    let uid = FlagUid::new(name);
    match flags.flag(&uid) {
        Some(mask) => Ok(mask),
        None => Ok(flags.register_flag(uid)?),
    }
}

impl BoundaryHandler for BoundaryHandling {
    fn uid(&self) -> &BoundaryHandlingUid {
        &self.uid
    }

    fn flag_field(&self) -> &SharedFlagField {
        &self.flag_field
    }

    fn outer_bb(&self) -> CellInterval {
        self.outer_bb
    }

    fn domain_mask(&self) -> FlagMask {
        self.domain_mask
    }

    fn boundary_mask(&self) -> FlagMask {
        self.boundary_mask
    }

    fn is_empty(&self, cell: Cell) -> bool {
        !self.flag_field.read().is_part_of_mask_set(cell, self.ownership_mask())
    }

    fn boundary_uids(&self) -> Vec<BoundaryUid> {
        self.conditions.iter().map(|c| c.uid().clone()).collect()
    }

    fn contains_boundary_condition_flag(&self, flag: FlagMask) -> bool {
        self.condition_index(flag).is_some()
    }

    fn boundary_mask_of(&self, uid: &BoundaryUid) -> FlagMask {
        self.condition(uid).map_or(0, |c| c.mask())
    }

    fn boundary_uid(&self, flag: FlagMask) -> Option<BoundaryUid> {
        self.condition_index(flag).map(|i| self.conditions[i].uid().clone())
    }

    fn create_boundary_configuration(
        &self,
        uid: &BoundaryUid,
        config: &ConfigBlock,
    ) -> BoundaryResult<Arc<dyn BoundaryConfiguration>> {
        match self.condition(uid) {
            Some(condition) => condition.create_configuration(config),
            None => Err(BoundaryError::BoundaryNotFound {
                collection: self.uid.to_string(),
                boundary: uid.to_string(),
            }),
        }
    }

    fn check_consistency(&self, interval: &CellInterval) -> bool {
        let flags = self.flag_field.read();
        let region = interval.intersect(&self.outer_bb);
        let ownership = self.ownership_mask();

        for cell in &region {
            let mask = flags.get(cell);
            if (mask & ownership).count_ones() > 1 {
                log::warn!("处理器 '{}': 单元 {} 同时带有多个本处理器标志 0x{:08x}", self.uid, cell, mask);
                return false;
            }
            for condition in &self.conditions {
                if condition.is_registered(cell) != (mask & condition.mask() != 0) {
                    log::warn!("处理器 '{}': 边界 '{}' 在单元 {} 的登记与标志不一致", self.uid, condition.uid(), cell);
                    return false;
                }
            }
            if self.near_boundary.contains(&cell) != self.compute_near_boundary(&flags, cell) {
                log::warn!("处理器 '{}': 单元 {} 的近边界缓存过期", self.uid, cell);
                return false;
            }
        }
        true
    }

    fn refresh(&mut self, interval: &CellInterval) {
        let flag_field = Arc::clone(&self.flag_field);
        let flags = flag_field.read();
        let region = interval.intersect(&self.outer_bb);
        for cell in &region {
            self.refresh_cell(&flags, cell);
        }
    }

    fn set_flag(&mut self, flag: FlagMask, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()> {
        debug_assert!(self.outer_bb.contains(cell));
        debug_assert!(is_flag(flag) && flag & self.ownership_mask() == flag);

        if let Some(i) = self.condition_index(flag) {
            self.conditions[i].register_cell(cell, param)?;
        }
        self.flag_field.write().add_flag(cell, flag);
        log::trace!("处理器 '{}': 单元 {} 置位 0x{:08x}", self.uid, cell, flag);
        self.refresh_around(cell);
        Ok(())
    }

    fn remove_flag(&mut self, flag: FlagMask, cell: Cell) {
        debug_assert!(self.outer_bb.contains(cell));

        if let Some(i) = self.condition_index(flag) {
            self.conditions[i].unregister_cell(cell);
        }
        self.flag_field.write().remove_flag(cell, flag);
        log::trace!("处理器 '{}': 单元 {} 清位 0x{:08x}", self.uid, cell, flag);
        self.refresh_around(cell);
    }

    fn clear(&mut self, cell: Cell) {
        let mask = self.flag_field.read().get(cell) & self.ownership_mask();
        if mask == 0 {
            return;
        }
        for condition in &mut self.conditions {
            if mask & condition.mask() != 0 {
                condition.unregister_cell(cell);
            }
        }
        self.flag_field.write().remove_mask(cell, mask);
        self.refresh_around(cell);
    }

    fn execute_interval(&mut self, interval: &CellInterval) {
        let region = interval.intersect(&self.outer_bb);
        if region.is_empty() {
            return;
        }
        let flags = self.flag_field.read();
        let mut values = self.values.write();
        for cell in &region {
            let mask = flags.get(cell) & self.boundary_mask;
            if mask == 0 {
                continue;
            }
            if let Some(condition) = self.conditions.iter().find(|c| c.mask() & mask != 0) {
                condition.treat(cell, &flags, self.domain_mask, &mut values);
            }
        }
    }

    fn before_boundary_treatment(&mut self) {
        for condition in &mut self.conditions {
            condition.before_treatment();
        }
    }

    fn after_boundary_treatment(&mut self) {
        for condition in &mut self.conditions {
            condition.after_treatment();
        }
    }

    fn pack(&self, buffer: &mut SendBuffer, mask: FlagMask, cell: Cell) {
        for condition in &self.conditions {
            if mask & condition.mask() != 0 {
                condition.pack_cell(buffer, cell);
            }
        }
    }

    fn unpack(&mut self, buffer: &mut RecvBuffer, mask: FlagMask, cell: Cell) -> BoundaryResult<()> {
        let mask = mask & self.ownership_mask();
        for condition in &mut self.conditions {
            if mask & condition.mask() != 0 {
                condition.unpack_cell(buffer, cell)?;
            }
        }
        self.flag_field.write().add_mask(cell, mask);
        self.refresh_around(cell);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Display for BoundaryHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BoundaryHandling '{}'", self.uid)?;
        writeln!(f, "  domain mask:   0x{:08x}", self.domain_mask)?;
        writeln!(f, "  boundary mask: 0x{:08x}", self.boundary_mask)?;
        for condition in &self.conditions {
            writeln!(f, "  - {} (0x{:08x})", condition.uid(), condition.mask())?;
        }
        Ok(())
    }
}

impl fmt::Debug for BoundaryHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryHandling")
            .field("uid", &self.uid)
            .field("domain_mask", &self.domain_mask)
            .field("boundary_mask", &self.boundary_mask)
            .field("conditions", &self.conditions)
            .finish()
    }
}
