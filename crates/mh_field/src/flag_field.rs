// crates/mh_field/src/flag_field.rs

//! 位掩码标志场
//!
//! 每个单元存放一个 [`FlagMask`]，每一位代表一个具名标志（流体、固壁、入口……）。
//! 注册表维护 名称↔位 的双向映射，注册表随场一起存活，注册后立即对所有持有者可见。
//!
//! 标志在不同块上的位号可能不同，跨块交换时用 [`FlagField::mapping`] 进行翻译。

use std::collections::BTreeMap;

use mh_foundation::{Cell, CellInterval, FlagUid};

use crate::error::{FieldError, FieldResult};
use crate::ghost_field::GhostLayerField;

/// 单元标志掩码
pub type FlagMask = u32;

/// 掩码位宽
pub const FLAG_BITS: u32 = FlagMask::BITS;

/// 掩码是否恰好只有一位
#[inline]
pub fn is_flag(mask: FlagMask) -> bool {
    mask.count_ones() == 1
}

/// 标志场
#[derive(Debug, Clone)]
pub struct FlagField {
    field: GhostLayerField<FlagMask>,
    /// 位号 -> 标志名
    by_bit: Vec<Option<FlagUid>>,
    /// 标志名 -> 掩码
    by_name: BTreeMap<FlagUid, FlagMask>,
}

impl FlagField {
    /// 创建全零标志场
    pub fn new(
        x_size: usize,
        y_size: usize,
        z_size: usize,
        ghost_layers: usize,
    ) -> FieldResult<Self> {
        Ok(Self {
            field: GhostLayerField::new(x_size, y_size, z_size, ghost_layers, 0)?,
            by_bit: vec![None; FLAG_BITS as usize],
            by_name: BTreeMap::new(),
        })
    }

    // ========================================================================
    // 注册表
    // ========================================================================

    /// 注册标志，分配最低的空闲位
    pub fn register_flag(&mut self, name: impl Into<FlagUid>) -> FieldResult<FlagMask> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(FieldError::DuplicateFlag(name.to_string()));
        }
        let bit = self
            .by_bit
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| FieldError::NoFreeFlagBit(name.to_string()))?;
        Ok(self.insert(name, bit as u32))
    }

    /// 在指定位号注册标志
    pub fn register_flag_at(&mut self, name: impl Into<FlagUid>, bit: u32) -> FieldResult<FlagMask> {
        let name = name.into();
        if bit >= FLAG_BITS {
            return Err(FieldError::BitOutOfRange { bit, width: FLAG_BITS });
        }
        if self.by_name.contains_key(&name) {
            return Err(FieldError::DuplicateFlag(name.to_string()));
        }
        if let Some(owner) = &self.by_bit[bit as usize] {
            return Err(FieldError::BitInUse {
                bit,
                owner: owner.to_string(),
            });
        }
        Ok(self.insert(name, bit))
    }

    fn insert(&mut self, name: FlagUid, bit: u32) -> FlagMask {
        let mask: FlagMask = 1 << bit;
        log::debug!("注册标志 \"{}\" -> 位 {}", name, bit);
        self.by_bit[bit as usize] = Some(name.clone());
        self.by_name.insert(name, mask);
        mask
    }

    /// 标志名是否已注册
    pub fn flag_exists(&self, name: &FlagUid) -> bool {
        self.by_name.contains_key(name)
    }

    /// 按名称查询掩码
    pub fn flag(&self, name: &FlagUid) -> Option<FlagMask> {
        self.by_name.get(name).copied()
    }

    /// 单个标志位对应的名称
    pub fn flag_uid(&self, flag: FlagMask) -> Option<&FlagUid> {
        if !is_flag(flag) {
            return None;
        }
        self.by_bit[flag.trailing_zeros() as usize].as_ref()
    }

    /// 掩码中的每一位是否都已注册（空掩码返回 false）
    pub fn is_registered(&self, mask: FlagMask) -> bool {
        mask != 0 && mask & self.registered_mask() == mask
    }

    /// 所有已注册位的并集
    pub fn registered_mask(&self) -> FlagMask {
        self.by_name.values().fold(0, |acc, &m| acc | m)
    }

    /// 名称 -> 掩码 映射（用于跨块交换）
    pub fn mapping(&self) -> BTreeMap<String, FlagMask> {
        self.by_name
            .iter()
            .map(|(name, &mask)| (name.to_string(), mask))
            .collect()
    }

    // ========================================================================
    // 几何
    // ========================================================================

    /// x 方向内部单元数
    #[inline]
    pub fn x_size(&self) -> usize {
        self.field.x_size()
    }

    /// y 方向内部单元数
    #[inline]
    pub fn y_size(&self) -> usize {
        self.field.y_size()
    }

    /// z 方向内部单元数
    #[inline]
    pub fn z_size(&self) -> usize {
        self.field.z_size()
    }

    /// 幽灵层数
    #[inline]
    pub fn nr_of_ghost_layers(&self) -> usize {
        self.field.nr_of_ghost_layers()
    }

    /// 内部区间
    pub fn interval(&self) -> CellInterval {
        self.field.interval()
    }

    /// 含全部幽灵层的外包围盒
    pub fn outer_interval(&self) -> CellInterval {
        self.field.outer_interval()
    }

    /// 含 `n` 层幽灵层的区间
    pub fn ghost_layer_interval(&self, n: usize) -> CellInterval {
        self.field.ghost_layer_interval(n)
    }

    /// 单元是否在外包围盒内
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.field.contains(cell)
    }

    // ========================================================================
    // 单元位操作
    // ========================================================================

    /// 读取单元掩码
    #[inline]
    pub fn get(&self, cell: Cell) -> FlagMask {
        self.field.get(cell)
    }

    /// 覆盖单元掩码
    #[inline]
    pub fn set(&mut self, cell: Cell, mask: FlagMask) {
        self.field.set(cell, mask);
    }

    /// 置位
    #[inline]
    pub fn add_flag(&mut self, cell: Cell, flag: FlagMask) {
        *self.field.get_mut(cell) |= flag;
    }

    /// 清位
    #[inline]
    pub fn remove_flag(&mut self, cell: Cell, flag: FlagMask) {
        *self.field.get_mut(cell) &= !flag;
    }

    /// 置掩码中的所有位
    #[inline]
    pub fn add_mask(&mut self, cell: Cell, mask: FlagMask) {
        self.add_flag(cell, mask);
    }

    /// 清掩码中的所有位
    #[inline]
    pub fn remove_mask(&mut self, cell: Cell, mask: FlagMask) {
        self.remove_flag(cell, mask);
    }

    /// 标志是否已置位
    #[inline]
    pub fn is_flag_set(&self, cell: Cell, flag: FlagMask) -> bool {
        self.get(cell) & flag == flag
    }

    /// 掩码的所有位是否均已置位
    #[inline]
    pub fn is_mask_set(&self, cell: Cell, mask: FlagMask) -> bool {
        self.get(cell) & mask == mask
    }

    /// 掩码中是否至少有一位已置位
    #[inline]
    pub fn is_part_of_mask_set(&self, cell: Cell, mask: FlagMask) -> bool {
        self.get(cell) & mask != 0
    }

    /// 将所有单元清零（注册表保持不变）
    pub fn reset(&mut self) {
        self.field.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_lowest_free_bit() {
        let mut field = FlagField::new(2, 2, 2, 1).unwrap();
        assert_eq!(field.register_flag_at("wall", 0).unwrap(), 1);
        assert_eq!(field.register_flag("fluid").unwrap(), 2);
        assert_eq!(field.register_flag("inlet").unwrap(), 4);
        assert_eq!(field.registered_mask(), 7);
        assert_eq!(field.flag_uid(2).unwrap().identifier(), "fluid");
    }

    #[test]
    fn test_register_errors() {
        let mut field = FlagField::new(2, 2, 2, 1).unwrap();
        field.register_flag("fluid").unwrap();
        assert!(matches!(field.register_flag("fluid"), Err(FieldError::DuplicateFlag(_))));
        assert!(matches!(field.register_flag_at("wall", 0), Err(FieldError::BitInUse { .. })));
        assert!(matches!(
            field.register_flag_at("wall", FLAG_BITS),
            Err(FieldError::BitOutOfRange { .. })
        ));

        for i in 1..FLAG_BITS {
            field.register_flag(format!("f{}", i)).unwrap();
        }
        assert!(matches!(field.register_flag("overflow"), Err(FieldError::NoFreeFlagBit(_))));
    }

    #[test]
    fn test_bit_operations() {
        let mut field = FlagField::new(2, 2, 2, 1).unwrap();
        let a = field.register_flag("a").unwrap();
        let b = field.register_flag("b").unwrap();
        let c = Cell::new(-1, 2, 0);

        field.add_flag(c, a);
        field.add_flag(c, b);
        assert!(field.is_mask_set(c, a | b));
        field.remove_flag(c, a);
        assert!(!field.is_flag_set(c, a));
        assert!(field.is_part_of_mask_set(c, a | b));
        assert_eq!(field.get(c), b);
    }

    #[test]
    fn test_is_registered() {
        let mut field = FlagField::new(1, 1, 1, 1).unwrap();
        let a = field.register_flag("a").unwrap();
        assert!(field.is_registered(a));
        assert!(!field.is_registered(0));
        assert!(!field.is_registered(a | 1 << 7));
        assert!(is_flag(a));
        assert!(!is_flag(a | 2));
    }
}
