// crates/mh_field/src/ghost_field.rs

//! 带幽灵层的三维场
//!
//! 内部单元坐标为 `0..size`，每侧另有 `ghost_layers` 层幽灵单元，
//! 存储按 z、y、x 顺序展开（x 连续）。

use mh_foundation::{Cell, CellIdx, CellInterval};

use crate::error::{FieldError, FieldResult};

/// 带幽灵层的三维场
#[derive(Debug, Clone)]
pub struct GhostLayerField<T> {
    x_size: usize,
    y_size: usize,
    z_size: usize,
    ghost_layers: usize,
    data: Vec<T>,
}

impl<T: Clone> GhostLayerField<T> {
    /// 创建场并以 `init` 填充所有单元（含幽灵层）
    ///
    /// `ghost_layers` 可以为 0，是否满足使用方要求由使用方检查。
    pub fn new(
        x_size: usize,
        y_size: usize,
        z_size: usize,
        ghost_layers: usize,
        init: T,
    ) -> FieldResult<Self> {
        if x_size == 0 || y_size == 0 || z_size == 0 {
            return Err(FieldError::ZeroSize { x_size, y_size, z_size });
        }
        let total = (x_size + 2 * ghost_layers)
            * (y_size + 2 * ghost_layers)
            * (z_size + 2 * ghost_layers);
        Ok(Self {
            x_size,
            y_size,
            z_size,
            ghost_layers,
            data: vec![init; total],
        })
    }

    /// 以 `value` 填充所有单元
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> GhostLayerField<T> {
    /// x 方向内部单元数
    #[inline]
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// y 方向内部单元数
    #[inline]
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// z 方向内部单元数
    #[inline]
    pub fn z_size(&self) -> usize {
        self.z_size
    }

    /// 幽灵层数
    #[inline]
    pub fn nr_of_ghost_layers(&self) -> usize {
        self.ghost_layers
    }

    /// 内部区间 `[0, size-1]`
    pub fn interval(&self) -> CellInterval {
        self.ghost_layer_interval(0)
    }

    /// 含全部幽灵层的外包围盒
    pub fn outer_interval(&self) -> CellInterval {
        self.ghost_layer_interval(self.ghost_layers)
    }

    /// 含 `n` 层幽灵层的区间（不与外包围盒求交）
    pub fn ghost_layer_interval(&self, n: usize) -> CellInterval {
        let n = n as CellIdx;
        CellInterval::from_bounds(
            -n,
            -n,
            -n,
            self.x_size as CellIdx + n - 1,
            self.y_size as CellIdx + n - 1,
            self.z_size as CellIdx + n - 1,
        )
    }

    /// 单元是否在外包围盒内
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        self.offset(cell).is_some()
    }

    /// 获取单元引用
    #[inline]
    pub fn try_get(&self, cell: Cell) -> Option<&T> {
        self.offset(cell).map(|i| &self.data[i])
    }

    /// 获取单元可变引用
    ///
    /// # Panics
    ///
    /// 单元不在外包围盒内时 panic。
    #[inline]
    pub fn get_mut(&mut self, cell: Cell) -> &mut T {
        let i = self.index(cell);
        &mut self.data[i]
    }

    /// 所有单元（含幽灵层）的原始存储
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn offset(&self, cell: Cell) -> Option<usize> {
        let g = self.ghost_layers as CellIdx;
        let (x, y, z) = (cell.x + g, cell.y + g, cell.z + g);
        let nx = (self.x_size + 2 * self.ghost_layers) as CellIdx;
        let ny = (self.y_size + 2 * self.ghost_layers) as CellIdx;
        let nz = (self.z_size + 2 * self.ghost_layers) as CellIdx;
        if x < 0 || y < 0 || z < 0 || x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some(((z * ny + y) * nx + x) as usize)
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        match self.offset(cell) {
            Some(i) => i,
            None => panic!(
                "单元 {} 超出场范围 {}",
                cell,
                self.outer_interval()
            ),
        }
    }
}

impl<T: Copy> GhostLayerField<T> {
    /// 读取单元值
    ///
    /// # Panics
    ///
    /// 单元不在外包围盒内时 panic。
    #[inline]
    pub fn get(&self, cell: Cell) -> T {
        self.data[self.index(cell)]
    }

    /// 写入单元值
    ///
    /// # Panics
    ///
    /// 单元不在外包围盒内时 panic。
    #[inline]
    pub fn set(&mut self, cell: Cell, value: T) {
        let i = self.index(cell);
        self.data[i] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert!(GhostLayerField::new(0, 2, 2, 1, 0u8).is_err());
    }

    #[test]
    fn test_ghost_cells_addressable() {
        let mut field = GhostLayerField::new(3, 2, 2, 2, 0.0f64).unwrap();
        assert_eq!(field.as_slice().len(), 7 * 6 * 6);

        field.set(Cell::new(-2, -2, -2), 1.0);
        field.set(Cell::new(4, 3, 3), 2.0);
        assert_eq!(field.get(Cell::new(-2, -2, -2)), 1.0);
        assert_eq!(field.get(Cell::new(4, 3, 3)), 2.0);

        assert!(!field.contains(Cell::new(5, 0, 0)));
        assert!(field.try_get(Cell::new(-3, 0, 0)).is_none());
    }

    #[test]
    fn test_intervals() {
        let field = GhostLayerField::new(4, 5, 6, 2, 0u32).unwrap();
        assert_eq!(field.interval(), CellInterval::from_bounds(0, 0, 0, 3, 4, 5));
        assert_eq!(field.outer_interval(), CellInterval::from_bounds(-2, -2, -2, 5, 6, 7));
        assert_eq!(field.ghost_layer_interval(1), CellInterval::from_bounds(-1, -1, -1, 4, 5, 6));
    }
}
