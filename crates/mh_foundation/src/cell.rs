// crates/mh_foundation/src/cell.rs

//! 单元坐标与单元区间
//!
//! 块内单元使用有符号坐标：内部单元为 `0..size`，幽灵层单元为负数或 `>= size`。
//!
//! [`CellInterval`] 是闭区间 `[min, max]`，任一轴上 `max < min` 即为空区间。
//! 区间遍历顺序固定为 z 最外层、y 居中、x 最内层，幽灵层打包/解包依赖该顺序。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stencil::Direction;

/// 单元坐标分量类型
pub type CellIdx = i64;

// ============================================================
// 单元坐标
// ============================================================

/// 单元坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    /// x 坐标
    pub x: CellIdx,
    /// y 坐标
    pub y: CellIdx,
    /// z 坐标
    pub z: CellIdx,
}

impl Cell {
    /// 创建单元坐标
    #[inline]
    pub const fn new(x: CellIdx, y: CellIdx, z: CellIdx) -> Self {
        Self { x, y, z }
    }

    /// 沿 `direction` 平移 `distance` 个单元
    #[inline]
    pub fn shifted(self, direction: Direction, distance: CellIdx) -> Self {
        let (cx, cy, cz) = direction.offset();
        Self::new(self.x + cx * distance, self.y + cy * distance, self.z + cz * distance)
    }

    /// 相邻单元
    #[inline]
    pub fn neighbor(self, direction: Direction) -> Self {
        self.shifted(direction, 1)
    }

    /// 按轴号取分量（0=x, 1=y, 2=z）
    #[inline]
    pub fn axis(self, axis: usize) -> CellIdx {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("轴号越界: {}", axis),
        }
    }

    #[inline]
    fn axis_mut(&mut self, axis: usize) -> &mut CellIdx {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("轴号越界: {}", axis),
        }
    }
}

impl From<(CellIdx, CellIdx, CellIdx)> for Cell {
    fn from((x, y, z): (CellIdx, CellIdx, CellIdx)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ============================================================
// 单元区间
// ============================================================

/// 轴对齐的闭区间 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellInterval {
    /// 下角（含）
    pub min: Cell,
    /// 上角（含）
    pub max: Cell,
}

impl CellInterval {
    /// 由两个角点创建
    #[inline]
    pub const fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// 由六个边界值创建
    #[inline]
    pub const fn from_bounds(
        x_min: CellIdx,
        y_min: CellIdx,
        z_min: CellIdx,
        x_max: CellIdx,
        y_max: CellIdx,
        z_max: CellIdx,
    ) -> Self {
        Self::new(Cell::new(x_min, y_min, z_min), Cell::new(x_max, y_max, z_max))
    }

    /// 仅包含一个单元的区间
    #[inline]
    pub const fn single(cell: Cell) -> Self {
        Self::new(cell, cell)
    }

    /// 空区间
    #[inline]
    pub const fn empty() -> Self {
        Self::from_bounds(0, 0, 0, -1, -1, -1)
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// 是否包含单元
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x
            && cell.x <= self.max.x
            && cell.y >= self.min.y
            && cell.y <= self.max.y
            && cell.z >= self.min.z
            && cell.z <= self.max.z
    }

    /// 是否完整包含另一个区间（空区间总是被包含）
    #[inline]
    pub fn contains_interval(&self, other: &CellInterval) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }

    /// 求交集
    pub fn intersect(&self, other: &CellInterval) -> CellInterval {
        CellInterval::from_bounds(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.min.z.max(other.min.z),
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
            self.max.z.min(other.max.z),
        )
    }

    /// 各方向向外扩展 `n` 层（负数为收缩）
    pub fn expanded(&self, n: CellIdx) -> CellInterval {
        CellInterval::from_bounds(
            self.min.x - n,
            self.min.y - n,
            self.min.z - n,
            self.max.x + n,
            self.max.y + n,
            self.max.z + n,
        )
    }

    /// 平移
    pub fn shifted(&self, dx: CellIdx, dy: CellIdx, dz: CellIdx) -> CellInterval {
        CellInterval::from_bounds(
            self.min.x + dx,
            self.min.y + dy,
            self.min.z + dz,
            self.max.x + dx,
            self.max.y + dy,
            self.max.z + dz,
        )
    }

    /// 按轴号取下界
    #[inline]
    pub fn min_of(&self, axis: usize) -> CellIdx {
        self.min.axis(axis)
    }

    /// 按轴号取上界
    #[inline]
    pub fn max_of(&self, axis: usize) -> CellIdx {
        self.max.axis(axis)
    }

    /// 按轴号设置下界
    #[inline]
    pub fn set_min_of(&mut self, axis: usize, value: CellIdx) {
        *self.min.axis_mut(axis) = value;
    }

    /// 按轴号设置上界
    #[inline]
    pub fn set_max_of(&mut self, axis: usize, value: CellIdx) {
        *self.max.axis_mut(axis) = value;
    }

    /// 某轴上的单元数
    #[inline]
    pub fn size_of(&self, axis: usize) -> usize {
        let extent = self.max.axis(axis) - self.min.axis(axis) + 1;
        extent.max(0) as usize
    }

    /// 单元总数
    pub fn num_cells(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.size_of(0) * self.size_of(1) * self.size_of(2)
        }
    }

    /// 按 z、y、x 顺序遍历（x 变化最快）
    pub fn iter(&self) -> CellIntervalIter {
        CellIntervalIter {
            interval: *self,
            next: if self.is_empty() { None } else { Some(self.min) },
        }
    }
}

impl Default for CellInterval {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for CellInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

impl<'a> IntoIterator for &'a CellInterval {
    type Item = Cell;
    type IntoIter = CellIntervalIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`CellInterval`] 迭代器
#[derive(Debug, Clone)]
pub struct CellIntervalIter {
    interval: CellInterval,
    next: Option<Cell>,
}

impl Iterator for CellIntervalIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        let current = self.next?;
        let bb = &self.interval;

        let mut following = current;
        following.x += 1;
        if following.x > bb.max.x {
            following.x = bb.min.x;
            following.y += 1;
            if following.y > bb.max.y {
                following.y = bb.min.y;
                following.z += 1;
            }
        }
        self.next = if following.z > bb.max.z { None } else { Some(following) };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_interval() {
        let empty = CellInterval::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.num_cells(), 0);
        assert_eq!(empty.iter().count(), 0);
    }

    #[test]
    fn test_iteration_order_is_z_y_x() {
        let cells: Vec<Cell> = CellInterval::from_bounds(0, 0, 0, 1, 1, 1).iter().collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], Cell::new(0, 0, 0));
        assert_eq!(cells[1], Cell::new(1, 0, 0));
        assert_eq!(cells[2], Cell::new(0, 1, 0));
        assert_eq!(cells[4], Cell::new(0, 0, 1));
        assert_eq!(cells[7], Cell::new(1, 1, 1));
    }

    #[test]
    fn test_intersect_clips() {
        let outer = CellInterval::from_bounds(-1, -1, -1, 4, 4, 4);
        let request = CellInterval::from_bounds(2, -5, 3, 10, 0, 3);
        let clipped = outer.intersect(&request);
        assert_eq!(clipped, CellInterval::from_bounds(2, -1, 3, 4, 0, 3));

        let disjoint = CellInterval::from_bounds(10, 10, 10, 12, 12, 12);
        assert!(outer.intersect(&disjoint).is_empty());
    }

    #[test]
    fn test_contains_interval() {
        let bb = CellInterval::from_bounds(0, 0, 0, 3, 3, 3);
        assert!(bb.contains_interval(&CellInterval::from_bounds(1, 1, 1, 2, 2, 2)));
        assert!(!bb.contains_interval(&CellInterval::from_bounds(1, 1, 1, 4, 2, 2)));
        assert!(bb.contains_interval(&CellInterval::empty()));
    }

    #[test]
    fn test_shifted_cell() {
        let c = Cell::new(1, 2, 3);
        assert_eq!(c.shifted(Direction::TNE, 2), Cell::new(3, 4, 5));
        assert_eq!(c.neighbor(Direction::W), Cell::new(0, 2, 3));
    }
}
