// crates/mh_foundation/src/stencil.rs

//! D3Q27 方向枚举
//!
//! 与格子模板一致的 27 个方向（含中心 `C`），用于邻居访问和幽灵层区间计算。

use serde::{Deserialize, Serialize};
use std::fmt;

/// D3Q27 方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Direction {
    C = 0,
    N,
    S,
    W,
    E,
    T,
    B,
    NW,
    NE,
    SW,
    SE,
    TN,
    TS,
    TW,
    TE,
    BN,
    BS,
    BW,
    BE,
    TNE,
    TNW,
    TSE,
    TSW,
    BNE,
    BNW,
    BSE,
    BSW,
}

impl Direction {
    /// 全部 27 个方向（含中心）
    pub const ALL: [Direction; 27] = [
        Self::C, Self::N, Self::S, Self::W, Self::E, Self::T, Self::B,
        Self::NW, Self::NE, Self::SW, Self::SE,
        Self::TN, Self::TS, Self::TW, Self::TE,
        Self::BN, Self::BS, Self::BW, Self::BE,
        Self::TNE, Self::TNW, Self::TSE, Self::TSW,
        Self::BNE, Self::BNW, Self::BSE, Self::BSW,
    ];

    /// 6 个面邻居方向
    pub const D3Q6: [Direction; 6] = [Self::N, Self::S, Self::W, Self::E, Self::T, Self::B];

    /// 26 个邻居方向（不含中心）
    pub const D3Q26: [Direction; 26] = [
        Self::N, Self::S, Self::W, Self::E, Self::T, Self::B,
        Self::NW, Self::NE, Self::SW, Self::SE,
        Self::TN, Self::TS, Self::TW, Self::TE,
        Self::BN, Self::BS, Self::BW, Self::BE,
        Self::TNE, Self::TNW, Self::TSE, Self::TSW,
        Self::BNE, Self::BNW, Self::BSE, Self::BSW,
    ];

    /// 方向偏移 (cx, cy, cz)
    pub const fn offset(self) -> (i64, i64, i64) {
        match self {
            Self::C => (0, 0, 0),
            Self::N => (0, 1, 0),
            Self::S => (0, -1, 0),
            Self::W => (-1, 0, 0),
            Self::E => (1, 0, 0),
            Self::T => (0, 0, 1),
            Self::B => (0, 0, -1),
            Self::NW => (-1, 1, 0),
            Self::NE => (1, 1, 0),
            Self::SW => (-1, -1, 0),
            Self::SE => (1, -1, 0),
            Self::TN => (0, 1, 1),
            Self::TS => (0, -1, 1),
            Self::TW => (-1, 0, 1),
            Self::TE => (1, 0, 1),
            Self::BN => (0, 1, -1),
            Self::BS => (0, -1, -1),
            Self::BW => (-1, 0, -1),
            Self::BE => (1, 0, -1),
            Self::TNE => (1, 1, 1),
            Self::TNW => (-1, 1, 1),
            Self::TSE => (1, -1, 1),
            Self::TSW => (-1, -1, 1),
            Self::BNE => (1, 1, -1),
            Self::BNW => (-1, 1, -1),
            Self::BSE => (1, -1, -1),
            Self::BSW => (-1, -1, -1),
        }
    }

    /// 按轴号取偏移分量
    #[inline]
    pub fn component(self, axis: usize) -> i64 {
        let (cx, cy, cz) = self.offset();
        match axis {
            0 => cx,
            1 => cy,
            _ => cz,
        }
    }

    /// 由偏移反查方向
    pub fn from_offset(cx: i64, cy: i64, cz: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.offset() == (cx, cy, cz))
    }

    /// 反方向
    pub fn inverse(self) -> Self {
        let (cx, cy, cz) = self.offset();
        // 27 个方向关于中心对称，必然存在
        Self::from_offset(-cx, -cy, -cz).unwrap_or(Self::C)
    }

    /// 方向名
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::N => "N",
            Self::S => "S",
            Self::W => "W",
            Self::E => "E",
            Self::T => "T",
            Self::B => "B",
            Self::NW => "NW",
            Self::NE => "NE",
            Self::SW => "SW",
            Self::SE => "SE",
            Self::TN => "TN",
            Self::TS => "TS",
            Self::TW => "TW",
            Self::TE => "TE",
            Self::BN => "BN",
            Self::BS => "BS",
            Self::BW => "BW",
            Self::BE => "BE",
            Self::TNE => "TNE",
            Self::TNW => "TNW",
            Self::TSE => "TSE",
            Self::TSW => "TSW",
            Self::BNE => "BNE",
            Self::BNW => "BNW",
            Self::BSE => "BSE",
            Self::BSW => "BSW",
        }
    }

    /// 由方向名解析（大小写不敏感）
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
