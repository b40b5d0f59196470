// crates/mh_boundary/src/flag.rs

//! 标志选择器
//!
//! 集合的各操作既接受掩码也接受已注册的标志名，
//! 名称在调用时对照标志场注册表解析。

use mh_field::{FlagField, FlagMask};
use mh_foundation::FlagUid;

use crate::error::{BoundaryError, BoundaryResult};

/// 以掩码或名称指定的标志
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagSelector {
    /// 直接给出掩码
    Mask(FlagMask),
    /// 按名称查询
    Name(FlagUid),
}

impl FlagSelector {
    /// 对照注册表解析为掩码
    pub fn resolve(&self, field: &FlagField) -> BoundaryResult<FlagMask> {
        match self {
            FlagSelector::Mask(mask) => Ok(*mask),
            FlagSelector::Name(name) => field
                .flag(name)
                .ok_or_else(|| BoundaryError::UnknownFlag(name.to_string())),
        }
    }
}

impl From<FlagMask> for FlagSelector {
    fn from(mask: FlagMask) -> Self {
        FlagSelector::Mask(mask)
    }
}

impl From<&str> for FlagSelector {
    fn from(name: &str) -> Self {
        FlagSelector::Name(FlagUid::new(name))
    }
}

impl From<&FlagUid> for FlagSelector {
    fn from(uid: &FlagUid) -> Self {
        FlagSelector::Name(uid.clone())
    }
}

impl From<FlagUid> for FlagSelector {
    fn from(uid: FlagUid) -> Self {
        FlagSelector::Name(uid)
    }
}
