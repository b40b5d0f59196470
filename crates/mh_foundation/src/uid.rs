// crates/mh_foundation/src/uid.rs

//! 带类型标记的标识符
//!
//! 使用 Phantom Type 区分标志名、边界条件、边界处理器和处理器集合的标识符，
//! 避免把一种 UID 误传给另一种接口。相等性只比较字符串标识。
//!
//! ```
//! use mh_foundation::uid::{BoundaryUid, FlagUid};
//!
//! let a = BoundaryUid::new("inlet");
//! let b = BoundaryUid::from("inlet");
//! assert_eq!(a, b);
//! assert_eq!(FlagUid::new("fluid").identifier(), "fluid");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// 标记类型
// ============================================================================

/// 标志名标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagTag;

/// 边界条件标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryTag;

/// 边界处理器标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlingTag;

/// 边界处理器集合标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionTag;

// ============================================================================
// 泛型标识符
// ============================================================================

/// 带类型标记的字符串标识符
///
/// 内部使用 `Arc<str>`，克隆开销为一次引用计数。
pub struct Uid<T> {
    identifier: Arc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Uid<T> {
    /// 创建标识符
    pub fn new(identifier: impl AsRef<str>) -> Self {
        Self {
            identifier: Arc::from(identifier.as_ref()),
            _marker: PhantomData,
        }
    }

    /// 字符串标识
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

// 手动实现，避免对 T 附加约束
impl<T> Clone for Uid<T> {
    fn clone(&self) -> Self {
        Self {
            identifier: Arc::clone(&self.identifier),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Uid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl<T> Eq for Uid<T> {}

impl<T> Hash for Uid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl<T> PartialOrd for Uid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Uid<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl<T> fmt::Debug for Uid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({:?})", &*self.identifier)
    }
}

impl<T> fmt::Display for Uid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

impl<T> From<&str> for Uid<T> {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<T> From<String> for Uid<T> {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<T> Serialize for Uid<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.identifier)
    }
}

impl<'de, T> Deserialize<'de> for Uid<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// 类型别名
// ============================================================================

/// 标志名（标志场注册表中的键）
pub type FlagUid = Uid<FlagTag>;

/// 边界条件标识，在整个处理器集合内唯一
pub type BoundaryUid = Uid<BoundaryTag>;

/// 边界处理器标识，在同一集合内唯一
pub type BoundaryHandlingUid = Uid<HandlingTag>;

/// 边界处理器集合标识
pub type BoundaryHandlingCollectionUid = Uid<CollectionTag>;
