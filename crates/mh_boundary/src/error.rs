// crates/mh_boundary/src/error.rs

//! 边界处理层错误类型
//!
//! 集合构造违规、查找失败、标志解析失败与幽灵层交换失败都以 [`BoundaryError`]
//! 返回，调用方决定是否终止。

use mh_config::ConfigError;
use mh_field::{FieldError, FlagMask};
use mh_foundation::MhError;
use thiserror::Error;

/// 边界处理结果类型
pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// 边界处理错误
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// 标志场没有幽灵层
    #[error("集合 '{collection}': 标志场至少需要 1 层幽灵层")]
    NoGhostLayers {
        /// 集合标识
        collection: String,
    },

    /// 处理器列表为空
    #[error("集合 '{collection}': 边界处理器列表为空")]
    EmptyHandlerList {
        /// 集合标识
        collection: String,
    },

    /// 处理器引用了不同的标志场或不同的外包围盒
    #[error("集合 '{collection}': 处理器 '{handler}' 引用的标志场与集合不一致")]
    FlagFieldMismatch {
        /// 集合标识
        collection: String,
        /// 处理器标识
        handler: String,
    },

    /// 处理器 UID 重复
    #[error("集合 '{collection}': 边界处理器 UID '{handler}' 重复")]
    DuplicateHandlerUid {
        /// 集合标识
        collection: String,
        /// 处理器标识
        handler: String,
    },

    /// 边界 UID 重复
    #[error("集合 '{collection}': 边界 UID '{boundary}' 在多个处理器中出现")]
    DuplicateBoundaryUid {
        /// 集合标识
        collection: String,
        /// 边界标识
        boundary: String,
    },

    /// 两个处理器的所有权掩码相交
    #[error("集合 '{collection}': 处理器 '{first}' 与 '{second}' 的所有权掩码重叠 (0x{overlap:08x})")]
    OverlappingOwnership {
        /// 集合标识
        collection: String,
        /// 先出现的处理器
        first: String,
        /// 后出现的处理器
        second: String,
        /// 重叠位
        overlap: FlagMask,
    },

    /// 按 UID 未找到处理器
    #[error("集合 '{collection}': 未找到边界处理器 '{handler}'")]
    HandlerNotFound {
        /// 集合标识
        collection: String,
        /// 处理器标识
        handler: String,
    },

    /// 没有处理器实现该边界
    #[error("集合 '{collection}': 没有处理器实现边界 '{boundary}'")]
    BoundaryNotFound {
        /// 集合标识
        collection: String,
        /// 边界标识
        boundary: String,
    },

    /// 标志名未注册
    #[error("标志 '{0}' 未在标志场中注册")]
    UnknownFlag(String),

    /// 标志位未注册
    #[error("集合 '{collection}': 标志位 0x{flag:08x} 未注册")]
    UnregisteredFlag {
        /// 集合标识
        collection: String,
        /// 标志位
        flag: FlagMask,
    },

    /// 标志已注册但无处理器拥有
    #[error("集合 '{collection}': 标志 '{flag}' 不属于任何边界处理器")]
    UnhandledFlag {
        /// 集合标识
        collection: String,
        /// 标志名
        flag: String,
    },

    /// 邻块发送的标志在本地未注册
    #[error("集合 '{collection}': 邻块标志 '{flag}' 在本地未注册")]
    UnknownNeighborFlag {
        /// 集合标识
        collection: String,
        /// 标志名
        flag: String,
    },

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidParameter(String),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 场错误
    #[error(transparent)]
    Field(#[from] FieldError),

    /// 基础层错误（缓冲区读取等）
    #[error(transparent)]
    Foundation(#[from] MhError),
}

impl BoundaryError {
    /// 创建无效参数错误
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}
