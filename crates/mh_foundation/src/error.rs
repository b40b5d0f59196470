// crates/mh_foundation/src/error.rs

//! 错误处理模块，定义基础层统一错误类型
//!
//! 提供 `MhError` 枚举和 `MhResult` 类型别名。标志场、边界处理相关的错误
//! 分别在 `mh_field`、`mh_boundary` 中定义，并通过 `#[from]` 包装本类型。
//!
//! # 示例
//!
//! ```
//! use mh_foundation::error::{MhError, MhResult};
//!
//! fn read_layers(n: usize) -> MhResult<usize> {
//!     if n == 0 {
//!         return Err(MhError::invalid_input("至少需要一层"));
//!     }
//!     Ok(n)
//! }
//! assert!(read_layers(0).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type MhResult<T> = Result<T, MhError>;

/// 基础层错误类型
#[derive(Error, Debug)]
pub enum MhError {
    /// 缓冲区读取越界
    #[error("缓冲区读取越界: 需要 {needed} 字节, 剩余 {remaining} 字节")]
    BufferUnderflow {
        /// 需要的字节数
        needed: usize,
        /// 剩余字节数
        remaining: usize,
    },

    /// 缓冲区中的字符串不是合法 UTF-8
    #[error("缓冲区字符串解码失败: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

impl MhError {
    /// 创建无效输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 创建读取越界错误
    pub fn buffer_underflow(needed: usize, remaining: usize) -> Self {
        Self::BufferUnderflow { needed, remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MhError::buffer_underflow(8, 3);
        let msg = err.to_string();
        assert!(msg.contains('8'));
        assert!(msg.contains('3'));

        assert!(MhError::invalid_input("坏参数").to_string().contains("坏参数"));
    }
}
