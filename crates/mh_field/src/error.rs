// crates/mh_field/src/error.rs

//! 场层错误类型

use thiserror::Error;

/// 场层结果类型
pub type FieldResult<T> = Result<T, FieldError>;

/// 场层错误
#[derive(Debug, Error)]
pub enum FieldError {
    /// 场尺寸为零
    #[error("场尺寸必须为正: {x_size}x{y_size}x{z_size}")]
    ZeroSize {
        /// x 方向单元数
        x_size: usize,
        /// y 方向单元数
        y_size: usize,
        /// z 方向单元数
        z_size: usize,
    },

    /// 标志名重复注册
    #[error("标志 \"{0}\" 已注册")]
    DuplicateFlag(String),

    /// 没有空闲的标志位
    #[error("没有空闲的标志位可分配给 \"{0}\"")]
    NoFreeFlagBit(String),

    /// 位号超出掩码宽度
    #[error("标志位 {bit} 超出掩码宽度 {width}")]
    BitOutOfRange {
        /// 请求的位号
        bit: u32,
        /// 掩码宽度
        width: u32,
    },

    /// 位已被占用
    #[error("标志位 {bit} 已被 \"{owner}\" 占用")]
    BitInUse {
        /// 请求的位号
        bit: u32,
        /// 已占用的标志名
        owner: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::BitInUse {
            bit: 3,
            owner: "wall".to_string(),
        };
        assert!(err.to_string().contains("wall"));
    }
}
