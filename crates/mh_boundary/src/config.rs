// crates/mh_boundary/src/config.rs

//! 边界条件参数对象
//!
//! 置标志时随标志一起传给所属处理器。参数对象由
//! [`BoundaryHandler::create_boundary_configuration`](crate::BoundaryHandler::create_boundary_configuration)
//! 从 [`ConfigBlock`](mh_config::ConfigBlock) 构造，具体类型由边界条件自行定义，
//! 使用方通过 [`as_any`](BoundaryConfiguration::as_any) 向下转型读取。

use std::any::Any;
use std::fmt::Debug;

/// 边界条件参数
pub trait BoundaryConfiguration: Any + Debug + Send + Sync {
    /// 用于向下转型
    fn as_any(&self) -> &dyn Any;
}

/// 空参数（不需要参数的边界条件和非边界标志使用）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullConfiguration;

impl BoundaryConfiguration for NullConfiguration {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
