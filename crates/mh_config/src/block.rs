// crates/mh_config/src/block.rs

//! 层次化配置块
//!
//! 一个 [`ConfigBlock`] 是带名称的 JSON 对象，可以读取参数、取子块。
//! 边界条件通过它构造自己的参数对象，例如：
//!
//! ```
//! use mh_config::ConfigBlock;
//!
//! let block = ConfigBlock::from_json_str("inlet", r#"{ "value": 1.5 }"#).unwrap();
//! let value: f64 = block.parameter("value").unwrap();
//! assert_eq!(value, 1.5);
//! assert_eq!(block.parameter_or("scale", 2.0).unwrap(), 2.0);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// 配置块
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBlock {
    key: String,
    value: Value,
}

impl ConfigBlock {
    /// 由 JSON 值创建
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// 空配置块
    pub fn empty(key: impl Into<String>) -> Self {
        Self::new(key, Value::Object(Default::default()))
    }

    /// 解析 JSON 字符串
    pub fn from_json_str(key: impl Into<String>, json: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let block = Self::new(key, value);
        block.ensure_object()?;
        Ok(block)
    }

    /// 从 JSON 文件加载，块名取文件名（不含扩展名）
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let key = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json_str(key, &content)
    }

    /// 块名
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 原始 JSON 值
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// 参数是否存在
    pub fn is_defined(&self, key: &str) -> bool {
        self.value.get(key).is_some()
    }

    /// 读取参数
    pub fn parameter<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<T> {
        let raw = self
            .value
            .get(key)
            .ok_or_else(|| ConfigError::Missing(format!("{}.{}", self.key, key)))?;
        serde_json::from_value(raw.clone())
            .map_err(|e| ConfigError::invalid(format!("{}.{}", self.key, key), raw, e.to_string()))
    }

    /// 读取参数，缺失时返回默认值（类型不符仍报错）
    pub fn parameter_or<T: DeserializeOwned>(&self, key: &str, default: T) -> ConfigResult<T> {
        if self.is_defined(key) {
            self.parameter(key)
        } else {
            Ok(default)
        }
    }

    /// 获取子块
    pub fn block(&self, name: &str) -> ConfigResult<ConfigBlock> {
        let raw = self
            .value
            .get(name)
            .ok_or_else(|| ConfigError::Missing(format!("{}.{}", self.key, name)))?;
        let block = ConfigBlock::new(name, raw.clone());
        block.ensure_object()?;
        Ok(block)
    }

    /// 获取同名子块列表（对象数组或单个对象）
    pub fn blocks(&self, name: &str) -> Vec<ConfigBlock> {
        match self.value.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| v.is_object())
                .map(|v| ConfigBlock::new(name, v.clone()))
                .collect(),
            Some(v @ Value::Object(_)) => vec![ConfigBlock::new(name, v.clone())],
            _ => Vec::new(),
        }
    }

    fn ensure_object(&self) -> ConfigResult<()> {
        if self.value.is_object() {
            Ok(())
        } else {
            Err(ConfigError::invalid(&self.key, &self.value, "配置块必须是 JSON 对象"))
        }
    }
}
