// crates/mh_config/src/setup.rs

//! BlockSetupConfig - 块与边界处理器布置
//!
//! 描述一个网格块的尺寸、幽灵层数，以及挂在边界处理器集合上的各个处理器
//! 和它们的边界条件。所有字段都有默认值，空 JSON 对象即可得到可运行的布置。
//!
//! ```
//! use mh_config::BlockSetupConfig;
//!
//! let setup = BlockSetupConfig::from_json_str(r#"{ "size": [8, 4, 4] }"#).unwrap();
//! assert_eq!(setup.ghost_layers, 1);
//! setup.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use mh_foundation::{Cell, CellIdx, CellInterval};

use crate::error::{ConfigError, ConfigResult};

/// 块布置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSetupConfig {
    /// 块内部单元数 [x, y, z]
    #[serde(default = "default_size")]
    pub size: [usize; 3],

    /// 幽灵层数
    #[serde(default = "default_ghost_layers")]
    pub ghost_layers: usize,

    /// 标量场初值
    #[serde(default)]
    pub initial_value: f64,

    /// 边界处理器列表（顺序即集合中的顺序）
    #[serde(default = "default_handlers")]
    pub handlers: Vec<HandlerSetup>,
}

fn default_size() -> [usize; 3] { [8, 8, 8] }
fn default_ghost_layers() -> usize { 1 }

fn default_handlers() -> Vec<HandlerSetup> {
    vec![HandlerSetup {
        uid: "fluid".to_string(),
        domain_flag: "fluid".to_string(),
        boundaries: vec![
            BoundarySetup {
                name: "inlet".to_string(),
                kind: BoundaryKindConfig::Dirichlet,
                value: 1.0,
                region: Some(RegionConfig { min: [-1, -1, -1], max: [-1, 8, 8] }),
            },
            BoundarySetup {
                name: "outlet".to_string(),
                kind: BoundaryKindConfig::ZeroGradient,
                value: 0.0,
                region: Some(RegionConfig { min: [8, -1, -1], max: [8, 8, 8] }),
            },
        ],
    }]
}

impl Default for BlockSetupConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            ghost_layers: default_ghost_layers(),
            initial_value: 0.0,
            handlers: default_handlers(),
        }
    }
}

/// 单个边界处理器的布置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerSetup {
    /// 处理器 UID
    pub uid: String,

    /// 域标志名
    pub domain_flag: String,

    /// 该处理器承载的边界条件
    #[serde(default)]
    pub boundaries: Vec<BoundarySetup>,
}

/// 边界条件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKindConfig {
    /// 固定值
    #[default]
    Dirichlet,
    /// 零梯度
    ZeroGradient,
}

/// 单个边界条件的布置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySetup {
    /// 边界名，同时作为边界 UID 和标志名
    pub name: String,

    /// 边界类型
    #[serde(default)]
    pub kind: BoundaryKindConfig,

    /// 固定值（仅 Dirichlet 使用）
    #[serde(default)]
    pub value: f64,

    /// 标记区域，缺省时不标记任何单元
    #[serde(default)]
    pub region: Option<RegionConfig>,
}

/// 闭区间区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// 下角
    pub min: [CellIdx; 3],
    /// 上角
    pub max: [CellIdx; 3],
}

impl RegionConfig {
    /// 转换为单元区间
    pub fn to_interval(&self) -> CellInterval {
        CellInterval::new(
            Cell::new(self.min[0], self.min[1], self.min[2]),
            Cell::new(self.max[0], self.max[1], self.max[2]),
        )
    }
}

impl BlockSetupConfig {
    /// 解析 JSON 字符串
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 保存为 JSON 文件
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证布置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.size.iter().any(|&s| s == 0) {
            return Err(ConfigError::invalid("size", format!("{:?}", self.size), "每个方向至少 1 个单元"));
        }
        if self.ghost_layers == 0 {
            return Err(ConfigError::invalid("ghost_layers", 0, "至少需要 1 层幽灵层"));
        }
        if self.handlers.is_empty() {
            return Err(ConfigError::Missing("handlers".to_string()));
        }

        let mut handler_uids = HashSet::new();
        let mut flag_names = HashSet::new();
        for handler in &self.handlers {
            if !handler_uids.insert(handler.uid.as_str()) {
                return Err(ConfigError::invalid("handlers.uid", &handler.uid, "处理器 UID 重复"));
            }
            if !flag_names.insert(handler.domain_flag.as_str()) {
                return Err(ConfigError::invalid("handlers.domain_flag", &handler.domain_flag, "标志名重复"));
            }
            for boundary in &handler.boundaries {
                if !flag_names.insert(boundary.name.as_str()) {
                    return Err(ConfigError::invalid("boundaries.name", &boundary.name, "标志名重复"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_setup_is_valid() {
        let setup = BlockSetupConfig::default();
        setup.validate().unwrap();
        assert_eq!(setup.handlers[0].boundaries.len(), 2);
    }

    #[test]
    fn test_parse_with_kinds() {
        let json = r#"{
            "size": [4, 4, 1],
            "ghost_layers": 2,
            "handlers": [
                { "uid": "h", "domain_flag": "fluid",
                  "boundaries": [ { "name": "wall", "kind": "zero_gradient",
                                    "region": { "min": [0, 0, 0], "max": [3, 0, 0] } } ] }
            ]
        }"#;
        let setup = BlockSetupConfig::from_json_str(json).unwrap();
        assert_eq!(setup.ghost_layers, 2);
        let boundary = &setup.handlers[0].boundaries[0];
        assert_eq!(boundary.kind, BoundaryKindConfig::ZeroGradient);
        assert_eq!(
            boundary.region.unwrap().to_interval(),
            CellInterval::from_bounds(0, 0, 0, 3, 0, 0)
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut setup = BlockSetupConfig::default();
        setup.handlers.push(setup.handlers[0].clone());
        assert!(setup.validate().is_err());

        let mut setup = BlockSetupConfig::default();
        setup.ghost_layers = 0;
        assert!(setup.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.json");
        BlockSetupConfig::default().save(&path).unwrap();
        let loaded = BlockSetupConfig::from_file(&path).unwrap();
        assert_eq!(loaded.size, [8, 8, 8]);
        assert_eq!(loaded.handlers.len(), 1);
    }
}
