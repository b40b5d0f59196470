// crates/mh_boundary/src/handling/dirichlet.rs

//! 固定值边界
//!
//! 每个边界单元保存自己的值，处理时直接写入数值场。
//! 该值同时是幽灵层交换的单元负载（一个 `f64`）。

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use mh_config::ConfigBlock;
use mh_field::{FlagField, FlagMask, ScalarField};
use mh_foundation::{BoundaryUid, Cell, RecvBuffer, SendBuffer};

use super::Boundary;
use crate::config::{BoundaryConfiguration, NullConfiguration};
use crate::error::{BoundaryError, BoundaryResult};

/// 固定值参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirichletConfiguration {
    /// 边界值
    pub value: f64,
}

impl BoundaryConfiguration for DirichletConfiguration {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 固定值边界
#[derive(Debug, Clone)]
pub struct DirichletBoundary {
    uid: BoundaryUid,
    mask: FlagMask,
    default_value: f64,
    values: BTreeMap<Cell, f64>,
}

impl DirichletBoundary {
    /// 创建边界，`default_value` 用于以空参数置位的单元
    pub fn new(uid: impl Into<BoundaryUid>, mask: FlagMask, default_value: f64) -> Self {
        Self {
            uid: uid.into(),
            mask,
            default_value,
            values: BTreeMap::new(),
        }
    }

    /// 单元上的边界值
    pub fn value(&self, cell: Cell) -> Option<f64> {
        self.values.get(&cell).copied()
    }

    /// 已登记单元数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有登记单元
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Boundary for DirichletBoundary {
    fn uid(&self) -> &BoundaryUid {
        &self.uid
    }

    fn mask(&self) -> FlagMask {
        self.mask
    }

    fn create_configuration(&self, config: &ConfigBlock) -> BoundaryResult<Arc<dyn BoundaryConfiguration>> {
        let value = config.parameter_or("value", self.default_value)?;
        Ok(Arc::new(DirichletConfiguration { value }))
    }

    fn register_cell(&mut self, cell: Cell, param: &dyn BoundaryConfiguration) -> BoundaryResult<()> {
        let any = param.as_any();
        let value = if let Some(config) = any.downcast_ref::<DirichletConfiguration>() {
            config.value
        } else if any.is::<NullConfiguration>() {
            self.default_value
        } else {
            return Err(BoundaryError::invalid_parameter(format!(
                "边界 '{}' 需要 DirichletConfiguration, 实际为 {:?}",
                self.uid, param
            )));
        };
        self.values.insert(cell, value);
        Ok(())
    }

    fn unregister_cell(&mut self, cell: Cell) {
        self.values.remove(&cell);
    }

    fn is_registered(&self, cell: Cell) -> bool {
        self.values.contains_key(&cell)
    }

    fn treat(&self, cell: Cell, _flags: &FlagField, _domain_mask: FlagMask, values: &mut ScalarField) {
        if let Some(&value) = self.values.get(&cell) {
            values.set(cell, value);
        }
    }

    fn pack_cell(&self, buffer: &mut SendBuffer, cell: Cell) {
        buffer.put(self.values.get(&cell).copied().unwrap_or(self.default_value));
    }

    fn unpack_cell(&mut self, buffer: &mut RecvBuffer, cell: Cell) -> BoundaryResult<()> {
        let value = buffer.get::<f64>()?;
        self.values.insert(cell, value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_with_parameters() {
        let mut inlet = DirichletBoundary::new("inlet", 4, 1.0);
        let c = Cell::new(0, 0, 0);

        inlet.register_cell(c, &NullConfiguration).unwrap();
        assert_eq!(inlet.value(c), Some(1.0));

        inlet.register_cell(c, &DirichletConfiguration { value: 3.5 }).unwrap();
        assert_eq!(inlet.value(c), Some(3.5));

        inlet.unregister_cell(c);
        assert!(inlet.is_empty());
    }

    #[test]
    fn test_configuration_from_block() {
        let inlet = DirichletBoundary::new("inlet", 4, 1.0);
        let block = ConfigBlock::from_json_str("inlet", r#"{ "value": 2.25 }"#).unwrap();
        let param = inlet.create_configuration(&block).unwrap();
        let config = param.as_any().downcast_ref::<DirichletConfiguration>().unwrap();
        assert_eq!(config.value, 2.25);

        let param = inlet.create_configuration(&ConfigBlock::empty("inlet")).unwrap();
        let config = param.as_any().downcast_ref::<DirichletConfiguration>().unwrap();
        assert_eq!(config.value, 1.0);
    }

    #[test]
    fn test_payload() {
        let mut a = DirichletBoundary::new("inlet", 4, 0.0);
        let c = Cell::new(1, 2, 3);
        a.register_cell(c, &DirichletConfiguration { value: -7.0 }).unwrap();

        let mut send = SendBuffer::new();
        a.pack_cell(&mut send, c);
        let mut recv = RecvBuffer::from(send);

        let mut b = DirichletBoundary::new("inlet", 4, 0.0);
        b.unpack_cell(&mut recv, c).unwrap();
        assert_eq!(b.value(c), Some(-7.0));
    }
}
