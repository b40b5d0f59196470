// crates/mh_boundary/src/handling/zero_gradient.rs

//! 零梯度边界：复制第一个 D3Q6 域邻居的值，无单元负载。

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use mh_config::ConfigBlock;
use mh_field::{FlagField, FlagMask, ScalarField};
use mh_foundation::{BoundaryUid, Cell, Direction, RecvBuffer, SendBuffer};

use super::Boundary;
use crate::config::{BoundaryConfiguration, NullConfiguration};
use crate::error::BoundaryResult;

/// 零梯度边界
#[derive(Debug, Clone)]
pub struct ZeroGradientBoundary {
    uid: BoundaryUid,
    mask: FlagMask,
    cells: BTreeSet<Cell>,
}

impl ZeroGradientBoundary {
    /// 创建边界
    pub fn new(uid: impl Into<BoundaryUid>, mask: FlagMask) -> Self {
        Self {
            uid: uid.into(),
            mask,
            cells: BTreeSet::new(),
        }
    }
}

impl Boundary for ZeroGradientBoundary {
    fn uid(&self) -> &BoundaryUid {
        &self.uid
    }

    fn mask(&self) -> FlagMask {
        self.mask
    }

    fn create_configuration(&self, _config: &ConfigBlock) -> BoundaryResult<Arc<dyn BoundaryConfiguration>> {
        Ok(Arc::new(NullConfiguration))
    }

    fn register_cell(&mut self, cell: Cell, _param: &dyn BoundaryConfiguration) -> BoundaryResult<()> {
        self.cells.insert(cell);
        Ok(())
    }

    fn unregister_cell(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }

    fn is_registered(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    fn treat(&self, cell: Cell, flags: &FlagField, domain_mask: FlagMask, values: &mut ScalarField) {
        let source = Direction::D3Q6
            .iter()
            .map(|&dir| cell.neighbor(dir))
            .find(|&n| flags.contains(n) && flags.is_part_of_mask_set(n, domain_mask));
        if let Some(n) = source {
            let value = values.get(n);
            values.set(cell, value);
        }
    }

    fn pack_cell(&self, _buffer: &mut SendBuffer, _cell: Cell) {}

    fn unpack_cell(&mut self, _buffer: &mut RecvBuffer, cell: Cell) -> BoundaryResult<()> {
        self.cells.insert(cell);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_field::GhostLayerField;

    #[test]
    fn test_copies_domain_neighbor() {
        let mut flags = FlagField::new(3, 1, 1, 1).unwrap();
        let fluid = flags.register_flag("fluid").unwrap();
        let outlet = flags.register_flag("outlet").unwrap();
        let mut values = GhostLayerField::new(3, 1, 1, 1, 0.0).unwrap();

        let boundary_cell = Cell::new(3, 0, 0);
        flags.add_flag(Cell::new(2, 0, 0), fluid);
        flags.add_flag(boundary_cell, outlet);
        values.set(Cell::new(2, 0, 0), 5.0);

        let zg = ZeroGradientBoundary::new("outlet", outlet);
        zg.treat(boundary_cell, &flags, fluid, &mut values);
        assert_eq!(values.get(boundary_cell), 5.0);
    }

    #[test]
    fn test_no_domain_neighbor_leaves_value() {
        let mut flags = FlagField::new(1, 1, 1, 1).unwrap();
        let fluid = flags.register_flag("fluid").unwrap();
        let mut values = GhostLayerField::new(1, 1, 1, 1, 2.0).unwrap();

        let zg = ZeroGradientBoundary::new("outlet", 2);
        zg.treat(Cell::new(0, 0, 0), &flags, fluid, &mut values);
        assert_eq!(values.get(Cell::new(0, 0, 0)), 2.0);
    }
}
