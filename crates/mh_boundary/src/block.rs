// crates/mh_boundary/src/block.rs

//! 由布置构建网格块
//!
//! 一个 [`Block`] 包含标志场、数值场和挂在其上的边界处理器集合。
//! [`exchange`] 在两个相邻块之间完成一次幽灵层交换。

use serde_json::json;

use mh_config::{BlockSetupConfig, ConfigBlock};
use mh_field::{shared, FlagField, GhostLayerField, SharedFlagField, SharedScalarField};
use mh_foundation::{BoundaryHandlingCollectionUid, BoundaryUid, Direction, RecvBuffer, SendBuffer};

use crate::collection::BoundaryHandlingCollection;
use crate::config::NullConfiguration;
use crate::error::BoundaryResult;
use crate::handler::BoundaryHandler;
use crate::handling::BoundaryHandling;

/// 网格块
pub struct Block {
    flags: SharedFlagField,
    values: SharedScalarField,
    collection: BoundaryHandlingCollection,
}

impl Block {
    /// 按布置创建块，标志全部为空
    pub fn from_setup(uid: impl Into<BoundaryHandlingCollectionUid>, setup: &BlockSetupConfig) -> BoundaryResult<Self> {
        setup.validate()?;

        let [x, y, z] = setup.size;
        let flags = shared(FlagField::new(x, y, z, setup.ghost_layers)?);
        let values = shared(GhostLayerField::new(x, y, z, setup.ghost_layers, setup.initial_value)?);

        let handlers = setup
            .handlers
            .iter()
            .map(|h| {
                BoundaryHandling::from_setup(h, flags.clone(), values.clone())
                    .map(|handling| Box::new(handling) as Box<dyn BoundaryHandler>)
            })
            .collect::<BoundaryResult<Vec<_>>>()?;

        let collection = BoundaryHandlingCollection::new(uid, flags.clone(), handlers)?;
        Ok(Self {
            flags,
            values,
            collection,
        })
    }

    /// 按布置标记几何：内部单元置各处理器的域标志，边界区域强制置边界标志
    pub fn mark_regions(&mut self, setup: &BlockSetupConfig) -> BoundaryResult<()> {
        let interior = self.flags.read().interval();
        for handler in &setup.handlers {
            self.collection
                .set_flag_interval(handler.domain_flag.as_str(), &interior, &NullConfiguration)?;
        }

        for boundary in setup.handlers.iter().flat_map(|h| &h.boundaries) {
            let Some(region) = boundary.region else {
                continue;
            };
            let config = ConfigBlock::new(boundary.name.as_str(), json!({ "value": boundary.value }));
            let param = self
                .collection
                .create_boundary_configuration(&BoundaryUid::new(&boundary.name), &config)?;
            self.collection
                .force_flag_interval(boundary.name.as_str(), &region.to_interval(), param.as_ref())?;
        }

        self.collection.refresh(setup.ghost_layers);
        Ok(())
    }

    /// 标志场
    pub fn flags(&self) -> &SharedFlagField {
        &self.flags
    }

    /// 数值场
    pub fn values(&self) -> &SharedScalarField {
        &self.values
    }

    /// 边界处理器集合
    pub fn collection(&self) -> &BoundaryHandlingCollection {
        &self.collection
    }

    /// 边界处理器集合（可变）
    pub fn collection_mut(&mut self) -> &mut BoundaryHandlingCollection {
        &mut self.collection
    }

    /// 拆分为集合与数值场
    pub fn into_parts(self) -> (BoundaryHandlingCollection, SharedScalarField) {
        (self.collection, self.values)
    }
}

/// 把 `sender` 发往 `direction` 方向的 `layers` 层交换到 `receiver`
///
/// 接收方在反方向的幽灵层上解包。返回传输的字节数。
pub fn exchange(
    sender: &BoundaryHandlingCollection,
    receiver: &mut BoundaryHandlingCollection,
    direction: Direction,
    layers: usize,
    assume_identical: bool,
) -> BoundaryResult<usize> {
    let mut send = SendBuffer::new();
    sender.pack(&mut send, direction, layers, assume_identical);
    let bytes = send.len();

    let mut recv = RecvBuffer::from(send);
    receiver.unpack(&mut recv, direction.inverse(), layers, assume_identical)?;
    debug_assert!(recv.is_exhausted());
    Ok(bytes)
}
