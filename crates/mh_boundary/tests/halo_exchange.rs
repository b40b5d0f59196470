// crates/mh_boundary/tests/halo_exchange.rs

//! 相邻块之间的幽灵层交换

use mh_boundary::handling::{Boundary, BoundaryHandling, DirichletBoundary, DirichletConfiguration, ZeroGradientBoundary};
use mh_boundary::{exchange, sweep_blocks, Block, BoundaryError, BoundaryHandler, BoundaryHandlingCollection, NullConfiguration};
use mh_config::BlockSetupConfig;
use mh_field::{shared, FlagField, FlagMask, GhostLayerField};
use mh_foundation::{Cell, CellInterval, Direction, FlagUid, RecvBuffer, SendBuffer};

const SIZE: [usize; 3] = [4, 3, 2];

/// 4x3x2 的块，`before` 中的标志先于标准标志注册，`after` 中的随后注册
fn block(uid: &str, ghost_layers: usize, before: &[&str], after: &[&str]) -> BoundaryHandlingCollection {
    let [x, y, z] = SIZE;
    let mut field = FlagField::new(x, y, z, ghost_layers).unwrap();
    for name in before {
        field.register_flag(*name).unwrap();
    }
    let fluid = field.register_flag("fluid").unwrap();
    let inlet = field.register_flag("inlet").unwrap();
    let solid = field.register_flag("solid").unwrap();
    let outlet = field.register_flag("outlet").unwrap();
    field.register_flag("marker").unwrap();
    for name in after {
        field.register_flag(*name).unwrap();
    }

    let field = shared(field);
    let values = shared(GhostLayerField::new(x, y, z, ghost_layers, 0.0).unwrap());

    let fluid_conditions: Vec<Box<dyn Boundary>> = vec![Box::new(DirichletBoundary::new("inlet", inlet, 0.0))];
    let solid_conditions: Vec<Box<dyn Boundary>> = vec![Box::new(ZeroGradientBoundary::new("outlet", outlet))];
    let handlers: Vec<Box<dyn BoundaryHandler>> = vec![
        Box::new(BoundaryHandling::new("fluid_h", field.clone(), values.clone(), fluid, fluid_conditions).unwrap()),
        Box::new(BoundaryHandling::new("solid_h", field.clone(), values, solid, solid_conditions).unwrap()),
    ];
    BoundaryHandlingCollection::new(uid, field, handlers).unwrap()
}

/// 内部全部为 fluid，东侧两列带入口（每个单元不同的值），另有 solid/outlet/marker
fn populate(collection: &mut BoundaryHandlingCollection) {
    let interior = collection.ghost_layer_interval(0);
    collection
        .set_flag_interval("fluid", &interior, &NullConfiguration)
        .unwrap();

    for cell in &CellInterval::from_bounds(2, 0, 0, 3, 2, 0) {
        let param = DirichletConfiguration {
            value: (cell.x * 100 + cell.y * 10 + cell.z) as f64,
        };
        collection.force_flag("inlet", cell, &param).unwrap();
    }

    collection
        .set_flag("solid", Cell::new(3, 1, 1), &NullConfiguration)
        .unwrap();
    collection
        .set_flag("outlet", Cell::new(3, 2, 1), &NullConfiguration)
        .unwrap();
    collection
        .set_flag("marker", Cell::new(3, 0, 1), &NullConfiguration)
        .unwrap();
    let ghost_layers = collection.flag_field().read().nr_of_ghost_layers();
    collection.refresh(ghost_layers);
}

fn mask(collection: &BoundaryHandlingCollection, cell: Cell) -> FlagMask {
    collection.flag_field().read().get(cell)
}

fn inlet_value(collection: &BoundaryHandlingCollection, cell: Cell) -> Option<f64> {
    collection
        .boundary_handling::<BoundaryHandling>(&"fluid_h".into())
        .unwrap()
        .condition(&"inlet".into())
        .and_then(|c| c.as_any().downcast_ref::<DirichletBoundary>())
        .and_then(|inlet| inlet.value(cell))
}

/// 发送方单元在接收方坐标系中的位置（发送方位于接收方西侧）
fn sender_cell(cell: Cell) -> Cell {
    Cell::new(cell.x + SIZE[0] as i64, cell.y, cell.z)
}

// ============================================================
// 区间几何
// ============================================================

#[test]
fn test_exchange_intervals() {
    let collection = block("a", 2, &[], &[]);

    assert_eq!(
        collection.unpacking_interval(Direction::E, 1),
        CellInterval::from_bounds(4, -1, -1, 4, 3, 2)
    );
    assert_eq!(
        collection.packing_interval(Direction::E, 1),
        CellInterval::from_bounds(3, -1, -1, 3, 3, 2)
    );
    assert_eq!(
        collection.unpacking_interval(Direction::W, 2),
        CellInterval::from_bounds(-2, -2, -2, -1, 4, 3)
    );
    assert_eq!(
        collection.packing_interval(Direction::W, 2),
        CellInterval::from_bounds(0, -2, -2, 1, 4, 3)
    );
    assert_eq!(
        collection.unpacking_interval(Direction::TNE, 1),
        CellInterval::from_bounds(4, 3, 2, 4, 3, 2)
    );
    assert_eq!(
        collection.packing_interval(Direction::TNE, 1),
        CellInterval::from_bounds(3, 2, 1, 3, 2, 1)
    );

    // 沿方向非零的轴，打包区间落在内部；其余轴保留幽灵层。
    // 打包区间与反方向的解包区间大小相同
    let interior = collection.ghost_layer_interval(0);
    for dir in Direction::D3Q26 {
        for layers in 1..=2 {
            let packing = collection.packing_interval(dir, layers);
            let unpacking = collection.unpacking_interval(dir.inverse(), layers);
            assert!(collection.outer_bb().contains_interval(&packing), "{} {}", dir, layers);
            for axis in 0..3 {
                if dir.component(axis) != 0 {
                    assert!(packing.min_of(axis) >= interior.min_of(axis), "{} {} axis {}", dir, layers, axis);
                    assert!(packing.max_of(axis) <= interior.max_of(axis), "{} {} axis {}", dir, layers, axis);
                } else {
                    let ghost = collection.ghost_layer_interval(layers);
                    assert_eq!(packing.min_of(axis), ghost.min_of(axis), "{} {} axis {}", dir, layers, axis);
                    assert_eq!(packing.max_of(axis), ghost.max_of(axis), "{} {} axis {}", dir, layers, axis);
                }
            }
            assert_eq!(packing.num_cells(), unpacking.num_cells(), "{} {}", dir, layers);
        }
    }

    assert_eq!(
        collection.packing_interval(Direction::N, 1),
        CellInterval::from_bounds(-1, 2, -1, 4, 2, 2)
    );
}

// ============================================================
// 交换
// ============================================================

#[test]
fn test_identical_mappings_round_trip() {
    let mut sender = block("a", 1, &[], &[]);
    populate(&mut sender);
    let mut receiver = block("b", 1, &[], &[]);

    exchange(&sender, &mut receiver, Direction::E, 1, true).unwrap();

    let region = receiver.unpacking_interval(Direction::W, 1);
    assert_eq!(region.min.x, -1);
    for cell in &region {
        let source = sender_cell(cell);
        assert_eq!(mask(&receiver, cell), mask(&sender, source), "cell {}", cell);
        assert_eq!(inlet_value(&receiver, cell), inlet_value(&sender, source), "cell {}", cell);
    }
    assert_eq!(inlet_value(&receiver, Cell::new(-1, 2, 0)), Some(320.0));
    assert!(receiver.check_consistency(1));
}

#[test]
fn test_translated_mappings() {
    let mut sender = block("a", 1, &[], &[]);
    populate(&mut sender);
    let mut receiver = block("b", 1, &["padding"], &[]);

    let sender_map = sender.flag_mapping();
    let receiver_map = receiver.flag_mapping();
    assert_ne!(sender_map["inlet"], receiver_map["inlet"]);

    exchange(&sender, &mut receiver, Direction::E, 1, false).unwrap();

    for cell in &receiver.unpacking_interval(Direction::W, 1) {
        let source = sender_cell(cell);
        let sent = mask(&sender, source);
        let received = mask(&receiver, cell);
        for (name, &bit) in &sender_map {
            assert_eq!(sent & bit != 0, received & receiver_map[name] != 0, "{} at {}", name, cell);
        }
        assert_eq!(received & receiver_map["padding"], 0);
        assert_eq!(inlet_value(&receiver, cell), inlet_value(&sender, source));
    }
    assert!(receiver.check_consistency(1));
}

#[test]
fn test_dictionary_with_identical_mappings() {
    let mut sender = block("a", 1, &[], &[]);
    populate(&mut sender);
    let mut with_dict = block("b", 1, &[], &[]);
    let mut without_dict = block("c", 1, &[], &[]);

    let dict_bytes = exchange(&sender, &mut with_dict, Direction::E, 1, false).unwrap();
    let raw_bytes = exchange(&sender, &mut without_dict, Direction::E, 1, true).unwrap();
    assert!(dict_bytes > raw_bytes);

    for cell in &with_dict.unpacking_interval(Direction::W, 1) {
        assert_eq!(mask(&with_dict, cell), mask(&without_dict, cell));
    }
}

#[test]
fn test_unknown_neighbor_flag() {
    let sender = block("a", 1, &[], &["sediment"]);
    let mut receiver = block("b", 1, &[], &[]);

    let result = exchange(&sender, &mut receiver, Direction::E, 1, false);
    assert!(matches!(
        result,
        Err(BoundaryError::UnknownNeighborFlag { collection, flag }) if collection == "b" && flag == "sediment"
    ));
}

#[test]
fn test_multi_layer_exchange() {
    let mut sender = block("a", 2, &[], &[]);
    populate(&mut sender);
    let mut receiver = block("b", 2, &[], &[]);

    exchange(&sender, &mut receiver, Direction::E, 2, true).unwrap();

    let region = receiver.unpacking_interval(Direction::W, 2);
    assert_eq!((region.min.x, region.max.x), (-2, -1));
    for cell in &region {
        let source = sender_cell(cell);
        assert_eq!(mask(&receiver, cell), mask(&sender, source), "cell {}", cell);
        assert_eq!(inlet_value(&receiver, cell), inlet_value(&sender, source));
    }
    assert_eq!(inlet_value(&receiver, Cell::new(-2, 1, 0)), Some(210.0));
    assert!(receiver.check_consistency(2));
}

#[test]
fn test_unpack_replaces_previous_ghost_state() {
    let sender = block("a", 1, &[], &[]);
    let mut receiver = block("b", 1, &[], &[]);

    let stale = Cell::new(-1, 0, 0);
    receiver
        .set_flag("inlet", stale, &DirichletConfiguration { value: 5.0 })
        .unwrap();
    receiver.set_flag("marker", stale, &NullConfiguration).unwrap();
    receiver
        .set_flag("fluid", Cell::new(0, 0, 0), &NullConfiguration)
        .unwrap();

    let bytes = exchange(&sender, &mut receiver, Direction::E, 1, true).unwrap();
    assert_eq!(
        bytes,
        sender.packing_interval(Direction::E, 1).num_cells() * std::mem::size_of::<FlagMask>()
    );

    assert_eq!(mask(&receiver, stale), 0);
    assert_eq!(inlet_value(&receiver, stale), None);
    // 接收区间之外不受影响
    let fluid = receiver.flag_field().read().flag(&FlagUid::new("fluid")).unwrap();
    assert_eq!(mask(&receiver, Cell::new(0, 0, 0)), fluid);
    assert!(receiver.check_consistency(1));
}

#[test]
fn test_manual_buffers_and_underflow() {
    let mut sender = block("a", 1, &[], &[]);
    populate(&mut sender);
    let mut receiver = block("b", 1, &[], &[]);

    let mut send = SendBuffer::new();
    sender.pack(&mut send, Direction::N, 1, false);
    let mut recv = RecvBuffer::from(send);
    receiver.unpack(&mut recv, Direction::S, 1, false).unwrap();
    assert!(recv.is_exhausted());

    // 截断的数据
    let mut send = SendBuffer::new();
    sender.pack(&mut send, Direction::N, 1, true);
    let mut bytes = send.into_bytes();
    bytes.truncate(bytes.len() / 2);
    let mut recv = RecvBuffer::from(bytes);
    assert!(receiver.unpack(&mut recv, Direction::S, 1, true).is_err());
}

// ============================================================
// 由布置构建的块
// ============================================================

#[test]
fn test_blocks_exchange_then_sweep() {
    let setup = BlockSetupConfig::default();
    let mut west = Block::from_setup("west", &setup).unwrap();
    let mut east = Block::from_setup("east", &setup).unwrap();
    west.mark_regions(&setup).unwrap();
    east.mark_regions(&setup).unwrap();

    let inlet_cell = Cell::new(-1, 3, 3);
    let inlet = east.flags().read().flag(&FlagUid::new("inlet")).unwrap();
    let fluid = east.flags().read().flag(&FlagUid::new("fluid")).unwrap();
    assert!(east.flags().read().is_flag_set(inlet_cell, inlet));

    exchange(west.collection(), east.collection_mut(), Direction::E, 1, false).unwrap();
    assert_eq!(east.flags().read().get(inlet_cell), fluid);
    assert!(east.collection().check_consistency(1));

    let (west_collection, west_values) = west.into_parts();
    let (east_collection, east_values) = east.into_parts();
    let mut collections = vec![west_collection, east_collection];
    sweep_blocks(&mut collections, 1);

    assert_eq!(west_values.read().get(inlet_cell), 1.0);
    // 东块西侧幽灵层已是流体，不再由入口写入
    assert_eq!(east_values.read().get(inlet_cell), setup.initial_value);
}
