//! 块定义、实例与分解的行为测试

use zdraft_core::block::{SearchCriteria, USER_LIBRARY};
use zdraft_core::geometry::Shape;
use zdraft_core::prelude::*;

#[test]
fn test_explode_applies_instance_transform() {
    let mut document = Document::new();
    let mut blocks = BlockManager::new();
    let def = blocks
        .create_block_definition(
            USER_LIBRARY,
            "HOLE",
            vec![BlockEntity::new(Circle::new(Point2::origin(), 5.0))],
            Point2::origin(),
            Vec::new(),
        )
        .unwrap();
    let instance = blocks
        .create_block_instance(
            def,
            Point2::new(100.0, 100.0),
            InstanceOptions::default().with_scale(2.0, 2.0),
        )
        .unwrap();

    let exploded = blocks.explode_block_instance(&mut document, instance).unwrap();
    assert_eq!(exploded.len(), 1);
    let Shape::Circle(circle) = &exploded[0].shape else {
        panic!("expected a circle, got {:?}", exploded[0].shape);
    };
    assert!((circle.center - Point2::new(100.0, 100.0)).norm() < 1e-9);
    assert!((circle.radius - 10.0).abs() < 1e-9);
    assert!(document.entity_by_id(exploded[0].id).is_some());

    assert!(blocks.instance(instance).unwrap().exploded);
    assert_eq!(blocks.active_instances().count(), 0);
    assert!(blocks.explode_block_instance(&mut document, instance).is_err());
}

#[test]
fn test_non_uniform_scale_uses_larger_factor_for_circles() {
    let mut document = Document::new();
    let mut blocks = BlockManager::new();
    let def = blocks
        .create_block_definition(
            USER_LIBRARY,
            "RING",
            vec![BlockEntity::new(Circle::new(Point2::new(1.0, 0.0), 1.0))],
            Point2::origin(),
            Vec::new(),
        )
        .unwrap();
    let options = InstanceOptions::default().with_scale(3.0, 1.5);
    let instance = blocks
        .create_block_instance(def, Point2::origin(), options)
        .unwrap();
    let exploded = blocks.explode_block_instance(&mut document, instance).unwrap();
    let Shape::Circle(circle) = &exploded[0].shape else {
        panic!("expected a circle");
    };
    assert!((circle.center - Point2::new(3.0, 0.0)).norm() < 1e-9);
    assert!((circle.radius - 3.0).abs() < 1e-9);
}

#[test]
fn test_standard_library_is_read_only() {
    let mut blocks = BlockManager::new();
    let door = blocks.definition_by_name("DOOR").unwrap().id;
    assert!(matches!(
        blocks.remove_block_definition(door),
        Err(DraftError::ReadOnlyLibrary(_))
    ));
    assert_eq!(blocks.search_blocks(&SearchCriteria::text("opening")).len(), 2);
}

#[test]
fn test_session_inserts_and_explodes_by_name() {
    let mut session = DrawingSession::default();
    let id = session
        .insert_block(
            "GRID_BUBBLE",
            Point2::new(0.0, 0.0),
            InstanceOptions::default().with_attribute("GRID", "C"),
        )
        .unwrap();
    let exploded = session.explode_block_instance(id).unwrap();

    let labels: Vec<&str> = exploded
        .iter()
        .filter_map(|e| match &e.shape {
            Shape::Text(t) => Some(t.content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["C"]);
    assert_eq!(session.document().entity_count(), exploded.len());
}
