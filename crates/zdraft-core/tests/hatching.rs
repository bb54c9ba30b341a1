//! 图案填充的行为测试

use zdraft_core::config::{ClipMode, HatchConfig};
use zdraft_core::hatch::{split_into_dashes, HatchLine, HatchPattern};
use zdraft_core::prelude::*;

fn room() -> Vec<HatchBoundary> {
    vec![HatchBoundary::rectangle(Point2::origin(), 40.0, 25.0)]
}

#[test]
fn test_generation_is_deterministic() {
    let engine = HatchEngine::default();
    for id in ["ANSI31", "ANSI37", "BRICK"] {
        let pattern = engine.pattern(id).cloned().unwrap();
        let definition = HatchDefinition::new(room(), pattern).with_angle(0.3).with_scale(2.0);
        let first = engine.generate_hatch_lines(&definition);
        let second = engine.generate_hatch_lines(&definition);
        assert!(!first.is_empty(), "{id} produced nothing");
        assert_eq!(first, second, "{id} is not deterministic");
    }
}

#[test]
fn test_dash_cycle_clips_final_dash() {
    let ruling = Segment2::new(Point2::new(0.0, 0.0), Point2::new(9.0, 0.0));
    let dashes = split_into_dashes(&ruling, &[2.0, 1.0]);
    assert_eq!(dashes.len(), 3);
    for (i, dash) in dashes.iter().enumerate() {
        assert!((dash.length() - 2.0).abs() < 1e-9);
        assert!((dash.start.x - 3.0 * i as f64).abs() < 1e-9);
    }
}

#[test]
fn test_exact_clip_stays_inside_boundary() {
    let engine = HatchEngine::default();
    let pattern = engine.pattern("ANSI31").cloned().unwrap();
    let boundary = HatchBoundary::circle(Point2::new(5.0, 5.0), 20.0);
    let definition = HatchDefinition::new(vec![boundary.clone()], pattern);
    let segments = engine.generate_hatch_lines(&definition);
    assert!(!segments.is_empty());
    for segment in &segments {
        assert!(boundary.contains(&segment.midpoint()));
        assert!((segment.start - Point2::new(5.0, 5.0)).norm() <= 20.0 + 1e-6);
        assert!((segment.end - Point2::new(5.0, 5.0)).norm() <= 20.0 + 1e-6);
    }
}

#[test]
fn test_clip_modes_treat_crossing_dashes_differently() {
    let dashed = HatchPattern::new(
        "DASHED",
        "3 on, 2 off",
        vec![HatchLine {
            dash_lengths: vec![3.0, 2.0],
            ..HatchLine::solid(0.0, 1.0)
        }],
    );
    let boundary = HatchBoundary::rectangle(Point2::new(0.5, 0.5), 40.0, 25.0);
    let definition = HatchDefinition::new(vec![boundary.clone()], dashed);

    let exact = HatchEngine::default().generate_hatch_lines(&definition);
    assert!(!exact.is_empty());
    for segment in &exact {
        assert!(boundary.contains(&segment.midpoint()));
        assert!(segment.length() <= 3.0 + 1e-9);
        assert!(segment.start.x >= 0.5 - 1e-9 && segment.end.x <= 40.5 + 1e-9);
    }

    let coarse = HatchEngine::new(HatchConfig {
        clip_mode: ClipMode::EndpointInside,
        ..Default::default()
    })
    .generate_hatch_lines(&definition);
    assert!(!coarse.is_empty());
    for segment in &coarse {
        assert!((segment.length() - 3.0).abs() < 1e-9);
        assert!(boundary.contains(&segment.start) || boundary.contains(&segment.end));
    }
}

#[test]
fn test_entities_as_boundaries() {
    let mut session = DrawingSession::default();
    let rect = session.add_entity(Entity::new(Rectangle::new(Point2::origin(), 10.0, 10.0)));
    let line =
        session.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(10.0, 10.0))));

    let segments = session.hatch_entities(&[rect, line], "ANSI31", 1.0, 0.0).unwrap();
    assert!(!segments.is_empty());
    assert!(session.hatch_entities(&[line], "ANSI31", 1.0, 0.0).unwrap().is_empty());
    assert!(session.hatch_entities(&[rect], "NOPE", 1.0, 0.0).is_err());
}
