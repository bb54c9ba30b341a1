//! 图案填充引擎
//!
//! 输入一组闭合边界与一个图案，输出填充线段。生成过程没有隐藏状态，
//! 相同输入总是得到相同输出。
//!
//! 每组平行线的生成步骤：
//! 1. 所有闭合边界的包围盒并集，按 `overrun_factor × scale` 外扩；
//! 2. 平行线数量 `ceil(2 × 最大尺寸 / |偏移|) + extra_lines`，索引范围以包围盒中心为准，
//!    总数不超过 `max_segments`；
//! 3. 每条平行线长度为 `length_factor × 最大尺寸`，虚线相位锚定在该线的基点上；
//! 4. 按虚线周期拆分后裁剪到边界内。

mod boundary;
mod pattern;

pub use boundary::{clip_segment_exact, keep_if_endpoint_inside, HatchBoundary};
pub use pattern::{
    create_cross_hatch_pattern, create_simple_pattern, standard_patterns, HatchLine, HatchPattern,
};

use crate::config::{ClipMode, HatchConfig};
use crate::document::Document;
use crate::entity::EntityId;
use crate::error::{DraftError, DraftResult};
use crate::math::{rotate_vector, BoundingBox2, Point2, Segment2, Vector2, EPSILON};
use crate::style::Style;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// 一次填充的完整输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchDefinition {
    pub boundaries: Vec<HatchBoundary>,
    pub pattern: HatchPattern,
    pub scale: f64,
    /// 整体旋转角度（弧度），叠加到每组平行线的角度上
    pub angle: f64,
    /// 图案原点
    pub origin: Point2,
    pub style: Style,
    /// 关联填充：边界随源实体更新
    pub associative: bool,
    pub source_entities: Vec<EntityId>,
}

impl HatchDefinition {
    pub fn new(boundaries: Vec<HatchBoundary>, pattern: HatchPattern) -> Self {
        Self {
            boundaries,
            pattern,
            scale: 1.0,
            angle: 0.0,
            origin: Point2::origin(),
            style: Style::by_layer(),
            associative: false,
            source_entities: Vec::new(),
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_origin(mut self, origin: Point2) -> Self {
        self.origin = origin;
        self
    }
}

/// 填充引擎，持有图案库
#[derive(Debug, Clone)]
pub struct HatchEngine {
    config: HatchConfig,
    patterns: BTreeMap<String, HatchPattern>,
}

impl HatchEngine {
    /// 创建引擎并载入标准图案
    pub fn new(config: HatchConfig) -> Self {
        let patterns = standard_patterns()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Self { config, patterns }
    }

    pub fn config(&self) -> &HatchConfig {
        &self.config
    }

    pub fn pattern(&self, id: &str) -> Option<&HatchPattern> {
        self.patterns.get(id)
    }

    pub fn require_pattern(&self, id: &str) -> DraftResult<&HatchPattern> {
        self.pattern(id)
            .ok_or_else(|| DraftError::PatternNotFound(id.to_string()))
    }

    /// 按 id 排序的所有图案
    pub fn pattern_ids(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// 注册图案，id 不可重复
    pub fn register_pattern(&mut self, pattern: HatchPattern) -> DraftResult<()> {
        if self.patterns.contains_key(&pattern.id) {
            return Err(DraftError::DuplicateName(pattern.id));
        }
        debug!(id = %pattern.id, lines = pattern.lines.len(), "hatch pattern registered");
        self.patterns.insert(pattern.id.clone(), pattern);
        Ok(())
    }

    pub fn create_simple_pattern(
        &mut self,
        id: &str,
        angle_degrees: f64,
        spacing: f64,
    ) -> DraftResult<HatchPattern> {
        let pattern = create_simple_pattern(id, angle_degrees, spacing);
        self.register_pattern(pattern.clone())?;
        Ok(pattern)
    }

    pub fn create_cross_hatch_pattern(
        &mut self,
        id: &str,
        angle_degrees: f64,
        spacing: f64,
    ) -> DraftResult<HatchPattern> {
        let pattern = create_cross_hatch_pattern(id, angle_degrees, spacing);
        self.register_pattern(pattern.clone())?;
        Ok(pattern)
    }

    /// 由文档中的闭合实体构造填充定义
    ///
    /// 不闭合的实体被忽略；任一 id 不存在时返回错误。
    pub fn definition_from_entities(
        &self,
        document: &Document,
        entity_ids: &[EntityId],
        pattern_id: &str,
        scale: f64,
        angle: f64,
    ) -> DraftResult<HatchDefinition> {
        let pattern = self.require_pattern(pattern_id)?.clone();
        let boundaries = boundaries_from_entities(document, entity_ids)?;
        let mut definition = HatchDefinition::new(boundaries, pattern)
            .with_scale(scale)
            .with_angle(angle);
        definition.associative = true;
        definition.source_entities = entity_ids.to_vec();
        Ok(definition)
    }

    /// 直接由实体生成填充线
    pub fn generate_from_entities(
        &self,
        document: &Document,
        entity_ids: &[EntityId],
        pattern_id: &str,
        scale: f64,
        angle: f64,
    ) -> DraftResult<Vec<Segment2>> {
        let definition =
            self.definition_from_entities(document, entity_ids, pattern_id, scale, angle)?;
        Ok(self.generate_hatch_lines(&definition))
    }

    /// 关联填充：从源实体重新读取边界
    pub fn refresh_boundaries(
        &self,
        definition: &mut HatchDefinition,
        document: &Document,
    ) -> DraftResult<()> {
        if !definition.associative {
            return Ok(());
        }
        definition.boundaries = boundaries_from_entities(document, &definition.source_entities)?;
        Ok(())
    }

    /// 生成填充线段
    pub fn generate_hatch_lines(&self, definition: &HatchDefinition) -> Vec<Segment2> {
        let scale = definition.scale;
        if !(scale.is_finite() && scale > EPSILON) {
            debug!(scale, "non-positive hatch scale, nothing generated");
            return Vec::new();
        }

        let Some(bbox) = BoundingBox2::union_all(
            definition
                .boundaries
                .iter()
                .filter(|b| b.is_closed())
                .map(HatchBoundary::bounding_box),
        ) else {
            return Vec::new();
        };
        let bbox = bbox.expanded(self.config.overrun_factor * scale);

        let per_line: Vec<Vec<Segment2>> = definition
            .pattern
            .lines
            .par_iter()
            .map(|line| self.line_family(line, definition, &bbox))
            .collect();

        let mut segments: Vec<Segment2> = per_line.into_iter().flatten().collect();
        if segments.len() > self.config.max_segments {
            warn!(
                pattern = %definition.pattern.id,
                generated = segments.len(),
                limit = self.config.max_segments,
                "hatch output truncated"
            );
            segments.truncate(self.config.max_segments);
        }
        debug!(pattern = %definition.pattern.id, segments = segments.len(), "hatch generated");
        segments
    }

    /// 平行线索引范围：以包围盒中心为准，数量受 `max_segments` 约束
    fn ruling_range(
        &self,
        definition: &HatchDefinition,
        bbox: &BoundingBox2,
        base: Point2,
        offset_len: f64,
        spacing: f64,
        normal: Vector2,
    ) -> RangeInclusive<i64> {
        let wanted =
            (2.0 * bbox.max_dimension() / offset_len).ceil() + self.config.extra_lines as f64;
        let limit = (self.config.max_segments.saturating_sub(1) / 2) as i64;
        let count = if wanted > limit as f64 {
            warn!(
                pattern = %definition.pattern.id,
                wanted,
                limit = self.config.max_segments,
                "hatch rulings clamped"
            );
            limit
        } else {
            wanted as i64
        };
        let shift = ((bbox.center() - base).dot(&normal) / spacing).round() as i64;
        shift.saturating_sub(count)..=shift.saturating_add(count)
    }

    /// 单组平行线：生成、拆分虚线、裁剪
    fn line_family(
        &self,
        line: &HatchLine,
        definition: &HatchDefinition,
        bbox: &BoundingBox2,
    ) -> Vec<Segment2> {
        let scale = definition.scale;
        let angle = line.angle + definition.angle;
        let direction = Vector2::new(angle.cos(), angle.sin());
        let normal = Vector2::new(-direction.y, direction.x);

        let offset = rotate_vector(line.offset * scale, angle);
        let offset_len = offset.norm();
        let spacing = offset.dot(&normal);
        if offset_len < EPSILON || spacing.abs() < EPSILON {
            debug!(
                pattern = %definition.pattern.id,
                "hatch line without perpendicular offset skipped"
            );
            return Vec::new();
        }

        let center = bbox.center();
        let base =
            definition.origin + rotate_vector(line.base_point.coords * scale, definition.angle);
        let rulings = self.ruling_range(definition, bbox, base, offset_len, spacing, normal);
        let half_length = self.config.length_factor * bbox.max_dimension() / 2.0;

        let dashes: Vec<f64> = line.dash_lengths.iter().map(|d| d.abs() * scale).collect();
        let cycle: f64 = dashes.iter().sum();

        let mut out = Vec::new();
        for i in rulings {
            if out.len() >= self.config.max_segments {
                break;
            }
            let anchor = base + offset * i as f64;
            let mut start_t = (center - anchor).dot(&direction) - half_length;
            if cycle > EPSILON {
                start_t = (start_t / cycle).floor() * cycle;
            }
            let start = anchor + direction * start_t;
            let ruling = Segment2::new(start, start + direction * (2.0 * half_length));
            if !ruling.intersects_box(bbox) {
                continue;
            }
            for dash in split_into_dashes(&ruling, &dashes) {
                self.clip_into(&dash, &definition.boundaries, &mut out);
            }
        }
        out
    }

    fn clip_into(&self, segment: &Segment2, boundaries: &[HatchBoundary], out: &mut Vec<Segment2>) {
        match self.config.clip_mode {
            ClipMode::Exact => out.extend(clip_segment_exact(segment, boundaries)),
            ClipMode::EndpointInside => {
                if keep_if_endpoint_inside(segment, boundaries) {
                    out.push(*segment);
                }
            }
        }
    }
}

impl Default for HatchEngine {
    fn default() -> Self {
        Self::new(HatchConfig::default())
    }
}

fn boundaries_from_entities(
    document: &Document,
    entity_ids: &[EntityId],
) -> DraftResult<Vec<HatchBoundary>> {
    let mut boundaries = Vec::with_capacity(entity_ids.len());
    for id in entity_ids {
        let entity = document.require_entity(*id)?;
        match HatchBoundary::from_shape(&entity.shape) {
            Some(boundary) => boundaries.push(boundary),
            None => debug!(
                entity = %id,
                kind = entity.shape.type_name(),
                "open shape ignored as hatch boundary"
            ),
        }
    }
    Ok(boundaries)
}

/// 按画线/间隙交替长度拆分线段（下标 0 为画线）
///
/// 最后一段按剩余长度截断；长度为 0 的画线输出为点。
/// 周期长度为 0 时视为实线。
pub fn split_into_dashes(segment: &Segment2, dash_lengths: &[f64]) -> Vec<Segment2> {
    let cycle: f64 = dash_lengths.iter().map(|d| d.abs()).sum();
    let length = segment.length();
    if dash_lengths.is_empty() || cycle <= EPSILON || length <= EPSILON {
        return vec![*segment];
    }

    let direction = (segment.end - segment.start) / length;
    let mut dashes = Vec::new();
    let mut position = 0.0;
    let mut index = 0usize;
    while position < length - EPSILON {
        let dash = dash_lengths[index % dash_lengths.len()].abs();
        let end = (position + dash).min(length);
        if index % 2 == 0 {
            dashes.push(Segment2::new(
                segment.start + direction * position,
                segment.start + direction * end,
            ));
        }
        position = end;
        index += 1;
    }
    dashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::geometry::{Circle, Line, Rectangle};

    fn square(size: f64) -> HatchBoundary {
        HatchBoundary::rectangle(Point2::origin(), size, size)
    }

    #[test]
    fn test_dash_cycle_over_nine_units() {
        let seg = Segment2::new(Point2::new(0.0, 0.0), Point2::new(9.0, 0.0));
        let dashes = split_into_dashes(&seg, &[2.0, 1.0]);
        assert_eq!(dashes.len(), 3);
        for (i, dash) in dashes.iter().enumerate() {
            assert!((dash.length() - 2.0).abs() < 1e-9);
            assert!((dash.start.x - 3.0 * i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_final_dash_is_clipped() {
        let seg = Segment2::new(Point2::new(0.0, 0.0), Point2::new(7.0, 0.0));
        let dashes = split_into_dashes(&seg, &[2.0, 1.0]);
        assert_eq!(dashes.len(), 3);
        assert!((dashes[2].length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cycle_is_solid() {
        let seg = Segment2::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0));
        assert_eq!(split_into_dashes(&seg, &[0.0, 0.0]), vec![seg]);
        assert_eq!(split_into_dashes(&seg, &[]), vec![seg]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let engine = HatchEngine::default();
        let pattern = engine.pattern("ANSI33").unwrap().clone();
        let definition = HatchDefinition::new(vec![square(3.0)], pattern).with_angle(0.3);
        assert_eq!(
            engine.generate_hatch_lines(&definition),
            engine.generate_hatch_lines(&definition)
        );
    }

    #[test]
    fn test_exact_clip_stays_inside() {
        let engine = HatchEngine::default();
        let definition =
            HatchDefinition::new(vec![square(10.0)], create_simple_pattern("H", 45.0, 1.0));
        let segments = engine.generate_hatch_lines(&definition);
        assert!(!segments.is_empty());
        let bounds =
            BoundingBox2::new(Point2::new(-1e-6, -1e-6), Point2::new(10.0 + 1e-6, 10.0 + 1e-6));
        for seg in &segments {
            assert!(bounds.contains(&seg.start) && bounds.contains(&seg.end), "{seg:?}");
        }
    }

    #[test]
    fn test_horizontal_spacing_matches_pattern() {
        let engine = HatchEngine::default();
        let boundary = HatchBoundary::rectangle(Point2::new(0.0, -1.0), 10.0, 10.0);
        let definition = HatchDefinition::new(vec![boundary], create_simple_pattern("H", 0.0, 2.0));
        let mut ys: Vec<f64> = engine
            .generate_hatch_lines(&definition)
            .iter()
            .map(|s| s.start.y)
            .collect();
        ys.sort_by(f64::total_cmp);
        // y = 0, 2, 4, 6, 8
        assert_eq!(ys.len(), 5);
        for pair in ys.windows(2) {
            assert!((pair[1] - pair[0] - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_endpoint_inside_mode_keeps_whole_dashes() {
        let config = HatchConfig {
            clip_mode: ClipMode::EndpointInside,
            ..Default::default()
        };
        let engine = HatchEngine::new(config);
        let mut pattern = create_simple_pattern("D", 0.0, 1.0);
        pattern.lines[0].dash_lengths = vec![4.0, 4.0];
        let definition = HatchDefinition::new(vec![square(10.0)], pattern);
        let segments = engine.generate_hatch_lines(&definition);
        assert!(!segments.is_empty());
        for seg in &segments {
            assert!((seg.length() - 4.0).abs() < 1e-9);
        }
        assert!(segments.iter().any(|s| s.start.x < 0.0 || s.end.x > 10.0));
    }

    #[test]
    fn test_no_closed_boundary_yields_nothing() {
        let engine = HatchEngine::default();
        let pattern = engine.pattern("ANSI31").unwrap().clone();
        let empty = HatchDefinition::new(Vec::new(), pattern.clone());
        assert!(engine.generate_hatch_lines(&empty).is_empty());
        let open = HatchBoundary::Polyline {
            points: vec![Point2::origin(), Point2::new(5.0, 0.0), Point2::new(5.0, 5.0)],
            closed: false,
        };
        assert!(engine.generate_hatch_lines(&HatchDefinition::new(vec![open], pattern)).is_empty());
    }

    #[test]
    fn test_segment_cap() {
        let config = HatchConfig {
            max_segments: 5,
            ..Default::default()
        };
        let engine = HatchEngine::new(config);
        let definition =
            HatchDefinition::new(vec![square(10.0)], create_simple_pattern("H", 0.0, 0.5));
        assert_eq!(engine.generate_hatch_lines(&definition).len(), 5);
    }

    #[test]
    fn test_dense_pattern_bounds_ruling_count() {
        let config = HatchConfig {
            max_segments: 10,
            ..Default::default()
        };
        let engine = HatchEngine::new(config);
        let definition =
            HatchDefinition::new(vec![square(10.0)], create_simple_pattern("FINE", 0.0, 1e-4));
        let bbox = square(10.0).bounding_box().unwrap();
        let rulings = engine.ruling_range(
            &definition,
            &bbox,
            Point2::origin(),
            1e-4,
            1e-4,
            Vector2::new(0.0, 1.0),
        );
        assert_eq!(rulings.count(), 9);

        let segments = engine.generate_hatch_lines(&definition);
        assert!(!segments.is_empty());
        assert!(segments.len() <= 10);
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut engine = HatchEngine::default();
        assert!(engine.create_simple_pattern("MINE", 30.0, 1.0).is_ok());
        assert!(matches!(
            engine.create_cross_hatch_pattern("MINE", 0.0, 1.0),
            Err(DraftError::DuplicateName(_))
        ));
        assert!(matches!(engine.require_pattern("NOPE"), Err(DraftError::PatternNotFound(_))));
    }

    #[test]
    fn test_definition_from_entities() {
        let mut doc = Document::new();
        let circle = doc.add_entity(Entity::new(Circle::new(Point2::origin(), 5.0)));
        let rect = doc.add_entity(Entity::new(Rectangle::new(Point2::new(20.0, 0.0), 4.0, 4.0)));
        let line = doc.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(1.0, 1.0))));

        let engine = HatchEngine::default();
        let definition = engine
            .definition_from_entities(&doc, &[circle, rect, line], "ANSI31", 1.0, 0.0)
            .unwrap();
        assert_eq!(definition.boundaries.len(), 2);
        assert!(definition.associative);

        assert!(engine
            .definition_from_entities(&doc, &[EntityId(999)], "ANSI31", 1.0, 0.0)
            .unwrap_err()
            .is_not_found());
    }
}
