//! 关联尺寸标注
//!
//! 关联关系把一个标注绑定到若干实体上，几何变化超过容差时重新测量并写回
//! 标注文本。标注之间还可以建立依赖：父标注更新时，按依赖类型换算后的值
//! 递归写入子标注。
//!
//! 更新期间设置 `updating` 标志，此时到达的更新请求直接丢弃而不排队。
//! 依赖图在建立时拒绝成环。

use crate::config::DimensionConfig;
use crate::dimension::parse_leading_value;
use crate::document::{Document, DocumentChange};
use crate::entity::EntityId;
use crate::error::{DraftError, DraftResult};
use crate::geometry::Shape;
use crate::listener::{ListenerId, ListenerRegistry, ListenerResult};
use crate::math::Point2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::{PI, TAU};
use std::fmt;
use tracing::{debug, info, warn};

/// 关联关系ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub u64);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel#{}", self.0)
    }
}

/// 测量方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Linear,
    Angular,
    Radial,
    Diametral,
}

/// 标注与实体的关联
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociativeRelationship {
    pub id: RelationshipId,
    pub dimension_id: EntityId,
    pub entity_ids: Vec<EntityId>,
    pub relationship_type: RelationshipType,
    /// 显式测量点（线性测量时优先使用前两个）
    pub measurement_points: Option<Vec<Point2>>,
    pub auto_update: bool,
    pub tolerance: f64,
    /// 上次写回时的测量值
    pub last_value: f64,
}

/// 依赖的取值换算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// 原值传递
    Direct,
    /// 计算值（目前固定为两倍）
    Calculated,
    /// 约束驱动，原值传递
    Constraint,
}

impl DependencyType {
    pub fn derive_value(&self, value: f64) -> f64 {
        match self {
            DependencyType::Direct | DependencyType::Constraint => value,
            DependencyType::Calculated => value * 2.0,
        }
    }
}

/// 标注之间的依赖边：父标注 → 子标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDependency {
    pub parent: EntityId,
    pub children: Vec<EntityId>,
    pub dependency_type: DependencyType,
}

/// 更新来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    User,
    Constraint,
    Calculation,
}

/// 每个被更新的标注产生一条事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionUpdateEvent {
    pub dimension_id: EntityId,
    pub old_value: f64,
    pub new_value: f64,
    pub affected_entities: Vec<EntityId>,
    pub timestamp: DateTime<Utc>,
    pub source: UpdateSource,
}

/// 关联标注引擎
#[derive(Debug, Clone, Default)]
pub struct AssociativeEngine {
    config: DimensionConfig,
    relationships: BTreeMap<RelationshipId, AssociativeRelationship>,
    dependencies: Vec<DimensionDependency>,
    next_id: u64,
    updating: bool,
    listeners: ListenerRegistry<DimensionUpdateEvent>,
}

impl AssociativeEngine {
    pub fn new(config: DimensionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// 是否正在执行更新
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&DimensionUpdateEvent) -> ListenerResult + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ========== 关联关系 ==========

    /// 建立关联关系，并记录初始测量值
    pub fn create_associative_relationship(
        &mut self,
        document: &Document,
        dimension_id: EntityId,
        entity_ids: &[EntityId],
        relationship_type: RelationshipType,
        measurement_points: Option<Vec<Point2>>,
    ) -> DraftResult<RelationshipId> {
        document.require_dimension(dimension_id)?;
        for id in entity_ids {
            document.require_entity(*id)?;
        }

        self.next_id += 1;
        let id = RelationshipId(self.next_id);
        let mut relationship = AssociativeRelationship {
            id,
            dimension_id,
            entity_ids: entity_ids.to_vec(),
            relationship_type,
            measurement_points,
            auto_update: self.config.auto_update,
            tolerance: self.config.tolerance,
            last_value: 0.0,
        };
        relationship.last_value = measure_relationship(document, &relationship)?;
        info!(
            %id,
            dimension = %dimension_id,
            value = relationship.last_value,
            "associative relationship created"
        );
        self.relationships.insert(id, relationship);
        Ok(id)
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&AssociativeRelationship> {
        self.relationships.get(&id)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &AssociativeRelationship> {
        self.relationships.values()
    }

    pub fn remove_relationship(
        &mut self,
        id: RelationshipId,
    ) -> DraftResult<AssociativeRelationship> {
        self.relationships
            .remove(&id)
            .ok_or(DraftError::RelationshipNotFound(id))
    }

    pub fn relationships_for_dimension(
        &self,
        dimension_id: EntityId,
    ) -> Vec<&AssociativeRelationship> {
        self.relationships
            .values()
            .filter(|r| r.dimension_id == dimension_id)
            .collect()
    }

    pub fn relationships_for_entity(&self, entity_id: EntityId) -> Vec<&AssociativeRelationship> {
        self.relationships
            .values()
            .filter(|r| r.entity_ids.contains(&entity_id))
            .collect()
    }

    pub fn set_auto_update(&mut self, id: RelationshipId, auto_update: bool) -> DraftResult<()> {
        self.relationship_mut(id)?.auto_update = auto_update;
        Ok(())
    }

    pub fn set_tolerance(&mut self, id: RelationshipId, tolerance: f64) -> DraftResult<()> {
        self.relationship_mut(id)?.tolerance = tolerance.abs();
        Ok(())
    }

    fn relationship_mut(
        &mut self,
        id: RelationshipId,
    ) -> DraftResult<&mut AssociativeRelationship> {
        self.relationships
            .get_mut(&id)
            .ok_or(DraftError::RelationshipNotFound(id))
    }

    /// 关联关系当前的实际测量值
    pub fn measure(&self, document: &Document, id: RelationshipId) -> DraftResult<f64> {
        let relationship = self
            .relationships
            .get(&id)
            .ok_or(DraftError::RelationshipNotFound(id))?;
        measure_relationship(document, relationship)
    }

    // ========== 依赖 ==========

    /// 添加依赖边；会形成环（含自环）时拒绝
    pub fn add_dependency(
        &mut self,
        document: &Document,
        parent: EntityId,
        children: &[EntityId],
        dependency_type: DependencyType,
    ) -> DraftResult<()> {
        document.require_dimension(parent)?;
        for &child in children {
            document.require_dimension(child)?;
            if child == parent || self.reaches(child, parent) {
                return Err(DraftError::DependencyCycle { parent, child });
            }
        }
        debug!(%parent, children = children.len(), ?dependency_type, "dimension dependency added");
        self.dependencies.push(DimensionDependency {
            parent,
            children: children.to_vec(),
            dependency_type,
        });
        Ok(())
    }

    /// 删除一条父子依赖，返回是否存在
    pub fn remove_dependency(&mut self, parent: EntityId, child: EntityId) -> bool {
        let mut removed = false;
        for dep in self.dependencies.iter_mut().filter(|d| d.parent == parent) {
            let before = dep.children.len();
            dep.children.retain(|c| *c != child);
            removed |= dep.children.len() != before;
        }
        self.dependencies.retain(|d| !d.children.is_empty());
        removed
    }

    pub fn dependencies(&self) -> &[DimensionDependency] {
        &self.dependencies
    }

    /// 依赖图中 `from` 是否可达 `to`
    fn reaches(&self, from: EntityId, to: EntityId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            for dep in self.dependencies.iter().filter(|d| d.parent == node) {
                stack.extend(dep.children.iter().copied());
            }
        }
        false
    }

    // ========== 更新 ==========

    /// 把新值写入标注并沿依赖传播，返回每个被更新标注的事件
    ///
    /// 正在更新时调用会被丢弃并返回空列表。
    pub fn update_dimension(
        &mut self,
        document: &mut Document,
        dimension_id: EntityId,
        new_value: f64,
        source: UpdateSource,
    ) -> DraftResult<Vec<DimensionUpdateEvent>> {
        if self.updating {
            debug!(dimension = %dimension_id, "update dropped while another update is running");
            return Ok(Vec::new());
        }
        document.require_dimension(dimension_id)?;

        self.updating = true;
        let mut events = Vec::new();
        let result = self.apply_update(
            document,
            dimension_id,
            new_value,
            source,
            &mut BTreeSet::new(),
            &mut events,
        );
        self.updating = false;
        self.publish(&events);
        result?;
        Ok(events)
    }

    /// 重新测量所有自动更新的关联关系，偏差超过容差的写回标注
    ///
    /// 测量值与上次写回值一致时不产生事件，因此重复调用是幂等的。
    pub fn reconcile(&mut self, document: &mut Document) -> DraftResult<Vec<DimensionUpdateEvent>> {
        if self.updating {
            debug!("reconciliation dropped while another update is running");
            return Ok(Vec::new());
        }

        let stale: Vec<RelationshipId> = self
            .relationships
            .values()
            .filter(|r| document.dimension_by_id(r.dimension_id).is_none())
            .map(|r| r.id)
            .collect();
        for id in stale {
            if let Some(relationship) = self.relationships.remove(&id) {
                warn!(
                    relationship = %id,
                    dimension = %relationship.dimension_id,
                    "dimension missing, relationship dropped"
                );
            }
        }

        let pending: Vec<(RelationshipId, EntityId, f64)> = self
            .relationships
            .values()
            .filter(|r| r.auto_update)
            .filter_map(|r| match measure_relationship(document, r) {
                Ok(live) if (live - r.last_value).abs() > r.tolerance => {
                    Some((r.id, r.dimension_id, live))
                }
                Ok(_) => None,
                Err(err) => {
                    warn!(
                        relationship = %r.id,
                        error = %err,
                        "relationship skipped during reconciliation"
                    );
                    None
                }
            })
            .collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        self.updating = true;
        let mut events = Vec::new();
        for (id, dimension_id, live) in pending {
            let result = self.apply_update(
                document,
                dimension_id,
                live,
                UpdateSource::Constraint,
                &mut BTreeSet::new(),
                &mut events,
            );
            match result {
                Ok(()) => {
                    if let Some(relationship) = self.relationships.get_mut(&id) {
                        relationship.last_value = live;
                    }
                }
                Err(err) => {
                    warn!(relationship = %id, error = %err, "reconciliation step failed");
                }
            }
        }
        self.updating = false;

        debug!(updated = events.len(), "associative dimensions reconciled");
        self.publish(&events);
        Ok(events)
    }

    /// 响应文档变更
    ///
    /// 删除实体或标注时移除失效的关联与依赖；几何变化时自动核对。
    pub fn handle_document_change(
        &mut self,
        document: &mut Document,
        change: &DocumentChange,
    ) -> DraftResult<Vec<DimensionUpdateEvent>> {
        if self.updating {
            debug!(?change, "document change ignored while updating");
            return Ok(Vec::new());
        }
        match *change {
            DocumentChange::EntityDeleted(id) => {
                let before = self.relationships.len();
                self.relationships.retain(|_, r| !r.entity_ids.contains(&id));
                let removed = before - self.relationships.len();
                if removed > 0 {
                    info!(entity = %id, removed, "relationships bound to deleted entity removed");
                }
            }
            DocumentChange::DimensionDeleted(id) => {
                self.relationships.retain(|_, r| r.dimension_id != id);
                self.dependencies.retain(|d| d.parent != id);
                for dep in &mut self.dependencies {
                    dep.children.retain(|c| *c != id);
                }
                self.dependencies.retain(|d| !d.children.is_empty());
            }
            _ => {}
        }
        if change.affects_geometry() {
            self.reconcile(document)
        } else {
            Ok(Vec::new())
        }
    }

    fn apply_update(
        &mut self,
        document: &mut Document,
        dimension_id: EntityId,
        value: f64,
        source: UpdateSource,
        visited: &mut BTreeSet<EntityId>,
        events: &mut Vec<DimensionUpdateEvent>,
    ) -> DraftResult<()> {
        if !visited.insert(dimension_id) {
            return Ok(());
        }
        let dimension = document.require_dimension(dimension_id)?;
        let old_value = parse_leading_value(&dimension.text);
        let text = dimension.kind.format_value(value);
        document.set_dimension_text(dimension_id, text)?;

        let mut affected: Vec<EntityId> = self
            .relationships
            .values()
            .filter(|r| r.dimension_id == dimension_id)
            .flat_map(|r| r.entity_ids.iter().copied())
            .collect();
        affected.sort();
        affected.dedup();

        events.push(DimensionUpdateEvent {
            dimension_id,
            old_value,
            new_value: value,
            affected_entities: affected,
            timestamp: Utc::now(),
            source,
        });

        let children: Vec<(EntityId, f64)> = self
            .dependencies
            .iter()
            .filter(|d| d.parent == dimension_id)
            .flat_map(|d| {
                d.children
                    .iter()
                    .map(move |c| (*c, d.dependency_type.derive_value(value)))
            })
            .collect();
        for (child, child_value) in children {
            if document.dimension_by_id(child).is_none() {
                warn!(parent = %dimension_id, %child, "dependent dimension missing, skipped");
                continue;
            }
            self.apply_update(
                document,
                child,
                child_value,
                UpdateSource::Calculation,
                visited,
                events,
            )?;
        }
        Ok(())
    }

    fn publish(&mut self, events: &[DimensionUpdateEvent]) {
        for event in events {
            self.listeners.notify(event);
        }
    }
}

/// 按关联类型测量
fn measure_relationship(
    document: &Document,
    relationship: &AssociativeRelationship,
) -> DraftResult<f64> {
    let shapes = relationship
        .entity_ids
        .iter()
        .map(|id| document.require_entity(*id).map(|e| &e.shape))
        .collect::<DraftResult<Vec<&Shape>>>()?;

    let value = match relationship.relationship_type {
        RelationshipType::Linear => {
            linear_measure(relationship.measurement_points.as_deref(), &shapes)
        }
        RelationshipType::Angular => angular_measure(&shapes),
        RelationshipType::Radial => first_radius(&shapes),
        RelationshipType::Diametral => first_radius(&shapes) * 2.0,
    };
    Ok(value)
}

fn linear_measure(points: Option<&[Point2]>, shapes: &[&Shape]) -> f64 {
    if let Some([a, b, ..]) = points {
        return (b - a).norm();
    }
    if let [Shape::Line(line)] = shapes {
        return line.length();
    }
    let first = shapes.first().map_or_else(Point2::origin, |s| measure_anchor(s));
    let second = shapes.get(1).map_or_else(Point2::origin, |s| measure_anchor(s));
    (second - first).norm()
}

/// 线性测量的锚点：圆心、直线中点、矩形定位点，其余取原点
fn measure_anchor(shape: &Shape) -> Point2 {
    match shape {
        Shape::Circle(c) => c.center,
        Shape::Line(l) => l.midpoint(),
        Shape::Rectangle(r) => r.position,
        _ => Point2::origin(),
    }
}

/// 两条直线方向角之差，归一化到 [0°, 180°]
fn angular_measure(shapes: &[&Shape]) -> f64 {
    let [Shape::Line(a), Shape::Line(b)] = shapes else {
        return 0.0;
    };
    let mut diff = (a.angle() - b.angle()).abs();
    if diff > PI {
        diff = TAU - diff;
    }
    diff.to_degrees()
}

fn first_radius(shapes: &[&Shape]) -> f64 {
    shapes
        .iter()
        .find_map(|s| match s {
            Shape::Circle(c) => Some(c.radius),
            _ => None,
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{Dimension, DimensionKind};
    use crate::entity::Entity;
    use crate::geometry::{Circle, Line};
    use std::sync::{Arc, Mutex};

    fn linear_dimension(doc: &mut Document) -> EntityId {
        doc.add_dimension(Dimension::new(
            DimensionKind::Linear,
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            5.0,
        ))
    }

    #[test]
    fn test_missing_ids_are_rejected() {
        let mut doc = Document::new();
        let dim = linear_dimension(&mut doc);
        let mut engine = AssociativeEngine::default();

        let err = engine
            .create_associative_relationship(
                &doc,
                dim,
                &[EntityId(77)],
                RelationshipType::Linear,
                None,
            )
            .unwrap_err();
        assert_eq!(err, DraftError::EntityNotFound(EntityId(77)));

        let line = doc.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(1.0, 0.0))));
        let err = engine
            .create_associative_relationship(
                &doc,
                EntityId(55),
                &[line],
                RelationshipType::Linear,
                None,
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_linear_prefers_measurement_points() {
        let mut doc = Document::new();
        let dim = linear_dimension(&mut doc);
        let a = doc.add_entity(Entity::new(Circle::new(Point2::new(0.0, 0.0), 1.0)));
        let b = doc.add_entity(Entity::new(Circle::new(Point2::new(6.0, 8.0), 1.0)));
        let mut engine = AssociativeEngine::default();

        let by_centers = engine
            .create_associative_relationship(&doc, dim, &[a, b], RelationshipType::Linear, None)
            .unwrap();
        assert!((engine.relationship(by_centers).unwrap().last_value - 10.0).abs() < 1e-9);

        let by_points = engine
            .create_associative_relationship(
                &doc,
                dim,
                &[a, b],
                RelationshipType::Linear,
                Some(vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)]),
            )
            .unwrap();
        assert!((engine.relationship(by_points).unwrap().last_value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_is_reflected_into_half_turn() {
        let mut doc = Document::new();
        let dim = doc.add_dimension(Dimension::new(
            DimensionKind::Angular,
            Point2::origin(),
            Point2::origin(),
            0.0,
        ));
        // 方向角 170° 与 -170°，差 340° 反射为 20°
        let a = doc.add_entity(Entity::new(Line::new(
            Point2::origin(),
            Point2::new(170f64.to_radians().cos(), 170f64.to_radians().sin()),
        )));
        let b = doc.add_entity(Entity::new(Line::new(
            Point2::origin(),
            Point2::new((-170f64).to_radians().cos(), (-170f64).to_radians().sin()),
        )));
        let mut engine = AssociativeEngine::default();
        let id = engine
            .create_associative_relationship(&doc, dim, &[a, b], RelationshipType::Angular, None)
            .unwrap();
        assert!((engine.measure(&doc, id).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_radial_and_diametral() {
        let mut doc = Document::new();
        let dim = doc.add_dimension(Dimension::new(
            DimensionKind::Radial,
            Point2::origin(),
            Point2::new(4.0, 0.0),
            0.0,
        ));
        let line = doc.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(1.0, 0.0))));
        let circle = doc.add_entity(Entity::new(Circle::new(Point2::origin(), 4.0)));
        let mut engine = AssociativeEngine::default();

        let radial = engine
            .create_associative_relationship(
                &doc,
                dim,
                &[line, circle],
                RelationshipType::Radial,
                None,
            )
            .unwrap();
        let diametral = engine
            .create_associative_relationship(
                &doc,
                dim,
                &[circle],
                RelationshipType::Diametral,
                None,
            )
            .unwrap();
        let none = engine
            .create_associative_relationship(&doc, dim, &[line], RelationshipType::Radial, None)
            .unwrap();
        assert_eq!(engine.measure(&doc, radial).unwrap(), 4.0);
        assert_eq!(engine.measure(&doc, diametral).unwrap(), 8.0);
        assert_eq!(engine.measure(&doc, none).unwrap(), 0.0);
    }

    #[test]
    fn test_self_and_cyclic_dependencies_rejected() {
        let mut doc = Document::new();
        let a = linear_dimension(&mut doc);
        let b = linear_dimension(&mut doc);
        let c = linear_dimension(&mut doc);
        let mut engine = AssociativeEngine::default();

        assert!(matches!(
            engine.add_dependency(&doc, a, &[a], DependencyType::Direct),
            Err(DraftError::DependencyCycle { .. })
        ));
        engine.add_dependency(&doc, a, &[b], DependencyType::Direct).unwrap();
        engine.add_dependency(&doc, b, &[c], DependencyType::Direct).unwrap();
        assert_eq!(
            engine.add_dependency(&doc, c, &[a], DependencyType::Direct),
            Err(DraftError::DependencyCycle { parent: c, child: a })
        );

        assert!(engine.remove_dependency(b, c));
        assert!(engine.add_dependency(&doc, c, &[a], DependencyType::Direct).is_ok());
    }

    #[test]
    fn test_update_records_old_value_and_source() {
        let mut doc = Document::new();
        let a = linear_dimension(&mut doc);
        let b = linear_dimension(&mut doc);
        let mut engine = AssociativeEngine::default();
        engine.add_dependency(&doc, a, &[b], DependencyType::Calculated).unwrap();

        let events = engine.update_dimension(&mut doc, a, 12.5, UpdateSource::User).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].old_value, 10.0);
        assert_eq!(events[0].source, UpdateSource::User);
        assert_eq!(events[1].dimension_id, b);
        assert_eq!(events[1].new_value, 25.0);
        assert_eq!(events[1].source, UpdateSource::Calculation);
        assert_eq!(doc.dimension_by_id(b).unwrap().text, "25.00");
    }

    #[test]
    fn test_update_dropped_while_updating() {
        let mut doc = Document::new();
        let a = linear_dimension(&mut doc);
        let mut engine = AssociativeEngine::default();
        engine.updating = true;
        assert!(engine.update_dimension(&mut doc, a, 3.0, UpdateSource::User).unwrap().is_empty());
        assert_eq!(doc.dimension_by_id(a).unwrap().text, "10.00");
    }

    #[test]
    fn test_failing_listener_does_not_abort_update() {
        let mut doc = Document::new();
        let a = linear_dimension(&mut doc);
        let mut engine = AssociativeEngine::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        engine.subscribe(|_| Err("listener broke".into()));
        let sink = Arc::clone(&seen);
        engine.subscribe(move |event| {
            sink.lock().unwrap().push(event.new_value);
            Ok(())
        });

        let events = engine.update_dimension(&mut doc, a, 4.0, UpdateSource::User).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![4.0]);
        assert!(!engine.is_updating());
    }

    #[test]
    fn test_deleting_entity_drops_relationship() {
        let mut doc = Document::new();
        let dim = linear_dimension(&mut doc);
        let line = doc.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(10.0, 0.0))));
        let mut engine = AssociativeEngine::default();
        engine
            .create_associative_relationship(&doc, dim, &[line], RelationshipType::Linear, None)
            .unwrap();

        doc.delete_entity(line).unwrap();
        let events = engine
            .handle_document_change(&mut doc, &DocumentChange::EntityDeleted(line))
            .unwrap();
        assert!(events.is_empty());
        assert!(engine.relationships_for_entity(line).is_empty());
    }
}
