//! 绘图会话
//!
//! 每个打开的文档对应一个会话，会话持有文档与各个引擎的实例。
//! 文档变更经由通道收集，在每次修改后统一交给关联标注引擎处理。

use crate::associative::{
    AssociativeEngine, DependencyType, DimensionUpdateEvent, RelationshipId, RelationshipType,
    UpdateSource,
};
use crate::block::{BlockManager, InstanceId, InstanceOptions};
use crate::config::EngineConfig;
use crate::dimension::Dimension;
use crate::document::{Document, DocumentChange};
use crate::entity::{Entity, EntityId};
use crate::error::{DraftError, DraftResult};
use crate::hatch::{HatchDefinition, HatchEngine};
use crate::hit_test::{Hit, HitTester};
use crate::listener::ListenerId;
use crate::math::{Point2, Segment2};
use crossbeam::channel::{unbounded, Receiver};
use tracing::{debug, warn};

/// 绘图会话
#[derive(Debug)]
pub struct DrawingSession {
    document: Document,
    hit_tester: HitTester,
    hatch: HatchEngine,
    dimensions: AssociativeEngine,
    blocks: BlockManager,
    config: EngineConfig,
    changes: Receiver<DocumentChange>,
    change_listener: ListenerId,
}

impl DrawingSession {
    /// 以空文档创建会话
    pub fn new(config: EngineConfig) -> Self {
        Self::from_parts(Document::new(), BlockManager::new(), config)
    }

    /// 以已有文档和块库创建会话（例如从文件载入）
    pub fn from_parts(mut document: Document, blocks: BlockManager, config: EngineConfig) -> Self {
        let (sender, changes) = unbounded();
        let change_listener = document
            .subscribe(move |change: &DocumentChange| sender.send(*change).map_err(Into::into));
        Self {
            document,
            hit_tester: HitTester::new(config.hit_test.clone()),
            hatch: HatchEngine::new(config.hatch.clone()),
            dimensions: AssociativeEngine::new(config.dimension.clone()),
            blocks,
            config,
            changes,
            change_listener,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// 直接访问文档；变更在下一次 [`sync`](Self::sync) 时处理
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    pub fn hit_tester_mut(&mut self) -> &mut HitTester {
        &mut self.hit_tester
    }

    pub fn hatch(&self) -> &HatchEngine {
        &self.hatch
    }

    pub fn hatch_mut(&mut self) -> &mut HatchEngine {
        &mut self.hatch
    }

    pub fn dimensions(&self) -> &AssociativeEngine {
        &self.dimensions
    }

    pub fn dimensions_mut(&mut self) -> &mut AssociativeEngine {
        &mut self.dimensions
    }

    pub fn blocks(&self) -> &BlockManager {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockManager {
        &mut self.blocks
    }

    /// 拆分会话，返回文档与块库；会话的变更监听随之注销
    pub fn into_parts(mut self) -> (Document, BlockManager) {
        self.document.unsubscribe(self.change_listener);
        (self.document, self.blocks)
    }

    /// 处理积压的文档变更，返回由此产生的标注更新
    ///
    /// 所有变更都会被处理；若有失败，处理完毕后返回第一个错误。
    pub fn sync(&mut self) -> DraftResult<Vec<DimensionUpdateEvent>> {
        let (events, failure) = self.drain_changes();
        match failure {
            Some(err) => Err(err),
            None => Ok(events),
        }
    }

    fn drain_changes(&mut self) -> (Vec<DimensionUpdateEvent>, Option<DraftError>) {
        let mut events = Vec::new();
        let mut failure = None;
        loop {
            let batch: Vec<DocumentChange> = self.changes.try_iter().collect();
            if batch.is_empty() {
                break;
            }
            for change in &batch {
                match self.dimensions.handle_document_change(&mut self.document, change) {
                    Ok(updated) => events.extend(updated),
                    Err(err) => {
                        warn!(?change, error = %err, "document change not reconciled");
                        failure.get_or_insert(err);
                    }
                }
            }
        }
        if !events.is_empty() {
            debug!(updated = events.len(), "session synchronised");
        }
        (events, failure)
    }

    /// 修改已成功时调用；标注核对失败只记录日志
    fn settle(&mut self) -> Vec<DimensionUpdateEvent> {
        self.drain_changes().0
    }

    // ========== 文档修改 ==========

    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = self.document.add_entity(entity);
        self.settle();
        id
    }

    pub fn update_entity(
        &mut self,
        id: EntityId,
        entity: Entity,
    ) -> DraftResult<Vec<DimensionUpdateEvent>> {
        self.document.update_entity(id, entity)?;
        Ok(self.settle())
    }

    pub fn modify_entity(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Entity),
    ) -> DraftResult<Vec<DimensionUpdateEvent>> {
        self.document.modify_entity(id, f)?;
        Ok(self.settle())
    }

    pub fn delete_entity(&mut self, id: EntityId) -> DraftResult<Entity> {
        let entity = self.document.delete_entity(id)?;
        self.settle();
        Ok(entity)
    }

    pub fn delete_dimension(&mut self, id: EntityId) -> DraftResult<Dimension> {
        let dimension = self.document.delete_dimension(id)?;
        self.settle();
        Ok(dimension)
    }

    // ========== 拾取 ==========

    pub fn set_zoom(&mut self, zoom: f64) {
        self.hit_tester.set_zoom(zoom);
    }

    pub fn hit_test_at_point(&self, point: Point2, tolerance: Option<f64>) -> Option<Hit> {
        self.hit_tester.hit_test_at_point(&self.document, point, tolerance)
    }

    pub fn get_all_hits_at_point(&self, point: Point2) -> Vec<Hit> {
        self.hit_tester.get_all_hits_at_point(&self.document, point)
    }

    pub fn hit_test_in_rect(&self, top_left: Point2, bottom_right: Point2) -> Vec<Hit> {
        self.hit_tester.hit_test_in_rect(&self.document, top_left, bottom_right)
    }

    pub fn hit_test_along_line(&self, start: Point2, end: Point2) -> Vec<Hit> {
        self.hit_tester.hit_test_along_line(&self.document, start, end)
    }

    // ========== 填充 ==========

    pub fn generate_hatch(&self, definition: &HatchDefinition) -> Vec<Segment2> {
        self.hatch.generate_hatch_lines(definition)
    }

    /// 用文档中的闭合实体作为边界生成填充
    pub fn hatch_entities(
        &self,
        entity_ids: &[EntityId],
        pattern_id: &str,
        scale: f64,
        angle: f64,
    ) -> DraftResult<Vec<Segment2>> {
        self.hatch
            .generate_from_entities(&self.document, entity_ids, pattern_id, scale, angle)
    }

    // ========== 关联标注 ==========

    pub fn create_associative_relationship(
        &mut self,
        dimension_id: EntityId,
        entity_ids: &[EntityId],
        relationship_type: RelationshipType,
        measurement_points: Option<Vec<Point2>>,
    ) -> DraftResult<RelationshipId> {
        self.dimensions.create_associative_relationship(
            &self.document,
            dimension_id,
            entity_ids,
            relationship_type,
            measurement_points,
        )
    }

    pub fn add_dependency(
        &mut self,
        parent: EntityId,
        children: &[EntityId],
        dependency_type: DependencyType,
    ) -> DraftResult<()> {
        self.dimensions
            .add_dependency(&self.document, parent, children, dependency_type)
    }

    pub fn update_dimension(
        &mut self,
        dimension_id: EntityId,
        value: f64,
        source: UpdateSource,
    ) -> DraftResult<Vec<DimensionUpdateEvent>> {
        let mut events = self
            .dimensions
            .update_dimension(&mut self.document, dimension_id, value, source)?;
        events.extend(self.settle());
        Ok(events)
    }

    /// 立即核对所有自动更新的关联标注
    pub fn reconcile(&mut self) -> DraftResult<Vec<DimensionUpdateEvent>> {
        let mut events = self.sync()?;
        events.extend(self.dimensions.reconcile(&mut self.document)?);
        Ok(events)
    }

    // ========== 块 ==========

    pub fn insert_block(
        &mut self,
        name: &str,
        insertion_point: Point2,
        options: InstanceOptions,
    ) -> DraftResult<InstanceId> {
        self.blocks.insert_block(name, insertion_point, options)
    }

    pub fn explode_block_instance(&mut self, id: InstanceId) -> DraftResult<Vec<Entity>> {
        let entities = self.blocks.explode_block_instance(&mut self.document, id)?;
        self.settle();
        Ok(entities)
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DimensionKind;
    use crate::geometry::{Line, Shape};

    #[test]
    fn test_geometry_edit_reconciles_dimension() {
        let mut session = DrawingSession::default();
        let line =
            session.add_entity(Entity::new(Line::new(Point2::origin(), Point2::new(10.0, 0.0))));
        let dim = session.document_mut().add_dimension(Dimension::new(
            DimensionKind::Aligned,
            Point2::origin(),
            Point2::new(10.0, 0.0),
            5.0,
        ));
        session
            .create_associative_relationship(dim, &[line], RelationshipType::Linear, None)
            .unwrap();

        let events = session
            .modify_entity(line, |e| {
                if let Shape::Line(l) = &mut e.shape {
                    l.end = Point2::new(25.0, 0.0);
                }
            })
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(session.document().dimension_by_id(dim).unwrap().text, "25.00");
        assert!(session.reconcile().unwrap().is_empty());
    }
}
