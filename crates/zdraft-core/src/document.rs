//! CAD文档数据模型
//!
//! 实体、标注、注释分别存放在以ID为键的存储中，记录之间只通过ID相互引用。
//! ID 单调分配，因此遍历顺序即创建顺序。更新按整条记录覆盖（后写者胜）。

use crate::dimension::{Annotation, Dimension};
use crate::entity::{Entity, EntityId, IdAllocator};
use crate::error::{DraftError, DraftResult};
use crate::layer::{Layer, LayerId, LayerManager};
use crate::listener::{ListenerId, ListenerRegistry, ListenerResult};
use crate::math::BoundingBox2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 文档变更通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    EntityAdded(EntityId),
    EntityUpdated(EntityId),
    EntityDeleted(EntityId),
    DimensionAdded(EntityId),
    DimensionUpdated(EntityId),
    /// 仅缓存文本变化（关联标注引擎写回）
    DimensionTextChanged(EntityId),
    DimensionDeleted(EntityId),
    AnnotationAdded(EntityId),
    AnnotationUpdated(EntityId),
    AnnotationDeleted(EntityId),
    LayerDeleted(LayerId),
}

impl DocumentChange {
    /// 是否可能改变实体几何（需要重新核对关联标注）
    pub fn affects_geometry(&self) -> bool {
        matches!(
            self,
            DocumentChange::EntityAdded(_)
                | DocumentChange::EntityUpdated(_)
                | DocumentChange::EntityDeleted(_)
                | DocumentChange::DimensionDeleted(_)
        )
    }
}

/// 绘制顺序中的一项
#[derive(Debug, Clone, Copy)]
pub enum PaintItem<'a> {
    Entity(&'a Entity),
    Dimension(&'a Dimension),
    Annotation(&'a Annotation),
}

impl PaintItem<'_> {
    pub fn id(&self) -> EntityId {
        match self {
            PaintItem::Entity(e) => e.id,
            PaintItem::Dimension(d) => d.id,
            PaintItem::Annotation(a) => a.id,
        }
    }
}

/// 拥有ID的记录
pub trait Record {
    type Id: Ord + Copy;

    fn record_id(&self) -> Self::Id;
}

impl Record for Entity {
    type Id = EntityId;

    fn record_id(&self) -> EntityId {
        self.id
    }
}

impl Record for Dimension {
    type Id = EntityId;

    fn record_id(&self) -> EntityId {
        self.id
    }
}

impl Record for Annotation {
    type Id = EntityId;

    fn record_id(&self) -> EntityId {
        self.id
    }
}

/// 以记录列表形式序列化存储，ID 保存在记录内部
pub(crate) mod records {
    use super::Record;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S, K, T>(map: &BTreeMap<K, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BTreeMap<T::Id, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Record,
    {
        let list = Vec::<T>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|r| (r.record_id(), r)).collect())
    }
}

/// CAD文档
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// 所有实体
    #[serde(with = "records")]
    entities: BTreeMap<EntityId, Entity>,

    /// 所有尺寸标注
    #[serde(with = "records")]
    dimensions: BTreeMap<EntityId, Dimension>,

    /// 所有注释
    #[serde(with = "records")]
    annotations: BTreeMap<EntityId, Annotation>,

    /// 图层管理器
    pub layers: LayerManager,

    /// ID 分配器
    ids: IdAllocator,

    /// 变更监听器
    #[serde(skip)]
    listeners: ListenerRegistry<DocumentChange>,

    /// 是否已修改
    #[serde(skip)]
    modified: bool,
}

impl Document {
    /// 创建新文档
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配新的记录ID
    pub fn allocate_id(&mut self) -> EntityId {
        EntityId(self.ids.allocate())
    }

    /// 为新记录确定ID：空ID或与现有记录冲突时重新分配
    fn claim_id(&mut self, requested: EntityId) -> EntityId {
        if requested.is_null() || self.contains(requested) {
            self.allocate_id()
        } else {
            self.ids.reserve_past(requested.0);
            requested
        }
    }

    /// 任一存储中是否存在该ID
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
            || self.dimensions.contains_key(&id)
            || self.annotations.contains_key(&id)
    }

    /// 注册变更监听器
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&DocumentChange) -> ListenerResult + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// 取消变更监听
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn notify(&mut self, change: DocumentChange) {
        self.modified = true;
        self.listeners.notify(&change);
    }

    // ========== 实体 ==========

    /// 添加实体，返回分配的ID
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = self.claim_id(entity.id);
        entity.id = id;
        debug!(%id, kind = entity.shape.type_name(), "entity added");
        self.entities.insert(id, entity);
        self.notify(DocumentChange::EntityAdded(id));
        id
    }

    /// 获取实体
    pub fn entity_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// 获取实体，不存在时返回错误
    pub fn require_entity(&self, id: EntityId) -> DraftResult<&Entity> {
        self.entities.get(&id).ok_or(DraftError::EntityNotFound(id))
    }

    /// 整条替换实体记录（ID 保持不变）
    pub fn update_entity(&mut self, id: EntityId, mut entity: Entity) -> DraftResult<()> {
        let slot = self
            .entities
            .get_mut(&id)
            .ok_or(DraftError::EntityNotFound(id))?;
        entity.id = id;
        *slot = entity;
        self.notify(DocumentChange::EntityUpdated(id));
        Ok(())
    }

    /// 就地修改实体
    pub fn modify_entity(&mut self, id: EntityId, f: impl FnOnce(&mut Entity)) -> DraftResult<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(DraftError::EntityNotFound(id))?;
        f(entity);
        entity.id = id;
        self.notify(DocumentChange::EntityUpdated(id));
        Ok(())
    }

    /// 删除实体
    pub fn delete_entity(&mut self, id: EntityId) -> DraftResult<Entity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(DraftError::EntityNotFound(id))?;
        self.notify(DocumentChange::EntityDeleted(id));
        Ok(entity)
    }

    /// 所有实体（创建顺序）
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// 实体数量
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// 所有位于可见图层上的可见实体
    pub fn all_entities_on_visible_layers(&self) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.visible && self.layers.resolve(e.layer).visible)
            .collect()
    }

    /// 实体所在图层；引用不存在时视为默认图层
    pub fn layer_of(&self, entity: &Entity) -> &Layer {
        self.layers.resolve(entity.layer)
    }

    // ========== 尺寸标注 ==========

    /// 添加尺寸标注
    pub fn add_dimension(&mut self, mut dimension: Dimension) -> EntityId {
        let id = self.claim_id(dimension.id);
        dimension.id = id;
        self.dimensions.insert(id, dimension);
        self.notify(DocumentChange::DimensionAdded(id));
        id
    }

    /// 获取尺寸标注
    pub fn dimension_by_id(&self, id: EntityId) -> Option<&Dimension> {
        self.dimensions.get(&id)
    }

    /// 获取尺寸标注，不存在时返回错误
    pub fn require_dimension(&self, id: EntityId) -> DraftResult<&Dimension> {
        self.dimensions
            .get(&id)
            .ok_or(DraftError::DimensionNotFound(id))
    }

    /// 整条替换尺寸标注记录
    pub fn update_dimension(&mut self, id: EntityId, mut dimension: Dimension) -> DraftResult<()> {
        let slot = self
            .dimensions
            .get_mut(&id)
            .ok_or(DraftError::DimensionNotFound(id))?;
        dimension.id = id;
        *slot = dimension;
        self.notify(DocumentChange::DimensionUpdated(id));
        Ok(())
    }

    /// 写回标注的缓存文本，返回旧文本
    pub fn set_dimension_text(&mut self, id: EntityId, text: String) -> DraftResult<String> {
        let dimension = self
            .dimensions
            .get_mut(&id)
            .ok_or(DraftError::DimensionNotFound(id))?;
        let old = std::mem::replace(&mut dimension.text, text);
        self.notify(DocumentChange::DimensionTextChanged(id));
        Ok(old)
    }

    /// 删除尺寸标注
    pub fn delete_dimension(&mut self, id: EntityId) -> DraftResult<Dimension> {
        let dimension = self
            .dimensions
            .remove(&id)
            .ok_or(DraftError::DimensionNotFound(id))?;
        self.notify(DocumentChange::DimensionDeleted(id));
        Ok(dimension)
    }

    /// 所有尺寸标注（创建顺序）
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.values()
    }

    // ========== 注释 ==========

    /// 添加注释
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> EntityId {
        let id = self.claim_id(annotation.id);
        annotation.id = id;
        self.annotations.insert(id, annotation);
        self.notify(DocumentChange::AnnotationAdded(id));
        id
    }

    /// 获取注释
    pub fn annotation_by_id(&self, id: EntityId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// 整条替换注释记录
    pub fn update_annotation(
        &mut self,
        id: EntityId,
        mut annotation: Annotation,
    ) -> DraftResult<()> {
        let slot = self
            .annotations
            .get_mut(&id)
            .ok_or(DraftError::AnnotationNotFound(id))?;
        annotation.id = id;
        *slot = annotation;
        self.notify(DocumentChange::AnnotationUpdated(id));
        Ok(())
    }

    /// 删除注释
    pub fn delete_annotation(&mut self, id: EntityId) -> DraftResult<Annotation> {
        let annotation = self
            .annotations
            .remove(&id)
            .ok_or(DraftError::AnnotationNotFound(id))?;
        self.notify(DocumentChange::AnnotationDeleted(id));
        Ok(annotation)
    }

    /// 所有注释（创建顺序）
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    // ========== 图层 ==========

    /// 删除图层；其上的记录保留，读取时回退到默认图层
    pub fn delete_layer(&mut self, id: LayerId) -> DraftResult<Layer> {
        let layer = self.layers.delete_layer(id)?;
        self.notify(DocumentChange::LayerDeleted(id));
        Ok(layer)
    }

    /// 绘制顺序：按图层 `order` 升序，图层内依次为实体、标注、注释。
    /// 只包含可见图层上的可见记录。
    pub fn paint_order(&self) -> Vec<PaintItem<'_>> {
        let mut items = Vec::new();
        for layer in self.layers.sorted_by_order() {
            if !layer.visible {
                continue;
            }
            let on_layer = |layer_ref: LayerId| self.layers.resolve(layer_ref).id == layer.id;

            items.extend(
                self.entities
                    .values()
                    .filter(|e| e.visible && on_layer(e.layer))
                    .map(PaintItem::Entity),
            );
            items.extend(
                self.dimensions
                    .values()
                    .filter(|d| d.visible && on_layer(d.layer))
                    .map(PaintItem::Dimension),
            );
            items.extend(
                self.annotations
                    .values()
                    .filter(|a| a.visible && on_layer(a.layer))
                    .map(PaintItem::Annotation),
            );
        }
        items
    }

    /// 所有实体的总包围盒
    pub fn bounds(&self) -> Option<BoundingBox2> {
        BoundingBox2::union_all(self.entities.values().map(|e| e.bounding_box()))
    }

    /// 是否已修改
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 标记为已保存
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }
}
