//! 块定义与块实例
//!
//! 块定义是一组模板几何（不带实体身份），以插入基点为原点；块实例只保存
//! 定义ID与放置参数。炸开实例时按“缩放 → 旋转 → 平移”生成独立实体。
//!
//! 炸开后实例仍保留在注册表中，标记 `exploded = true`，不再参与实时几何。

mod library;
mod search;

pub use library::BlockLibrary;
pub use search::{SearchCriteria, SortBy};

use crate::document::{records, Document, Record};
use crate::entity::{Entity, EntityId};
use crate::error::{DraftError, DraftResult};
use crate::geometry::{Shape, Text};
use crate::layer::LayerId;
use crate::math::{BoundingBox2, Point2};
use crate::style::Style;
use crate::transform::Placement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// 块定义ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// 块实例ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert#{}", self.0)
    }
}

/// 块库ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LibraryId(pub u64);

/// 只读标准库
pub const STANDARD_LIBRARY: LibraryId = LibraryId(1);
/// 默认用户库
pub const USER_LIBRARY: LibraryId = LibraryId(2);

/// 块中的模板几何
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntity {
    pub shape: Shape,
    pub style: Style,
    pub layer: LayerId,
    pub visible: bool,
}

impl BlockEntity {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            style: Style::by_layer(),
            layer: LayerId::DEFAULT,
            visible: true,
        }
    }

    /// 从文档实体复制几何与样式，丢弃身份
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            shape: entity.shape.clone(),
            style: entity.style.clone(),
            layer: entity.layer,
            visible: entity.visible,
        }
    }
}

/// 块属性（可编辑的文本字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAttribute {
    pub tag: String,
    pub prompt: String,
    pub default_value: String,
    /// 块坐标中的位置
    pub position: Point2,
    pub text_height: f64,
    pub visible: bool,
    /// 常量属性不可在实例上修改
    pub constant: bool,
}

impl BlockAttribute {
    pub fn new(tag: impl Into<String>, default_value: impl Into<String>, position: Point2) -> Self {
        let tag = tag.into();
        Self {
            prompt: tag.clone(),
            tag,
            default_value: default_value.into(),
            position,
            text_height: 2.5,
            visible: true,
            constant: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.text_height = height;
        self
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// 块定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub id: BlockId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub entities: Vec<BlockEntity>,
    /// 插入基点（块坐标）
    pub insertion_point: Point2,
    /// 模板几何的包围盒缓存
    pub bounding_box: Option<BoundingBox2>,
    pub attributes: Vec<BlockAttribute>,
    pub version: u32,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub usage_count: u64,
}

impl BlockDefinition {
    pub fn new(name: impl Into<String>, insertion_point: Point2) -> Self {
        let now = Utc::now();
        Self {
            id: BlockId(0),
            name: name.into(),
            description: String::new(),
            category: "General".to_string(),
            tags: Vec::new(),
            entities: Vec::new(),
            insertion_point,
            bounding_box: None,
            attributes: Vec::new(),
            version: 1,
            author: String::new(),
            created_at: now,
            modified_at: now,
            usage_count: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_entity(mut self, entity: BlockEntity) -> Self {
        self.entities.push(entity);
        self.refresh_bounds();
        self
    }

    pub fn with_attribute(mut self, attribute: BlockAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, tag: &str) -> Option<&BlockAttribute> {
        self.attributes.iter().find(|a| a.tag == tag)
    }

    /// 重新计算包围盒缓存
    pub fn refresh_bounds(&mut self) {
        self.bounding_box =
            BoundingBox2::union_all(self.entities.iter().map(|e| e.shape.bounding_box()));
    }
}

/// 放置参数与初始属性
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOptions {
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub layer: LayerId,
    pub attributes: BTreeMap<String, String>,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            layer: LayerId::DEFAULT,
            attributes: BTreeMap::new(),
        }
    }
}

impl InstanceOptions {
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn with_uniform_scale(self, scale: f64) -> Self {
        self.with_scale(scale, scale)
    }

    /// 旋转（弧度）
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_attribute(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(tag.into(), value.into());
        self
    }
}

/// 块实例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: InstanceId,
    pub block_definition_id: BlockId,
    pub insertion_point: Point2,
    pub scale_x: f64,
    pub scale_y: f64,
    /// 旋转角度（弧度）
    pub rotation: f64,
    pub attributes: BTreeMap<String, String>,
    pub layer: LayerId,
    pub visible: bool,
    pub locked: bool,
    pub exploded: bool,
}

impl BlockInstance {
    /// 相对于给定定义的放置变换
    pub fn placement(&self, definition: &BlockDefinition) -> Placement {
        Placement {
            base_point: definition.insertion_point,
            insertion_point: self.insertion_point,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            rotation: self.rotation,
        }
    }
}

impl Record for BlockInstance {
    type Id = InstanceId;

    fn record_id(&self) -> InstanceId {
        self.id
    }
}

/// 块管理器：块库与实例注册表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockManager {
    libraries: Vec<BlockLibrary>,
    #[serde(with = "records")]
    instances: BTreeMap<InstanceId, BlockInstance>,
    next_block: u64,
    next_instance: u64,
    next_library: u64,
}

impl BlockManager {
    /// 创建管理器，载入标准库并建立空的用户库
    pub fn new() -> Self {
        let mut manager = Self {
            libraries: Vec::new(),
            instances: BTreeMap::new(),
            next_block: 0,
            next_instance: 0,
            next_library: USER_LIBRARY.0,
        };

        let mut standard =
            BlockLibrary::new(STANDARD_LIBRARY, "Standard").with_description("Built-in symbols");
        for mut definition in library::standard_definitions() {
            definition.id = manager.allocate_block_id();
            let inserted = standard.insert(definition);
            debug_assert!(inserted.is_ok(), "standard block names collide: {inserted:?}");
        }
        standard.read_only = true;
        manager.libraries.push(standard);
        manager.libraries.push(BlockLibrary::new(USER_LIBRARY, "User"));
        manager
    }

    fn allocate_block_id(&mut self) -> BlockId {
        self.next_block += 1;
        BlockId(self.next_block)
    }

    // ========== 块库 ==========

    /// 新建可编辑的块库
    pub fn create_library(&mut self, name: impl Into<String>) -> LibraryId {
        self.next_library += 1;
        let id = LibraryId(self.next_library);
        self.libraries.push(BlockLibrary::new(id, name));
        id
    }

    pub fn library(&self, id: LibraryId) -> Option<&BlockLibrary> {
        self.libraries.iter().find(|l| l.id == id)
    }

    pub fn libraries(&self) -> &[BlockLibrary] {
        &self.libraries
    }

    fn writable_library(&mut self, id: LibraryId) -> DraftResult<&mut BlockLibrary> {
        let library = self
            .libraries
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DraftError::LibraryNotFound(id))?;
        if library.read_only {
            return Err(DraftError::ReadOnlyLibrary(library.name.clone()));
        }
        Ok(library)
    }

    // ========== 块定义 ==========

    /// 所有定义，按库顺序
    pub fn definitions(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.libraries.iter().flat_map(|l| l.definitions().iter())
    }

    pub fn definition(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.libraries.iter().find_map(|l| l.get(id))
    }

    pub fn require_definition(&self, id: BlockId) -> DraftResult<&BlockDefinition> {
        self.definition(id).ok_or(DraftError::DefinitionNotFound(id))
    }

    fn definition_mut(&mut self, id: BlockId) -> Option<&mut BlockDefinition> {
        self.libraries.iter_mut().find_map(|l| l.get_mut(id))
    }

    /// 按名称查找，可编辑库优先于只读库
    pub fn definition_by_name(&self, name: &str) -> Option<&BlockDefinition> {
        let writable = self.libraries.iter().filter(|l| !l.read_only);
        let read_only = self.libraries.iter().filter(|l| l.read_only);
        writable.chain(read_only).find_map(|l| l.find_by_name(name))
    }

    /// 由模板几何创建定义
    pub fn create_block_definition(
        &mut self,
        library: LibraryId,
        name: impl Into<String>,
        entities: Vec<BlockEntity>,
        insertion_point: Point2,
        attributes: Vec<BlockAttribute>,
    ) -> DraftResult<BlockId> {
        let mut definition = BlockDefinition::new(name, insertion_point);
        definition.entities = entities;
        definition.attributes = attributes;
        self.add_block_definition(library, definition)
    }

    /// 加入定义：分配新ID并重新计算包围盒；只读库拒绝写入
    pub fn add_block_definition(
        &mut self,
        library: LibraryId,
        mut definition: BlockDefinition,
    ) -> DraftResult<BlockId> {
        self.writable_library(library)?;
        definition.id = self.allocate_block_id();
        definition.refresh_bounds();
        let name = definition.name.clone();
        let id = self.writable_library(library)?.insert(definition)?;
        info!(%id, name = %name, "block definition added");
        Ok(id)
    }

    /// 删除定义；只读库或仍有未炸开实例引用时拒绝
    pub fn remove_block_definition(&mut self, id: BlockId) -> DraftResult<BlockDefinition> {
        let library_id = self
            .libraries
            .iter()
            .find(|l| l.contains(id))
            .map(|l| l.id)
            .ok_or(DraftError::DefinitionNotFound(id))?;
        let in_use = self
            .instances
            .values()
            .filter(|i| !i.exploded && i.block_definition_id == id)
            .count();
        if in_use > 0 {
            return Err(DraftError::InvalidState(format!(
                "{id} is referenced by {in_use} instance(s)"
            )));
        }
        self.writable_library(library_id)?
            .remove(id)
            .ok_or(DraftError::DefinitionNotFound(id))
    }

    /// 由文档中选中的实体创建用户块，实体坐标相对 `base_point`
    pub fn create_custom_block(
        &mut self,
        document: &Document,
        name: impl Into<String>,
        entity_ids: &[EntityId],
        base_point: Point2,
    ) -> DraftResult<BlockId> {
        if entity_ids.is_empty() {
            return Err(DraftError::InvalidState("custom block needs at least one entity".into()));
        }
        let entities = entity_ids
            .iter()
            .map(|id| document.require_entity(*id).map(BlockEntity::from_entity))
            .collect::<DraftResult<Vec<_>>>()?;
        let mut definition = BlockDefinition::new(name, base_point).with_category("Custom");
        definition.entities = entities;
        self.add_block_definition(USER_LIBRARY, definition)
    }

    /// 检索定义
    pub fn search_blocks(&self, criteria: &SearchCriteria) -> Vec<&BlockDefinition> {
        criteria.apply(self.definitions())
    }

    // ========== 块实例 ==========

    /// 创建实例；未显式给出的属性取定义中的默认值
    pub fn create_block_instance(
        &mut self,
        definition_id: BlockId,
        insertion_point: Point2,
        options: InstanceOptions,
    ) -> DraftResult<InstanceId> {
        let definition = self.require_definition(definition_id)?;
        let mut attributes = options.attributes;
        for attribute in &definition.attributes {
            attributes
                .entry(attribute.tag.clone())
                .or_insert_with(|| attribute.default_value.clone());
        }

        self.next_instance += 1;
        let id = InstanceId(self.next_instance);
        self.instances.insert(
            id,
            BlockInstance {
                id,
                block_definition_id: definition_id,
                insertion_point,
                scale_x: options.scale_x,
                scale_y: options.scale_y,
                rotation: options.rotation,
                attributes,
                layer: options.layer,
                visible: true,
                locked: false,
                exploded: false,
            },
        );
        if let Some(definition) = self.definition_mut(definition_id) {
            definition.usage_count += 1;
        }
        debug!(%id, block = %definition_id, "block instance created");
        Ok(id)
    }

    /// 按名称插入块
    pub fn insert_block(
        &mut self,
        name: &str,
        insertion_point: Point2,
        options: InstanceOptions,
    ) -> DraftResult<InstanceId> {
        let definition_id = self
            .definition_by_name(name)
            .map(|d| d.id)
            .ok_or_else(|| DraftError::BlockNotFound(name.to_string()))?;
        self.create_block_instance(definition_id, insertion_point, options)
    }

    pub fn instance(&self, id: InstanceId) -> Option<&BlockInstance> {
        self.instances.get(&id)
    }

    pub fn require_instance(&self, id: InstanceId) -> DraftResult<&BlockInstance> {
        self.instances.get(&id).ok_or(DraftError::InstanceNotFound(id))
    }

    /// 所有实例（含已炸开）
    pub fn instances(&self) -> impl Iterator<Item = &BlockInstance> {
        self.instances.values()
    }

    /// 未炸开的实例
    pub fn active_instances(&self) -> impl Iterator<Item = &BlockInstance> {
        self.instances.values().filter(|i| !i.exploded)
    }

    pub fn delete_block_instance(&mut self, id: InstanceId) -> DraftResult<BlockInstance> {
        self.instances.remove(&id).ok_or(DraftError::InstanceNotFound(id))
    }

    /// 修改实例属性值；标记须在定义中存在且不是常量
    pub fn set_instance_attribute(
        &mut self,
        id: InstanceId,
        tag: &str,
        value: impl Into<String>,
    ) -> DraftResult<()> {
        let instance = self.require_instance(id)?;
        let definition = self.require_definition(instance.block_definition_id)?;
        match definition.attribute(tag) {
            None => {
                return Err(DraftError::InvalidState(format!(
                    "{} has no attribute {tag}",
                    definition.name
                )))
            }
            Some(attribute) if attribute.constant => {
                return Err(DraftError::InvalidState(format!("attribute {tag} is constant")))
            }
            Some(_) => {}
        }
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.attributes.insert(tag.to_string(), value.into());
        }
        Ok(())
    }

    /// 实例在世界坐标中的包围盒
    pub fn instance_bounds(&self, id: InstanceId) -> DraftResult<Option<BoundingBox2>> {
        let instance = self.require_instance(id)?;
        let definition = self.require_definition(instance.block_definition_id)?;
        let placement = instance.placement(definition);
        Ok(BoundingBox2::union_all(
            definition
                .entities
                .iter()
                .map(|e| placement.apply(&e.shape).bounding_box()),
        ))
    }

    /// 炸开实例：生成独立实体加入文档，可见属性转为文本
    ///
    /// 新实体使用实例的图层。实例保留在注册表中并标记为已炸开，
    /// 再次炸开返回 `InvalidState`。
    pub fn explode_block_instance(
        &mut self,
        document: &mut Document,
        id: InstanceId,
    ) -> DraftResult<Vec<Entity>> {
        let instance = self.require_instance(id)?;
        if instance.exploded {
            return Err(DraftError::InvalidState(format!("{id} is already exploded")));
        }
        let definition = self.require_definition(instance.block_definition_id)?;
        let placement = instance.placement(definition);

        let mut pieces: Vec<Entity> = definition
            .entities
            .iter()
            .map(|template| {
                Entity::new(placement.apply(&template.shape))
                    .with_layer(instance.layer)
                    .with_style(template.style.clone())
                    .with_visible(template.visible)
            })
            .collect();

        for attribute in definition.attributes.iter().filter(|a| a.visible) {
            let value = instance
                .attributes
                .get(&attribute.tag)
                .unwrap_or(&attribute.default_value);
            if value.is_empty() {
                continue;
            }
            let text = Text {
                position: placement.transform_point(&attribute.position),
                content: value.clone(),
                font_size: attribute.text_height * placement.scale_y.abs(),
                rotation: placement.rotation,
            };
            pieces.push(Entity::new(text).with_layer(instance.layer));
        }

        let mut created = Vec::with_capacity(pieces.len());
        for mut entity in pieces {
            entity.id = document.add_entity(entity.clone());
            created.push(entity);
        }

        if let Some(instance) = self.instances.get_mut(&id) {
            instance.exploded = true;
        }
        info!(%id, entities = created.len(), "block instance exploded");
        Ok(created)
    }
}

impl Default for BlockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line};
    use std::f64::consts::FRAC_PI_2;

    fn circle_block(manager: &mut BlockManager) -> BlockId {
        manager
            .create_block_definition(
                USER_LIBRARY,
                "HOLE",
                vec![BlockEntity::new(Circle::new(Point2::origin(), 5.0))],
                Point2::origin(),
                vec![BlockAttribute::new("SIZE", "M10", Point2::new(0.0, -8.0))],
            )
            .unwrap()
    }

    #[test]
    fn test_standard_library_is_read_only() {
        let mut manager = BlockManager::new();
        assert!(manager.definition_by_name("DOOR").is_some());
        let err = manager
            .create_block_definition(
                STANDARD_LIBRARY,
                "X",
                Vec::new(),
                Point2::origin(),
                Vec::new(),
            )
            .unwrap_err();
        assert_eq!(err, DraftError::ReadOnlyLibrary("Standard".into()));

        let door = manager.definition_by_name("DOOR").unwrap().id;
        assert!(matches!(
            manager.remove_block_definition(door),
            Err(DraftError::ReadOnlyLibrary(_))
        ));
    }

    #[test]
    fn test_every_standard_symbol_is_seeded() {
        let manager = BlockManager::new();
        let standard = manager.library(STANDARD_LIBRARY).unwrap();
        assert_eq!(standard.len(), library::standard_definitions().len());
        assert!(standard.read_only);
    }

    #[test]
    fn test_unknown_definition_rejected() {
        let mut manager = BlockManager::new();
        assert_eq!(
            manager.create_block_instance(
                BlockId(999),
                Point2::origin(),
                InstanceOptions::default()
            ),
            Err(DraftError::DefinitionNotFound(BlockId(999)))
        );
        assert!(manager
            .insert_block("NO_SUCH_BLOCK", Point2::origin(), InstanceOptions::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_attributes_default_from_definition() {
        let mut manager = BlockManager::new();
        let block = circle_block(&mut manager);
        let plain = manager
            .create_block_instance(block, Point2::origin(), InstanceOptions::default())
            .unwrap();
        let options = InstanceOptions::default().with_attribute("SIZE", "M12");
        let custom = manager
            .create_block_instance(block, Point2::origin(), options)
            .unwrap();
        assert_eq!(manager.instance(plain).unwrap().attributes["SIZE"], "M10");
        assert_eq!(manager.instance(custom).unwrap().attributes["SIZE"], "M12");
        assert_eq!(manager.definition(block).unwrap().usage_count, 2);

        manager.set_instance_attribute(plain, "SIZE", "M8").unwrap();
        assert_eq!(manager.instance(plain).unwrap().attributes["SIZE"], "M8");
        assert!(manager.set_instance_attribute(plain, "COLOR", "red").is_err());
    }

    #[test]
    fn test_explode_transforms_and_keeps_instance() {
        let mut manager = BlockManager::new();
        let mut doc = Document::new();
        let block = circle_block(&mut manager);
        let layer = doc.layers.create_layer("Symbols").unwrap();
        let id = manager
            .create_block_instance(
                block,
                Point2::new(100.0, 100.0),
                InstanceOptions::default().with_uniform_scale(2.0).with_layer(layer),
            )
            .unwrap();

        let entities = manager.explode_block_instance(&mut doc, id).unwrap();
        // 圆 + 属性文本
        assert_eq!(entities.len(), 2);
        match &entities[0].shape {
            Shape::Circle(c) => {
                assert!((c.center - Point2::new(100.0, 100.0)).norm() < 1e-9);
                assert!((c.radius - 10.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(entities.iter().all(|e| e.layer == layer));
        assert!(entities.iter().all(|e| doc.entity_by_id(e.id).is_some()));

        let instance = manager.instance(id).unwrap();
        assert!(instance.exploded);
        assert_eq!(manager.active_instances().count(), 0);
        assert!(matches!(
            manager.explode_block_instance(&mut doc, id),
            Err(DraftError::InvalidState(_))
        ));
    }

    #[test]
    fn test_custom_block_is_relative_to_base_point() {
        let mut manager = BlockManager::new();
        let mut doc = Document::new();
        let bar = Line::new(Point2::new(10.0, 10.0), Point2::new(20.0, 10.0));
        let line = doc.add_entity(Entity::new(bar));
        let block = manager
            .create_custom_block(&doc, "BAR", &[line], Point2::new(10.0, 10.0))
            .unwrap();
        let options = InstanceOptions::default().with_rotation(FRAC_PI_2);
        let instance = manager
            .create_block_instance(block, Point2::origin(), options)
            .unwrap();

        let bounds = manager.instance_bounds(instance).unwrap().unwrap();
        assert!((bounds.min.x - 0.0).abs() < 1e-9 && (bounds.max.x - 0.0).abs() < 1e-9);
        assert!((bounds.min.y - 0.0).abs() < 1e-9 && (bounds.max.y - 10.0).abs() < 1e-9);

        assert!(matches!(
            manager.create_custom_block(&doc, "BAR", &[line], Point2::origin()),
            Err(DraftError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_definition_in_use_cannot_be_removed() {
        let mut manager = BlockManager::new();
        let block = circle_block(&mut manager);
        let id = manager
            .create_block_instance(block, Point2::origin(), InstanceOptions::default())
            .unwrap();
        assert!(matches!(
            manager.remove_block_definition(block),
            Err(DraftError::InvalidState(_))
        ));
        manager.delete_block_instance(id).unwrap();
        assert_eq!(manager.remove_block_definition(block).unwrap().name, "HOLE");
    }

    #[test]
    fn test_search_filters_and_sorts() {
        let mut manager = BlockManager::new();
        circle_block(&mut manager);
        let door = manager.definition_by_name("DOOR").unwrap().id;
        manager
            .create_block_instance(door, Point2::origin(), InstanceOptions::default())
            .unwrap();

        let openings = manager.search_blocks(&SearchCriteria {
            tags: vec!["Opening".into()],
            sort_by: Some(SortBy::Name),
            ..Default::default()
        });
        let names: Vec<&str> = openings.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["DOOR", "WINDOW"]);

        let by_usage = manager.search_blocks(&SearchCriteria {
            sort_by: Some(SortBy::Usage),
            limit: Some(1),
            ..Default::default()
        });
        assert_eq!(by_usage[0].name, "DOOR");

        let with_size = manager.search_blocks(&SearchCriteria {
            attribute_tags: vec!["SIZE".into()],
            ..Default::default()
        });
        assert_eq!(with_size.len(), 1);

        let arrows = manager.search_blocks(&SearchCriteria::text("north"));
        assert_eq!(arrows.len(), 1);
        assert!(manager
            .search_blocks(&SearchCriteria {
                category: Some("Structure".into()),
                has_attributes: Some(false),
                ..Default::default()
            })
            .is_empty());
    }
}
