//! 块库
//!
//! 标准库在创建时写入，之后只读；用户库可自由增删。

use super::{BlockAttribute, BlockDefinition, BlockEntity, BlockId, LibraryId};
use crate::error::{DraftError, DraftResult};
use crate::geometry::{Arc, Circle, Line, Polyline, Rectangle, Text};
use crate::math::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// 块库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockLibrary {
    pub id: LibraryId,
    pub name: String,
    pub description: String,
    pub read_only: bool,
    definitions: Vec<BlockDefinition>,
}

impl BlockLibrary {
    pub fn new(id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            read_only: false,
            definitions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn definitions(&self) -> &[BlockDefinition] {
        &self.definitions
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub(super) fn get_mut(&mut self, id: BlockId) -> Option<&mut BlockDefinition> {
        self.definitions.iter_mut().find(|d| d.id == id)
    }

    /// 按名称查找（区分大小写）
    pub fn find_by_name(&self, name: &str) -> Option<&BlockDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 写入定义，不检查只读标志；名称在库内唯一
    pub(super) fn insert(&mut self, definition: BlockDefinition) -> DraftResult<BlockId> {
        if self.find_by_name(&definition.name).is_some() {
            return Err(DraftError::DuplicateName(definition.name));
        }
        let id = definition.id;
        self.definitions.push(definition);
        Ok(id)
    }

    pub(super) fn remove(&mut self, id: BlockId) -> Option<BlockDefinition> {
        let index = self.definitions.iter().position(|d| d.id == id)?;
        Some(self.definitions.remove(index))
    }
}

const STANDARD_AUTHOR: &str = "ZDraft";

/// 标准符号（单位：毫米），ID 由调用方分配
pub(super) fn standard_definitions() -> Vec<BlockDefinition> {
    vec![door(), window(), north_arrow(), title_mark(), grid_bubble()]
}

fn door() -> BlockDefinition {
    BlockDefinition::new("DOOR", Point2::origin())
        .with_description("Single swing door, 900 leaf")
        .with_category("Architecture")
        .with_tags(["door", "opening"])
        .with_author(STANDARD_AUTHOR)
        .with_entity(BlockEntity::new(Line::new(Point2::origin(), Point2::new(0.0, 900.0))))
        .with_entity(BlockEntity::new(Arc::new(Point2::origin(), 900.0, 0.0, FRAC_PI_2)))
        .with_attribute(
            BlockAttribute::new("DOOR_NO", "D1", Point2::new(450.0, -150.0))
                .with_prompt("Door number"),
        )
}

fn window() -> BlockDefinition {
    BlockDefinition::new("WINDOW", Point2::origin())
        .with_description("Window in wall, 1200 wide")
        .with_category("Architecture")
        .with_tags(["window", "opening"])
        .with_author(STANDARD_AUTHOR)
        .with_entity(BlockEntity::new(Rectangle::new(Point2::origin(), 1200.0, 100.0)))
        .with_entity(BlockEntity::new(Line::new(Point2::new(0.0, 50.0), Point2::new(1200.0, 50.0))))
        .with_attribute(
            BlockAttribute::new("WINDOW_NO", "W1", Point2::new(600.0, 200.0))
                .with_prompt("Window number"),
        )
}

fn north_arrow() -> BlockDefinition {
    BlockDefinition::new("NORTH_ARROW", Point2::origin())
        .with_description("North arrow")
        .with_category("Annotation")
        .with_tags(["north", "symbol"])
        .with_author(STANDARD_AUTHOR)
        .with_entity(BlockEntity::new(Circle::new(Point2::origin(), 10.0)))
        .with_entity(BlockEntity::new(Polyline::new(
            [
                Point2::new(0.0, 10.0),
                Point2::new(-4.0, -6.0),
                Point2::new(0.0, -2.0),
                Point2::new(4.0, -6.0),
            ],
            true,
        )))
        .with_entity(BlockEntity::new(Text::new(Point2::new(-1.5, 12.0), "N", 5.0)))
}

fn title_mark() -> BlockDefinition {
    BlockDefinition::new("TITLE_MARK", Point2::origin())
        .with_description("Drawing title mark with number and sheet reference")
        .with_category("Annotation")
        .with_tags(["title", "symbol"])
        .with_author(STANDARD_AUTHOR)
        .with_entity(BlockEntity::new(Circle::new(Point2::origin(), 8.0)))
        .with_entity(BlockEntity::new(Line::new(Point2::new(-8.0, 0.0), Point2::new(60.0, 0.0))))
        .with_attribute(
            BlockAttribute::new("NUMBER", "1", Point2::new(-1.5, 2.0)).with_prompt("Detail number"),
        )
        .with_attribute(
            BlockAttribute::new("SHEET", "A-101", Point2::new(-5.0, -6.0))
                .with_prompt("Sheet")
                .with_height(3.0),
        )
}

fn grid_bubble() -> BlockDefinition {
    BlockDefinition::new("GRID_BUBBLE", Point2::new(0.0, -50.0))
        .with_description("Structural column grid bubble")
        .with_category("Structure")
        .with_tags(["grid", "column", "symbol"])
        .with_author(STANDARD_AUTHOR)
        .with_entity(BlockEntity::new(Circle::new(Point2::origin(), 5.0)))
        .with_entity(BlockEntity::new(Line::new(Point2::new(0.0, -5.0), Point2::new(0.0, -50.0))))
        .with_attribute(BlockAttribute::new("GRID", "A", Point2::new(-1.5, -2.0)).with_height(4.0))
}
