//! 实体标识和管理
//!
//! 标识由文档内的分配器生成，不使用进程级全局计数器。
//! 实体、标注与注释共享同一个标识空间。

use crate::geometry::Shape;
use crate::layer::LayerId;
use crate::math::BoundingBox2;
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 实体唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 空ID（尚未加入文档）
    pub const NULL: EntityId = EntityId(0);

    /// 从指定值创建（用于文件加载）
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// 检查是否为空ID
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 单调递增的标识分配器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// 分配下一个标识
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// 确保后续分配不会与已存在的标识冲突
    pub fn reserve_past(&mut self, id: u64) {
        if id >= self.next {
            self.next = id + 1;
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// CAD实体
///
/// 一个实体包含几何数据和样式。`layer` 是弱引用，
/// 指向不存在的图层时读取方按默认图层处理。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// 唯一标识符
    pub id: EntityId,

    /// 几何类型和数据
    pub shape: Shape,

    /// 所属图层ID
    pub layer: LayerId,

    /// 是否可见
    pub visible: bool,

    /// 是否锁定（不可拾取、不可编辑）
    pub locked: bool,

    /// 视觉样式
    pub style: Style,
}

impl Entity {
    /// 创建新实体，ID 在加入文档时分配
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            id: EntityId::NULL,
            shape: shape.into(),
            layer: LayerId::DEFAULT,
            visible: true,
            locked: false,
            style: Style::default(),
        }
    }

    /// 获取包围盒
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        self.shape.bounding_box()
    }

    /// 使用指定的图层
    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    /// 使用指定的样式
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// 设置可见性
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// 设置锁定状态
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// 是否参与拾取
    pub fn is_pickable(&self) -> bool {
        self.visible && !self.locked
    }
}
