//! ZDraft 二维几何核心
//!
//! 提供文档模型、拾取、图案填充、关联尺寸标注以及块库与块实例。
//!
//! # 架构设计
//!
//! 记录按ID存放在文档的存储中，彼此之间只通过ID引用：
//! - `Entity`: 带身份的几何实体，几何本身是封闭的 `Shape` 枚举
//! - `Dimension` / `Annotation`: 标注与注释
//! - `Layer`: 可见性、样式和绘制顺序
//!
//! 各引擎都是显式创建的对象，由 [`session::DrawingSession`] 组合在一起，
//! 没有进程级的全局状态。
//!
//! # 示例
//!
//! ```rust
//! use zdraft_core::prelude::*;
//!
//! let mut session = DrawingSession::default();
//! let id = session.add_entity(Entity::new(Circle::new(Point2::origin(), 10.0)));
//!
//! let hit = session.hit_test_at_point(Point2::new(10.0, 0.0), None);
//! assert_eq!(hit.map(|h| h.entity_id), Some(id));
//! ```

pub mod associative;
pub mod block;
pub mod config;
pub mod dimension;
pub mod document;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod hatch;
pub mod layer;
pub mod listener;
pub mod math;
pub mod session;
pub mod style;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::associative::{
        AssociativeEngine, DependencyType, RelationshipType, UpdateSource,
    };
    pub use crate::block::{
        BlockAttribute, BlockDefinition, BlockEntity, BlockManager, InstanceOptions,
    };
    pub use crate::config::EngineConfig;
    pub use crate::dimension::{Annotation, Dimension, DimensionKind};
    pub use crate::document::Document;
    pub use crate::entity::{Entity, EntityId};
    pub use crate::error::{DraftError, DraftResult};
    pub use crate::geometry::{Arc, Circle, Ellipse, Line, Polyline, Rectangle, Shape, Spline, Text};
    pub use crate::hatch::{HatchBoundary, HatchDefinition, HatchEngine};
    pub use crate::hit_test::{Hit, HitTester};
    pub use crate::layer::{Layer, LayerId};
    pub use crate::math::{BoundingBox2, Point2, Segment2, Vector2};
    pub use crate::session::DrawingSession;
    pub use crate::style::{Color, Style};
    pub use crate::transform::Placement;
}
