//! 尺寸标注与注释
//!
//! 标注的 `text` 是缓存的派生数据，始终可以从几何重新计算，
//! 只由关联标注引擎写回。

use crate::entity::EntityId;
use crate::layer::LayerId;
use crate::math::{BoundingBox2, Point2, Vector2, EPSILON};
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// 标注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// 线性标注 - 水平或垂直
    #[default]
    Linear,
    /// 对齐标注
    Aligned,
    /// 角度标注
    Angular,
    /// 半径标注
    Radial,
    /// 直径标注
    Diametral,
}

impl DimensionKind {
    /// 按标注类型格式化显示文本
    pub fn format_value(&self, value: f64) -> String {
        match self {
            DimensionKind::Linear | DimensionKind::Aligned => format!("{:.2}", value),
            DimensionKind::Angular => format!("{:.1}°", value),
            DimensionKind::Radial => format!("R{:.2}", value),
            // %%C 是 CAD 中直径符号的转义
            DimensionKind::Diametral => format!("%%C{:.2}", value),
        }
    }
}

/// 从显示文本中解析数值
///
/// 跳过前缀符号（如 `R`、`%%C`），读取最长的数值前缀；解析失败返回 0。
pub fn parse_leading_value(text: &str) -> f64 {
    let bytes = text.as_bytes();
    let start = (0..bytes.len()).find(|&i| {
        let c = bytes[i];
        let next_is_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        c.is_ascii_digit() || ((c == b'-' || c == b'+' || c == b'.') && next_is_digit)
    });
    let Some(start) = start else {
        return 0.0;
    };

    let mut end = start;
    let mut seen_dot = false;
    for (offset, c) in text[start..].char_indices() {
        let ok = match c {
            '0'..='9' => true,
            '-' | '+' => offset == 0,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end = start + offset + c.len_utf8();
    }

    text[start..end].parse().unwrap_or(0.0)
}

/// 尺寸标注
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: EntityId,
    pub kind: DimensionKind,
    /// 第一个测量点（半径/直径标注为圆心）
    pub point1: Point2,
    /// 第二个测量点（半径/直径标注为圆上一点）
    pub point2: Point2,
    /// 标注线到测量点的偏移距离
    pub offset: f64,
    /// 缓存的显示文本
    pub text: String,
    pub text_height: f64,
    pub layer: LayerId,
    pub visible: bool,
    pub locked: bool,
    pub style: Style,
}

impl Dimension {
    pub fn new(kind: DimensionKind, point1: Point2, point2: Point2, offset: f64) -> Self {
        let mut dim = Self {
            id: EntityId::NULL,
            kind,
            point1,
            point2,
            offset,
            text: String::new(),
            text_height: 2.5,
            layer: LayerId::DEFAULT,
            visible: true,
            locked: false,
            style: Style::default(),
        };
        if let Some(value) = dim.geometric_value() {
            dim.text = kind.format_value(value);
        }
        dim
    }

    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.layer = layer;
        self
    }

    /// 由自身测量点计算的值；角度标注需要关联的直线，返回 `None`
    pub fn geometric_value(&self) -> Option<f64> {
        let delta = self.point2 - self.point1;
        match self.kind {
            DimensionKind::Linear => Some(delta.x.abs().max(delta.y.abs())),
            DimensionKind::Aligned | DimensionKind::Radial => Some(delta.norm()),
            DimensionKind::Diametral => Some(delta.norm() * 2.0),
            DimensionKind::Angular => None,
        }
    }

    /// 当前缓存文本对应的数值
    pub fn displayed_value(&self) -> f64 {
        parse_leading_value(&self.text)
    }

    /// 包围盒（测量点与偏移后的标注线）
    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::new(self.point1, self.point2);
        let delta = self.point2 - self.point1;
        if delta.norm() > EPSILON {
            let normal = Vector2::new(-delta.y, delta.x).normalize() * self.offset;
            bbox.expand_to_include(&(self.point1 + normal));
            bbox.expand_to_include(&(self.point2 + normal));
        }
        bbox
    }
}

/// 注释类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// 自由文本
    Note,
    /// 引线（从箭头到文本）
    Leader { vertices: Vec<Point2> },
}

/// 注释
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: EntityId,
    pub kind: AnnotationKind,
    pub position: Point2,
    pub content: String,
    pub text_height: f64,
    pub layer: LayerId,
    pub visible: bool,
    pub style: Style,
}

impl Annotation {
    /// 创建自由文本注释
    pub fn note(position: Point2, content: impl Into<String>) -> Self {
        Self {
            id: EntityId::NULL,
            kind: AnnotationKind::Note,
            position,
            content: content.into(),
            text_height: 2.5,
            layer: LayerId::DEFAULT,
            visible: true,
            style: Style::default(),
        }
    }

    /// 创建引线注释，文本位于最后一个顶点
    pub fn leader(vertices: Vec<Point2>, content: impl Into<String>) -> Self {
        let position = vertices.last().copied().unwrap_or_else(Point2::origin);
        Self {
            kind: AnnotationKind::Leader { vertices },
            ..Self::note(position, content)
        }
    }

    /// 引线箭头位置
    pub fn arrow_point(&self) -> Option<Point2> {
        match &self.kind {
            AnnotationKind::Leader { vertices } => vertices.first().copied(),
            AnnotationKind::Note => None,
        }
    }
}
