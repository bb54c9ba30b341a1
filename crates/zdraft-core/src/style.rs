//! 视觉样式定义
//!
//! 包含描边颜色、线宽、线型与可选填充。取值 `ByLayer` 表示渲染时
//! 跟随所属图层，核心引擎不做解析。

use serde::{Deserialize, Serialize};

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制值创建（如 0xFF0000 表示红色）
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    pub const RED: Color = Color::new(255, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(128, 128, 128);

    /// 颜色跟随图层（ByLayer）
    pub const BY_LAYER: Color = Color::with_alpha(0, 0, 0, 0);

    pub fn is_by_layer(&self) -> bool {
        self.a == 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BY_LAYER
    }
}

/// 描边线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StrokePattern {
    /// 实线
    Solid,
    /// 虚线
    Dashed,
    /// 点线
    Dotted,
    /// 点划线
    DashDot,
    /// 中心线
    Center,
    /// 跟随图层
    #[default]
    ByLayer,
}

impl StrokePattern {
    /// 线型的重复单元（正数画线，负数空白，单位为线宽倍数）
    pub fn dash_array(&self) -> &'static [f64] {
        match self {
            StrokePattern::Solid | StrokePattern::ByLayer => &[],
            StrokePattern::Dashed => &[12.0, -6.0],
            StrokePattern::Dotted => &[0.0, -6.0],
            StrokePattern::DashDot => &[12.0, -6.0, 0.0, -6.0],
            StrokePattern::Center => &[32.0, -6.0, 6.0, -6.0],
        }
    }
}

/// 线宽
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LineWeight {
    /// 跟随图层
    #[default]
    ByLayer,
    /// 指定线宽（毫米）
    Width(f64),
}

/// 填充
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub color: Color,
    /// 不透明度 0.0~1.0
    pub opacity: f64,
}

impl Fill {
    pub fn new(color: Color, opacity: f64) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}

/// 实体的视觉样式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Style {
    /// 描边颜色
    pub stroke_color: Color,
    /// 描边线宽
    pub stroke_width: LineWeight,
    /// 描边线型
    pub stroke_pattern: StrokePattern,
    /// 可选填充
    pub fill: Option<Fill>,
}

impl Style {
    /// 完全跟随图层的样式
    pub fn by_layer() -> Self {
        Self::default()
    }

    /// 图层的默认样式：白色实线
    pub fn layer_default() -> Self {
        Self {
            stroke_color: Color::WHITE,
            stroke_width: LineWeight::Width(0.25),
            stroke_pattern: StrokePattern::Solid,
            fill: None,
        }
    }

    /// 创建带有指定颜色的样式
    pub fn with_color(color: Color) -> Self {
        Self {
            stroke_color: color,
            ..Default::default()
        }
    }

    pub fn set_pattern(mut self, pattern: StrokePattern) -> Self {
        self.stroke_pattern = pattern;
        self
    }

    pub fn set_width(mut self, width_mm: f64) -> Self {
        self.stroke_width = LineWeight::Width(width_mm);
        self
    }

    pub fn set_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    /// 是否有任何字段需要从图层解析
    pub fn is_by_layer(&self) -> bool {
        self.stroke_color.is_by_layer()
            || self.stroke_width == LineWeight::ByLayer
            || self.stroke_pattern == StrokePattern::ByLayer
    }
}
