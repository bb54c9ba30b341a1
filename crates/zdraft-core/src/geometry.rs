//! 几何图元定义
//!
//! 支持的基本图元：
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//! - 椭圆 (Ellipse)
//! - 矩形 (Rectangle)
//! - 多段线 (Polyline)
//! - 样条曲线 (Spline)
//! - 文本 (Text)
//!
//! 每种图元提供包围盒、参考点（拾取排序用）与到轮廓的距离。
//! 空几何（如零顶点多段线）没有包围盒和参考点。

use crate::math::{
    distance_to_polyline, point_in_polygon, rotate_vector, BoundingBox2, Point2, Vector2, EPSILON,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// 文本宽度估算系数：宽度 ≈ 字符数 × 字高 × 系数
pub const DEFAULT_TEXT_WIDTH_FACTOR: f64 = 0.6;

/// 椭圆轮廓距离计算时的采样段数
const ELLIPSE_SAMPLES: usize = 72;

/// 几何类型枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    Rectangle(Rectangle),
    Polyline(Polyline),
    Spline(Spline),
    Text(Text),
}

macro_rules! impl_from_shape {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(value: $variant) -> Self {
                    Shape::$variant(value)
                }
            }
        )*
    };
}

impl_from_shape!(Line, Circle, Arc, Ellipse, Rectangle, Polyline, Spline, Text);

impl Shape {
    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Line(_) => "Line",
            Shape::Circle(_) => "Circle",
            Shape::Arc(_) => "Arc",
            Shape::Ellipse(_) => "Ellipse",
            Shape::Rectangle(_) => "Rectangle",
            Shape::Polyline(_) => "Polyline",
            Shape::Spline(_) => "Spline",
            Shape::Text(_) => "Text",
        }
    }

    /// 获取几何的包围盒（文本按默认宽度系数估算）
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        self.bounds(DEFAULT_TEXT_WIDTH_FACTOR)
    }

    /// 获取几何的包围盒
    ///
    /// 圆、圆弧、椭圆统一取圆心 ± 半径；矩形取 position..position+size，
    /// 不考虑旋转。
    pub fn bounds(&self, text_width_factor: f64) -> Option<BoundingBox2> {
        match self {
            Shape::Line(l) => Some(l.bounding_box()),
            Shape::Circle(c) => Some(square_around(c.center, c.radius)),
            Shape::Arc(a) => Some(square_around(a.center, a.radius)),
            Shape::Ellipse(e) => Some(square_around(e.center, e.major_radius.max(e.minor_radius))),
            Shape::Rectangle(r) => Some(r.bounding_box()),
            Shape::Polyline(pl) => BoundingBox2::from_points(pl.points.iter().copied()),
            Shape::Spline(s) => BoundingBox2::from_points(s.points.iter().copied()),
            Shape::Text(t) => Some(t.bounding_box(text_width_factor)),
        }
    }

    /// 参考点：拾取时按探测点到参考点的距离排序
    pub fn reference_point(&self) -> Option<Point2> {
        match self {
            Shape::Line(l) => Some(l.midpoint()),
            Shape::Circle(c) => Some(c.center),
            Shape::Arc(a) => Some(a.center),
            Shape::Ellipse(e) => Some(e.center),
            Shape::Rectangle(r) => Some(r.center()),
            Shape::Polyline(pl) => pl.points.first().copied(),
            Shape::Spline(s) => s.points.first().copied(),
            Shape::Text(t) => Some(t.position),
        }
    }

    /// 点到几何轮廓的距离，空几何返回 `None`
    pub fn distance_to_outline(&self, point: &Point2, text_width_factor: f64) -> Option<f64> {
        match self {
            Shape::Line(l) => Some(l.distance_to_point(point)),
            Shape::Circle(c) => Some(c.distance_to_point(point).abs()),
            Shape::Arc(a) => Some(a.distance_to_point(point)),
            Shape::Ellipse(e) => Some(e.distance_to_point(point)),
            Shape::Rectangle(r) => distance_to_polyline(point, &r.corners(), true),
            Shape::Polyline(pl) => distance_to_polyline(point, &pl.points, pl.closed),
            Shape::Spline(s) => distance_to_polyline(point, &s.points, s.closed),
            Shape::Text(t) => {
                let bbox = t.bounding_box(text_width_factor);
                if bbox.contains(point) {
                    Some(0.0)
                } else {
                    distance_to_polyline(point, &bbox.corners(), true)
                }
            }
        }
    }

    /// 检查点是否在几何上（考虑容差）
    ///
    /// 闭合几何（圆、椭圆、矩形、闭合多段线/样条）内部的点同样视为命中。
    pub fn contains_point(
        &self,
        point: &Point2,
        tolerance: f64,
        text_width_factor: f64,
    ) -> bool {
        let near_outline = self
            .distance_to_outline(point, text_width_factor)
            .is_some_and(|d| d <= tolerance);
        if near_outline {
            return true;
        }
        match self {
            Shape::Circle(c) => c.contains(point),
            Shape::Ellipse(e) => e.encloses(point),
            Shape::Rectangle(r) => r.contains(point),
            Shape::Polyline(pl) if pl.closed => point_in_polygon(point, &pl.points),
            Shape::Spline(s) if s.closed => point_in_polygon(point, &s.points),
            _ => false,
        }
    }

    /// 是否为闭合几何
    pub fn is_closed(&self) -> bool {
        match self {
            Shape::Circle(_) | Shape::Ellipse(_) | Shape::Rectangle(_) => true,
            Shape::Polyline(pl) => pl.closed,
            Shape::Spline(s) => s.closed,
            Shape::Line(_) | Shape::Arc(_) | Shape::Text(_) => false,
        }
    }
}

fn square_around(center: Point2, radius: f64) -> BoundingBox2 {
    BoundingBox2::new(
        Point2::new(center.x - radius, center.y - radius),
        Point2::new(center.x + radius, center.y + radius),
    )
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 方向角 atan2(Δy, Δx)，范围 (-π, π]
    pub fn angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point2 {
        Point2::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        crate::math::Segment2::new(self.start, self.end).distance_to_point(point)
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.start, self.end)
    }
}

/// 圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// 计算面积
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    /// 计算点到圆的距离（负值表示在圆内）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        (point - self.center).norm() - self.radius
    }

    /// 点是否在圆内（含边界）
    pub fn contains(&self, point: &Point2) -> bool {
        (point - self.center).norm() <= self.radius
    }
}

/// 圆弧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度），逆时针
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 获取起点
    pub fn start_point(&self) -> Point2 {
        self.center + Vector2::new(self.start_angle.cos(), self.start_angle.sin()) * self.radius
    }

    /// 获取终点
    pub fn end_point(&self) -> Point2 {
        self.center + Vector2::new(self.end_angle.cos(), self.end_angle.sin()) * self.radius
    }

    /// 检查角度是否在弧的范围内
    fn contains_angle(&self, angle: f64) -> bool {
        let a = angle.rem_euclid(TAU);
        let start = self.start_angle.rem_euclid(TAU);
        let end = self.end_angle.rem_euclid(TAU);

        if start <= end {
            a >= start && a <= end
        } else {
            a >= start || a <= end
        }
    }

    /// 计算点到圆弧的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        let angle = (point.y - self.center.y).atan2(point.x - self.center.x);

        if self.contains_angle(angle) {
            ((point - self.center).norm() - self.radius).abs()
        } else {
            let d1 = (point - self.start_point()).norm();
            let d2 = (point - self.end_point()).norm();
            d1.min(d2)
        }
    }
}

/// 椭圆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2,
    pub major_radius: f64,
    pub minor_radius: f64,
    /// 长轴方向（弧度）
    pub rotation: f64,
}

impl Ellipse {
    pub fn new(center: Point2, major_radius: f64, minor_radius: f64, rotation: f64) -> Self {
        Self {
            center,
            major_radius,
            minor_radius,
            rotation,
        }
    }

    /// 参数 t 处的点
    pub fn point_at_param(&self, t: f64) -> Point2 {
        let local = Vector2::new(self.major_radius * t.cos(), self.minor_radius * t.sin());
        self.center + rotate_vector(local, self.rotation)
    }

    /// 采样轮廓点
    pub fn sample_points(&self, segments: usize) -> Vec<Point2> {
        (0..segments)
            .map(|i| self.point_at_param(TAU * i as f64 / segments as f64))
            .collect()
    }

    /// 点到椭圆轮廓的近似距离（采样折线）
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        distance_to_polyline(point, &self.sample_points(ELLIPSE_SAMPLES), true)
            .unwrap_or(f64::MAX)
    }

    /// 点是否在椭圆内部（含边界）；退化椭圆没有内部
    pub fn encloses(&self, point: &Point2) -> bool {
        if self.major_radius <= EPSILON || self.minor_radius <= EPSILON {
            return false;
        }
        let local = rotate_vector(point - self.center, -self.rotation);
        let u = local.x / self.major_radius;
        let v = local.y / self.minor_radius;
        u * u + v * v <= 1.0
    }
}

/// 矩形
///
/// `position` 为角点，`rotation` 绕该角点旋转。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub position: Point2,
    pub width: f64,
    pub height: f64,
    /// 旋转角（弧度）
    pub rotation: f64,
}

impl Rectangle {
    pub fn new(position: Point2, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// 四个角点（考虑旋转）
    pub fn corners(&self) -> [Point2; 4] {
        let local = [
            Vector2::new(0.0, 0.0),
            Vector2::new(self.width, 0.0),
            Vector2::new(self.width, self.height),
            Vector2::new(0.0, self.height),
        ];
        local.map(|v| self.position + rotate_vector(v, self.rotation))
    }

    /// 几何中心
    pub fn center(&self) -> Point2 {
        let half = Vector2::new(self.width / 2.0, self.height / 2.0);
        self.position + rotate_vector(half, self.rotation)
    }

    /// position..position+size 的轴对齐包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(
            self.position,
            Point2::new(self.position.x + self.width, self.position.y + self.height),
        )
    }

    /// 点是否在矩形内（含边界）
    pub fn contains(&self, point: &Point2) -> bool {
        if self.rotation.abs() < EPSILON {
            return self.bounding_box().contains(point);
        }
        point_in_polygon(point, &self.corners())
    }
}

/// 多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point2>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed,
        }
    }

    /// 线段数量
    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// 计算总长度
    pub fn length(&self) -> f64 {
        let n = self.points.len();
        (0..self.segment_count())
            .map(|i| (self.points[(i + 1) % n] - self.points[i]).norm())
            .sum()
    }
}

/// 样条曲线
///
/// `points` 为拟合点，`control_points` 为可选控制点。
/// 距离计算与包围盒均基于拟合点折线。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub points: Vec<Point2>,
    pub control_points: Option<Vec<Point2>>,
    pub closed: bool,
}

impl Spline {
    pub fn new(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            points: points.into_iter().collect(),
            control_points: None,
            closed,
        }
    }

    pub fn with_control_points(mut self, control_points: Vec<Point2>) -> Self {
        self.control_points = Some(control_points);
        self
    }
}

/// 文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// 锚点（左下角）
    pub position: Point2,
    pub content: String,
    pub font_size: f64,
    /// 旋转角（弧度）
    pub rotation: f64,
}

impl Text {
    pub fn new(position: Point2, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            position,
            content: content.into(),
            font_size,
            rotation: 0.0,
        }
    }

    /// 估算文本宽度
    pub fn estimated_width(&self, width_factor: f64) -> f64 {
        self.content.chars().count() as f64 * self.font_size * width_factor
    }

    /// 锚点到锚点 + 估算尺寸
    pub fn bounding_box(&self, width_factor: f64) -> BoundingBox2 {
        BoundingBox2::new(
            self.position,
            Point2::new(
                self.position.x + self.estimated_width(width_factor),
                self.position.y + self.font_size,
            ),
        )
    }
}
