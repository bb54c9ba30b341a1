//! 2D变换操作
//!
//! 块参照的变换顺序固定为：相对基点缩放 → 旋转 → 平移到插入点。

use crate::geometry::{Arc, Circle, Ellipse, Line, Polyline, Rectangle, Shape, Spline, Text};
use crate::math::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 2D仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建旋转变换（绕原点）
    pub fn rotation(angle: f64) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            matrix: Matrix3::new(
                cos, -sin, 0.0,
                sin, cos, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建缩放变换（绕原点）
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                sx, 0.0, 0.0,
                0.0, sy, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// 变换一个向量（不受平移影响）
    pub fn transform_vector(&self, vector: &Vector2) -> Vector2 {
        let v = self.matrix * nalgebra::Vector3::new(vector.x, vector.y, 0.0);
        Vector2::new(v.x, v.y)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// 块参照的放置参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// 块定义的基点
    pub base_point: Point2,
    /// 插入点（世界坐标）
    pub insertion_point: Point2,
    pub scale_x: f64,
    pub scale_y: f64,
    /// 旋转角度（弧度）
    pub rotation: f64,
}

impl Placement {
    /// 组合为单一仿射矩阵：T(insertion) · R · S · T(-base)
    pub fn to_transform(&self) -> Transform2D {
        Transform2D::translation(self.insertion_point.x, self.insertion_point.y)
            .then(&Transform2D::rotation(self.rotation))
            .then(&Transform2D::scale(self.scale_x, self.scale_y))
            .then(&Transform2D::translation(-self.base_point.x, -self.base_point.y))
    }

    /// 变换点（从块坐标到世界坐标）
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        self.to_transform().transform_point(point)
    }

    /// 半径等标量的近似缩放：非均匀缩放时取较大者
    pub fn uniform_scale(&self) -> f64 {
        self.scale_x.abs().max(self.scale_y.abs())
    }

    /// 将块内几何变换到世界坐标
    ///
    /// 直线/多段线/样条逐点变换；圆变换圆心并按 `max(sx, sy)` 缩放半径；
    /// 矩形变换角点、宽高分别按 sx/sy 缩放并叠加旋转。
    pub fn apply(&self, shape: &Shape) -> Shape {
        let t = self.to_transform();
        let tp = |p: &Point2| t.transform_point(p);
        match shape {
            Shape::Line(l) => Line::new(tp(&l.start), tp(&l.end)).into(),
            Shape::Circle(c) => Circle::new(tp(&c.center), c.radius * self.uniform_scale()).into(),
            Shape::Arc(a) => Arc::new(
                tp(&a.center),
                a.radius * self.uniform_scale(),
                a.start_angle + self.rotation,
                a.end_angle + self.rotation,
            )
            .into(),
            Shape::Ellipse(e) => Ellipse::new(
                tp(&e.center),
                e.major_radius * self.scale_x.abs(),
                e.minor_radius * self.scale_y.abs(),
                e.rotation + self.rotation,
            )
            .into(),
            Shape::Rectangle(r) => Rectangle {
                position: tp(&r.position),
                width: r.width * self.scale_x,
                height: r.height * self.scale_y,
                rotation: r.rotation + self.rotation,
            }
            .into(),
            Shape::Polyline(pl) => Polyline::new(pl.points.iter().map(tp), pl.closed).into(),
            Shape::Spline(s) => Spline {
                points: s.points.iter().map(tp).collect(),
                control_points: s
                    .control_points
                    .as_ref()
                    .map(|cps| cps.iter().map(tp).collect()),
                closed: s.closed,
            }
            .into(),
            Shape::Text(txt) => Text {
                position: tp(&txt.position),
                content: txt.content.clone(),
                font_size: txt.font_size * self.scale_y.abs(),
                rotation: txt.rotation + self.rotation,
            }
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_placement_order() {
        let placement = Placement {
            base_point: Point2::origin(),
            insertion_point: Point2::new(100.0, 100.0),
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: FRAC_PI_2,
        };

        // 缩放 2x：(20, 0)；旋转 90°：(0, 20)；平移到 (100, 100)：(100, 120)
        let p = placement.transform_point(&Point2::new(10.0, 0.0));
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_point_is_subtracted() {
        let placement = Placement {
            base_point: Point2::new(5.0, 5.0),
            insertion_point: Point2::new(0.0, 0.0),
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        };
        assert_eq!(placement.transform_point(&Point2::new(5.0, 5.0)), Point2::origin());
    }

    #[test]
    fn test_non_uniform_circle_uses_max_scale() {
        let placement = Placement {
            base_point: Point2::origin(),
            insertion_point: Point2::origin(),
            scale_x: 3.0,
            scale_y: 1.0,
            rotation: 0.0,
        };
        let shape = placement.apply(&Circle::new(Point2::origin(), 2.0).into());
        match shape {
            Shape::Circle(c) => assert!((c.radius - 6.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rectangle_rotation_accumulates() {
        let placement = Placement {
            base_point: Point2::origin(),
            insertion_point: Point2::new(1.0, 1.0),
            scale_x: 2.0,
            scale_y: 3.0,
            rotation: 0.5,
        };
        let rect = Rectangle::new(Point2::origin(), 1.0, 1.0).with_rotation(0.25);
        let shape = placement.apply(&rect.into());
        match shape {
            Shape::Rectangle(r) => {
                assert_eq!(r.position, Point2::new(1.0, 1.0));
                assert!((r.width - 2.0).abs() < 1e-9);
                assert!((r.height - 3.0).abs() < 1e-9);
                assert!((r.rotation - 0.75).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
