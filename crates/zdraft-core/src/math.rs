//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名，以及无状态的几何谓词：
//! 包围盒、线段相交（逆时针方向测试）、射线法点在多边形内。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 2D变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 判断两个2D点是否近似相等
#[inline]
pub fn points_approx_eq(a: &Point2, b: &Point2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// 将向量绕原点旋转指定角度（弧度）
#[inline]
pub fn rotate_vector(v: Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// 2D包围盒
///
/// 空几何没有包围盒，相关函数统一返回 `Option<BoundingBox2>`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 创建新的包围盒，自动规范化两个角点
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// 从点集创建包围盒，点集为空时返回 `None`
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.expand_to_include(&p);
        }
        Some(bbox)
    }

    /// 扩展包围盒以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 合并两个包围盒
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// 合并一组可选包围盒，全部为空时返回 `None`
    pub fn union_all(boxes: impl IntoIterator<Item = Option<Self>>) -> Option<Self> {
        boxes
            .into_iter()
            .flatten()
            .reduce(|acc, b| acc.union(&b))
    }

    /// 各方向向外扩展
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// 检查是否与另一个包围盒相交（边界接触也算相交）
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// 检查是否包含指定点
    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// 获取中心点
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// 获取宽度
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// 获取高度
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 宽高中的较大者
    pub fn max_dimension(&self) -> f64 {
        self.width().max(self.height())
    }

    /// 四个角点（逆时针，从左下角开始）
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// 四条边
    pub fn edges(&self) -> [Segment2; 4] {
        let c = self.corners();
        [
            Segment2::new(c[0], c[1]),
            Segment2::new(c[1], c[2]),
            Segment2::new(c[2], c[3]),
            Segment2::new(c[3], c[0]),
        ]
    }
}

/// 三点方向：>0 逆时针，<0 顺时针，0 共线
#[inline]
pub fn orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// 判断共线点 `p` 是否落在 `a`-`b` 的包围范围内
#[inline]
fn on_segment(a: &Point2, b: &Point2, p: &Point2) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// 线段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment2 {
    pub start: Point2,
    pub end: Point2,
}

impl Segment2 {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point2 {
        Point2::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// 按参数 t∈[0,1] 取线段上的点
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    /// 以点列表形式返回（始终为两个点）
    pub fn points(&self) -> Vec<Point2> {
        vec![self.start, self.end]
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(self.start, self.end)
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point2) -> f64 {
        let v = self.end - self.start;
        let w = point - self.start;

        let c1 = w.dot(&v);
        if c1 <= 0.0 {
            return (point - self.start).norm();
        }

        let c2 = v.dot(&v);
        if c2 <= c1 {
            return (point - self.end).norm();
        }

        let b = c1 / c2;
        let pb = self.start + v * b;
        (point - pb).norm()
    }

    /// 两条线段是否相交（含端点接触与共线重叠）
    pub fn intersects(&self, other: &Segment2) -> bool {
        let (p1, p2, p3, p4) = (&self.start, &self.end, &other.start, &other.end);
        let d1 = orientation(p3, p4, p1);
        let d2 = orientation(p3, p4, p2);
        let d3 = orientation(p1, p2, p3);
        let d4 = orientation(p1, p2, p4);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        (d1.abs() < EPSILON && on_segment(p3, p4, p1))
            || (d2.abs() < EPSILON && on_segment(p3, p4, p2))
            || (d3.abs() < EPSILON && on_segment(p1, p2, p3))
            || (d4.abs() < EPSILON && on_segment(p1, p2, p4))
    }

    /// 计算与另一条线段的交点在本线段上的参数 t
    ///
    /// 平行或不相交时返回 `None`。
    pub fn intersection_param(&self, other: &Segment2) -> Option<f64> {
        let r = self.end - self.start;
        let s = other.end - other.start;
        let denom = r.x * s.y - r.y * s.x;
        if denom.abs() < EPSILON {
            return None;
        }
        let qp = other.start - self.start;
        let t = (qp.x * s.y - qp.y * s.x) / denom;
        let u = (qp.x * r.y - qp.y * r.x) / denom;
        if (-EPSILON..=1.0 + EPSILON).contains(&t) && (-EPSILON..=1.0 + EPSILON).contains(&u) {
            Some(t.clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// 线段是否与包围盒相交（端点在盒内或与任一边相交）
    pub fn intersects_box(&self, bbox: &BoundingBox2) -> bool {
        if bbox.contains(&self.start) || bbox.contains(&self.end) {
            return true;
        }
        bbox.edges().iter().any(|edge| self.intersects(edge))
    }
}

/// 射线法（奇偶规则）判断点是否在多边形内
///
/// 多边形按顶点顺序隐式闭合，少于三个顶点时恒为 `false`。
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// 折线到点的最小距离
pub fn distance_to_polyline(point: &Point2, vertices: &[Point2], closed: bool) -> Option<f64> {
    match vertices.len() {
        0 => None,
        1 => Some((point - vertices[0]).norm()),
        n => {
            let mut min = f64::MAX;
            let segment_count = if closed { n } else { n - 1 };
            for i in 0..segment_count {
                let seg = Segment2::new(vertices[i], vertices[(i + 1) % n]);
                min = min.min(seg.distance_to_point(point));
            }
            Some(min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox2::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(-5.0, 8.0),
        ])
        .unwrap();

        assert!(approx_eq(bbox.min.x, -5.0));
        assert!(approx_eq(bbox.min.y, 0.0));
        assert!(approx_eq(bbox.max.x, 10.0));
        assert!(approx_eq(bbox.max.y, 8.0));
        assert!(bbox.contains(&Point2::new(0.0, 4.0)));
        assert!(!bbox.contains(&Point2::new(20.0, 4.0)));
    }

    #[test]
    fn test_empty_points_have_no_bounds() {
        assert!(BoundingBox2::from_points(Vec::<Point2>::new()).is_none());
        assert!(BoundingBox2::union_all([None, None]).is_none());
    }

    #[test]
    fn test_box_intersection_separated_axis() {
        let a = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let overlapping = BoundingBox2::new(Point2::new(5.0, 5.0), Point2::new(15.0, 15.0));
        let apart_x = BoundingBox2::new(Point2::new(11.0, 0.0), Point2::new(20.0, 10.0));
        let apart_y = BoundingBox2::new(Point2::new(0.0, -9.0), Point2::new(10.0, -0.5));

        assert!(a.intersects(&overlapping));
        assert!(!a.intersects(&apart_x));
        assert!(!a.intersects(&apart_y));
    }

    #[test]
    fn test_segment_intersection() {
        let a = Segment2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = Segment2::new(Point2::new(0.0, 10.0), Point2::new(10.0, 0.0));
        let c = Segment2::new(Point2::new(20.0, 0.0), Point2::new(30.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let t = a.intersection_param(&b).unwrap();
        assert!((t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_touching_segments() {
        let a = Segment2::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0));
        let b = Segment2::new(Point2::new(5.0, 0.0), Point2::new(9.0, 0.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(&Point2::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2::new(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn test_segment_crosses_box() {
        let bbox = BoundingBox2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let crossing = Segment2::new(Point2::new(-5.0, 5.0), Point2::new(15.0, 5.0));
        let missing = Segment2::new(Point2::new(-5.0, 20.0), Point2::new(15.0, 20.0));
        assert!(crossing.intersects_box(&bbox));
        assert!(!missing.intersects_box(&bbox));
    }
}
