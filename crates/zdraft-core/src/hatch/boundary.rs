//! 填充边界
//!
//! 只有闭合边界参与填充。点包含测试与拾取规则一致：
//! 圆按半径判断，矩形按角点多边形判断，多段线/样条按射线法判断。

use crate::geometry::Shape;
use crate::math::{
    point_in_polygon, rotate_vector, BoundingBox2, Point2, Segment2, Vector2, EPSILON,
};
use serde::{Deserialize, Serialize};

/// 填充边界
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HatchBoundary {
    Polyline {
        points: Vec<Point2>,
        closed: bool,
    },
    Circle {
        center: Point2,
        radius: f64,
        closed: bool,
    },
    Rectangle {
        position: Point2,
        width: f64,
        height: f64,
        rotation: f64,
        closed: bool,
    },
    Spline {
        points: Vec<Point2>,
        closed: bool,
    },
}

impl HatchBoundary {
    pub fn polygon(points: impl IntoIterator<Item = Point2>) -> Self {
        HatchBoundary::Polyline {
            points: points.into_iter().collect(),
            closed: true,
        }
    }

    pub fn circle(center: Point2, radius: f64) -> Self {
        HatchBoundary::Circle {
            center,
            radius,
            closed: true,
        }
    }

    pub fn rectangle(position: Point2, width: f64, height: f64) -> Self {
        HatchBoundary::Rectangle {
            position,
            width,
            height,
            rotation: 0.0,
            closed: true,
        }
    }

    /// 从闭合几何构造边界；开放几何返回 `None`
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Circle(c) => Some(Self::circle(c.center, c.radius)),
            Shape::Rectangle(r) => Some(HatchBoundary::Rectangle {
                position: r.position,
                width: r.width,
                height: r.height,
                rotation: r.rotation,
                closed: true,
            }),
            Shape::Polyline(pl) if pl.closed && pl.points.len() >= 3 => {
                Some(HatchBoundary::Polyline {
                    points: pl.points.clone(),
                    closed: true,
                })
            }
            Shape::Spline(s) if s.closed && s.points.len() >= 3 => Some(HatchBoundary::Spline {
                points: s.points.clone(),
                closed: true,
            }),
            Shape::Ellipse(e) => Some(Self::polygon(e.sample_points(72))),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            HatchBoundary::Polyline { closed, .. }
            | HatchBoundary::Circle { closed, .. }
            | HatchBoundary::Rectangle { closed, .. }
            | HatchBoundary::Spline { closed, .. } => *closed,
        }
    }

    /// 多边形顶点（圆没有多边形表示）
    fn vertices(&self) -> Option<Vec<Point2>> {
        match self {
            HatchBoundary::Polyline { points, .. } | HatchBoundary::Spline { points, .. } => {
                Some(points.clone())
            }
            HatchBoundary::Rectangle {
                position,
                width,
                height,
                rotation,
                ..
            } => Some(
                [
                    Vector2::new(0.0, 0.0),
                    Vector2::new(*width, 0.0),
                    Vector2::new(*width, *height),
                    Vector2::new(0.0, *height),
                ]
                .into_iter()
                .map(|v| position + rotate_vector(v, *rotation))
                .collect(),
            ),
            HatchBoundary::Circle { .. } => None,
        }
    }

    /// 边界包围盒
    pub fn bounding_box(&self) -> Option<BoundingBox2> {
        match self {
            HatchBoundary::Circle { center, radius, .. } => Some(BoundingBox2::new(
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            )),
            _ => BoundingBox2::from_points(self.vertices().unwrap_or_default()),
        }
    }

    /// 点是否在边界内；开放边界恒为 `false`
    pub fn contains(&self, point: &Point2) -> bool {
        if !self.is_closed() {
            return false;
        }
        match self {
            HatchBoundary::Circle { center, radius, .. } => (point - center).norm() <= *radius,
            _ => self
                .vertices()
                .is_some_and(|vertices| point_in_polygon(point, &vertices)),
        }
    }

    /// 线段与边界轮廓相交处的参数 t∈[0,1]
    pub fn crossing_params(&self, segment: &Segment2) -> Vec<f64> {
        match self {
            HatchBoundary::Circle { center, radius, .. } => {
                circle_crossings(segment, center, *radius)
            }
            _ => {
                let vertices = self.vertices().unwrap_or_default();
                let n = vertices.len();
                if n < 2 {
                    return Vec::new();
                }
                (0..n)
                    .filter_map(|i| {
                        let edge = Segment2::new(vertices[i], vertices[(i + 1) % n]);
                        segment.intersection_param(&edge)
                    })
                    .collect()
            }
        }
    }
}

fn circle_crossings(segment: &Segment2, center: &Point2, radius: f64) -> Vec<f64> {
    let d = segment.end - segment.start;
    let f = segment.start - center;
    let a = d.dot(&d);
    if a < EPSILON {
        return Vec::new();
    }
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let sqrt = discriminant.sqrt();
    [(-b - sqrt) / (2.0 * a), (-b + sqrt) / (2.0 * a)]
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

/// 将线段裁剪到边界并集内部，返回保留的子线段
pub fn clip_segment_exact(segment: &Segment2, boundaries: &[HatchBoundary]) -> Vec<Segment2> {
    let mut params = vec![0.0, 1.0];
    for boundary in boundaries.iter().filter(|b| b.is_closed()) {
        params.extend(boundary.crossing_params(segment));
    }
    params.sort_by(|a, b| a.total_cmp(b));
    params.dedup_by(|a, b| (*a - *b).abs() < EPSILON);

    let inside = |p: &Point2| boundaries.iter().any(|b| b.contains(p));

    let mut result: Vec<Segment2> = Vec::new();
    let mut open: Option<f64> = None;
    for pair in params.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        let keep = inside(&segment.point_at((t0 + t1) / 2.0));
        match (keep, open) {
            (true, None) => open = Some(t0),
            (false, Some(start)) => {
                result.push(Segment2::new(segment.point_at(start), segment.point_at(t0)));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        result.push(Segment2::new(segment.point_at(start), segment.end));
    }
    result
}

/// 粗略裁剪：任一端点在某个边界内则整段保留
pub fn keep_if_endpoint_inside(segment: &Segment2, boundaries: &[HatchBoundary]) -> bool {
    boundaries
        .iter()
        .any(|b| b.contains(&segment.start) || b.contains(&segment.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Polyline};

    #[test]
    fn test_open_boundary_contains_nothing() {
        let open = HatchBoundary::Polyline {
            points: vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)],
            closed: false,
        };
        assert!(!open.contains(&Point2::new(9.0, 1.0)));
    }

    #[test]
    fn test_exact_clip_through_square() {
        let square = HatchBoundary::rectangle(Point2::new(0.0, 0.0), 10.0, 10.0);
        let seg = Segment2::new(Point2::new(-5.0, 5.0), Point2::new(15.0, 5.0));
        let pieces = clip_segment_exact(&seg, &[square]);
        assert_eq!(pieces.len(), 1);
        assert!((pieces[0].start.x - 0.0).abs() < 1e-9);
        assert!((pieces[0].end.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_clip_through_circle() {
        let circle = HatchBoundary::circle(Point2::origin(), 5.0);
        let seg = Segment2::new(Point2::new(-10.0, 0.0), Point2::new(10.0, 0.0));
        let pieces = clip_segment_exact(&seg, &[circle]);
        assert_eq!(pieces.len(), 1);
        assert!((pieces[0].length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_clip_concave_polygon_splits() {
        // U 形：中间开口使水平线被分成两段
        let u_shape = HatchBoundary::polygon([
            Point2::new(0.0, 0.0),
            Point2::new(30.0, 0.0),
            Point2::new(30.0, 20.0),
            Point2::new(20.0, 20.0),
            Point2::new(20.0, 5.0),
            Point2::new(10.0, 5.0),
            Point2::new(10.0, 20.0),
            Point2::new(0.0, 20.0),
        ]);
        let seg = Segment2::new(Point2::new(-5.0, 10.0), Point2::new(35.0, 10.0));
        let pieces = clip_segment_exact(&seg, &[u_shape]);
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn test_endpoint_rule() {
        let square = [HatchBoundary::rectangle(Point2::new(0.0, 0.0), 10.0, 10.0)];
        let crossing = Segment2::new(Point2::new(-50.0, 5.0), Point2::new(50.0, 5.0));
        let half_in = Segment2::new(Point2::new(5.0, 5.0), Point2::new(50.0, 5.0));
        assert!(!keep_if_endpoint_inside(&crossing, &square));
        assert!(keep_if_endpoint_inside(&half_in, &square));
    }

    #[test]
    fn test_from_shape_requires_closed() {
        let open: Shape = Polyline::new(
            [Point2::origin(), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            false,
        )
        .into();
        let line: Shape = Line::new(Point2::origin(), Point2::new(1.0, 0.0)).into();
        assert!(HatchBoundary::from_shape(&open).is_none());
        assert!(HatchBoundary::from_shape(&line).is_none());
    }
}
