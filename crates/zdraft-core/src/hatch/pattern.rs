//! 填充图案定义与标准图案库
//!
//! 标准图案取自 acad.pat 的 ANSI31~ANSI38、BRICK、DOTS（单位：英寸）。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 图案中的一组平行线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchLine {
    /// 角度（弧度）
    pub angle: f64,
    /// 起点（图案坐标）
    pub base_point: Point2,
    /// 相邻平行线之间的偏移（线局部坐标：x 沿线方向，y 垂直方向）
    pub offset: Vector2,
    /// 画线/间隙交替长度，下标 0 为画线；为空表示实线
    pub dash_lengths: Vec<f64>,
}

impl HatchLine {
    pub fn solid(angle_degrees: f64, spacing: f64) -> Self {
        Self {
            angle: angle_degrees.to_radians(),
            base_point: Point2::origin(),
            offset: Vector2::new(0.0, spacing),
            dash_lengths: Vec::new(),
        }
    }

    fn pat(angle_degrees: f64, base: (f64, f64), offset: (f64, f64), dashes: &[f64]) -> Self {
        Self {
            angle: angle_degrees.to_radians(),
            base_point: Point2::new(base.0, base.1),
            offset: Vector2::new(offset.0, offset.1),
            dash_lengths: dashes.iter().map(|d| d.abs()).collect(),
        }
    }

    /// 一个虚线周期的总长度
    pub fn dash_cycle(&self) -> f64 {
        self.dash_lengths.iter().map(|d| d.abs()).sum()
    }
}

/// 填充图案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchPattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub lines: Vec<HatchLine>,
    /// 用户自定义图案（非标准库）
    pub user_defined: bool,
}

impl HatchPattern {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        lines: Vec<HatchLine>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: description.into(),
            lines,
            user_defined: false,
        }
    }
}

/// 单方向平行线用户图案
pub fn create_simple_pattern(
    id: impl Into<String>,
    angle_degrees: f64,
    spacing: f64,
) -> HatchPattern {
    HatchPattern {
        user_defined: true,
        ..HatchPattern::new(id, "User defined", vec![HatchLine::solid(angle_degrees, spacing)])
    }
}

/// 双向交叉线用户图案（第二组线旋转 90°）
pub fn create_cross_hatch_pattern(
    id: impl Into<String>,
    angle_degrees: f64,
    spacing: f64,
) -> HatchPattern {
    HatchPattern {
        user_defined: true,
        ..HatchPattern::new(
            id,
            "User defined cross hatch",
            vec![
                HatchLine::solid(angle_degrees, spacing),
                HatchLine::solid(angle_degrees + 90.0, spacing),
            ],
        )
    }
}

/// 标准图案库
pub fn standard_patterns() -> Vec<HatchPattern> {
    const D: f64 = 0.176776695;
    vec![
        HatchPattern::new(
            "ANSI31",
            "ANSI Iron, Brick, Stone masonry",
            vec![HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.125), &[])],
        ),
        HatchPattern::new(
            "ANSI32",
            "ANSI Steel",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.375), &[]),
                HatchLine::pat(45.0, (D, 0.0), (0.0, 0.375), &[]),
            ],
        ),
        HatchPattern::new(
            "ANSI33",
            "ANSI Bronze, Brass, Copper",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.25), &[]),
                HatchLine::pat(45.0, (D, 0.0), (0.0, 0.25), &[0.125, -0.0625]),
            ],
        ),
        HatchPattern::new(
            "ANSI34",
            "ANSI Plastic, Rubber",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.75), &[]),
                HatchLine::pat(45.0, (D, 0.0), (0.0, 0.75), &[]),
                HatchLine::pat(45.0, (2.0 * D, 0.0), (0.0, 0.75), &[]),
                HatchLine::pat(45.0, (3.0 * D, 0.0), (0.0, 0.75), &[]),
            ],
        ),
        HatchPattern::new(
            "ANSI35",
            "ANSI Fire brick, Refractory material",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.25), &[]),
                HatchLine::pat(45.0, (D, 0.0), (0.0, 0.25), &[0.3125, -0.0625, 0.0, -0.0625]),
            ],
        ),
        HatchPattern::new(
            "ANSI36",
            "ANSI Marble, Slate, Glass",
            vec![HatchLine::pat(
                45.0,
                (0.0, 0.0),
                (0.21875, 0.125),
                &[0.3125, -0.0625, 0.0, -0.0625],
            )],
        ),
        HatchPattern::new(
            "ANSI37",
            "ANSI Lead, Zinc, Magnesium, Sound/Heat/Elec Insulation",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.125), &[]),
                HatchLine::pat(135.0, (0.0, 0.0), (0.0, 0.125), &[]),
            ],
        ),
        HatchPattern::new(
            "ANSI38",
            "ANSI Aluminum",
            vec![
                HatchLine::pat(45.0, (0.0, 0.0), (0.0, 0.125), &[]),
                HatchLine::pat(135.0, (0.0, 0.0), (0.25, 0.125), &[0.3125, -0.1875]),
            ],
        ),
        HatchPattern::new(
            "BRICK",
            "Brick or masonry-type surface",
            vec![
                HatchLine::pat(0.0, (0.0, 0.0), (0.0, 0.25), &[]),
                HatchLine::pat(90.0, (0.0, 0.0), (0.0, 0.5), &[0.25, -0.25]),
                // 原定义以间隙开头，这里将起点沿线方向前移半个周期
                HatchLine::pat(90.0, (0.25, 0.25), (0.0, 0.5), &[0.25, -0.25]),
            ],
        ),
        HatchPattern::new(
            "DOTS",
            "Series of dots",
            vec![HatchLine::pat(0.0, (0.0, 0.0), (0.03125, 0.0625), &[0.0, -0.0625])],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids() {
        let ids: Vec<String> = standard_patterns().into_iter().map(|p| p.id).collect();
        for expected in [
            "ANSI31", "ANSI32", "ANSI33", "ANSI34", "ANSI35", "ANSI36", "ANSI37", "ANSI38", "BRICK",
            "DOTS",
        ] {
            assert!(ids.iter().any(|id| id == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_gap_lengths_stored_positive() {
        let ansi33 = standard_patterns().into_iter().find(|p| p.id == "ANSI33").unwrap();
        assert_eq!(ansi33.lines[1].dash_lengths, vec![0.125, 0.0625]);
        assert!((ansi33.lines[1].dash_cycle() - 0.1875).abs() < 1e-12);
    }

    #[test]
    fn test_convenience_constructors() {
        let simple = create_simple_pattern("U1", 30.0, 2.0);
        assert!(simple.user_defined);
        assert_eq!(simple.lines.len(), 1);
        assert!(simple.lines[0].dash_lengths.is_empty());

        let cross = create_cross_hatch_pattern("U2", 0.0, 1.0);
        assert_eq!(cross.lines.len(), 2);
        assert!((cross.lines[1].angle - 90f64.to_radians()).abs() < 1e-12);
    }
}
