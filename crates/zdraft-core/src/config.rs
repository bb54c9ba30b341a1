//! 引擎配置
//!
//! 所有字段都有默认值，配置文件只需写出需要覆盖的项。

use serde::{Deserialize, Serialize};

/// 填充裁剪方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    /// 将线段精确裁剪到边界内部
    #[default]
    Exact,
    /// 任一端点在边界内则整段保留，否则丢弃
    EndpointInside,
}

/// 拾取配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTestConfig {
    /// 屏幕空间容差，使用时除以缩放比例
    pub tolerance: f64,
    /// 文本宽度估算系数
    pub text_width_factor: f64,
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self {
            tolerance: 5.0,
            text_width_factor: crate::geometry::DEFAULT_TEXT_WIDTH_FACTOR,
        }
    }
}

/// 填充配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchConfig {
    /// 包围盒外扩倍数（× scale）
    pub overrun_factor: f64,
    /// 平行线数量的额外余量
    pub extra_lines: usize,
    /// 单条填充线长度（× 最大包围盒尺寸）
    pub length_factor: f64,
    pub clip_mode: ClipMode,
    /// 单次生成的线段上限
    pub max_segments: usize,
}

impl Default for HatchConfig {
    fn default() -> Self {
        Self {
            overrun_factor: 2.0,
            extra_lines: 10,
            length_factor: 3.0,
            clip_mode: ClipMode::Exact,
            max_segments: 200_000,
        }
    }
}

/// 关联标注配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    /// 新建关联关系的默认容差
    pub tolerance: f64,
    /// 新建关联关系是否自动更新
    pub auto_update: bool,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            auto_update: true,
        }
    }
}

/// 引擎配置根结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub hit_test: HitTestConfig,
    pub hatch: HatchConfig,
    pub dimension: DimensionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "hatch": { "clip_mode": "endpoint_inside" } }"#).unwrap();
        assert_eq!(config.hatch.clip_mode, ClipMode::EndpointInside);
        assert_eq!(config.hatch.extra_lines, 10);
        assert_eq!(config.hit_test.tolerance, 5.0);
        assert!(config.dimension.auto_update);
    }
}
