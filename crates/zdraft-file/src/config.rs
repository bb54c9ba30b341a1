use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zdraft_core::config::EngineConfig;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "ZDRAFT_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// 从 TOML 文本解析。
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 按顺序查找配置：显式路径、环境变量 `ZDRAFT_CONFIG`、`./config/zdraft.toml`。
    /// 前两者指定的文件必须存在；都没有时返回默认配置。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("zdraft.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("解析配置失败: {0}")]
    Syntax(#[from] toml::de::Error),
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zdraft_core::config::ClipMode;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = AppConfig::from_toml("").expect("empty config parses");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [engine.hit_test]
            tolerance = 8.0

            [engine.hatch]
            clip_mode = "endpoint_inside"
            max_segments = 1000
            "#
        )
        .expect("write config");

        let cfg = AppConfig::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.engine.hit_test.tolerance, 8.0);
        assert_eq!(cfg.engine.hatch.clip_mode, ClipMode::EndpointInside);
        assert_eq!(cfg.engine.hatch.max_segments, 1000);
        assert_eq!(cfg.engine.dimension, EngineConfig::default().dimension);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        let result = AppConfig::load(Some(missing.as_path()));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[logging\nlevel = ").expect("write config");
        let result = AppConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        assert!(matches!(AppConfig::from_toml("[logging"), Err(ConfigError::Syntax(_))));
    }
}
