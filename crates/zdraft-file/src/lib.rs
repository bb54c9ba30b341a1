//! ZDraft 文件格式处理
//!
//! 支持：
//! - `.zdraft` 原生格式（JSON）
//! - `.zdz` 压缩格式（gzip 压缩的 JSON）
//! - TOML 应用配置

pub mod config;
pub mod error;
pub mod native;

pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use error::FileError;
pub use native::{load_archive, save_archive, ArchiveMetadata, DrawingArchive, FORMAT_VERSION};
