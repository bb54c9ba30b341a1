//! ZDraft原生文件格式
//!
//! 整个图纸（文档、块库与块实例）序列化为一个 JSON 文档：
//! - `.zdraft`：格式化的 JSON，便于比对
//! - `.zdz`：gzip 压缩的 JSON

use crate::error::FileError;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;
use zdraft_core::block::BlockManager;
use zdraft_core::config::EngineConfig;
use zdraft_core::document::Document;
use zdraft_core::session::DrawingSession;

/// 当前文件格式版本
pub const FORMAT_VERSION: u32 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 归档元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    /// 图纸唯一标识
    pub id: Uuid,

    /// 标题
    pub title: String,

    /// 作者
    pub author: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后保存时间
    pub modified_at: DateTime<Utc>,

    /// 单位（mm, cm, m, inch, feet）
    pub units: String,

    /// 自定义属性
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
}

impl Default for ArchiveMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: "Untitled".to_string(),
            author: String::new(),
            created_at: now,
            modified_at: now,
            units: "mm".to_string(),
            custom_properties: BTreeMap::new(),
        }
    }
}

/// 保存到磁盘的完整图纸
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingArchive {
    pub format_version: u32,
    pub metadata: ArchiveMetadata,
    pub document: Document,
    pub blocks: BlockManager,
}

impl DrawingArchive {
    pub fn new(document: Document, blocks: BlockManager) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            metadata: ArchiveMetadata::default(),
            document,
            blocks,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = title.into();
        self
    }

    /// 从会话中取出文档与块库
    pub fn from_session(session: DrawingSession) -> Self {
        let (document, blocks) = session.into_parts();
        Self::new(document, blocks)
    }

    /// 以归档内容创建会话，元数据一并返回
    pub fn into_session(self, config: EngineConfig) -> (DrawingSession, ArchiveMetadata) {
        (
            DrawingSession::from_parts(self.document, self.blocks, config),
            self.metadata,
        )
    }

    fn check_version(&self) -> Result<(), FileError> {
        if self.format_version == 0 {
            return Err(FileError::InvalidFormat("missing format version".to_string()));
        }
        if self.format_version > FORMAT_VERSION {
            return Err(FileError::UnsupportedVersion(format!(
                "File version {} is newer than supported version {}",
                self.format_version, FORMAT_VERSION
            )));
        }
        Ok(())
    }
}

impl Default for DrawingArchive {
    fn default() -> Self {
        Self::new(Document::new(), BlockManager::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Gzip,
}

fn encoding_for(path: &Path) -> Option<Encoding> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "zdraft" | "json" => Some(Encoding::Json),
        "zdz" => Some(Encoding::Gzip),
        _ => None,
    }
}

/// 保存图纸
///
/// 格式由扩展名决定；保存前刷新修改时间并清除文档的修改标记。
pub fn save_archive(archive: &mut DrawingArchive, path: &Path) -> Result<(), FileError> {
    let encoding = encoding_for(path).ok_or_else(|| {
        FileError::InvalidFormat(format!("unknown drawing extension: {}", path.display()))
    })?;

    archive.format_version = FORMAT_VERSION;
    archive.metadata.modified_at = Utc::now();

    let writer = BufWriter::new(File::create(path)?);
    match encoding {
        Encoding::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &*archive)?;
            writer.flush()?;
        }
        Encoding::Gzip => {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            serde_json::to_writer(&mut encoder, &*archive)?;
            encoder.finish()?.flush()?;
        }
    }

    archive.document.mark_saved();
    info!(
        path = %path.display(),
        entities = archive.document.entity_count(),
        "drawing saved"
    );
    Ok(())
}

/// 载入图纸
///
/// 未知扩展名时按文件头判断是否为 gzip。
pub fn load_archive(path: &Path) -> Result<DrawingArchive, FileError> {
    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

    let encoding = encoding_for(path).unwrap_or(if bytes.starts_with(&GZIP_MAGIC) {
        Encoding::Gzip
    } else {
        Encoding::Json
    });
    debug!(path = %path.display(), ?encoding, size = bytes.len(), "reading drawing");

    let archive: DrawingArchive = match encoding {
        Encoding::Json => serde_json::from_slice(&bytes)?,
        Encoding::Gzip => {
            if !bytes.starts_with(&GZIP_MAGIC) {
                return Err(FileError::InvalidFormat(format!(
                    "{} is not gzip compressed",
                    path.display()
                )));
            }
            serde_json::from_reader(GzDecoder::new(bytes.as_slice()))?
        }
    };
    archive.check_version()?;

    info!(
        path = %path.display(),
        title = %archive.metadata.title,
        entities = archive.document.entity_count(),
        "drawing loaded"
    );
    Ok(archive)
}
