//! 核心错误定义
//!
//! 退化几何不会产生错误，而是返回空结果（无包围盒、无命中）。

use crate::associative::RelationshipId;
use crate::block::{BlockId, InstanceId, LibraryId};
use crate::entity::EntityId;
use crate::layer::{LayerError, LayerId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Dimension not found: {0}")]
    DimensionNotFound(EntityId),

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(EntityId),

    #[error("Layer not found: {0:?}")]
    LayerNotFound(LayerId),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block definition not found: {0}")]
    DefinitionNotFound(BlockId),

    #[error("Block instance not found: {0:?}")]
    InstanceNotFound(InstanceId),

    #[error("Block library not found: {0:?}")]
    LibraryNotFound(LibraryId),

    #[error("Associative relationship not found: {0:?}")]
    RelationshipNotFound(RelationshipId),

    #[error("Hatch pattern not found: {0}")]
    PatternNotFound(String),

    #[error("Block library is read-only: {0}")]
    ReadOnlyLibrary(String),

    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Dimension dependency would form a cycle: {parent} -> {child}")]
    DependencyCycle { parent: EntityId, child: EntityId },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

impl DraftError {
    /// 是否属于“引用不存在”一类错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DraftError::EntityNotFound(_)
                | DraftError::DimensionNotFound(_)
                | DraftError::AnnotationNotFound(_)
                | DraftError::LayerNotFound(_)
                | DraftError::BlockNotFound(_)
                | DraftError::DefinitionNotFound(_)
                | DraftError::InstanceNotFound(_)
                | DraftError::LibraryNotFound(_)
                | DraftError::RelationshipNotFound(_)
                | DraftError::PatternNotFound(_)
                | DraftError::Layer(LayerError::LayerNotFound(_))
        )
    }
}

/// 核心操作结果
pub type DraftResult<T> = Result<T, DraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(DraftError::EntityNotFound(EntityId(3)).is_not_found());
        assert!(DraftError::from(LayerError::LayerNotFound(LayerId(9))).is_not_found());
        assert!(!DraftError::ReadOnlyLibrary("standard".into()).is_not_found());
    }
}
