//! 块定义检索

use super::BlockDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// 名称升序
    Name,
    /// 使用次数降序
    Usage,
    /// 创建时间降序（最新在前）
    Date,
    /// 分类升序，同类按名称
    Category,
}

/// 检索条件，空字段不参与过滤
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    /// 名称、描述、标签中的子串（不区分大小写）
    pub text: Option<String>,
    pub category: Option<String>,
    /// 与定义的标签有交集即匹配
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    /// 是否带属性
    pub has_attributes: Option<bool>,
    /// 必须包含的属性标记
    pub attribute_tags: Vec<String>,
    pub sort_by: Option<SortBy>,
    pub reverse: bool,
    pub limit: Option<usize>,
}

impl SearchCriteria {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, definition: &BlockDefinition) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = definition.name.to_lowercase().contains(&needle)
                || definition.description.to_lowercase().contains(&needle)
                || definition.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !definition.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if !self.tags.is_empty()
            && !self
                .tags
                .iter()
                .any(|wanted| definition.tags.iter().any(|t| t.eq_ignore_ascii_case(wanted)))
        {
            return false;
        }
        if let Some(author) = &self.author {
            if !definition.author.eq_ignore_ascii_case(author) {
                return false;
            }
        }
        if self.created_after.is_some_and(|after| definition.created_at < after)
            || self.created_before.is_some_and(|before| definition.created_at > before)
        {
            return false;
        }
        if let Some(has) = self.has_attributes {
            if definition.attributes.is_empty() == has {
                return false;
            }
        }
        self.attribute_tags
            .iter()
            .all(|tag| definition.attribute(tag).is_some())
    }

    /// 过滤、排序并截断
    pub fn apply<'a>(
        &self,
        definitions: impl IntoIterator<Item = &'a BlockDefinition>,
    ) -> Vec<&'a BlockDefinition> {
        let mut found: Vec<&BlockDefinition> =
            definitions.into_iter().filter(|d| self.matches(d)).collect();
        if let Some(sort_by) = self.sort_by {
            match sort_by {
                SortBy::Name => found.sort_by(|a, b| a.name.cmp(&b.name)),
                SortBy::Usage => found.sort_by(|a, b| {
                    b.usage_count.cmp(&a.usage_count).then(a.name.cmp(&b.name))
                }),
                SortBy::Date => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
                SortBy::Category => {
                    found.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)))
                }
            }
        }
        if self.reverse {
            found.reverse();
        }
        if let Some(limit) = self.limit {
            found.truncate(limit);
        }
        found
    }
}
