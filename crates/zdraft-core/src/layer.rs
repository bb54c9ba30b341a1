//! 图层管理
//!
//! 图层是CAD中组织实体的重要方式。`order` 决定绘制与优先级顺序（小者先绘制）。
//! 始终存在唯一的默认图层，不可删除。

use crate::style::Style;
use serde::{Deserialize, Serialize};

/// 图层ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl LayerId {
    /// 默认图层（0层）的固定ID
    pub const DEFAULT: LayerId = LayerId(0);
}

/// 图层定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// 图层ID
    pub id: LayerId,

    /// 图层名称
    pub name: String,

    /// 是否可见
    pub visible: bool,

    /// 是否锁定
    pub locked: bool,

    /// 默认样式
    pub style: Style,

    /// 绘制顺序
    pub order: i32,

    /// 描述
    pub description: String,
}

impl Layer {
    /// 创建新图层
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            style: Style::layer_default(),
            order: 0,
            description: String::new(),
        }
    }

    /// 默认图层（0层）
    pub fn default_layer() -> Self {
        Self {
            description: "Default layer".to_string(),
            ..Self::new(LayerId::DEFAULT, "0")
        }
    }

    /// 是否为默认图层
    pub fn is_default(&self) -> bool {
        self.id == LayerId::DEFAULT
    }

    /// 设置样式
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// 设置绘制顺序
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// 检查图层是否可编辑
    pub fn is_editable(&self) -> bool {
        !self.locked
    }
}

/// 图层管理器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerManager {
    /// 所有图层
    layers: Vec<Layer>,

    /// 当前活动图层
    current: LayerId,

    /// 下一个图层ID
    next_id: u64,
}

impl LayerManager {
    /// 创建新的图层管理器
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::default_layer()],
            current: LayerId::DEFAULT,
            next_id: 1,
        }
    }

    /// 获取默认图层（始终位于下标 0）
    pub fn default_layer(&self) -> &Layer {
        &self.layers[0]
    }

    /// 获取当前图层
    pub fn current_layer(&self) -> &Layer {
        self.resolve(self.current)
    }

    /// 设置当前图层
    pub fn set_current_layer(&mut self, name: &str) -> bool {
        if let Some(id) = self.get_by_name(name).map(|l| l.id) {
            self.current = id;
            true
        } else {
            false
        }
    }

    /// 创建并添加新图层，绘制顺序排在现有图层之后
    pub fn create_layer(&mut self, name: impl Into<String>) -> Result<LayerId, LayerError> {
        let name = name.into();
        if self.get_by_name(&name).is_some() {
            return Err(LayerError::LayerAlreadyExists(name));
        }
        let id = LayerId(self.next_id);
        self.next_id += 1;
        let order = self.layers.iter().map(|l| l.order).max().unwrap_or(0) + 1;
        self.layers.push(Layer::new(id, name).with_order(order));
        Ok(id)
    }

    /// 添加已构造的图层（用于文件加载）
    pub fn add_layer(&mut self, layer: Layer) -> Result<LayerId, LayerError> {
        if self.layers.iter().any(|l| l.id == layer.id || l.name == layer.name) {
            return Err(LayerError::LayerAlreadyExists(layer.name));
        }
        let id = layer.id;
        self.next_id = self.next_id.max(id.0 + 1);
        self.layers.push(layer);
        Ok(id)
    }

    /// 获取图层（按ID）
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// 获取图层（可变，按ID）
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// 获取图层（按名称）
    pub fn get_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// 解析图层引用，不存在时回退到默认图层
    pub fn resolve(&self, id: LayerId) -> &Layer {
        self.get(id).unwrap_or_else(|| self.default_layer())
    }

    /// 获取所有图层（插入顺序）
    pub fn all_layers(&self) -> &[Layer] {
        &self.layers
    }

    /// 按绘制顺序排列的图层
    pub fn sorted_by_order(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| (l.order, l.id));
        layers
    }

    /// 设置图层可见性
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> Result<(), LayerError> {
        self.get_mut(id)
            .map(|l| l.visible = visible)
            .ok_or(LayerError::LayerNotFound(id))
    }

    /// 设置图层锁定状态
    pub fn set_locked(&mut self, id: LayerId, locked: bool) -> Result<(), LayerError> {
        self.get_mut(id)
            .map(|l| l.locked = locked)
            .ok_or(LayerError::LayerNotFound(id))
    }

    /// 设置图层绘制顺序
    pub fn set_order(&mut self, id: LayerId, order: i32) -> Result<(), LayerError> {
        self.get_mut(id)
            .map(|l| l.order = order)
            .ok_or(LayerError::LayerNotFound(id))
    }

    /// 删除图层
    ///
    /// 注意：不能删除默认图层和当前图层。引用被删图层的实体读取时回退到默认图层。
    pub fn delete_layer(&mut self, id: LayerId) -> Result<Layer, LayerError> {
        if id == LayerId::DEFAULT {
            return Err(LayerError::CannotDeleteDefaultLayer);
        }
        if id == self.current {
            return Err(LayerError::CannotDeleteCurrentLayer);
        }

        let idx = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(LayerError::LayerNotFound(id))?;
        Ok(self.layers.remove(idx))
    }

    /// 重命名图层
    pub fn rename_layer(&mut self, id: LayerId, new_name: &str) -> Result<(), LayerError> {
        if id == LayerId::DEFAULT {
            return Err(LayerError::CannotRenameDefaultLayer);
        }

        if self.layers.iter().any(|l| l.name == new_name) {
            return Err(LayerError::LayerAlreadyExists(new_name.to_string()));
        }

        let layer = self.get_mut(id).ok_or(LayerError::LayerNotFound(id))?;
        layer.name = new_name.to_string();
        Ok(())
    }

    /// 图层数量
    pub fn count(&self) -> usize {
        self.layers.len()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 图层操作错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    #[error("Cannot delete the default layer")]
    CannotDeleteDefaultLayer,

    #[error("Cannot delete current layer")]
    CannotDeleteCurrentLayer,

    #[error("Cannot rename the default layer")]
    CannotRenameDefaultLayer,

    #[error("Layer not found: {0:?}")]
    LayerNotFound(LayerId),

    #[error("Layer already exists: {0}")]
    LayerAlreadyExists(String),
}
