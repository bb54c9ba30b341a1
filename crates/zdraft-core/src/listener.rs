//! 同步变更通知
//!
//! 监听器按注册顺序依次调用。某个监听器返回错误时只记录日志，
//! 不影响其余监听器，也不影响触发通知的操作。

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// 监听器回调结果
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// 监听器句柄，用于取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

type Callback<E> = Box<dyn FnMut(&E) -> ListenerResult + Send>;

/// 监听器注册表
pub struct ListenerRegistry<E> {
    listeners: Vec<(ListenerId, Callback<E>)>,
    next_id: u64,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// 注册监听器
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&E) -> ListenerResult + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// 取消订阅，返回是否存在该监听器
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// 向所有监听器广播事件，返回失败的监听器数量
    pub fn notify(&mut self, event: &E) -> usize {
        let mut failures = 0;
        for (id, callback) in &mut self.listeners {
            if let Err(err) = callback(event) {
                failures += 1;
                warn!(listener = id.0, error = %err, "listener failed, continuing");
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// 克隆不携带订阅者
impl<E> Clone for ListenerRegistry<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
