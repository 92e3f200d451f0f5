//! # Published State
//!
//! 单写多读的状态容器，基于 `tokio::sync::watch`。
//!
//! - [`Publisher`] 是唯一能替换值的一方，不可 Clone
//! - [`StateReader`] 可任意 Clone，读到的总是某次完整发布的值
//!
//! 值以 `Arc<T>` 整体替换，读者永远不会看到半更新的状态。

use std::sync::Arc;
use tokio::sync::watch;

/// 状态写入端
#[derive(Debug)]
pub struct Publisher<T> {
    tx: watch::Sender<Arc<T>>,
}

impl<T> Publisher<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// 整体替换当前值，返回新值
    pub fn publish(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.tx.send_replace(value.clone());
        value
    }

    /// 基于当前值计算新值并替换；与其他写入串行
    pub fn replace_with<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.tx.send_modify(|current| {
            let next = f(&**current);
            *current = Arc::new(next);
        });
    }

    pub fn current(&self) -> Arc<T> {
        self.tx.borrow().clone()
    }

    pub fn reader(&self) -> StateReader<T> {
        StateReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Default> Default for Publisher<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// 状态只读端
#[derive(Debug)]
pub struct StateReader<T> {
    rx: watch::Receiver<Arc<T>>,
}

impl<T> Clone for StateReader<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone() }
    }
}

impl<T> StateReader<T> {
    /// 当前值，不标记为已读
    pub fn get(&self) -> Arc<T> {
        self.rx.borrow().clone()
    }

    /// 等待下一次发布并返回新值；写入端已释放时返回 `None`
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// 原始 watch 接收端
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.rx.clone()
    }
}
