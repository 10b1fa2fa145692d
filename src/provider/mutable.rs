//! 可变提供者
//!
//! 互斥锁保护的键值映射加按键监听者注册表。
//! 写入与监听者入队在同一临界区内完成，每个监听者看到的
//! 序列因此是真实更新顺序的子序列，不重复不乱序

use crate::key::AbsoluteConfigKey;
use crate::provider::{ConfigProvider, WatchableProvider};
use crate::value::ConfigValue;
use crate::watch::{ValueStream, WatchRegistration, WatcherRegistry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// 可变提供者，克隆后共享同一份内部状态
///
/// 写入方持有本类型的克隆直接调用 `set_value`，
/// 读取链只见到只读契约
#[derive(Debug, Clone)]
pub struct MutableProvider {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    state: Mutex<MutableState>,
}

#[derive(Debug, Default)]
struct MutableState {
    values: HashMap<AbsoluteConfigKey, ConfigValue>,
    watchers: HashMap<AbsoluteConfigKey, Vec<WatcherEntry>>,
}

/// 单个监听者的标识与发送端
#[derive(Debug)]
struct WatcherEntry {
    id: Uuid,
    sender: mpsc::UnboundedSender<Option<ConfigValue>>,
}

impl MutableProvider {
    /// 构造空的可变提供者
    pub fn new(name: &str) -> Self {
        Self::with_values(name, HashMap::new())
    }

    /// 以初始键值构造
    pub fn with_values(name: &str, values: HashMap<AbsoluteConfigKey, ConfigValue>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                state: Mutex::new(MutableState {
                    values,
                    watchers: HashMap::new(),
                }),
            }),
        }
    }

    /// 某个键当前注册的监听者数量，用于诊断
    pub fn watcher_count(&self, key: &AbsoluteConfigKey) -> usize {
        let state = self.inner.state.lock().unwrap();
        state.watchers.get(key).map_or(0, Vec::len)
    }
}

impl ConfigProvider for MutableProvider {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue> {
        let state = self.inner.state.lock().unwrap();
        state.values.get(key).cloned()
    }

    fn as_watchable(&self) -> Option<&dyn WatchableProvider> {
        Some(self)
    }
}

impl WatchableProvider for MutableProvider {
    fn set_value(&self, value: Option<ConfigValue>, key: &AbsoluteConfigKey) {
        let mut state = self.inner.state.lock().unwrap();
        match &value {
            Some(new_value) => {
                state.values.insert(key.clone(), new_value.clone());
            }
            None => {
                state.values.remove(key);
            }
        }

        // 同一临界区内入队，写入顺序即送达顺序
        if let Some(entries) = state.watchers.get_mut(key) {
            let before = entries.len();
            entries.retain(|entry| entry.sender.send(value.clone()).is_ok());
            let pruned = before - entries.len();
            if pruned > 0 {
                debug!("清理失效监听者: key={key}, count={pruned}");
            }
            if entries.is_empty() {
                state.watchers.remove(key);
            }
        }
    }

    fn watch(&self, key: &AbsoluteConfigKey) -> ValueStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        {
            let mut state = self.inner.state.lock().unwrap();
            // 锁内先送当前值再注册，初始元素与后续更新之间不会漏值
            let current = state.values.get(key).cloned();
            let _ = sender.send(current);
            state
                .watchers
                .entry(key.clone())
                .or_default()
                .push(WatcherEntry { id, sender });
        }
        debug!("注册配置监听: key={key}, id={id}");

        let registry: Weak<dyn WatcherRegistry> = {
            let strong: Arc<dyn WatcherRegistry> = self.inner.clone();
            Arc::downgrade(&strong)
        };
        ValueStream::new(receiver, WatchRegistration::new(registry, key.clone(), id))
    }
}

impl WatcherRegistry for Inner {
    fn deregister(&self, key: &AbsoluteConfigKey, id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(entries) = state.watchers.get_mut(key) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                state.watchers.remove(key);
            }
        }
    }
}
