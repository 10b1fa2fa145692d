//! 监听流模块
//!
//! 定义配置值变更的原始流与类型化流。
//! 每个监听者持有独立的无界队列，值按写入顺序送达，不丢弃不重复；
//! 流被取消或释放时自动注销监听

use crate::key::AbsoluteConfigKey;
use crate::value::{CoerceOptions, ConfigValue, FromConfigValue};
use futures::Stream;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// 监听者注销契约，由可变提供者内部状态实现
pub(crate) trait WatcherRegistry: Send + Sync {
    /// 注销指定监听者，此后不再向其入队新值
    fn deregister(&self, key: &AbsoluteConfigKey, id: Uuid);
}

/// 单个监听者的注册凭据
///
/// 通过弱引用指向提供者内部状态，提供者先于流销毁时注销自动失效
pub(crate) struct WatchRegistration {
    registry: Weak<dyn WatcherRegistry>,
    key: AbsoluteConfigKey,
    id: Uuid,
}

impl WatchRegistration {
    pub(crate) fn new(
        registry: Weak<dyn WatcherRegistry>,
        key: AbsoluteConfigKey,
        id: Uuid,
    ) -> Self {
        Self { registry, key, id }
    }

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(&self.key, self.id);
            debug!("已注销配置监听: key={}, id={}", self.key, self.id);
        }
    }
}

/// 配置值变更的原始监听流
///
/// 首个元素是订阅瞬间的当前值（`None` 表示键不存在），
/// 之后每次写入按应用顺序送达一个元素
pub struct ValueStream {
    receiver: mpsc::UnboundedReceiver<Option<ConfigValue>>,
    registration: Option<WatchRegistration>,
}

impl ValueStream {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<Option<ConfigValue>>,
        registration: WatchRegistration,
    ) -> Self {
        Self {
            receiver,
            registration: Some(registration),
        }
    }

    /// 取出下一个元素
    ///
    /// # 返回
    /// * `Option<Option<ConfigValue>>` - 外层 `None` 表示流已结束
    ///   （提供者已销毁或取消后队列已排空），内层 `None` 表示键被移除
    pub async fn recv(&mut self) -> Option<Option<ConfigValue>> {
        self.receiver.recv().await
    }

    /// 取消监听
    ///
    /// 注销后不再有新值入队，已入队的值仍可继续取出
    pub fn cancel(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.release();
        }
        self.receiver.close();
    }
}

impl Drop for ValueStream {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.release();
        }
    }
}

impl Stream for ValueStream {
    type Item = Option<ConfigValue>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// 类型化监听流
///
/// 每个元素经过与类型化访问器相同的转换规则；
/// 键被移除或新值转换失败时元素为 `None`
pub struct TypedStream<T> {
    inner: ValueStream,
    options: CoerceOptions,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromConfigValue> TypedStream<T> {
    /// 将原始流包装为类型化流
    pub fn new(inner: ValueStream, options: CoerceOptions) -> Self {
        Self {
            inner,
            options,
            _marker: PhantomData,
        }
    }

    /// 取出下一个元素，外层 `None` 表示流已结束
    pub async fn recv(&mut self) -> Option<Option<T>> {
        self.inner
            .recv()
            .await
            .map(|maybe| maybe.and_then(|value| T::from_value(&value, &self.options)))
    }

    /// 取消监听
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

impl<T: FromConfigValue> Stream for TypedStream<T> {
    type Item = Option<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner).poll_next(cx).map(|element| {
            element.map(|maybe| maybe.and_then(|value| T::from_value(&value, &this.options)))
        })
    }
}
