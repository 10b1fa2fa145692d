//! 后台刷新任务
//!
//! 周期性地从异步更新源拉取配置批次并写入可变提供者。
//! 任务句柄可显式停止，释放时自动中止；
//! 拉取失败只记录日志，循环继续运行

use crate::error::Result;
use crate::key::AbsoluteConfigKey;
use crate::provider::{ConfigProvider, MutableProvider, WatchableProvider};
use crate::value::ConfigValue;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

/// 单条配置更新
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    /// 目标键
    pub key: AbsoluteConfigKey,
    /// 新值，`None` 表示移除该键
    pub value: Option<ConfigValue>,
}

/// 异步配置更新源
///
/// 每次拉取返回一批更新，批内顺序即应用顺序。
/// 网络传输等获取手段由实现方自理
#[async_trait]
pub trait RefreshSource: Send + Sync {
    /// 拉取下一批更新
    async fn fetch_updates(&self) -> Result<Vec<ConfigUpdate>>;
}

/// 后台刷新任务句柄
pub struct RefreshTask {
    handle: Option<JoinHandle<()>>,
    shutdown: broadcast::Sender<()>,
}

impl RefreshTask {
    /// 启动刷新任务
    ///
    /// # 参数
    /// * `provider` - 接收更新的可变提供者
    /// * `source` - 更新源
    /// * `period` - 拉取间隔
    ///
    /// # 返回
    /// * `Self` - 任务句柄，持有方负责停止
    pub fn spawn(
        provider: MutableProvider,
        source: Arc<dyn RefreshSource>,
        period: Duration,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            info!(
                "配置刷新任务已启动: provider={}, 周期={:?}",
                provider.name(),
                period
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match source.fetch_updates().await {
                            Ok(updates) => {
                                if updates.is_empty() {
                                    continue;
                                }
                                debug!("应用配置更新批次: {} 条", updates.len());
                                for update in updates {
                                    provider.set_value(update.value, &update.key);
                                }
                            }
                            Err(e) => {
                                error!("拉取配置更新失败: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("配置刷新任务收到停止信号");
                        break;
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// 任务是否仍在运行
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// 停止任务并等待退出
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!("刷新任务异常退出: {}", e);
                }
            }
            info!("配置刷新任务已停止");
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
