//! 配置提供者模块
//!
//! 定义提供者能力契约与各内置提供者实现。
//! 只读契约与可变契约分离，只持有只读链的调用方接触不到写接口

pub mod document;
pub mod env;
pub mod mutable;
pub mod snapshot;

use crate::key::AbsoluteConfigKey;
use crate::value::ConfigValue;
use crate::watch::ValueStream;
use std::fmt;

// 重新导出主要类型
pub use document::{default_document_path, JsonProvider, TomlProvider};
pub use env::{EnvProvider, EnvSource};
pub use mutable::MutableProvider;
pub use snapshot::StaticProvider;

/// 配置提供者的只读契约
///
/// 查找是同步操作且从不失败，未命中即返回 `None`；
/// 构造期的 IO 与解析错误由各实现的构造函数返回
pub trait ConfigProvider: Send + Sync + fmt::Debug {
    /// 提供者名称，用于诊断与日志
    fn name(&self) -> &str;

    /// 查找键对应的当前值
    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue>;

    /// 尝试以可监听提供者身份访问
    ///
    /// 默认返回 `None`，只有可变提供者覆写
    fn as_watchable(&self) -> Option<&dyn WatchableProvider> {
        None
    }
}

/// 可变且可监听的提供者契约
pub trait WatchableProvider: ConfigProvider {
    /// 写入或移除键值，并按应用顺序通知该键的所有监听者
    ///
    /// # 参数
    /// * `value` - 新值，`None` 表示移除该键
    /// * `key` - 目标键
    fn set_value(&self, value: Option<ConfigValue>, key: &AbsoluteConfigKey);

    /// 注册监听，返回的流以订阅瞬间的当前值开头
    fn watch(&self, key: &AbsoluteConfigKey) -> ValueStream;
}
