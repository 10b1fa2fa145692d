//! 配置读取器
//!
//! 按提供者链顺序解析配置值的统一入口。
//! 原始读取取链中首个命中；类型化读取在命中但转换失败时
//! 降级为未命中并继续走链，直到取得可转换的值

use crate::error::{ConfigError, Result};
use crate::key::ConfigKey;
use crate::provider::ConfigProvider;
use crate::value::{CoerceOptions, ConfigValue, FromConfigValue};
use crate::watch::{TypedStream, ValueStream};
use std::sync::Arc;
use tracing::debug;

/// 配置读取器
///
/// 持有有序提供者链与转换选项，链序即优先级，构造后不再变化。
/// 克隆代价低，可在任务之间自由传递
#[derive(Debug, Clone)]
pub struct ConfigReader {
    providers: Vec<Arc<dyn ConfigProvider>>,
    options: CoerceOptions,
}

impl ConfigReader {
    /// 构造读取器，使用默认转换选项
    ///
    /// # Panics
    /// 提供者链为空时恐慌。调用方必须保证链中至少有一个提供者，
    /// 必要时追加空的静态提供者兜底
    pub fn new(providers: Vec<Arc<dyn ConfigProvider>>) -> Self {
        Self::with_options(providers, CoerceOptions::default())
    }

    /// 构造读取器并指定转换选项
    ///
    /// # Panics
    /// 提供者链为空时恐慌
    pub fn with_options(providers: Vec<Arc<dyn ConfigProvider>>, options: CoerceOptions) -> Self {
        assert!(!providers.is_empty(), "提供者链不能为空");
        Self { providers, options }
    }

    /// 链中各提供者的名称，按优先级排列
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 当前转换选项
    pub fn options(&self) -> CoerceOptions {
        self.options
    }

    /// 原始读取，返回链中首个命中的值，不做类型转换
    pub fn get_value(&self, key: &ConfigKey) -> Option<ConfigValue> {
        let absolute = key.absolute();
        self.providers
            .iter()
            .find_map(|provider| provider.lookup(absolute))
    }

    /// 类型化解析核心：命中但转换失败时继续下一个提供者
    fn resolve<T: FromConfigValue>(&self, key: &ConfigKey) -> Option<(T, bool)> {
        let absolute = key.absolute();
        for provider in &self.providers {
            if let Some(value) = provider.lookup(absolute) {
                match T::from_value(&value, &self.options) {
                    Some(typed) => return Some((typed, value.is_secret())),
                    None => debug!(
                        "配置值转换失败，继续下一个提供者: key={}, provider={}, 存储类型={}",
                        absolute,
                        provider.name(),
                        value.content().type_name()
                    ),
                }
            }
        }
        None
    }

    /// 类型化读取，所有提供者都未给出可转换的值时返回默认值
    pub fn get<T: FromConfigValue>(&self, key: &ConfigKey, default: T) -> T {
        match self.resolve(key) {
            Some((value, _)) => value,
            None => default,
        }
    }

    /// 类型化读取，未命中时返回 `None`
    pub fn try_get<T: FromConfigValue>(&self, key: &ConfigKey) -> Option<T> {
        self.resolve(key).map(|(value, _)| value)
    }

    /// 必需读取，可附带密级断言
    ///
    /// # 参数
    /// * `key` - 配置键
    /// * `expect_secret` - `Some` 时断言命中值的密级标记
    ///
    /// # 返回
    /// * `Result<T>` - 所有提供者耗尽返回 `MissingRequiredKey`，
    ///   密级断言失败返回 `SecretMismatch`
    pub fn required<T: FromConfigValue>(
        &self,
        key: &ConfigKey,
        expect_secret: Option<bool>,
    ) -> Result<T> {
        let (value, is_secret) =
            self.resolve(key)
                .ok_or_else(|| ConfigError::MissingRequiredKey {
                    key: key.to_string(),
                })?;
        if let Some(expected) = expect_secret {
            if expected != is_secret {
                return Err(ConfigError::SecretMismatch {
                    key: key.to_string(),
                    expected,
                    actual: is_secret,
                });
            }
        }
        Ok(value)
    }

    /// 注册原始监听，订阅链中首个可监听的提供者
    ///
    /// # 返回
    /// * `Result<ValueStream>` - 链中没有可监听提供者时返回 `NotWatchable`
    pub fn watch_value(&self, key: &ConfigKey) -> Result<ValueStream> {
        let watchable = self
            .providers
            .iter()
            .find_map(|provider| provider.as_watchable())
            .ok_or_else(|| ConfigError::NotWatchable {
                key: key.to_string(),
            })?;
        Ok(watchable.watch(key.absolute()))
    }

    /// 注册类型化监听，每个元素经过与访问器相同的转换
    pub fn watch<T: FromConfigValue>(&self, key: &ConfigKey) -> Result<TypedStream<T>> {
        Ok(TypedStream::new(self.watch_value(key)?, self.options))
    }

    /// 读取字符串，未命中时返回默认值
    pub fn get_string(&self, key: &ConfigKey, default: &str) -> String {
        self.get(key, default.to_string())
    }

    /// 读取整数，未命中时返回默认值
    pub fn get_int(&self, key: &ConfigKey, default: i64) -> i64 {
        self.get(key, default)
    }

    /// 读取浮点数，未命中时返回默认值
    pub fn get_double(&self, key: &ConfigKey, default: f64) -> f64 {
        self.get(key, default)
    }

    /// 读取布尔值，未命中时返回默认值
    pub fn get_bool(&self, key: &ConfigKey, default: bool) -> bool {
        self.get(key, default)
    }

    /// 读取字符串数组，未命中时返回默认值
    pub fn get_string_array(&self, key: &ConfigKey, default: Vec<String>) -> Vec<String> {
        self.get(key, default)
    }

    /// 读取整数数组，未命中时返回默认值
    pub fn get_int_array(&self, key: &ConfigKey, default: Vec<i64>) -> Vec<i64> {
        self.get(key, default)
    }

    /// 读取浮点数组，未命中时返回默认值
    pub fn get_double_array(&self, key: &ConfigKey, default: Vec<f64>) -> Vec<f64> {
        self.get(key, default)
    }

    /// 读取布尔数组，未命中时返回默认值
    pub fn get_bool_array(&self, key: &ConfigKey, default: Vec<bool>) -> Vec<bool> {
        self.get(key, default)
    }

    /// 读取字节串，未命中时返回默认值
    pub fn get_bytes(&self, key: &ConfigKey, default: Vec<u8>) -> Vec<u8> {
        self.get(key, default)
    }

    /// 读取必需的字符串
    pub fn required_string(&self, key: &ConfigKey, expect_secret: Option<bool>) -> Result<String> {
        self.required(key, expect_secret)
    }

    /// 读取必需的整数
    pub fn required_int(&self, key: &ConfigKey, expect_secret: Option<bool>) -> Result<i64> {
        self.required(key, expect_secret)
    }

    /// 读取必需的浮点数
    pub fn required_double(&self, key: &ConfigKey, expect_secret: Option<bool>) -> Result<f64> {
        self.required(key, expect_secret)
    }

    /// 读取必需的布尔值
    pub fn required_bool(&self, key: &ConfigKey, expect_secret: Option<bool>) -> Result<bool> {
        self.required(key, expect_secret)
    }

    /// 读取必需的字符串数组
    pub fn required_string_array(
        &self,
        key: &ConfigKey,
        expect_secret: Option<bool>,
    ) -> Result<Vec<String>> {
        self.required(key, expect_secret)
    }

    /// 读取必需的整数数组
    pub fn required_int_array(
        &self,
        key: &ConfigKey,
        expect_secret: Option<bool>,
    ) -> Result<Vec<i64>> {
        self.required(key, expect_secret)
    }

    /// 读取必需的浮点数组
    pub fn required_double_array(
        &self,
        key: &ConfigKey,
        expect_secret: Option<bool>,
    ) -> Result<Vec<f64>> {
        self.required(key, expect_secret)
    }

    /// 读取必需的布尔数组
    pub fn required_bool_array(
        &self,
        key: &ConfigKey,
        expect_secret: Option<bool>,
    ) -> Result<Vec<bool>> {
        self.required(key, expect_secret)
    }

    /// 读取必需的字节串
    pub fn required_bytes(&self, key: &ConfigKey, expect_secret: Option<bool>) -> Result<Vec<u8>> {
        self.required(key, expect_secret)
    }

    /// 监听字符串值
    pub fn watch_string(&self, key: &ConfigKey) -> Result<TypedStream<String>> {
        self.watch(key)
    }

    /// 监听整数值
    pub fn watch_int(&self, key: &ConfigKey) -> Result<TypedStream<i64>> {
        self.watch(key)
    }

    /// 监听浮点值
    pub fn watch_double(&self, key: &ConfigKey) -> Result<TypedStream<f64>> {
        self.watch(key)
    }

    /// 监听布尔值
    pub fn watch_bool(&self, key: &ConfigKey) -> Result<TypedStream<bool>> {
        self.watch(key)
    }

    /// 监听字符串数组
    pub fn watch_string_array(&self, key: &ConfigKey) -> Result<TypedStream<Vec<String>>> {
        self.watch(key)
    }

    /// 监听整数数组
    pub fn watch_int_array(&self, key: &ConfigKey) -> Result<TypedStream<Vec<i64>>> {
        self.watch(key)
    }

    /// 监听浮点数组
    pub fn watch_double_array(&self, key: &ConfigKey) -> Result<TypedStream<Vec<f64>>> {
        self.watch(key)
    }

    /// 监听布尔数组
    pub fn watch_bool_array(&self, key: &ConfigKey) -> Result<TypedStream<Vec<bool>>> {
        self.watch(key)
    }

    /// 监听字节串
    pub fn watch_bytes(&self, key: &ConfigKey) -> Result<TypedStream<Vec<u8>>> {
        self.watch(key)
    }
}
