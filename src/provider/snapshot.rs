//! 静态快照提供者
//!
//! 构造后不可变的键值映射，查找即一次映射读取

use crate::key::AbsoluteConfigKey;
use crate::provider::ConfigProvider;
use crate::value::{ConfigContent, ConfigValue, SecretsSpecifier};
use std::collections::HashMap;

/// 静态提供者，持有构造时固定的键值映射
///
/// 线程安全由不可变性保证。空实例常被追加在链尾，
/// 保证链中总有提供者兜底
#[derive(Debug)]
pub struct StaticProvider {
    name: String,
    values: HashMap<AbsoluteConfigKey, ConfigValue>,
}

impl StaticProvider {
    /// 从现成的键值映射构造
    pub fn new(name: &str, values: HashMap<AbsoluteConfigKey, ConfigValue>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    /// 从内容映射与密级声明构造，每个值的密级由声明判定
    ///
    /// # 参数
    /// * `name` - 提供者名称
    /// * `entries` - 键到内容的映射
    /// * `secrets` - 密级声明
    pub fn with_secrets(
        name: &str,
        entries: HashMap<AbsoluteConfigKey, ConfigContent>,
        secrets: &SecretsSpecifier,
    ) -> Self {
        let values = entries
            .into_iter()
            .map(|(key, content)| {
                let is_secret = secrets.is_secret(&key, &content);
                (key, ConfigValue::new(content, is_secret))
            })
            .collect();
        Self {
            name: name.to_string(),
            values,
        }
    }

    /// 构造空提供者
    pub fn empty(name: &str) -> Self {
        Self::new(name, HashMap::new())
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否不含任何条目
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }
}
