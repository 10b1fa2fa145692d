//! 密级声明模块
//!
//! 声明提供者中哪些配置值属于机密

use crate::error::Result;
use crate::key::AbsoluteConfigKey;
use crate::value::content::ConfigContent;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// 机密判定谓词
pub type SecretPredicate = Arc<dyn Fn(&AbsoluteConfigKey, &ConfigContent) -> bool + Send + Sync>;

/// 密级声明，供提供者在构造或查找时标记机密值
///
/// 声明只决定 `is_secret` 标记，从不改变配置内容
#[derive(Clone, Default)]
pub enum SecretsSpecifier {
    /// 无机密
    #[default]
    None,
    /// 全部为机密
    All,
    /// 指定键集合为机密
    Named(HashSet<AbsoluteConfigKey>),
    /// 按谓词逐键判定
    Predicate(SecretPredicate),
}

impl SecretsSpecifier {
    /// 从点分键名列表构造 `Named` 声明
    ///
    /// # 参数
    /// * `keys` - 点分键名列表
    ///
    /// # 返回
    /// * `Result<Self>` - 任一键名非法时返回 `InvalidKey`
    pub fn named<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for key in keys {
            set.insert(AbsoluteConfigKey::parse(key.as_ref())?);
        }
        Ok(Self::Named(set))
    }

    /// 从闭包构造 `Predicate` 声明
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&AbsoluteConfigKey, &ConfigContent) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// 判定给定键值是否为机密
    pub fn is_secret(&self, key: &AbsoluteConfigKey, content: &ConfigContent) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Named(keys) => keys.contains(key),
            Self::Predicate(predicate) => predicate(key, content),
        }
    }
}

impl fmt::Debug for SecretsSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::All => write!(f, "All"),
            Self::Named(keys) => f.debug_tuple("Named").field(keys).finish(),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
