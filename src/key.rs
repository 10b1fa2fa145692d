//! 配置键模型
//!
//! 定义分段配置键及其解析、环境变量名转换逻辑

use crate::error::{ConfigError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 绝对配置键，由非空的有序段列表构成
///
/// 在提供者内部作为映射键使用，相等性与哈希仅基于段列表
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AbsoluteConfigKey {
    segments: Vec<String>,
}

impl AbsoluteConfigKey {
    /// 从点分字符串解析配置键
    ///
    /// # 参数
    /// * `dotted` - 点分键名，如 `http.server.timeout`
    ///
    /// # 返回
    /// * `Result<Self>` - 输入为空或任一段为空时返回 `InvalidKey`
    pub fn parse(dotted: &str) -> Result<Self> {
        Self::from_segments(dotted.split('.').map(str::to_string).collect())
    }

    /// 从段列表构造配置键
    ///
    /// # 参数
    /// * `segments` - 键的有序段列表
    ///
    /// # 返回
    /// * `Result<Self>` - 列表为空或包含空段时返回 `InvalidKey`
    pub fn from_segments(segments: Vec<String>) -> Result<Self> {
        if segments.is_empty() {
            return Err(ConfigError::InvalidKey {
                reason: "配置键不能为空".to_string(),
            });
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::InvalidKey {
                reason: format!("配置键包含空段: {segments:?}"),
            });
        }
        Ok(Self { segments })
    }

    /// 追加一个子段，生成新键
    ///
    /// # 参数
    /// * `segment` - 要追加的段
    ///
    /// # 返回
    /// * `Result<Self>` - 段为空时返回 `InvalidKey`
    pub fn child(&self, segment: &str) -> Result<Self> {
        if segment.is_empty() {
            return Err(ConfigError::InvalidKey {
                reason: format!("不能向 {} 追加空段", self),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// 键的段列表
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 转换为环境变量名
    ///
    /// 每段内的小驼峰边界展开为下划线并整体大写，段之间以下划线连接；
    /// 连续大写的缩写串保持完整。
    /// 例如 `["api", "serverTimeout"]` 得到 `API_SERVER_TIMEOUT`，
    /// `["api", "baseURL"]` 得到 `API_BASE_URL`
    pub fn to_env_name(&self) -> String {
        self.segments
            .iter()
            .map(|s| camel_to_upper_snake(s))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for AbsoluteConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// 将单个小驼峰段展开为大写下划线形式
fn camel_to_upper_snake(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            // 缩写串结束、新单词开始的位置，如 baseURLPath 中的 P
            let acronym_end = i > 0
                && chars[i - 1].is_ascii_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_ascii_lowercase();
            if after_lower || acronym_end {
                out.push('_');
            }
            out.push(c);
        } else {
            out.push(c.to_ascii_uppercase());
        }
    }
    out
}

/// 配置键，在绝对键之上附加可选的上下文属性
///
/// 上下文仅作为辅助信息随查找传递，不参与相等性与哈希，
/// 提供者解析时只使用绝对键部分
#[derive(Debug, Clone, Serialize)]
pub struct ConfigKey {
    key: AbsoluteConfigKey,
    context: Option<HashMap<String, String>>,
}

impl ConfigKey {
    /// 从绝对键构造，不携带上下文
    pub fn new(key: AbsoluteConfigKey) -> Self {
        Self { key, context: None }
    }

    /// 从绝对键和上下文构造
    pub fn with_context(key: AbsoluteConfigKey, context: HashMap<String, String>) -> Self {
        Self {
            key,
            context: Some(context),
        }
    }

    /// 从点分字符串解析，不携带上下文
    pub fn parse(dotted: &str) -> Result<Self> {
        Ok(Self::new(AbsoluteConfigKey::parse(dotted)?))
    }

    /// 绝对键部分
    pub fn absolute(&self) -> &AbsoluteConfigKey {
        &self.key
    }

    /// 上下文属性
    pub fn context(&self) -> Option<&HashMap<String, String>> {
        self.context.as_ref()
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ConfigKey {}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl From<AbsoluteConfigKey> for ConfigKey {
    fn from(key: AbsoluteConfigKey) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
