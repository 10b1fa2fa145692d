//! 文档型提供者
//!
//! 把 JSON 或 TOML 文档递归展平为键值快照后提供查找。
//! 嵌套对象的字段名逐层追加为键段，叶子按内容模型归类，
//! 无法归类的叶子跳过不报错

use crate::error::{ConfigError, Result};
use crate::key::AbsoluteConfigKey;
use crate::provider::snapshot::StaticProvider;
use crate::provider::ConfigProvider;
use crate::value::{ConfigContent, ConfigValue, SecretsSpecifier};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// JSON 文档提供者
///
/// 构造时把文档展平为静态快照，之后的查找与静态提供者一致
#[derive(Debug)]
pub struct JsonProvider {
    snapshot: StaticProvider,
}

impl JsonProvider {
    /// 从已解析的 JSON 文档构造
    ///
    /// # 参数
    /// * `name` - 提供者名称
    /// * `document` - JSON 文档，顶层必须是对象
    /// * `secrets` - 密级声明
    ///
    /// # 返回
    /// * `Result<Self>` - 顶层不是对象时返回 `InvalidDocument`
    pub fn from_value(
        name: &str,
        document: &serde_json::Value,
        secrets: &SecretsSpecifier,
    ) -> Result<Self> {
        Ok(Self {
            snapshot: snapshot_from_document(name, document, secrets)?,
        })
    }

    /// 从 JSON 文本构造
    ///
    /// # 返回
    /// * `Result<Self>` - 解析失败时返回 `InvalidDocument`
    pub fn from_str(name: &str, content: &str, secrets: &SecretsSpecifier) -> Result<Self> {
        let document: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConfigError::InvalidDocument {
                reason: format!("JSON 解析失败: {e}"),
            })?;
        Self::from_value(name, &document, secrets)
    }

    /// 从 JSON 文件构造
    ///
    /// # 返回
    /// * `Result<Self>` - 文件不存在时返回 `FileNotFound`，
    ///   不可读或解析失败时返回 `InvalidDocument`
    pub fn from_path(
        name: &str,
        path: impl AsRef<Path>,
        secrets: &SecretsSpecifier,
    ) -> Result<Self> {
        let content = read_document(path.as_ref())?;
        let provider = Self::from_str(name, &content, secrets)?;
        info!(
            "成功加载 JSON 配置文档: {} ({} 项)",
            path.as_ref().display(),
            provider.len()
        );
        Ok(provider)
    }

    /// 展平后的条目数量
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// 是否不含任何条目
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

impl ConfigProvider for JsonProvider {
    fn name(&self) -> &str {
        self.snapshot.name()
    }

    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue> {
        self.snapshot.lookup(key)
    }
}

/// TOML 文档提供者
///
/// TOML 值先转换为 JSON 值，之后与 JSON 提供者走同一条展平路径；
/// 日期时间等 JSON 没有的类型转换为字符串内容
#[derive(Debug)]
pub struct TomlProvider {
    snapshot: StaticProvider,
}

impl TomlProvider {
    /// 从 TOML 文本构造
    ///
    /// # 返回
    /// * `Result<Self>` - 解析失败时返回 `InvalidDocument`
    pub fn from_str(name: &str, content: &str, secrets: &SecretsSpecifier) -> Result<Self> {
        let document: toml::Value =
            toml::from_str(content).map_err(|e| ConfigError::InvalidDocument {
                reason: format!("TOML 解析失败: {e}"),
            })?;
        let json = toml_to_json(&document);
        Ok(Self {
            snapshot: snapshot_from_document(name, &json, secrets)?,
        })
    }

    /// 从 TOML 文件构造
    ///
    /// # 返回
    /// * `Result<Self>` - 文件不存在时返回 `FileNotFound`，
    ///   不可读或解析失败时返回 `InvalidDocument`
    pub fn from_path(
        name: &str,
        path: impl AsRef<Path>,
        secrets: &SecretsSpecifier,
    ) -> Result<Self> {
        let content = read_document(path.as_ref())?;
        let provider = Self::from_str(name, &content, secrets)?;
        info!(
            "成功加载 TOML 配置文档: {} ({} 项)",
            path.as_ref().display(),
            provider.len()
        );
        Ok(provider)
    }

    /// 展平后的条目数量
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// 是否不含任何条目
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

impl ConfigProvider for TomlProvider {
    fn name(&self) -> &str {
        self.snapshot.name()
    }

    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue> {
        self.snapshot.lookup(key)
    }
}

/// 把 TOML 值转换为 JSON 值，日期时间转换为其字符串表示
fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s.clone()),
        toml::Value::Integer(i) => serde_json::Value::from(*i),
        toml::Value::Float(f) => serde_json::Value::from(*f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(*b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(field, item)| (field.clone(), toml_to_json(item)))
                .collect(),
        ),
    }
}

/// 读取文档文件内容
fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidDocument {
        reason: format!("读取文件失败: {}: {e}", path.display()),
    })
}

/// 把文档展平为静态快照
fn snapshot_from_document(
    name: &str,
    document: &serde_json::Value,
    secrets: &SecretsSpecifier,
) -> Result<StaticProvider> {
    let serde_json::Value::Object(root) = document else {
        return Err(ConfigError::InvalidDocument {
            reason: "配置文档顶层必须是对象".to_string(),
        });
    };
    let mut entries = HashMap::new();
    flatten_object(None, root, &mut entries);
    Ok(StaticProvider::with_secrets(name, entries, secrets))
}

/// 递归展平对象，嵌套对象递归下探，叶子归类后收集
fn flatten_object(
    prefix: Option<&AbsoluteConfigKey>,
    object: &serde_json::Map<String, serde_json::Value>,
    entries: &mut HashMap<AbsoluteConfigKey, ConfigContent>,
) {
    for (field, value) in object {
        let key = match prefix {
            Some(parent) => parent.child(field),
            None => AbsoluteConfigKey::from_segments(vec![field.clone()]),
        };
        let Ok(key) = key else {
            debug!("跳过字段名为空的配置项");
            continue;
        };
        match value {
            serde_json::Value::Object(nested) => flatten_object(Some(&key), nested, entries),
            leaf => match ConfigContent::from_json(leaf) {
                Some(content) => {
                    entries.insert(key, content);
                }
                None => debug!("跳过无法归类的配置叶子: key={key}"),
            },
        }
    }
}

/// 获取默认配置文档路径
///
/// 当前目录存在同名文件时优先使用，否则落到用户配置目录下的应用子目录
pub fn default_document_path(app_name: &str, file_name: &str) -> PathBuf {
    if Path::new(file_name).exists() {
        PathBuf::from(file_name)
    } else {
        dirs::config_dir()
            .map(|config_dir| config_dir.join(app_name).join(file_name))
            .unwrap_or_else(|| PathBuf::from(file_name))
    }
}
