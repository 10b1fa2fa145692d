//! 环境变量提供者
//!
//! 按键的环境变量名从进程环境、给定映射或 dotenv 文件取值。
//! 取到的始终是原始字符串内容，类型转换推迟到读取端执行

use crate::error::{ConfigError, Result};
use crate::key::AbsoluteConfigKey;
use crate::provider::ConfigProvider;
use crate::value::{ConfigContent, ConfigValue, SecretsSpecifier};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// 环境变量来源
#[derive(Debug, Clone)]
pub enum EnvSource {
    /// 进程环境
    Process,
    /// 给定的名值映射，dotenv 文件的解析结果也落到这里
    Map(HashMap<String, String>),
}

/// 环境变量提供者
///
/// 查找时把键转换为环境变量名再查来源，缺失即未命中
#[derive(Debug)]
pub struct EnvProvider {
    name: String,
    source: EnvSource,
    secrets: SecretsSpecifier,
}

impl EnvProvider {
    /// 以进程环境为来源构造
    pub fn process(name: &str, secrets: SecretsSpecifier) -> Self {
        Self {
            name: name.to_string(),
            source: EnvSource::Process,
            secrets,
        }
    }

    /// 以给定映射为来源构造
    pub fn from_map(name: &str, vars: HashMap<String, String>, secrets: SecretsSpecifier) -> Self {
        Self {
            name: name.to_string(),
            source: EnvSource::Map(vars),
            secrets,
        }
    }

    /// 从 dotenv 文本构造
    ///
    /// 支持 `KEY=VALUE` 行、`export ` 前缀、`#` 注释与单双引号包裹；
    /// 无法解析的行跳过并告警
    pub fn from_dotenv_str(name: &str, content: &str, secrets: SecretsSpecifier) -> Result<Self> {
        let vars = parse_dotenv(content)?;
        Ok(Self::from_map(name, vars, secrets))
    }

    /// 从 dotenv 文件构造
    ///
    /// # 返回
    /// * `Result<Self>` - 文件不存在时返回 `FileNotFound`，
    ///   不可读时返回 `InvalidDocument`
    pub fn from_dotenv_path(
        name: &str,
        path: impl AsRef<Path>,
        secrets: SecretsSpecifier,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidDocument {
            reason: format!("读取文件失败: {}: {e}", path.display()),
        })?;
        let provider = Self::from_dotenv_str(name, &content, secrets)?;
        if let EnvSource::Map(vars) = &provider.source {
            info!(
                "成功加载 dotenv 文件: {} ({} 项)",
                path.display(),
                vars.len()
            );
        }
        Ok(provider)
    }
}

impl ConfigProvider for EnvProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &AbsoluteConfigKey) -> Option<ConfigValue> {
        let env_name = key.to_env_name();
        let raw = match &self.source {
            EnvSource::Process => std::env::var(&env_name).ok(),
            EnvSource::Map(vars) => vars.get(&env_name).cloned(),
        }?;
        let content = ConfigContent::String(raw);
        let is_secret = self.secrets.is_secret(key, &content);
        Some(ConfigValue::new(content, is_secret))
    }
}

/// 解析 dotenv 文本为名值映射
fn parse_dotenv(content: &str) -> Result<HashMap<String, String>> {
    // 匹配可带 export 前缀的 KEY=VALUE 行
    let line_regex = Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").map_err(
        |e| ConfigError::InvalidDocument {
            reason: format!("正则表达式错误: {e}"),
        },
    )?;

    let mut vars = HashMap::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line_regex.captures(line) {
            Some(captures) => {
                let name = captures[1].to_string();
                let value = unquote(captures[2].trim()).to_string();
                vars.insert(name, value);
            }
            None => warn!("跳过无法解析的 dotenv 行: 第 {} 行", index + 1),
        }
    }
    Ok(vars)
}

/// 去除成对的单引号或双引号
fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
