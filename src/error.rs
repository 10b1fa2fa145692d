//! 错误处理模块
//!
//! 定义配置解析引擎的统一错误类型

use thiserror::Error;

/// 配置解析引擎的主要错误类型
///
/// 仅构建期错误和显式断言会产生错误值;
/// 查找期的类型转换失败会静默降级为"无值", 不走错误通道
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置键格式非法(空键或空段)
    #[error("无效的配置键: {reason}")]
    InvalidKey { reason: String },

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 配置文档不可读或解析失败
    #[error("配置文档解析失败: {reason}")]
    InvalidDocument { reason: String },

    /// 必需配置项在所有提供者中均未命中
    #[error("缺少必需的配置项: {key}")]
    MissingRequiredKey { key: String },

    /// 配置项密级断言不匹配
    #[error("配置项密级不匹配: {key} (期望 secret={expected}, 实际 secret={actual})")]
    SecretMismatch {
        key: String,
        expected: bool,
        actual: bool,
    },

    /// 提供者链中没有可监听的提供者
    #[error("配置键无法监听: {key}")]
    NotWatchable { key: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ConfigError>;
