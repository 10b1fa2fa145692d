//! 配置值模块
//!
//! 提供配置内容模型、类型转换规则与密级声明

pub mod coerce;
pub mod content;
pub mod secrets;

// 重新导出主要类型
pub use coerce::{BytesCodec, CoerceOptions, FromConfigValue};
pub use content::{ConfigContent, ConfigValue};
pub use secrets::{SecretPredicate, SecretsSpecifier};
