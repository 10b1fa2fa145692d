//! Config Stack - 分层配置解析引擎
//!
//! 这是一个用Rust编写的分层配置解析库，支持：
//! - 有序提供者链与首个命中优先的解析
//! - 类型化访问器与字符串宽松转换
//! - JSON/TOML 文档展平、环境变量与 dotenv 来源
//! - 机密值标记与日志脱敏
//! - 可变提供者的实时监听流与后台刷新任务

pub mod error;
pub mod key;
pub mod provider;
pub mod reader;
pub mod refresh;
pub mod value;
pub mod watch;

// 重新导出主要类型
pub use error::{ConfigError, Result};
pub use key::{AbsoluteConfigKey, ConfigKey};
pub use provider::{
    default_document_path, ConfigProvider, EnvProvider, EnvSource, JsonProvider, MutableProvider,
    StaticProvider, TomlProvider, WatchableProvider,
};
pub use reader::ConfigReader;
pub use refresh::{ConfigUpdate, RefreshSource, RefreshTask};
pub use value::{
    BytesCodec, CoerceOptions, ConfigContent, ConfigValue, FromConfigValue, SecretsSpecifier,
};
pub use watch::{TypedStream, ValueStream};

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
