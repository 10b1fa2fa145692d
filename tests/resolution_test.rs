//! 配置解析集成测试
//!
//! 覆盖提供者链优先级、类型转换回退、文档展平、
//! 环境变量命名与密级断言的端到端行为

use config_stack::{
    AbsoluteConfigKey, BytesCodec, CoerceOptions, ConfigContent, ConfigError, ConfigKey,
    ConfigProvider, ConfigReader, ConfigValue, EnvProvider, JsonProvider, SecretsSpecifier,
    StaticProvider, TomlProvider,
};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn key(dotted: &str) -> ConfigKey {
    ConfigKey::parse(dotted).unwrap()
}

fn absolute(dotted: &str) -> AbsoluteConfigKey {
    AbsoluteConfigKey::parse(dotted).unwrap()
}

fn static_with(name: &str, entries: &[(&str, ConfigContent)]) -> Arc<StaticProvider> {
    let values = entries
        .iter()
        .map(|(dotted, content)| {
            (
                absolute(dotted),
                ConfigValue::new(content.clone(), false),
            )
        })
        .collect();
    Arc::new(StaticProvider::new(name, values))
}

fn env_with(name: &str, vars: &[(&str, &str)]) -> Arc<EnvProvider> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(EnvProvider::from_map(name, map, SecretsSpecifier::None))
}

#[test]
fn test_chain_priority_overrides() {
    // 环境来源优先于文档来源，文档来源优先于默认值
    let env = env_with("env", &[("SERVER_PORT", "9000")]);
    let document = JsonProvider::from_str(
        "document",
        r#"{"server": {"port": 8080, "host": "doc.internal"}}"#,
        &SecretsSpecifier::None,
    )
    .unwrap();
    let defaults = static_with(
        "defaults",
        &[
            ("server.port", ConfigContent::Int(80)),
            ("server.host", ConfigContent::String("localhost".to_string())),
            ("server.workers", ConfigContent::Int(4)),
        ],
    );
    let reader = ConfigReader::new(vec![env, Arc::new(document), defaults]);

    // 环境值是字符串，类型化读取按字符串规则解析
    assert_eq!(reader.get_int(&key("server.port"), 0), 9000);
    // 环境未定义的键落到文档
    assert_eq!(reader.get_string(&key("server.host"), ""), "doc.internal");
    // 文档也未定义的键落到默认提供者
    assert_eq!(reader.get_int(&key("server.workers"), 0), 4);
    // 哪里都没有的键用调用方默认值
    assert_eq!(reader.get_int(&key("server.threads"), 16), 16);
}

#[test]
fn test_coercion_failure_falls_through_chain() {
    let env = env_with("env", &[("SERVER_PORT", "oops")]);
    let defaults = static_with("defaults", &[("server.port", ConfigContent::Int(8080))]);
    let reader = ConfigReader::new(vec![env, defaults]);

    // 类型化读取跳过无法解析的环境值
    assert_eq!(reader.get_int(&key("server.port"), 0), 8080);
    // 原始读取仍返回链中首个命中
    assert_eq!(
        reader.get_value(&key("server.port")),
        Some(ConfigValue::new(
            ConfigContent::String("oops".to_string()),
            false
        ))
    );
}

#[test]
fn test_int_array_parsing_and_invalidation() {
    let good = env_with("good", &[("SERVER_PORTS", "8080,8081,8082")]);
    let reader = ConfigReader::new(vec![good]);
    assert_eq!(
        reader.get_int_array(&key("server.ports"), vec![]),
        vec![8080, 8081, 8082]
    );

    // 任一元素非法使整个数组失效，落到默认值
    let bad = env_with("bad", &[("SERVER_PORTS", "8080,oops")]);
    let reader = ConfigReader::new(vec![bad]);
    assert_eq!(
        reader.get_int_array(&key("server.ports"), vec![1]),
        vec![1]
    );
}

#[test]
fn test_json_file_flattening() -> anyhow::Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        r#"{
  "api": {"baseURL": "https://x", "timeout": 30},
  "features": {"beta": null, "mixed": ["a", 1]}
}"#,
    )?;

    let provider = JsonProvider::from_path("json", file.path(), &SecretsSpecifier::None)?;

    // null 与异质数组叶子被跳过，只剩两个条目
    assert_eq!(provider.len(), 2);
    assert_eq!(
        provider.lookup(&absolute("api.baseURL")),
        Some(ConfigValue::new(
            ConfigContent::String("https://x".to_string()),
            false
        ))
    );
    assert_eq!(
        provider.lookup(&absolute("api.timeout")),
        Some(ConfigValue::new(ConfigContent::Int(30), false))
    );
    Ok(())
}

#[test]
fn test_toml_file_provider() -> anyhow::Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        r#"
[database]
host = "db.internal"
port = 5432
replicas = ["a", "b"]
"#,
    )?;

    let provider = TomlProvider::from_path("toml", file.path(), &SecretsSpecifier::None)?;
    let reader = ConfigReader::new(vec![Arc::new(provider)]);

    assert_eq!(
        reader.get_string(&key("database.host"), ""),
        "db.internal"
    );
    assert_eq!(reader.get_int(&key("database.port"), 0), 5432);
    assert_eq!(
        reader.get_string_array(&key("database.replicas"), vec![]),
        vec!["a".to_string(), "b".to_string()]
    );
    Ok(())
}

#[test]
fn test_dotenv_file_provider() -> anyhow::Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        r#"
# 数据库配置
export DATABASE_HOST="db.internal"
DATABASE_PORT=5432
API_SERVER_TIMEOUT=30
"#,
    )?;

    let provider = EnvProvider::from_dotenv_path("dotenv", file.path(), SecretsSpecifier::None)?;
    let reader = ConfigReader::new(vec![Arc::new(provider)]);

    assert_eq!(reader.get_string(&key("database.host"), ""), "db.internal");
    assert_eq!(reader.get_int(&key("database.port"), 0), 5432);
    // 小驼峰段展开到同一个环境变量名
    assert_eq!(reader.get_int(&key("api.serverTimeout"), 0), 30);
    Ok(())
}

#[test]
#[serial]
fn test_process_env_naming() {
    std::env::set_var("HTTP_SERVER_TIMEOUT", "45");
    std::env::set_var("DATABASE_HOST", "prod.db");

    let provider = Arc::new(EnvProvider::process("process", SecretsSpecifier::None));
    let reader = ConfigReader::new(vec![provider]);

    assert_eq!(reader.get_int(&key("http.server.timeout"), 0), 45);
    assert_eq!(reader.get_string(&key("database.host"), ""), "prod.db");

    std::env::remove_var("HTTP_SERVER_TIMEOUT");
    std::env::remove_var("DATABASE_HOST");

    assert_eq!(reader.get_int(&key("http.server.timeout"), 7), 7);
}

#[test]
fn test_document_error_mapping() {
    let missing = JsonProvider::from_path(
        "json",
        "/nonexistent/config-stack-it.json",
        &SecretsSpecifier::None,
    );
    assert!(matches!(missing, Err(ConfigError::FileNotFound { .. })));

    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{broken").unwrap();
    let invalid = JsonProvider::from_path("json", file.path(), &SecretsSpecifier::None);
    assert!(matches!(invalid, Err(ConfigError::InvalidDocument { .. })));

    let array_top = JsonProvider::from_str("json", "[1, 2]", &SecretsSpecifier::None);
    assert!(matches!(
        array_top,
        Err(ConfigError::InvalidDocument { .. })
    ));
}

#[test]
fn test_required_and_secret_assertions() {
    let secrets = SecretsSpecifier::named(["auth.apiToken"]).unwrap();
    let document = JsonProvider::from_str(
        "document",
        r#"{"auth": {"apiToken": "s3cr3t", "endpoint": "https://x"}}"#,
        &secrets,
    )
    .unwrap();
    let reader = ConfigReader::new(vec![Arc::new(document)]);

    // 机密值断言一致
    assert_eq!(
        reader
            .required_string(&key("auth.apiToken"), Some(true))
            .unwrap(),
        "s3cr3t"
    );

    // 普通值断言为机密时报错
    let mismatch = reader.required_string(&key("auth.endpoint"), Some(true));
    assert!(matches!(
        mismatch,
        Err(ConfigError::SecretMismatch {
            expected: true,
            actual: false,
            ..
        })
    ));

    // 所有提供者耗尽
    let missing = reader.required_int(&key("auth.retries"), None);
    assert!(matches!(
        missing,
        Err(ConfigError::MissingRequiredKey { .. })
    ));
}

#[test]
fn test_secret_values_redacted_in_logs() {
    let secrets = SecretsSpecifier::All;
    let mut vars = HashMap::new();
    vars.insert("AUTH_TOKEN".to_string(), "hunter2".to_string());
    let provider = Arc::new(EnvProvider::from_map("env", vars, secrets));
    let reader = ConfigReader::new(vec![provider]);

    let value = reader.get_value(&key("auth.token")).unwrap();
    assert!(value.is_secret());
    // 调试输出不包含明文
    assert!(!format!("{value:?}").contains("hunter2"));
    assert_eq!(value.to_string(), "<secret>");
    // 内容本身保持原样
    assert_eq!(
        value.content(),
        &ConfigContent::String("hunter2".to_string())
    );
}

#[test]
fn test_custom_coerce_options() {
    let env = env_with(
        "env",
        &[("APP_REGIONS", "cn;us;eu"), ("APP_BLOB", "68656c6c6f")],
    );
    let options = CoerceOptions {
        separator: ';',
        bytes_codec: BytesCodec::Hex,
    };
    let reader = ConfigReader::with_options(vec![env], options);

    assert_eq!(
        reader.get_string_array(&key("app.regions"), vec![]),
        vec!["cn".to_string(), "us".to_string(), "eu".to_string()]
    );
    assert_eq!(
        reader.get_bytes(&key("app.blob"), vec![]),
        b"hello".to_vec()
    );
}

#[test]
fn test_empty_static_provider_as_safety_net() {
    let reader = ConfigReader::new(vec![Arc::new(StaticProvider::empty("fallback"))]);

    assert_eq!(reader.get_int(&key("any.key"), 42), 42);
    assert_eq!(reader.try_get::<String>(&key("any.key")), None);
    assert_eq!(reader.provider_names(), vec!["fallback"]);
}
