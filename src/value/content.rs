//! 配置内容模型
//!
//! 定义封闭的配置内容联合类型、密级标记与 JSON 叶子分类逻辑

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::fmt;

/// 配置内容的封闭联合类型
///
/// 覆盖四种标量、四种同质数组与字节串，数组严格保持元素顺序
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigContent {
    /// 字符串
    String(String),
    /// 整数
    Int(i64),
    /// 浮点数
    Double(f64),
    /// 布尔值
    Bool(bool),
    /// 字符串数组
    StringArray(Vec<String>),
    /// 整数数组
    IntArray(Vec<i64>),
    /// 浮点数组
    DoubleArray(Vec<f64>),
    /// 布尔数组
    BoolArray(Vec<bool>),
    /// 字节串
    Bytes(Vec<u8>),
}

impl ConfigContent {
    /// 内容变体的名称，用于日志输出
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::StringArray(_) => "string_array",
            Self::IntArray(_) => "int_array",
            Self::DoubleArray(_) => "double_array",
            Self::BoolArray(_) => "bool_array",
            Self::Bytes(_) => "bytes",
        }
    }

    /// 对 JSON 叶子节点分类
    ///
    /// 标量一一对应；数组按 int、double、bool、string 的顺序尝试整体归类，
    /// 全数值数组只要含有浮点数即归为浮点数组。
    /// null、对象、异质数组与空数组无法归类，返回 `None` 由调用方跳过
    ///
    /// # 参数
    /// * `value` - 待分类的 JSON 节点
    ///
    /// # 返回
    /// * `Option<Self>` - 可归类时返回对应变体
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    n.as_f64().map(Self::Double)
                }
            }
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Array(items) => Self::classify_array(items),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// 同质数组归类
    fn classify_array(items: &[serde_json::Value]) -> Option<Self> {
        if items.is_empty() {
            // 空数组推断不出元素类型
            return None;
        }
        if let Some(ints) = items
            .iter()
            .map(serde_json::Value::as_i64)
            .collect::<Option<Vec<_>>>()
        {
            return Some(Self::IntArray(ints));
        }
        if let Some(doubles) = items
            .iter()
            .map(serde_json::Value::as_f64)
            .collect::<Option<Vec<_>>>()
        {
            return Some(Self::DoubleArray(doubles));
        }
        if let Some(bools) = items
            .iter()
            .map(serde_json::Value::as_bool)
            .collect::<Option<Vec<_>>>()
        {
            return Some(Self::BoolArray(bools));
        }
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Self::StringArray)
    }
}

impl fmt::Display for ConfigContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::StringArray(v) => write!(f, "{v:?}"),
            Self::IntArray(v) => write!(f, "{v:?}"),
            Self::DoubleArray(v) => write!(f, "{v:?}"),
            Self::BoolArray(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "{}", BASE64.encode(v)),
        }
    }
}

/// 配置值，内容加密级标记，构造后不可变
///
/// 密级标记只影响日志脱敏与读取端的密级断言，从不改变内容本身。
/// `Debug` 与 `Display` 对机密值输出 `<secret>`，防止日志泄露
#[derive(Clone, PartialEq)]
pub struct ConfigValue {
    content: ConfigContent,
    is_secret: bool,
}

impl ConfigValue {
    /// 构造配置值
    ///
    /// # 参数
    /// * `content` - 配置内容
    /// * `is_secret` - 是否为机密值
    pub fn new(content: ConfigContent, is_secret: bool) -> Self {
        Self { content, is_secret }
    }

    /// 配置内容
    pub fn content(&self) -> &ConfigContent {
        &self.content
    }

    /// 是否为机密值
    pub fn is_secret(&self) -> bool {
        self.is_secret
    }
}

impl From<ConfigContent> for ConfigValue {
    fn from(content: ConfigContent) -> Self {
        Self::new(content, false)
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ConfigValue");
        if self.is_secret {
            debug.field("content", &"<secret>");
        } else {
            debug.field("content", &self.content);
        }
        debug.field("is_secret", &self.is_secret).finish()
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_secret {
            write!(f, "<secret>")
        } else {
            write!(f, "{}", self.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            ConfigContent::from_json(&json!("hello")),
            Some(ConfigContent::String("hello".to_string()))
        );
        assert_eq!(
            ConfigContent::from_json(&json!(42)),
            Some(ConfigContent::Int(42))
        );
        assert_eq!(
            ConfigContent::from_json(&json!(1.5)),
            Some(ConfigContent::Double(1.5))
        );
        assert_eq!(
            ConfigContent::from_json(&json!(true)),
            Some(ConfigContent::Bool(true))
        );
    }

    #[test]
    fn test_from_json_homogeneous_arrays() {
        assert_eq!(
            ConfigContent::from_json(&json!([8080, 8081])),
            Some(ConfigContent::IntArray(vec![8080, 8081]))
        );
        assert_eq!(
            ConfigContent::from_json(&json!([true, false])),
            Some(ConfigContent::BoolArray(vec![true, false]))
        );
        assert_eq!(
            ConfigContent::from_json(&json!(["a", "b"])),
            Some(ConfigContent::StringArray(vec![
                "a".to_string(),
                "b".to_string()
            ]))
        );
    }

    #[test]
    fn test_from_json_numeric_array_with_float_is_double() {
        assert_eq!(
            ConfigContent::from_json(&json!([1, 2.5])),
            Some(ConfigContent::DoubleArray(vec![1.0, 2.5]))
        );
    }

    #[test]
    fn test_from_json_unclassifiable_leaves() {
        assert_eq!(ConfigContent::from_json(&json!(null)), None);
        assert_eq!(ConfigContent::from_json(&json!({"a": 1})), None);
        assert_eq!(ConfigContent::from_json(&json!(["a", 1])), None);
        assert_eq!(ConfigContent::from_json(&json!([])), None);
    }

    #[test]
    fn test_secret_value_redacted_in_debug_and_display() {
        let value = ConfigValue::new(ConfigContent::String("p@ssw0rd".to_string()), true);
        let debug = format!("{value:?}");
        let display = format!("{value}");
        assert!(!debug.contains("p@ssw0rd"));
        assert!(debug.contains("<secret>"));
        assert_eq!(display, "<secret>");
    }

    #[test]
    fn test_plain_value_visible_in_display() {
        let value = ConfigValue::new(ConfigContent::Int(8080), false);
        assert_eq!(value.to_string(), "8080");
        assert!(format!("{value:?}").contains("8080"));
    }
}
