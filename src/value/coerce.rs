//! 类型转换模块
//!
//! 定义访问器驱动的配置内容到目标类型的转换规则。
//! 存储变体与目标类型精确匹配时直接取出；存储为字符串时按下述规则
//! 重新解析；其余组合一律失败，由读取器降级为"无值"后继续走链。
//! 整数不会被提升为浮点数

use crate::value::content::{ConfigContent, ConfigValue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// 字节串的字符串编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BytesCodec {
    /// 标准 base64 编码
    #[default]
    Base64,
    /// 十六进制编码
    Hex,
}

/// 转换选项，由读取器统一持有并传入每次转换
#[derive(Debug, Clone, Copy)]
pub struct CoerceOptions {
    /// 字符串解析为数组时的分隔符
    pub separator: char,
    /// 字符串解析为字节串时的编码
    pub bytes_codec: BytesCodec,
}

impl Default for CoerceOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            bytes_codec: BytesCodec::Base64,
        }
    }
}

/// 从配置值转换为目标类型
///
/// 转换失败返回 `None`，调用方视作该提供者未命中
pub trait FromConfigValue: Sized {
    /// 尝试转换
    ///
    /// # 参数
    /// * `value` - 待转换的配置值
    /// * `options` - 分隔符与字节编码选项
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self>;
}

/// 布尔字符串解析，大小写不敏感地接受 true/false/1/0
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// 按分隔符切分并逐元素解析，任一元素失败则整个数组失败
fn parse_array<T, F>(raw: &str, separator: char, parse: F) -> Option<Vec<T>>
where
    F: Fn(&str) -> Option<T>,
{
    raw.split(separator).map(|item| parse(item)).collect()
}

impl FromConfigValue for String {
    fn from_value(value: &ConfigValue, _options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromConfigValue for i64 {
    fn from_value(value: &ConfigValue, _options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::Int(v) => Some(*v),
            ConfigContent::String(raw) => raw.parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for f64 {
    fn from_value(value: &ConfigValue, _options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::Double(v) => Some(*v),
            ConfigContent::String(raw) => raw.parse().ok(),
            _ => None,
        }
    }
}

impl FromConfigValue for bool {
    fn from_value(value: &ConfigValue, _options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::Bool(v) => Some(*v),
            ConfigContent::String(raw) => parse_bool(raw),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<String> {
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::StringArray(v) => Some(v.clone()),
            ConfigContent::String(raw) => {
                parse_array(raw, options.separator, |item| Some(item.to_string()))
            }
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<i64> {
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::IntArray(v) => Some(v.clone()),
            ConfigContent::String(raw) => {
                parse_array(raw, options.separator, |item| item.parse().ok())
            }
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<f64> {
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::DoubleArray(v) => Some(v.clone()),
            ConfigContent::String(raw) => {
                parse_array(raw, options.separator, |item| item.parse().ok())
            }
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<bool> {
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::BoolArray(v) => Some(v.clone()),
            ConfigContent::String(raw) => parse_array(raw, options.separator, parse_bool),
            _ => None,
        }
    }
}

impl FromConfigValue for Vec<u8> {
    fn from_value(value: &ConfigValue, options: &CoerceOptions) -> Option<Self> {
        match value.content() {
            ConfigContent::Bytes(v) => Some(v.clone()),
            ConfigContent::String(raw) => match options.bytes_codec {
                BytesCodec::Base64 => BASE64.decode(raw).ok(),
                BytesCodec::Hex => hex::decode(raw).ok(),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(content: ConfigContent) -> ConfigValue {
        ConfigValue::new(content, false)
    }

    fn options() -> CoerceOptions {
        CoerceOptions::default()
    }

    #[test]
    fn test_exact_variant_match() {
        let opts = options();
        assert_eq!(
            i64::from_value(&plain(ConfigContent::Int(42)), &opts),
            Some(42)
        );
        assert_eq!(
            bool::from_value(&plain(ConfigContent::Bool(true)), &opts),
            Some(true)
        );
        assert_eq!(
            <Vec<i64>>::from_value(&plain(ConfigContent::IntArray(vec![1, 2])), &opts),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_string_reparse_scalars() {
        let opts = options();
        assert_eq!(
            i64::from_value(&plain(ConfigContent::String("8080".to_string())), &opts),
            Some(8080)
        );
        assert_eq!(
            f64::from_value(&plain(ConfigContent::String("1.5".to_string())), &opts),
            Some(1.5)
        );
        assert_eq!(
            bool::from_value(&plain(ConfigContent::String("TRUE".to_string())), &opts),
            Some(true)
        );
        assert_eq!(
            bool::from_value(&plain(ConfigContent::String("0".to_string())), &opts),
            Some(false)
        );
        assert_eq!(
            bool::from_value(&plain(ConfigContent::String("yes".to_string())), &opts),
            None
        );
    }

    #[test]
    fn test_no_numeric_promotion() {
        let opts = options();
        // 整数不会被提升为浮点数，反之亦然
        assert_eq!(f64::from_value(&plain(ConfigContent::Int(42)), &opts), None);
        assert_eq!(
            i64::from_value(&plain(ConfigContent::Double(42.0)), &opts),
            None
        );
    }

    #[test]
    fn test_string_only_from_string() {
        let opts = options();
        assert_eq!(
            String::from_value(&plain(ConfigContent::Int(42)), &opts),
            None
        );
        assert_eq!(
            String::from_value(&plain(ConfigContent::String("x".to_string())), &opts),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_int_array_from_string() {
        let opts = options();
        let value = plain(ConfigContent::String("8080,8081,8082".to_string()));
        assert_eq!(
            <Vec<i64>>::from_value(&value, &opts),
            Some(vec![8080, 8081, 8082])
        );
    }

    #[test]
    fn test_array_invalidated_by_single_element() {
        let opts = options();
        let value = plain(ConfigContent::String("8080,oops".to_string()));
        assert_eq!(<Vec<i64>>::from_value(&value, &opts), None);
        // 空白不做修剪，带空格的元素同样解析失败
        let value = plain(ConfigContent::String("8080, 8081".to_string()));
        assert_eq!(<Vec<i64>>::from_value(&value, &opts), None);
    }

    #[test]
    fn test_custom_separator() {
        let opts = CoerceOptions {
            separator: ';',
            ..CoerceOptions::default()
        };
        let value = plain(ConfigContent::String("a;b;c".to_string()));
        assert_eq!(
            <Vec<String>>::from_value(&value, &opts),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_bool_array_from_string() {
        let opts = options();
        let value = plain(ConfigContent::String("true,0,1".to_string()));
        assert_eq!(
            <Vec<bool>>::from_value(&value, &opts),
            Some(vec![true, false, true])
        );
    }

    #[test]
    fn test_bytes_codecs() {
        let base64_opts = options();
        let value = plain(ConfigContent::String("aGVsbG8=".to_string()));
        assert_eq!(
            <Vec<u8>>::from_value(&value, &base64_opts),
            Some(b"hello".to_vec())
        );

        let hex_opts = CoerceOptions {
            bytes_codec: BytesCodec::Hex,
            ..CoerceOptions::default()
        };
        let value = plain(ConfigContent::String("68656c6c6f".to_string()));
        assert_eq!(
            <Vec<u8>>::from_value(&value, &hex_opts),
            Some(b"hello".to_vec())
        );

        // 非法编码使整个值失效
        let value = plain(ConfigContent::String("not-base64!!!".to_string()));
        assert_eq!(<Vec<u8>>::from_value(&value, &base64_opts), None);
    }
}
