use std::fmt::Display;

use chrono::{DateTime, Utc};

/// 数据点中字段的值。写入时就已经确定了类型，不同类型在行协议中的编码方式不同
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    String(String),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// 标签的值。一般来说标签值都是字符串，但是数字和布尔值也可以直接写入，
/// 编码的时候数字和布尔值不做转义处理
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// 数据点的时间戳。
///
/// - [`Timestamp::Epoch`] 的值原样输出，调用者自己保证和写入请求的 `precision` 参数一致；
/// - [`Timestamp::Date`] 的值固定转换成毫秒时间戳输出。
///
/// 不设置时间戳的数据点由服务端在写入的时候补上服务器时间
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Epoch(i64),
    Date(DateTime<Utc>),
}

impl Timestamp {
    pub(crate) fn as_epoch(&self) -> i64 {
        match self {
            Self::Epoch(n) => *n,
            Self::Date(d) => d.timestamp_millis(),
        }
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self::Epoch(value)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// 时间戳精度。客户端只负责透传，不校验服务端是否支持。
///
/// 官方文档：<https://docs.influxdata.com/influxdb/v1/tools/api/#write-http-endpoint>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Precision::Nanoseconds => "n",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        };

        write!(f, "{}", s)
    }
}

impl From<Precision> for String {
    fn from(value: Precision) -> Self {
        value.to_string()
    }
}
