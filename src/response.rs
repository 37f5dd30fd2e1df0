//! 查询接口的响应模型。
//!
//! 响应体是一个 JSON 文档，`results` 数组中每个元素对应请求中的一条语句。
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/tools/api/#query-http-endpoint>

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{error::InfluxError, InfluxResult};

/// 展开之后的一行数据。列名和标签名都是键，标签和列同名的时候标签值覆盖列值
pub type FlatRow = Map<String, Value>;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) results: Vec<StatementResult>,
}

/// 一条语句的执行结果
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResult {
    /// 语句返回的序列。没有数据的语句这里是空的
    #[serde(default)]
    pub series: Vec<Series>,

    /// 语句级错误消息
    #[serde(default)]
    pub error: Option<String>,
}

/// 语句结果中的一个序列。一个序列共享同一组列定义
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,

    /// 序列的标签。标签值在响应中都是字符串
    #[serde(default)]
    pub tags: Map<String, Value>,

    /// 列名，和 `values` 中每一行的元素按位置对应
    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// 从非 2xx 响应体中提取错误消息。结构化的 `error` 字段优先，取不到就返回原始文本
pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> InfluxError {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) => message,
        _ => String::from_utf8_lossy(body).into_owned(),
    };

    InfluxError::StatusError(status, message)
}

/// 读取响应并做完整的结果判定：
///
/// - 非 2xx 状态码直接报错；
/// - 2xx 但是响应体为空或者不是合法 JSON，报 [`InfluxError::EmptyBody`]；
/// - `results` 按数组顺序检查，遇到第一条带非空 `error` 的语句就以该消息报错，
///   即使前面的语句执行成功也不保留部分结果；
/// - 以上都通过的时候原样返回 `results` 数组
pub(crate) async fn read_results(response: Response) -> InfluxResult<Vec<StatementResult>> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    if body.is_empty() {
        return Err(InfluxError::EmptyBody);
    }

    let decoded: QueryResponse = match serde_json::from_slice(&body) {
        Ok(d) => d,
        Err(e) => {
            log::debug!("response body is not a valid json document: {}", e);
            return Err(InfluxError::EmptyBody);
        }
    };

    for result in &decoded.results {
        if let Some(message) = &result.error {
            if !message.is_empty() {
                return Err(InfluxError::StatementError(message.clone()));
            }
        }
    }

    Ok(decoded.results)
}

/// 只检查状态码的响应判定，写入接口使用。2xx 就算成功，响应体不做解析
pub(crate) async fn ensure_success(response: Response) -> InfluxResult<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    let body = response.bytes().await?;
    Err(status_error(status, &body))
}

/// 把语句结果展开成行。
///
/// 每条语句输出一个行集合，语句内先按序列顺序、序列内再按行顺序拼接。
/// 每一行先按位置把列名和值配对，然后把序列的标签合并进来，标签和列同名时标签值覆盖列值。
/// 没有序列的语句输出空集合，所以输出的长度总是等于语句数量
pub fn flatten(results: &[StatementResult]) -> Vec<Vec<FlatRow>> {
    results
        .iter()
        .map(|statement| {
            let mut rows = Vec::new();

            for series in &statement.series {
                for values in &series.values {
                    let mut row = FlatRow::new();

                    for (column, value) in series.columns.iter().zip(values) {
                        row.insert(column.clone(), value.clone());
                    }

                    for (key, value) in &series.tags {
                        row.insert(key.clone(), value.clone());
                    }

                    rows.push(row);
                }
            }

            rows
        })
        .collect()
}
