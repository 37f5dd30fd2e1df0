use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfluxError {
    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("{0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// This is error for a response with a non-2xx status code.
    #[error("influxdb api response with non-successful code: {0}. response message is: {1}")]
    StatusError(StatusCode, String),

    /// 2xx 响应中某一条语句执行失败。多条语句中只返回第一条出错语句的错误消息
    #[error("influxdb statement error: {0}")]
    StatementError(String),

    /// 2xx 响应但是响应体为空或者无法解析
    #[error("response body is empty")]
    EmptyBody,
}
