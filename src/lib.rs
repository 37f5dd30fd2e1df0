use std::{fmt::Display, time::Duration};

use bytes::Bytes;
use reqwest::Response;
use url::Url;

use continuous_query::{
    CreateContinuousQueryOperation, CreateContinuousQueryRequest, DropContinuousQueryOperation, DropContinuousQueryRequest, ListContinuousQueryOperation,
};
use database::{CreateDatabaseOperation, CreateDatabaseRequest, DropDatabaseOperation, ListDatabaseOperation};
use error::InfluxError;
use measurement::{DropMeasurementOperation, ListMeasurementOperation, ListMeasurementRequest};
use model::{MeasurementBatch, Point, Precision};
use query::{QueryOperation, QueryRequest};
use retention_policy::{AlterRetentionPolicyOperation, AlterRetentionPolicyRequest, CreateRetentionPolicyOperation, CreateRetentionPolicyRequest, ListRetentionPolicyOperation};
use series::{DropSeriesOperation, GetSeriesOperation, GetSeriesRequest};
use user::{
    CreateUserOperation, CreateUserRequest, DropUserOperation, GrantAdminPrivilegesOperation, GrantPrivilegeOperation, ListUserOperation, Privilege,
    RevokeAdminPrivilegesOperation, RevokePrivilegeOperation, SetPasswordOperation,
};
use write::{WriteOperation, WriteRequest};

pub mod continuous_query;
pub mod database;
pub mod error;
pub mod macros;
pub mod measurement;
pub mod model;
pub mod protocol;
pub mod query;
pub mod response;
pub mod retention_policy;
pub mod series;
pub mod user;
pub mod util;
pub mod write;

#[cfg(test)]
pub mod test_util;

const USER_AGENT: &str = "influxdb-client-rs/0.1.0";

pub type InfluxResult<T> = Result<T, InfluxError>;

/// 连接服务端使用的协议
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        };

        write!(f, "{}", s)
    }
}

/// InfluxDB HTTP API 只有两个数据端点，所有的管理语句都走查询端点
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfluxOp {
    #[default]
    Query,
    Write,
}

impl From<InfluxOp> for String {
    fn from(value: InfluxOp) -> Self {
        value.to_string()
    }
}

impl Display for InfluxOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InfluxOp::Query => "query",
            InfluxOp::Write => "write",
        };

        write!(f, "{}", s)
    }
}

/// The request to send to influxdb service.
///
/// 查询参数保存为有序的键值对列表，输出顺序就是添加顺序，方便针对序列化结果做断言。
/// 请求一旦构造完成就不再修改，重试的时候原样重发
#[derive(Debug, Clone)]
pub struct InfluxRequest {
    method: reqwest::Method,
    operation: InfluxOp,
    query: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Default for InfluxRequest {
    fn default() -> Self {
        Self {
            method: reqwest::Method::GET,
            operation: InfluxOp::Query,
            query: Vec::new(),
            body: Vec::new(),
        }
    }
}

pub trait RetryPolicy: std::fmt::Debug + Send + Sync {
    /// 是否需要重试。参数分别表示重试次数、操作和发生的错误
    fn should_retry(&self, retried: u32, op: InfluxOp, error: &InfluxError) -> bool;

    /// 如果需要重试，重试之前让线程等待的时间
    fn delay_ms(&self) -> u32;

    /// 需要自行实现克隆逻辑
    fn clone_box(&self) -> Box<dyn RetryPolicy>;
}

impl Clone for Box<dyn RetryPolicy> {
    fn clone(&self) -> Box<dyn RetryPolicy> {
        self.clone_box()
    }
}

/// 在错误的来源链上查找最里层的 IO 错误
fn io_fault_kind(error: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source = error.source();

    while let Some(e) = source {
        if let Some(io_error) = e.downcast_ref::<std::io::Error>() {
            return Some(io_error.kind());
        }

        source = e.source();
    }

    None
}

/// 判断一个传输层错误是不是可以重试的连接类故障。
/// 固定只认这几种：连接超时、读写超时、连接被重置、连接被拒绝、主机不可达。
/// 其他的传输错误（DNS 解析失败、TLS 握手失败、URL 非法等）立即返回给调用方。
/// 注意收到响应之后无论状态码是什么都不在传输层重试
pub(crate) fn is_transient_fault(error: &reqwest::Error) -> bool {
    if error.is_timeout() {
        return true;
    }

    matches!(
        io_fault_kind(error),
        Some(std::io::ErrorKind::TimedOut | std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::HostUnreachable)
    )
}

/// 默认重试机制。只重试连接类故障，重试之间不等待，
/// 最多重发 `max_retry_times` 次（加上最开始的 1 次，总计就是 `max_retry_times + 1` 次请求）
#[derive(Debug, Copy, Clone)]
pub struct DefaultRetryPolicy {
    pub max_retry_times: u32,
}

impl Default for DefaultRetryPolicy {
    fn default() -> Self {
        Self { max_retry_times: 2 }
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, retried: u32, op: InfluxOp, error: &InfluxError) -> bool {
        if retried >= self.max_retry_times {
            log::info!("max retry reached {} times for operation {} with error {}", self.max_retry_times, op, error);
            return false;
        }

        match error {
            InfluxError::ReqwestError(e) => is_transient_fault(e),
            _ => false,
        }
    }

    fn clone_box(&self) -> Box<dyn RetryPolicy> {
        Box::new(*self)
    }

    fn delay_ms(&self) -> u32 {
        0
    }
}

#[derive(Debug, Clone)]
pub struct InfluxClientOptions {
    pub timeout_ms: Option<u64>,
    pub retry_policy: Box<dyn RetryPolicy>,
}

impl InfluxClientOptions {
    pub fn new() -> Self {
        Self {
            retry_policy: Box::new(DefaultRetryPolicy::default()),
            timeout_ms: None,
        }
    }

    pub fn retry_policy_mut(&mut self) -> &mut Box<dyn RetryPolicy> {
        &mut self.retry_policy
    }
}

impl Default for InfluxClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// 构造客户端的完整配置。
/// 所有配置都在这里显式传入，客户端内部不读取任何环境变量。
/// [`Default`] 的取值和服务端的出厂配置对应：本机 8086 端口、root/root、毫秒精度
#[derive(Debug, Clone)]
pub struct InfluxOptions {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub username: String,
    pub password: String,

    /// 默认数据库。没有在单次调用中指定数据库的时候使用这里的值
    pub database: Option<String>,

    /// 默认保留策略
    pub retention_policy: Option<String>,

    /// 默认时间戳精度
    pub precision: Option<Precision>,

    /// 单次请求的超时时间，单位为毫秒。`None` 表示不超时。
    /// 超时约束的是每一次网络请求，不是整个重试序列
    pub request_timeout_ms: Option<u64>,

    /// 连接类故障最多重发的次数
    pub max_retries: u32,
}

impl Default for InfluxOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            protocol: Protocol::Http,
            username: "root".to_string(),
            password: "root".to_string(),
            database: None,
            retention_policy: None,
            precision: Some(Precision::Milliseconds),
            request_timeout_ms: None,
            max_retries: 2,
        }
    }
}

/// 单次调用可以覆盖的查询参数。没有覆盖的项回退到客户端配置
#[derive(Debug, Default, Clone)]
pub(crate) struct UrlOptions {
    pub(crate) database: Option<String>,
    pub(crate) retention_policy: Option<String>,
    pub(crate) precision: Option<Precision>,
}

/// InfluxDB client
#[derive(Clone)]
pub struct InfluxClient {
    host: String,
    port: u16,
    protocol: Protocol,
    username: String,
    password: String,
    database: Option<String>,
    retention_policy: Option<String>,
    precision: Option<Precision>,
    http_client: reqwest::Client,
    options: InfluxClientOptions,
}

impl std::fmt::Debug for InfluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("username", &self.username)
            .field("database", &self.database)
            .field("retention_policy", &self.retention_policy)
            .field("precision", &self.precision)
            .field("http_client", &self.http_client)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for InfluxClient {
    fn default() -> Self {
        Self::new(InfluxOptions::default())
    }
}

impl InfluxClient {
    pub fn new(options: InfluxOptions) -> Self {
        let InfluxOptions {
            host,
            port,
            protocol,
            username,
            password,
            database,
            retention_policy,
            precision,
            request_timeout_ms,
            max_retries,
        } = options;

        Self {
            host,
            port,
            protocol,
            username,
            password,
            database,
            retention_policy,
            precision,
            http_client: reqwest::Client::new(),
            options: InfluxClientOptions {
                timeout_ms: request_timeout_ms,
                retry_policy: Box::new(DefaultRetryPolicy { max_retry_times: max_retries }),
            },
        }
    }

    /// 修改请求超时时间。这是客户端构造之后唯一允许修改的配置项
    pub fn set_request_timeout(&mut self, timeout_ms: Option<u64>) {
        self.options.timeout_ms = timeout_ms;
    }

    /// 按照固定顺序合并出最终的查询参数：
    ///
    /// 1. 凭证 `u`、`p` 永远取客户端配置，单次调用不能覆盖；
    /// 2. 单次调用指定的 `db`、`rp`、`precision`；
    /// 3. 调用方追加的参数（例如查询端点的 `q`）；
    /// 4. 客户端配置中有默认值、且前面没有出现过的 `precision`、`db`、`rp`。
    ///
    /// 输出顺序是确定的，方便做断言
    pub(crate) fn resolve_query_pairs(&self, options: &UrlOptions, extra: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![("u".to_string(), self.username.clone()), ("p".to_string(), self.password.clone())];

        if let Some(db) = &options.database {
            pairs.push(("db".to_string(), db.clone()));
        }

        if let Some(rp) = &options.retention_policy {
            pairs.push(("rp".to_string(), rp.clone()));
        }

        if let Some(precision) = options.precision {
            pairs.push(("precision".to_string(), precision.to_string()));
        }

        pairs.extend(extra);

        if let Some(precision) = self.precision {
            if !pairs.iter().any(|(k, _)| k == "precision") {
                pairs.push(("precision".to_string(), precision.to_string()));
            }
        }

        if let Some(db) = &self.database {
            if !pairs.iter().any(|(k, _)| k == "db") {
                pairs.push(("db".to_string(), db.clone()));
            }
        }

        if let Some(rp) = &self.retention_policy {
            if !pairs.iter().any(|(k, _)| k == "rp") {
                pairs.push(("rp".to_string(), rp.clone()));
            }
        }

        pairs
    }

    /// 发送请求。
    ///
    /// 只要收到了响应就立即返回，状态码的判定交给调用方处理。
    /// 没有收到响应的传输层错误交给重试策略判定，需要重试的话用同一个请求原样重发，
    /// 重试次数是每次调用独立计数的
    pub async fn send(&self, req: InfluxRequest) -> InfluxResult<Response> {
        let InfluxRequest {
            method,
            operation,
            query,
            body,
        } = req;

        let mut url = Url::parse(format!("{}://{}:{}/{}", self.protocol, self.host, self.port, operation).as_str())?;
        url.query_pairs_mut().extend_pairs(query.iter());

        log::debug!(">> {} {}", method, url);

        let request_body = Bytes::from_owner(body);

        let mut retried = 0u32;

        loop {
            let mut request_builder = self
                .http_client
                .request(method.clone(), url.clone())
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .body(request_body.clone());

            // Handle per-request options
            if let Some(ms) = self.options.timeout_ms {
                request_builder = request_builder.timeout(Duration::from_millis(ms));
            }

            match request_builder.send().await {
                Ok(response) => {
                    log::debug!("<< {} {}", response.status(), url);
                    return Ok(response);
                }

                Err(e) => {
                    let e = InfluxError::from(e);

                    let should_retry = self.options.retry_policy.should_retry(retried, operation, &e);
                    log::info!("should retry {} for operation {} with error {}", should_retry, operation, e);

                    if !should_retry {
                        return Err(e);
                    }

                    let next_delay = self.options.retry_policy.delay_ms();
                    if next_delay > 0 {
                        tokio::time::sleep(tokio::time::Duration::from_millis(next_delay as u64)).await;
                    }

                    retried += 1;
                }
            }
        }
    }

    /// 执行一条 InfluxQL 查询
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let rows = client
    ///     .query(QueryRequest::new("SELECT * FROM cpu_load").database("mydb"))
    ///     .send()
    ///     .await?;
    ///
    /// for row in &rows[0] {
    ///     println!("{:?}", row.get("value"));
    /// }
    /// ```
    pub fn query(&self, request: QueryRequest) -> QueryOperation {
        QueryOperation::new(self.clone(), request)
    }

    /// 写入一批数据点
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let request = WriteRequest::new()
    ///     .point("cpu_load", Point::new().tag("host", "server01").field_double("value", 0.64))
    ///     .point("cpu_load", Point::new().tag("host", "server02").field_double("value", 0.87))
    ///     .database("mydb");
    ///
    /// client.write_measurements(request).send().await?;
    /// ```
    pub fn write_measurements(&self, request: WriteRequest) -> WriteOperation {
        WriteOperation::new(self.clone(), request)
    }

    /// 向单个度量写入一个数据点。需要覆盖数据库等参数的时候使用 [`write_measurements`](`Self::write_measurements`)
    pub fn write_point(&self, measurement: &str, point: Point) -> WriteOperation {
        self.write_measurements(WriteRequest::new().point(measurement, point))
    }

    /// 向单个度量写入一批数据点
    pub fn write_points(&self, measurement: &str, points: impl IntoIterator<Item = Point>) -> WriteOperation {
        self.write_measurements(WriteRequest::new().measurements(MeasurementBatch::new().points(measurement, points)))
    }

    /// 创建数据库
    pub fn create_database(&self, request: CreateDatabaseRequest) -> CreateDatabaseOperation {
        CreateDatabaseOperation::new(self.clone(), request)
    }

    /// 删除数据库
    pub fn drop_database(&self, database_name: &str) -> DropDatabaseOperation {
        DropDatabaseOperation::new(self.clone(), database_name)
    }

    /// 列出全部数据库的名称
    pub fn list_database(&self) -> ListDatabaseOperation {
        ListDatabaseOperation::new(self.clone())
    }

    /// 列出度量
    pub fn list_measurement(&self, request: ListMeasurementRequest) -> ListMeasurementOperation {
        ListMeasurementOperation::new(self.clone(), request)
    }

    /// 删除度量
    pub fn drop_measurement(&self, measurement_name: &str) -> DropMeasurementOperation {
        DropMeasurementOperation::new(self.clone(), measurement_name)
    }

    /// 查询序列
    pub fn get_series(&self, request: GetSeriesRequest) -> GetSeriesOperation {
        GetSeriesOperation::new(self.clone(), request)
    }

    /// 删除序列
    pub fn drop_series(&self, series_id: &str) -> DropSeriesOperation {
        DropSeriesOperation::new(self.clone(), series_id)
    }

    /// 列出用户
    pub fn list_user(&self) -> ListUserOperation {
        ListUserOperation::new(self.clone())
    }

    /// 创建用户
    pub fn create_user(&self, request: CreateUserRequest) -> CreateUserOperation {
        CreateUserOperation::new(self.clone(), request)
    }

    /// 修改用户密码
    pub fn set_password(&self, username: &str, password: &str) -> SetPasswordOperation {
        SetPasswordOperation::new(self.clone(), username, password)
    }

    /// 删除用户
    pub fn drop_user(&self, username: &str) -> DropUserOperation {
        DropUserOperation::new(self.clone(), username)
    }

    /// 授予用户某个数据库上的权限
    pub fn grant_privilege(&self, privilege: Privilege, database_name: &str, username: &str) -> GrantPrivilegeOperation {
        GrantPrivilegeOperation::new(self.clone(), privilege, database_name, username)
    }

    /// 回收用户某个数据库上的权限
    pub fn revoke_privilege(&self, privilege: Privilege, database_name: &str, username: &str) -> RevokePrivilegeOperation {
        RevokePrivilegeOperation::new(self.clone(), privilege, database_name, username)
    }

    /// 授予用户管理员权限
    pub fn grant_admin_privileges(&self, username: &str) -> GrantAdminPrivilegesOperation {
        GrantAdminPrivilegesOperation::new(self.clone(), username)
    }

    /// 回收用户管理员权限
    pub fn revoke_admin_privileges(&self, username: &str) -> RevokeAdminPrivilegesOperation {
        RevokeAdminPrivilegesOperation::new(self.clone(), username)
    }

    /// 创建保留策略
    pub fn create_retention_policy(&self, request: CreateRetentionPolicyRequest) -> CreateRetentionPolicyOperation {
        CreateRetentionPolicyOperation::new(self.clone(), request)
    }

    /// 修改保留策略
    pub fn alter_retention_policy(&self, request: AlterRetentionPolicyRequest) -> AlterRetentionPolicyOperation {
        AlterRetentionPolicyOperation::new(self.clone(), request)
    }

    /// 列出数据库上的保留策略
    pub fn list_retention_policy(&self, database_name: &str) -> ListRetentionPolicyOperation {
        ListRetentionPolicyOperation::new(self.clone(), database_name)
    }

    /// 创建连续查询
    pub fn create_continuous_query(&self, request: CreateContinuousQueryRequest) -> CreateContinuousQueryOperation {
        CreateContinuousQueryOperation::new(self.clone(), request)
    }

    /// 列出连续查询
    pub fn list_continuous_query(&self) -> ListContinuousQueryOperation {
        ListContinuousQueryOperation::new(self.clone())
    }

    /// 删除连续查询
    pub fn drop_continuous_query(&self, request: DropContinuousQueryRequest) -> DropContinuousQueryOperation {
        DropContinuousQueryOperation::new(self.clone(), request)
    }
}

#[cfg(test)]
mod test_client {
    use crate::{
        error::InfluxError,
        model::Point,
        query::QueryRequest,
        test_util::setup,
        write::WriteRequest,
        DefaultRetryPolicy, InfluxClient, InfluxOp, InfluxOptions, RetryPolicy, UrlOptions,
    };

    fn local_client(port: u16, max_retries: u32) -> InfluxClient {
        InfluxClient::new(InfluxOptions {
            port,
            max_retries,
            database: Some("test_db".to_string()),
            ..Default::default()
        })
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);

        let Some((head, tail)) = text.split_once("\r\n\r\n") else {
            return false;
        };

        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        tail.len() >= content_length
    }

    /// 只处理一次请求的本地 HTTP 服务。返回监听端口和收到的原始请求文本
    async fn one_shot_server(response: String) -> (u16, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut received = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }

                received.extend_from_slice(&buf[..n]);
                if request_complete(&received) {
                    break;
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&received).into_owned()
        });

        (port, handle)
    }

    #[test]
    fn test_resolve_query_pairs_is_deterministic() {
        setup();

        let client = InfluxClient::new(InfluxOptions {
            database: Some("d".to_string()),
            retention_policy: Some("testrp".to_string()),
            ..Default::default()
        });

        let pairs = client.resolve_query_pairs(&UrlOptions::default(), vec![("q".to_string(), "SHOW DATABASES".to_string())]);

        assert_eq!(
            vec![
                ("u".to_string(), "root".to_string()),
                ("p".to_string(), "root".to_string()),
                ("q".to_string(), "SHOW DATABASES".to_string()),
                ("precision".to_string(), "ms".to_string()),
                ("db".to_string(), "d".to_string()),
                ("rp".to_string(), "testrp".to_string()),
            ],
            pairs
        );
    }

    #[test]
    fn test_resolve_query_pairs_call_options_win() {
        setup();

        let client = InfluxClient::new(InfluxOptions {
            database: Some("d".to_string()),
            ..Default::default()
        });

        let options = UrlOptions {
            database: Some("override".to_string()),
            ..Default::default()
        };

        let pairs = client.resolve_query_pairs(&options, vec![]);

        let db_values = pairs.iter().filter(|(k, _)| k == "db").map(|(_, v)| v.as_str()).collect::<Vec<_>>();
        assert_eq!(vec!["override"], db_values);

        let precision_values = pairs.iter().filter(|(k, _)| k == "precision").map(|(_, v)| v.as_str()).collect::<Vec<_>>();
        assert_eq!(vec!["ms"], precision_values);
    }

    #[tokio::test]
    async fn test_query_end_to_end() {
        setup();

        let body = r#"{"results":[{"series":[{"name":"myseries","tags":{"mytag":"foobarfoo"},"columns":["time","value"],"values":[["2015-06-27T06:25:54.411900884Z",55]]}]}]}"#;
        let (port, handle) = one_shot_server(http_response("200 OK", body)).await;

        let client = local_client(port, 0);
        let rows = client.query(QueryRequest::new("SELECT * FROM cpu_load")).send().await.unwrap();

        assert_eq!(1, rows.len());
        assert_eq!(1, rows[0].len());
        assert_eq!(Some(&serde_json::json!(55)), rows[0][0].get("value"));
        assert_eq!(Some(&serde_json::json!("foobarfoo")), rows[0][0].get("mytag"));

        let received = handle.await.unwrap();
        assert!(received.starts_with("GET /query?"));
        assert!(received.contains("u=root"));
        assert!(received.contains("p=root"));
        assert!(received.contains("db=test_db"));
        assert!(received.contains("q=SELECT"));
    }

    #[tokio::test]
    async fn test_query_statement_error_first_wins() {
        setup();

        let body = r#"{"results":[{"error":"E1"},{"series":[{"name":"ok","columns":["c"],"values":[[1]]}]},{"error":"E2"}]}"#;
        let (port, _handle) = one_shot_server(http_response("200 OK", body)).await;

        let client = local_client(port, 0);
        let error = client.query(QueryRequest::new("SELECT 1; SELECT 2; SELECT 3")).send().await.unwrap_err();

        match error {
            InfluxError::StatementError(message) => assert_eq!("E1", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_status_error_uses_structured_message() {
        setup();

        let body = r#"{"error":"authorization failed"}"#;
        let (port, _handle) = one_shot_server(http_response("401 Unauthorized", body)).await;

        let client = local_client(port, 0);
        let error = client.query(QueryRequest::new("SHOW DATABASES")).send().await.unwrap_err();

        match error {
            InfluxError::StatusError(status, message) => {
                assert_eq!(401, status.as_u16());
                assert_eq!("authorization failed", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_empty_body_is_error() {
        setup();

        let (port, _handle) = one_shot_server(http_response("200 OK", "")).await;

        let client = local_client(port, 0);
        let error = client.query(QueryRequest::new("SHOW DATABASES")).send().await.unwrap_err();

        assert!(matches!(error, InfluxError::EmptyBody));
    }

    #[tokio::test]
    async fn test_write_end_to_end() {
        setup();

        let (port, handle) = one_shot_server(http_response("204 No Content", "")).await;

        let client = local_client(port, 0);
        let request = WriteRequest::new().point("cpu load", Point::new().tag("host", "server01").field_integer("value", 1).timestamp(1463683075000i64));

        client.write_measurements(request).send().await.unwrap();

        let received = handle.await.unwrap();
        assert!(received.starts_with("POST /write?"));
        assert!(received.contains("db=test_db"));
        assert!(received.ends_with("cpu\\ load,host=server01 value=1 1463683075000"));
    }

    /// 写入空批次也应该发出一个格式正确的请求，不在发送之前报错
    #[tokio::test]
    async fn test_write_empty_batch_sends_empty_body() {
        setup();

        let (port, handle) = one_shot_server(http_response("204 No Content", "")).await;

        let client = local_client(port, 0);
        client.write_measurements(WriteRequest::new()).send().await.unwrap();

        let received = handle.await.unwrap();
        assert!(received.starts_with("POST /write?"));
        assert!(received.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient_and_bounded() {
        setup();

        // 绑定之后立即释放，拿到一个当前没有监听的端口
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = local_client(port, 2);
        let error = client.query(QueryRequest::new("SHOW DATABASES")).send().await.unwrap_err();

        assert!(matches!(error, InfluxError::ReqwestError(_)));

        let policy = DefaultRetryPolicy { max_retry_times: 2 };
        assert!(policy.should_retry(0, InfluxOp::Query, &error));
        assert!(policy.should_retry(1, InfluxOp::Query, &error));
        assert!(!policy.should_retry(2, InfluxOp::Query, &error));
    }

    #[test]
    fn test_non_connection_faults_are_not_retried() {
        setup();

        let policy = DefaultRetryPolicy::default();

        let error = InfluxError::StatusError(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert!(!policy.should_retry(0, InfluxOp::Query, &error));

        let error = InfluxError::EmptyBody;
        assert!(!policy.should_retry(0, InfluxOp::Write, &error));
    }

    #[tokio::test]
    async fn test_per_attempt_timeout_is_transient() {
        setup();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // 接受连接但是不响应，让客户端的超时先触发
        let handle = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(2000)).await;
        });

        let client = local_client(port, 0);
        let error = client.query(QueryRequest::new("SHOW DATABASES")).timeout_ms(100).send().await.unwrap_err();

        let policy = DefaultRetryPolicy::default();
        assert!(policy.should_retry(0, InfluxOp::Query, &error));

        handle.abort();
    }
}
