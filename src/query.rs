use crate::{
    add_per_request_options,
    error::InfluxError,
    model::Precision,
    response::{self, FlatRow, StatementResult},
    InfluxClient, InfluxOp, InfluxRequest, InfluxResult, UrlOptions,
};

/// 查询请求。查询文本原样透传给服务端，客户端不做任何语法校验。
/// 一次请求可以携带多条语句，响应里每条语句对应一个结果
///
/// 官方文档：<https://docs.influxdata.com/influxdb/v1/tools/api/#query-http-endpoint>
#[derive(Debug, Default, Clone)]
pub struct QueryRequest {
    /// InfluxQL 查询文本
    pub query: String,

    /// 本次查询使用的数据库，覆盖客户端配置的默认数据库
    pub database: Option<String>,

    /// 本次查询使用的保留策略
    pub retention_policy: Option<String>,

    /// 本次查询使用的时间戳精度
    pub precision: Option<Precision>,
}

impl QueryRequest {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Default::default()
        }
    }

    /// 设置本次查询的数据库
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());

        self
    }

    /// 设置本次查询的保留策略
    pub fn retention_policy(mut self, retention_policy: &str) -> Self {
        self.retention_policy = Some(retention_policy.to_string());

        self
    }

    /// 设置本次查询的时间戳精度
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);

        self
    }

    pub(crate) fn validate(&self) -> InfluxResult<()> {
        if self.query.trim().is_empty() {
            return Err(InfluxError::ValidationFailed("query can not be empty".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct QueryOperation {
    client: InfluxClient,
    request: QueryRequest,
}

add_per_request_options!(QueryOperation);

impl QueryOperation {
    pub(crate) fn new(client: InfluxClient, request: QueryRequest) -> Self {
        Self { client, request }
    }

    /// 执行查询，返回每条语句的原始结果，不做展开
    pub async fn send_raw(self) -> InfluxResult<Vec<StatementResult>> {
        self.request.validate()?;

        let Self { client, request } = self;

        let url_options = UrlOptions {
            database: request.database,
            retention_policy: request.retention_policy,
            precision: request.precision,
        };

        let query = client.resolve_query_pairs(&url_options, vec![("q".to_string(), request.query)]);

        let req = InfluxRequest {
            operation: InfluxOp::Query,
            query,
            ..Default::default()
        };

        let response = client.send(req).await?;

        response::read_results(response).await
    }

    /// 执行查询并把结果展开成行。每条语句对应一个行集合
    pub async fn send(self) -> InfluxResult<Vec<Vec<FlatRow>>> {
        Ok(response::flatten(&self.send_raw().await?))
    }
}

#[cfg(test)]
mod test_query {
    use crate::{error::InfluxError, test_util::setup, InfluxClient};

    use super::QueryRequest;

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_sending() {
        setup();

        let client = InfluxClient::default();
        let result = client.query(QueryRequest::new("   ")).send().await;

        assert!(matches!(result, Err(InfluxError::ValidationFailed(_))));
    }
}
