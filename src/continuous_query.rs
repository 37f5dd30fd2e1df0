//! 连续查询管理操作
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/query_language/continuous_queries/>

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    response::{self, FlatRow},
    InfluxClient, InfluxResult,
};

/// 创建连续查询的请求
#[derive(Debug, Default, Clone)]
pub struct CreateContinuousQueryRequest {
    pub query_name: String,

    /// `BEGIN` 和 `END` 之间的查询文本，原样透传
    pub query: String,

    /// 目标数据库。不设置的时候使用客户端配置的默认数据库
    pub database_name: Option<String>,
}

impl CreateContinuousQueryRequest {
    pub fn new(query_name: &str, query: &str) -> Self {
        Self {
            query_name: query_name.to_string(),
            query: query.to_string(),
            ..Default::default()
        }
    }

    /// 设置目标数据库
    pub fn database_name(mut self, database_name: &str) -> Self {
        self.database_name = Some(database_name.to_string());

        self
    }

    fn validate(&self) -> InfluxResult<()> {
        if self.query_name.is_empty() {
            return Err(InfluxError::ValidationFailed("continuous query name can not be empty".to_string()));
        }

        if self.query.trim().is_empty() {
            return Err(InfluxError::ValidationFailed("continuous query can not be empty".to_string()));
        }

        Ok(())
    }

    fn statement(&self, database_name: &str) -> String {
        format!("CREATE CONTINUOUS QUERY {} ON \"{}\" BEGIN {} END", self.query_name, database_name, self.query)
    }
}

/// 创建连续查询
#[derive(Debug, Clone)]
pub struct CreateContinuousQueryOperation {
    client: InfluxClient,
    request: CreateContinuousQueryRequest,
}

add_per_request_options!(CreateContinuousQueryOperation);

impl CreateContinuousQueryOperation {
    pub(crate) fn new(client: InfluxClient, request: CreateContinuousQueryRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        let database_name = match request.database_name.as_deref().or(client.database.as_deref()) {
            Some(s) => s.to_string(),
            None => return Err(InfluxError::ValidationFailed("no database specified for continuous query".to_string())),
        };

        QueryOperation::new(client, QueryRequest::new(&request.statement(&database_name)))
            .send_raw()
            .await?;

        Ok(())
    }
}

/// 列出连续查询。返回每条语句结果展开之后的行
#[derive(Debug, Clone)]
pub struct ListContinuousQueryOperation {
    client: InfluxClient,
}

add_per_request_options!(ListContinuousQueryOperation);

impl ListContinuousQueryOperation {
    pub(crate) fn new(client: InfluxClient) -> Self {
        Self { client }
    }

    pub async fn send(self) -> InfluxResult<Vec<Vec<FlatRow>>> {
        let Self { client } = self;

        let results = QueryOperation::new(client, QueryRequest::new("SHOW CONTINUOUS QUERIES")).send_raw().await?;

        Ok(response::flatten(&results))
    }
}

/// 删除连续查询的请求
#[derive(Debug, Default, Clone)]
pub struct DropContinuousQueryRequest {
    pub query_name: String,

    /// 目标数据库。不设置的时候使用客户端配置的默认数据库
    pub database_name: Option<String>,
}

impl DropContinuousQueryRequest {
    pub fn new(query_name: &str) -> Self {
        Self {
            query_name: query_name.to_string(),
            ..Default::default()
        }
    }

    /// 设置目标数据库
    pub fn database_name(mut self, database_name: &str) -> Self {
        self.database_name = Some(database_name.to_string());

        self
    }
}

/// 删除连续查询
#[derive(Debug, Clone)]
pub struct DropContinuousQueryOperation {
    client: InfluxClient,
    request: DropContinuousQueryRequest,
}

add_per_request_options!(DropContinuousQueryOperation);

impl DropContinuousQueryOperation {
    pub(crate) fn new(client: InfluxClient, request: DropContinuousQueryRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, request } = self;

        if request.query_name.is_empty() {
            return Err(InfluxError::ValidationFailed("continuous query name can not be empty".to_string()));
        }

        let database_name = match request.database_name.as_deref().or(client.database.as_deref()) {
            Some(s) => s.to_string(),
            None => return Err(InfluxError::ValidationFailed("no database specified for continuous query".to_string())),
        };

        let query = format!("DROP CONTINUOUS QUERY \"{}\" ON \"{}\"", request.query_name, database_name);
        QueryOperation::new(client, QueryRequest::new(&query)).send_raw().await?;

        Ok(())
    }
}
