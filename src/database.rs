//! 数据库管理操作
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/query_language/manage-database/>

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    InfluxClient, InfluxResult,
};

/// 创建数据库的请求
#[derive(Debug, Default, Clone)]
pub struct CreateDatabaseRequest {
    pub database_name: String,

    /// 附加到 `WITH` 子句的属性，按添加顺序以 `键 值` 的形式拼接，
    /// 例如 `("DURATION", "3d")`
    pub attributes: Vec<(String, String)>,
}

impl CreateDatabaseRequest {
    pub fn new(database_name: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
            ..Default::default()
        }
    }

    /// 添加一个 `WITH` 子句属性
    pub fn attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));

        self
    }

    fn validate(&self) -> InfluxResult<()> {
        if self.database_name.is_empty() {
            return Err(InfluxError::ValidationFailed("database name can not be empty".to_string()));
        }

        Ok(())
    }

    fn statement(&self) -> String {
        let mut query = format!("CREATE DATABASE {}", self.database_name);

        if !self.attributes.is_empty() {
            let attributes = self.attributes.iter().map(|(k, v)| format!("{} {}", k, v)).collect::<Vec<_>>().join(" ");
            query.push_str(&format!(" WITH {}", attributes));
        }

        query
    }
}

/// 创建数据库
#[derive(Debug, Clone)]
pub struct CreateDatabaseOperation {
    client: InfluxClient,
    request: CreateDatabaseRequest,
}

add_per_request_options!(CreateDatabaseOperation);

impl CreateDatabaseOperation {
    pub(crate) fn new(client: InfluxClient, request: CreateDatabaseRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await?;

        Ok(())
    }
}

/// 删除数据库
#[derive(Debug, Clone)]
pub struct DropDatabaseOperation {
    client: InfluxClient,
    database_name: String,
}

add_per_request_options!(DropDatabaseOperation);

impl DropDatabaseOperation {
    pub(crate) fn new(client: InfluxClient, database_name: &str) -> Self {
        Self {
            client,
            database_name: database_name.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, database_name } = self;

        if database_name.is_empty() {
            return Err(InfluxError::ValidationFailed("database name can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("DROP DATABASE {}", database_name)))
            .send_raw()
            .await?;

        Ok(())
    }
}

/// 列出全部数据库的名称。
/// 名称取自第一条语句结果的第一个序列的第一列
#[derive(Debug, Clone)]
pub struct ListDatabaseOperation {
    client: InfluxClient,
}

add_per_request_options!(ListDatabaseOperation);

impl ListDatabaseOperation {
    pub(crate) fn new(client: InfluxClient) -> Self {
        Self { client }
    }

    pub async fn send(self) -> InfluxResult<Vec<String>> {
        let Self { client } = self;

        let results = QueryOperation::new(client, QueryRequest::new("SHOW DATABASES")).send_raw().await?;

        let names = results
            .first()
            .and_then(|result| result.series.first())
            .map(|series| {
                series
                    .values
                    .iter()
                    .filter_map(|row| row.first().and_then(|v| v.as_str()).map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(names)
    }
}
