//! 保留策略管理操作
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/query_language/manage-database/#retention-policy-management>

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    response::StatementResult,
    InfluxClient, InfluxResult,
};

/// 创建保留策略的请求
#[derive(Debug, Default, Clone)]
pub struct CreateRetentionPolicyRequest {
    pub policy_name: String,
    pub database_name: String,

    /// 保留时长，例如 `1d`、`4w`。原样透传给服务端
    pub duration: String,

    /// 副本数量
    pub replication: u32,

    /// 设置为数据库的默认保留策略
    pub is_default: bool,
}

impl CreateRetentionPolicyRequest {
    pub fn new(policy_name: &str, database_name: &str, duration: &str, replication: u32) -> Self {
        Self {
            policy_name: policy_name.to_string(),
            database_name: database_name.to_string(),
            duration: duration.to_string(),
            replication,
            ..Default::default()
        }
    }

    /// 设置为数据库的默认保留策略
    pub fn default_policy(mut self, is_default: bool) -> Self {
        self.is_default = is_default;

        self
    }

    fn validate(&self) -> InfluxResult<()> {
        if self.policy_name.is_empty() {
            return Err(InfluxError::ValidationFailed("retention policy name can not be empty".to_string()));
        }

        if self.database_name.is_empty() {
            return Err(InfluxError::ValidationFailed("database name can not be empty".to_string()));
        }

        if self.duration.is_empty() {
            return Err(InfluxError::ValidationFailed("duration can not be empty".to_string()));
        }

        Ok(())
    }

    fn statement(&self) -> String {
        let mut query = format!(
            "create retention policy \"{}\" on \"{}\" duration {} replication {}",
            self.policy_name, self.database_name, self.duration, self.replication
        );

        if self.is_default {
            query.push_str(" default");
        }

        query
    }
}

/// 创建保留策略
#[derive(Debug, Clone)]
pub struct CreateRetentionPolicyOperation {
    client: InfluxClient,
    request: CreateRetentionPolicyRequest,
}

add_per_request_options!(CreateRetentionPolicyOperation);

impl CreateRetentionPolicyOperation {
    pub(crate) fn new(client: InfluxClient, request: CreateRetentionPolicyRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await?;

        Ok(())
    }
}

/// 修改保留策略的请求。时长、副本数量和默认标记都是可选的，只修改设置了的项
#[derive(Debug, Default, Clone)]
pub struct AlterRetentionPolicyRequest {
    pub policy_name: String,
    pub database_name: String,
    pub duration: Option<String>,
    pub replication: Option<u32>,
    pub is_default: bool,
}

impl AlterRetentionPolicyRequest {
    pub fn new(policy_name: &str, database_name: &str) -> Self {
        Self {
            policy_name: policy_name.to_string(),
            database_name: database_name.to_string(),
            ..Default::default()
        }
    }

    /// 修改保留时长
    pub fn duration(mut self, duration: &str) -> Self {
        self.duration = Some(duration.to_string());

        self
    }

    /// 修改副本数量
    pub fn replication(mut self, replication: u32) -> Self {
        self.replication = Some(replication);

        self
    }

    /// 设置为数据库的默认保留策略
    pub fn default_policy(mut self, is_default: bool) -> Self {
        self.is_default = is_default;

        self
    }

    fn validate(&self) -> InfluxResult<()> {
        if self.policy_name.is_empty() {
            return Err(InfluxError::ValidationFailed("retention policy name can not be empty".to_string()));
        }

        if self.database_name.is_empty() {
            return Err(InfluxError::ValidationFailed("database name can not be empty".to_string()));
        }

        Ok(())
    }

    fn statement(&self) -> String {
        let mut query = format!("alter retention policy \"{}\" on \"{}\"", self.policy_name, self.database_name);

        if let Some(duration) = &self.duration {
            query.push_str(&format!(" duration {}", duration));
        }

        if let Some(replication) = self.replication {
            query.push_str(&format!(" replication {}", replication));
        }

        if self.is_default {
            query.push_str(" default");
        }

        query
    }
}

/// 修改保留策略
#[derive(Debug, Clone)]
pub struct AlterRetentionPolicyOperation {
    client: InfluxClient,
    request: AlterRetentionPolicyRequest,
}

add_per_request_options!(AlterRetentionPolicyOperation);

impl AlterRetentionPolicyOperation {
    pub(crate) fn new(client: InfluxClient, request: AlterRetentionPolicyRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await?;

        Ok(())
    }
}

/// 列出数据库上的保留策略
#[derive(Debug, Clone)]
pub struct ListRetentionPolicyOperation {
    client: InfluxClient,
    database_name: String,
}

add_per_request_options!(ListRetentionPolicyOperation);

impl ListRetentionPolicyOperation {
    pub(crate) fn new(client: InfluxClient, database_name: &str) -> Self {
        Self {
            client,
            database_name: database_name.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<Vec<StatementResult>> {
        let Self { client, database_name } = self;

        if database_name.is_empty() {
            return Err(InfluxError::ValidationFailed("database name can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("show retention policies on \"{}\"", database_name)))
            .send_raw()
            .await
    }
}
