//! 用户和权限管理操作
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/administration/authentication_and_authorization/>

use std::fmt::Display;

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    response::{self, FlatRow},
    InfluxClient, InfluxResult,
};

/// 数据库级别的权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Read,
    Write,
    All,
}

impl Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Privilege::Read => "READ",
            Privilege::Write => "WRITE",
            Privilege::All => "ALL",
        };

        write!(f, "{}", s)
    }
}

/// 创建用户的请求
#[derive(Debug, Default, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,

    /// 创建为管理员用户
    pub admin: bool,
}

impl CreateUserRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    /// 创建为管理员用户
    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;

        self
    }

    fn validate(&self) -> InfluxResult<()> {
        if self.username.is_empty() {
            return Err(InfluxError::ValidationFailed("username can not be empty".to_string()));
        }

        Ok(())
    }

    fn statement(&self) -> String {
        let mut query = format!("CREATE USER {} with password '{}'", self.username, self.password);

        if self.admin {
            query.push_str(" WITH ALL PRIVILEGES");
        }

        query
    }
}

/// 创建用户
#[derive(Debug, Clone)]
pub struct CreateUserOperation {
    client: InfluxClient,
    request: CreateUserRequest,
}

add_per_request_options!(CreateUserOperation);

impl CreateUserOperation {
    pub(crate) fn new(client: InfluxClient, request: CreateUserRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<()> {
        self.request.validate()?;

        let Self { client, request } = self;

        QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await?;

        Ok(())
    }
}

/// 列出用户。返回第一条语句结果展开之后的行
#[derive(Debug, Clone)]
pub struct ListUserOperation {
    client: InfluxClient,
}

add_per_request_options!(ListUserOperation);

impl ListUserOperation {
    pub(crate) fn new(client: InfluxClient) -> Self {
        Self { client }
    }

    pub async fn send(self) -> InfluxResult<Vec<FlatRow>> {
        let Self { client } = self;

        let results = QueryOperation::new(client, QueryRequest::new("show users")).send_raw().await?;

        Ok(response::flatten(&results).into_iter().next().unwrap_or_default())
    }
}

/// 修改用户密码
#[derive(Debug, Clone)]
pub struct SetPasswordOperation {
    client: InfluxClient,
    username: String,
    password: String,
}

add_per_request_options!(SetPasswordOperation);

impl SetPasswordOperation {
    pub(crate) fn new(client: InfluxClient, username: &str, password: &str) -> Self {
        Self {
            client,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, username, password } = self;

        if username.is_empty() {
            return Err(InfluxError::ValidationFailed("username can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("set password for \"{}\" = '{}'", username, password)))
            .send_raw()
            .await?;

        Ok(())
    }
}

/// 删除用户
#[derive(Debug, Clone)]
pub struct DropUserOperation {
    client: InfluxClient,
    username: String,
}

add_per_request_options!(DropUserOperation);

impl DropUserOperation {
    pub(crate) fn new(client: InfluxClient, username: &str) -> Self {
        Self {
            client,
            username: username.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, username } = self;

        if username.is_empty() {
            return Err(InfluxError::ValidationFailed("username can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("drop user \"{}\"", username))).send_raw().await?;

        Ok(())
    }
}

/// 授予用户某个数据库上的权限
#[derive(Debug, Clone)]
pub struct GrantPrivilegeOperation {
    client: InfluxClient,
    privilege: Privilege,
    database_name: String,
    username: String,
}

add_per_request_options!(GrantPrivilegeOperation);

impl GrantPrivilegeOperation {
    pub(crate) fn new(client: InfluxClient, privilege: Privilege, database_name: &str, username: &str) -> Self {
        Self {
            client,
            privilege,
            database_name: database_name.to_string(),
            username: username.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self {
            client,
            privilege,
            database_name,
            username,
        } = self;

        let query = format!("grant {} on \"{}\" to \"{}\"", privilege, database_name, username);
        QueryOperation::new(client, QueryRequest::new(&query)).send_raw().await?;

        Ok(())
    }
}

/// 回收用户某个数据库上的权限
#[derive(Debug, Clone)]
pub struct RevokePrivilegeOperation {
    client: InfluxClient,
    privilege: Privilege,
    database_name: String,
    username: String,
}

add_per_request_options!(RevokePrivilegeOperation);

impl RevokePrivilegeOperation {
    pub(crate) fn new(client: InfluxClient, privilege: Privilege, database_name: &str, username: &str) -> Self {
        Self {
            client,
            privilege,
            database_name: database_name.to_string(),
            username: username.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self {
            client,
            privilege,
            database_name,
            username,
        } = self;

        let query = format!("revoke {} on \"{}\" from \"{}\"", privilege, database_name, username);
        QueryOperation::new(client, QueryRequest::new(&query)).send_raw().await?;

        Ok(())
    }
}

/// 授予用户管理员权限
#[derive(Debug, Clone)]
pub struct GrantAdminPrivilegesOperation {
    client: InfluxClient,
    username: String,
}

add_per_request_options!(GrantAdminPrivilegesOperation);

impl GrantAdminPrivilegesOperation {
    pub(crate) fn new(client: InfluxClient, username: &str) -> Self {
        Self {
            client,
            username: username.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, username } = self;

        QueryOperation::new(client, QueryRequest::new(&format!("grant all privileges to \"{}\"", username)))
            .send_raw()
            .await?;

        Ok(())
    }
}

/// 回收用户管理员权限
#[derive(Debug, Clone)]
pub struct RevokeAdminPrivilegesOperation {
    client: InfluxClient,
    username: String,
}

add_per_request_options!(RevokeAdminPrivilegesOperation);

impl RevokeAdminPrivilegesOperation {
    pub(crate) fn new(client: InfluxClient, username: &str) -> Self {
        Self {
            client,
            username: username.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, username } = self;

        QueryOperation::new(client, QueryRequest::new(&format!("revoke all privileges from \"{}\"", username)))
            .send_raw()
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test_user {
    use crate::test_util::setup;

    use super::{CreateUserRequest, Privilege};

    #[test]
    fn test_create_user_statement() {
        setup();

        let request = CreateUserRequest::new("paul", "timeseries4days");
        assert_eq!("CREATE USER paul with password 'timeseries4days'", request.statement());

        let request = CreateUserRequest::new("paul", "timeseries4days").admin(true);
        assert_eq!("CREATE USER paul with password 'timeseries4days' WITH ALL PRIVILEGES", request.statement());
    }

    #[test]
    fn test_privilege_rendering() {
        setup();

        assert_eq!("READ", Privilege::Read.to_string());
        assert_eq!("WRITE", Privilege::Write.to_string());
        assert_eq!("ALL", Privilege::All.to_string());
    }
}
