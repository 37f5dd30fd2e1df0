//! 序列管理操作

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    response::Series,
    InfluxClient, InfluxResult,
};

/// 查询序列的请求
#[derive(Debug, Default, Clone)]
pub struct GetSeriesRequest {
    /// 限定在某个度量内查询。不设置的时候查询全部序列
    pub measurement_name: Option<String>,

    /// 附加的 `WHERE` 条件，原样拼接
    pub condition: Option<String>,
}

impl GetSeriesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 限定度量
    pub fn measurement_name(mut self, measurement_name: &str) -> Self {
        self.measurement_name = Some(measurement_name.to_string());

        self
    }

    /// 设置 `WHERE` 条件
    pub fn condition(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_string());

        self
    }

    fn statement(&self) -> String {
        let mut query = "show series".to_string();

        if let Some(measurement_name) = &self.measurement_name {
            query.push_str(&format!(" from \"{}\"", measurement_name));
        }

        if let Some(condition) = &self.condition {
            query.push_str(&format!(" WHERE {}", condition));
        }

        query
    }
}

/// 查询序列。返回第一条语句结果中的序列列表
#[derive(Debug, Clone)]
pub struct GetSeriesOperation {
    client: InfluxClient,
    request: GetSeriesRequest,
}

add_per_request_options!(GetSeriesOperation);

impl GetSeriesOperation {
    pub(crate) fn new(client: InfluxClient, request: GetSeriesRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<Vec<Series>> {
        let Self { client, request } = self;

        let results = QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await?;

        Ok(results.into_iter().next().map(|result| result.series).unwrap_or_default())
    }
}

/// 删除序列
#[derive(Debug, Clone)]
pub struct DropSeriesOperation {
    client: InfluxClient,
    series_id: String,
}

add_per_request_options!(DropSeriesOperation);

impl DropSeriesOperation {
    pub(crate) fn new(client: InfluxClient, series_id: &str) -> Self {
        Self {
            client,
            series_id: series_id.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, series_id } = self;

        if series_id.is_empty() {
            return Err(InfluxError::ValidationFailed("series id can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("drop series {}", series_id))).send_raw().await?;

        Ok(())
    }
}

#[cfg(test)]
mod test_series {
    use crate::test_util::setup;

    use super::GetSeriesRequest;

    #[test]
    fn test_get_series_statements() {
        setup();

        assert_eq!("show series", GetSeriesRequest::new().statement());

        let request = GetSeriesRequest::new().measurement_name("cpu_load");
        assert_eq!("show series from \"cpu_load\"", request.statement());

        let request = GetSeriesRequest::new().measurement_name("cpu_load").condition("host = 'server01'");
        assert_eq!("show series from \"cpu_load\" WHERE host = 'server01'", request.statement());
    }
}
