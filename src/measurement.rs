//! 度量管理操作

use crate::{
    add_per_request_options,
    error::InfluxError,
    query::{QueryOperation, QueryRequest},
    response::StatementResult,
    InfluxClient, InfluxResult,
};

/// 列出度量时的过滤条件
#[derive(Debug, Clone)]
pub enum MeasurementFilter {
    /// 按标签值过滤，`WHERE 标签=值`。值原样拼接，需要引号的时候由调用者自己添加
    TagEquals(String, String),

    /// 按标签值的正则过滤，`WHERE 标签=~正则`
    TagMatches(String, String),

    /// 按度量名称的正则过滤，`WITH MEASUREMENT =~ 正则`
    MeasurementMatches(String),
}

/// 列出度量的请求
#[derive(Debug, Default, Clone)]
pub struct ListMeasurementRequest {
    pub filter: Option<MeasurementFilter>,
}

impl ListMeasurementRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置过滤条件
    pub fn filter(mut self, filter: MeasurementFilter) -> Self {
        self.filter = Some(filter);

        self
    }

    fn statement(&self) -> String {
        match &self.filter {
            None => "SHOW MEASUREMENTS".to_string(),
            Some(MeasurementFilter::TagEquals(tag, value)) => format!("SHOW MEASUREMENTS WHERE {}={}", tag, value),
            Some(MeasurementFilter::TagMatches(tag, regex)) => format!("SHOW MEASUREMENTS WHERE {}=~{}", tag, regex),
            Some(MeasurementFilter::MeasurementMatches(regex)) => format!("SHOW MEASUREMENTS WITH MEASUREMENT =~ {}", regex),
        }
    }
}

/// 列出度量
#[derive(Debug, Clone)]
pub struct ListMeasurementOperation {
    client: InfluxClient,
    request: ListMeasurementRequest,
}

add_per_request_options!(ListMeasurementOperation);

impl ListMeasurementOperation {
    pub(crate) fn new(client: InfluxClient, request: ListMeasurementRequest) -> Self {
        Self { client, request }
    }

    pub async fn send(self) -> InfluxResult<Vec<StatementResult>> {
        let Self { client, request } = self;

        QueryOperation::new(client, QueryRequest::new(&request.statement())).send_raw().await
    }
}

/// 删除度量以及其中的全部数据
#[derive(Debug, Clone)]
pub struct DropMeasurementOperation {
    client: InfluxClient,
    measurement_name: String,
}

add_per_request_options!(DropMeasurementOperation);

impl DropMeasurementOperation {
    pub(crate) fn new(client: InfluxClient, measurement_name: &str) -> Self {
        Self {
            client,
            measurement_name: measurement_name.to_string(),
        }
    }

    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, measurement_name } = self;

        if measurement_name.is_empty() {
            return Err(InfluxError::ValidationFailed("measurement name can not be empty".to_string()));
        }

        QueryOperation::new(client, QueryRequest::new(&format!("drop measurement \"{}\"", measurement_name)))
            .send_raw()
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test_measurement {
    use crate::test_util::setup;

    use super::{ListMeasurementRequest, MeasurementFilter};

    #[test]
    fn test_list_measurement_statements() {
        setup();

        assert_eq!("SHOW MEASUREMENTS", ListMeasurementRequest::new().statement());

        let request = ListMeasurementRequest::new().filter(MeasurementFilter::TagEquals("host".to_string(), "'server01'".to_string()));
        assert_eq!("SHOW MEASUREMENTS WHERE host='server01'", request.statement());

        let request = ListMeasurementRequest::new().filter(MeasurementFilter::TagMatches("host".to_string(), "/server.*/".to_string()));
        assert_eq!("SHOW MEASUREMENTS WHERE host=~/server.*/", request.statement());

        let request = ListMeasurementRequest::new().filter(MeasurementFilter::MeasurementMatches("/cpu.*/".to_string()));
        assert_eq!("SHOW MEASUREMENTS WITH MEASUREMENT =~ /cpu.*/", request.statement());
    }
}
