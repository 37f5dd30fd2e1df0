use crate::{
    add_per_request_options,
    model::{MeasurementBatch, Point, Precision},
    protocol, response, InfluxClient, InfluxOp, InfluxRequest, InfluxResult, UrlOptions,
};

/// 写入请求。请求体是行协议文本。
/// 空的批次也是合法请求，会发出一个空请求体的写入
///
/// 官方文档：<https://docs.influxdata.com/influxdb/v1/tools/api/#write-http-endpoint>
#[derive(Debug, Default, Clone)]
pub struct WriteRequest {
    /// 要写入的数据点，按度量分组
    pub measurements: MeasurementBatch,

    /// 本次写入的目标数据库，覆盖客户端配置的默认数据库
    pub database: Option<String>,

    /// 本次写入使用的保留策略
    pub retention_policy: Option<String>,

    /// 本次写入的时间戳精度。[`crate::model::Timestamp::Epoch`] 的值按这个精度解释
    pub precision: Option<Precision>,
}

impl WriteRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置整个批次
    pub fn measurements(mut self, measurements: MeasurementBatch) -> Self {
        self.measurements = measurements;

        self
    }

    /// 向指定度量添加一个数据点
    pub fn point(mut self, measurement: &str, point: Point) -> Self {
        self.measurements = self.measurements.point(measurement, point);

        self
    }

    /// 设置目标数据库
    pub fn database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());

        self
    }

    /// 设置保留策略
    pub fn retention_policy(mut self, retention_policy: &str) -> Self {
        self.retention_policy = Some(retention_policy.to_string());

        self
    }

    /// 设置时间戳精度
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);

        self
    }
}

#[derive(Debug, Clone)]
pub struct WriteOperation {
    client: InfluxClient,
    request: WriteRequest,
}

add_per_request_options!(WriteOperation);

impl WriteOperation {
    pub(crate) fn new(client: InfluxClient, request: WriteRequest) -> Self {
        Self { client, request }
    }

    /// 发送写入请求。服务端写入成功的时候响应 2xx 并且没有数据返回
    pub async fn send(self) -> InfluxResult<()> {
        let Self { client, request } = self;

        let body = protocol::encode(&request.measurements);

        let url_options = UrlOptions {
            database: request.database,
            retention_policy: request.retention_policy,
            precision: request.precision,
        };

        let query = client.resolve_query_pairs(&url_options, vec![]);

        let req = InfluxRequest {
            method: reqwest::Method::POST,
            operation: InfluxOp::Write,
            query,
            body: body.into_bytes(),
        };

        let response = client.send(req).await?;

        response::ensure_success(response).await
    }
}
