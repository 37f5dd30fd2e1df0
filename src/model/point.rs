use super::{FieldValue, TagValue, Timestamp};

/// 一个待写入的数据点。
///
/// 字段和标签都按照添加顺序保存，编码行协议的时候不重新排序。
/// 时间戳是可选的，不设置的话由服务端在写入时补上服务器时间
#[derive(Debug, Default, Clone)]
pub struct Point {
    /// 字段数据。一个数据点至少要有一个字段才有意义
    pub fields: Vec<(String, FieldValue)>,

    /// 标签数据
    pub tags: Vec<(String, TagValue)>,

    /// 时间戳
    pub timestamp: Option<Timestamp>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从一个裸的标量值构造数据点，字段名固定为 `value`
    pub fn value(value: impl Into<FieldValue>) -> Self {
        Self::new().field("value", value)
    }

    /// 添加一个字段
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.to_string(), value.into()));

        self
    }

    /// 添加字符串类型的字段
    pub fn field_string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), FieldValue::String(value.into())));

        self
    }

    /// 添加整数字段
    pub fn field_integer(mut self, name: &str, value: i64) -> Self {
        self.fields.push((name.to_string(), FieldValue::Integer(value)));

        self
    }

    /// 添加双精度字段
    pub fn field_double(mut self, name: &str, value: f64) -> Self {
        self.fields.push((name.to_string(), FieldValue::Double(value)));

        self
    }

    /// 添加布尔值字段
    pub fn field_bool(mut self, name: &str, value: bool) -> Self {
        self.fields.push((name.to_string(), FieldValue::Boolean(value)));

        self
    }

    /// 增加一个标签
    pub fn tag(mut self, key: &str, value: impl Into<TagValue>) -> Self {
        self.tags.push((key.to_string(), value.into()));

        self
    }

    /// 设置所有标签
    pub fn tags(mut self, tags: impl IntoIterator<Item = (impl Into<String>, impl Into<TagValue>)>) -> Self {
        self.tags = tags.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

        self
    }

    /// 设置时间戳
    pub fn timestamp(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = Some(timestamp.into());

        self
    }
}

/// 按照度量名称分组的一批数据点。
///
/// 度量内数据点的顺序在输出中保持不变。空的批次也是合法输入，编码结果是空字符串
#[derive(Debug, Default, Clone)]
pub struct MeasurementBatch {
    /// 度量名称以及其中的数据点。同名度量只保留一个条目
    pub measurements: Vec<(String, Vec<Point>)>,
}

impl MeasurementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 向指定的度量添加一个数据点。度量不存在的时候新建条目
    pub fn point(mut self, measurement: &str, point: Point) -> Self {
        match self.measurements.iter_mut().find(|(name, _)| name == measurement) {
            Some((_, points)) => points.push(point),
            None => self.measurements.push((measurement.to_string(), vec![point])),
        }

        self
    }

    /// 向指定的度量添加一批数据点
    pub fn points(mut self, measurement: &str, points: impl IntoIterator<Item = Point>) -> Self {
        match self.measurements.iter_mut().find(|(name, _)| name == measurement) {
            Some((_, existing)) => existing.extend(points),
            None => self.measurements.push((measurement.to_string(), points.into_iter().collect())),
        }

        self
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.iter().all(|(_, points)| points.is_empty())
    }
}
