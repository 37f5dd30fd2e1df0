//! 行协议编码。
//!
//! 官方文档：<https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use crate::model::{FieldValue, MeasurementBatch, Point, TagValue};

/// 转义度量名称、标签键和字符串类型的标签值中的空格和英文逗号
pub(crate) fn escape(value: &str) -> String {
    value.replace(' ', "\\ ").replace(',', "\\,")
}

fn render_tag_value(value: &TagValue) -> String {
    match value {
        TagValue::String(s) => escape(s),
        TagValue::Integer(n) => n.to_string(),
        TagValue::Double(d) => d.to_string(),
        TagValue::Boolean(b) => b.to_string(),
    }
}

/// 字符串字段值用双引号包裹，注意值内部的引号和反斜线不做转义。
/// 这是和既有写入端保持兼容的行为，下游如果依赖当前输出格式，修改这里会造成破坏
fn render_field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => format!("\"{}\"", s),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Double(d) => d.to_string(),
        FieldValue::Boolean(b) => b.to_string(),
    }
}

/// 标签按照添加顺序输出，不重新排序。字段键不做转义，由调用者自己保证合法
fn render_line(measurement: &str, point: &Point) -> String {
    let mut line = escape(measurement);

    if !point.tags.is_empty() {
        let tags = point
            .tags
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), render_tag_value(v)))
            .collect::<Vec<_>>()
            .join(",");
        line.push(',');
        line.push_str(&tags);
    }

    let fields = point
        .fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, render_field_value(v)))
        .collect::<Vec<_>>()
        .join(",");
    line.push(' ');
    line.push_str(&fields);

    if let Some(ts) = &point.timestamp {
        line.push(' ');
        line.push_str(&ts.as_epoch().to_string());
    }

    line
}

/// 将一批数据点编码成行协议文本。
/// 所有度量的所有行以 `\n` 连接，结尾没有换行符。空的批次编码为空字符串
pub fn encode(batch: &MeasurementBatch) -> String {
    let mut lines = Vec::new();

    for (measurement, points) in &batch.measurements {
        for point in points {
            lines.push(render_line(measurement, point));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod test_protocol {
    use chrono::{TimeZone, Utc};

    use crate::{
        model::{MeasurementBatch, Point},
        test_util::setup,
    };

    use super::encode;

    #[test]
    fn test_encode_tags_and_fields() {
        setup();

        let batch = MeasurementBatch::new().point(
            "cpu load",
            Point::new()
                .tag("tag_1", "value")
                .tag("tag2", "value value")
                .tag("tag3", "value,value")
                .field_integer("a", 1)
                .field_integer("b", 2),
        );

        assert_eq!("cpu\\ load,tag_1=value,tag2=value\\ value,tag3=value\\,value a=1,b=2", encode(&batch));
    }

    #[test]
    fn test_encode_escapes_tag_keys() {
        setup();

        let batch = MeasurementBatch::new().point("m", Point::new().tag("a b", 1i64).field_integer("v", 1));
        assert_eq!("m,a\\ b=1 v=1", encode(&batch));

        let batch = MeasurementBatch::new().point("m", Point::new().tag("a,b", 1i64).field_integer("v", 1));
        assert_eq!("m,a\\,b=1 v=1", encode(&batch));
    }

    #[test]
    fn test_encode_field_types() {
        setup();

        let batch = MeasurementBatch::new().point(
            "status",
            Point::new()
                .field_integer("count", 10)
                .field_double("load", 1.25)
                .field_bool("online", true)
                .field_string("state", "running fine"),
        );

        // 字符串字段值只加引号不做内部转义
        assert_eq!("status count=10,load=1.25,online=true,state=\"running fine\"", encode(&batch));
    }

    #[test]
    fn test_encode_bare_scalar_and_timestamp() {
        setup();

        let batch = MeasurementBatch::new()
            .point("response_time", Point::value(198i64).timestamp(1463683075000i64))
            .point("response_text", Point::value("ok"));

        assert_eq!("response_time value=198 1463683075000\nresponse_text value=\"ok\"", encode(&batch));
    }

    #[test]
    fn test_encode_date_timestamp_as_millis() {
        setup();

        let date = Utc.with_ymd_and_hms(2016, 5, 19, 18, 37, 55).unwrap();
        let batch = MeasurementBatch::new().point("m", Point::value(1i64).timestamp(date));

        assert_eq!(format!("m value=1 {}", date.timestamp_millis()), encode(&batch));
    }

    #[test]
    fn test_encode_empty_batch() {
        setup();

        assert_eq!("", encode(&MeasurementBatch::new()));
        assert_eq!("", encode(&MeasurementBatch::new().points("cpu", [])));
    }

    /// 纯数字字段的行，解析回来应该得到相同的字段集合
    #[test]
    fn test_encode_round_trip_numeric_fields() {
        setup();

        let batch = MeasurementBatch::new().point("weather", Point::new().field_integer("temperature", 21).field_double("humidity", 0.55));

        let encoded = encode(&batch);
        let (measurement, fields) = encoded.split_once(' ').unwrap();
        assert_eq!("weather", measurement);

        let parsed = fields
            .split(',')
            .map(|pair| pair.split_once('=').unwrap())
            .map(|(k, v)| (k.to_string(), v.parse::<f64>().unwrap()))
            .collect::<Vec<_>>();

        assert_eq!(vec![("temperature".to_string(), 21.0), ("humidity".to_string(), 0.55)], parsed);
    }
}
