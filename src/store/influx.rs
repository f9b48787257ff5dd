// ==========================================
// 传感器日志导入系统 - InfluxDB 写入实现
// ==========================================
// 协议: InfluxDB 行协议 (line protocol), 纳秒精度
// 布局: measurement=sensor_data, tag=imei, 字段为传感器数据
// ==========================================

use crate::config::InfluxConfig;
use crate::domain::{ImportBatch, TypedValue};
use crate::store::{StoreConnector, StoreError, TimeSeriesStore};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

// ==========================================
// InfluxConnector - 连接工厂
// ==========================================
pub struct InfluxConnector {
    config: InfluxConfig,
}

impl InfluxConnector {
    pub fn new(config: InfluxConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for InfluxConnector {
    async fn connect(&self) -> Result<Box<dyn TimeSeriesStore>, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Box::new(InfluxStore {
            client,
            config: self.config.clone(),
        }))
    }
}

// ==========================================
// InfluxStore - 行协议写入器
// ==========================================
pub struct InfluxStore {
    client: reqwest::Client,
    config: InfluxConfig,
}

#[async_trait]
impl TimeSeriesStore for InfluxStore {
    async fn write_points(&self, batch: &ImportBatch) -> Result<(), StoreError> {
        let body = encode_line_protocol(&self.config.measurement, batch);
        let url = format!("{}/write", self.config.url.trim_end_matches('/'));

        debug!(points = batch.len(), database = %self.config.database, "提交批次");

        let mut request = self
            .client
            .post(&url)
            .query(&[
                ("db", self.config.database.as_str()),
                ("precision", "ns"),
            ])
            .body(body);

        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::WriteRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// 将批次编码为 InfluxDB 行协议文本
///
/// 没有任何数据字段的记录无法构成合法的行协议行, 直接跳过
pub fn encode_line_protocol(measurement: &str, batch: &ImportBatch) -> String {
    let mut lines = String::new();
    for record in &batch.points {
        if record.fields.is_empty() {
            warn!(identifier = %record.identifier, "记录无数据字段, 不写入");
            continue;
        }

        lines.push_str(&escape_key(measurement));
        lines.push_str(",imei=");
        lines.push_str(&escape_key(&record.identifier));
        lines.push(' ');

        let mut first = true;
        for (key, value) in &record.fields {
            if !first {
                lines.push(',');
            }
            first = false;
            lines.push_str(&escape_key(key));
            lines.push('=');
            lines.push_str(&encode_field_value(value));
        }

        lines.push(' ');
        // 设备日志时间均在纳秒可表示范围内
        let nanos = record.timestamp.timestamp_nanos_opt().unwrap_or(0);
        lines.push_str(&nanos.to_string());
        lines.push('\n');
    }
    lines
}

/// 行协议字段值编码: 整数带 i 后缀, 字符串带引号
fn encode_field_value(value: &TypedValue) -> String {
    match value {
        TypedValue::Bool(v) => v.to_string(),
        TypedValue::Int(v) => format!("{}i", v),
        TypedValue::Float(v) => format!("{}", v),
        TypedValue::Text(v) => format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

/// measurement / tag / 字段键转义: 逗号、等号、空格
fn escape_key(raw: &str) -> String {
    raw.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
