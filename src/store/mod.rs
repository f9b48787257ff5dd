// ==========================================
// 传感器日志导入系统 - 时序库客户端
// ==========================================
// 职责: 定义批次提交契约与 InfluxDB 实现
// 约定: 一次提交整批成败, 不存在部分确认;
//       连接按目录任务独享, 随任务作用域释放
// ==========================================

pub mod influx;

pub use influx::{InfluxConnector, InfluxStore};

use crate::domain::ImportBatch;
use async_trait::async_trait;
use thiserror::Error;

// ==========================================
// 时序库错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("时序库连接失败: {0}")]
    ConnectionError(String),

    #[error("时序库不可达: {0}")]
    Unreachable(String),

    #[error("批次写入被拒绝 (HTTP {status}): {message}")]
    WriteRejected { status: u16, message: String },
}

// ==========================================
// TimeSeriesStore Trait
// ==========================================
// 用途: 导入管道对时序库的唯一依赖面
// 实现者: InfluxStore（生产）, 测试中的 mock
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// 提交一个批次
    ///
    /// # 返回
    /// - Ok(()): 整批写入成功
    /// - Err: 整批失败（连接/拒绝）, 调用方据此隔离源文件
    async fn write_points(&self, batch: &ImportBatch) -> Result<(), StoreError>;
}

// ==========================================
// StoreConnector Trait
// ==========================================
// 用途: 每个目录任务开始时建立一个独享连接
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn TimeSeriesStore>, StoreError>;
}
