// ==========================================
// 传感器日志导入系统 - 核心库
// ==========================================
// 系统定位: 批处理管道 (设备日志 → 时序库)
// 数据流: 文件枚举 → 格式解析 → 类型还原 → 批次上传 → 归档/隔离
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与文件模型
pub mod domain;

// 导入层 - 解析/归一化/编排
pub mod importer;

// 文件系统访问 - 目录/文件枚举与归档移动
pub mod fs_access;

// 时序库客户端 - 批次提交
pub mod store;

// 运行控制层 - 并发调度与结果汇总
pub mod run;

// 配置层 - 不可变运行配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ImporterConfig, InfluxConfig};
pub use domain::{
    Directory, FileOutcome, ImportBatch, ImportOutcome, RawRow, RunSummary, SourceFile,
    TypedRecord, TypedValue,
};
pub use fs_access::FileSystemAccess;
pub use importer::{
    FormatVersion, ImportError, ImportOrchestrator, ImportResult, LogReader,
};
pub use run::{CancelFlag, RunController, RunOptions};
pub use store::{StoreConnector, StoreError, TimeSeriesStore};

/// 系统版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
