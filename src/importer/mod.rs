// ==========================================
// 传感器日志导入系统 - 导入层
// ==========================================
// 职责: 多格式日志解析、类型还原、目录级编排
// 数据流: RawRow → TypedRecord → ImportBatch → 上传/归档
// ==========================================

// 模块声明
pub mod error;
pub mod format;
pub mod log_reader;
pub mod orchestrator;
pub mod timestamp;
pub mod value_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use format::{FormatVersion, FORMAT_VERSION_THRESHOLD, IMEI_FIELD, TIMESTAMP_FIELD};
pub use log_reader::LogReader;
pub use orchestrator::ImportOrchestrator;
