// ==========================================
// 传感器日志导入系统 - 领域模型层
// ==========================================
// 职责: 定义记录、批次、文件与结果类型
// 红线: 不含文件系统逻辑, 不含解析逻辑
// ==========================================

pub mod record;
pub mod source;

// 重导出核心类型
pub use record::{ImportBatch, RawRow, TypedRecord, TypedValue};
pub use source::{Directory, FileOutcome, ImportOutcome, RunSummary, SourceFile};
