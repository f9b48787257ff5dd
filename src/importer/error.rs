// ==========================================
// 传感器日志导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略:
// - 行级异常(code_version 不可解析/字段被过滤)就地恢复, 不进入此类型
// - 文件级异常由编排器捕获并路由到 problem 文件夹
// - Cancelled 永不被捕获, 直接穿透到运行控制层
// ==========================================

use crate::store::StoreError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件移动失败: {from} → {to}: {message}")]
    FileMoveError {
        from: String,
        to: String,
        message: String,
    },

    // ===== 记录相关错误 =====
    #[error("时间戳格式错误: {text} ({message})")]
    MalformedTimestamp { text: String, message: String },

    #[error("记录缺少时间戳字段 (行 {row})")]
    MissingTimestamp { row: usize },

    #[error("记录缺少设备标识字段 (行 {row})")]
    MissingIdentifier { row: usize },

    // ===== 上传相关错误 =====
    #[error("批次提交失败: {0}")]
    SubmissionFailure(#[from] StoreError),

    // ===== 配置错误 =====
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ===== 运行控制 =====
    #[error("导入被用户中断")]
    Cancelled,

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
