// ==========================================
// 传感器日志导入系统 - 文件来源与结果模型
// ==========================================
// 职责: 目录/文件身份、文件终态、运行汇总
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ==========================================
// 日志目录
// ==========================================
// 每个设备一个目录, 目录名即设备标识（旧格式依赖此规则）
// 运行开始时枚举一次, 运行期间视为不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Directory {
    pub name: String,
    pub abs_path: PathBuf,
}

// ==========================================
// 源文件
// ==========================================
// 身份 = (目录, 文件名); 每次运行至多打开一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub directory: Directory,
    pub file_name: String,
}

impl SourceFile {
    /// 文件的当前绝对路径（移动到归档/隔离子目录前）
    pub fn path(&self) -> PathBuf {
        self.directory.abs_path.join(&self.file_name)
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.directory.name, self.file_name)
    }
}

// ==========================================
// 文件终态
// ==========================================
// 每个被处理的文件在一次运行中恰好落入一个终态, 运行内不重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportOutcome {
    /// 批次上传成功, 文件已移入 archive
    Uploaded,
    /// 文件无可用传感器数据; 严格模式下移入 problem, 否则原地保留
    NoData { quarantined: bool },
    /// 仅归档模式: 未解析未上传, 强制移入 archive
    ForceArchived,
    /// 解析失败（IO 错误 / 时间戳格式错误 / 结构损坏）, 文件已移入 problem
    QuarantinedParseFailure,
    /// 批次提交失败, 文件已移入 problem
    QuarantinedUploadFailure,
}

impl ImportOutcome {
    pub fn is_quarantined(&self) -> bool {
        matches!(
            self,
            ImportOutcome::QuarantinedParseFailure
                | ImportOutcome::QuarantinedUploadFailure
                | ImportOutcome::NoData { quarantined: true }
        )
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::Uploaded => write!(f, "UPLOADED"),
            ImportOutcome::NoData { quarantined: true } => write!(f, "NO_DATA_QUARANTINED"),
            ImportOutcome::NoData { quarantined: false } => write!(f, "NO_DATA"),
            ImportOutcome::ForceArchived => write!(f, "FORCE_ARCHIVED"),
            ImportOutcome::QuarantinedParseFailure => write!(f, "QUARANTINED_PARSE_FAILURE"),
            ImportOutcome::QuarantinedUploadFailure => write!(f, "QUARANTINED_UPLOAD_FAILURE"),
        }
    }
}

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: SourceFile,
    pub outcome: ImportOutcome,
}

// ==========================================
// 运行汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub uploaded: usize,
    pub no_data: usize,
    pub no_data_quarantined: usize,
    pub force_archived: usize,
    pub quarantined_parse: usize,
    pub quarantined_upload: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Uploaded => self.uploaded += 1,
            ImportOutcome::NoData { quarantined: false } => self.no_data += 1,
            ImportOutcome::NoData { quarantined: true } => self.no_data_quarantined += 1,
            ImportOutcome::ForceArchived => self.force_archived += 1,
            ImportOutcome::QuarantinedParseFailure => self.quarantined_parse += 1,
            ImportOutcome::QuarantinedUploadFailure => self.quarantined_upload += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.uploaded
            + self.no_data
            + self.no_data_quarantined
            + self.force_archived
            + self.quarantined_parse
            + self.quarantined_upload
    }

    /// 是否有任何文件落入隔离终态（决定进程退出码）
    pub fn has_quarantine(&self) -> bool {
        self.quarantined_parse + self.quarantined_upload + self.no_data_quarantined > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uploaded={} no_data={} no_data_quarantined={} force_archived={} \
             quarantined_parse={} quarantined_upload={}",
            self.uploaded,
            self.no_data,
            self.no_data_quarantined,
            self.force_archived,
            self.quarantined_parse,
            self.quarantined_upload
        )
    }
}
