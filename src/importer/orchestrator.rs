// ==========================================
// 传感器日志导入系统 - 目录级导入编排器
// ==========================================
// 职责: 驱动一个目录的文件集合走完 解析 → 上传 → 移动 流程
// 失败隔离: 任何文件级异常只影响该文件自身, 兄弟文件继续处理
// 红线: Cancelled 不算文件级失败, 必须立即穿透整个任务
// ==========================================

use crate::config::ImporterConfig;
use crate::domain::{Directory, FileOutcome, ImportOutcome, SourceFile};
use crate::fs_access::FileSystemAccess;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::format::FormatVersion;
use crate::importer::log_reader::LogReader;
use crate::run::CancelFlag;
use crate::store::TimeSeriesStore;
use tracing::{error, info, trace, warn};

// ==========================================
// ImportOrchestrator
// ==========================================
pub struct ImportOrchestrator {
    fs: FileSystemAccess,
    reader: LogReader,
    archive_folder: String,
    problem_folder: String,
    /// 严格模式: 无数据文件移入 problem 而非原地保留
    strict: bool,
}

impl ImportOrchestrator {
    pub fn new(format: FormatVersion, config: &ImporterConfig, strict: bool) -> Self {
        Self {
            fs: FileSystemAccess,
            reader: LogReader::new(format, &config.time_zone),
            archive_folder: config.archive_folder.clone(),
            problem_folder: config.problem_folder.clone(),
            strict,
        }
    }

    /// 顺序处理一个目录下的文件集合, 每个文件产出一个终态
    ///
    /// # 参数
    /// - directory: 目标目录（任务独占, 与其他任务无共享状态）
    /// - files: 本次运行需要处理的文件名
    /// - store: 本任务独享的时序库连接
    /// - cancel: 用户中断信号, 在文件边界检查
    pub async fn import_directory(
        &self,
        directory: &Directory,
        files: Vec<String>,
        store: &dyn TimeSeriesStore,
        cancel: &CancelFlag,
    ) -> ImportResult<Vec<FileOutcome>> {
        info!(directory = %directory.name, files = files.len(), "开始处理目录");

        let mut outcomes = Vec::with_capacity(files.len());
        for file_name in files {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            let file = SourceFile {
                directory: directory.clone(),
                file_name,
            };

            let outcome = match self.import_file(&file, store).await {
                Ok(outcome) => outcome,
                // 中断不是文件级失败, 立即终止本任务
                Err(ImportError::Cancelled) => return Err(ImportError::Cancelled),
                Err(ImportError::SubmissionFailure(e)) => {
                    error!(file = %file, error = %e, "批次提交失败, 文件移入隔离目录");
                    self.quarantine(&file)?;
                    ImportOutcome::QuarantinedUploadFailure
                }
                // 尽可能多地导入: 其余异常按解析失败隔离, 继续处理兄弟文件
                Err(e) => {
                    error!(file = %file, error = %e, "文件处理失败, 移入隔离目录");
                    self.quarantine(&file)?;
                    ImportOutcome::QuarantinedParseFailure
                }
            };

            outcomes.push(FileOutcome { file, outcome });
        }

        info!(directory = %directory.name, "目录处理完成");
        Ok(outcomes)
    }

    /// 单个文件: 解析 → (空批次分流) → 上传 → 归档
    async fn import_file(
        &self,
        file: &SourceFile,
        store: &dyn TimeSeriesStore,
    ) -> ImportResult<ImportOutcome> {
        let batch = self.reader.read_file(file)?;

        if batch.is_empty() {
            warn!(file = %file, "文件无可用传感器数据");
            if self.strict {
                self.quarantine(file)?;
                return Ok(ImportOutcome::NoData { quarantined: true });
            }
            return Ok(ImportOutcome::NoData { quarantined: false });
        }

        trace!(
            file = %file,
            payload = %serde_json::to_string(&batch).unwrap_or_default(),
            "提交批次内容"
        );
        store.write_points(&batch).await?;

        // 上传成功后归档; rename 在同一文件系统内是原子的
        self.archive(file)?;
        info!(file = %file, points = batch.len(), "文件上传并归档完成");
        Ok(ImportOutcome::Uploaded)
    }

    /// 仅归档模式: 不解析不上传, 强制移入 archive
    pub fn force_archive(&self, file: &SourceFile) -> ImportResult<ImportOutcome> {
        self.archive(file)?;
        info!(file = %file, "文件强制归档完成");
        Ok(ImportOutcome::ForceArchived)
    }

    fn archive(&self, file: &SourceFile) -> ImportResult<()> {
        self.fs
            .move_to_subfolder(&file.directory, &file.file_name, &self.archive_folder)
    }

    fn quarantine(&self, file: &SourceFile) -> ImportResult<()> {
        warn!(file = %file, "文件移入隔离目录");
        self.fs
            .move_to_subfolder(&file.directory, &file.file_name, &self.problem_folder)
    }
}
