// ==========================================
// 传感器日志导入系统 - 运行控制层
// ==========================================
// 职责: 选择格式与模式, 按目录扇出任务, 汇总终态
// 调度模型: 每个目录一个任务, 有界并发(semaphore), 阻塞式收尾;
//           目录到任务的分配是一个划分, 两个任务绝不触碰同一个文件,
//           因此任务之间无共享可变状态

// 红线: 汇总时绝不吞掉 Cancelled
// ==========================================

use crate::config::ImporterConfig;
use crate::domain::{Directory, FileOutcome, RunSummary, SourceFile};
use crate::fs_access::FileSystemAccess;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::format::FormatVersion;
use crate::importer::orchestrator::ImportOrchestrator;
use crate::store::StoreConnector;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

// ==========================================
// CancelFlag - 用户中断信号
// ==========================================
// 在文件边界检查; 置位后当前任务立即以 Cancelled 收场
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ==========================================
// RunOptions - 单次运行的模式选择
// ==========================================
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 日志格式（--legacy / --format-version N / 默认现行格式）
    pub format: FormatVersion,
    /// 严格模式: 无数据文件移入 problem
    pub strict: bool,
    /// 仅归档模式: 跳过解析与上传, 强制归档所有发现的文件
    pub archive_only: bool,
    /// 单文件模式: 绕过目录枚举, 只处理指定文件
    pub single_file: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            format: FormatVersion::current(),
            strict: false,
            archive_only: false,
            single_file: None,
        }
    }
}

// ==========================================
// RunController - 顶层入口
// ==========================================
pub struct RunController {
    config: ImporterConfig,
    connector: Arc<dyn StoreConnector>,
}

impl RunController {
    pub fn new(config: ImporterConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self { config, connector }
    }

    /// 执行一次导入运行, 返回按终态聚合的汇总
    ///
    /// 运行内不重试已落入终态的文件; Cancelled 原样上抛
    pub async fn run(&self, opts: &RunOptions, cancel: &CancelFlag) -> ImportResult<RunSummary> {
        info!(format = ?opts.format, strict = opts.strict, archive_only = opts.archive_only, "开始日志导入");

        if let Some(path) = &opts.single_file {
            return self.run_single_file(path, opts, cancel).await;
        }

        let fs = FileSystemAccess;
        let dir_pattern = self.config.device_dir_pattern()?;
        let file_pattern = self.config.logfile_pattern()?;
        let directories = fs.list_directories(&self.config.data_root, &dir_pattern)?;
        info!(directories = directories.len(), "设备目录枚举完成");

        // 有界并发: 每个目录一个任务, 许可数即工作池上限
        let semaphore = Arc::new(Semaphore::new(self.config.worker_pool_size));
        let tasks = directories.into_iter().map(|directory| {
            let semaphore = Arc::clone(&semaphore);
            let file_pattern = file_pattern.clone();
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| ImportError::InternalError(e.to_string()))?;
                if cancel.is_cancelled() {
                    return Err(ImportError::Cancelled);
                }
                let files = FileSystemAccess.list_files(&directory, &file_pattern)?;
                self.import_one_directory(directory, files, opts, cancel).await
            }
        });

        let results = join_all(tasks).await;
        self.aggregate(results)
    }

    /// 单文件模式: 文件的父目录即设备目录
    async fn run_single_file(
        &self,
        path: &Path,
        opts: &RunOptions,
        cancel: &CancelFlag,
    ) -> ImportResult<RunSummary> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                ImportError::ConfigError(format!("无法确定文件的父目录: {}", path.display()))
            })?;
        let name = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                ImportError::ConfigError(format!("无法确定设备目录名: {}", path.display()))
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                ImportError::ConfigError(format!("非法文件路径: {}", path.display()))
            })?;

        let directory = Directory {
            name,
            abs_path: parent.to_path_buf(),
        };

        let result = self
            .import_one_directory(directory, vec![file_name], opts, cancel)
            .await;
        self.aggregate(vec![result])
    }

    /// 一个目录任务: 独享连接, 顺序处理其文件
    async fn import_one_directory(
        &self,
        directory: Directory,
        files: Vec<String>,
        opts: &RunOptions,
        cancel: &CancelFlag,
    ) -> ImportResult<Vec<FileOutcome>> {
        let orchestrator = ImportOrchestrator::new(opts.format, &self.config, opts.strict);

        if opts.archive_only {
            // 批量重分类: 不解析不上传, 全部强制归档
            let mut outcomes = Vec::with_capacity(files.len());
            for file_name in files {
                if cancel.is_cancelled() {
                    return Err(ImportError::Cancelled);
                }
                let file = SourceFile {
                    directory: directory.clone(),
                    file_name,
                };
                let outcome = orchestrator.force_archive(&file)?;
                outcomes.push(FileOutcome { file, outcome });
            }
            return Ok(outcomes);
        }

        // 连接按任务独享, 不跨任务共享; 随本作用域结束确定性释放
        let store = self
            .connector
            .connect()
            .await
            .map_err(ImportError::SubmissionFailure)?;

        orchestrator
            .import_directory(&directory, files, store.as_ref(), cancel)
            .await
    }

    /// 汇总每个目录任务的结果
    ///
    /// 目录级失败(枚举失败/连接失败)只记日志, 不影响其他目录;
    /// Cancelled 必须原样上抛, 不得被汇总吞掉
    fn aggregate(
        &self,
        results: Vec<ImportResult<Vec<FileOutcome>>>,
    ) -> ImportResult<RunSummary> {
        let mut summary = RunSummary::default();
        let mut cancelled = false;

        for result in results {
            match result {
                Ok(outcomes) => {
                    for file_outcome in outcomes {
                        info!(file = %file_outcome.file, outcome = %file_outcome.outcome, "文件终态");
                        summary.record(file_outcome.outcome);
                    }
                }
                Err(ImportError::Cancelled) => cancelled = true,
                Err(e) => {
                    error!(error = %e, "目录任务失败");
                }
            }
        }

        if cancelled {
            warn!("运行被用户中断");
            return Err(ImportError::Cancelled);
        }

        info!(%summary, "导入运行完成");
        Ok(summary)
    }
}
