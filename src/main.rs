// ==========================================
// 传感器日志导入系统 - 导入命令入口
// ==========================================
// 用法: import-logs [--config PATH] [-l|--legacy] [--format-version N]
//                   [-s|--strict] [--archive] [--debug] [FILE]
// 退出码: 0 全部成功; 1 存在被隔离的文件; 2 配置/运行错误; 130 用户中断
// ==========================================

use clap::Parser;
use sensor_log_import::importer::FormatVersion;
use sensor_log_import::store::InfluxConnector;
use sensor_log_import::{logging, CancelFlag, ImportError, ImporterConfig, RunController, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "import-logs",
    version,
    about = "将设备日志文件导入时序库, 并按结果归档或隔离"
)]
struct Cli {
    /// 配置文件路径
    #[arg(long = "config", value_name = "PATH", default_value = "importer.toml")]
    config: PathBuf,

    /// 使用旧版(无表头定长列)日志解析器
    #[arg(short = 'l', long = "legacy", conflicts_with = "format_version")]
    legacy: bool,

    /// 显式选择版本化格式 (1/2/3); 默认为现行格式
    #[arg(long = "format-version", value_name = "N")]
    format_version: Option<u8>,

    /// 严格模式: 无数据文件移入 problem 文件夹(默认原地保留)
    #[arg(short = 's', long = "strict")]
    strict: bool,

    /// 仅归档: 跳过解析与上传, 将所有发现的文件强制移入 archive
    #[arg(long = "archive")]
    archive: bool,

    /// 输出调试日志
    #[arg(long = "debug")]
    debug: bool,

    /// 单文件模式: 仅处理指定文件(绕过目录枚举)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    info!("传感器日志导入系统 v{}", sensor_log_import::VERSION);

    let config = match ImporterConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "配置加载失败");
            return ExitCode::from(2);
        }
    };

    let format = if cli.legacy {
        info!("使用旧版日志解析器");
        FormatVersion::Legacy
    } else {
        match cli.format_version {
            None => FormatVersion::current(),
            Some(n) => match FormatVersion::from_version_flag(n) {
                Some(format) => format,
                None => {
                    error!(version = n, "不支持的格式版本(可选: 1/2/3)");
                    return ExitCode::from(2);
                }
            },
        }
    };

    let opts = RunOptions {
        format,
        strict: cli.strict,
        archive_only: cli.archive,
        single_file: cli.file,
    };

    let connector = Arc::new(InfluxConnector::new(config.influx.clone()));
    let controller = RunController::new(config, connector);

    // 中断信号: 置位取消标志, 任务在文件边界立即退出
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到中断信号, 正在停止");
                cancel.cancel();
            }
        });
    }

    match controller.run(&opts, &cancel).await {
        Ok(summary) => {
            println!("导入完成: {}", summary);
            if summary.has_quarantine() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(ImportError::Cancelled) => {
            warn!("导入被用户中断");
            ExitCode::from(130)
        }
        Err(e) => {
            error!(error = %e, "导入运行失败");
            ExitCode::from(2)
        }
    }
}
