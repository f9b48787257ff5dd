// ==========================================
// 传感器日志导入系统 - 日志文件复位工具
// ==========================================
// 用途: 将已归档/已隔离的文件移回父目录, 恢复导入前状态
// 说明: 是导入移动操作的对称逆操作, 主要服务于重放与排障
// ==========================================

use clap::Parser;
use sensor_log_import::{logging, FileSystemAccess, ImporterConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "reset-log-files",
    version,
    about = "将 archive / problem 子目录中的日志文件移回父目录"
)]
struct Cli {
    /// 配置文件路径
    #[arg(long = "config", value_name = "PATH", default_value = "importer.toml")]
    config: PathBuf,

    /// 仅移回 archive 子目录中的文件
    #[arg(short = 'a', long = "archive")]
    archive: bool,

    /// 仅移回 problem 子目录中的文件
    #[arg(short = 'p', long = "problem")]
    problem: bool,

    /// 输出调试日志
    #[arg(long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = match ImporterConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "配置加载失败");
            return ExitCode::from(2);
        }
    };

    // 未指定任何子目录时, 两个保留子目录都复位
    let default_behaviour = !cli.archive && !cli.problem;

    match reset(&config, cli.archive || default_behaviour, cli.problem || default_behaviour) {
        Ok(moved) => {
            println!("复位完成: 移回 {} 个文件", moved);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "复位失败");
            ExitCode::from(2)
        }
    }
}

fn reset(
    config: &ImporterConfig,
    archive: bool,
    problem: bool,
) -> sensor_log_import::ImportResult<usize> {
    let fs = FileSystemAccess;
    let pattern = config.device_dir_pattern()?;
    let directories = fs.list_directories(&config.data_root, &pattern)?;
    info!(directories = directories.len(), "设备目录枚举完成");

    let mut moved = 0;
    for directory in &directories {
        if archive {
            info!(directory = %directory.name, "移回 archive 中的文件");
            moved += fs.restore_from_subfolder(directory, &config.archive_folder)?;
        }
        if problem {
            info!(directory = %directory.name, "移回 problem 中的文件");
            moved += fs.restore_from_subfolder(directory, &config.problem_folder)?;
        }
    }

    Ok(moved)
}
