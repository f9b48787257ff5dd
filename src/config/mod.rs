// ==========================================
// 传感器日志导入系统 - 运行配置
// ==========================================
// 职责: 配置文件加载与校验
// 约定: 配置在进程启动时加载一次, 作为不可变值传入
//       运行控制层; 下层组件不读取任何全局状态
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// ==========================================
// ImporterConfig - 导入管道配置
// ==========================================
#[derive(Debug, Clone, Deserialize)]
pub struct ImporterConfig {
    /// 数据根目录（设备目录的父目录）
    pub data_root: PathBuf,

    /// 设备目录名模式（完整匹配）
    #[serde(default = "default_device_dir_regex")]
    pub device_dir_regex: String,

    /// 日志文件名模式（完整匹配）
    #[serde(default = "default_logfile_regex")]
    pub logfile_regex: String,

    /// 归档子目录名
    #[serde(default = "default_archive_folder")]
    pub archive_folder: String,

    /// 隔离子目录名
    #[serde(default = "default_problem_folder")]
    pub problem_folder: String,

    /// 设备配置的 IANA 时区名, 日志时间戳按此时区解释
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// 目录级并发上限
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// 时序库连接配置
    pub influx: InfluxConfig,
}

// ==========================================
// InfluxConfig - 时序库配置
// ==========================================
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    /// 服务地址, 例如 http://localhost:8086
    pub url: String,

    /// 目标数据库名
    pub database: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// 测点名
    #[serde(default = "default_measurement")]
    pub measurement: String,

    /// 单次写入超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_device_dir_regex() -> String {
    // 设备标识为 15 位数字
    "[0-9]{15}".to_string()
}

fn default_logfile_regex() -> String {
    r".+\.csv".to_string()
}

fn default_archive_folder() -> String {
    "archive".to_string()
}

fn default_problem_folder() -> String {
    "problem".to_string()
}

fn default_time_zone() -> String {
    "America/Toronto".to_string()
}

fn default_worker_pool_size() -> usize {
    14
}

fn default_measurement() -> String {
    "sensor_data".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ImporterConfig {
    /// 从 TOML 配置文件加载
    pub fn load(path: &Path) -> ImportResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ImportError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        let config: ImporterConfig = toml::from_str(&text)
            .map_err(|e| ImportError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ImportResult<()> {
        if self.worker_pool_size == 0 {
            return Err(ImportError::ConfigError(
                "worker_pool_size 必须大于 0".to_string(),
            ));
        }
        // 提前编译一次, 让配置错误在启动时暴露
        self.device_dir_pattern()?;
        self.logfile_pattern()?;
        Ok(())
    }

    /// 设备目录名匹配模式（完整匹配）
    pub fn device_dir_pattern(&self) -> ImportResult<Regex> {
        full_match_regex(&self.device_dir_regex)
    }

    /// 日志文件名匹配模式（完整匹配）
    pub fn logfile_pattern(&self) -> ImportResult<Regex> {
        full_match_regex(&self.logfile_regex)
    }
}

/// 将模式包装为完整匹配（对齐 re.fullmatch 语义, 不是子串匹配）
pub fn full_match_regex(raw: &str) -> ImportResult<Regex> {
    Regex::new(&format!("^(?:{})$", raw))
        .map_err(|e| ImportError::ConfigError(format!("非法模式 {}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_defaults() {
        let toml_text = r#"
            data_root = "/var/lib/sensor-logs"

            [influx]
            url = "http://localhost:8086"
            database = "sensors"
        "#;
        let config: ImporterConfig = toml::from_str(toml_text).unwrap();

        assert_eq!(config.device_dir_regex, "[0-9]{15}");
        assert_eq!(config.archive_folder, "archive");
        assert_eq!(config.problem_folder, "problem");
        assert_eq!(config.time_zone, "America/Toronto");
        assert_eq!(config.worker_pool_size, 14);
        assert_eq!(config.influx.measurement, "sensor_data");
        assert_eq!(config.influx.username, None);
    }

    #[test]
    fn test_full_match_semantics() {
        let pattern = full_match_regex("[0-9]{15}").unwrap();
        assert!(pattern.is_match("123456789012345"));
        // 子串命中不算匹配
        assert!(!pattern.is_match("x123456789012345"));
        assert!(!pattern.is_match("1234567890123456"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = full_match_regex("[0-9{15}").unwrap_err();
        assert!(matches!(err, ImportError::ConfigError(_)));
    }
}
