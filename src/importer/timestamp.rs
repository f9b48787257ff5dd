// ==========================================
// 传感器日志导入系统 - 时间戳归一化
// ==========================================
// 职责: 设备本地墙钟时间 → UTC 绝对时刻
// 红线: 时区信息缺失/无法识别是硬错误, 绝不默默按 UTC 处理
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// 设备日志固定时间戳格式: YYYY-MM-DD HH:MM:SS.ffffff
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%6f";

/// 将本地墙钟时间戳解释为指定时区的时刻, 并换算为 UTC
///
/// # 参数
/// - text: 固定格式的时间戳文本
/// - zone_name: IANA 时区名（设备配置的时区, 不是 UTC）
///
/// # 返回
/// - Ok(DateTime<Utc>): 换算后的绝对时刻
/// - Err(MalformedTimestamp): 文本不符合格式, 或时区名无法识别
pub fn normalize(text: &str, zone_name: &str) -> ImportResult<DateTime<Utc>> {
    let zone: Tz = zone_name
        .parse()
        .map_err(|_| ImportError::MalformedTimestamp {
            text: text.to_string(),
            message: format!("无法识别的时区: {}", zone_name),
        })?;

    let naive =
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| {
            ImportError::MalformedTimestamp {
                text: text.to_string(),
                message: e.to_string(),
            }
        })?;

    match zone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        // 夏令时回拨造成的重复墙钟时间: 取较早的一个时刻
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        // 夏令时跳变造成的不存在墙钟时间
        LocalResult::None => Err(ImportError::MalformedTimestamp {
            text: text.to_string(),
            message: format!("该墙钟时间在时区 {} 中不存在", zone_name),
        }),
    }
}
