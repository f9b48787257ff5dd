// ==========================================
// 传感器日志导入系统 - 日志格式策略表
// ==========================================
// 职责: 区分不兼容的历史日志布局, 提供每个格式的
//       行筛选 / 值筛选 / 标识提取策略
// 设计: 带标签枚举 + 按变体分派的方法, 热路径无虚分派;
//       策略在运行开始时选定一次, 按值传入编排器
// ==========================================

use crate::domain::RawRow;
use crate::importer::value_parser::{parse_integer_truncating, CODE_VERSION_FIELD};
use tracing::debug;

/// 格式版本阈值: code_version < 21 为旧格式, >= 21 为现行格式
pub const FORMAT_VERSION_THRESHOLD: i64 = 21;

/// 时间戳字段名（所有格式共用）
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// 现行格式的设备标识字段名
pub const IMEI_FIELD: &str = "IMEI";

/// 旧格式固定列布局: 无表头, 按位置对应以下字段名
pub const LEGACY_FIELD_NAMES: [&str; 32] = [
    "timestamp",
    "class",
    "code_version",
    "latitude",
    "longitude",
    "network_latitude",
    "network_longitude",
    "acceleration_x",
    "acceleration_y",
    "acceleration_z",
    "magnetic_field_x",
    "magnetic_field_y",
    "magnetic_field_z",
    "gyroscope_x",
    "gyroscope_y",
    "gyroscope_z",
    "atmospheric_pressure",
    "light_level",
    "gravitational_acceleration",
    "linear_acceleration_x",
    "linear_acceleration_y",
    "linear_acceleration_z",
    "step_count",
    "battery_temperature",
    "ambient_temperature",
    "voltage",
    "charging_current",
    "significant_motion",
    "proximity_sensor",
    "phone_ip",
    "phone_battery_state",
    "discharge_current",
];

// ==========================================
// 格式版本
// ==========================================
// Legacy:     无表头定长列, 行内混有自由文本日志行
// WellFormed: 带表头 CSV, code_version 仍作为数据字段保留
// V1/V2/V3:   带表头 CSV, code_version 仅参与行筛选, 不落入数据字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    Legacy,
    WellFormed,
    V1,
    V2,
    V3,
}

impl FormatVersion {
    /// 默认的"现行"格式
    pub fn current() -> Self {
        FormatVersion::V3
    }

    /// 按 CLI 的 --format-version 数字选择版本化格式
    pub fn from_version_flag(version: u8) -> Option<Self> {
        match version {
            1 => Some(FormatVersion::V1),
            2 => Some(FormatVersion::V2),
            3 => Some(FormatVersion::V3),
            _ => None,
        }
    }

    /// 旧格式文件无表头, 其余格式自描述
    pub fn has_headers(&self) -> bool {
        !matches!(self, FormatVersion::Legacy)
    }

    fn is_versioned(&self) -> bool {
        matches!(self, FormatVersion::V1 | FormatVersion::V2 | FormatVersion::V3)
    }

    /// 行是否属于本格式的数据范围
    ///
    /// 旧格式: code_version 解析为整数且低于阈值; 解析失败的行是
    /// 混入的自由文本日志行, 静默跳过而非报错。
    /// 现行格式: code_version 存在且达到阈值; 缺失说明是旧数据行,
    /// 损坏的 code_version 同样按跳过处理（与产品方确认中）。
    pub fn row_is_in_scope(&self, row: &RawRow) -> bool {
        let version = match row.get(CODE_VERSION_FIELD) {
            Some(raw) => match parse_integer_truncating(raw) {
                Some(v) => v,
                None => {
                    debug!(value = %raw, "code_version 字段无法解析, 跳过该行");
                    return false;
                }
            },
            None => return false,
        };

        match self {
            FormatVersion::Legacy => version < FORMAT_VERSION_THRESHOLD,
            _ => version >= FORMAT_VERSION_THRESHOLD,
        }
    }

    /// 值是否参与输出
    ///
    /// 旧格式排除空串 / "null" / "nan"; 现行格式只要求非空
    pub fn value_is_in_scope(&self, value: &str) -> bool {
        match self {
            FormatVersion::Legacy => {
                !value.is_empty()
                    && !value.eq_ignore_ascii_case("null")
                    && !value.eq_ignore_ascii_case("nan")
            }
            _ => !value.is_empty(),
        }
    }

    /// 提取设备标识
    ///
    /// 旧格式: 标识从不出现在行内, 使用所在目录名（调用方按文件
    /// 解析一次后显式传入, 不作为解析器状态）。
    /// 现行格式: 从行内弹出 IMEI 字段, 避免其重复落入数据字段。
    pub fn identifier_of(&self, row: &mut RawRow, directory_identifier: &str) -> Option<String> {
        match self {
            FormatVersion::Legacy => Some(directory_identifier.to_string()),
            _ => row.remove(IMEI_FIELD).filter(|imei| !imei.is_empty()),
        }
    }

    /// 版本化格式在组装记录前消费 code_version
    ///
    /// 该字段仅用于行筛选; WellFormed 与 Legacy 将其保留为数据字段
    pub fn consume_code_version(&self, row: &mut RawRow) {
        if self.is_versioned() {
            row.remove(CODE_VERSION_FIELD);
        }
    }
}
