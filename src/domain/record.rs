// ==========================================
// 传感器日志导入系统 - 记录模型
// ==========================================
// 依据: 统一记录格式 (identifier + UTC 时间戳 + 类型化字段)
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 原始行: 字段名 → 原始文本
///
/// 由格式解析器逐行产出, 可能不完整（旧格式日志中夹杂自由文本日志行）
pub type RawRow = HashMap<String, String>;

// ==========================================
// 类型化字段值
// ==========================================
// 历史固件日志中所有字段都是文本, 入库前按字面量规则还原类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bool(v) => write!(f, "{}", v),
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Text(v) => write!(f, "{}", v),
        }
    }
}

// ==========================================
// 类型化记录
// ==========================================
// 不变式:
// - identifier 非空
// - timestamp 为合法 UTC 时刻
// - fields 不含 identifier / timestamp 键, 只含通过值格式校验的条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedRecord {
    /// 设备标识（历史上为 15 位硬件标识）
    pub identifier: String,
    /// 采集时刻（已从设备本地时区换算为 UTC）
    pub timestamp: DateTime<Utc>,
    /// 传感器数据字段
    pub fields: BTreeMap<String, TypedValue>,
}

// ==========================================
// 导入批次
// ==========================================
// 每个源文件产出一个批次, 整批提交到时序库
// 空批次表示"无可用数据", 与解析失败是两种不同结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub points: Vec<TypedRecord>,
}

impl ImportBatch {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn push(&mut self, record: TypedRecord) {
        self.points.push(record);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
