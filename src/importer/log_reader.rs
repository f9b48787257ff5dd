// ==========================================
// 传感器日志导入系统 - 日志文件读取器
// ==========================================
// 职责: 按所选格式将单个日志文件流式解析为导入批次
// 流程: 逐行读取 → 行筛选 → 时间戳归一化 → 标识提取
//       → 字段类型还原 → 组装 TypedRecord
// ==========================================

use crate::domain::{ImportBatch, RawRow, SourceFile, TypedRecord};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::format::{FormatVersion, LEGACY_FIELD_NAMES, TIMESTAMP_FIELD};
use crate::importer::timestamp;
use crate::importer::value_parser;
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::fs::File;
use tracing::{debug, trace};

// ==========================================
// LogReader - 单文件解析入口
// ==========================================
// 实例不携带每文件状态, 可安全地在工作任务间共享
pub struct LogReader {
    format: FormatVersion,
    /// 设备配置的 IANA 时区名, 所有日志时间戳按此时区解释
    time_zone: String,
}

impl LogReader {
    pub fn new(format: FormatVersion, time_zone: &str) -> Self {
        Self {
            format,
            time_zone: time_zone.to_string(),
        }
    }

    /// 将一个源文件解析为导入批次
    ///
    /// # 返回
    /// - Ok(ImportBatch): 空批次表示"无可用传感器数据", 不是错误
    /// - Err: 文件级异常（IO 错误 / CSV 结构损坏 / 时间戳格式错误）
    ///
    /// 不在数据范围内的行（旧日志中的自由文本行、版本不匹配的行）
    /// 被静默跳过, 不影响同文件其余行。
    pub fn read_file(&self, file: &SourceFile) -> ImportResult<ImportBatch> {
        let path = file.path();
        debug!(file = %file, "读取日志文件");

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let handle = File::open(&path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(self.format.has_headers())
            .flexible(true) // 允许行长度不一致（旧日志行经常截断）
            .from_reader(handle);

        // 表头: 旧格式使用固定列布局, 现行格式自描述
        let headers: Vec<String> = if self.format.has_headers() {
            reader
                .headers()?
                .iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            LEGACY_FIELD_NAMES.iter().map(|h| h.to_string()).collect()
        };

        // 旧格式的设备标识来自目录名, 解析一次后对整个文件复用
        let directory_identifier = file.directory.name.as_str();

        let mut batch = ImportBatch::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = row_idx + 1;

            let mut row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), value.trim().to_string()))
                .collect();

            if !self.format.row_is_in_scope(&row) {
                trace!(row = row_number, "行不在数据范围内, 跳过");
                continue;
            }

            batch.push(self.assemble_record(&mut row, directory_identifier, row_number)?);
        }

        debug!(file = %file, points = batch.len(), "文件解析完成");
        Ok(batch)
    }

    /// 将一个在范围内的行组装为类型化记录
    fn assemble_record(
        &self,
        row: &mut RawRow,
        directory_identifier: &str,
        row_number: usize,
    ) -> ImportResult<TypedRecord> {
        // 时间戳先弹出, 保证不落入数据字段
        let raw_timestamp = row
            .remove(TIMESTAMP_FIELD)
            .ok_or(ImportError::MissingTimestamp { row: row_number })?;
        let instant = timestamp::normalize(&raw_timestamp, &self.time_zone)?;

        let identifier = self
            .format
            .identifier_of(row, directory_identifier)
            .ok_or(ImportError::MissingIdentifier { row: row_number })?;

        self.format.consume_code_version(row);

        let fields: BTreeMap<_, _> = row
            .iter()
            .filter(|(_, value)| self.format.value_is_in_scope(value))
            .map(|(key, value)| (key.clone(), value_parser::coerce(key, value)))
            .collect();

        Ok(TypedRecord {
            identifier,
            timestamp: instant,
            fields,
        })
    }
}
