// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::{ExtractedFields, RecordSet};
use crate::utils::errors::SinkError;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// 分隔文本输出
///
/// 每个映射写一行，每个出现过的键一列（按首次出现顺序），
/// 缺失的键写空单元格。
#[derive(Debug, Clone, Copy)]
pub struct TabularSink {
    delimiter: char,
}

impl Default for TabularSink {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TabularSink {
    /// 创建输出器；引号和换行不能作为分隔符
    pub fn new(delimiter: char) -> Result<Self, SinkError> {
        if matches!(delimiter, '"' | '\n' | '\r') {
            return Err(SinkError::InvalidDelimiter(delimiter));
        }
        Ok(Self { delimiter })
    }

    /// 写出记录集
    pub fn write_records<W: Write>(&self, writer: W, records: &RecordSet) -> Result<(), SinkError> {
        let rows = records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(key, value)| (key.to_string(), render_value(value)))
                    .collect()
            })
            .collect();
        self.write_rows(writer, rows)
    }

    /// 写出提取结果
    pub fn write_fields<W: Write>(&self, writer: W, rows: &[ExtractedFields]) -> Result<(), SinkError> {
        let rows = rows
            .iter()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect()
            })
            .collect();
        self.write_rows(writer, rows)
    }

    /// 把记录集写到文件
    pub fn records_to_path(&self, path: impl AsRef<Path>, records: &RecordSet) -> Result<(), SinkError> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        self.write_records(file, records)?;
        info!(path = %path.display(), rows = records.len(), "Records written");
        Ok(())
    }

    /// 把提取结果写到文件
    pub fn fields_to_path(&self, path: impl AsRef<Path>, rows: &[ExtractedFields]) -> Result<(), SinkError> {
        let path = path.as_ref();
        let file = BufWriter::new(File::create(path)?);
        self.write_fields(file, rows)?;
        info!(path = %path.display(), rows = rows.len(), "Extracted fields written");
        Ok(())
    }

    fn write_rows<W: Write>(&self, mut writer: W, rows: Vec<Vec<(String, String)>>) -> Result<(), SinkError> {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for (key, _) in row {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        if columns.is_empty() {
            writer.flush()?;
            return Ok(());
        }

        self.write_line(&mut writer, columns.iter().map(String::as_str))?;
        for row in &rows {
            let cells = columns.iter().map(|column| {
                row.iter()
                    .find(|(key, _)| key == column)
                    .map(|(_, value)| value.as_str())
                    .unwrap_or("")
            });
            self.write_line(&mut writer, cells)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_line<'a, W: Write>(
        &self,
        writer: &mut W,
        cells: impl Iterator<Item = &'a str>,
    ) -> Result<(), SinkError> {
        let mut count = 0;
        let mut blank = true;
        for (i, cell) in cells.enumerate() {
            count += 1;
            blank &= cell.is_empty();
            if i > 0 {
                write!(writer, "{}", self.delimiter)?;
            }
            if self.needs_quotes(cell) {
                write!(writer, "\"{}\"", cell.replace('"', "\"\""))?;
            } else {
                writer.write_all(cell.as_bytes())?;
            }
        }
        // 单列空值写成 "" 以免成为被读取方跳过的空行
        if count == 1 && blank {
            writer.write_all(b"\"\"")?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn needs_quotes(&self, cell: &str) -> bool {
        cell.contains(self.delimiter) || cell.contains(|c: char| matches!(c, '"' | '\n' | '\r'))
    }
}

/// 标量直接输出，嵌套值输出紧凑JSON，null 为空
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
