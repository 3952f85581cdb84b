// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::locator::{text_content, Locator, LocatorError};
use crate::domain::models::record::ExtractedFields;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 字段定位规则
///
/// 逻辑字段名与定位表达式的对应关系，由调用方按提取任务提供。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocator {
    /// 字段名
    pub name: String,
    /// 定位表达式（路径或 `css:` 前缀的选择器）
    pub locator: String,
}

impl FieldLocator {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// 提取任务
///
/// 一次性编译全部定位表达式。无法编译的表达式会记录一条警告，
/// 对应字段在每个节点上都得到空值。
#[derive(Debug, Clone)]
pub struct ExtractionTask {
    fields: Vec<(String, Result<Locator, LocatorError>)>,
}

impl ExtractionTask {
    /// 编译字段规则
    ///
    /// 同名字段以最后一条规则为准，位置保持首次出现处。
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = FieldLocator>,
    {
        let mut fields: Vec<(String, Result<Locator, LocatorError>)> = Vec::new();

        for rule in rules {
            let compiled = Locator::parse(&rule.locator);
            match fields.iter_mut().find(|(name, _)| *name == rule.name) {
                Some(slot) => slot.1 = compiled,
                None => fields.push((rule.name, compiled)),
            }
        }

        let task = Self { fields };
        for (field, e) in task.invalid_fields() {
            warn!(field = %field, error = %e, "Locator failed to compile; field will be empty");
        }
        task
    }

    /// 字段名（按调用方顺序）
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// 无法编译的字段
    pub fn invalid_fields(&self) -> impl Iterator<Item = (&str, &LocatorError)> {
        self.fields
            .iter()
            .filter_map(|(name, compiled)| compiled.as_ref().err().map(|e| (name.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 提取服务
///
/// 从已解析的文档节点中尽力提取字段文本。定位失败不会报错，
/// 只会得到空字符串。
pub struct ExtractionService;

impl ExtractionService {
    /// 对单个节点求值定位表达式，取第一个匹配的去空白文本
    ///
    /// 零匹配时返回空字符串。
    pub fn extract_text(node: ElementRef<'_>, locator: &Locator) -> String {
        locator.first(node).map(text_content).unwrap_or_default()
    }

    /// 按原始表达式提取单个字段
    ///
    /// 表达式无法编译时记录警告并返回空字符串；零匹配时静默返回空字符串。
    pub fn extract_field(node: ElementRef<'_>, expr: &str) -> String {
        match Locator::parse(expr) {
            Ok(locator) => Self::extract_text(node, &locator),
            Err(e) => {
                warn!(locator = expr, error = %e, "Locator failed to compile");
                String::new()
            }
        }
    }

    /// 对单个节点应用全部字段规则
    pub fn extract(node: ElementRef<'_>, task: &ExtractionTask) -> ExtractedFields {
        let mut fields = ExtractedFields::new();
        for (name, compiled) in &task.fields {
            let value = match compiled {
                Ok(locator) => Self::extract_text(node, locator),
                Err(_) => String::new(),
            };
            fields.insert(name.clone(), value);
        }
        fields
    }

    /// 对一组兄弟节点逐个提取，每个节点一条结果
    pub fn extract_all<'a, I>(nodes: I, task: &ExtractionTask) -> Vec<ExtractedFields>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let rows: Vec<ExtractedFields> = nodes
            .into_iter()
            .map(|node| Self::extract(node, task))
            .collect();
        debug!(nodes = rows.len(), fields = task.len(), "Extracted fields");
        rows
    }

    /// 列视图：字段名到各节点取值的列表，行与 `extract_all` 对齐
    pub fn extract_columns<'a, I>(nodes: I, task: &ExtractionTask) -> Vec<(String, Vec<String>)>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let rows = Self::extract_all(nodes, task);
        task.field_names()
            .map(|name| {
                let values = rows
                    .iter()
                    .map(|row| row.get(name).unwrap_or_default().to_string())
                    .collect();
                (name.to_string(), values)
            })
            .collect()
    }

    /// 定位列表容器，返回其元素子节点
    ///
    /// 容器不存在时返回空列表。
    pub fn items<'a>(document: &'a Html, container: &Locator) -> Vec<ElementRef<'a>> {
        match container.first(document.root_element()) {
            Some(list) => list.children().filter_map(ElementRef::wrap).collect(),
            None => {
                debug!(locator = %container, "List container not found");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
