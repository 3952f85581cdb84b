// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    config::settings::{ExtractionSettings, Settings},
    domain::{
        locator::{Locator, LocatorError},
        models::record::{ExtractedFields, RecordSet},
        services::extraction_service::{ExtractionService, ExtractionTask},
    },
    engines::{
        paginated_fetcher::PaginatedFetcher,
        traits::{FetchError, PageTransport},
    },
    infrastructure::tabular_sink::TabularSink,
    utils::errors::SinkError,
};
use scraper::Html;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use url::Url;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Invalid item locator: {0}")]
    Locator(#[from] LocatorError),
    #[error("Output failed: {0}")]
    Sink(#[from] SinkError),
}

/// 采集用例
///
/// 按配置执行分页获取和 HTML 字段提取，并把结果写成分隔文本。
pub struct HarvestUseCase {
    transport: Arc<dyn PageTransport>,
    settings: Arc<Settings>,
}

impl HarvestUseCase {
    pub fn new(transport: Arc<dyn PageTransport>, settings: Arc<Settings>) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// 分页获取全部记录
    pub async fn collect_records(&self) -> Result<RecordSet, HarvestError> {
        let pagination = &self.settings.pagination;
        let fetcher = PaginatedFetcher::from_settings(self.transport.clone(), pagination)?;
        Ok(fetcher.fetch_all(&pagination.range()).await?)
    }

    /// 获取文档并逐个列表项提取字段
    ///
    /// 未配置文档地址时返回 `None`。
    pub async fn collect_fields(&self) -> Result<Option<Vec<ExtractedFields>>, HarvestError> {
        let extraction = &self.settings.extraction;
        let Some(url) = &extraction.url else {
            return Ok(None);
        };

        let url = Url::parse(url).map_err(FetchError::from)?;
        let body = self.transport.get_text(&url, &extraction.query).await?;
        extract_items(&body, extraction).map(Some)
    }

    /// 执行全部步骤并写出结果文件
    pub async fn run(&self) -> Result<(), HarvestError> {
        let output = &self.settings.output;
        let sink = TabularSink::new(output.delimiter)?;

        let records = self.collect_records().await?;
        sink.records_to_path(&output.records_path, &records)?;

        if let Some(rows) = self.collect_fields().await? {
            sink.fields_to_path(&output.fields_path, &rows)?;
        }

        info!("Harvest finished");
        Ok(())
    }
}

/// 解析 HTML 并提取每个列表项的字段
///
/// 未配置列表容器时，以文档根元素的子元素作为列表项。
pub fn extract_items(
    body: &str,
    extraction: &ExtractionSettings,
) -> Result<Vec<ExtractedFields>, HarvestError> {
    let task = ExtractionTask::new(extraction.fields.iter().cloned());
    let document = Html::parse_document(body);

    let items = match &extraction.items {
        Some(expr) => ExtractionService::items(&document, &Locator::parse(expr)?),
        None => document
            .root_element()
            .children()
            .filter_map(scraper::ElementRef::wrap)
            .collect(),
    };

    Ok(ExtractionService::extract_all(items, &task))
}
