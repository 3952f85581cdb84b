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

use crate::config::settings::PaginationSettings;
use crate::domain::models::page::PageRange;
use crate::domain::models::record::{Record, RecordSet};
use crate::engines::traits::{FetchError, PageTransport};
use crate::utils::url_utils;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

/// 分页获取器
///
/// 对固定端点按偏移量逐页请求，把每页 `records_key` 下的记录
/// 按页顺序拼接成一个记录集。任一页失败都会中止整个获取，不返回部分结果。
pub struct PaginatedFetcher {
    transport: Arc<dyn PageTransport>,
    endpoint: Url,
    page_size_param: String,
    offset_param: String,
    records_key: String,
    concurrency: usize,
}

impl PaginatedFetcher {
    /// 创建获取器
    ///
    /// 参数名默认为 `load_amount` / `offset`，记录键默认为 `records`，
    /// 并发度默认为 1（严格顺序）。
    pub fn new(transport: Arc<dyn PageTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
            page_size_param: "load_amount".to_string(),
            offset_param: "offset".to_string(),
            records_key: "records".to_string(),
            concurrency: 1,
        }
    }

    /// 从配置创建
    pub fn from_settings(
        transport: Arc<dyn PageTransport>,
        settings: &PaginationSettings,
    ) -> Result<Self, FetchError> {
        let endpoint = url_utils::join_path(&settings.base_url, &settings.path)?;
        Ok(Self::new(transport, endpoint)
            .with_params(&settings.page_size_param, &settings.offset_param)
            .with_records_key(&settings.records_key)
            .with_concurrency(settings.concurrency))
    }

    /// 设置页大小和偏移量的查询参数名
    pub fn with_params(mut self, page_size_param: &str, offset_param: &str) -> Self {
        self.page_size_param = page_size_param.to_string();
        self.offset_param = offset_param.to_string();
        self
    }

    /// 设置记录所在的顶层键
    pub fn with_records_key(mut self, key: &str) -> Self {
        self.records_key = key.to_string();
        self
    }

    /// 设置同时进行中的请求数上限，最小为 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// 获取单页记录
    ///
    /// # 参数
    ///
    /// * `page_size` - 页大小参数值
    /// * `offset` - 偏移量参数值
    pub async fn fetch_page(&self, page_size: u64, offset: u64) -> Result<Vec<Record>, FetchError> {
        let query = vec![
            (self.page_size_param.clone(), page_size.to_string()),
            (self.offset_param.clone(), offset.to_string()),
        ];
        debug!(url = %self.endpoint, offset, page_size, transport = self.transport.name(), "Fetching page");

        let body = self.transport.get_text(&self.endpoint, &query).await?;
        parse_records(&body, &self.records_key)
    }

    /// 获取范围内的全部页
    ///
    /// 每个偏移量 `start + k*step` 发出一次请求。结果顺序与顺序获取一致，
    /// 与并发度无关。
    ///
    /// # 返回值
    ///
    /// * `Ok(RecordSet)` - 按页顺序、页内源顺序拼接的记录
    /// * `Err(FetchError)` - 第一个失败页的错误
    pub async fn fetch_all(&self, range: &PageRange) -> Result<RecordSet, FetchError> {
        if range.step == 0 {
            return Err(FetchError::InvalidRange("step must be greater than zero".to_string()));
        }

        let pages = range.page_count();
        let result = if self.concurrency == 1 {
            self.fetch_sequential(range).await
        } else {
            self.fetch_buffered(range).await
        };

        match result {
            Ok(records) => {
                info!(endpoint = %self.endpoint, pages, records = records.len(), "Fetch completed");
                Ok(records)
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "Fetch aborted");
                Err(e)
            }
        }
    }

    async fn fetch_sequential(&self, range: &PageRange) -> Result<RecordSet, FetchError> {
        let mut records = RecordSet::new();
        for offset in range.offsets() {
            let page = self.fetch_page(range.page_size, offset).await?;
            records.append_page(page);
        }
        Ok(records)
    }

    async fn fetch_buffered(&self, range: &PageRange) -> Result<RecordSet, FetchError> {
        // `buffered` yields in input order regardless of completion order
        let pages: Vec<Vec<Record>> = stream::iter(range.offsets())
            .map(|offset| self.fetch_page(range.page_size, offset))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut records = RecordSet::new();
        for page in pages {
            records.append_page(page);
        }
        Ok(records)
    }
}

/// 解析一页响应体，取出顶层 `key` 下的记录数组
pub fn parse_records(body: &str, key: &str) -> Result<Vec<Record>, FetchError> {
    let mut value: Value = serde_json::from_str(body)?;

    let items = match value.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(FetchError::NotAnArray(key.to_string())),
        None => return Err(FetchError::MissingKey(key.to_string())),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Record::try_from(item).map_err(|_| FetchError::NotAnObject {
                key: key.to_string(),
                index,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "paginated_fetcher_test.rs"]
mod tests;
