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

use crate::config::settings::HttpSettings;
use crate::engines::traits::{FetchError, PageTransport};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; fetchrs/0.1)";

/// 抓取引擎
///
/// 基于reqwest实现的HTTP传输。客户端在构造时创建一次，
/// 所有页面请求共享连接池。
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 使用reqwest默认超时创建
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// 按HTTP配置创建
    ///
    /// # 参数
    ///
    /// * `settings` - 用户代理、超时和附加请求头
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, FetchError> {
        // Build headers
        let mut headers = HeaderMap::new();
        for (k, v) in &settings.headers {
            match (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                (Ok(k), Ok(v)) => {
                    headers.insert(k, v);
                }
                _ => warn!(header = %k, "Skipping invalid header"),
            }
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .default_headers(headers);

        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageTransport for ReqwestEngine {
    /// 执行GET请求
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 响应文本
    /// * `Err(FetchError)` - 连接失败、超时或非成功状态码
    async fn get_text(&self, url: &Url, query: &[(String, String)]) -> Result<String, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.text().await.map_err(classify)?;
        debug!(
            url = %url,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Response received"
        );
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Request(e)
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
