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

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 资源不可达或未在时限内响应
    Network,
    /// 响应体不符合预期结构
    Format,
    /// 调用方配置错误，在发出任何请求前拒绝
    Config,
}

/// 获取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 响应体不是合法 JSON
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// 缺少顶层键
    #[error("Response has no top-level `{0}` key")]
    MissingKey(String),
    /// 顶层键不是数组
    #[error("Top-level `{0}` is not an array")]
    NotAnArray(String),
    /// 数组元素不是对象
    #[error("Element {index} of `{key}` is not an object")]
    NotAnObject { key: String, index: usize },
    /// 无效URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// 无效分页范围
    #[error("Invalid page range: {0}")]
    InvalidRange(String),
}

impl FetchError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Request(_) | FetchError::Status { .. } | FetchError::Timeout => {
                ErrorKind::Network
            }
            FetchError::Decode(_)
            | FetchError::MissingKey(_)
            | FetchError::NotAnArray(_)
            | FetchError::NotAnObject { .. } => ErrorKind::Format,
            FetchError::InvalidUrl(_) | FetchError::InvalidRange(_) => ErrorKind::Config,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

/// 页面传输特质
///
/// 对固定端点发出带查询参数的 GET 请求并返回响应文本。
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// 获取响应文本
    async fn get_text(&self, url: &Url, query: &[(String, String)]) -> Result<String, FetchError>;

    /// 传输名称
    fn name(&self) -> &'static str;
}
