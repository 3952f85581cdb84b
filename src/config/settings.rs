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

use crate::domain::models::page::PageRange;
use crate::domain::services::extraction_service::FieldLocator;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// 应用程序配置设置
///
/// 包含HTTP、分页获取、字段提取和输出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// HTTP客户端配置
    pub http: HttpSettings,
    /// 分页获取配置
    pub pagination: PaginationSettings,
    /// 字段提取配置
    #[serde(default)]
    pub extraction: ExtractionSettings,
    /// 输出配置
    pub output: OutputSettings,
}

/// HTTP客户端配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpSettings {
    /// 用户代理
    pub user_agent: Option<String>,
    /// 请求超时时间（秒），未设置时使用reqwest默认值
    pub timeout_secs: Option<u64>,
    /// 附加请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// 分页获取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    /// 站点根地址
    pub base_url: String,
    /// 资源路径
    pub path: String,
    /// 页大小参数名
    pub page_size_param: String,
    /// 偏移量参数名
    pub offset_param: String,
    /// 记录所在的顶层键
    pub records_key: String,
    /// 页大小
    pub page_size: u64,
    /// 起始偏移量
    pub start: u64,
    /// 结束边界（不包含）
    pub end: u64,
    /// 偏移步长，未设置时等于页大小
    pub step: Option<u64>,
    /// 同时进行中的请求数
    pub concurrency: usize,
}

impl PaginationSettings {
    /// 分页范围
    pub fn range(&self) -> PageRange {
        let range = PageRange::new(self.page_size, self.start, self.end);
        match self.step {
            Some(step) => range.with_step(step),
            None => range,
        }
    }
}

/// 字段提取配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionSettings {
    /// 文档地址；未设置时跳过提取
    pub url: Option<String>,
    /// 附加查询参数
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// 列表容器定位表达式，其元素子节点即待提取的节点
    pub items: Option<String>,
    /// 字段规则
    #[serde(default)]
    pub fields: Vec<FieldLocator>,
}

/// 输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 记录集输出路径
    pub records_path: String,
    /// 提取结果输出路径
    pub fields_path: String,
    /// 分隔符
    pub delimiter: char,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `FETCHRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("FETCHRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 从单个配置文件加载（叠加默认值和环境变量）
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("FETCHRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default HTTP settings
            .set_default("http.timeout_secs", 30)?
            // Default pagination settings
            .set_default("pagination.base_url", "https://www.harvardartmuseums.org")?
            .set_default("pagination.path", "browse")?
            .set_default("pagination.page_size_param", "load_amount")?
            .set_default("pagination.offset_param", "offset")?
            .set_default("pagination.records_key", "records")?
            .set_default("pagination.page_size", 10)?
            .set_default("pagination.start", 0)?
            .set_default("pagination.end", 50)?
            .set_default("pagination.concurrency", 1)?
            // Default output settings
            .set_default("output.records_path", "records_final.csv")?
            .set_default("output.fields_path", "all_event_values.csv")?
            .set_default("output.delimiter", ",")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
