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

use fetchrs::application::use_cases::harvest_use_case::HarvestUseCase;
use fetchrs::config::settings::Settings;
use fetchrs::engines::reqwest_engine::ReqwestEngine;
use fetchrs::utils::telemetry;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 加载配置后依次执行分页获取和字段提取，把结果写成分隔文本。
/// 第一个参数可指定配置文件，否则按 `config/` 目录和环境变量加载。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting fetchrs...");

    // 2. Load configuration
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_file(&path)?,
        None => Settings::new()?,
    };
    let settings = Arc::new(settings);
    info!("Configuration loaded");

    // 3. Build transport
    let transport = Arc::new(ReqwestEngine::from_settings(&settings.http)?);

    // 4. Run
    HarvestUseCase::new(transport, settings).run().await?;

    Ok(())
}
