// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 拼接站点根地址和资源路径，等价于 `domain + "/" + path`
///
/// 与 `Url::join` 不同，根地址已有的路径段会被保留。
pub fn join_path(base: &str, path: &str) -> Result<Url, ParseError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
}
