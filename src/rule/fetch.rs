//! 远程规则库拉取
//! 单次请求，不做重试；失败由调用方决定是否重新拉取

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::loader::CatalogLoader;
use super::model::Catalog;
use crate::config::GlobalConfig;
use crate::error::{WaResult, WebAnalyzeError};

/// 远程规则库拉取器
pub struct CatalogFetcher;

impl CatalogFetcher {
    /// 拉取规则库原始字节
    pub async fn fetch_bytes(config: &GlobalConfig) -> WaResult<Vec<u8>> {
        let url = config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;

        debug!("fetching catalog from {}", url);
        let response = client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("catalog fetch from {} failed with status {}", url, status);
            return Err(WebAnalyzeError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!("fetched {} bytes of catalog data", bytes.len());
        Ok(bytes.to_vec())
    }

    /// 拉取并加载规则库
    pub async fn fetch(config: &GlobalConfig) -> WaResult<Catalog> {
        let bytes = Self::fetch_bytes(config).await?;
        CatalogLoader::load_slice(&bytes)
    }

    /// 拉取规则库并写入 `config.catalog_path`，返回写入路径
    pub async fn download(config: &GlobalConfig) -> WaResult<PathBuf> {
        let bytes = Self::fetch_bytes(config).await?;
        let path = config.catalog_path.clone();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        debug!("catalog written to {}", path.display());

        Ok(path)
    }
}
