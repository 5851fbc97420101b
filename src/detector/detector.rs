//! 检测器核心：用只读规则库匹配证据，输出检测结果
use std::io::ErrorKind;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::{debug, trace, warn};

use super::evidence::Evidence;
use super::matcher::MatchResult;
use crate::compiler::Channel;
use crate::config::GlobalConfig;
use crate::error::{WaResult, WebAnalyzeError};
use crate::rule::{Catalog, CatalogFetcher, CatalogLoader, Detection, Technology};
use crate::utils::{DetectedMap, DetectionUpdater};

/// 技术检测器
///
/// 持有加载完成的规则库，可在任意多个线程间共享，检测过程不修改任何状态
#[derive(Debug, Clone)]
pub struct TechDetector {
    catalog: Arc<Catalog>,
}

impl TechDetector {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_shared(Arc::new(catalog))
    }

    pub fn with_shared(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// 按配置创建检测器
    ///
    /// 本地规则库文件不存在时拉取远程并写入本地；文件存在但读取或解析失败时直接返回错误，不会覆盖
    pub async fn from_config(config: &GlobalConfig) -> WaResult<Self> {
        match CatalogLoader::load_file(&config.catalog_path).await {
            Ok(catalog) => {
                debug!("loaded local catalog {}", config.catalog_path.display());
                return Ok(Self::new(catalog));
            }
            Err(WebAnalyzeError::Io(e)) if e.kind() == ErrorKind::NotFound => warn!(
                "local catalog {} not found, fetching {}",
                config.catalog_path.display(),
                config.catalog_url
            ),
            Err(e) => return Err(e),
        }

        let path = CatalogFetcher::download(config).await?;
        Ok(Self::new(CatalogLoader::load_file(path).await?))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// 对单个技术匹配全部通道，按 html / script / url / headers / cookies / meta 的顺序
    pub fn analyze(technology: &Technology, evidence: &Evidence) -> Vec<(Channel, MatchResult)> {
        [
            (Channel::Html, technology.find_in_html(&evidence.html)),
            (Channel::Script, technology.find_in_scripts(&evidence.scripts)),
            (Channel::Url, technology.find_in_urls(&evidence.urls)),
            (Channel::Headers, technology.find_in_headers(&evidence.headers)),
            (Channel::Cookies, technology.find_in_cookies(&evidence.cookies)),
            (Channel::Meta, technology.find_in_meta(&evidence.meta)),
        ]
        .into_iter()
        .filter(|(_, result)| result.is_match())
        .collect()
    }

    /// 核心检测接口
    pub fn detect(&self, evidence: &Evidence) -> Vec<Detection> {
        let mut detected = DetectedMap::new();

        for technology in self.catalog.iter() {
            if technology.patterns().is_empty() {
                continue;
            }
            for (channel, result) in Self::analyze(technology, evidence) {
                trace!(
                    "{} matched `{}` ({} hits, version={:?})",
                    channel,
                    technology.name,
                    result.matches.len(),
                    result.version()
                );
                DetectionUpdater::update(&mut detected, &technology.name, result.confidence, Some(result.version));
            }
        }

        DetectionUpdater::apply_implies(&self.catalog, &mut detected);
        DetectionUpdater::apply_excludes(&self.catalog, &mut detected);

        detected
            .into_iter()
            .filter_map(|(name, (confidence, version))| {
                let technology = self.catalog.get(&name)?;
                Some(Detection {
                    name,
                    version,
                    confidence,
                    categories: technology.category_names.clone(),
                    website: technology.website.clone(),
                })
            })
            .collect()
    }

    /// 直接对一次 HTTP 响应检测
    pub fn detect_response(&self, url: &str, headers: &HeaderMap, body: &[u8]) -> Vec<Detection> {
        self.detect(&Evidence::from_response(url, headers, body))
    }
}
