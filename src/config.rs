//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

use url::Url;

use crate::error::{WaResult, WebAnalyzeError};

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 远程规则库URL
    pub catalog_url: String,
    // 本地规则库路径
    pub catalog_path: PathBuf,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 拉取规则库时使用的 User-Agent
    pub user_agent: String,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            // 固定到 Wappalyzer 仓库的某个提交
            catalog_url: "https://raw.githubusercontent.com/AliasIO/wappalyzer/b9b64a9ae173cf317d86b7fb6d8ccb892ea8898d/src/technologies.json".to_string(),
            catalog_path: PathBuf::from("technologies.json"),
            http_timeout: 30,
            user_agent: concat!("webanalyze/", env!("CARGO_PKG_VERSION")).to_string(),
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 校验配置，返回解析后的规则库URL
    pub fn validate(&self) -> WaResult<Url> {
        let url = Url::parse(&self.catalog_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WebAnalyzeError::InvalidConfig(format!(
                "catalog url must be http(s), got `{}`",
                url.scheme()
            )));
        }
        if self.catalog_path.as_os_str().is_empty() {
            return Err(WebAnalyzeError::InvalidConfig("catalog path is empty".to_string()));
        }
        Ok(url)
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog_url = url.into();
        self
    }

    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog_path = path.into();
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
