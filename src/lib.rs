//! webanalyze - 基于 Wappalyzer 规则库的网站技术栈识别
//!
//! 加载 `technologies.json`，把每个技术的规则编译成大小写不敏感的正则，
//! 再用响应头、Cookie、meta、HTML、script-src 和 URL 等证据进行匹配。
//!
//! ```no_run
//! use webanalyze::{load_catalog, Evidence, TechDetector};
//!
//! let file = std::fs::File::open("technologies.json")?;
//! let detector = TechDetector::new(load_catalog(file)?);
//! let evidence = Evidence::new().with_header("Server", "nginx/1.25.3");
//! for detection in detector.detect(&evidence) {
//!     println!("{detection}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// 导出全局错误类型
pub use self::error::{WebAnalyzeError, WaResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出规则模块核心接口
pub use self::rule::{
    load_catalog, Catalog, CatalogFetcher, CatalogLoader, Category, Detection, StringList, TechReference,
    Technology,
};

// 导出编译模块核心接口
pub use self::compiler::{Channel, CompiledPattern, PatternCompiler};

// 导出工具模块核心接口
pub use self::utils::{canonical_header_key, FieldSet, VersionExtractor};

// 导出检测模块核心接口
pub use self::detector::{match_headers, Evidence, EvidenceMatcher, MatchResult, TechDetector};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod extractor;
pub mod utils;
pub mod compiler;
pub mod detector;
