//! 工具模块：版本提取、字段名规范化、检测结果合并
pub mod version_extractor;
pub mod header_converter;
pub mod detection_updater;

pub use self::version_extractor::VersionExtractor;
pub use self::header_converter::{canonical_header_key, FieldSet, HeaderConverter};
pub use self::detection_updater::{DetectedMap, DetectionUpdater};
