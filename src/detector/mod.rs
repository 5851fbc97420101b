//! 检测模块：证据匹配与技术检测核心逻辑
pub mod evidence;
pub mod matcher;
pub mod detector;

// 导出核心接口
pub use self::evidence::Evidence;
pub use self::matcher::{match_headers, EvidenceMatcher, MatchResult};
pub use self::detector::TechDetector;
