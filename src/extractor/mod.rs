//! 提取模块：从响应正文中提取 script / meta 证据
pub mod html_extractor;

pub use self::html_extractor::{ExtractedHtml, HtmlExtractor};
