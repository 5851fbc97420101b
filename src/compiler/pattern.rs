//! 编译后模式模型
//! 正则编译后的结构

use regex::Regex;

/// 模式与指令之间的分隔符（规则文本中的字面 `\;`）
pub const DIRECTIVE_DELIMITER: &str = "\\;";

/// 未声明置信度时的默认值
pub const DEFAULT_CONFIDENCE: u8 = 100;

/// 从 `\;key:value` 指令段解析出的附加信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub version: Option<String>,
    pub confidence: u8,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            version: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl Directives {
    /// 解析指令段列表，同名指令以第一次出现为准
    ///
    /// 检查全部指令段而不只是第一段（有意如此），
    /// 所以 `x\;confidence:50\;version:\1` 的版本模板是 `\1`
    pub fn parse<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut version = None;
        let mut confidence = None;

        for segment in segments {
            if let Some(template) = segment.strip_prefix("version:") {
                version.get_or_insert_with(|| template.to_string());
            } else if let Some(value) = segment.strip_prefix("confidence:") {
                confidence.get_or_insert_with(|| value.trim().parse::<u8>().map(|c| c.min(100)).unwrap_or(DEFAULT_CONFIDENCE));
            }
        }

        Self {
            version,
            confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE),
        }
    }
}

/// 将规则文本拆成匹配段和指令
pub fn split_directives(raw: &str) -> (&str, Directives) {
    let mut segments = raw.split(DIRECTIVE_DELIMITER);
    let expr = segments.next().unwrap_or_default();
    (expr, Directives::parse(segments))
}

/// 编译后的正则模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// 具名证据（header / cookie / meta）的字段名
    pub field: Option<String>,
    pub regex: Regex,
    pub version_template: Option<String>,
    pub confidence: u8,
}

impl CompiledPattern {
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// 技术在各证据通道上的原始规则文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPatterns {
    pub cookies: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub meta: Vec<(String, Vec<String>)>,
    pub html: Vec<String>,
    pub script: Vec<String>,
    pub url: Vec<String>,
}

/// 技术在各证据通道上编译后的模式
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    pub cookies: Vec<CompiledPattern>,
    pub headers: Vec<CompiledPattern>,
    pub meta: Vec<CompiledPattern>,
    pub html: Vec<CompiledPattern>,
    pub script: Vec<CompiledPattern>,
    pub url: Vec<CompiledPattern>,
}

impl CompiledPatterns {
    pub fn len(&self) -> usize {
        self.cookies.len()
            + self.headers.len()
            + self.meta.len()
            + self.html.len()
            + self.script.len()
            + self.url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_after_confidence_directive() {
        let (expr, directives) = split_directives("x\\;confidence:50\\;version:\\1");
        assert_eq!(expr, "x");
        assert_eq!(directives.confidence, 50);
        assert_eq!(directives.version.as_deref(), Some("\\1"));
    }

    #[test]
    fn test_split_without_directive() {
        let (expr, directives) = split_directives("jquery");
        assert_eq!(expr, "jquery");
        assert_eq!(directives, Directives::default());
    }

    #[test]
    fn test_split_version_and_confidence() {
        let (expr, directives) = split_directives("jquery-([\\d.]+)\\;confidence:50\\;version:\\1");
        assert_eq!(expr, "jquery-([\\d.]+)");
        assert_eq!(directives.version.as_deref(), Some("\\1"));
        assert_eq!(directives.confidence, 50);
    }

    #[test]
    fn test_bad_confidence_falls_back() {
        let (_, directives) = split_directives("x\\;confidence:high");
        assert_eq!(directives.confidence, DEFAULT_CONFIDENCE);

        let (_, directives) = split_directives("x\\;confidence:250");
        assert_eq!(directives.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_first_version_directive_wins() {
        let (_, directives) = split_directives("x(\\d)(\\d)\\;version:\\1\\;version:\\2");
        assert_eq!(directives.version.as_deref(), Some("\\1"));
    }
}
