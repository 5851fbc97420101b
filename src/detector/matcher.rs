//! 证据匹配
//! 用编译好的模式匹配单个通道的证据，收集全部匹配分组并解析版本。
//! 匹配不会失败，未命中即返回空结果

use regex::Captures;

use crate::compiler::CompiledPattern;
use crate::rule::Technology;
use crate::utils::{FieldSet, VersionExtractor};

/// 一次匹配尝试的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// 每次命中的 [整体匹配, 分组1, 分组2, ...]，未参与匹配的分组为空串
    pub matches: Vec<Vec<String>>,
    /// 解析出的版本，可能为空
    pub version: String,
    /// 命中模式的置信度之和，上限100
    pub confidence: u8,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn version(&self) -> Option<&str> {
        Some(self.version.as_str()).filter(|v| !v.is_empty())
    }

    /// 合并另一次结果：匹配取并集，非空版本覆盖
    fn merge(&mut self, other: MatchResult) {
        if !other.is_match() {
            return;
        }
        self.matches.extend(other.matches);
        if !other.version.is_empty() {
            self.version = other.version;
        }
        self.confidence = self.confidence.saturating_add(other.confidence).min(100);
    }
}

/// 证据匹配器，与通道无关
pub struct EvidenceMatcher;

impl EvidenceMatcher {
    /// 单个模式匹配一段文本
    pub fn find_pattern(pattern: &CompiledPattern, text: &str) -> MatchResult {
        let all: Vec<Captures> = pattern.regex.captures_iter(text).collect();
        if all.is_empty() {
            return MatchResult::default();
        }

        let matches: Vec<Vec<String>> = all
            .iter()
            .map(|captures| {
                captures
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        let version = pattern
            .version_template
            .as_deref()
            .map(|template| VersionExtractor::first_version(template, &all))
            .unwrap_or_default();

        MatchResult {
            matches,
            version,
            confidence: pattern.confidence,
        }
    }

    /// 无名模式匹配一段文本（html）
    pub fn find_in_text(patterns: &[CompiledPattern], text: &str) -> MatchResult {
        let mut result = MatchResult::default();
        if text.is_empty() {
            return result;
        }
        for pattern in patterns {
            result.merge(Self::find_pattern(pattern, text));
        }
        result
    }

    /// 无名模式逐个匹配列表中的值（script / url），空值跳过
    pub fn find_in_values<S: AsRef<str>>(patterns: &[CompiledPattern], values: &[S]) -> MatchResult {
        let mut result = MatchResult::default();
        for value in values {
            result.merge(Self::find_in_text(patterns, value.as_ref()));
        }
        result
    }

    /// 具名模式只匹配同名字段（名字规范化后比较），多值字段逐个匹配，空值跳过
    pub fn find_in_fields(patterns: &[CompiledPattern], fields: &FieldSet) -> MatchResult {
        let mut result = MatchResult::default();
        for pattern in patterns {
            let Some(field) = pattern.field.as_deref() else {
                continue;
            };
            for value in fields.get_all(field) {
                if value.is_empty() {
                    continue;
                }
                result.merge(Self::find_pattern(pattern, value));
            }
        }
        result
    }
}

impl Technology {
    pub fn find_in_headers(&self, headers: &FieldSet) -> MatchResult {
        EvidenceMatcher::find_in_fields(&self.patterns().headers, headers)
    }

    pub fn find_in_cookies(&self, cookies: &FieldSet) -> MatchResult {
        EvidenceMatcher::find_in_fields(&self.patterns().cookies, cookies)
    }

    pub fn find_in_meta(&self, meta: &FieldSet) -> MatchResult {
        EvidenceMatcher::find_in_fields(&self.patterns().meta, meta)
    }

    pub fn find_in_html(&self, html: &str) -> MatchResult {
        EvidenceMatcher::find_in_text(&self.patterns().html, html)
    }

    pub fn find_in_scripts<S: AsRef<str>>(&self, script_srcs: &[S]) -> MatchResult {
        EvidenceMatcher::find_in_values(&self.patterns().script, script_srcs)
    }

    pub fn find_in_urls<S: AsRef<str>>(&self, urls: &[S]) -> MatchResult {
        EvidenceMatcher::find_in_values(&self.patterns().url, urls)
    }
}

/// 用技术的 header 规则匹配一组响应头
pub fn match_headers(technology: &Technology, headers: &FieldSet) -> MatchResult {
    technology.find_in_headers(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Channel, CompileStats, PatternCompiler};
    use crate::rule::{Catalog, CatalogLoader};

    fn unnamed(raw: &[&str]) -> Vec<CompiledPattern> {
        PatternCompiler::compile_unnamed("Test", Channel::Html, raw, &mut CompileStats::default())
    }

    fn named(raw: &[(&str, &str)]) -> Vec<CompiledPattern> {
        PatternCompiler::compile_named("Test", Channel::Headers, raw, &mut CompileStats::default())
    }

    fn headers(pairs: &[(&str, &str)]) -> FieldSet {
        pairs.iter().copied().collect()
    }

    fn catalog() -> Catalog {
        CatalogLoader::load_str(
            r#"{"technologies": {
                "Express": {"headers": {"X-Powered-By": "^Express$"}},
                "PHP": {"headers": {"X-Powered-By": "php/?([\\d.]+)?\\;version:\\1"}},
                "Varnish": {"headers": {"Via": "varnish(?: \\(Varnish/([\\d.]+)\\))?\\;version:\\1", "X-Varnish": ""}}
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_version_from_capture_group() {
        let patterns = unnamed(&["foo ([\\d.]+)\\;version:\\1"]);
        let result = EvidenceMatcher::find_in_text(&patterns, "built with foo 1.2.3");

        assert!(result.is_match());
        assert_eq!(result.version, "1.2.3");
        assert_eq!(result.matches, vec![vec!["foo 1.2.3".to_string(), "1.2.3".to_string()]]);
    }

    #[test]
    fn test_all_matches_are_recorded() {
        let patterns = unnamed(&["jquery-([\\d.]+)"]);
        let result = EvidenceMatcher::find_in_text(&patterns, "jquery-1.0 and jquery-3.7.1");

        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[1][1], "3.7.1");
        assert_eq!(result.version, "");
    }

    #[test]
    fn test_unmatched_group_is_empty_string() {
        let patterns = unnamed(&["nginx(?:/([\\d.]+))?\\;version:\\1"]);
        let result = EvidenceMatcher::find_in_text(&patterns, "nginx");

        assert_eq!(result.matches, vec![vec!["nginx".to_string(), String::new()]]);
        assert_eq!(result.version(), None);
    }

    #[test]
    fn test_no_match_is_empty_result() {
        let patterns = unnamed(&["drupal"]);
        assert_eq!(EvidenceMatcher::find_in_text(&patterns, "wordpress"), MatchResult::default());
        assert_eq!(EvidenceMatcher::find_in_text(&patterns, ""), MatchResult::default());
    }

    #[test]
    fn test_empty_named_pattern_matches_any_value() {
        let patterns = named(&[("X-Varnish", "")]);

        let result = EvidenceMatcher::find_in_fields(&patterns, &headers(&[("X-Varnish", "12345")]));
        assert!(result.is_match());

        let result = EvidenceMatcher::find_in_fields(&patterns, &headers(&[("X-Varnish", "")]));
        assert!(!result.is_match());
    }

    #[test]
    fn test_field_name_comparison_is_canonical() {
        let catalog = catalog();
        let php = catalog.get("PHP").unwrap();

        let result = match_headers(php, &headers(&[("x-powered-by", "PHP/8.2.1")]));
        assert!(result.is_match());
        assert_eq!(result.version, "8.2.1");

        let result = match_headers(php, &headers(&[("X-Other", "PHP/8.2.1")]));
        assert!(!result.is_match());
    }

    #[test]
    fn test_repeated_header_values_are_each_tested() {
        let catalog = catalog();
        let evidence = headers(&[
            ("X-Powered-By", "PHP/7.4.3"),
            ("X-Powered-By", ""),
            ("X-Powered-By", "Express"),
            ("X-Powered-By", "PHP/8.1.0"),
        ]);

        let php = match_headers(catalog.get("PHP").unwrap(), &evidence);
        assert_eq!(php.matches.len(), 2);
        // 后出现的非空版本覆盖前者
        assert_eq!(php.version, "8.1.0");

        let express = match_headers(catalog.get("Express").unwrap(), &evidence);
        assert_eq!(express.matches.len(), 1);
    }

    #[test]
    fn test_version_not_cleared_by_later_match_without_version() {
        let patterns = named(&[("Server", "php/?([\\d.]+)?\\;version:\\1")]);
        let evidence = headers(&[("Server", "PHP/5.6"), ("Server", "php")]);

        let result = EvidenceMatcher::find_in_fields(&patterns, &evidence);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.version, "5.6");
    }

    #[test]
    fn test_union_across_named_patterns() {
        let catalog = catalog();
        let varnish = catalog.get("Varnish").unwrap();
        let evidence = headers(&[("Via", "1.1 varnish (Varnish/6.0)"), ("X-Varnish", "32770")]);

        let result = varnish.find_in_headers(&evidence);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.version, "6.0");
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_script_values_skip_empty() {
        let patterns = unnamed(&["react(?:-dom)?(?:\\.min)?\\.js"]);
        let result = EvidenceMatcher::find_in_values(&patterns, &["", "/static/react.min.js", "/app.js"]);
        assert_eq!(result.matches.len(), 1);
    }
}
