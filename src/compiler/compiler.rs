//! 规则编译器核心
//! 仅负责将原始规则文本编译为可执行的正则模式，编译失败的单条规则直接丢弃

use std::fmt;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::pattern::{split_directives, CompiledPattern, CompiledPatterns, RawPatterns};

/// 空的具名规则表示“字段存在即命中”
const MATCH_ANYTHING: &str = ".*";

/// 编译后正则的大小上限；Unicode 的 `\w{1,1000}` 这类有界重复会超出 regex 默认的 10 MiB
const REGEX_SIZE_LIMIT: usize = 256 * (1 << 20);
const REGEX_DFA_SIZE_LIMIT: usize = 64 * (1 << 20);

/// 证据通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Cookies,
    Headers,
    Meta,
    Html,
    Script,
    Url,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Cookies => "cookies",
            Channel::Headers => "headers",
            Channel::Meta => "meta",
            Channel::Html => "html",
            Channel::Script => "script",
            Channel::Url => "url",
        };
        f.write_str(name)
    }
}

/// 模式编译器
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译某个技术全部通道的规则
    pub fn compile_all(tech_name: &str, raw: &RawPatterns, stats: &mut CompileStats) -> CompiledPatterns {
        let meta = Self::flatten_meta(&raw.meta);

        CompiledPatterns {
            cookies: Self::compile_named(tech_name, Channel::Cookies, &raw.cookies, stats),
            headers: Self::compile_named(tech_name, Channel::Headers, &raw.headers, stats),
            meta: Self::compile_named(tech_name, Channel::Meta, &meta, stats),
            html: Self::compile_unnamed(tech_name, Channel::Html, &raw.html, stats),
            script: Self::compile_unnamed(tech_name, Channel::Script, &raw.script, stats),
            url: Self::compile_unnamed(tech_name, Channel::Url, &raw.url, stats),
        }
    }

    /// 编译列表型模式（html/script/url）
    pub fn compile_unnamed<S: AsRef<str>>(
        tech_name: &str,
        channel: Channel,
        raw_patterns: &[S],
        stats: &mut CompileStats,
    ) -> Vec<CompiledPattern> {
        raw_patterns
            .iter()
            .filter_map(|raw| Self::compile_single(tech_name, channel, None, raw.as_ref(), stats))
            .collect()
    }

    /// 编译键值对型模式（header/cookie/meta），空规则视为通配
    pub fn compile_named<K: AsRef<str>, V: AsRef<str>>(
        tech_name: &str,
        channel: Channel,
        raw_patterns: &[(K, V)],
        stats: &mut CompileStats,
    ) -> Vec<CompiledPattern> {
        raw_patterns
            .iter()
            .filter_map(|(field, raw)| {
                let raw = match raw.as_ref() {
                    "" => MATCH_ANYTHING,
                    raw => raw,
                };
                Self::compile_single(tech_name, channel, Some(field.as_ref()), raw, stats)
            })
            .collect()
    }

    /// meta 同一字段可声明多个候选，合并为一条 `a|b` 交替规则
    pub fn flatten_meta(meta: &[(String, Vec<String>)]) -> Vec<(String, String)> {
        meta.iter()
            .map(|(field, alternatives)| (field.clone(), alternatives.join("|")))
            .collect()
    }

    /// 编译单条规则，失败时记录并返回 None
    fn compile_single(
        tech_name: &str,
        channel: Channel,
        field: Option<&str>,
        raw: &str,
        stats: &mut CompileStats,
    ) -> Option<CompiledPattern> {
        let (expr, directives) = split_directives(raw);

        match Self::build_regex(expr) {
            Ok(regex) => {
                stats.record_compiled(channel);
                Some(CompiledPattern {
                    field: field.map(str::to_string),
                    regex,
                    version_template: directives.version,
                    confidence: directives.confidence,
                })
            }
            Err(e) => {
                stats.skipped += 1;
                let reason = e.to_string();
                debug!(
                    "skip {} pattern of `{}` ({}): {}",
                    channel,
                    tech_name,
                    raw,
                    reason.lines().last().unwrap_or_default()
                );
                None
            }
        }
    }

    fn build_regex(expr: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(expr)
            .case_insensitive(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
            .build()
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub cookie_count: usize,
    pub header_count: usize,
    pub meta_count: usize,
    pub html_count: usize,
    pub script_count: usize,
    pub url_count: usize,
    pub skipped: usize,
}

impl CompileStats {
    fn record_compiled(&mut self, channel: Channel) {
        match channel {
            Channel::Cookies => self.cookie_count += 1,
            Channel::Headers => self.header_count += 1,
            Channel::Meta => self.meta_count += 1,
            Channel::Html => self.html_count += 1,
            Channel::Script => self.script_count += 1,
            Channel::Url => self.url_count += 1,
        }
    }

    pub fn compiled(&self) -> usize {
        self.cookie_count + self.header_count + self.meta_count + self.html_count + self.script_count + self.url_count
    }
}
