//! 一次扫描收集到的全部证据

use reqwest::header::HeaderMap;

use crate::extractor::HtmlExtractor;
use crate::utils::{FieldSet, HeaderConverter};

/// 各证据通道的输入
#[derive(Debug, Clone, Default)]
pub struct Evidence {
    pub urls: Vec<String>,
    pub headers: FieldSet,
    pub cookies: FieldSet,
    pub meta: FieldSet,
    pub html: String,
    pub scripts: Vec<String>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由一次 HTTP 响应构建证据：响应头、Set-Cookie、正文及其中的 script/meta
    pub fn from_response(url: &str, headers: &HeaderMap, body: &[u8]) -> Self {
        Self {
            urls: vec![url.to_string()],
            headers: HeaderConverter::to_field_set(headers),
            cookies: HeaderConverter::cookies_from_headers(headers),
            ..Self::default()
        }
        .with_html(String::from_utf8_lossy(body))
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn with_meta(mut self, name: &str, content: impl Into<String>) -> Self {
        self.meta.insert(name, content);
        self
    }

    pub fn with_script(mut self, src: impl Into<String>) -> Self {
        self.scripts.push(src.into());
        self
    }

    /// 设置正文，并把其中的 script-src 与 meta 标签追加到对应通道
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        let extracted = HtmlExtractor::extract(&self.html);
        self.scripts.extend(extracted.script_srcs);
        for (name, content) in extracted.meta_tags {
            self.meta.insert(name, content);
        }
        self
    }
}
