//! 全局错误类型定义

use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum WebAnalyzeError {
    // 规则库相关错误
    /// 字段无法按 字符串 / 整数列表 / 字符串列表 任一形态解码
    #[error("field `{field}` is neither a string, an integer list nor a string list: {raw}")]
    Format { field: String, raw: String },
    /// 规则库外层结构损坏
    #[error("catalog decode failed: {0}")]
    Decode(#[from] SerdeJsonError),

    // 网络相关错误
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} responded with status {status}")]
    FetchStatus { url: String, status: u16 },

    // 基础错误
    #[error("io error: {0}")]
    Io(#[from] IoError),
    #[error("invalid url: {0}")]
    Url(#[from] UrlParseError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl WebAnalyzeError {
    /// 是否为规则库数据本身的问题（重新拉取可能解决）
    pub fn is_catalog_error(&self) -> bool {
        matches!(self, WebAnalyzeError::Format { .. } | WebAnalyzeError::Decode(_))
    }
}

// 全局Result类型
pub type WaResult<T> = Result<T, WebAnalyzeError>;
