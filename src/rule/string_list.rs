//! 多形态字段解码
//! Wappalyzer 规则里同一个字段可能写成 `"6"`、`[6]` 或 `["6"]`，
//! 这里按固定优先级逐一尝试，统一归一化为字符串列表

use std::ops::Deref;

use serde_json::value::RawValue;
use tracing::warn;

use crate::error::{WaResult, WebAnalyzeError};

/// 归一化后的有序字符串列表，解码后不可变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringList(Vec<String>);

impl StringList {
    /// 按优先级解码：单个字符串 > 整数列表 > 字符串列表
    ///
    /// 三种形态都不匹配时返回 [`WebAnalyzeError::Format`]，并附带原始 JSON 文本
    pub fn decode(field: &str, raw: &RawValue) -> WaResult<Self> {
        let text = raw.get();

        if let Ok(single) = serde_json::from_str::<String>(text) {
            return Ok(Self(vec![single]));
        }
        if let Ok(numbers) = serde_json::from_str::<Vec<i64>>(text) {
            return Ok(Self(numbers.iter().map(|n| n.to_string()).collect()));
        }
        if let Ok(strings) = serde_json::from_str::<Vec<String>>(text) {
            return Ok(Self(strings));
        }

        warn!("cannot decode field `{}`: {}", field, text);
        Err(WebAnalyzeError::Format {
            field: field.to_string(),
            raw: text.to_string(),
        })
    }

    /// 可选字段：缺省或 null 时为空列表
    pub fn decode_opt(field: &str, raw: Option<&RawValue>) -> WaResult<Self> {
        match raw {
            Some(raw) => Self::decode(field, raw),
            None => Ok(Self::default()),
        }
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for StringList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl IntoIterator for StringList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
