//! 具名证据（header / cookie / meta）的字段名规范化与容器
//! 字段名按 HTTP 头的惯例规范化：首字母及连字符后的字母大写，其余小写

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::warn;

/// HTTP token 允许的字符
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// 规范化字段名：`x-powered-by` -> `X-Powered-By`
///
/// 含空格或非 token 字符的名字原样返回
pub fn canonical_header_key(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}

/// 有序的多值字段集合，键为规范化后的字段名，同名值按插入顺序保存
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个值（同名字段可重复出现）
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .entry(canonical_header_key(name.as_ref()))
            .or_default()
            .push(value.into());
    }

    /// 按字段名取全部值，名字比较前先规范化
    pub fn get_all(&self, name: &str) -> &[String] {
        self.fields
            .get(&canonical_header_key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 第一个值
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = FieldSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Header格式转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为FieldSet，非UTF-8的值按有损方式转换
    pub fn to_field_set(header_map: &HeaderMap) -> FieldSet {
        header_map
            .iter()
            .map(|(key, value)| (key.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect()
    }

    /// 从 Set-Cookie 头中提取 cookie 名和值
    pub fn cookies_from_headers(header_map: &HeaderMap) -> FieldSet {
        let mut cookies = FieldSet::new();
        for value in header_map.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                warn!("skip non-ascii Set-Cookie header");
                continue;
            };
            if let Some((name, value)) = Self::parse_cookie_pair(raw) {
                cookies.insert(name, value);
            }
        }
        cookies
    }

    /// 解析 `name=value; Path=/` 中第一个分号前的键值对
    pub fn parse_cookie_pair(raw: &str) -> Option<(&str, &str)> {
        let pair = raw.split(';').next()?.trim();
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim().trim_matches('"')))
    }
}
