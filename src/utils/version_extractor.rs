//! 版本提取工具模块
//! 负责把版本模板中的分组引用替换为正则捕获内容
//! 支持 \1/\2 或 $1/$2 两种分组引用格式

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(\d+)|\$(\d+)").unwrap()
});

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 根据版本模板和一次匹配的捕获结果生成版本号
    ///
    /// 引用不存在（或未参与匹配）的分组时替换为空串；结果去除首尾空白，
    /// 可能为空串，表示本次匹配未得到版本
    pub fn resolve(template: &str, captures: &Captures) -> String {
        PLACEHOLDER_REGEX
            .replace_all(template, |placeholder: &Captures| {
                placeholder
                    .get(1)
                    .or_else(|| placeholder.get(2))
                    .and_then(|index| index.as_str().parse::<usize>().ok())
                    .and_then(|index| captures.get(index))
                    .map(|group| group.as_str().trim())
                    .unwrap_or_default()
                    .to_string()
            })
            .trim()
            .to_string()
    }

    /// 依次尝试每次匹配，返回第一个非空版本
    pub fn first_version(template: &str, all_captures: &[Captures<'_>]) -> String {
        all_captures
            .iter()
            .map(|captures| Self::resolve(template, captures))
            .find(|version| !version.is_empty())
            .unwrap_or_default()
    }
}
