//! HTML标签提取器
//! 负责从HTML中提取 script-src 和 meta 标签，作为 script / meta 通道的证据

use std::cell::RefCell;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;

/// 提取结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedHtml {
    pub script_srcs: Vec<String>,
    /// (name, content)，name 取 `name` 或 `property` 属性
    pub meta_tags: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct HtmlExtractor {
    extracted: RefCell<ExtractedHtml>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            match &*name {
                "script" => self.extract_script_src(&attrs),
                "meta" => self.extract_meta_tag(&attrs),
                _ => {}
            }
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 从HTML字符串提取标签
    pub fn extract(html: &str) -> ExtractedHtml {
        let tokenizer = Tokenizer::new(HtmlExtractor::default(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.extracted.into_inner()
    }

    /// 提取script-src
    fn extract_script_src(&self, attrs: &[Attribute]) {
        if let Some(src) = attrs.iter().find(|attr| &*attr.name.local == "src") {
            let src = src.value.trim();
            if !src.is_empty() {
                self.extracted.borrow_mut().script_srcs.push(src.to_string());
            }
        }
    }

    /// 提取meta标签
    fn extract_meta_tag(&self, attrs: &[Attribute]) {
        let mut name = None;
        let mut content = None;

        for attr in attrs {
            match &*attr.name.local {
                "name" | "property" if name.is_none() => name = Some(attr.value.to_string().to_lowercase()),
                "content" => content = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let (Some(n), Some(c)) = (name, content) {
            self.extracted.borrow_mut().meta_tags.push((n, c));
        }
    }
}
