//! 规则数据模型定义
//! 包括 technologies.json 的原始结构、编译后的技术/分类，以及检测结果

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::compiler::{CompiledPatterns, RawPatterns};

/// technologies.json 的外层结构
#[derive(Debug, Deserialize)]
pub struct CatalogDefinition {
    #[serde(rename = "technologies", alias = "apps", default)]
    pub technologies: BTreeMap<String, TechnologyDefinition>,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryDefinition>,
}

/// 单个技术的原始定义，多形态字段保留原始 JSON，交给 [`StringList`](super::StringList) 解码
#[derive(Debug, Default, Deserialize)]
pub struct TechnologyDefinition {
    #[serde(default)]
    pub cats: Option<Box<RawValue>>,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub meta: BTreeMap<String, Box<RawValue>>,
    #[serde(default)]
    pub html: Option<Box<RawValue>>,
    #[serde(default, alias = "scriptSrc")]
    pub script: Option<Box<RawValue>>,
    #[serde(default)]
    pub url: Option<Box<RawValue>>,
    #[serde(default)]
    pub implies: Option<Box<RawValue>>,
    #[serde(default)]
    pub excludes: Option<Box<RawValue>>,

    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cpe: Option<String>,
}

/// 分类的原始定义
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: Option<u32>,
}

/// 分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub priority: Option<u32>,
}

/// 技术之间的关联（implies / excludes），可带 `\;confidence:N`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechReference {
    pub name: String,
    pub confidence: u8,
}

/// 编译完成的技术规则
///
/// 编译结果只由原始规则生成，二者在 [`Technology::new`] 中一次性构建，之后不可变
#[derive(Debug, Clone)]
pub struct Technology {
    pub name: String,
    pub category_ids: Vec<String>,
    pub category_names: Vec<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub cpe: Option<String>,
    pub implies: Vec<TechReference>,
    pub excludes: Vec<TechReference>,
    raw: RawPatterns,
    compiled: CompiledPatterns,
}

/// 构建 [`Technology`] 所需的非模式字段
#[derive(Debug, Clone, Default)]
pub struct TechnologyInfo {
    pub category_ids: Vec<String>,
    pub category_names: Vec<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub cpe: Option<String>,
    pub implies: Vec<TechReference>,
    pub excludes: Vec<TechReference>,
}

impl Technology {
    pub fn new(name: String, info: TechnologyInfo, raw: RawPatterns, compiled: CompiledPatterns) -> Self {
        Self {
            name,
            category_ids: info.category_ids,
            category_names: info.category_names,
            website: info.website,
            description: info.description,
            icon: info.icon,
            cpe: info.cpe,
            implies: info.implies,
            excludes: info.excludes,
            raw,
            compiled,
        }
    }

    /// 原始规则文本
    pub fn raw_patterns(&self) -> &RawPatterns {
        &self.raw
    }

    /// 编译后的模式
    pub fn patterns(&self) -> &CompiledPatterns {
        &self.compiled
    }
}

/// 加载完成的规则库，只读
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub technologies: BTreeMap<String, Technology>,
    pub categories: BTreeMap<String, Category>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&Technology> {
        self.technologies.get(name)
    }

    pub fn len(&self) -> usize {
        self.technologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.technologies.values()
    }
}

/// 技术检测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub confidence: u8,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

// ======== 为 Detection 实现 Display trait（用于 CLI 输出） ========
impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) if !v.is_empty() => write!(f, "{} {}", self.name, v),
            _ => write!(f, "{}", self.name),
        }
    }
}
