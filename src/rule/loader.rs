//! 规则库加载
//! 解码 technologies.json，编译所有技术的规则并解析分类名称。
//! 外层结构或多形态字段解码失败即整体失败；单条正则编译失败只丢弃该条

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use super::model::{
    Catalog, Category, CategoryDefinition, CatalogDefinition, TechReference, Technology, TechnologyDefinition,
    TechnologyInfo,
};
use super::string_list::StringList;
use crate::compiler::{split_directives, CompileStats, PatternCompiler, RawPatterns};
use crate::error::WaResult;

/// 规则库加载器
pub struct CatalogLoader;

impl CatalogLoader {
    /// 从任意字节流加载
    pub fn load<R: Read>(reader: R) -> WaResult<Catalog> {
        let definition: CatalogDefinition = serde_json::from_reader(reader)?;
        Self::build(definition)
    }

    pub fn load_slice(bytes: &[u8]) -> WaResult<Catalog> {
        let definition: CatalogDefinition = serde_json::from_slice(bytes)?;
        Self::build(definition)
    }

    pub fn load_str(text: &str) -> WaResult<Catalog> {
        Self::load_slice(text.as_bytes())
    }

    /// 从本地文件加载
    pub async fn load_file(path: impl AsRef<Path>) -> WaResult<Catalog> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        debug!("read catalog file {} ({} bytes)", path.display(), bytes.len());
        Self::load_slice(&bytes)
    }

    /// 由原始定义构建新的规则库，全部成功后才返回
    fn build(definition: CatalogDefinition) -> WaResult<Catalog> {
        let start = Instant::now();
        let CatalogDefinition { technologies, categories } = definition;

        let categories: BTreeMap<String, Category> = categories
            .into_iter()
            .map(|(id, CategoryDefinition { name, priority })| {
                let category = Category { id: id.clone(), name, priority };
                (id, category)
            })
            .collect();

        let mut stats = CompileStats::default();
        let mut compiled_technologies = BTreeMap::new();
        for (name, definition) in technologies {
            let technology = Self::compile_technology(name, definition, &categories, &mut stats)?;
            compiled_technologies.insert(technology.name.clone(), technology);
        }

        debug!(
            "catalog loaded in {:?}: {} technologies, {} categories",
            start.elapsed(),
            compiled_technologies.len(),
            categories.len()
        );
        debug!(
            "compiled patterns: headers={} cookies={} meta={} html={} script={} url={} skipped={}",
            stats.header_count,
            stats.cookie_count,
            stats.meta_count,
            stats.html_count,
            stats.script_count,
            stats.url_count,
            stats.skipped
        );

        Ok(Catalog {
            technologies: compiled_technologies,
            categories,
        })
    }

    /// 解码并编译单个技术
    fn compile_technology(
        name: String,
        definition: TechnologyDefinition,
        categories: &BTreeMap<String, Category>,
        stats: &mut CompileStats,
    ) -> WaResult<Technology> {
        let field = |key: &str| format!("{}.{}", name, key);

        let category_ids = StringList::decode_opt(&field("cats"), definition.cats.as_deref())?.into_inner();
        let mut meta = Vec::with_capacity(definition.meta.len());
        for (meta_name, raw) in &definition.meta {
            let alternatives = StringList::decode(&field(&format!("meta.{}", meta_name)), raw)?;
            meta.push((meta_name.clone(), alternatives.into_inner()));
        }

        let raw = RawPatterns {
            cookies: definition.cookies.into_iter().collect(),
            headers: definition.headers.into_iter().collect(),
            meta,
            html: StringList::decode_opt(&field("html"), definition.html.as_deref())?.into_inner(),
            script: StringList::decode_opt(&field("script"), definition.script.as_deref())?.into_inner(),
            url: StringList::decode_opt(&field("url"), definition.url.as_deref())?.into_inner(),
        };
        let compiled = PatternCompiler::compile_all(&name, &raw, stats);

        let info = TechnologyInfo {
            category_names: Self::resolve_category_names(&category_ids, categories),
            category_ids,
            website: definition.website,
            description: definition.description,
            icon: definition.icon,
            cpe: definition.cpe,
            implies: Self::parse_references(StringList::decode_opt(&field("implies"), definition.implies.as_deref())?),
            excludes: Self::parse_references(StringList::decode_opt(&field("excludes"), definition.excludes.as_deref())?),
        };

        Ok(Technology::new(name, info, raw, compiled))
    }

    /// 按声明顺序解析分类名称，未知 ID 或空名称直接跳过
    pub fn resolve_category_names(ids: &[String], categories: &BTreeMap<String, Category>) -> Vec<String> {
        ids.iter()
            .filter_map(|id| categories.get(id))
            .filter(|category| !category.name.is_empty())
            .map(|category| category.name.clone())
            .collect()
    }

    /// 解析 implies / excludes 条目（`PHP\;confidence:50`）
    fn parse_references(list: StringList) -> Vec<TechReference> {
        list.iter()
            .filter_map(|entry| {
                let (name, directives) = split_directives(entry);
                let name = name.trim();
                (!name.is_empty()).then(|| TechReference {
                    name: name.to_string(),
                    confidence: directives.confidence,
                })
            })
            .collect()
    }
}

/// 从字节流加载规则库
pub fn load_catalog<R: Read>(reader: R) -> WaResult<Catalog> {
    CatalogLoader::load(reader)
}
