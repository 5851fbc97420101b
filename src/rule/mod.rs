//! 规则模块：负责规则库的解码、加载、拉取与数据模型定义
pub mod model;
pub mod string_list;
pub mod loader;
pub mod fetch;

// 导出核心接口
pub use self::model::{
    Catalog, CatalogDefinition, Category, CategoryDefinition, Detection, TechReference, Technology,
    TechnologyDefinition, TechnologyInfo,
};
pub use self::string_list::StringList;
pub use self::loader::{load_catalog, CatalogLoader};
pub use self::fetch::CatalogFetcher;
