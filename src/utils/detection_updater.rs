//! 检测结果更新工具
//! 负责更新检测结果（叠加置信度、覆盖版本）以及 implies / excludes 推导

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::debug;

use crate::rule::Catalog;

/// 技术名 -> (置信度, 版本)
pub type DetectedMap = BTreeMap<String, (u8, Option<String>)>;

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// 更新检测结果：置信度累加（上限100），非空版本覆盖旧版本
    pub fn update(detected: &mut DetectedMap, tech_name: &str, confidence: u8, version: Option<String>) {
        let version = version.filter(|v| !v.is_empty());

        match detected.entry(tech_name.to_string()) {
            Entry::Occupied(mut entry) => {
                let (existing_conf, existing_version) = entry.get_mut();
                *existing_conf = existing_conf.saturating_add(confidence).min(100);

                if version.is_some() {
                    *existing_version = version;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert((confidence.min(100), version));
            }
        }
    }

    /// 应用关联推导规则（implies），可传递；只添加规则库中存在且尚未检出的技术
    pub fn apply_implies(catalog: &Catalog, detected: &mut DetectedMap) {
        let mut pending: Vec<String> = detected.keys().cloned().collect();

        while let Some(name) = pending.pop() {
            let Some(tech) = catalog.get(&name) else {
                continue;
            };

            for implied in &tech.implies {
                if detected.contains_key(&implied.name) {
                    continue;
                }
                if catalog.get(&implied.name).is_none() {
                    debug!("`{}` implies unknown technology `{}`", name, implied.name);
                    continue;
                }
                detected.insert(implied.name.clone(), (implied.confidence, None));
                pending.push(implied.name.clone());
            }
        }
    }

    /// 移除被已检出技术排除（excludes）的技术
    pub fn apply_excludes(catalog: &Catalog, detected: &mut DetectedMap) {
        let excluded: Vec<String> = detected
            .keys()
            .filter_map(|name| catalog.get(name))
            .flat_map(|tech| tech.excludes.iter().map(|reference| reference.name.clone()))
            .collect();

        for name in excluded {
            if detected.remove(&name).is_some() {
                debug!("`{}` removed by excludes", name);
            }
        }
    }
}
