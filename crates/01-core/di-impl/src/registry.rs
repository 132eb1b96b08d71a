//! 容器内部的定义表

use di_abstractions::ComponentDefinition;
use std::collections::HashMap;
use std::sync::Arc;
use wirebox_common::{Capability, ComponentId, DependencyError};

/// 按注册顺序保存的定义表
///
/// 容器启动后不再变化，解析时持有快照而不是锁。
#[derive(Debug, Default, Clone)]
pub(crate) struct Definitions {
    ordered: Vec<Arc<ComponentDefinition>>,
    index: HashMap<ComponentId, usize>,
}

impl Definitions {
    pub(crate) fn insert(&mut self, definition: ComponentDefinition) -> Result<(), DependencyError> {
        if self.index.contains_key(definition.id()) {
            return Err(DependencyError::DuplicateIdentifier {
                id: definition.id().to_string(),
            });
        }
        self.index.insert(definition.id().clone(), self.ordered.len());
        self.ordered.push(Arc::new(definition));
        Ok(())
    }

    pub(crate) fn get(&self, id: &ComponentId) -> Option<&Arc<ComponentDefinition>> {
        self.index.get(id).map(|&position| &self.ordered[position])
    }

    pub(crate) fn contains(&self, id: &ComponentId) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn all(&self) -> &[Arc<ComponentDefinition>] {
        &self.ordered
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }

    pub(crate) fn candidates(&self, capability: &Capability) -> Vec<Arc<ComponentDefinition>> {
        self.ordered
            .iter()
            .filter(|definition| definition.provides(capability.type_id))
            .cloned()
            .collect()
    }

    /// 按标识查找，不存在时报 `NoSuchComponent`
    pub(crate) fn require(&self, id: &ComponentId) -> Result<&Arc<ComponentDefinition>, DependencyError> {
        self.get(id)
            .ok_or_else(|| DependencyError::no_such_component(id.as_str()))
    }

    /// 按能力选择唯一候选
    pub(crate) fn select(&self, capability: &Capability) -> Result<Arc<ComponentDefinition>, DependencyError> {
        let mut candidates = self.candidates(capability);
        match candidates.len() {
            0 => Err(DependencyError::no_such_component(capability.name.as_str())),
            1 => Ok(candidates.remove(0)),
            _ => Err(DependencyError::AmbiguousComponent {
                key: capability.name.clone(),
                candidates: candidates.iter().map(|d| d.id().to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Disc;

    #[test]
    fn insert_rejects_duplicates_and_keeps_order() {
        let mut definitions = Definitions::default();
        definitions
            .insert(ComponentDefinition::builder("b", |_| Ok(Disc)).build())
            .unwrap();
        definitions
            .insert(ComponentDefinition::builder("a", |_| Ok(Disc)).build())
            .unwrap();
        let error = definitions
            .insert(ComponentDefinition::builder("a", |_| Ok(Disc)).build())
            .unwrap_err();
        assert_eq!(error, DependencyError::DuplicateIdentifier { id: "a".to_string() });

        let ids: Vec<_> = definitions.all().iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(definitions.len(), 2);
    }

    #[test]
    fn select_requires_exactly_one_candidate() {
        let mut definitions = Definitions::default();
        assert!(matches!(
            definitions.select(&Capability::of::<Disc>()),
            Err(DependencyError::NoSuchComponent { .. })
        ));

        definitions
            .insert(ComponentDefinition::builder("first", |_| Ok(Disc)).build())
            .unwrap();
        assert_eq!(definitions.select(&Capability::of::<Disc>()).unwrap().id().as_str(), "first");

        definitions
            .insert(ComponentDefinition::builder("second", |_| Ok(Disc)).build())
            .unwrap();
        assert!(matches!(
            definitions.select(&Capability::of::<Disc>()),
            Err(DependencyError::AmbiguousComponent { .. })
        ));
    }
}
