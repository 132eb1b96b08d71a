//! 单例槽位状态
//!
//! 只在容器的构造锁内访问。

use di_abstractions::Instance;
use std::collections::{HashMap, HashSet};
use wirebox_common::{ComponentId, DependencyError, InstanceState};

/// 单例槽位，缺省即 `Unresolved`
#[derive(Clone)]
pub(crate) enum Slot {
    /// 解析中；构造完成、setter 注入之前会提前暴露实例
    Resolving { early: Option<Instance> },
    Resolved(Instance),
    Failed(DependencyError),
}

impl Slot {
    pub(crate) fn state(&self) -> InstanceState {
        match self {
            Self::Resolving { .. } => InstanceState::Resolving,
            Self::Resolved(_) => InstanceState::Resolved,
            Self::Failed(_) => InstanceState::Failed,
        }
    }
}

/// 构造锁保护的解析状态
#[derive(Default)]
pub(crate) struct ResolutionState {
    slots: HashMap<ComponentId, Slot>,
    /// 组件（直接或间接）持有的、尚未完成注入的提前引用的所有者
    holders: HashMap<ComponentId, HashSet<ComponentId>>,
    unpublished: Vec<ComponentId>,
    prototype_instances: usize,
    resolution_errors: usize,
}

impl ResolutionState {
    pub(crate) fn slot(&self, id: &ComponentId) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub(crate) fn state_of(&self, id: &ComponentId) -> InstanceState {
        self.slots.get(id).map_or(InstanceState::Unresolved, Slot::state)
    }

    pub(crate) fn begin(&mut self, id: &ComponentId) {
        self.slots.insert(id.clone(), Slot::Resolving { early: None });
    }

    /// 暴露提前引用
    pub(crate) fn expose(&mut self, id: &ComponentId, instance: &Instance) {
        self.slots.insert(
            id.clone(),
            Slot::Resolving {
                early: Some(instance.clone()),
            },
        );
    }

    /// 解析链上位于所有者之后的组件拿到了 `owners` 的提前引用（或持有它的实例）
    pub(crate) fn hold(&mut self, chain: &[ComponentId], owners: &HashSet<ComponentId>) {
        for owner in owners {
            let start = chain.iter().position(|id| id == owner).map_or(0, |p| p + 1);
            for id in &chain[start..] {
                self.holders.entry(id.clone()).or_default().insert(owner.clone());
            }
        }
    }

    /// 组件持有的未完成提前引用
    pub(crate) fn held_by(&self, id: &ComponentId) -> HashSet<ComponentId> {
        self.holders.get(id).cloned().unwrap_or_default()
    }

    pub(crate) fn complete(&mut self, id: &ComponentId, instance: Instance) {
        self.slots.insert(id.clone(), Slot::Resolved(instance));
        self.unpublished.push(id.clone());

        // 注入完成，提前引用不再是半成品
        self.holders.retain(|_, owners| {
            owners.remove(id);
            !owners.is_empty()
        });
    }

    /// 标记失败，返回因持有其提前引用而一并失败的已完成单例
    pub(crate) fn fail(&mut self, id: &ComponentId, error: &DependencyError) -> Vec<ComponentId> {
        let tainted: Vec<ComponentId> = self
            .holders
            .iter()
            .filter(|(_, owners)| owners.contains(id))
            .map(|(holder, _)| holder.clone())
            .collect();

        let mut rolled_back = Vec::new();
        for holder in tainted {
            self.holders.remove(&holder);
            if let Some(slot) = self.slots.get_mut(&holder) {
                if matches!(slot, Slot::Resolved(_)) {
                    *slot = Slot::Failed(error.clone());
                    rolled_back.push(holder);
                }
            }
        }

        self.holders.remove(id);
        self.slots.insert(id.clone(), Slot::Failed(error.clone()));
        self.resolution_errors += 1;
        rolled_back
    }

    pub(crate) fn record_prototype(&mut self) {
        self.prototype_instances += 1;
    }

    pub(crate) fn record_error(&mut self) {
        self.resolution_errors += 1;
    }

    /// 取出尚未发布且仍然有效的单例
    pub(crate) fn take_unpublished(&mut self) -> Vec<(ComponentId, Instance)> {
        let pending = std::mem::take(&mut self.unpublished);
        pending
            .into_iter()
            .filter_map(|id| match self.slots.get(&id) {
                Some(Slot::Resolved(instance)) => Some((id, instance.clone())),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, state: InstanceState) -> usize {
        self.slots.values().filter(|slot| slot.state() == state).count()
    }

    pub(crate) fn prototype_instances(&self) -> usize {
        self.prototype_instances
    }

    pub(crate) fn resolution_errors(&self) -> usize {
        self.resolution_errors
    }

    /// 清空所有槽位，返回释放的单例数量
    pub(crate) fn clear(&mut self) -> usize {
        let released = self.count(InstanceState::Resolved);
        self.slots.clear();
        self.holders.clear();
        self.unpublished.clear();
        released
    }
}
