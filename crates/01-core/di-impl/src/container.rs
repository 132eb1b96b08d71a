//! 依赖注入容器实现

use crate::registry::Definitions;
use crate::state::{ResolutionState, Slot};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::{
    resolve_reference_statically, Arguments, CircularDependencyDetector, ComponentDefinition,
    ComponentKey, ComponentRegistry, ComponentResolver, ContainerConfig, ContainerStats,
    DefaultCircularDependencyDetector, DependencyReference, DiContainer, Injected, Injection,
    Instance, ResolveContext, ResolvedComponent,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wirebox_common::{
    Capability, ComponentId, ContainerPhase, DependencyError, InstanceState, Scope,
};

/// 注册表和容器阶段
#[derive(Debug, Default)]
struct Registry {
    phase: ContainerPhase,
    started_at: Option<DateTime<Utc>>,
    definitions: Arc<Definitions>,
}

/// 依赖注入容器
///
/// 注册在首次解析之前完成；解析可以并发进行。所有构造都在同一把构造锁内执行，
/// 保证每个单例最多构造一次。每次顶层解析结束后，已完成的单例发布到无锁缓存，
/// 之后的读取不再经过构造锁。
pub struct Container {
    id: Uuid,
    config: ContainerConfig,
    registry: RwLock<Registry>,
    resolution: Mutex<ResolutionState>,
    published: DashMap<ComponentId, Instance>,
    detector: DefaultCircularDependencyDetector,
}

impl Container {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let id = Uuid::new_v4();
        debug!("创建容器: {}", id);
        Self {
            id,
            config,
            registry: RwLock::new(Registry::default()),
            resolution: Mutex::new(ResolutionState::default()),
            published: DashMap::new(),
            detector: DefaultCircularDependencyDetector,
        }
    }

    /// 容器实例标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<Definitions> {
        self.registry.read().definitions.clone()
    }

    /// 进入 Started 阶段并返回定义快照；已关闭时报 `ContainerClosed`
    fn ensure_started(&self) -> Result<Arc<Definitions>, DependencyError> {
        {
            let registry = self.registry.read();
            match registry.phase {
                ContainerPhase::Closed => return Err(DependencyError::ContainerClosed),
                ContainerPhase::Started => return Ok(registry.definitions.clone()),
                ContainerPhase::Configuring => {}
            }
        }

        let mut registry = self.registry.write();
        match registry.phase {
            ContainerPhase::Closed => return Err(DependencyError::ContainerClosed),
            ContainerPhase::Configuring => {
                registry.phase = ContainerPhase::Started;
                registry.started_at = Some(Utc::now());
                info!("容器已启动: {}, 共 {} 个组件", self.id, registry.definitions.len());
            }
            ContainerPhase::Started => {}
        }
        Ok(registry.definitions.clone())
    }

    fn is_closed(&self) -> bool {
        self.registry.read().phase == ContainerPhase::Closed
    }

    /// 顶层解析入口
    fn resolve_top(
        &self,
        definitions: &Definitions,
        definition: &Arc<ComponentDefinition>,
    ) -> Result<ResolvedComponent, DependencyError> {
        if definition.scope() == Scope::Singleton {
            if let Some(instance) = self.published.get(definition.id()) {
                return Ok(ResolvedComponent::new(definition.clone(), instance.value().clone()));
            }
        }

        let mut state = self.resolution.lock();
        if self.is_closed() {
            return Err(DependencyError::ContainerClosed);
        }

        let mut context = ResolveContext::new(self.config.max_resolution_depth);
        let result = self.resolve_definition(&mut state, definitions, definition, &mut context);

        for (id, instance) in state.take_unpublished() {
            self.published.insert(id, instance);
        }

        result.map(|instance| ResolvedComponent::new(definition.clone(), instance))
    }

    fn resolve_definition(
        &self,
        state: &mut ResolutionState,
        definitions: &Definitions,
        definition: &Arc<ComponentDefinition>,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError> {
        let id = definition.id();

        if definition.scope() == Scope::Singleton {
            match state.slot(id).cloned() {
                Some(Slot::Resolved(instance)) => {
                    // 拿到仍持有提前引用的实例，等同于间接拿到了提前引用
                    let held = state.held_by(id);
                    state.hold(context.chain(), &held);
                    return Ok(instance);
                }
                Some(Slot::Failed(error)) => return Err(error),
                Some(Slot::Resolving { early: Some(instance) }) => {
                    debug!("使用提前暴露的引用: {}", id);
                    state.hold(context.chain(), &HashSet::from([id.clone()]));
                    return Ok(instance);
                }
                Some(Slot::Resolving { early: None }) => {
                    return Err(DependencyError::CircularDependency {
                        dependency_chain: context.chain_to(id),
                    });
                }
                None => {}
            }
        }

        if let Err(error) = context.push(id) {
            state.record_error();
            return Err(error);
        }
        debug!("解析组件: {} (深度 {})", id, context.depth());

        let result = match definition.scope() {
            Scope::Singleton => self.create_singleton(state, definitions, definition, context),
            Scope::Prototype => self.create_prototype(state, definitions, definition, context),
        };

        context.pop();
        result
    }

    fn create_singleton(
        &self,
        state: &mut ResolutionState,
        definitions: &Definitions,
        definition: &Arc<ComponentDefinition>,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError> {
        let id = definition.id();
        state.begin(id);

        match self.build_instance(state, definitions, definition, context, true) {
            Ok(instance) => {
                state.complete(id, instance.clone());
                debug!("单例已创建: {}", id);
                Ok(instance)
            }
            Err(error) => {
                let rolled_back = state.fail(id, &error);
                warn!("组件解析失败: {}, 原因: {}", id, error);
                if !rolled_back.is_empty() {
                    warn!("持有 {} 提前引用的组件一并失败: {:?}", id, rolled_back);
                }
                Err(error)
            }
        }
    }

    fn create_prototype(
        &self,
        state: &mut ResolutionState,
        definitions: &Definitions,
        definition: &Arc<ComponentDefinition>,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError> {
        match self.build_instance(state, definitions, definition, context, false) {
            Ok(instance) => {
                state.record_prototype();
                debug!("原型实例已创建: {}", definition.id());
                Ok(instance)
            }
            Err(error) => {
                state.record_error();
                warn!("原型组件解析失败: {}, 原因: {}", definition.id(), error);
                Err(error)
            }
        }
    }

    /// 构造参数 → 构造 → （暴露提前引用）→ setter 注入
    fn build_instance(
        &self,
        state: &mut ResolutionState,
        definitions: &Definitions,
        definition: &Arc<ComponentDefinition>,
        context: &mut ResolveContext,
        expose_early: bool,
    ) -> Result<Instance, DependencyError> {
        let id = definition.id();

        let mut values = Vec::with_capacity(definition.constructor_args().len());
        for reference in definition.constructor_args() {
            values.push(self.resolve_reference(state, definitions, reference, true, context)?);
        }
        let arguments = Arguments::new(id.clone(), values);
        let instance = guarded(id, || definition.construct(&arguments))?;

        if definition.setters().is_empty() {
            return Ok(instance);
        }
        if expose_early {
            state.expose(id, &instance);
        }

        for setter in definition.setters() {
            let injected =
                self.resolve_reference(state, definitions, setter.reference(), setter.is_required(), context)?;
            if matches!(injected, Injected::Absent) {
                debug!("可选属性没有候选，跳过: {}.{}", id, setter.property());
                continue;
            }
            let position = setter.position();
            guarded(id, || setter.apply(&instance, &Injection::new(id, &position, &injected)))?;
        }

        Ok(instance)
    }

    fn resolve_reference(
        &self,
        state: &mut ResolutionState,
        definitions: &Definitions,
        reference: &DependencyReference,
        required: bool,
        context: &mut ResolveContext,
    ) -> Result<Injected, DependencyError> {
        let target = match reference {
            DependencyReference::Value(value) => return Ok(Injected::Value(value.clone())),
            DependencyReference::Component(id) => definitions.require(id)?.clone(),
            DependencyReference::Capability(capability) => match definitions.select(capability) {
                Ok(definition) => definition,
                Err(DependencyError::NoSuchComponent { .. }) if !required => return Ok(Injected::Absent),
                Err(error) => return Err(error),
            },
        };

        let instance = self.resolve_definition(state, definitions, &target, context)?;
        Ok(Injected::Component(ResolvedComponent::new(target, instance)))
    }
}

/// 把构造函数或 setter 中的 panic 转成 `ConstructionFailed`，槽位才能正常落到 Failed
fn guarded<T>(
    id: &ComponentId,
    f: impl FnOnce() -> Result<T, DependencyError>,
) -> Result<T, DependencyError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "未知 panic".to_string());
        warn!("组件 {} 构造时发生 panic: {}", id, message);
        Err(DependencyError::construction_failed(
            id.as_str(),
            format!("构造时发生 panic: {message}"),
        ))
    })
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("phase", &registry.phase)
            .field("components", &registry.definitions.len())
            .finish_non_exhaustive()
    }
}

impl ComponentRegistry for Container {
    fn register(&self, definition: ComponentDefinition) -> Result<(), DependencyError> {
        let mut registry = self.registry.write();
        match registry.phase {
            ContainerPhase::Closed => return Err(DependencyError::ContainerClosed),
            ContainerPhase::Started => {
                return Err(DependencyError::ContainerAlreadyStarted {
                    id: definition.id().to_string(),
                })
            }
            ContainerPhase::Configuring => {}
        }

        info!(
            "注册组件: {} ({}, {})",
            definition.id(),
            definition.type_info().short_name(),
            definition.scope()
        );
        Arc::make_mut(&mut registry.definitions).insert(definition)
    }

    fn contains(&self, id: &ComponentId) -> bool {
        self.registry.read().definitions.contains(id)
    }

    fn definition(&self, id: &ComponentId) -> Option<Arc<ComponentDefinition>> {
        self.registry.read().definitions.get(id).cloned()
    }

    fn definitions(&self) -> Vec<Arc<ComponentDefinition>> {
        self.registry.read().definitions.all().to_vec()
    }

    fn candidates(&self, capability: &Capability) -> Vec<Arc<ComponentDefinition>> {
        self.registry.read().definitions.candidates(capability)
    }
}

impl ComponentResolver for Container {
    fn resolve_key(&self, key: &ComponentKey) -> Result<ResolvedComponent, DependencyError> {
        let definitions = self.ensure_started()?;
        let definition = match key {
            ComponentKey::Id(id) => definitions.require(id)?.clone(),
            ComponentKey::Capability(capability) => definitions.select(capability)?,
        };
        self.resolve_top(&definitions, &definition)
    }

    fn resolve_all_of(&self, capability: &Capability) -> Result<Vec<ResolvedComponent>, DependencyError> {
        let definitions = self.ensure_started()?;
        definitions
            .candidates(capability)
            .iter()
            .map(|definition| self.resolve_top(&definitions, definition))
            .collect()
    }
}

impl DiContainer for Container {
    fn validate(&self) -> Result<(), DependencyError> {
        let definitions = self.snapshot();
        info!("验证容器: {} 个组件", definitions.len());

        for definition in definitions.all() {
            for setter in definition.setters() {
                match resolve_reference_statically(setter.reference(), definitions.all()) {
                    Ok(_) => {}
                    Err(DependencyError::NoSuchComponent { .. })
                        if !setter.is_required()
                            && matches!(setter.reference(), DependencyReference::Capability(_)) => {}
                    Err(error) => {
                        warn!("组件 {} 的属性 {} 无法装配: {}", definition.id(), setter.property(), error);
                        return Err(error);
                    }
                }
            }
        }

        let graph = self.detector.build_dependency_graph(definitions.all())?;
        self.detector.detect_circular_dependencies(&graph).map_err(|error| {
            warn!("容器验证失败: {}", error);
            error
        })
    }

    fn pre_instantiate_singletons(&self) -> Result<usize, DependencyError> {
        let eager: Vec<Arc<ComponentDefinition>> = self
            .snapshot()
            .all()
            .iter()
            .filter(|definition| definition.scope() == Scope::Singleton && !definition.is_lazy())
            .cloned()
            .collect();
        if eager.is_empty() {
            return Ok(0);
        }

        let definitions = self.ensure_started()?;
        for definition in &eager {
            self.resolve_top(&definitions, definition)?;
        }
        info!("预实例化单例: {} 个", eager.len());
        Ok(eager.len())
    }

    fn state_of(&self, id: &ComponentId) -> Option<InstanceState> {
        if !self.contains(id) {
            return None;
        }
        Some(self.resolution.lock().state_of(id))
    }

    fn phase(&self) -> ContainerPhase {
        self.registry.read().phase
    }

    fn stats(&self) -> ContainerStats {
        let (phase, started_at, registered) = {
            let registry = self.registry.read();
            (registry.phase, registry.started_at, registry.definitions.len())
        };
        let state = self.resolution.lock();

        let mut stats = ContainerStats::new(self.id);
        stats.phase = phase;
        stats.started_at = started_at;
        stats.registered_components = registered;
        stats.resolved_singletons = state.count(InstanceState::Resolved);
        stats.failed_singletons = state.count(InstanceState::Failed);
        stats.prototype_instances = state.prototype_instances();
        stats.resolution_errors = state.resolution_errors();
        stats
    }

    fn close(&self) {
        {
            let mut registry = self.registry.write();
            if registry.phase == ContainerPhase::Closed {
                debug!("容器已经关闭: {}", self.id);
                return;
            }
            registry.phase = ContainerPhase::Closed;
        }

        let released = self.resolution.lock().clear();
        self.published.clear();
        info!("容器已关闭: {}, 释放 {} 个单例", self.id, released);
    }
}
