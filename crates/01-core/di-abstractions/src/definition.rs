//! 组件定义
//!
//! 描述如何构建一个组件实例：构造参数、setter 注入点、作用域和它满足的能力。
//! 所有的装配方式（代码配置、配置文件、组件扫描）最终都产出 [`ComponentDefinition`]。

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use wirebox_common::{Capability, ComponentId, DependencyError, Scope, TypeInfo};

/// 类型擦除后的组件实例，底层类型是组件的具体类型
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 构造函数类型
pub type ConstructorFn =
    Arc<dyn Fn(&Arguments) -> Result<Instance, DependencyError> + Send + Sync>;

/// setter 注入函数类型
pub type SetterFn =
    Arc<dyn Fn(&Instance, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync>;

/// 能力转换函数类型，返回装箱的 `Arc<I>`
pub type CastFn = Arc<dyn Fn(&Instance) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// 依赖引用
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyReference {
    /// 按标识引用另一个组件
    Component(ComponentId),
    /// 按能力自动装配，必须恰好有一个候选
    Capability(Capability),
    /// 字面量配置值
    Value(String),
}

impl DependencyReference {
    /// 按标识引用
    pub fn component(id: impl Into<ComponentId>) -> Self {
        Self::Component(id.into())
    }

    /// 按能力引用
    pub fn capability<I: ?Sized + 'static>() -> Self {
        Self::Capability(Capability::of::<I>())
    }

    /// 字面量
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(id) => write!(f, "ref:{id}"),
            Self::Capability(capability) => write!(f, "capability:{capability}"),
            Self::Value(value) => write!(f, "value:{value:?}"),
        }
    }
}

/// 注入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMode {
    /// 构造注入，依赖在实例存在之前全部解析
    Constructor,
    /// setter 注入，实例构造之后再注入依赖
    Setter,
}

/// 已解析的组件：定义加实例
#[derive(Clone)]
pub struct ResolvedComponent {
    definition: Arc<ComponentDefinition>,
    instance: Instance,
}

impl ResolvedComponent {
    /// 创建已解析组件
    pub fn new(definition: Arc<ComponentDefinition>, instance: Instance) -> Self {
        Self {
            definition,
            instance,
        }
    }

    /// 组件定义
    pub fn definition(&self) -> &Arc<ComponentDefinition> {
        &self.definition
    }

    /// 组件标识
    pub fn id(&self) -> &ComponentId {
        self.definition.id()
    }

    /// 类型擦除的实例
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// 转换为具体类型或能力
    pub fn cast<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DependencyError> {
        self.definition
            .cast_to::<I>(&self.instance)
            .ok_or_else(|| DependencyError::TypeMismatch {
                id: self.definition.id().to_string(),
                expected: Capability::of::<I>().name,
            })
    }
}

impl fmt::Debug for ResolvedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedComponent")
            .field("id", self.definition.id())
            .field("type", &self.definition.type_info().name)
            .finish()
    }
}

/// 注入值
#[derive(Debug, Clone)]
pub enum Injected {
    /// 组件引用
    Component(ResolvedComponent),
    /// 字面量
    Value(String),
    /// 可选依赖没有候选
    Absent,
}

/// 单个注入点上的值，携带所属组件和位置用于报错
#[derive(Debug, Clone, Copy)]
pub struct Injection<'a> {
    owner: &'a ComponentId,
    position: &'a str,
    injected: &'a Injected,
}

impl<'a> Injection<'a> {
    /// 创建注入值视图
    pub fn new(owner: &'a ComponentId, position: &'a str, injected: &'a Injected) -> Self {
        Self {
            owner,
            position,
            injected,
        }
    }

    /// 原始注入值
    pub fn injected(&self) -> &'a Injected {
        self.injected
    }

    /// 取组件依赖
    pub fn component<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DependencyError> {
        self.optional_component::<I>()?
            .ok_or_else(|| self.invalid("必需的组件依赖缺失"))
    }

    /// 取可选组件依赖
    pub fn optional_component<I: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Option<Arc<I>>, DependencyError> {
        match self.injected {
            Injected::Component(resolved) => resolved.cast::<I>().map(Some),
            Injected::Absent => Ok(None),
            Injected::Value(_) => Err(self.invalid("期望组件引用，实际为字面量")),
        }
    }

    /// 取字面量
    pub fn value(&self) -> Result<&'a str, DependencyError> {
        match self.injected {
            Injected::Value(value) => Ok(value),
            _ => Err(self.invalid("期望字面量，实际为组件引用")),
        }
    }

    /// 解析字面量
    pub fn parse<T>(&self) -> Result<T, DependencyError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let raw = self.value()?;
        raw.parse::<T>()
            .map_err(|e| self.invalid(format!("无法解析 {raw:?}: {e}")))
    }

    fn invalid(&self, message: impl Into<String>) -> DependencyError {
        DependencyError::invalid_argument(self.owner.as_str(), self.position, message)
    }
}

/// 构造参数，按声明顺序排列
#[derive(Debug, Clone)]
pub struct Arguments {
    owner: ComponentId,
    positions: Vec<String>,
    values: Vec<Injected>,
}

impl Arguments {
    /// 创建构造参数
    pub fn new(owner: ComponentId, values: Vec<Injected>) -> Self {
        let positions = (0..values.len())
            .map(|index| format!("constructor-arg[{index}]"))
            .collect();
        Self {
            owner,
            positions,
            values,
        }
    }

    /// 所属组件
    pub fn owner(&self) -> &ComponentId {
        &self.owner
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取第 `index` 个参数
    pub fn get(&self, index: usize) -> Result<Injection<'_>, DependencyError> {
        match (self.values.get(index), self.positions.get(index)) {
            (Some(injected), Some(position)) => Ok(Injection::new(&self.owner, position, injected)),
            _ => Err(DependencyError::invalid_argument(
                self.owner.as_str(),
                format!("constructor-arg[{index}]"),
                format!("只声明了 {} 个构造参数", self.values.len()),
            )),
        }
    }

    /// 取组件参数
    pub fn component<I: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Arc<I>, DependencyError> {
        self.get(index)?.component::<I>()
    }

    /// 取字面量参数
    pub fn value(&self, index: usize) -> Result<&str, DependencyError> {
        self.get(index)?.value()
    }

    /// 解析字面量参数
    pub fn parse<T>(&self, index: usize) -> Result<T, DependencyError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(index)?.parse::<T>()
    }
}

/// 能力绑定
#[derive(Clone)]
pub struct CapabilityBinding {
    capability: Capability,
    cast: CastFn,
}

impl CapabilityBinding {
    /// 能力
    pub fn capability(&self) -> &Capability {
        &self.capability
    }
}

impl fmt::Debug for CapabilityBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityBinding")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

/// setter 注入点
#[derive(Clone)]
pub struct SetterInjection {
    property: String,
    reference: DependencyReference,
    required: bool,
    apply: SetterFn,
}

impl SetterInjection {
    /// 属性名称
    pub fn property(&self) -> &str {
        &self.property
    }

    /// 依赖引用
    pub fn reference(&self) -> &DependencyReference {
        &self.reference
    }

    /// 是否必需
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 注入点位置描述
    pub fn position(&self) -> String {
        format!("property '{}'", self.property)
    }

    /// 替换依赖引用
    #[must_use]
    pub fn with_reference(mut self, reference: DependencyReference) -> Self {
        self.reference = reference;
        self
    }

    /// 设置是否必需
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 对实例执行注入
    pub fn apply(&self, instance: &Instance, injection: &Injection<'_>) -> Result<(), DependencyError> {
        (self.apply)(instance, injection)
    }
}

impl fmt::Debug for SetterInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterInjection")
            .field("property", &self.property)
            .field("reference", &self.reference)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// 组件定义
#[derive(Clone)]
pub struct ComponentDefinition {
    id: ComponentId,
    type_info: TypeInfo,
    scope: Scope,
    lazy: bool,
    description: Option<String>,
    constructor_args: Vec<DependencyReference>,
    setters: Vec<SetterInjection>,
    capabilities: Vec<CapabilityBinding>,
    constructor: ConstructorFn,
}

impl ComponentDefinition {
    /// 创建类型化的定义构建器
    pub fn builder<T, F>(id: impl Into<ComponentId>, constructor: F) -> DefinitionBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        DefinitionBuilder::new(id, constructor)
    }

    /// 组件标识
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// 具体类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 是否延迟初始化
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 描述
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// 构造参数引用
    pub fn constructor_args(&self) -> &[DependencyReference] {
        &self.constructor_args
    }

    /// setter 注入点
    pub fn setters(&self) -> &[SetterInjection] {
        &self.setters
    }

    /// 满足的能力，第一项总是具体类型本身
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().map(CapabilityBinding::capability)
    }

    /// 注入方式：声明了 setter 注入点即为 setter 注入
    pub fn injection_mode(&self) -> InjectionMode {
        if self.setters.is_empty() {
            InjectionMode::Constructor
        } else {
            InjectionMode::Setter
        }
    }

    /// 是否满足指定能力
    pub fn provides(&self, type_id: TypeId) -> bool {
        self.capabilities
            .iter()
            .any(|binding| binding.capability.type_id == type_id)
    }

    /// 所有依赖引用：先构造参数，后 setter
    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyReference> {
        self.constructor_args
            .iter()
            .chain(self.setters.iter().map(SetterInjection::reference))
    }

    /// 把实例转换为指定能力
    pub fn cast_to<I: ?Sized + Send + Sync + 'static>(&self, instance: &Instance) -> Option<Arc<I>> {
        let target = TypeId::of::<I>();
        let binding = self
            .capabilities
            .iter()
            .find(|binding| binding.capability.type_id == target)?;
        let boxed = (binding.cast)(instance)?;
        boxed.downcast::<Arc<I>>().ok().map(|arc| *arc)
    }

    /// 调用构造函数
    pub fn construct(&self, arguments: &Arguments) -> Result<Instance, DependencyError> {
        (self.constructor)(arguments)
    }

    /// 替换标识
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = id.into();
        self
    }

    /// 替换构造参数引用
    #[must_use]
    pub fn with_constructor_args(mut self, args: Vec<DependencyReference>) -> Self {
        self.constructor_args = args;
        self
    }

    /// 添加 setter 注入点，同名属性会被替换
    #[must_use]
    pub fn with_setter(mut self, setter: SetterInjection) -> Self {
        match self
            .setters
            .iter_mut()
            .find(|existing| existing.property == setter.property)
        {
            Some(existing) => *existing = setter,
            None => self.setters.push(setter),
        }
        self
    }

    /// 设置作用域
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置是否延迟初始化
    #[must_use]
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// 设置描述
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("id", &self.id)
            .field("type", &self.type_info.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("constructor_args", &self.constructor_args)
            .field("setters", &self.setters)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// 类型化的组件定义构建器
///
/// ```ignore
/// let player = ComponentDefinition::builder("cdPlayer", |_| Ok(CdPlayer::new()))
///     .setter("compactDisc", DependencyReference::capability::<dyn CompactDisc>(), |player: &CdPlayer, disc| {
///         player.set_compact_disc(disc.component::<dyn CompactDisc>()?);
///         Ok(())
///     })
///     .provides::<dyn MediaPlayer>(|player| player as Arc<dyn MediaPlayer>)
///     .build();
/// ```
pub struct DefinitionBuilder<T> {
    definition: ComponentDefinition,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DefinitionBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// 使用构造函数创建构建器
    pub fn new<F>(id: impl Into<ComponentId>, constructor: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        let constructor: ConstructorFn =
            Arc::new(move |arguments: &Arguments| constructor(arguments).map(|value| Arc::new(value) as Instance));
        let self_binding = CapabilityBinding {
            capability: Capability::of::<T>(),
            cast: Arc::new(|instance: &Instance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|typed| Box::new(typed) as Box<dyn Any + Send + Sync>)
            }),
        };

        Self {
            definition: ComponentDefinition {
                id: id.into(),
                type_info: TypeInfo::of::<T>(),
                scope: Scope::Singleton,
                lazy: true,
                description: None,
                constructor_args: Vec::new(),
                setters: Vec::new(),
                capabilities: vec![self_binding],
                constructor,
            },
            _marker: PhantomData,
        }
    }

    /// 使用已创建的实例，总是单例
    pub fn from_instance(id: impl Into<ComponentId>, instance: Arc<T>) -> Self {
        let mut builder = Self::new(id, |_| {
            Err(DependencyError::construction_failed("<instance>", "预创建实例不会被再次构造"))
        });
        builder.definition.constructor = Arc::new(move |_| Ok(instance.clone() as Instance));
        builder
    }

    /// 追加构造参数引用
    #[must_use]
    pub fn arg(mut self, reference: DependencyReference) -> Self {
        self.definition.constructor_args.push(reference);
        self
    }

    /// 追加多个构造参数引用
    #[must_use]
    pub fn args(mut self, references: impl IntoIterator<Item = DependencyReference>) -> Self {
        self.definition.constructor_args.extend(references);
        self
    }

    /// 追加必需的 setter 注入点
    #[must_use]
    pub fn setter<F>(self, property: impl Into<String>, reference: DependencyReference, apply: F) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        let setter = Self::setter_injection(property, reference, true, apply);
        self.with_setter(setter)
    }

    /// 追加可选的 setter 注入点，能力没有候选时跳过
    #[must_use]
    pub fn optional_setter<F>(
        self,
        property: impl Into<String>,
        reference: DependencyReference,
        apply: F,
    ) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        let setter = Self::setter_injection(property, reference, false, apply);
        self.with_setter(setter)
    }

    /// 追加已构建的 setter 注入点
    #[must_use]
    pub fn with_setter(mut self, setter: SetterInjection) -> Self {
        self.definition = self.definition.with_setter(setter);
        self
    }

    /// 声明组件满足能力 `I`
    #[must_use]
    pub fn provides<I>(mut self, upcast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let capability = Capability::of::<I>();
        if self.definition.provides(capability.type_id) {
            return self;
        }
        self.definition.capabilities.push(CapabilityBinding {
            capability,
            cast: Arc::new(move |instance: &Instance| {
                instance
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|typed| Box::new(upcast(typed)) as Box<dyn Any + Send + Sync>)
            }),
        });
        self
    }

    /// 设置作用域
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.definition.scope = scope;
        self
    }

    /// 设置为原型作用域
    #[must_use]
    pub fn prototype(self) -> Self {
        self.scope(Scope::Prototype)
    }

    /// 设置是否延迟初始化
    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.definition.lazy = lazy;
        self
    }

    /// 设置描述
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    /// 构建组件定义
    pub fn build(self) -> ComponentDefinition {
        self.definition
    }

    /// 构建类型擦除的 setter 注入点
    pub fn setter_injection<F>(
        property: impl Into<String>,
        reference: DependencyReference,
        required: bool,
        apply: F,
    ) -> SetterInjection
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        let property = property.into();
        let expected = std::any::type_name::<T>();
        SetterInjection {
            property,
            reference,
            required,
            apply: Arc::new(move |instance: &Instance, injection: &Injection<'_>| {
                let target = instance.downcast_ref::<T>().ok_or_else(|| DependencyError::TypeMismatch {
                    id: "<setter target>".to_string(),
                    expected: expected.to_string(),
                })?;
                apply(target, injection)
            }),
        }
    }
}
