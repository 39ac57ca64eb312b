//! 注入图构建
//!
//! 把候选列表展开为单例提供者与绑定全集: 每个可构造候选登记一条以自身
//! 具体类型为键的单例绑定, 并为每条能力声明登记一条 (能力, 绑定名) 别名
//! 绑定; 自身绑定与全部别名绑定共享同一个单例提供者。绑定只增不减, 没有
//! 优先级语义, 键冲突即构建失败。

use container_abstractions::{BeanNameStrategy, ContextAware};
use container_common::{
    BeanConstructor, BeanHandle, CandidateType, CapabilityCast, ContextError, ContextResult,
    TypeInfo,
};
use once_cell::sync::OnceCell;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 绑定键: (类型, 可选去歧义名)
///
/// 具体类型绑定无名称; 能力别名绑定恒有名称。一次刷新内每个键至多指向
/// 一条绑定。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    type_id: TypeId,
    name: Option<String>,
}

impl BindingKey {
    /// 具体类型绑定键
    pub fn of_type(type_id: TypeId) -> Self {
        Self {
            type_id,
            name: None,
        }
    }

    /// (能力, 绑定名) 别名绑定键
    pub fn named(type_id: TypeId, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: Some(name.into()),
        }
    }

    /// 键的类型部分
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 键的名称部分
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// 单例提供者: 每个可构造候选一个, 由其自身绑定与全部别名绑定共享
///
/// 单例格缓存原始实例句柄; 格随注入图按代新建, 因此实例绝不跨刷新复用。
struct SingletonProvider {
    constructor: BeanConstructor,
    aware_cast: Option<CapabilityCast>,
    cell: OnceCell<BeanHandle>,
}

impl SingletonProvider {
    fn new(constructor: BeanConstructor, aware_cast: Option<CapabilityCast>) -> Self {
        Self {
            constructor,
            aware_cast,
            cell: OnceCell::new(),
        }
    }

    /// 取原始单例句柄; 首次调用触发构造, 第二个分量标记是否为本次新建
    fn instance(&self) -> (BeanHandle, bool) {
        let mut created = false;
        let raw = self
            .cell
            .get_or_init(|| {
                created = true;
                (self.constructor)()
            })
            .clone();
        (raw, created)
    }
}

/// 注入图中的一条绑定
pub struct Binding {
    key: BindingKey,
    declared: TypeInfo,
    provider: Arc<SingletonProvider>,
    materialize: CapabilityCast,
}

impl Binding {
    /// 绑定键
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// 绑定声明类型 (查找键对应的类型信息)
    pub fn declared(&self) -> &TypeInfo {
        &self.declared
    }

    /// 实例化共享单例并返回原始句柄; 第二个分量标记是否为本次新建
    pub(crate) fn instantiate(&self) -> (BeanHandle, bool) {
        self.provider.instance()
    }

    /// 把原始句柄物化为本绑定查找类型下的载荷句柄
    pub(crate) fn payload(&self, raw: &BeanHandle) -> Option<BeanHandle> {
        (self.materialize)(raw)
    }

    /// 若所属候选声明了上下文感知能力, 还原感知接口实例
    pub(crate) fn aware_instance(&self, raw: &BeanHandle) -> Option<Arc<dyn ContextAware>> {
        let cast = self.provider.aware_cast.as_ref()?;
        let payload = cast(raw)?;
        payload.downcast_ref::<Arc<dyn ContextAware>>().cloned()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("declared", &self.declared.name())
            .finish()
    }
}

/// 依赖注入图: 一代刷新的单例提供者与绑定全集
#[derive(Debug, Default)]
pub struct InjectionGraph {
    bindings: Vec<Binding>,
    by_declared: HashMap<TypeId, Vec<usize>>,
    by_capability: HashMap<TypeId, Vec<usize>>,
    by_key: HashMap<BindingKey, usize>,
}

impl InjectionGraph {
    /// 依据候选列表与命名策略构建注入图
    ///
    /// 空候选列表产生合法的空图; 候选集合畸形 (键冲突) 时返回构建错误。
    pub fn build(
        candidates: &[CandidateType],
        names: &dyn BeanNameStrategy,
    ) -> ContextResult<Self> {
        let mut graph = Self::default();

        for candidate in candidates {
            let Some((constructor, self_cast)) = candidate.provider_parts() else {
                // 纯能力候选自身不产生绑定, 其注册表条目来自别名绑定
                debug!("纯能力候选: {}", candidate.type_info().name());
                continue;
            };

            let aware_cast = candidate
                .capability_decl(TypeId::of::<dyn ContextAware>())
                .map(|decl| decl.cast().clone());
            let provider = Arc::new(SingletonProvider::new(constructor.clone(), aware_cast));

            graph.insert(Binding {
                key: BindingKey::of_type(candidate.type_info().id()),
                declared: candidate.type_info().clone(),
                provider: Arc::clone(&provider),
                materialize: self_cast.clone(),
            })?;

            for decl in candidate.capabilities() {
                let name = decl
                    .binding_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| names.generate(candidate));
                graph.insert(Binding {
                    key: BindingKey::named(decl.capability().id(), name),
                    declared: decl.capability().clone(),
                    provider: Arc::clone(&provider),
                    materialize: decl.cast().clone(),
                })?;
            }
        }

        debug!("注入图构建完成: {} 条绑定", graph.bindings.len());
        Ok(graph)
    }

    /// 按键查询绑定
    pub fn binding(&self, key: &BindingKey) -> Option<&Binding> {
        self.by_key
            .get(key)
            .and_then(|&index| self.bindings.get(index))
    }

    /// 声明类型等于给定类型的全部绑定 (插入顺序)
    pub fn bindings_declared_as(&self, type_id: TypeId) -> Vec<&Binding> {
        self.indexed(&self.by_declared, type_id)
    }

    /// 给定能力下的全部别名绑定 (插入顺序)
    pub fn alias_bindings_of(&self, capability: TypeId) -> Vec<&Binding> {
        self.indexed(&self.by_capability, capability)
    }

    /// 图中出现过别名绑定的全部能力类型
    pub fn capability_ids(&self) -> Vec<TypeId> {
        self.by_capability.keys().copied().collect()
    }

    /// 绑定总数
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 是否为空图
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn insert(&mut self, binding: Binding) -> ContextResult<()> {
        if self.by_key.contains_key(&binding.key) {
            return Err(match binding.key.name() {
                Some(name) => ContextError::duplicate_binding(binding.declared.name(), name),
                None => ContextError::duplicate_type(binding.declared.name()),
            });
        }

        let index = self.bindings.len();
        self.by_key.insert(binding.key.clone(), index);
        self.by_declared
            .entry(binding.key.type_id())
            .or_default()
            .push(index);
        if binding.key.name().is_some() {
            self.by_capability
                .entry(binding.key.type_id())
                .or_default()
                .push(index);
        }
        self.bindings.push(binding);
        Ok(())
    }

    fn indexed<'a>(
        &'a self,
        index: &'a HashMap<TypeId, Vec<usize>>,
        type_id: TypeId,
    ) -> Vec<&'a Binding> {
        index
            .get(&type_id)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&i| self.bindings.get(i))
                    .collect()
            })
            .unwrap_or_default()
    }
}
