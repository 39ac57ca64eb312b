//! 候选组件模型
//!
//! `CandidateType` 描述一个可被容器管理的类型: 无参构造函数, 以及它声明
//! 实现的能力 (接口) 列表。稳定版 Rust 无法在运行期枚举某类型实现了哪些
//! trait, 因此每条能力声明在声明点捕获 `Arc<具体类型> → Arc<dyn 能力>`
//! 的向上转型闭包, 图构建与注册表物化阶段只操作类型擦除的句柄。
//!
//! 另提供进程级全局候选注册表, 供链接期 (`ctor`) 登记与按模块根扫描。

use crate::metadata::TypeInfo;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// 类型擦除的 Bean 实例句柄
///
/// 注册表载荷约定: 句柄内部的具体类型恒为 `Arc<L>`, 其中 `L` 为该条目
/// 注册时的查找类型 (具体组件类型或 `dyn 能力`)。
pub type BeanHandle = Arc<dyn Any + Send + Sync>;

/// Bean 无参构造函数, 产出原始单例句柄 (内部具体类型为组件本身)
pub type BeanConstructor = Arc<dyn Fn() -> BeanHandle + Send + Sync>;

/// 能力向上转型闭包: 原始单例句柄 → 对应查找类型的载荷句柄
///
/// 原始句柄与声明时的具体类型不符时返回 `None`。
pub type CapabilityCast = Arc<dyn Fn(&BeanHandle) -> Option<BeanHandle> + Send + Sync>;

/// 候选类型声明的一条能力绑定
#[derive(Clone)]
pub struct CapabilityDecl {
    capability: TypeInfo,
    binding_name: Option<String>,
    cast: CapabilityCast,
}

impl CapabilityDecl {
    /// 能力类型信息
    pub fn capability(&self) -> &TypeInfo {
        &self.capability
    }

    /// 显式绑定名; `None` 时由命名策略在图构建阶段生成
    pub fn binding_name(&self) -> Option<&str> {
        self.binding_name.as_deref()
    }

    /// 向上转型闭包
    pub fn cast(&self) -> &CapabilityCast {
        &self.cast
    }
}

impl fmt::Debug for CapabilityDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDecl")
            .field("capability", &self.capability.name())
            .field("binding_name", &self.binding_name)
            .finish()
    }
}

/// 候选组件类型描述
///
/// 两种形态:
/// - 具体组件候选: 携带构造函数, 刷新时以自身类型单例绑定, 并为每条能力
///   声明登记一条别名绑定;
/// - 纯能力候选: 接口自身参与扫描, 不直接产生绑定, 其注册表条目来自其他
///   候选指向该能力的别名绑定。
///
/// 一经发现即不可变; 下一次刷新以新一代候选列表整体取代。
#[derive(Clone)]
pub struct CandidateType {
    type_info: TypeInfo,
    constructor: Option<BeanConstructor>,
    self_cast: Option<CapabilityCast>,
    capabilities: Vec<CapabilityDecl>,
}

impl CandidateType {
    /// 以无参构造函数开始声明一个具体组件候选
    pub fn component<T, F>(constructor: F) -> CandidateBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        CandidateBuilder {
            constructor: Arc::new(move || Arc::new(constructor()) as BeanHandle),
            capabilities: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// 声明一个纯能力候选 (接口本身作为可扫描类型)
    pub fn capability<C: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<C>(),
            constructor: None,
            self_cast: None,
            capabilities: Vec::new(),
        }
    }

    /// 候选类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 是否为可构造的具体组件候选
    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// 构造函数与自类型载荷转换; 纯能力候选返回 `None`
    pub fn provider_parts(&self) -> Option<(&BeanConstructor, &CapabilityCast)> {
        self.constructor.as_ref().zip(self.self_cast.as_ref())
    }

    /// 声明的能力绑定列表 (声明顺序)
    pub fn capabilities(&self) -> &[CapabilityDecl] {
        &self.capabilities
    }

    /// 查找指定能力类型的首条声明
    pub fn capability_decl(&self, capability: TypeId) -> Option<&CapabilityDecl> {
        self.capabilities
            .iter()
            .find(|decl| decl.capability.id() == capability)
    }
}

impl fmt::Debug for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateType")
            .field("type", &self.type_info.name())
            .field("constructible", &self.is_constructible())
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}

/// 具体组件候选的构建器
///
/// 泛型参数 `T` 使 `implements` 系列方法能够在声明点完成
/// `Arc<T> → Arc<dyn 能力>` 的强制转换捕获。
pub struct CandidateBuilder<T: Send + Sync + 'static> {
    constructor: BeanConstructor,
    capabilities: Vec<CapabilityDecl>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> CandidateBuilder<T> {
    /// 声明该候选实现的能力, 绑定名由命名策略在图构建时生成
    pub fn implements<C>(self, cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.push_capability(None, cast)
    }

    /// 以显式绑定名声明能力 (同一能力存在多条声明路径时用于区分)
    pub fn implements_named<C>(self, name: impl Into<String>, cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.push_capability(Some(name.into()), cast)
    }

    /// 完成候选构建
    pub fn build(self) -> CandidateType {
        CandidateType {
            type_info: TypeInfo::of::<T>(),
            constructor: Some(self.constructor),
            self_cast: Some(Arc::new(|raw: &BeanHandle| {
                raw.clone()
                    .downcast::<T>()
                    .ok()
                    .map(|instance| Arc::new(instance) as BeanHandle)
            })),
            capabilities: self.capabilities,
        }
    }

    fn push_capability<C>(mut self, binding_name: Option<String>, cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.capabilities.push(CapabilityDecl {
            capability: TypeInfo::of::<C>(),
            binding_name,
            cast: Arc::new(move |raw: &BeanHandle| {
                raw.clone()
                    .downcast::<T>()
                    .ok()
                    .map(|instance| Arc::new(cast(instance)) as BeanHandle)
            }),
        });
        self
    }
}

static GLOBAL_CANDIDATES: Lazy<RwLock<Vec<CandidateType>>> =
    Lazy::new(|| RwLock::new(Vec::new()));

/// 向进程级全局注册表登记一个候选类型 (通常由 `ctor` 在链接期调用)
pub fn register_candidate(candidate: CandidateType) {
    debug!("登记全局候选类型: {}", candidate.type_info().name());
    GLOBAL_CANDIDATES.write().push(candidate);
}

/// 获取全局候选注册表的当前快照 (登记顺序)
pub fn global_candidates() -> Vec<CandidateType> {
    GLOBAL_CANDIDATES.read().clone()
}

/// 清空全局候选注册表 (测试隔离用)
pub fn clear_global_candidates() {
    GLOBAL_CANDIDATES.write().clear();
}
