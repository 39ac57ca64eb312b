//! 应用上下文抽象
//!
//! `ApplicationContext` 是对象安全的查询表面, Bean 与路由工厂通过
//! `Arc<dyn ApplicationContext>` 持有容器回引; 泛型查询便捷方法由
//! `ApplicationContextExt` 以一揽子实现补充, 负责把类型擦除句柄还原为
//! `Arc<T>`。

use container_common::{BeanHandle, CandidateType, ContextState};
use std::any::TypeId;
use std::sync::Arc;

/// 应用上下文: Bean 查询与生命周期状态的对象安全表面
///
/// 查询语义分两路:
/// - `bean_*` 按候选类型键查询注册表 (具体类型, 或作为候选扫描过的接口);
/// - `capability_*` 按 (能力, 绑定名) 别名绑定查询能力索引。两路相互独立,
///   未作为候选扫描的接口只能经由能力索引命中。
///
/// 所有查询都命中最近一次完成刷新的注册表快照; 刷新进行期间命中上一代。
pub trait ApplicationContext: Send + Sync {
    /// 按候选类型键查询首个实例句柄
    fn bean_handle(&self, key: TypeId) -> Option<BeanHandle>;

    /// 按候选类型键查询全部实例句柄 (注册顺序)
    fn bean_handles(&self, key: TypeId) -> Vec<BeanHandle>;

    /// 按能力查询首个别名绑定实例句柄
    fn capability_handle(&self, capability: TypeId) -> Option<BeanHandle>;

    /// 按能力查询全部别名绑定实例句柄 (候选登记顺序, 保留多路径条目)
    fn capability_handles(&self, capability: TypeId) -> Vec<BeanHandle>;

    /// 按 (能力, 绑定名) 查询唯一实例句柄
    fn capability_handle_named(&self, capability: TypeId, name: &str) -> Option<BeanHandle>;

    /// 当前生命周期状态
    fn state(&self) -> ContextState;

    /// 构造时固定下来的候选类型列表
    fn candidates(&self) -> &[CandidateType];

    /// 动态注册候选 (暂不支持)
    ///
    /// 候选列表在上下文构造时即固定; 本方法为空操作, 仅记录告警日志。
    fn register_bean(&self, candidate: CandidateType);
}

/// `ApplicationContext` 的泛型查询扩展
///
/// 查找类型 `T` 既可以是具体组件类型, 也可以是 `dyn 能力`; 句柄按
/// [`BeanHandle`](container_common::BeanHandle) 的载荷约定还原。
pub trait ApplicationContextExt {
    /// 查询 `T` 类型键下的首个 Bean; 无绑定时返回 `None` (正常结果, 非错误)
    fn get_bean<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>>;

    /// 查询 `T` 类型键下的全部 Bean (注册顺序, 可能为空)
    fn get_beans_of_type<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>>;

    /// 查询能力 `C` 的首个绑定实例
    fn get_capability<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>>;

    /// 查询能力 `C` 的全部绑定实例 (候选登记顺序)
    fn get_capabilities<C: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<C>>;

    /// 按绑定名查询能力 `C` 的唯一实例
    fn get_capability_named<C: ?Sized + Send + Sync + 'static>(&self, name: &str)
        -> Option<Arc<C>>;
}

impl<A: ApplicationContext + ?Sized> ApplicationContextExt for A {
    fn get_bean<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.bean_handle(TypeId::of::<T>())
            .and_then(|handle| unwrap_handle::<T>(&handle))
    }

    fn get_beans_of_type<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        self.bean_handles(TypeId::of::<T>())
            .iter()
            .filter_map(unwrap_handle::<T>)
            .collect()
    }

    fn get_capability<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.capability_handle(TypeId::of::<C>())
            .and_then(|handle| unwrap_handle::<C>(&handle))
    }

    fn get_capabilities<C: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<C>> {
        self.capability_handles(TypeId::of::<C>())
            .iter()
            .filter_map(unwrap_handle::<C>)
            .collect()
    }

    fn get_capability_named<C: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Option<Arc<C>> {
        self.capability_handle_named(TypeId::of::<C>(), name)
            .and_then(|handle| unwrap_handle::<C>(&handle))
    }
}

/// 按载荷约定把句柄还原为查找类型实例
fn unwrap_handle<T: ?Sized + Send + Sync + 'static>(handle: &BeanHandle) -> Option<Arc<T>> {
    handle.downcast_ref::<Arc<T>>().cloned()
}

/// 上下文感知回调能力
///
/// 把 `ContextAware` 像普通能力一样声明在候选上, 其实例在每次刷新被首次
/// 实例化后立即收到一次回调, 参数即执行本次刷新的上下文实例。回调采用
/// `&self` 接收者, Bean 侧以内部可变性保存引用。
pub trait ContextAware: Send + Sync {
    /// 注入拥有方上下文
    fn set_application_context(&self, context: Arc<dyn ApplicationContext>);
}
