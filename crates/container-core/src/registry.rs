//! Bean 注册表
//!
//! `configure_beans` 把注入图物化为新一代不可变注册表快照。快照含两路
//! 视图: 候选类型键视图 (逐候选收集其声明类型下的全部绑定实例) 与能力
//! 索引 (全部别名绑定的 (绑定名, 实例) 条目)。两路经由共享单例格取得
//! 同一实例; 单例首次实例化时触发上下文感知回调, 每实例每刷新恰好一次。

use crate::graph::{Binding, InjectionGraph};
use container_abstractions::ApplicationContext;
use container_common::{BeanHandle, CandidateType};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 单次刷新产出的不可变 Bean 注册表快照
///
/// 每次刷新整体替换而非就地修改: 读取方要么看到完整的旧一代, 要么看到
/// 完整的新一代, 绝不会看到半成品。
#[derive(Default)]
pub struct BeanRegistry {
    beans: HashMap<TypeId, Vec<BeanHandle>>,
    capabilities: HashMap<TypeId, Vec<(String, BeanHandle)>>,
}

impl BeanRegistry {
    /// 空注册表 (首次刷新前的初始快照)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 候选类型键下的首个实例
    pub fn bean(&self, key: TypeId) -> Option<BeanHandle> {
        self.beans
            .get(&key)
            .and_then(|handles| handles.first())
            .cloned()
    }

    /// 候选类型键下的全部实例 (注册顺序)
    pub fn beans(&self, key: TypeId) -> Vec<BeanHandle> {
        self.beans.get(&key).cloned().unwrap_or_default()
    }

    /// 能力下的首个别名绑定实例
    pub fn capability(&self, capability: TypeId) -> Option<BeanHandle> {
        self.capabilities
            .get(&capability)
            .and_then(|entries| entries.first())
            .map(|(_, handle)| handle.clone())
    }

    /// 能力下的全部别名绑定实例 (登记顺序, 保留多路径条目)
    pub fn capabilities(&self, capability: TypeId) -> Vec<BeanHandle> {
        self.capabilities
            .get(&capability)
            .map(|entries| entries.iter().map(|(_, handle)| handle.clone()).collect())
            .unwrap_or_default()
    }

    /// 按 (能力, 绑定名) 查询唯一实例
    pub fn capability_named(&self, capability: TypeId, name: &str) -> Option<BeanHandle> {
        self.capabilities
            .get(&capability)
            .and_then(|entries| entries.iter().find(|(entry_name, _)| entry_name == name))
            .map(|(_, handle)| handle.clone())
    }

    /// 候选类型键数量
    pub fn type_count(&self) -> usize {
        self.beans.len()
    }

    /// 候选类型键视图中的实例条目总数
    pub fn instance_count(&self) -> usize {
        self.beans.values().map(Vec::len).sum()
    }

    /// 是否为空快照
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty() && self.capabilities.is_empty()
    }
}

impl fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanRegistry")
            .field("types", &self.type_count())
            .field("instances", &self.instance_count())
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}

/// 物化注入图, 构建新一代注册表
///
/// 候选在图中无绑定时不贡献条目 (不是错误)。载荷物化失败 (句柄与声明
/// 类型不符) 仅告警并跳过该条绑定, 不中断构建。
pub fn configure_beans(
    graph: &InjectionGraph,
    candidates: &[CandidateType],
    context: &Arc<dyn ApplicationContext>,
) -> BeanRegistry {
    let mut registry = BeanRegistry::empty();

    // 候选类型键视图: 逐候选收集其声明类型下的全部绑定
    for candidate in candidates {
        let key = candidate.type_info().id();
        let bindings = graph.bindings_declared_as(key);
        if bindings.is_empty() {
            debug!("候选在图中无绑定, 跳过: {}", candidate.type_info().name());
            continue;
        }
        for binding in bindings {
            let Some(payload) = materialize(binding, context) else {
                continue;
            };
            registry.beans.entry(key).or_default().push(payload);
        }
    }

    // 能力索引: 全部别名绑定的 (绑定名, 实例) 条目
    for capability in graph.capability_ids() {
        for binding in graph.alias_bindings_of(capability) {
            let Some(name) = binding.key().name() else {
                continue;
            };
            let Some(payload) = materialize(binding, context) else {
                continue;
            };
            registry
                .capabilities
                .entry(capability)
                .or_default()
                .push((name.to_string(), payload));
        }
    }

    debug!(
        "注册表构建完成: {} 个类型键, {} 条实例",
        registry.type_count(),
        registry.instance_count()
    );
    registry
}

fn materialize(binding: &Binding, context: &Arc<dyn ApplicationContext>) -> Option<BeanHandle> {
    let (raw, created) = binding.instantiate();
    if created {
        if let Some(aware) = binding.aware_instance(&raw) {
            debug!("注入上下文回引: {}", binding.declared().name());
            aware.set_application_context(Arc::clone(context));
        }
    }
    let payload = binding.payload(&raw);
    if payload.is_none() {
        warn!("绑定载荷物化失败: {:?}", binding.key());
    }
    payload
}
