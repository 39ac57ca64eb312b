//! 候选类型发现
//!
//! 候选类型来源是外部协作者: 上下文构造时调用一次 `scan`, 得到固定的
//! 候选列表。提供两个内置实现 — 显式固定列表, 以及基于进程级全局注册表
//! (链接期 `ctor` 登记) 的模块根过滤扫描。

use container_common::{global_candidates, CandidateType, ContextResult};
use tracing::debug;

/// 候选类型来源
pub trait CandidateSource: Send + Sync {
    /// 依据基础扫描根收集候选类型
    ///
    /// 每个上下文构造时恰好调用一次; 返回顺序决定候选顺序。
    fn scan(&self, base_roots: &[String]) -> ContextResult<Vec<CandidateType>>;
}

/// 固定候选列表来源
///
/// 手工装配场景使用; 忽略扫描根参数, 原样返回构造时给定的列表。
#[derive(Debug, Default)]
pub struct FixedCandidateSource {
    candidates: Vec<CandidateType>,
}

impl FixedCandidateSource {
    /// 以给定候选列表创建来源
    pub fn new(candidates: Vec<CandidateType>) -> Self {
        Self { candidates }
    }
}

impl CandidateSource for FixedCandidateSource {
    fn scan(&self, _base_roots: &[String]) -> ContextResult<Vec<CandidateType>> {
        debug!("固定候选列表扫描: {} 个候选类型", self.candidates.len());
        Ok(self.candidates.clone())
    }
}

/// 全局注册表候选来源
///
/// 读取进程级全局候选注册表 (见
/// [`register_candidate`](container_common::register_candidate)), 按模块根
/// 前缀过滤 — 这是类路径包扫描在 Rust 下的对应物: 扫描根即模块路径前缀。
/// 扫描根为空时返回全部已登记候选。
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryCandidateSource;

impl CandidateSource for RegistryCandidateSource {
    fn scan(&self, base_roots: &[String]) -> ContextResult<Vec<CandidateType>> {
        let registered = global_candidates();
        let total = registered.len();
        let selected: Vec<CandidateType> = if base_roots.is_empty() {
            registered
        } else {
            registered
                .into_iter()
                .filter(|candidate| {
                    base_roots
                        .iter()
                        .any(|root| candidate.type_info().in_root(root))
                })
                .collect()
        };
        debug!(
            "全局注册表扫描完成: 命中 {} / {} 个候选类型",
            selected.len(),
            total
        );
        Ok(selected)
    }
}
