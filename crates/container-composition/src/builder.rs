//! 应用上下文构建器

use crate::context::AtriumApplicationContext;
use config_retrieval::{ConfigRetriever, MemoryConfigRetriever};
use container_abstractions::{
    BeanNameStrategy, CandidateSource, DefaultBeanNameStrategy, FixedCandidateSource,
    RegistryCandidateSource,
};
use container_common::{CandidateType, ContextResult};
use std::sync::Arc;
use tracing::info;

/// 应用上下文构建器
///
/// 四个协作者都有缺省实现: 全局注册表候选来源、短名小写命名策略、空内存
/// 配置源。构建即执行一次候选扫描, 之后候选列表不再变化; `build` 不做
/// 首次刷新, 由调用方在运行时内显式调用 `refresh`。
pub struct ApplicationContextBuilder {
    source: Box<dyn CandidateSource>,
    base_roots: Vec<String>,
    name_strategy: Arc<dyn BeanNameStrategy>,
    retriever: Arc<dyn ConfigRetriever>,
}

impl ApplicationContextBuilder {
    /// 创建使用缺省协作者的构建器
    pub fn new() -> Self {
        Self {
            source: Box::new(RegistryCandidateSource),
            base_roots: Vec::new(),
            name_strategy: Arc::new(DefaultBeanNameStrategy),
            retriever: Arc::new(MemoryConfigRetriever::empty()),
        }
    }

    /// 替换候选类型来源
    pub fn with_candidate_source<S: CandidateSource + 'static>(mut self, source: S) -> Self {
        self.source = Box::new(source);
        self
    }

    /// 以固定候选列表作为来源 (手工装配场景)
    pub fn with_candidates(self, candidates: Vec<CandidateType>) -> Self {
        self.with_candidate_source(FixedCandidateSource::new(candidates))
    }

    /// 追加一个基础扫描根 (模块路径前缀)
    pub fn add_base_root(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        info!("添加基础扫描根: {}", root);
        self.base_roots.push(root);
        self
    }

    /// 替换绑定命名策略
    pub fn with_name_strategy<N: BeanNameStrategy + 'static>(mut self, strategy: N) -> Self {
        self.name_strategy = Arc::new(strategy);
        self
    }

    /// 替换配置获取器
    pub fn with_config_retriever<R: ConfigRetriever + 'static>(mut self, retriever: R) -> Self {
        info!("使用配置获取器: {}", retriever.name());
        self.retriever = Arc::new(retriever);
        self
    }

    /// 扫描候选并构建上下文
    pub fn build(self) -> ContextResult<Arc<AtriumApplicationContext>> {
        info!("开始构建应用上下文");
        let candidates = self.source.scan(&self.base_roots)?;
        info!("候选扫描完成: {} 个候选类型", candidates.len());
        Ok(AtriumApplicationContext::from_parts(
            candidates,
            self.name_strategy,
            self.retriever,
        ))
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
