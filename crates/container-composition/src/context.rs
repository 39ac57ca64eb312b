//! 应用上下文实现

use config_retrieval::ConfigRetriever;
use container_abstractions::{ApplicationContext, BeanNameStrategy};
use container_common::{BeanHandle, CandidateType, ContextResult, ContextState};
use container_core::{configure_beans, BeanRegistry, InjectionGraph};
use parking_lot::RwLock;
use server_deploy::{DeploymentState, ServerDeployer};
use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 可刷新的应用上下文
///
/// 候选列表在构造时固定; `refresh` 每次从头构建注入图与注册表快照并
/// 整体替换, 旧快照随最后一个读取方释放。刷新成功后异步触发部署流水线,
/// 流水线结果经 watch 通道对外发布, 不影响刷新本身的返回值。
///
/// 上下文必须经 `Arc` 持有: 刷新期间需要把自身回引交给新实例化的 Bean,
/// 部署流水线也以 `Arc` 克隆在后台任务中携带上下文。
pub struct AtriumApplicationContext {
    candidates: Vec<CandidateType>,
    name_strategy: Arc<dyn BeanNameStrategy>,
    retriever: Arc<dyn ConfigRetriever>,
    deployer: ServerDeployer,
    registry: RwLock<Arc<BeanRegistry>>,
    state: RwLock<ContextState>,
    refresh_count: AtomicU64,
    deploy_tx: watch::Sender<DeploymentState>,
}

impl AtriumApplicationContext {
    pub(crate) fn from_parts(
        candidates: Vec<CandidateType>,
        name_strategy: Arc<dyn BeanNameStrategy>,
        retriever: Arc<dyn ConfigRetriever>,
    ) -> Arc<Self> {
        let (deploy_tx, _deploy_rx) = watch::channel(DeploymentState::Idle);
        Arc::new(Self {
            candidates,
            name_strategy,
            retriever,
            deployer: ServerDeployer::new(),
            registry: RwLock::new(Arc::new(BeanRegistry::empty())),
            state: RwLock::new(ContextState::Uninitialized),
            refresh_count: AtomicU64::new(0),
            deploy_tx,
        })
    }

    /// 重建注入图与注册表, 并触发新一轮部署
    ///
    /// 同步完成图构建与注册表替换; 图构建失败时返回错误并回退到刷新前
    /// 状态, 当前注册表保持不变。成功路径把部署流水线派发到后台任务,
    /// 因此必须在 Tokio 运行时内调用。并发调用本方法需由调用方串行化,
    /// 上下文不为重叠刷新提供互斥。
    pub fn refresh(self: &Arc<Self>) -> ContextResult<()> {
        let previous = {
            let mut state = self.state.write();
            let entered = *state;
            *state = ContextState::Refreshing;
            entered
        };
        info!("开始上下文刷新: {} 个候选类型", self.candidates.len());

        let graph = match InjectionGraph::build(&self.candidates, self.name_strategy.as_ref()) {
            Ok(graph) => graph,
            Err(e) => {
                error!("注入图构建失败: {}", e);
                *self.state.write() = previous;
                return Err(e);
            }
        };

        let shared: Arc<dyn ApplicationContext> = self.clone();
        let registry = configure_beans(&graph, &self.candidates, &shared);
        *self.registry.write() = Arc::new(registry);
        *self.state.write() = ContextState::Ready;

        let round = self.refresh_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!("上下文刷新完成 (第 {} 轮): {} 条绑定", round, graph.len());

        self.trigger_deployment();
        Ok(())
    }

    /// 订阅部署流水线状态
    ///
    /// 新订阅者立即观察到当前状态; 用 `wait_for` 等待
    /// [`DeploymentState::is_settled`] 可同步等到本轮流水线出结果。
    pub fn subscribe_deployments(&self) -> watch::Receiver<DeploymentState> {
        self.deploy_tx.subscribe()
    }

    /// 当前部署流水线状态
    pub fn deployment_state(&self) -> DeploymentState {
        self.deploy_tx.borrow().clone()
    }

    /// 已完成的刷新轮数
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    fn trigger_deployment(self: &Arc<Self>) {
        self.deploy_tx.send_replace(DeploymentState::Pending);
        let context = Arc::clone(self);
        tokio::spawn(async move {
            context.run_deployment().await;
        });
    }

    async fn run_deployment(self: Arc<Self>) {
        let document = match self.retriever.retrieve().await {
            Ok(document) => document,
            Err(e) => {
                // 单次获取语义: 失败即放弃本轮, 不重试
                error!("配置获取失败, 放弃本轮部署: {}", e);
                self.deploy_tx
                    .send_replace(DeploymentState::Failed(e.to_string()));
                return;
            }
        };

        let shared: Arc<dyn ApplicationContext> = self.clone();
        match self.deployer.deploy(shared, &document).await {
            Ok(report) => {
                self.deploy_tx
                    .send_replace(DeploymentState::Deployed(report));
            }
            Err(e) => {
                error!("服务端部署失败: {}", e);
                self.deploy_tx
                    .send_replace(DeploymentState::Failed(e.to_string()));
            }
        }
    }

    fn snapshot(&self) -> Arc<BeanRegistry> {
        Arc::clone(&self.registry.read())
    }
}

impl ApplicationContext for AtriumApplicationContext {
    fn bean_handle(&self, key: TypeId) -> Option<BeanHandle> {
        self.snapshot().bean(key)
    }

    fn bean_handles(&self, key: TypeId) -> Vec<BeanHandle> {
        self.snapshot().beans(key)
    }

    fn capability_handle(&self, capability: TypeId) -> Option<BeanHandle> {
        self.snapshot().capability(capability)
    }

    fn capability_handles(&self, capability: TypeId) -> Vec<BeanHandle> {
        self.snapshot().capabilities(capability)
    }

    fn capability_handle_named(&self, capability: TypeId, name: &str) -> Option<BeanHandle> {
        self.snapshot().capability_named(capability, name)
    }

    fn state(&self) -> ContextState {
        *self.state.read()
    }

    fn candidates(&self) -> &[CandidateType] {
        &self.candidates
    }

    fn register_bean(&self, candidate: CandidateType) {
        warn!(
            "运行期候选注册暂不支持, 忽略: {}",
            candidate.type_info().name()
        );
    }
}

impl fmt::Debug for AtriumApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtriumApplicationContext")
            .field("state", &self.state())
            .field("candidates", &self.candidates.len())
            .field("refresh_count", &self.refresh_count())
            .finish()
    }
}
