//! 服务端部署任务

use crate::factory::RouterFactory;
use chrono::{DateTime, Utc};
use config_retrieval::ConfigDocument;
use container_abstractions::{ApplicationContext, ApplicationContextExt};
use container_common::{DeployError, DeployResult};
use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

/// 监听端口配置键
pub const SERVER_PORT_KEY: &str = "server.port";

/// 配置缺省时的监听端口
pub const DEFAULT_SERVER_PORT: i64 = 8080;

/// 单次部署任务的结果
pub type DeploymentResult = DeployResult<DeploymentReport>;

/// 部署成功回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
    /// 本次部署的唯一标识
    pub deployment_id: Uuid,
    /// 配置解析出的监听端口 (0 表示由系统分配)
    pub configured_port: u16,
    /// 实际监听地址
    pub local_addr: SocketAddr,
    /// 部署完成时刻
    pub deployed_at: DateTime<Utc>,
}

/// 部署流水线状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeploymentState {
    /// 尚未触发过部署
    #[default]
    Idle,
    /// 刷新已触发部署, 流水线进行中
    Pending,
    /// 部署成功, 服务端已监听
    Deployed(DeploymentReport),
    /// 部署失败, 本轮流水线已放弃
    Failed(String),
}

impl DeploymentState {
    /// 流水线是否已出结果 (成功或失败)
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Deployed(_) | Self::Failed(_))
    }
}

/// 无状态服务端部署任务
///
/// 每轮部署接收上下文与完整配置文档, 不在两轮之间保留任何状态。
/// 监听 socket 的生命周期交给后台 serve 任务, 部署器返回后即与其无关。
#[derive(Debug, Default, Clone, Copy)]
pub struct ServerDeployer;

impl ServerDeployer {
    /// 创建部署任务
    pub fn new() -> Self {
        Self
    }

    /// 执行一轮部署
    ///
    /// 依次: 按能力查找路由工厂、组装路由、解析监听端口、绑定 socket、
    /// 把 serve 循环派发到后台任务。任一步失败立即返回错误, 已进行的
    /// 步骤不回滚 (没有需要回滚的资源)。
    pub async fn deploy(
        &self,
        context: Arc<dyn ApplicationContext>,
        config: &ConfigDocument,
    ) -> DeploymentResult {
        let factory = context
            .get_capability::<dyn RouterFactory>()
            .ok_or_else(|| DeployError::missing_capability("RouterFactory must be provided."))?;

        let router = factory.create(Arc::clone(&context));

        let configured = config.get_integer(SERVER_PORT_KEY, DEFAULT_SERVER_PORT);
        let port =
            u16::try_from(configured).map_err(|_| DeployError::invalid_port(configured))?;

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DeployError::bind(port, e))?;
        let local_addr = listener.local_addr().map_err(|e| DeployError::bind(port, e))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("服务端 serve 循环中止: {}", e);
            }
        });

        let report = DeploymentReport {
            deployment_id: Uuid::new_v4(),
            configured_port: port,
            local_addr,
            deployed_at: Utc::now(),
        };
        info!(
            "服务端部署完成: {} (部署 ID {})",
            report.local_addr, report.deployment_id
        );
        Ok(report)
    }
}
