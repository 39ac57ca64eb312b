//! 部署流水线的集中集成测试

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use config_retrieval::{ConfigDocument, ConfigRetriever, MemoryConfigRetriever};
use container_abstractions::ApplicationContext;
use container_common::{CandidateType, ConfigError, ConfigResult};
use container_composition::{ApplicationContextBuilder, AtriumApplicationContext};
use server_deploy::{DeploymentState, RouterFactory, SERVER_PORT_KEY};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 固定应答的路由工厂
struct PingRouterFactory;

impl RouterFactory for PingRouterFactory {
    fn create(&self, _context: Arc<dyn ApplicationContext>) -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }
}

/// 始终失败的配置获取器
struct BrokenRetriever;

#[async_trait]
impl ConfigRetriever for BrokenRetriever {
    async fn retrieve(&self) -> ConfigResult<ConfigDocument> {
        Err(ConfigError::retrieval("配置中心不可达"))
    }

    fn name(&self) -> &str {
        "BrokenRetriever"
    }
}

fn factory_candidate() -> CandidateType {
    CandidateType::component(|| PingRouterFactory)
        .implements(|factory: Arc<PingRouterFactory>| factory as Arc<dyn RouterFactory>)
        .build()
}

fn context_with_port(port: i64) -> Arc<AtriumApplicationContext> {
    ApplicationContextBuilder::new()
        .with_candidates(vec![factory_candidate()])
        .with_config_retriever(MemoryConfigRetriever::empty().with_value(SERVER_PORT_KEY, port))
        .build()
        .unwrap()
}

async fn refresh_and_settle(context: &Arc<AtriumApplicationContext>) -> DeploymentState {
    let mut deployments = context.subscribe_deployments();
    context.refresh().unwrap();
    let settled = deployments
        .wait_for(DeploymentState::is_settled)
        .await
        .unwrap()
        .clone();
    settled
}

#[tokio::test]
async fn test_deployment_publishes_report_over_watch() {
    let context = context_with_port(0);

    let settled = refresh_and_settle(&context).await;

    match settled {
        DeploymentState::Deployed(report) => {
            assert_eq!(report.configured_port, 0);
            assert_ne!(report.local_addr.port(), 0);
            // 通道当前值与快照查询一致
            assert_eq!(
                context.deployment_state(),
                DeploymentState::Deployed(report)
            );
        }
        other => panic!("期望部署成功, 实际: {other:?}"),
    }
}

#[tokio::test]
async fn test_deployed_server_handles_requests() {
    let context = context_with_port(0);

    let settled = refresh_and_settle(&context).await;
    let DeploymentState::Deployed(report) = settled else {
        panic!("期望部署成功, 实际: {settled:?}");
    };

    let mut stream = TcpStream::connect(report.local_addr).await.unwrap();
    stream
        .write_all(b"GET /ping HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("pong"));
}

#[tokio::test]
async fn test_requested_port_is_honored() {
    // 先探测一个空闲端口再释放, 随后要求部署绑定它
    let probe = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let context = context_with_port(i64::from(port));
    let settled = refresh_and_settle(&context).await;

    let DeploymentState::Deployed(report) = settled else {
        panic!("期望部署成功, 实际: {settled:?}");
    };
    assert_eq!(report.configured_port, port);
    assert_eq!(report.local_addr.port(), port);
}

#[tokio::test]
async fn test_missing_router_factory_fails_pipeline() {
    let context = ApplicationContextBuilder::new()
        .with_candidates(Vec::new())
        .build()
        .unwrap();

    let settled = refresh_and_settle(&context).await;

    // 刷新本身成功, 失败只出现在部署通道上
    let DeploymentState::Failed(reason) = settled else {
        panic!("期望部署失败, 实际: {settled:?}");
    };
    assert_eq!(reason, "RouterFactory must be provided.");
}

#[tokio::test]
async fn test_config_failure_abandons_the_cycle() {
    let context = ApplicationContextBuilder::new()
        .with_candidates(vec![factory_candidate()])
        .with_config_retriever(BrokenRetriever)
        .build()
        .unwrap();

    let settled = refresh_and_settle(&context).await;

    let DeploymentState::Failed(reason) = settled else {
        panic!("期望部署失败, 实际: {settled:?}");
    };
    assert!(reason.contains("配置中心不可达"));
}

#[tokio::test]
async fn test_bind_conflict_reports_failure() {
    let blocker = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await.unwrap();
    let taken = blocker.local_addr().unwrap().port();

    let context = context_with_port(i64::from(taken));
    let settled = refresh_and_settle(&context).await;

    let DeploymentState::Failed(reason) = settled else {
        panic!("期望部署失败, 实际: {settled:?}");
    };
    assert!(reason.contains("端口绑定失败"));
    drop(blocker);
}

#[tokio::test]
async fn test_each_refresh_deploys_anew() {
    let context = context_with_port(0);

    let first = refresh_and_settle(&context).await;
    let DeploymentState::Deployed(first_report) = first else {
        panic!("期望部署成功, 实际: {first:?}");
    };

    let second = refresh_and_settle(&context).await;
    let DeploymentState::Deployed(second_report) = second else {
        panic!("期望部署成功, 实际: {second:?}");
    };

    // 每轮刷新都是独立部署
    assert_ne!(first_report.deployment_id, second_report.deployment_id);
    assert_ne!(first_report.local_addr, second_report.local_addr);
}
