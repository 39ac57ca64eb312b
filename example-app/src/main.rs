//! # 示例应用程序
//!
//! 演示 Atrium 容器的完整流程: 链接期候选登记、上下文构建与刷新、
//! 配置获取、按能力部署 HTTP 服务端。

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use config_retrieval::{
    CompositeConfigRetriever, EnvConfigRetriever, JsonFileConfigRetriever, MemoryConfigRetriever,
};
use container_abstractions::{ApplicationContext, ApplicationContextExt, ContextAware};
use container_common::{register_candidate, CandidateType};
use container_composition::{ApplicationContextBuilder, LoggingConfig};
use server_deploy::{DeploymentState, RouterFactory, SERVER_PORT_KEY};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Atrium 容器示例应用")]
struct Args {
    /// 监听端口 (可被配置文件与环境变量覆盖)
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// JSON 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    LoggingConfig {
        level: parse_log_level(&args.log_level),
        ..LoggingConfig::default()
    }
    .init()?;

    info!("启动 Atrium 示例应用");

    let context = ApplicationContextBuilder::new()
        .add_base_root("example_app")
        .with_config_retriever(build_retriever(&args))
        .build()?;

    let mut deployments = context.subscribe_deployments();
    context.refresh()?;

    let settled = deployments
        .wait_for(DeploymentState::is_settled)
        .await?
        .clone();
    match settled {
        DeploymentState::Deployed(report) => {
            info!(
                "示例应用就绪: http://{} (部署 ID {})",
                report.local_addr, report.deployment_id
            );
            info!("试试: curl http://{}/greet/world", report.local_addr);
        }
        state => anyhow::bail!("部署未成功: {:?}", state),
    }

    tokio::signal::ctrl_c().await?;
    info!("收到退出信号, 正在关闭应用");
    Ok(())
}

/// 组装配置获取器: 命令行默认值 < JSON 配置文件 < 环境变量
fn build_retriever(args: &Args) -> CompositeConfigRetriever {
    let defaults =
        MemoryConfigRetriever::empty().with_value(SERVER_PORT_KEY, i64::from(args.port));
    let mut retriever = CompositeConfigRetriever::new().with_source(Arc::new(defaults));

    if let Some(path) = &args.config {
        info!("添加 JSON 配置文件: {}", path.display());
        retriever = retriever.with_source(Arc::new(JsonFileConfigRetriever::new(path)));
    }

    retriever.with_source(Arc::new(EnvConfigRetriever::new("ATRIUM")))
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

// 示例组件

/// 问候服务
pub struct GreetingService {
    greeting: String,
}

impl GreetingService {
    /// 创建使用默认问候语的服务
    pub fn new() -> Self {
        Self {
            greeting: "Hello".to_string(),
        }
    }

    /// 生成问候语
    pub fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.greeting, name)
    }
}

impl Default for GreetingService {
    fn default() -> Self {
        Self::new()
    }
}

/// API 路由工厂
///
/// 以能力绑定的身份被部署器发现, 组装路由时从上下文解析问候服务。
#[derive(Default)]
pub struct ApiRouterFactory;

impl RouterFactory for ApiRouterFactory {
    fn create(&self, context: Arc<dyn ApplicationContext>) -> Router {
        let greeter = context
            .get_bean::<GreetingService>()
            .unwrap_or_else(|| Arc::new(GreetingService::new()));
        let status_context = Arc::clone(&context);

        Router::new()
            .route(
                "/greet/:name",
                get(move |Path(name): Path<String>| {
                    let greeter = Arc::clone(&greeter);
                    async move { greeter.greet(&name) }
                }),
            )
            .route(
                "/status",
                get(move || {
                    let context = Arc::clone(&status_context);
                    async move {
                        Json(serde_json::json!({
                            "state": context.state().to_string(),
                            "candidates": context.candidates().len(),
                        }))
                    }
                }),
            )
    }
}

/// 启动横幅
///
/// 纯上下文感知组件: 刷新实例化后收到上下文回引并打印容器概况。
#[derive(Default)]
pub struct StartupBanner;

impl ContextAware for StartupBanner {
    fn set_application_context(&self, context: Arc<dyn ApplicationContext>) {
        info!(
            "上下文注入完成: {} 个候选类型, 状态 {}",
            context.candidates().len(),
            context.state()
        );
    }
}

#[ctor::ctor]
fn register_components() {
    register_candidate(CandidateType::component(GreetingService::new).build());
    register_candidate(
        CandidateType::component(ApiRouterFactory::default)
            .implements(|factory: Arc<ApiRouterFactory>| factory as Arc<dyn RouterFactory>)
            .build(),
    );
    register_candidate(
        CandidateType::component(StartupBanner::default)
            .implements(|banner: Arc<StartupBanner>| banner as Arc<dyn ContextAware>)
            .build(),
    );
}
