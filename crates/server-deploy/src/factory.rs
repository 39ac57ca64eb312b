//! 路由工厂能力

use axum::Router;
use container_abstractions::ApplicationContext;
use std::sync::Arc;

/// 路由工厂 trait
///
/// 部署器按该能力在注册表中查找路由提供方。工厂拿到上下文回引, 组装
/// 路由时可以解析任意已注册 Bean; 工厂本身不持有监听资源。
pub trait RouterFactory: Send + Sync {
    /// 组装服务端路由
    fn create(&self, context: Arc<dyn ApplicationContext>) -> Router;
}
