//! # Server Deployment
//!
//! 部署流水线终点: 从上下文按能力取路由工厂, 组装路由并绑定监听端口。
//! 部署结果经回执与状态枚举上报, 绑定失败不会使上下文刷新失败。
//!
//! ## 主要组件
//!
//! - [`RouterFactory`] - 路由工厂能力
//! - [`ServerDeployer`] - 无状态部署任务
//! - [`DeploymentReport`] - 部署成功回执
//! - [`DeploymentState`] - 部署状态

pub mod deployer;
pub mod factory;

pub use deployer::*;
pub use factory::*;

pub use container_common::{DeployError, DeployResult};
