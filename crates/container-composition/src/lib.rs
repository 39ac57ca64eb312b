//! # Container Composition
//!
//! 组合根: 把候选来源、命名策略、配置获取与服务端部署装配成可刷新的
//! 应用上下文。
//!
//! ## 主要组件
//!
//! - [`AtriumApplicationContext`] - 应用上下文实现
//! - [`ApplicationContextBuilder`] - 上下文构建器
//! - [`LoggingConfig`] - 日志初始化配置

pub mod builder;
pub mod context;
pub mod logging;

pub use builder::*;
pub use context::*;
pub use logging::*;
