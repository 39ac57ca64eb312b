//! # Configuration Retrieval
//!
//! 部署流水线的配置获取层: 每轮部署从配置源一次性拉取完整配置文档,
//! 不做增量更新。
//!
//! ## 主要组件
//!
//! - [`ConfigDocument`] - 扁平键配置文档
//! - [`ConfigRetriever`] - 异步配置获取接口
//! - [`MemoryConfigRetriever`] - 内存配置源
//! - [`JsonFileConfigRetriever`] - JSON 文件配置源
//! - [`EnvConfigRetriever`] - 环境变量配置源
//! - [`CompositeConfigRetriever`] - 多源合并配置源

pub mod document;
pub mod retriever;
pub mod sources;

pub use document::*;
pub use retriever::*;
pub use sources::*;

pub use container_common::{ConfigError, ConfigResult};
