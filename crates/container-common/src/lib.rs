//! # 容器公共基础
//!
//! 应用上下文容器各层共享的基础设施:
//!
//! - 类型反射信息 (`TypeInfo`)
//! - 候选组件模型与能力声明 (`CandidateType` / `CapabilityDecl`)
//! - 类型擦除的实例句柄约定 (`BeanHandle`)
//! - 进程级全局候选注册表
//! - 统一错误类型与上下文生命周期状态

pub mod candidate;
pub mod errors;
pub mod metadata;
pub mod state;

pub use candidate::{
    clear_global_candidates, global_candidates, register_candidate, BeanConstructor, BeanHandle,
    CandidateBuilder, CandidateType, CapabilityCast, CapabilityDecl,
};
pub use errors::{
    ConfigError, ConfigResult, ContextError, ContextResult, DeployError, DeployResult,
};
pub use metadata::TypeInfo;
pub use state::ContextState;
