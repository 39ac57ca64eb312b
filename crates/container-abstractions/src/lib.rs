//! # 容器抽象层
//!
//! 定义应用上下文的对象安全查询表面与各外部协作者接口:
//!
//! - `ApplicationContext` / `ApplicationContextExt`: Bean 查询表面
//! - `ContextAware`: 上下文感知回调能力
//! - `CandidateSource`: 候选类型来源 (固定列表 / 全局注册表扫描)
//! - `BeanNameStrategy`: 能力绑定的去歧义命名策略

pub mod context;
pub mod naming;
pub mod scanner;

pub use context::{ApplicationContext, ApplicationContextExt, ContextAware};
pub use naming::{BeanNameStrategy, DefaultBeanNameStrategy};
pub use scanner::{CandidateSource, FixedCandidateSource, RegistryCandidateSource};
