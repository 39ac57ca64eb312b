//! # 容器核心实现
//!
//! 应用上下文刷新算法的两个同步阶段:
//!
//! - `InjectionGraph`: 把候选列表展开为单例提供者与 (类型 / 能力别名)
//!   绑定集合;
//! - `BeanRegistry` 与 `configure_beans`: 物化注入图, 产出不可变的
//!   新一代注册表快照, 供上下文整体替换。

pub mod graph;
pub mod registry;

pub use graph::{Binding, BindingKey, InjectionGraph};
pub use registry::{configure_beans, BeanRegistry};
