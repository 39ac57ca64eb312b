//! 上下文生命周期状态

use std::fmt;

/// 应用上下文生命周期状态机
///
/// `Uninitialized → Refreshing → Ready`, 之后每次刷新回到 `Refreshing`。
/// 处于 `Refreshing` 期间, Bean 查询仍然命中上一代 `Ready` 快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// 尚未执行首次刷新, 注册表为空
    Uninitialized,
    /// 刷新进行中
    Refreshing,
    /// 最新一代注册表快照可用
    Ready,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Refreshing => "refreshing",
            Self::Ready => "ready",
        };
        f.write_str(label)
    }
}
