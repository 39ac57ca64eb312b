//! 配置获取抽象接口

use crate::document::ConfigDocument;
use async_trait::async_trait;
use container_common::ConfigResult;

/// 配置获取 trait
///
/// 每次调用返回完整配置文档。获取失败由调用方决定如何处理, 接口本身
/// 不做重试。
#[async_trait]
pub trait ConfigRetriever: Send + Sync {
    /// 获取完整配置文档
    async fn retrieve(&self) -> ConfigResult<ConfigDocument>;

    /// 获取器名称
    fn name(&self) -> &str;

    /// 获取器优先级, 多源合并时高优先级覆盖低优先级
    fn priority(&self) -> i32 {
        0
    }
}
