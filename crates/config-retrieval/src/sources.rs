//! 配置源实现

use crate::document::ConfigDocument;
use crate::retriever::ConfigRetriever;
use async_trait::async_trait;
use container_common::{ConfigError, ConfigResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 内存配置源
///
/// 持有固定的配置文档, 主要用于测试与程序内注入默认值。
#[derive(Debug, Clone)]
pub struct MemoryConfigRetriever {
    document: ConfigDocument,
    priority: i32,
}

impl MemoryConfigRetriever {
    /// 创建空配置源
    pub fn empty() -> Self {
        Self::new(ConfigDocument::new())
    }

    /// 从既有文档创建配置源
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document,
            priority: 0,
        }
    }

    /// 写入单个配置项 (链式构建)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.document = self.document.with_value(key, value);
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl ConfigRetriever for MemoryConfigRetriever {
    async fn retrieve(&self) -> ConfigResult<ConfigDocument> {
        Ok(self.document.clone())
    }

    fn name(&self) -> &str {
        "MemoryConfigRetriever"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// JSON 文件配置源
///
/// 每次获取都重新读取文件, 嵌套对象展平为点分隔键。
#[derive(Debug)]
pub struct JsonFileConfigRetriever {
    file_path: PathBuf,
    priority: i32,
}

impl JsonFileConfigRetriever {
    /// 创建新的 JSON 文件配置源
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            priority: 90, // JSON 文件中等优先级
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 配置文件路径
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl ConfigRetriever for JsonFileConfigRetriever {
    async fn retrieve(&self) -> ConfigResult<ConfigDocument> {
        debug!("加载 JSON 配置文件: {}", self.file_path.display());

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| ConfigError::file_read(self.file_path.display().to_string(), e))?;
        let value: Value = serde_json::from_str(&content).map_err(ConfigError::parse)?;
        let document = ConfigDocument::from_value(value)?;

        debug!("JSON 配置文件加载完成: {} 个配置项", document.len());
        Ok(document)
    }

    fn name(&self) -> &str {
        "JsonFileConfigRetriever"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 环境变量配置源
///
/// 采集带指定前缀的环境变量并转换为配置键: 去前缀、分隔符换点、转小写。
/// 值依次尝试布尔、整数、浮点解析, 全部失败时保留字符串。
#[derive(Debug)]
pub struct EnvConfigRetriever {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvConfigRetriever {
    /// 创建新的环境变量配置源
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "_".to_string(),
            priority: 200, // 环境变量最高优先级
        }
    }

    /// 设置分隔符
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 环境变量前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn env_key_to_config_key(&self, env_key: &str) -> String {
        let key = env_key
            .strip_prefix(&self.prefix)
            .unwrap_or(env_key)
            .trim_start_matches(&self.separator);
        key.replace(&self.separator, ".").to_lowercase()
    }

    fn coerce_value(raw: &str) -> Value {
        if let Ok(flag) = raw.parse::<bool>() {
            Value::Bool(flag)
        } else if let Ok(integer) = raw.parse::<i64>() {
            Value::Number(serde_json::Number::from(integer))
        } else if let Some(number) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            Value::Number(number)
        } else {
            Value::String(raw.to_string())
        }
    }
}

#[async_trait]
impl ConfigRetriever for EnvConfigRetriever {
    async fn retrieve(&self) -> ConfigResult<ConfigDocument> {
        debug!("加载环境变量, 前缀: {}", self.prefix);

        let mut document = ConfigDocument::new();
        for (key, value) in std::env::vars() {
            if key.starts_with(&self.prefix) {
                let config_key = self.env_key_to_config_key(&key);
                document = document.with_value(config_key, Self::coerce_value(&value));
            }
        }

        debug!("加载了 {} 个环境变量", document.len());
        Ok(document)
    }

    fn name(&self) -> &str {
        "EnvConfigRetriever"
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 多源合并配置源
///
/// 按优先级升序依次获取并合并各源文档, 高优先级源的同键条目覆盖低
/// 优先级源。任一源获取失败即整体失败。
#[derive(Default, Clone)]
pub struct CompositeConfigRetriever {
    sources: Vec<Arc<dyn ConfigRetriever>>,
}

impl CompositeConfigRetriever {
    /// 创建空的合并配置源
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个配置源 (链式构建)
    pub fn with_source(mut self, source: Arc<dyn ConfigRetriever>) -> Self {
        self.sources.push(source);
        self
    }

    /// 配置源数量
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl std::fmt::Debug for CompositeConfigRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("CompositeConfigRetriever")
            .field("sources", &names)
            .finish()
    }
}

#[async_trait]
impl ConfigRetriever for CompositeConfigRetriever {
    async fn retrieve(&self) -> ConfigResult<ConfigDocument> {
        let mut ordered: Vec<&Arc<dyn ConfigRetriever>> = self.sources.iter().collect();
        ordered.sort_by_key(|source| source.priority());

        let mut merged = ConfigDocument::new();
        for source in ordered {
            let document = source.retrieve().await?;
            debug!(
                "合并配置源: {} (优先级 {}, {} 个配置项)",
                source.name(),
                source.priority(),
                document.len()
            );
            merged.merge(document);
        }
        Ok(merged)
    }

    fn name(&self) -> &str {
        "CompositeConfigRetriever"
    }
}
