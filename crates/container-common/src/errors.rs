//! 统一错误类型
//!
//! 容器各层的错误集中在此定义: 注入图构建与候选扫描 (`ContextError`)、
//! 配置获取 (`ConfigError`)、服务端部署 (`DeployError`)。
//! 图构建错误在 `refresh()` 调用栈内同步传播; 配置与部署错误只经由
//! 部署流水线自身的失败通道与日志上报, 不会抛回 `refresh()`。

use thiserror::Error;

/// 上下文与注入图错误
#[derive(Error, Debug)]
pub enum ContextError {
    /// 同一具体类型被重复登记为候选
    #[error("候选类型重复注册: {type_name}")]
    DuplicateType {
        /// 冲突的候选类型名
        type_name: String,
    },

    /// 同一 (能力, 绑定名) 键被多条声明占用
    #[error("绑定键冲突: ({capability}, {name})")]
    DuplicateBinding {
        /// 能力类型名
        capability: String,
        /// 去歧义绑定名
        name: String,
    },

    /// 候选类型扫描失败
    #[error("候选类型扫描失败: {message}")]
    ScanFailed {
        /// 失败原因
        message: String,
    },
}

impl ContextError {
    /// 创建候选类型重复错误
    pub fn duplicate_type(type_name: impl Into<String>) -> Self {
        Self::DuplicateType {
            type_name: type_name.into(),
        }
    }

    /// 创建绑定键冲突错误
    pub fn duplicate_binding(capability: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateBinding {
            capability: capability.into(),
            name: name.into(),
        }
    }

    /// 创建候选扫描失败错误
    pub fn scan_failed(message: impl Into<String>) -> Self {
        Self::ScanFailed {
            message: message.into(),
        }
    }
}

/// 上下文操作结果
pub type ContextResult<T> = Result<T, ContextError>;

/// 配置获取错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置源上报的获取失败
    #[error("配置获取失败: {message}")]
    Retrieval {
        /// 失败原因
        message: String,
    },

    /// 配置文件读取失败
    #[error("配置文件读取失败 ({path}): {source}")]
    FileRead {
        /// 文件路径
        path: String,
        /// 底层 IO 错误
        source: std::io::Error,
    },

    /// 配置内容解析失败
    #[error("配置解析失败: {source}")]
    Parse {
        /// 底层解析错误
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ConfigError {
    /// 创建配置获取失败错误
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    /// 创建配置文件读取错误
    pub fn file_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// 创建配置解析错误
    pub fn parse(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Parse {
            source: Box::new(source),
        }
    }
}

/// 配置操作结果
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 服务端部署错误
#[derive(Error, Debug)]
pub enum DeployError {
    /// 注册表中缺少路由工厂能力
    #[error("{message}")]
    MissingCapability {
        /// 缺失说明 (对外保持原样上报)
        message: String,
    },

    /// 配置的监听端口超出合法范围
    #[error("无效监听端口: {value}")]
    InvalidPort {
        /// 配置中的原始端口值
        value: i64,
    },

    /// 监听 socket 绑定失败
    #[error("端口绑定失败 (端口 {port}): {source}")]
    Bind {
        /// 请求绑定的端口
        port: u16,
        /// 底层 IO 错误
        source: std::io::Error,
    },
}

impl DeployError {
    /// 创建能力缺失错误
    pub fn missing_capability(message: impl Into<String>) -> Self {
        Self::MissingCapability {
            message: message.into(),
        }
    }

    /// 创建无效端口错误
    pub fn invalid_port(value: i64) -> Self {
        Self::InvalidPort { value }
    }

    /// 创建端口绑定失败错误
    pub fn bind(port: u16, source: std::io::Error) -> Self {
        Self::Bind { port, source }
    }
}

/// 部署操作结果
pub type DeployResult<T> = Result<T, DeployError>;
