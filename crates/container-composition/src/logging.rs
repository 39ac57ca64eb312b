//! 日志初始化

use tracing::info;

/// 日志初始化配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 是否显示线程 ID
    pub show_thread_ids: bool,
    /// 是否显示文件名与行号
    pub show_location: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_location: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_location: true,
            json_format: false,
        }
    }

    /// 生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_location: false,
            json_format: true,
        }
    }

    /// 初始化全局日志订阅者
    ///
    /// 进程内只能初始化一次, 重复调用返回错误; 测试环境请勿调用。
    pub fn init(&self) -> anyhow::Result<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_location)
            .with_line_number(self.show_location);

        let installed = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        installed.map_err(|e| anyhow::anyhow!("日志初始化失败: {}", e))?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
