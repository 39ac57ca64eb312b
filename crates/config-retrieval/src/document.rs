//! 扁平键配置文档

use container_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 扁平键配置文档
///
/// 键为点分隔路径 (如 `server.port`), 值为 JSON 标量或数组。嵌套来源
/// (JSON 文件等) 在进入文档前展平, 查询方无需关心来源的层级结构。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    values: Map<String, Value>,
}

impl ConfigDocument {
    /// 创建空文档
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 值构建文档, 嵌套对象展平为点分隔键
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        match value {
            Value::Object(object) => {
                let mut values = Map::new();
                flatten_object(String::new(), &object, &mut values);
                Ok(Self { values })
            }
            other => Err(ConfigError::retrieval(format!(
                "配置文档根必须是 JSON 对象, 实际为: {other}"
            ))),
        }
    }

    /// 写入单个配置项 (链式构建)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 原始配置值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 整数配置值, 缺失或不可转换时返回默认值
    ///
    /// 数值取整数部分, 字符串尝试十进制解析。
    pub fn get_integer(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(number)) => number.as_i64().unwrap_or(default),
            Some(Value::String(text)) => text.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// 字符串配置值, 标量统一转为字符串
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// 布尔配置值, 缺失或不可转换时返回默认值
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// 配置键是否存在
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// 全部配置键
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空文档
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 合并另一文档, 同键条目以对方为准
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
    }

    /// 导出为扁平键 JSON 对象
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

fn flatten_object(prefix: String, object: &Map<String, Value>, target: &mut Map<String, Value>) {
    for (key, value) in object {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_object(full_key, nested, target),
            other => {
                target.insert(full_key, other.clone());
            }
        }
    }
}
