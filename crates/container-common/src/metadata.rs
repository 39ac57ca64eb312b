//! 类型反射信息

use std::any::TypeId;

/// 类型反射信息
///
/// 对任意 `'static` 类型 (含 `dyn Trait`) 记录 `TypeId` 与编译期类型名,
/// 支撑候选类型键查找、默认绑定命名与模块根过滤。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeInfo {
    /// 采集类型 `T` 的反射信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 类型标识
    pub fn id(&self) -> TypeId {
        self.type_id
    }

    /// 完整类型名 (含模块路径)
    pub fn name(&self) -> &'static str {
        self.type_name
    }

    /// 类型短名 (去掉模块路径与 `dyn ` 前缀)
    pub fn short_name(&self) -> &'static str {
        let stripped = self.stripped_name();
        stripped.rsplit("::").next().unwrap_or(stripped)
    }

    /// 模块路径部分 (无模块路径时为空串)
    pub fn module_path(&self) -> &'static str {
        let stripped = self.stripped_name();
        match stripped.rfind("::") {
            Some(index) => &stripped[..index],
            None => "",
        }
    }

    /// 判断类型是否位于给定模块根之下 (按路径段对齐匹配)
    pub fn in_root(&self, root: &str) -> bool {
        let stripped = self.stripped_name();
        stripped == root
            || (stripped.starts_with(root) && stripped[root.len()..].starts_with("::"))
    }

    fn stripped_name(&self) -> &'static str {
        self.type_name.strip_prefix("dyn ").unwrap_or(self.type_name)
    }
}
