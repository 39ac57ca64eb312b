//! Bean 绑定命名策略

use container_common::CandidateType;

/// 能力绑定的去歧义命名策略
///
/// 同一能力存在多个实现时, 每个实现的别名绑定以策略生成的名称区分。
/// 实现必须是确定性的: 同一候选在同一策略下恒产生同一名称。
pub trait BeanNameStrategy: Send + Sync {
    /// 为候选类型生成绑定名
    fn generate(&self, candidate: &CandidateType) -> String;
}

/// 默认命名策略: 类型短名首字母小写
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBeanNameStrategy;

impl BeanNameStrategy for DefaultBeanNameStrategy {
    fn generate(&self, candidate: &CandidateType) -> String {
        decapitalize(candidate.type_info().short_name())
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
