//! 上下文生命周期与 Bean 查询的集中集成测试

use container_abstractions::{
    ApplicationContext, ApplicationContextExt, BeanNameStrategy, ContextAware,
    DefaultBeanNameStrategy,
};
use container_common::{CandidateType, ContextError, ContextState};
use container_composition::{ApplicationContextBuilder, AtriumApplicationContext};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// 消息源能力
trait MessageSource: Send + Sync {
    fn message(&self) -> String;
}

/// 固定消息实现
struct StaticMessage;

impl MessageSource for StaticMessage {
    fn message(&self) -> String {
        "static".to_string()
    }
}

/// 第二个消息实现
struct ClockMessage;

impl MessageSource for ClockMessage {
    fn message(&self) -> String {
        "clock".to_string()
    }
}

/// 无任何能力声明的普通组件
struct PlainWidget;

mod shadowed {
    /// 与根模块同短名的消息实现, 用于触发默认命名冲突
    pub struct StaticMessage;

    impl super::MessageSource for StaticMessage {
        fn message(&self) -> String {
            "shadowed".to_string()
        }
    }
}

fn context_of(candidates: Vec<CandidateType>) -> Arc<AtriumApplicationContext> {
    ApplicationContextBuilder::new()
        .with_candidates(candidates)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_refresh_registers_scanned_candidates() {
    let context = context_of(vec![CandidateType::component(|| PlainWidget).build()]);
    assert_eq!(context.state(), ContextState::Uninitialized);
    assert!(context.get_bean::<PlainWidget>().is_none());

    context.refresh().unwrap();

    assert_eq!(context.state(), ContextState::Ready);
    assert_eq!(context.refresh_count(), 1);
    assert!(context.get_bean::<PlainWidget>().is_some());
    assert_eq!(context.get_beans_of_type::<PlainWidget>().len(), 1);
    // 未登记的类型返回 None, 不是错误
    assert!(context.get_bean::<StaticMessage>().is_none());
}

#[tokio::test]
async fn test_capability_reachable_without_interface_candidate() {
    let context = context_of(vec![CandidateType::component(|| StaticMessage)
        .implements(|c: Arc<StaticMessage>| c as Arc<dyn MessageSource>)
        .build()]);
    context.refresh().unwrap();

    // 接口未作为候选扫描: 类型键查询不命中
    assert!(context.get_bean::<dyn MessageSource>().is_none());
    assert!(context.get_beans_of_type::<dyn MessageSource>().is_empty());

    // 实现类型本身仍可按具体类型取得
    assert!(context.get_bean::<StaticMessage>().is_some());

    // 能力索引查询命中别名绑定
    let source = context.get_capability::<dyn MessageSource>().unwrap();
    assert_eq!(source.message(), "static");
}

#[tokio::test]
async fn test_interface_candidate_aggregates_implementations() {
    let context = context_of(vec![
        CandidateType::capability::<dyn MessageSource>(),
        CandidateType::component(|| StaticMessage)
            .implements(|c: Arc<StaticMessage>| c as Arc<dyn MessageSource>)
            .build(),
        CandidateType::component(|| ClockMessage)
            .implements(|c: Arc<ClockMessage>| c as Arc<dyn MessageSource>)
            .build(),
    ]);
    context.refresh().unwrap();

    let by_type: Vec<String> = context
        .get_beans_of_type::<dyn MessageSource>()
        .iter()
        .map(|source| source.message())
        .collect();
    assert_eq!(by_type, vec!["static", "clock"]);

    let by_capability: Vec<String> = context
        .get_capabilities::<dyn MessageSource>()
        .iter()
        .map(|source| source.message())
        .collect();
    assert_eq!(by_capability, by_type);

    // 同一查询重复执行, 顺序稳定
    let again: Vec<String> = context
        .get_capabilities::<dyn MessageSource>()
        .iter()
        .map(|source| source.message())
        .collect();
    assert_eq!(again, by_capability);
}

#[tokio::test]
async fn test_default_names_disambiguate_implementations() {
    let context = context_of(vec![
        CandidateType::component(|| StaticMessage)
            .implements(|c: Arc<StaticMessage>| c as Arc<dyn MessageSource>)
            .build(),
        CandidateType::component(|| ClockMessage)
            .implements(|c: Arc<ClockMessage>| c as Arc<dyn MessageSource>)
            .build(),
    ]);
    context.refresh().unwrap();

    let static_source = context
        .get_capability_named::<dyn MessageSource>("staticMessage")
        .unwrap();
    assert_eq!(static_source.message(), "static");

    let clock_source = context
        .get_capability_named::<dyn MessageSource>("clockMessage")
        .unwrap();
    assert_eq!(clock_source.message(), "clock");

    assert!(context
        .get_capability_named::<dyn MessageSource>("missing")
        .is_none());
}

#[tokio::test]
async fn test_explicit_names_preserve_every_binding_path() {
    let context = context_of(vec![CandidateType::component(|| StaticMessage)
        .implements_named("primary", |c: Arc<StaticMessage>| {
            c as Arc<dyn MessageSource>
        })
        .implements_named("fallback", |c: Arc<StaticMessage>| {
            c as Arc<dyn MessageSource>
        })
        .build()]);
    context.refresh().unwrap();

    // 同一候选的两条声明路径各自保留
    let bindings = context.get_capabilities::<dyn MessageSource>();
    assert_eq!(bindings.len(), 2);

    let primary = context
        .get_capability_named::<dyn MessageSource>("primary")
        .unwrap();
    let fallback = context
        .get_capability_named::<dyn MessageSource>("fallback")
        .unwrap();
    // 两条路径共享同一个单例实例
    assert_eq!(
        Arc::as_ptr(&primary) as *const (),
        Arc::as_ptr(&fallback) as *const ()
    );
}

#[tokio::test]
async fn test_second_refresh_produces_fresh_instances() {
    let context = context_of(vec![CandidateType::component(|| PlainWidget).build()]);
    context.refresh().unwrap();
    let first = context.get_bean::<PlainWidget>().unwrap();

    context.refresh().unwrap();
    let second = context.get_bean::<PlainWidget>().unwrap();

    assert_eq!(context.refresh_count(), 2);
    assert_eq!(context.state(), ContextState::Ready);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_duplicate_candidate_fails_refresh() {
    let context = context_of(vec![
        CandidateType::component(|| PlainWidget).build(),
        CandidateType::component(|| PlainWidget).build(),
    ]);

    let result = context.refresh();

    assert!(matches!(result, Err(ContextError::DuplicateType { .. })));
    // 失败的刷新不得留下半成品: 状态回退, 注册表保持原样
    assert_eq!(context.state(), ContextState::Uninitialized);
    assert!(context.get_bean::<PlainWidget>().is_none());
    assert_eq!(context.refresh_count(), 0);
}

#[tokio::test]
async fn test_colliding_binding_names_fail_refresh() {
    // 两个模块下的同短名类型在默认策略下生成同一绑定名
    let context = context_of(vec![
        CandidateType::component(|| StaticMessage)
            .implements(|c: Arc<StaticMessage>| c as Arc<dyn MessageSource>)
            .build(),
        CandidateType::component(|| shadowed::StaticMessage)
            .implements(|c: Arc<shadowed::StaticMessage>| c as Arc<dyn MessageSource>)
            .build(),
    ]);

    let result = context.refresh();
    assert!(matches!(result, Err(ContextError::DuplicateBinding { .. })));
}

/// 记录上下文回引与回调次数的感知组件
struct CapturingAware {
    calls: Arc<AtomicUsize>,
    captured: RwLock<Option<Arc<dyn ApplicationContext>>>,
    saw_refreshing: Arc<AtomicBool>,
    saw_previous_generation: Arc<AtomicBool>,
}

impl ContextAware for CapturingAware {
    fn set_application_context(&self, context: Arc<dyn ApplicationContext>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_refreshing.store(
            context.state() == ContextState::Refreshing,
            Ordering::SeqCst,
        );
        // 回调发生在刷新期间, 查询命中上一代注册表
        self.saw_previous_generation
            .store(context.get_bean::<PlainWidget>().is_some(), Ordering::SeqCst);
        *self.captured.write() = Some(context);
    }
}

#[tokio::test]
async fn test_context_aware_receives_owning_context_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let saw_refreshing = Arc::new(AtomicBool::new(false));
    let saw_previous = Arc::new(AtomicBool::new(false));

    let candidate_calls = Arc::clone(&calls);
    let candidate_refreshing = Arc::clone(&saw_refreshing);
    let candidate_previous = Arc::clone(&saw_previous);
    let context = context_of(vec![
        CandidateType::component(|| PlainWidget).build(),
        CandidateType::component(move || CapturingAware {
            calls: Arc::clone(&candidate_calls),
            captured: RwLock::new(None),
            saw_refreshing: Arc::clone(&candidate_refreshing),
            saw_previous_generation: Arc::clone(&candidate_previous),
        })
        .implements(|c: Arc<CapturingAware>| c as Arc<dyn ContextAware>)
        .build(),
    ]);

    context.refresh().unwrap();

    // 每实例每刷新恰好一次回调
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(saw_refreshing.load(Ordering::SeqCst));
    // 首次刷新时上一代注册表为空
    assert!(!saw_previous.load(Ordering::SeqCst));

    // 回调携带的就是拥有方上下文本身
    let aware = context.get_bean::<CapturingAware>().unwrap();
    let captured = aware.captured.read().clone().unwrap();
    let expected: Arc<dyn ApplicationContext> = context.clone();
    assert_eq!(
        Arc::as_ptr(&captured) as *const (),
        Arc::as_ptr(&expected) as *const ()
    );

    // 新实例在第二轮刷新再次收到回调, 此时上一代注册表可见
    context.refresh().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(saw_previous.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_register_bean_is_a_noop() {
    let context = context_of(Vec::new());
    context.refresh().unwrap();

    context.register_bean(CandidateType::component(|| PlainWidget).build());
    context.refresh().unwrap();

    assert!(context.candidates().is_empty());
    assert!(context.get_bean::<PlainWidget>().is_none());
}

#[tokio::test]
async fn test_custom_name_strategy_is_injected() {
    struct UpperSnake;

    impl BeanNameStrategy for UpperSnake {
        fn generate(&self, candidate: &CandidateType) -> String {
            candidate.type_info().short_name().to_uppercase()
        }
    }

    let context = ApplicationContextBuilder::new()
        .with_candidates(vec![CandidateType::component(|| StaticMessage)
            .implements(|c: Arc<StaticMessage>| c as Arc<dyn MessageSource>)
            .build()])
        .with_name_strategy(UpperSnake)
        .build()
        .unwrap();
    context.refresh().unwrap();

    assert!(context
        .get_capability_named::<dyn MessageSource>("STATICMESSAGE")
        .is_some());
    assert!(context
        .get_capability_named::<dyn MessageSource>("staticMessage")
        .is_none());

    // 默认策略对照
    let default_name = DefaultBeanNameStrategy
        .generate(&CandidateType::component(|| StaticMessage).build());
    assert_eq!(default_name, "staticMessage");
}
