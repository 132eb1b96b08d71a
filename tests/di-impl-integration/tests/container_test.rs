//! 容器解析的集中集成测试
use di_abstractions::{
    ComponentDefinition, ComponentRegistry, ComponentResolverExt, ContainerConfig, DefinitionBuilder,
    DependencyReference, DiContainer,
};
use di_impl::{Container, ContainerBuilder};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wirebox_common::{BufferSink, ContainerPhase, DependencyError, InstanceState, LineEnding, OutputSink};

trait CompactDisc: Send + Sync {
    fn play(&self);
}

trait MediaPlayer: Send + Sync {
    fn play(&self);
}

struct BlankDisc {
    title: String,
    artist: String,
    sink: Arc<dyn OutputSink>,
}

impl CompactDisc for BlankDisc {
    fn play(&self) {
        self.sink
            .write_line(&format!("Playing {} by {}", self.title, self.artist));
    }
}

#[derive(Default)]
struct CdPlayer {
    disc: Mutex<Option<Arc<dyn CompactDisc>>>,
}

impl MediaPlayer for CdPlayer {
    fn play(&self) {
        if let Some(disc) = self.disc.lock().as_ref() {
            disc.play();
        }
    }
}

/// 只通过构造参数依赖下一个节点
struct Link;

#[derive(Default)]
struct Peer {
    other: Mutex<Option<Arc<Peer>>>,
}

fn sink_definition(sink: Arc<BufferSink>) -> ComponentDefinition {
    DefinitionBuilder::from_instance("console", sink)
        .provides::<dyn OutputSink>(|sink| sink as Arc<dyn OutputSink>)
        .build()
}

fn disc(id: &str, title: &str) -> ComponentDefinition {
    ComponentDefinition::builder(id, |args| {
        Ok(BlankDisc {
            title: args.value(0)?.to_string(),
            artist: args.value(1)?.to_string(),
            sink: args.component::<dyn OutputSink>(2)?,
        })
    })
    .args([
        DependencyReference::value(title),
        DependencyReference::value("The Beatles"),
        DependencyReference::capability::<dyn OutputSink>(),
    ])
    .provides::<dyn CompactDisc>(|disc| disc as Arc<dyn CompactDisc>)
    .build()
}

fn player(reference: DependencyReference) -> ComponentDefinition {
    ComponentDefinition::builder("cdPlayer", |_| Ok(CdPlayer::default()))
        .setter("compactDisc", reference, |player: &CdPlayer, disc| {
            *player.disc.lock() = Some(disc.component::<dyn CompactDisc>()?);
            Ok(())
        })
        .provides::<dyn MediaPlayer>(|player| player as Arc<dyn MediaPlayer>)
        .build()
}

fn link(id: &str, next: &str) -> ComponentDefinition {
    ComponentDefinition::builder(id, |_| Ok(Link))
        .arg(DependencyReference::component(next))
        .build()
}

fn peer(id: &str, other: &str) -> ComponentDefinition {
    ComponentDefinition::builder(id, |_| Ok(Peer::default()))
        .setter("other", DependencyReference::component(other), |peer: &Peer, other| {
            *peer.other.lock() = Some(other.component::<Peer>()?);
            Ok(())
        })
        .build()
}

#[test]
fn test_setter_wired_player_plays_disc() {
    let sink = Arc::new(BufferSink::new(LineEnding::Lf));
    let container = Container::new();
    container.register(sink_definition(sink.clone())).unwrap();
    container
        .register(disc("compactDisc", "Sgt. Pepper's Lonely Hearts Club Band"))
        .unwrap();
    container
        .register(player(DependencyReference::component("compactDisc")))
        .unwrap();

    container.resolve::<dyn MediaPlayer>().unwrap().play();
    assert_eq!(
        sink.contents(),
        "Playing Sgt. Pepper's Lonely Hearts Club Band by The Beatles\n"
    );
}

#[test]
fn test_same_identifier_resolves_identical_instance() {
    let sink = Arc::new(BufferSink::new(LineEnding::Lf));
    let container = Container::new();
    container.register(sink_definition(sink)).unwrap();
    container.register(disc("compactDisc", "Revolver")).unwrap();

    let first = container.resolve_named::<dyn CompactDisc>("compactDisc").unwrap();
    let second = container.resolve_named::<dyn CompactDisc>("compactDisc").unwrap();
    let concrete = container.resolve_named::<BlankDisc>("compactDisc").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(std::ptr::eq(
        Arc::as_ptr(&first).cast::<u8>(),
        Arc::as_ptr(&concrete).cast::<u8>()
    ));
}

#[test]
fn test_duplicate_identifier_is_rejected() {
    let container = Container::new();
    container.register(link("a", "b")).unwrap();
    let error = container.register(link("a", "c")).unwrap_err();
    assert_eq!(error, DependencyError::DuplicateIdentifier { id: "a".to_string() });
}

#[test]
fn test_ambiguous_capability_and_named_resolution() {
    let sink = Arc::new(BufferSink::new(LineEnding::Lf));
    let container = Container::new();
    container.register(sink_definition(sink.clone())).unwrap();
    container.register(disc("revolver", "Revolver")).unwrap();
    container.register(disc("abbeyRoad", "Abbey Road")).unwrap();

    assert!(matches!(
        container.resolve::<dyn CompactDisc>(),
        Err(DependencyError::AmbiguousComponent { ref candidates, .. }) if candidates.len() == 2
    ));

    container.resolve_named::<dyn CompactDisc>("abbeyRoad").unwrap().play();
    assert_eq!(sink.contents(), "Playing Abbey Road by The Beatles\n");
    assert_eq!(container.resolve_all::<dyn CompactDisc>().unwrap().len(), 2);
}

#[test]
fn test_missing_component_and_type_mismatch() {
    let container = Container::new();
    container.register(link("a", "missing")).unwrap();

    assert!(matches!(
        container.resolve_named::<Link>("nowhere"),
        Err(DependencyError::NoSuchComponent { .. })
    ));
    assert!(matches!(
        container.resolve_named::<Link>("a"),
        Err(DependencyError::NoSuchComponent { ref key }) if key == "missing"
    ));
    assert!(matches!(
        container.resolve::<dyn CompactDisc>(),
        Err(DependencyError::NoSuchComponent { .. })
    ));
}

#[test]
fn test_transitive_constructor_cycle_fails_and_stays_failed() {
    let container = Container::new();
    container.register(link("a", "b")).unwrap();
    container.register(link("b", "c")).unwrap();
    container.register(link("c", "a")).unwrap();

    let error = container.resolve_named::<Link>("a").err().unwrap();
    assert_eq!(
        error,
        DependencyError::CircularDependency {
            dependency_chain: "a -> b -> c -> a".to_string()
        }
    );

    for id in ["a", "b", "c"] {
        assert_eq!(container.state_of(&id.into()), Some(InstanceState::Failed));
    }
    // 失败的槽位不会重试
    assert_eq!(container.resolve_named::<Link>("b").err(), Some(error));
    assert_eq!(container.stats().failed_singletons, 3);
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let container = Container::new();
    container.register(link("ouroboros", "ouroboros")).unwrap();
    assert!(matches!(
        container.resolve_named::<Link>("ouroboros"),
        Err(DependencyError::CircularDependency { .. })
    ));
}

#[test]
fn test_builder_validation_rejects_constructor_cycle() {
    let error = ContainerBuilder::new()
        .register(link("a", "b"))
        .register(link("b", "a"))
        .build()
        .unwrap_err();
    assert!(matches!(error, DependencyError::CircularDependency { .. }));
}

#[test]
fn test_setter_cycle_resolves_through_early_reference() {
    let container = ContainerBuilder::new()
        .register(peer("left", "right"))
        .register(peer("right", "left"))
        .build()
        .unwrap();

    let left = container.resolve_named::<Peer>("left").unwrap();
    let right = container.resolve_named::<Peer>("right").unwrap();
    let left_other = left.other.lock().clone().unwrap();
    let right_other = right.other.lock().clone().unwrap();
    assert!(Arc::ptr_eq(&left_other, &right));
    assert!(Arc::ptr_eq(&right_other, &left));
}

#[test]
fn test_registration_after_start_is_rejected() {
    let container = Container::new();
    container.register(link("a", "b")).unwrap();
    container
        .register(ComponentDefinition::builder("b", |_| Ok(Link)).build())
        .unwrap();
    container.resolve_named::<Link>("a").unwrap();

    assert_eq!(container.phase(), ContainerPhase::Started);
    assert_eq!(
        container.register(link("late", "a")).unwrap_err(),
        DependencyError::ContainerAlreadyStarted { id: "late".to_string() }
    );
}

#[test]
fn test_closed_container_rejects_everything() {
    let container = Container::new();
    container
        .register(ComponentDefinition::builder("b", |_| Ok(Link)).build())
        .unwrap();
    container.resolve_named::<Link>("b").unwrap();
    container.close();
    container.close();

    assert_eq!(container.phase(), ContainerPhase::Closed);
    assert_eq!(
        container.resolve_named::<Link>("b").err(),
        Some(DependencyError::ContainerClosed)
    );
    assert_eq!(
        container.register(link("late", "b")).unwrap_err(),
        DependencyError::ContainerClosed
    );
    assert_eq!(container.stats().resolved_singletons, 0);
}

#[test]
fn test_depth_limit_stops_long_chains() {
    let container = Container::with_config(ContainerConfig {
        max_resolution_depth: 3,
        ..ContainerConfig::default()
    });
    for (id, next) in [("n0", "n1"), ("n1", "n2"), ("n2", "n3"), ("n3", "n4")] {
        container.register(link(id, next)).unwrap();
    }
    container
        .register(ComponentDefinition::builder("n4", |_| Ok(Link)).build())
        .unwrap();

    assert!(matches!(
        container.resolve_named::<Link>("n0"),
        Err(DependencyError::ResolutionDepthExceeded { max_depth: 3, .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_constructs_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();
    let container = Arc::new(Container::new());
    container
        .register(ComponentDefinition::builder("slow", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Link)
        })
        .build())
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            tokio::task::spawn_blocking(move || container.resolve_named::<Link>("slow"))
        })
        .collect();

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_failed_setter_keeps_independent_dependencies_resolved() {
    let sink = Arc::new(BufferSink::new(LineEnding::Lf));
    let container = Container::new();
    container.register(sink_definition(sink.clone())).unwrap();
    container.register(disc("compactDisc", "Help!")).unwrap();
    container
        .register(
            ComponentDefinition::builder("fan", |_| Ok(Link))
                .setter("idol", DependencyReference::component("cdPlayer"), |_: &Link, _| Ok(()))
                .build(),
        )
        .unwrap();
    container
        .register(
            ComponentDefinition::builder("cdPlayer", |_| Ok(CdPlayer::default()))
                .setter("compactDisc", DependencyReference::component("compactDisc"), |player: &CdPlayer, disc| {
                    *player.disc.lock() = Some(disc.component::<dyn CompactDisc>()?);
                    Ok(())
                })
                .setter("fan", DependencyReference::component("fan"), |_: &CdPlayer, _| Ok(()))
                .setter("remote", DependencyReference::value("ir"), |_: &CdPlayer, _| {
                    Err(DependencyError::construction_failed("cdPlayer", "遥控器无法配对"))
                })
                .build(),
        )
        .unwrap();

    let error = container.resolve_named::<CdPlayer>("cdPlayer").err().unwrap();
    assert!(matches!(error, DependencyError::ConstructionFailed { ref id, .. } if id == "cdPlayer"));
    assert_eq!(container.state_of(&"cdPlayer".into()), Some(InstanceState::Failed));

    // fan 持有失败组件的提前引用，一并失败
    assert_eq!(container.state_of(&"fan".into()), Some(InstanceState::Failed));
    assert_eq!(container.resolve_named::<Link>("fan").err(), Some(error));

    // 光盘与失败组件无关，保持已解析
    assert_eq!(container.state_of(&"compactDisc".into()), Some(InstanceState::Resolved));
    container.resolve_named::<dyn CompactDisc>("compactDisc").unwrap().play();
    assert_eq!(sink.contents(), "Playing Help! by The Beatles\n");
}

#[test]
fn test_panicking_setter_leaves_slot_failed() {
    let container = Arc::new(Container::new());
    container
        .register(
            ComponentDefinition::builder("cdPlayer", |_| Ok(CdPlayer::default()))
                .setter("compactDisc", DependencyReference::value("none"), |_: &CdPlayer, _| {
                    panic!("光盘仓卡住了")
                })
                .build(),
        )
        .unwrap();

    let worker = container.clone();
    let first = std::thread::spawn(move || worker.resolve_named::<CdPlayer>("cdPlayer").err())
        .join()
        .unwrap()
        .unwrap();
    assert!(matches!(
        first,
        DependencyError::ConstructionFailed { ref id, ref message } if id == "cdPlayer" && message.contains("光盘仓卡住了")
    ));

    assert_eq!(container.state_of(&"cdPlayer".into()), Some(InstanceState::Failed));
    assert_eq!(container.resolve_named::<CdPlayer>("cdPlayer").err(), Some(first));
}

#[test]
fn test_panicking_constructor_is_reported() {
    let container = Container::new();
    container
        .register(ComponentDefinition::builder("broken", |_| -> Result<Link, DependencyError> {
            panic!("{}", String::from("电源故障"))
        })
        .build())
        .unwrap();

    let error = container.resolve_named::<Link>("broken").err().unwrap();
    assert!(matches!(
        error,
        DependencyError::ConstructionFailed { ref message, .. } if message.contains("电源故障")
    ));
    assert_eq!(container.state_of(&"broken".into()), Some(InstanceState::Failed));
    assert_eq!(container.stats().resolution_errors, 1);
}
