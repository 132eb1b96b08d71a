//! 从磁盘上的设置文件和装配文件构建应用上下文
use config_impl::SettingsLoader;
use di_abstractions::{ComponentType, DependencyReference, TypeCatalog};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use wirebox_common::{ApplicationError, BufferSink, ContainerPhase, LineEnding, OutputSink};
use wirebox_composition::ApplicationContextBuilder;

trait CompactDisc: Send + Sync {
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

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            ComponentType::builder("BlankDisc", |args| {
                Ok(BlankDisc {
                    title: args.value(0)?.to_string(),
                    artist: args.value(1)?.to_string(),
                    sink: args.component::<dyn OutputSink>(2)?,
                })
            })
            .arg(DependencyReference::value("Untitled"))
            .arg(DependencyReference::value("Unknown"))
            .arg(DependencyReference::capability::<dyn OutputSink>())
            .provides::<dyn CompactDisc>(|disc| disc as Arc<dyn CompactDisc>)
            .build(),
        )
        .unwrap()
}

fn write_file(directory: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = directory.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn test_settings_list_wiring_files() {
    let directory = tempfile::tempdir().unwrap();
    let wiring = write_file(
        &directory,
        "discs.yaml",
        r#"
components:
  - id: compactDisc
    type: BlankDisc
    lazy: false
    constructor-args:
      - value: "Sgt. Pepper's Lonely Hearts Club Band"
      - value: The Beatles
      - ref: console
"#,
    );
    let settings = write_file(
        &directory,
        "app.toml",
        &format!("[wiring]\nfiles = [{:?}]\n", wiring.display().to_string()),
    );

    let sink = Arc::new(BufferSink::new(LineEnding::CrLf));
    let context = ApplicationContextBuilder::new()
        .with_catalog(catalog())
        .with_settings_loader(
            SettingsLoader::new()
                .with_file(&settings)
                .with_environment(HashMap::new()),
        )
        .with_output_sink(sink.clone())
        .build()
        .await
        .unwrap();

    // 非延迟单例在构建时已创建
    assert_eq!(context.stats().resolved_singletons, 2);
    assert_eq!(context.stats().phase, ContainerPhase::Started);

    context
        .run(|context| async move {
            context.resolve::<dyn CompactDisc>()?.play();
            Ok::<_, ApplicationError>(())
        })
        .await
        .unwrap();
    assert_eq!(
        sink.contents(),
        "Playing Sgt. Pepper's Lonely Hearts Club Band by The Beatles\r\n"
    );
}

#[tokio::test]
async fn test_default_constructor_args_and_env_line_ending() {
    let environment = HashMap::from([(
        "WIREBOX__OUTPUT__LINE_ENDING".to_string(),
        "crlf".to_string(),
    )]);
    let context = ApplicationContextBuilder::new()
        .with_catalog(catalog())
        .with_settings_loader(SettingsLoader::new().with_environment(environment))
        .register(
            catalog()
                .get("BlankDisc")
                .unwrap()
                .definition("untitled"),
        )
        .build()
        .await
        .unwrap();

    assert_eq!(context.settings().output.line_ending, LineEnding::CrLf);
    assert!(context.resolve_named::<BlankDisc>("untitled").is_ok());
    context.close().await.unwrap();
}
