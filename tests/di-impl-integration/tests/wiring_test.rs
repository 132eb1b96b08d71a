//! 装配文档与设置的集成测试
use config_abstractions::{WiringFormat, WiringSource};
use config_impl::{FileWiringSource, SettingsLoader, WiringLoader};
use di_abstractions::{
    ComponentRegistry, ComponentResolverExt, ComponentType, DefinitionBuilder, DependencyReference,
    TypeCatalog,
};
use di_impl::ContainerBuilder;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use wirebox_common::{BufferSink, Capability, ConfigError, LineEnding, OutputSink, Scope};

trait Quest: Send + Sync {
    fn embark(&self);
}

trait Knight: Send + Sync {
    fn embark_on_quest(&self);
}

struct SlayDragonQuest {
    sink: Arc<dyn OutputSink>,
}

impl Quest for SlayDragonQuest {
    fn embark(&self) {
        self.sink.write_line("Embarking on quest to slay the dragon!");
    }
}

struct BraveKnight {
    quest: Arc<dyn Quest>,
}

impl Knight for BraveKnight {
    fn embark_on_quest(&self) {
        self.quest.embark();
    }
}

/// 通过属性注入随从的骑士
#[derive(Default)]
struct SquiredKnight {
    squire: Mutex<Option<Arc<dyn Quest>>>,
}

impl Knight for SquiredKnight {
    fn embark_on_quest(&self) {
        if let Some(quest) = self.squire.lock().as_ref() {
            quest.embark();
        }
    }
}

fn catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new()
        .with(
            ComponentType::builder("SlayDragonQuest", |args| {
                Ok(SlayDragonQuest {
                    sink: args.component::<dyn OutputSink>(0)?,
                })
            })
            .arg(DependencyReference::capability::<dyn OutputSink>())
            .provides::<dyn Quest>(|quest| quest as Arc<dyn Quest>)
            .build(),
        )
        .unwrap()
        .with(
            ComponentType::builder("BraveKnight", |args| {
                Ok(BraveKnight {
                    quest: args.component::<dyn Quest>(0)?,
                })
            })
            .arg(DependencyReference::capability::<dyn Quest>())
            .provides::<dyn Knight>(|knight| knight as Arc<dyn Knight>)
            .build(),
        )
        .unwrap()
        .with(
            ComponentType::builder("SquiredKnight", |_| Ok(SquiredKnight::default()))
                .property(
                    "squire",
                    DependencyReference::capability::<dyn Quest>(),
                    |knight: &SquiredKnight, quest| {
                        *knight.squire.lock() = Some(quest.component::<dyn Quest>()?);
                        Ok(())
                    },
                )
                .provides::<dyn Knight>(|knight| knight as Arc<dyn Knight>)
                .build(),
        )
        .unwrap();
    catalog.register_capability(Capability::of::<dyn OutputSink>());
    catalog
}

const TOML: &str = r#"
[[components]]
id = "knight"
type = "BraveKnight"
constructor-args = [{ ref = "quest" }]

[[components]]
id = "quest"
type = "SlayDragonQuest"
scope = "prototype"
constructor-args = [{ capability = "OutputSink" }]

[[components]]
id = "squiredKnight"
type = "SquiredKnight"
properties = [{ name = "squire", ref = "quest" }]
"#;

const JSON: &str = r#"{
  "components": [
    { "id": "knight", "type": "BraveKnight", "constructor-args": [{ "ref": "quest" }] },
    {
      "id": "quest",
      "type": "SlayDragonQuest",
      "scope": "prototype",
      "constructor-args": [{ "capability": "OutputSink" }]
    },
    {
      "id": "squiredKnight",
      "type": "SquiredKnight",
      "properties": [{ "name": "squire", "ref": "quest" }]
    }
  ]
}"#;

const YAML: &str = r#"
components:
  - id: knight
    type: BraveKnight
    constructor-args:
      - ref: quest
  - id: quest
    type: SlayDragonQuest
    scope: prototype
    constructor-args:
      - capability: OutputSink
  - id: squiredKnight
    type: SquiredKnight
    properties:
      - name: squire
        ref: quest
"#;

fn wiring_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// 加载单个装配文件，返回组件图的摘要和骑士的输出
async fn load_graph(suffix: &str, content: &str) -> (Vec<String>, String) {
    let file = wiring_file(suffix, content);
    let sources: Vec<Box<dyn WiringSource>> = vec![Box::new(FileWiringSource::new(file.path()).unwrap())];
    let definitions = WiringLoader::new(Arc::new(catalog()))
        .load_sources(&sources)
        .await
        .unwrap();

    let sink = Arc::new(BufferSink::new(LineEnding::Lf));
    let container = ContainerBuilder::new()
        .register(
            DefinitionBuilder::from_instance("console", sink.clone())
                .provides::<dyn OutputSink>(|sink| sink as Arc<dyn OutputSink>)
                .build(),
        )
        .register_all(definitions)
        .build()
        .unwrap();

    let graph = container
        .definitions()
        .iter()
        .map(|definition| {
            let dependencies: Vec<String> = definition.dependencies().map(ToString::to_string).collect();
            format!(
                "{} {} {} [{}]",
                definition.id(),
                definition.type_info().short_name(),
                definition.scope(),
                dependencies.join(", ")
            )
        })
        .collect();

    for knight in container.resolve_all::<dyn Knight>().unwrap() {
        knight.embark_on_quest();
    }
    (graph, sink.contents())
}

#[tokio::test]
async fn test_all_wiring_formats_produce_the_same_graph() {
    let toml = load_graph(".toml", TOML).await;
    let json = load_graph(".json", JSON).await;
    let yaml = load_graph(".yml", YAML).await;

    assert_eq!(toml, json);
    assert_eq!(toml, yaml);
    assert_eq!(toml.0.len(), 4);
    assert_eq!(
        toml.1,
        "Embarking on quest to slay the dragon!\nEmbarking on quest to slay the dragon!\n"
    );
}

#[tokio::test]
async fn test_prototype_quest_is_not_shared() {
    let document = config_impl::parse_document(WiringFormat::Toml, TOML).unwrap();
    let definitions = WiringLoader::new(Arc::new(catalog())).load(&document).unwrap();
    assert_eq!(definitions[1].scope(), Scope::Prototype);

    let container = ContainerBuilder::new()
        .register(
            DefinitionBuilder::from_instance("console", Arc::new(BufferSink::new(LineEnding::Lf)))
                .provides::<dyn OutputSink>(|sink| sink as Arc<dyn OutputSink>)
                .build(),
        )
        .register_all(definitions)
        .build()
        .unwrap();

    let first = container.resolve_named::<dyn Quest>("quest").unwrap();
    let second = container.resolve_named::<dyn Quest>("quest").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_unknown_type_fails_at_load_time() {
    let file = wiring_file(".toml", "[[components]]\nid = \"knight\"\ntype = \"BlackKnight\"\n");
    let sources: Vec<Box<dyn WiringSource>> = vec![Box::new(FileWiringSource::new(file.path()).unwrap())];
    let error = WiringLoader::new(Arc::new(catalog()))
        .load_sources(&sources)
        .await
        .unwrap_err();
    assert!(matches!(error, ConfigError::UnknownComponentType { ref type_name, .. } if type_name == "BlackKnight"));
}

#[test]
fn test_settings_environment_overrides_file() {
    let file = wiring_file(
        ".toml",
        "[container]\nmax_resolution_depth = 20\n\n[output]\nline_ending = \"lf\"\n",
    );
    let environment = HashMap::from([
        ("WIREBOX__OUTPUT__LINE_ENDING".to_string(), "crlf".to_string()),
        ("WIREBOX__CONTAINER__EAGER_SINGLETONS".to_string(), "false".to_string()),
        ("WIREBOX__WIRING__FILES".to_string(), "knight.toml,quests.yaml".to_string()),
    ]);

    let settings = SettingsLoader::new()
        .with_file(file.path())
        .with_environment(environment)
        .load()
        .unwrap();
    assert_eq!(settings.output.line_ending, LineEnding::CrLf);
    assert_eq!(settings.container.max_resolution_depth, 20);
    assert!(!settings.container.eager_singletons);
    assert_eq!(settings.wiring.files.len(), 2);
}
