//! # 示例应用程序
//!
//! 用骑士和音响系统演示 Wirebox 的几种装配方式：配置文件装配、
//! 代码注册、组件扫描和按能力自动装配。

mod catalog;
mod knights;
mod soundsystem;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use config_abstractions::ScanSpec;
use config_impl::SettingsLoader;
use di_abstractions::{ComponentDefinition, DependencyReference};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use wirebox_common::{ApplicationError, OutputSink};
use wirebox_composition::{ApplicationContext, ApplicationContextBuilder, LoggingConfig, OUTPUT_SINK_ID};

use crate::catalog::demo_catalog;
use crate::knights::{DamselRescuingKnight, Knight};
use crate::soundsystem::MediaPlayer;

/// 自带装配文件所在目录
const WIRING_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/wiring");

/// 演示场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// 勇敢的骑士，探险由配置文件注入
    Knight,
    /// 自己创建探险的骑士，代码注册
    Damsel,
    /// 音响系统，配置文件装配
    Soundsystem,
    /// 音响系统，组件扫描加自动装配
    Scan,
}

impl Demo {
    /// 未指定 `--wiring` 时使用的装配文件
    fn default_wiring(self) -> Vec<PathBuf> {
        let dir = Path::new(WIRING_DIR);
        match self {
            Self::Knight => vec![dir.join("knight.toml")],
            Self::Soundsystem => vec![dir.join("soundsystem.toml")],
            Self::Damsel | Self::Scan => Vec::new(),
        }
    }
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Wirebox 示例应用")]
struct Args {
    /// 演示场景
    #[arg(short, long, value_enum, default_value_t = Demo::Soundsystem)]
    demo: Demo,

    /// 设置文件路径，不存在时使用默认设置
    #[arg(short, long, default_value = "config/app.toml")]
    config: PathBuf,

    /// 装配文件（toml/json/yaml），可重复；指定后替换场景自带的装配文件
    #[arg(short, long = "wiring")]
    wiring: Vec<PathBuf>,

    /// 日志级别，覆盖设置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 输出 JSON 格式日志
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut builder = demo_builder(args.demo, &args.wiring)?;
    if args.config.exists() {
        builder = builder.with_settings_loader(SettingsLoader::new().with_file(&args.config));
    }
    builder = match &args.log_level {
        Some(level) => builder.with_logging(LoggingConfig {
            filter: level.clone(),
            json_format: args.json_logs,
            ..LoggingConfig::default()
        }),
        None => builder.with_logging_from_settings(),
    };

    let context = builder.build().await.context("构建应用上下文失败")?;
    info!("启动演示: {:?}", args.demo);
    run_demo(args.demo, context).await?;
    info!("演示结束");
    Ok(())
}

/// 按场景组装上下文构建器：类型目录、装配文件和代码注册的组件
fn demo_builder(demo: Demo, wiring: &[PathBuf]) -> anyhow::Result<ApplicationContextBuilder> {
    let mut builder = ApplicationContextBuilder::new().with_catalog(demo_catalog()?);

    let files = if wiring.is_empty() {
        demo.default_wiring()
    } else {
        wiring.to_vec()
    };
    for file in files {
        builder = builder
            .add_wiring_file(&file)
            .with_context(|| format!("无法使用装配文件 {}", file.display()))?;
    }

    Ok(match demo {
        Demo::Damsel => builder.register(damsel_knight()),
        Demo::Scan => builder.enable_component_scan(ScanSpec::default()),
        Demo::Knight | Demo::Soundsystem => builder,
    })
}

/// 代码注册的骑士
fn damsel_knight() -> ComponentDefinition {
    ComponentDefinition::builder("knight", |args| {
        Ok(DamselRescuingKnight::new(args.component::<dyn OutputSink>(0)?))
    })
    .arg(DependencyReference::component(OUTPUT_SINK_ID))
    .provides::<dyn Knight>(|knight| knight as Arc<dyn Knight>)
    .description("自己创建探险的骑士")
    .build()
}

/// 解析顶层组件，调用一次行为，然后关闭上下文
async fn run_demo(demo: Demo, context: ApplicationContext) -> anyhow::Result<()> {
    context
        .run(|context| async move {
            match demo {
                Demo::Knight | Demo::Damsel => context.resolve::<dyn Knight>()?.embark_on_quest(),
                Demo::Soundsystem | Demo::Scan => context.resolve::<dyn MediaPlayer>()?.play()?,
            }
            Ok::<_, ApplicationError>(())
        })
        .await?;
    Ok(())
}
