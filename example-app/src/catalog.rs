//! 演示类型目录

use crate::knights::{BraveKnight, DamselRescuingKnight, Knight, Quest, SlayDragonQuest};
use crate::soundsystem::{BlankDisc, CdPlayer, CompactDisc, MediaPlayer, SgtPeppers};
use di_abstractions::{ComponentType, DependencyReference, TypeCatalog};
use std::sync::Arc;
use wirebox_common::{DependencyError, OutputSink};

/// 登记所有演示类型
pub fn demo_catalog() -> Result<TypeCatalog, DependencyError> {
    TypeCatalog::new()
        .with(
            ComponentType::builder("SlayDragonQuest", |args| {
                Ok(SlayDragonQuest::new(args.component::<dyn OutputSink>(0)?))
            })
            .arg(DependencyReference::capability::<dyn OutputSink>())
            .provides::<dyn Quest>(|quest| quest as Arc<dyn Quest>)
            .build(),
        )?
        .with(
            ComponentType::builder("BraveKnight", |args| {
                Ok(BraveKnight::new(args.component::<dyn Quest>(0)?))
            })
            .arg(DependencyReference::capability::<dyn Quest>())
            .provides::<dyn Knight>(|knight| knight as Arc<dyn Knight>)
            .build(),
        )?
        .with(
            ComponentType::builder("DamselRescuingKnight", |args| {
                Ok(DamselRescuingKnight::new(args.component::<dyn OutputSink>(0)?))
            })
            .arg(DependencyReference::capability::<dyn OutputSink>())
            .provides::<dyn Knight>(|knight| knight as Arc<dyn Knight>)
            .build(),
        )?
        .with(
            ComponentType::builder("SgtPeppers", |args| {
                Ok(SgtPeppers::new(args.component::<dyn OutputSink>(0)?))
            })
            .arg(DependencyReference::capability::<dyn OutputSink>())
            .provides::<dyn CompactDisc>(|disc| disc as Arc<dyn CompactDisc>)
            .scannable()
            .build(),
        )?
        .with(
            ComponentType::builder("BlankDisc", |args| {
                Ok(BlankDisc::new(
                    args.value(0)?,
                    args.value(1)?,
                    args.component::<dyn OutputSink>(2)?,
                ))
            })
            .provides::<dyn CompactDisc>(|disc| disc as Arc<dyn CompactDisc>)
            .build(),
        )?
        .with(
            ComponentType::builder("CDPlayer", |_| Ok(CdPlayer::default()))
                .autowired_property(
                    "compactDisc",
                    DependencyReference::capability::<dyn CompactDisc>(),
                    |player: &CdPlayer, disc| {
                        player.insert_disc(disc.component::<dyn CompactDisc>()?);
                        Ok(())
                    },
                )
                .provides::<dyn MediaPlayer>(|player| player as Arc<dyn MediaPlayer>)
                .scannable()
                .build(),
        )
}
