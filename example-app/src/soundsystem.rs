//! 音响系统

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use wirebox_common::{DependencyError, OutputSink};

/// 光盘
pub trait CompactDisc: Send + Sync {
    fn title(&self) -> &str;
    fn artist(&self) -> &str;
    /// 播放
    fn play(&self);
}

/// 播放器
pub trait MediaPlayer: Send + Sync {
    /// 播放已装入的光盘
    fn play(&self) -> Result<(), DependencyError>;
}

fn announce(sink: &dyn OutputSink, disc: &dyn CompactDisc) {
    sink.write_line(&format!("Playing {} by {}", disc.title(), disc.artist()));
}

/// 固定曲目的光盘
pub struct SgtPeppers {
    sink: Arc<dyn OutputSink>,
}

impl SgtPeppers {
    pub const TITLE: &'static str = "Sgt. Pepper's Lonely Hearts Club Band";
    pub const ARTIST: &'static str = "The Beatles";

    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

impl CompactDisc for SgtPeppers {
    fn title(&self) -> &str {
        Self::TITLE
    }

    fn artist(&self) -> &str {
        Self::ARTIST
    }

    fn play(&self) {
        announce(self.sink.as_ref(), self);
    }
}

/// 空白光盘，标题和艺术家由装配决定
pub struct BlankDisc {
    title: String,
    artist: String,
    sink: Arc<dyn OutputSink>,
}

impl BlankDisc {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            sink,
        }
    }
}

impl CompactDisc for BlankDisc {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }

    fn play(&self) {
        announce(self.sink.as_ref(), self);
    }
}

/// CD 播放器，光盘通过 setter 注入
#[derive(Default)]
pub struct CdPlayer {
    disc: RwLock<Option<Arc<dyn CompactDisc>>>,
}

impl CdPlayer {
    /// 装入光盘
    pub fn insert_disc(&self, disc: Arc<dyn CompactDisc>) {
        debug!("装入光盘: {}", disc.title());
        *self.disc.write() = Some(disc);
    }

    pub fn has_disc(&self) -> bool {
        self.disc.read().is_some()
    }
}

impl MediaPlayer for CdPlayer {
    fn play(&self) -> Result<(), DependencyError> {
        let disc = self
            .disc
            .read()
            .clone()
            .ok_or_else(|| DependencyError::no_such_component("compactDisc"))?;
        disc.play();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebox_common::{BufferSink, LineEnding};

    #[test]
    fn player_plays_inserted_disc() {
        let sink = Arc::new(BufferSink::new(LineEnding::Lf));
        let player = CdPlayer::default();
        player.insert_disc(Arc::new(BlankDisc::new("Revolver", "The Beatles", sink.clone())));
        player.play().unwrap();
        assert_eq!(sink.contents(), "Playing Revolver by The Beatles\n");
    }

    #[test]
    fn empty_player_fails() {
        let player = CdPlayer::default();
        assert!(!player.has_disc());
        assert_eq!(player.play(), Err(DependencyError::no_such_component("compactDisc")));
    }
}
