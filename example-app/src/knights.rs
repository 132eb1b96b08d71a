//! 骑士与探险

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wirebox_common::OutputSink;

/// 探险
pub trait Quest: Send + Sync {
    /// 出发
    fn embark(&self);
}

/// 骑士
pub trait Knight: Send + Sync {
    /// 踏上探险
    fn embark_on_quest(&self);
}

/// 屠龙
pub struct SlayDragonQuest {
    sink: Arc<dyn OutputSink>,
}

impl SlayDragonQuest {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

impl Quest for SlayDragonQuest {
    fn embark(&self) {
        self.sink.write_line("Embarking on quest to slay the dragon!");
    }
}

/// 勇敢的骑士，探险由构造参数注入
pub struct BraveKnight {
    quest: Arc<dyn Quest>,
}

impl BraveKnight {
    pub fn new(quest: Arc<dyn Quest>) -> Self {
        Self { quest }
    }
}

impl Knight for BraveKnight {
    fn embark_on_quest(&self) {
        self.quest.embark();
    }
}

/// 营救少女
pub struct RescueDamselQuest {
    sink: Arc<dyn OutputSink>,
    embarked: AtomicUsize,
}

impl RescueDamselQuest {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            embarked: AtomicUsize::new(0),
        }
    }

    /// 出发次数
    pub fn times_embarked(&self) -> usize {
        self.embarked.load(Ordering::SeqCst)
    }
}

impl Quest for RescueDamselQuest {
    fn embark(&self) {
        self.embarked.fetch_add(1, Ordering::SeqCst);
        self.sink.write_line("Embarking on quest to rescue the damsel!");
    }
}

/// 营救少女的骑士
///
/// 自己在构造时创建探险，和探险紧耦合。容器只负责创建骑士本身。
pub struct DamselRescuingKnight {
    quest: RescueDamselQuest,
}

impl DamselRescuingKnight {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            quest: RescueDamselQuest::new(sink),
        }
    }

    pub fn quest(&self) -> &RescueDamselQuest {
        &self.quest
    }
}

impl Knight for DamselRescuingKnight {
    fn embark_on_quest(&self) {
        self.quest.embark();
    }
}
