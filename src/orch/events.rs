//! In-process observability events (`SPEC_FULL.md` §4: "ambient
//! observability, not a new feature area"). Not a transport — just a
//! `tokio::sync::broadcast` channel subscribers drain locally.

use crate::domain::ids::{BehaviorId, MissionId, TaskId};
use crate::domain::models::mission::MissionState;

#[derive(Debug, Clone)]
pub enum OrchEvent {
    TickCompleted { dt: f32, timestamp: i64 },
    MissionTransitioned { mission_id: MissionId, state: MissionState },
    TaskAssigned { task_id: TaskId },
    BehaviorDetected { behavior_id: BehaviorId },
}
