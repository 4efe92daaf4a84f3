pub mod cancel;
pub mod config;
pub mod error;
pub mod events;
pub mod floor_state_file;
pub mod mapgen;
pub mod types;

pub use cancel::CancelToken;
pub use config::{GeneratorConfig, RoomBudget};
pub use error::{ConfigError, GenerationError};
pub use events::{GenerationObserver, ObserverSet, publish_layout};
pub use floor_state_file::{FloorProgress, FloorStateFile};
pub use mapgen::{
    AdvanceResult, AdvanceStopReason, AttemptStats, DungeonGenerator, Layout, LayoutViolation,
    PlacedRoom, RejectReason, generate, generate_with_cancel, verify_layout,
};
pub use types::*;
