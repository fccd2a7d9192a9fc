// Roomcast: a shared 3D room for multi-participant video chat
// Presence sync, audio attenuation and the frame loop

pub mod utils;
pub mod config;
pub mod world;
pub mod audio;
pub mod assets;
pub mod rendering;
pub mod networking;
pub mod room;
pub mod app;

// Re-export commonly used types for convenience
pub use world::{ParticipantId, Pose, PresenceError, PresenceResult};
pub use room::Room;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
