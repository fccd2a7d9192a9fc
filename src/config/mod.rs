pub mod settings;

// Re-export commonly used types
pub use settings::{
    RoomSettings, AttenuationSettings, CameraSettings, AudioSettings, EnvironmentSettings,
    FogSettings, BackdropSettings, AssetSettings, FurniturePiece, SettingsError,
    default_furniture, save_room_settings, load_room_settings,
};
