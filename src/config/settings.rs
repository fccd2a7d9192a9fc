use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::{Serialize, Deserialize};
use thiserror::Error;

const CONFIG_FILE: &str = "room.toml";

// =============================================================================
// Room Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("attenuation interval must be at least one frame")]
    ZeroInterval,
    #[error("attenuation cutoff must be positive, got {0}")]
    InvalidCutoff(f32),
    #[error("attenuation reference must be positive, got {0}")]
    InvalidReference(f32),
    #[error("camera clip planes must satisfy 0 < near < far, got {near}..{far}")]
    InvalidClipPlanes { near: f32, far: f32 },
}

/// Distance falloff and how often it is recomputed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttenuationSettings {
    /// Squared distance beyond which a participant is silent
    pub cutoff_sq: f32,
    /// Squared distance inside which a participant is at full volume
    pub reference_sq: f32,
    /// Recompute gains every this many frames
    pub interval_frames: u64,
}

impl Default for AttenuationSettings {
    fn default() -> Self {
        Self {
            cutoff_sq: 500.0,
            reference_sq: 10.0,
            interval_frames: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// World units per frame
    pub move_speed: f32,
    /// Radians per frame
    pub turn_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye: [0.0, 5.0, 8.0],
            target: [0.0, 0.0, -3.0],
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            move_speed: 0.1,
            turn_speed: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enable_sound: bool,
    pub master_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enable_sound: true,
            master_volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogSettings {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

/// Textured sphere surrounding the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackdropSettings {
    pub texture: String,
    pub radius: f32,
    pub position: [f32; 3],
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    pub background: u32,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub directional_color: u32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub fog: Option<FogSettings>,
    pub backdrop: Option<BackdropSettings>,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            background: 0xadd8e6, // light blue
            ambient_color: 0xffaabb,
            ambient_intensity: 1.0,
            directional_color: 0xffaabb,
            directional_intensity: 0.85,
            directional_position: [-5.0, 3.0, -5.0],
            fog: Some(FogSettings {
                color: 0xffffff,
                near: -3.0,
                far: 50.0,
            }),
            backdrop: Some(BackdropSettings {
                texture: "sky.jpg".to_string(),
                radius: 20.0,
                position: [0.0, 4.5, 0.0],
                yaw: 0.45 * std::f32::consts::PI,
            }),
        }
    }
}

/// One static model in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurniturePiece {
    pub name: String,
    pub model: String,
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub yaw: f32,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl FurniturePiece {
    fn chair(name: &str, position: [f32; 3], yaw: f32) -> Self {
        Self {
            name: name.to_string(),
            model: "chair.glb".to_string(),
            position,
            scale: [0.6, 0.7, 0.6],
            yaw,
        }
    }
}

/// Two rows of chairs facing each other across a table
pub fn default_furniture() -> Vec<FurniturePiece> {
    vec![
        FurniturePiece::chair("chair-back-left", [-0.8, 0.0, -2.0], 0.0),
        FurniturePiece::chair("chair-back-middle", [0.6, 0.0, -2.0], 0.0),
        FurniturePiece::chair("chair-back-right", [2.0, 0.0, -2.0], 0.0),
        FurniturePiece::chair("chair-front-right", [1.0, 0.0, 2.0], 3.2),
        FurniturePiece::chair("chair-front-middle", [-0.4, 0.0, 2.0], 3.2),
        FurniturePiece::chair("chair-front-left", [-1.8, 0.0, 2.0], 3.2),
        FurniturePiece {
            name: "table".to_string(),
            model: "table.glb".to_string(),
            position: [0.0, -1.5, 0.0],
            scale: [0.03, 0.03, 0.03],
            yaw: 0.0,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory model paths are resolved against
    pub root: PathBuf,
    /// Model swapped in for the placeholder head once loaded
    pub avatar_model: Option<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            avatar_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub attenuation: AttenuationSettings,
    pub camera: CameraSettings,
    pub audio: AudioSettings,
    pub environment: EnvironmentSettings,
    pub assets: AssetSettings,
    pub furniture: Vec<FurniturePiece>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            attenuation: AttenuationSettings::default(),
            camera: CameraSettings::default(),
            audio: AudioSettings::default(),
            environment: EnvironmentSettings::default(),
            assets: AssetSettings::default(),
            furniture: default_furniture(),
        }
    }
}

impl RoomSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let attenuation = &self.attenuation;
        if attenuation.interval_frames == 0 {
            return Err(SettingsError::ZeroInterval);
        }
        if !(attenuation.cutoff_sq > 0.0) {
            return Err(SettingsError::InvalidCutoff(attenuation.cutoff_sq));
        }
        if !(attenuation.reference_sq > 0.0) {
            return Err(SettingsError::InvalidReference(attenuation.reference_sq));
        }
        let camera = &self.camera;
        if !(camera.znear > 0.0 && camera.znear < camera.zfar) {
            return Err(SettingsError::InvalidClipPlanes {
                near: camera.znear,
                far: camera.zfar,
            });
        }
        Ok(())
    }

    /// Parse and validate. Missing sections fall back to defaults.
    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let settings: RoomSettings = toml::from_str(data)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&data)
    }
}

// Room configuration file management
fn room_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "roomcast", "roomcast")
        .map(|proj| proj.config_dir().join(CONFIG_FILE))
}

pub fn save_room_settings(settings: &RoomSettings) -> std::io::Result<()> {
    if let Some(path) = room_config_path() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, toml)?;
    }
    Ok(())
}

pub fn load_room_settings() -> Option<RoomSettings> {
    if let Some(path) = room_config_path() {
        if let Ok(data) = fs::read_to_string(path) {
            if let Ok(settings) = RoomSettings::from_toml_str(&data) {
                return Some(settings);
            }
        }
    }
    None
}
