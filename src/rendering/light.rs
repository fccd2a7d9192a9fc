use crate::config::EnvironmentSettings;
use crate::utils::math::{rgb_from_hex, vec3_from_array};
use cgmath::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vector3<f32>,
    pub intensity: f32,
    // Only meaningful for directional lights, which aim at the origin
    pub position: Option<Point3<f32>>,
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    pub color: Vector3<f32>,
    pub near: f32,
    pub far: f32,
}

/// Background, lights and fog of the room
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub background: Vector3<f32>,
    pub lights: Vec<Light>,
    pub fog: Option<Fog>,
}

impl Environment {
    pub fn from_settings(settings: &EnvironmentSettings) -> Self {
        let ambient = Light {
            kind: LightKind::Ambient,
            color: vec3_from_array(rgb_from_hex(settings.ambient_color)),
            intensity: settings.ambient_intensity,
            position: None,
            cast_shadow: false,
        };
        let p = settings.directional_position;
        let directional = Light {
            kind: LightKind::Directional,
            color: vec3_from_array(rgb_from_hex(settings.directional_color)),
            intensity: settings.directional_intensity,
            position: Some(Point3::new(p[0], p[1], p[2])),
            cast_shadow: true,
        };
        let fog = settings.fog.as_ref().map(|fog| Fog {
            color: vec3_from_array(rgb_from_hex(fog.color)),
            near: fog.near,
            far: fog.far,
        });

        Self {
            background: vec3_from_array(rgb_from_hex(settings.background)),
            lights: vec![ambient, directional],
            fog,
        }
    }
}
