use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Inverse-distance falloff: `1 / (constant + linear * d + exponent * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }
}

impl Default for Attenuation {
    /// No falloff.
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// Colour and strength shared by every light kind.
///
/// Colour channels are linear RGB and conventionally in `[0, 1]`; nothing here
/// clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub color: Vec3,
    pub intensity: f32,
}

impl Emission {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

impl Default for Emission {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0)
    }
}

/// Omnidirectional light at a world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointLight {
    pub emission: Emission,
    pub position: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn new(color: Vec3, position: Vec3, intensity: f32) -> Self {
        Self {
            emission: Emission::new(color, intensity),
            position,
            attenuation: Attenuation::default(),
        }
    }

    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }
}

/// Point light restricted to a cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub point: PointLight,
    pub cone_direction: Vec3,
    /// Cosine of the cutoff angle.
    cutoff: f32,
}

impl SpotLight {
    /// `cutoff_degrees` is converted to its cosine once, here.
    pub fn new(point: PointLight, cone_direction: Vec3, cutoff_degrees: f32) -> Self {
        Self {
            point,
            cone_direction,
            cutoff: cutoff_degrees.to_radians().cos(),
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn set_cutoff_degrees(&mut self, cutoff_degrees: f32) {
        self.cutoff = cutoff_degrees.to_radians().cos();
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(PointLight::default(), Vec3::NEG_Z, 180.0)
    }
}

/// Light infinitely far away, shining along `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub emission: Emission,
    pub direction: Vec3,
}

impl DirectionalLight {
    pub fn new(color: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            emission: Emission::new(color, intensity),
            direction,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::ONE, Vec3::NEG_Y, 1.0)
    }
}

/// Any supported light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Point(PointLight),
    Spot(SpotLight),
    Directional(DirectionalLight),
}

impl Light {
    pub fn emission(&self) -> Emission {
        match self {
            Light::Point(p) => p.emission,
            Light::Spot(s) => s.point.emission,
            Light::Directional(d) => d.emission,
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_cutoff_is_stored_as_cosine() {
        let spot = SpotLight::new(PointLight::default(), Vec3::NEG_Z, 140.0);
        assert!((spot.cutoff() - (-0.766_044_4)).abs() < 1e-5);
    }

    #[test]
    fn spot_cutoff_can_be_changed() {
        let mut spot = SpotLight::default();
        spot.set_cutoff_degrees(60.0);
        assert!((spot.cutoff() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn default_attenuation_has_no_falloff() {
        let att = Attenuation::default();
        assert_eq!((att.constant, att.linear, att.exponent), (1.0, 0.0, 0.0));
    }

    #[test]
    fn emission_is_reachable_for_every_variant() {
        let point = PointLight::new(Vec3::X, Vec3::ZERO, 0.5);
        let spot = SpotLight::new(point, Vec3::NEG_Z, 30.0);
        let dir = DirectionalLight::new(Vec3::Y, Vec3::NEG_Y, 2.0);
        assert_eq!(Light::from(point).emission().intensity, 0.5);
        assert_eq!(Light::from(spot).emission().color, Vec3::X);
        assert_eq!(Light::from(dir).emission(), Emission::new(Vec3::Y, 2.0));
    }
}
