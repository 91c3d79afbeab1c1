use cadence_scene::{DirectionalLight, Material, PointLight, SpotLight};
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;

use crate::error::RenderError;

pub const PROJECTION_MATRIX: &str = "projection_matrix";
pub const MODEL_VIEW_MATRIX: &str = "model_view_matrix";
pub const TEXTURE_SAMPLER: &str = "texture_sampler";
pub const SPECULAR_POWER: &str = "specular_power";
pub const AMBIENT_LIGHT: &str = "ambient_light";
pub const MATERIAL: &str = "material";
pub const POINT_LIGHT: &str = "point_light";
pub const SPOT_LIGHT: &str = "spot_light";
pub const DIRECTIONAL_LIGHT: &str = "directional_light";

const MATERIAL_FIELDS: [&str; 5] = ["ambient", "diffuse", "specular", "has_texture", "reflectance"];
const POINT_LIGHT_FIELDS: [&str; 6] = [
    "color",
    "position",
    "intensity",
    "attenuation.constant",
    "attenuation.linear",
    "attenuation.exponent",
];
const DIRECTIONAL_LIGHT_FIELDS: [&str; 3] = ["color", "direction", "intensity"];

/// A value uploadable to a single uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// Name to location table owned by one shader program.
///
/// `L` is whatever the backend addresses a uniform by.
#[derive(Debug, Clone)]
pub struct UniformLocations<L> {
    program: String,
    locations: HashMap<String, L>,
}

impl<L: Copy> UniformLocations<L> {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            locations: HashMap::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn insert(&mut self, name: &str, location: L) {
        self.locations.insert(name.to_owned(), location);
    }

    /// Location of a uniform previously created on this program.
    pub fn get(&self, name: &str) -> Result<L, RenderError> {
        self.locations
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::UniformNotRegistered {
                program: self.program.clone(),
                name: name.to_owned(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Error for a name the linked program does not expose.
    pub fn not_found(&self, name: &str) -> RenderError {
        RenderError::UniformNotFound {
            program: self.program.clone(),
            name: name.to_owned(),
        }
    }
}

/// A linked shader program.
///
/// Structured uniforms (material, lights) are flattened into dotted member
/// names, e.g. `point_light.attenuation.linear`.
pub trait ShaderProgram {
    fn name(&self) -> &str;

    /// Resolve `name` in the linked program and remember its location.
    fn create_uniform(&mut self, name: &str) -> Result<(), RenderError>;

    /// Fails if `name` was never created.
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError>;

    fn bind(&mut self);

    fn unbind(&mut self);

    /// Free the program. Calling it again does nothing.
    fn release(&mut self);

    fn create_material_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        for field in MATERIAL_FIELDS {
            self.create_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    fn create_point_light_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        for field in POINT_LIGHT_FIELDS {
            self.create_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    fn create_spot_light_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        self.create_point_light_uniform(&format!("{name}.point_light"))?;
        self.create_uniform(&format!("{name}.cone_direction"))?;
        self.create_uniform(&format!("{name}.cutoff"))
    }

    fn create_directional_light_uniform(&mut self, name: &str) -> Result<(), RenderError> {
        for field in DIRECTIONAL_LIGHT_FIELDS {
            self.create_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    fn set_material(&mut self, name: &str, material: &Material) -> Result<(), RenderError> {
        self.set_uniform(&format!("{name}.ambient"), material.ambient.into())?;
        self.set_uniform(&format!("{name}.diffuse"), material.diffuse.into())?;
        self.set_uniform(&format!("{name}.specular"), material.specular.into())?;
        self.set_uniform(
            &format!("{name}.has_texture"),
            i32::from(material.has_texture()).into(),
        )?;
        self.set_uniform(&format!("{name}.reflectance"), material.reflectance.into())
    }

    fn set_point_light(&mut self, name: &str, light: &PointLight) -> Result<(), RenderError> {
        self.set_uniform(&format!("{name}.color"), light.emission.color.into())?;
        self.set_uniform(&format!("{name}.position"), light.position.into())?;
        self.set_uniform(&format!("{name}.intensity"), light.emission.intensity.into())?;
        let att = light.attenuation;
        self.set_uniform(&format!("{name}.attenuation.constant"), att.constant.into())?;
        self.set_uniform(&format!("{name}.attenuation.linear"), att.linear.into())?;
        self.set_uniform(&format!("{name}.attenuation.exponent"), att.exponent.into())
    }

    fn set_spot_light(&mut self, name: &str, light: &SpotLight) -> Result<(), RenderError> {
        self.set_point_light(&format!("{name}.point_light"), &light.point)?;
        self.set_uniform(&format!("{name}.cone_direction"), light.cone_direction.into())?;
        self.set_uniform(&format!("{name}.cutoff"), light.cutoff().into())
    }

    fn set_directional_light(
        &mut self,
        name: &str,
        light: &DirectionalLight,
    ) -> Result<(), RenderError> {
        self.set_uniform(&format!("{name}.color"), light.emission.color.into())?;
        self.set_uniform(&format!("{name}.direction"), light.direction.into())?;
        self.set_uniform(&format!("{name}.intensity"), light.emission.intensity.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Program that accepts every name and keeps the last value per uniform.
    struct Recorder {
        locations: UniformLocations<usize>,
        values: Vec<Option<UniformValue>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                locations: UniformLocations::new("recorder"),
                values: Vec::new(),
            }
        }

        fn value(&self, name: &str) -> Option<UniformValue> {
            self.values[self.locations.get(name).ok()?]
        }
    }

    impl ShaderProgram for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn create_uniform(&mut self, name: &str) -> Result<(), RenderError> {
            self.locations.insert(name, self.values.len());
            self.values.push(None);
            Ok(())
        }

        fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), RenderError> {
            let loc = self.locations.get(name)?;
            self.values[loc] = Some(value);
            Ok(())
        }

        fn bind(&mut self) {}
        fn unbind(&mut self) {}
        fn release(&mut self) {}
    }

    #[test]
    fn spot_light_group_nests_point_light_members() {
        let mut p = Recorder::new();
        p.create_spot_light_uniform(SPOT_LIGHT).unwrap();
        assert_eq!(p.locations.len(), 8);
        assert!(p.locations.contains("spot_light.point_light.attenuation.exponent"));
        assert!(p.locations.contains("spot_light.cutoff"));
    }

    #[test]
    fn material_has_texture_is_uploaded_as_int() {
        let mut p = Recorder::new();
        p.create_material_uniform(MATERIAL).unwrap();
        p.set_material(MATERIAL, &Material::default()).unwrap();
        assert_eq!(p.value("material.has_texture"), Some(UniformValue::Int(0)));
        assert_eq!(p.value("material.diffuse"), Some(UniformValue::Vec4(Vec4::ONE)));
    }

    #[test]
    fn setting_an_uncreated_uniform_fails_with_its_name() {
        let mut p = Recorder::new();
        let err = p.set_uniform(SPECULAR_POWER, 10.0_f32.into()).unwrap_err();
        assert!(matches!(err, RenderError::UniformNotRegistered { .. }));
        assert!(err.to_string().contains("specular_power"));
    }

    #[test]
    fn spot_light_uploads_cosine_cutoff() {
        let mut p = Recorder::new();
        p.create_spot_light_uniform(SPOT_LIGHT).unwrap();
        let spot = SpotLight::new(PointLight::default(), Vec3::NEG_Z, 140.0);
        p.set_spot_light(SPOT_LIGHT, &spot).unwrap();
        let Some(UniformValue::Float(cutoff)) = p.value("spot_light.cutoff") else {
            panic!("cutoff not uploaded");
        };
        assert!((cutoff + 0.766).abs() < 1e-3);
    }
}
