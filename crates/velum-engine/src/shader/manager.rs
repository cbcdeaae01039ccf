use std::fmt;

use thiserror::Error;

use crate::render::GpuDevice;

/// Closed set of shader roles, one per batch item kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShaderType {
    Texture = 1,
    Font = 2,
    Rectangle = 3,
}

impl ShaderType {
    pub const ALL: [ShaderType; 3] = [ShaderType::Texture, ShaderType::Font, ShaderType::Rectangle];
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ShaderError {
    #[error("The shader type value is out of range (expected 1..=3). Actual value was {0}.")]
    InvalidShaderType(u32),
}

impl TryFrom<u32> for ShaderType {
    type Error = ShaderError;

    fn try_from(value: u32) -> Result<Self, ShaderError> {
        match value {
            1 => Ok(Self::Texture),
            2 => Ok(Self::Font),
            3 => Ok(Self::Rectangle),
            other => Err(ShaderError::InvalidShaderType(other)),
        }
    }
}

/// Backend handle of a compiled program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub u32);

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader#{}", self.0)
    }
}

/// A compiled program and its debug name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderProgram {
    pub id: ShaderId,
    pub name: String,
}

/// Compiles the program for each role.
pub trait ShaderFactory {
    fn create_texture_shader(&mut self) -> ShaderProgram;
    fn create_font_shader(&mut self) -> ShaderProgram;
    fn create_rect_shader(&mut self) -> ShaderProgram;
}

/// Owns one program per [`ShaderType`], built once at construction.
#[derive(Debug, Clone)]
pub struct ShaderManager {
    texture: ShaderProgram,
    font: ShaderProgram,
    rect: ShaderProgram,
}

impl ShaderManager {
    pub fn new(factory: &mut dyn ShaderFactory) -> Self {
        let texture = factory.create_texture_shader();
        let font = factory.create_font_shader();
        let rect = factory.create_rect_shader();
        log::debug!(
            "shaders ready: {} ({}), {} ({}), {} ({})",
            texture.name, texture.id, font.name, font.id, rect.name, rect.id
        );
        Self { texture, font, rect }
    }

    #[inline]
    pub fn program(&self, ty: ShaderType) -> &ShaderProgram {
        match ty {
            ShaderType::Texture => &self.texture,
            ShaderType::Font => &self.font,
            ShaderType::Rectangle => &self.rect,
        }
    }

    #[inline]
    pub fn shader_id(&self, ty: ShaderType) -> ShaderId {
        self.program(ty).id
    }

    #[inline]
    pub fn shader_name(&self, ty: ShaderType) -> &str {
        &self.program(ty).name
    }

    /// Like [`shader_id`](Self::shader_id) for a raw role value.
    pub fn shader_id_for(&self, value: u32) -> Result<ShaderId, ShaderError> {
        Ok(self.shader_id(ShaderType::try_from(value)?))
    }

    /// Like [`shader_name`](Self::shader_name) for a raw role value.
    pub fn shader_name_for(&self, value: u32) -> Result<&str, ShaderError> {
        Ok(self.shader_name(ShaderType::try_from(value)?))
    }

    /// Makes the program for `ty` current on `device`.
    pub fn use_shader<D: GpuDevice + ?Sized>(&self, ty: ShaderType, device: &mut D) {
        device.use_program(self.shader_id(ty));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::tests::{DeviceCall, RecordingDevice};

    struct FakeFactory;

    impl ShaderFactory for FakeFactory {
        fn create_texture_shader(&mut self) -> ShaderProgram {
            ShaderProgram { id: ShaderId(123), name: "texture-shader".into() }
        }

        fn create_font_shader(&mut self) -> ShaderProgram {
            ShaderProgram { id: ShaderId(456), name: "font-shader".into() }
        }

        fn create_rect_shader(&mut self) -> ShaderProgram {
            ShaderProgram { id: ShaderId(789), name: "rectangle-shader".into() }
        }
    }

    fn manager() -> ShaderManager {
        ShaderManager::new(&mut FakeFactory)
    }

    #[test]
    fn ids_per_role() {
        let m = manager();
        assert_eq!(m.shader_id(ShaderType::Texture), ShaderId(123));
        assert_eq!(m.shader_id(ShaderType::Font), ShaderId(456));
        assert_eq!(m.shader_id(ShaderType::Rectangle), ShaderId(789));
    }

    #[test]
    fn names_per_role() {
        let m = manager();
        assert_eq!(m.shader_name(ShaderType::Texture), "texture-shader");
        assert_eq!(m.shader_name(ShaderType::Font), "font-shader");
        assert_eq!(m.shader_name(ShaderType::Rectangle), "rectangle-shader");
    }

    #[test]
    fn use_activates_only_that_role() {
        let m = manager();
        for (ty, id) in [
            (ShaderType::Texture, 123),
            (ShaderType::Font, 456),
            (ShaderType::Rectangle, 789),
        ] {
            let mut device = RecordingDevice::default();
            m.use_shader(ty, &mut device);
            assert_eq!(device.calls, vec![DeviceCall::UseProgram(ShaderId(id))]);
        }
    }

    #[test]
    fn role_values_round_trip() {
        for ty in ShaderType::ALL {
            assert_eq!(ShaderType::try_from(ty as u32), Ok(ty));
        }
    }

    #[test]
    fn out_of_range_role_reports_value() {
        let err = ShaderType::try_from(1234).unwrap_err();
        assert_eq!(err, ShaderError::InvalidShaderType(1234));
        assert!(err.to_string().contains("1234"));
        assert!(ShaderType::try_from(0).is_err());
    }

    #[test]
    fn raw_lookups_validate_range() {
        let m = manager();
        assert_eq!(m.shader_name_for(2), Ok("font-shader"));
        assert_eq!(m.shader_id_for(3), Ok(ShaderId(789)));

        let err = m.shader_name_for(1234).unwrap_err();
        assert!(err.to_string().contains("Actual value was 1234"));
    }
}
