//! Shader roles and the manager that maps them to compiled programs.

pub mod manager;

pub use manager::{ShaderError, ShaderFactory, ShaderId, ShaderManager, ShaderProgram, ShaderType};
