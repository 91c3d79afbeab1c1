/// Errors from GPU resource creation and uniform handling.
///
/// Everything here is a setup error except `Backend`, which a GPU backend may
/// also raise mid-frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("uniform `{name}` not found in program `{program}`")]
    UniformNotFound { program: String, name: String },
    #[error("uniform `{name}` was never created on program `{program}`")]
    UniformNotRegistered { program: String, name: String },
    #[error("uniform `{name}` of program `{program}` expects a {expected} value")]
    UniformType {
        program: String,
        name: String,
        expected: &'static str,
    },
    #[error("{stage} shader of program `{program}` failed to compile: {log}")]
    ShaderCompile {
        program: String,
        stage: &'static str,
        log: String,
    },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("invalid texture: {0}")]
    InvalidTexture(String),
    #[error("renderer used before init")]
    NotInitialized,
    #[error("GPU backend error: {0}")]
    Backend(String),
}
