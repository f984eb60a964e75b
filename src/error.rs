use thiserror::Error;

/// Errors from the mask builder and the rendering engine.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("svg error: {0}")]
    Svg(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("invalid input: {0}")]
    Input(String),
}
