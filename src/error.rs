#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("drawing surface is unavailable")]
    SurfaceUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("identity classifier unavailable: {0}")]
    Unavailable(String),
}
