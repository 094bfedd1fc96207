use crate::pipeline::PipelineResult;
use crate::projection::Viewport;

/// Consumer of a finished pipeline run.
pub trait Renderer {
    type Error;

    fn render(&mut self, result: &PipelineResult, viewport: Viewport) -> Result<(), Self::Error>;
}
