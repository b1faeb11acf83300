//! Rendering collaborator seam.
//!
//! # Responsibility
//! - Define the rasterization interface consumed by the batch render
//!   pipeline; the conversion itself is delegated.
//!
//! # Invariants
//! - Renderers are pure byte transforms; file I/O stays in the pipeline.

use crate::model::manifest::{EffectiveRenderOptions, OutputFormat};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod batch_render;

pub use batch_render::{render_manifest, RenderBatchOptions, RenderItemError, RenderedItem};

/// Failure reported by a rendering backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend cannot produce the requested output format.
    UnsupportedFormat(OutputFormat),
    /// The backend rejected or failed on the input document.
    Backend(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => {
                write!(f, "renderer does not support `{}` output", format.as_str())
            }
            Self::Backend(message) => write!(f, "render backend failed: {message}"),
        }
    }
}

impl Error for RenderError {}

/// Converts SVG bytes into the requested output encoding.
///
/// `Sync` so batch workers can share one renderer by reference.
pub trait IconRenderer: Sync {
    fn render(&self, svg: &[u8], options: &EffectiveRenderOptions) -> Result<Vec<u8>, RenderError>;
}

/// Renderer for `svg` outputs: applies the requested color and passes the
/// document through unchanged otherwise.
pub struct SvgPassthrough;

impl IconRenderer for SvgPassthrough {
    fn render(&self, svg: &[u8], options: &EffectiveRenderOptions) -> Result<Vec<u8>, RenderError> {
        if options.format != OutputFormat::Svg {
            return Err(RenderError::UnsupportedFormat(options.format));
        }

        let Some(color) = options.color.as_deref() else {
            return Ok(svg.to_vec());
        };
        let text = String::from_utf8(svg.to_vec())
            .map_err(|_| RenderError::Backend("svg document is not valid UTF-8".to_string()))?;
        // Catalog SVGs use `currentColor` as the recoloring hook.
        Ok(text.replace("currentColor", color).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::{IconRenderer, RenderError, SvgPassthrough};
    use crate::model::manifest::{EffectiveRenderOptions, OutputFormat};

    fn options(format: OutputFormat, color: Option<&str>) -> EffectiveRenderOptions {
        EffectiveRenderOptions {
            size: 24,
            color: color.map(str::to_string),
            format,
        }
    }

    #[test]
    fn passthrough_keeps_bytes_without_color() {
        let svg = b"<svg fill=\"currentColor\"/>";
        let out = SvgPassthrough
            .render(svg, &options(OutputFormat::Svg, None))
            .expect("render should succeed");
        assert_eq!(out, svg);
    }

    #[test]
    fn passthrough_applies_color() {
        let svg = b"<svg fill=\"currentColor\"/>";
        let out = SvgPassthrough
            .render(svg, &options(OutputFormat::Svg, Some("#ff0000")))
            .expect("render should succeed");
        assert_eq!(out, b"<svg fill=\"#ff0000\"/>");
    }

    #[test]
    fn passthrough_rejects_raster_formats() {
        let err = SvgPassthrough
            .render(b"<svg/>", &options(OutputFormat::Png, None))
            .expect_err("png must be rejected");
        assert_eq!(err, RenderError::UnsupportedFormat(OutputFormat::Png));
    }
}
