//! Layout rendering: a CPU composition surface producing the final
//! raster at exact pixel geometry.
//!
//! [`RenderEngine`] owns the lazily-loaded font faces and enforces the
//! single-threaded access the compositor requires; [`compose`] holds
//! the actual drawing.

mod compose;
mod engine;

pub use compose::RenderOptions;
pub use engine::{Fonts, RenderEngine};
