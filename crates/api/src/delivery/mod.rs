//! The image-delivery pipeline.
//!
//! One request flows panel → selector (or collage / AI) → renderer →
//! converter bridge → served-thumbnail cache, with the history append
//! running fire-and-forget behind the response.

pub mod ai;
pub mod calendar;
pub mod collage;
pub mod history;
pub mod panel;
pub mod pipeline;
pub mod processor;
pub mod render;
pub mod selector;
pub mod served_cache;
pub mod weather;
