//! HTTP server for the framecast image-delivery pipeline.
//!
//! The interesting work happens in [`delivery`]: panel resolution,
//! photo selection under the non-repetition policy, smart collage,
//! layout rendering, the converter bridge, and the ephemeral thumbnail
//! cache. [`routes`] wires that into axum handlers; the management
//! surface (devices, gallery, tokens, settings) lives there too.

pub mod config;
pub mod delivery;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
