// -- Lint policy ---------------------------------------------------------
// Package-level lints live in Cargo.toml; these are the crate-local extras.

// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU index buffers and binding-state caching for tile-based map
//! rendering.
//!
//! Binding calls are expensive in immediate-mode graphics APIs, so every
//! binding goes through a per-context cache that drops redundant calls.
//! Index buffers are created, bound, patched, and destroyed against that
//! context.
//!
//! # Key entry points
//!
//! - [`gpu::Context`] - device handle plus binding caches
//! - [`gpu::IndexBuffer`] - index buffer lifecycle
//! - [`gpu::GpuDevice`] - driver primitives; implemented by
//!   [`gpu::wgpu_device::WgpuDevice`], [`gpu::recording::RecordingDevice`],
//!   and (with the `glow` feature) `gpu::glow_device::GlowDevice`
//! - [`index_array`] - triangle and line index arrays
//! - [`query`] - hit-testing geometry helpers
//! - [`options::Options`] - TOML-backed configuration

pub mod error;
pub mod gpu;
pub mod index_array;
pub mod options;
pub mod query;

pub use error::TileGpuError;
pub use gpu::{Context, IndexBuffer};
pub use index_array::{IndexSource, LineIndexArray, TriangleIndexArray};
