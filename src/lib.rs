// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Small real-time rendering toolkit built on wgpu.
//!
//! Primitiva bundles the pieces a toy renderer needs and nothing more: a
//! free-flying camera with lazily cached matrices, an [`object::Object3D`]
//! transform, procedural meshes, off-screen render targets with MSAA and
//! supersampling, and a [`renderer::Renderer`] that uploads geometry and
//! issues draw calls.
//!
//! # Key entry points
//!
//! - [`camera::Camera`] - view/projection with movement and rotation
//! - [`mesh`] - cube, plane and sphere generators
//! - [`target`] - framebuffer, MSAA and SSAA render targets
//! - [`renderer::Renderer`] - geometry upload and draw calls
//! - [`options::Options`] - TOML configuration
//!
//! # Architecture
//!
//! Everything runs on the caller's thread inside the host's frame loop.
//! GPU state is never implicit: command encoders, render passes and blit
//! destinations are passed explicitly so the ordering of draws is visible
//! at the call site. Matrix math and geometry generation have no GPU
//! dependency and can be used on their own.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod object;
pub mod options;
pub mod renderer;
pub mod target;
pub mod util;

pub use error::PrimitivaError;
