//! Draftforge Project Model
//!
//! Defines the core data contracts for draft exports:
//! - **Timeline:** the ordered clips chosen by the user
//! - **Catalogs:** effect/transition/animation name → resource lookups
//! - **Draft:** the typed document written for the external editor
//! - **Ids:** per-export identifier generation
//!
//! All durations and offsets are microseconds.

pub mod catalog;
pub mod draft;
pub mod ids;
pub mod timeline;

pub use catalog::*;
pub use draft::*;
pub use ids::*;
pub use timeline::*;
