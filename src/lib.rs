//! Query building and transactional execution for record catalogs.
//!
//! Everything lives in `stow-core`, backends are separate crates
//! (`stow-sqlite`, `stow-postgres`) registered on a [`Registry`].
pub use stow_core::*;
