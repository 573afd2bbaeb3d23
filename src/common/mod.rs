//! Common types, traits, and error definitions for opendrive_spline
//!
//! This module provides the foundational building blocks shared by the
//! spline engine, the OpenDRIVE reader and the conversion pipeline.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
