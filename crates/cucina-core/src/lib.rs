//! Cucina Core Library
//!
//! Domain models, control state and the wire protocol for the live
//! kitchen dashboard.

pub mod controls;
pub mod error;
pub mod producer;
pub mod snapshot;

pub use error::{CucinaError, CucinaResult};
