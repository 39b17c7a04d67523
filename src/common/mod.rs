//! Common types, traits, and error definitions for journey_control
//!
//! This module provides the value types (poses, journeys, curves), the
//! controller interface and the error type shared by every strategy.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
