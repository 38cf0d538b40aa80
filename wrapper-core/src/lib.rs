pub mod controller;
pub mod endpoint;
mod error;
pub mod form;
pub mod model;
pub mod state;

pub use error::{Error, FailureKind, Result};
