//! OPC Core
//!
//! Data model, attribute schemas, identifier codec and list normalization
//! shared by the Oracle Public Cloud provider.

pub mod error;
pub mod id;
pub mod normalize;
pub mod provider;
pub mod resource;
pub mod schema;

pub use error::{Error, Result};
