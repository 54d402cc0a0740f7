//! Reading, checking and serving Qt Linguist `.ts` translation catalogs.
//!
//! The catalogs are parsed into [`model::catalog::Catalog`], validated with
//! [`services::qa`], kept in step with the reference locale by
//! [`services::sync`] and queried at runtime through
//! [`services::lookup::Translator`], which falls back to the source phrase
//! whenever no translation is available.

pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use error::{CoreError, Result};
