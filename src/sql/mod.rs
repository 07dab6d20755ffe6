//! Safe SQL builder: identifiers are fixed table/column names, values are always parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
