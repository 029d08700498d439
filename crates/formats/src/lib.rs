pub mod field_collection;

pub use field_collection::*;
