pub mod field;
pub mod picking;
pub mod selection;
pub mod store;

pub use field::*;
pub use store::*;
