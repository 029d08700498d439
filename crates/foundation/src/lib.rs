pub mod bounds;
pub mod math;
pub mod slug;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use slug::*;
