pub mod labels;
pub mod layer;
pub mod symbology;

pub use layer::*;
pub use symbology::*;
