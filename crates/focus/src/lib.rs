//! Field selection and viewport focus for an oil-field map.
//!
//! The host owns the event loop, the router and the actual drawing; this
//! crate reconciles route changes, clicks and the feature-data load into a
//! single highlighted field and a single view.

pub mod config;
pub mod controller;
pub mod navigation;
pub mod surface;

pub use config::*;
pub use controller::*;
pub use navigation::*;
pub use surface::*;
