//! Geometry and gesture primitives for radial menus.
//!
//! Angles are radians measured clockwise from north (screen "up"), which is
//! the convention every module in this crate shares.

pub mod angle;
pub mod arc;
pub mod color;
pub mod macros;
pub mod numbers;
pub mod point;
pub mod trace;

pub use arc::ArcDefinition;
pub use point::Point;
