mod aperture;
mod code;
mod design;
mod error;
mod geometry;
mod layer;
mod primitive;
mod registry;

pub use aperture::*;
pub use design::*;
pub use error::*;
pub use geometry::*;
/// re-export 'gerber_types' crate
#[cfg(feature = "types")]
pub use gerber_types;
pub use layer::*;
pub use primitive::*;
pub use registry::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
