pub mod interpolation;
pub mod projection;
pub mod transform;
