pub mod histogram;
pub mod screenshot;
pub mod transform;
