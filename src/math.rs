pub mod camera;
pub mod ease;
pub mod interp;
pub mod transform;
