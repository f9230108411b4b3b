pub mod patterns;
pub mod scripting;
pub mod stencils;
