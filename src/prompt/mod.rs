pub mod compiler;
pub mod profile;
