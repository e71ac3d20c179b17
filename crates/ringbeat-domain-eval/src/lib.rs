pub mod action;
pub mod generator;
pub mod judge;
pub mod slide_path;

pub use action::*;
pub use generator::*;
pub use judge::*;
pub use slide_path::*;
