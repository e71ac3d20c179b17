pub mod chart_file;
pub mod model;
pub mod validate;

pub use chart_file::*;
pub use model::*;
pub use validate::*;
