pub mod input;
pub mod pad;
pub mod storage;
pub mod types;

pub use input::*;
pub use pad::*;
pub use storage::*;
pub use types::*;
