pub mod clock;
pub mod diagnostics;
pub mod ipc;
pub mod judge_manager;
pub mod session;

pub use clock::*;
pub use diagnostics::*;
pub use ipc::*;
pub use judge_manager::*;
pub use session::*;
