pub mod enums;
pub mod report;
pub mod session;
pub mod specialist;

pub use enums::*;
pub use report::*;
pub use session::*;
pub use specialist::*;
