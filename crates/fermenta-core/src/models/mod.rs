pub mod beer;
pub mod brewery;

pub use beer::*;
pub use brewery::*;
