// Domain value objects
pub mod filter;
pub mod identifiers;
pub mod time_window;

pub use filter::*;
pub use identifiers::*;
pub use time_window::*;
