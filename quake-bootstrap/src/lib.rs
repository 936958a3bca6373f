// Quakecat bootstrap: wires the layers together and drives one export run.

pub mod context;
pub mod lifecycle;

pub use context::AppContext;
pub use lifecycle::{run, RunOptions};
