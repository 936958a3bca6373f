pub mod fdsn_client;
pub mod product_client;

pub use fdsn_client::*;
pub use product_client::*;
