pub mod price;
pub mod provider;

pub use price::*;
pub use provider::*;
