pub mod amm;
pub mod builder;
pub mod token;

pub use amm::*;
pub use builder::*;
pub use token::*;
