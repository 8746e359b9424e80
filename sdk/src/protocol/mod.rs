pub mod amount;
pub mod pair;
pub mod pda;

pub use amount::*;
pub use pair::*;
pub use pda::*;
