pub mod field;
pub mod layout;
pub mod region;

pub use field::*;
pub use layout::*;
pub use region::*;
