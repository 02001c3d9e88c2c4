//! Request and response shapes exchanged with the backend.
//!
//! Only the structure the client depends on is modelled; unknown response
//! keys are ignored.

pub mod region_info;
pub mod request;

pub use region_info::*;
pub use request::*;
