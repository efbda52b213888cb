pub mod driver_location;

pub use driver_location::*;
