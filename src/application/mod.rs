pub mod bootstrap;
pub mod driver_location_service;

pub use bootstrap::*;
pub use driver_location_service::*;
