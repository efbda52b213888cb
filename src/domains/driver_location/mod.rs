pub mod geo;
pub mod ports;
pub mod search;
pub mod types;
pub mod validation;

pub use geo::*;
pub use ports::*;
pub use search::*;
pub use types::*;
pub use validation::*;
