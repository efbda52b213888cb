pub mod in_memory_index;
pub mod postgres_index;

pub use in_memory_index::*;
pub use postgres_index::*;
