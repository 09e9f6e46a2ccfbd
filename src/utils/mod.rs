pub mod errors;
pub mod rng;
pub mod table;

pub use errors::{extract_clean_error, ChartError};
pub use rng::{seed_from_id, Lcg};
pub use table::Table;
