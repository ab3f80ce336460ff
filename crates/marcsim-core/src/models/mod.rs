pub mod field_set;
pub mod record;

pub use field_set::*;
pub use record::*;
