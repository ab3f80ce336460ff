pub mod isbn;

pub use isbn::{ean13_check_digit, extract_isbn, to_isbn13};
