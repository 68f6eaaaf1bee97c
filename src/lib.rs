pub mod authors;
pub mod catalog;
pub mod core;
pub mod quotes;
pub mod utils;
