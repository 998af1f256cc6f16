pub mod base;
pub mod parser;

pub use base::{Base, Direction, Formula, SortRule, View, ViewType};
pub use parser::BaseError;
