pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;
pub mod url;

pub use error::{Error, Result};
pub use index::{build, merge, InvertedIndex, Page, Position};
pub use persist::LoadStatus;
