pub mod books;
pub mod builders;
pub mod cli;
pub mod error;
pub mod finalize;
pub mod manifest;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod records;
pub mod reference;
pub mod schema;
pub mod settings;
pub mod sources;
pub mod writer;

pub use error::{PackError, Result};
