pub mod analyzers;
pub mod error;
pub mod output;
pub mod parser;
pub mod report;
pub mod salary;
pub mod text;
pub mod vacancy;

pub use analyzers::dataset::{Dataset, RowPolicy};
pub use analyzers::filter::TitleFilter;
pub use error::{Result, StatsError};
