pub mod database;
pub mod etl;
pub mod html_table;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{CountryGdp, QueryOutput, RawCountryRow, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
