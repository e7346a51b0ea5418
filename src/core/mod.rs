pub mod matrix;
pub mod pipeline;
pub mod statistics;
pub mod token;

pub use crate::domain::model::{Matrix, RotateResponse, StatisticsResult};
pub use crate::domain::ports::{ConfigProvider, Credentials, StatisticsRelay};
pub use crate::utils::error::Result;
