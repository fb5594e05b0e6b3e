//! Analysis over combined city-day records.
//!
//! [`quality`] produces the data-quality report, [`report`] renders it as
//! text, and [`patterns`] looks at how demand moves with temperature,
//! weekday and season.

pub mod patterns;
pub mod quality;
pub mod report;
pub mod types;
pub mod utility;
