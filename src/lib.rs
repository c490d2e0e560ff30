//! Trigger-week and climate-lag derivation for weekly dengue case series.
//!
//! A weekly table of case counts and climate aggregates is split per district
//! or block, each unit's series is evaluated against breeding-suitability
//! thresholds, and the week a sustained case rise begins is located. Lags
//! measure how long each climate condition held before that week.

mod ioutil;
mod error;
mod progress;
mod record;
mod selection;
mod series;
mod threshold;
mod trigger;
mod lag;
mod analysis;
pub mod config;

pub use ioutil::{magic_open, fetch_once, open_input};
pub use error::*;
pub use progress::*;
pub use record::*;
pub use selection::*;
pub use series::*;
pub use threshold::*;
pub use trigger::*;
pub use lag::*;
pub use analysis::*;
