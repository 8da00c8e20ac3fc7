//! Feature engineering: RUL labeling, rolling statistics, dataset assembly
//!
//! The three stages run strictly one way and each returns a new table:
//! - [`labeling`] derives remaining useful life and the failure label
//! - [`rolling`] adds per-unit trailing mean/std for the key sensors
//! - [`assemble`] merges everything into the model-ready feature/label table

pub mod assemble;
pub mod labeling;
pub mod rolling;

pub use assemble::{assemble_dataset, AssembledDataset};
pub use labeling::label_readings;
pub use rolling::build_rolling_features;
