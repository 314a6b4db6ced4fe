//! happyhex-data: datasets for the HappyHex autoplay models
//!
//! This crate provides:
//! - Delimited text records and whole-file load/store (`record`, `dataset` modules)
//! - The HappyHex board, pieces and game loop needed to produce valid positions
//!   (`hex`, `piece`, `engine`, `game` modules)
//! - Placement policies such as `NrSearchRank` (`algorithm` module)
//! - Training samples in the `board | queue | options` line format (`sample` module)
//! - Self-play generation with dropout and head/tail trimming (`generator` module)
//!
//! Quick start:
//! ```
//! use happyhex_data::algorithm::NrSearchRank;
//! use happyhex_data::config::GeneratorConfig;
//! use happyhex_data::generator::generate_training_data;
//! use happyhex_data::sample::{load_training_data, save_training_dataset};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let cfg = GeneratorConfig { engine_radius: 4, ..Default::default() };
//! let mut rng = StdRng::seed_from_u64(42);
//! let samples = generate_training_data(10, NrSearchRank::new(), &cfg, &mut rng).unwrap();
//!
//! let file = tempfile::NamedTempFile::new().unwrap();
//! save_training_dataset(&samples, file.path()).unwrap();
//! assert_eq!(load_training_data(file.path()).unwrap(), samples);
//! ```
//!
//! Generic records work without any game knowledge:
//! ```
//! use happyhex_data::dataset::Dataset;
//! use happyhex_data::record::{Field, Format};
//! use std::io::Cursor;
//!
//! let ds = Dataset::from_reader(Cursor::new("1,0,1,WIN\n0,1,0,LOSS\n"), Format::default()).unwrap();
//! assert_eq!(ds.records()[0].fields[3], Field::Symbol("WIN".into()));
//! ```
//!
pub mod algorithm;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod game;
pub mod generator;
pub mod hex;
pub mod piece;
pub mod record;
pub mod sample;
