//! Publishes processed AMISR experiments to the experiment catalog.
//!
//! Each experiment directory carries a `Madrigal.ini` descriptor listing data
//! files and their summary figures. The files are classified into catalog
//! sections, deduplicated, copied into per-section directories and described
//! by a `Data.ini` manifest.

pub mod app;
pub mod classify;
pub mod config;
pub mod descriptor;
pub mod domain;
pub mod error;
pub mod figures;
pub mod ledger;
pub mod link;
pub mod manifest;
pub mod output;
pub mod render;
pub mod slots;
pub mod store;
