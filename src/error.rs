use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read descriptor {path}: {message}")]
    #[diagnostic(help("the experiment directory must contain a readable Madrigal.ini"))]
    DescriptorRead { path: PathBuf, message: String },

    #[error("malformed descriptor at line {line}: {message}")]
    DescriptorParse { line: usize, message: String },

    #[error("descriptor section [{section}] is missing field `{field}`")]
    MissingField { section: String, field: String },

    #[error("descriptor section [{section}] field `{field}` has invalid value `{value}`")]
    InvalidField {
        section: String,
        field: String,
        value: String,
    },

    #[error("could not find instrument: {0}")]
    InstrumentLookup(String),

    #[error("unable to make dir {path}: {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    #[error("unable to copy file {source_path} to {destination}: {message}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    #[error("no classification rule matches type label: {0}")]
    #[diagnostic(help(
        "labels must mention Barker, D-region, Alternating Code, E-region, Long Pulse, F-region or a velocity keyword"
    ))]
    Classification(String),

    #[error("invalid experiment id: {0}")]
    InvalidExperimentId(String),

    #[error("cannot build catalog link: {0}")]
    LinkConstruction(String),

    #[error("failed to write manifest {path}: {message}")]
    ManifestWrite { path: PathBuf, message: String },

    #[error("malformed manifest at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    #[error("manifest references missing file {0}")]
    ManifestIntegrity(PathBuf),

    #[error("invalid directory pattern: {0}")]
    InvalidPattern(String),
}
