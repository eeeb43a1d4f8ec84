//! Fermenta core: brewery and beer models, SQLite storage, and the
//! duplicate-brewery merge used by the `fermenta-dedup` tool.

pub mod config;
pub mod dedup;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, DedupConfig, StorageConfig};
pub use error::{FermentaError, Result};
pub use models::*;

pub use dedup::{
    find_duplicate_breweries, normalize_brewery_name, plan_unification, unify_breweries,
    BeerAction, DuplicateFinder, DuplicateGroup, GroupFailure, GroupPlan, MergeReport,
    NameNormalizer, Unifier,
};

pub use storage::database::Database;
pub use storage::repositories::{
    BeerRepository, BreweryRepository, Repository, SqliteBeerRepository, SqliteBreweryRepository,
};
