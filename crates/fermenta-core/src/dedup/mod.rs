//! Brewery deduplication.
//!
//! Breweries whose names differ only by a generic leading word, a
//! parenthesized owner, a legal form or spacing are grouped under the
//! lowest-id brewery (the canonical one). Merging moves each duplicate's
//! beers onto the canonical brewery and deletes the duplicate.
//!
//! Grouping is purely name based. Two unrelated producers that happen to
//! share a name ("Birra Rossa") are merged; no location or external id is
//! consulted.

mod merge;
mod normalize;

pub use merge::{
    plan_unification, unify_breweries, BeerAction, GroupFailure, GroupPlan, MergeReport, Unifier,
};
pub use normalize::{normalize_brewery_name, NameNormalizer};

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

use crate::config::DedupConfig;
use crate::error::Result;
use crate::models::Brewery;
use crate::storage::database::Database;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub canonical: Brewery,
    pub duplicates: Vec<Brewery>,
}

#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    normalizer: NameNormalizer,
}

impl DuplicateFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DedupConfig) -> Self {
        Self {
            normalizer: NameNormalizer::from_config(config),
        }
    }

    /// Buckets breweries by normalized name, keeping encounter order. The
    /// first brewery of a bucket is its canonical one.
    pub fn group(&self, breweries: Vec<Brewery>) -> Vec<DuplicateGroup> {
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        let mut buckets: Vec<DuplicateGroup> = Vec::new();

        for brewery in breweries {
            let key = self.normalizer.normalize(&brewery.name);
            match index_by_key.get(&key) {
                Some(&idx) => buckets[idx].duplicates.push(brewery),
                None => {
                    index_by_key.insert(key.clone(), buckets.len());
                    buckets.push(DuplicateGroup {
                        key,
                        canonical: brewery,
                        duplicates: Vec::new(),
                    });
                }
            }
        }

        buckets.retain(|group| !group.duplicates.is_empty());
        buckets
    }

    /// Reads every brewery (lowest id first) and returns the groups that
    /// have at least one duplicate.
    pub fn find(&self, db: &Database) -> Result<Vec<DuplicateGroup>> {
        let breweries = db.list_breweries()?;
        let scanned = breweries.len();
        let groups = self.group(breweries);

        let duplicates: usize = groups.iter().map(|g| g.duplicates.len()).sum();
        info!(
            scanned,
            groups = groups.len(),
            duplicates,
            "found {} duplicate brewery groups",
            groups.len()
        );
        Ok(groups)
    }
}

/// Finds duplicate groups with the built-in normalization rules.
pub fn find_duplicate_breweries(db: &Database) -> Result<Vec<DuplicateGroup>> {
    DuplicateFinder::new().find(db)
}
