use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{DuplicateFinder, DuplicateGroup};
use crate::error::{FermentaError, Result};
use crate::models::Brewery;
use crate::storage::database::Database;
use crate::storage::repositories::{
    BeerRepository, Repository, SqliteBeerRepository, SqliteBreweryRepository,
};

/// What a run did. Counters only include groups whose transaction committed.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub groups_found: usize,
    pub groups_merged: usize,
    pub breweries_deleted: usize,
    pub beers_transferred: usize,
    pub beers_discarded: usize,
    pub failures: Vec<GroupFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFailure {
    pub canonical_id: i64,
    pub canonical_name: String,
    pub brewery_id: i64,
    pub message: String,
}

impl MergeReport {
    fn new(groups_found: usize) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            groups_found,
            groups_merged: 0,
            breweries_deleted: 0,
            beers_transferred: 0,
            beers_discarded: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed_groups(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: GroupOutcome) {
        self.groups_merged += 1;
        self.breweries_deleted += outcome.breweries_deleted;
        self.beers_transferred += outcome.beers_transferred;
        self.beers_discarded += outcome.beers_discarded;
    }
}

#[derive(Debug, Default)]
struct GroupOutcome {
    breweries_deleted: usize,
    beers_transferred: usize,
    beers_discarded: usize,
}

/// Planned effect on a single beer of a duplicate brewery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BeerAction {
    Reparent {
        beer_id: i64,
        name: String,
        from_brewery_id: i64,
    },
    /// The canonical brewery already has `kept_beer_id` with this name.
    Discard {
        beer_id: i64,
        name: String,
        from_brewery_id: i64,
        kept_beer_id: i64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupPlan {
    pub key: String,
    pub canonical: Brewery,
    pub duplicates: Vec<Brewery>,
    pub actions: Vec<BeerAction>,
}

impl GroupPlan {
    pub fn transfers(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, BeerAction::Reparent { .. }))
            .count()
    }

    pub fn discards(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, BeerAction::Discard { .. }))
            .count()
    }
}

pub struct Unifier<'a> {
    db: &'a Database,
    finder: DuplicateFinder,
}

impl<'a> Unifier<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            finder: DuplicateFinder::default(),
        }
    }

    pub fn with_finder(mut self, finder: DuplicateFinder) -> Self {
        self.finder = finder;
        self
    }

    /// Merges every duplicate group found at the start of the run.
    ///
    /// Each group runs in its own transaction. A failed update, delete or
    /// commit rolls back that group only, is recorded in the report, and the
    /// run moves on. Read failures abort the run.
    pub fn run(&self) -> Result<MergeReport> {
        let groups = self.finder.find(self.db)?;
        let mut report = MergeReport::new(groups.len());

        for group in &groups {
            let (brewery_id, message) =
                match self.db.transaction(|conn| merge_group(conn, group)) {
                    Ok(outcome) => {
                        info!(
                            canonical = group.canonical.id,
                            merged = group.duplicates.len(),
                            transferred = outcome.beers_transferred,
                            discarded = outcome.beers_discarded,
                            "merged duplicates into \"{}\"",
                            group.canonical.name
                        );
                        report.record(outcome);
                        continue;
                    }
                    Err(FermentaError::Merge { brewery_id, source }) => {
                        (brewery_id, source.to_string())
                    }
                    // A failed commit is attributed to the canonical brewery.
                    Err(FermentaError::Commit(source)) => (group.canonical.id, source.to_string()),
                    Err(e) => return Err(e),
                };

            warn!(
                canonical = group.canonical.id,
                brewery_id,
                "group \"{}\" rolled back: {}",
                group.canonical.name,
                message
            );
            report.failures.push(GroupFailure {
                canonical_id: group.canonical.id,
                canonical_name: group.canonical.name.clone(),
                brewery_id,
                message,
            });
        }

        report.finished_at = Utc::now();
        info!(
            groups = report.groups_found,
            merged = report.groups_merged,
            failed = report.failed_groups(),
            breweries_deleted = report.breweries_deleted,
            beers_transferred = report.beers_transferred,
            beers_discarded = report.beers_discarded,
            "brewery unification finished"
        );
        Ok(report)
    }

    /// Computes what [`Unifier::run`] would do without writing anything.
    pub fn plan(&self) -> Result<Vec<GroupPlan>> {
        let groups = self.finder.find(self.db)?;
        let mut plans = Vec::with_capacity(groups.len());

        for group in groups {
            let mut kept_by_name: HashMap<String, i64> = HashMap::new();
            for beer in self.db.list_beers_by_brewery(group.canonical.id)? {
                kept_by_name.entry(beer.name).or_insert(beer.id);
            }

            let mut actions = Vec::new();
            for duplicate in &group.duplicates {
                for beer in self.db.list_beers_by_brewery(duplicate.id)? {
                    match kept_by_name.get(&beer.name) {
                        Some(&kept_beer_id) => actions.push(BeerAction::Discard {
                            beer_id: beer.id,
                            name: beer.name,
                            from_brewery_id: duplicate.id,
                            kept_beer_id,
                        }),
                        None => {
                            kept_by_name.insert(beer.name.clone(), beer.id);
                            actions.push(BeerAction::Reparent {
                                beer_id: beer.id,
                                name: beer.name,
                                from_brewery_id: duplicate.id,
                            });
                        }
                    }
                }
            }

            plans.push(GroupPlan {
                key: group.key,
                canonical: group.canonical,
                duplicates: group.duplicates,
                actions,
            });
        }

        Ok(plans)
    }
}

/// Merges all duplicate breweries into their canonical records using the
/// built-in normalization rules.
pub fn unify_breweries(db: &Database) -> Result<MergeReport> {
    Unifier::new(db).run()
}

pub fn plan_unification(db: &Database) -> Result<Vec<GroupPlan>> {
    Unifier::new(db).plan()
}

// Write failures come back as `FermentaError::Merge`; read failures are
// returned as-is so the caller can treat them as fatal.
fn merge_group(conn: &Connection, group: &DuplicateGroup) -> Result<GroupOutcome> {
    let beers = SqliteBeerRepository::new(conn);
    let breweries = SqliteBreweryRepository::new(conn);
    let canonical_id = group.canonical.id;
    let mut outcome = GroupOutcome::default();

    for duplicate in &group.duplicates {
        for beer in beers.list_by_brewery(duplicate.id)? {
            match beers.find_by_name_in_brewery(&beer.name, canonical_id)? {
                None => {
                    let moved = beers
                        .update_brewery(beer.id, canonical_id)
                        .map_err(|e| FermentaError::merge(duplicate.id, e))?;
                    if !moved {
                        return Err(FermentaError::merge(
                            duplicate.id,
                            FermentaError::BeerNotFound(beer.id),
                        ));
                    }
                    debug!(
                        beer = beer.id,
                        from = duplicate.id,
                        to = canonical_id,
                        "re-parented \"{}\"",
                        beer.name
                    );
                    outcome.beers_transferred += 1;
                }
                Some(kept) => {
                    let deleted = beers
                        .delete(&beer.id)
                        .map_err(|e| FermentaError::merge(duplicate.id, e))?;
                    if !deleted {
                        return Err(FermentaError::merge(
                            duplicate.id,
                            FermentaError::BeerNotFound(beer.id),
                        ));
                    }
                    debug!(
                        beer = beer.id,
                        kept = kept.id,
                        "discarded \"{}\", canonical copy wins",
                        beer.name
                    );
                    outcome.beers_discarded += 1;
                }
            }
        }

        let deleted = breweries
            .delete(&duplicate.id)
            .map_err(|e| FermentaError::merge(duplicate.id, e))?;
        if !deleted {
            return Err(FermentaError::merge(
                duplicate.id,
                FermentaError::BreweryNotFound(duplicate.id),
            ));
        }
        outcome.breweries_deleted += 1;
    }

    Ok(outcome)
}
