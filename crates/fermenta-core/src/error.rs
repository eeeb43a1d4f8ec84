use thiserror::Error;

/// All errors that can occur in fermenta-core.
#[derive(Debug, Error)]
pub enum FermentaError {
    #[error("Brewery not found: {0}")]
    BreweryNotFound(i64),

    #[error("Beer not found: {0}")]
    BeerNotFound(i64),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Commit failed: {0}")]
    Commit(#[source] rusqlite::Error),

    #[error("Merge of brewery {brewery_id} failed: {source}")]
    Merge {
        brewery_id: i64,
        #[source]
        source: Box<FermentaError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl FermentaError {
    pub fn merge(brewery_id: i64, source: FermentaError) -> Self {
        Self::Merge {
            brewery_id,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, FermentaError>;
