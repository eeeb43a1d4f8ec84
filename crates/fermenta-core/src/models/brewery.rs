use serde::{Deserialize, Serialize};

/// A brewery row as stored in the `breweries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brewery {
    pub id: i64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Insert payload for a brewery; the id is assigned by the database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBrewery {
    pub name: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl NewBrewery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
