use serde::{Deserialize, Serialize};

/// A beer row. `brewery_id` always points at an existing brewery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: i64,
    pub name: String,
    pub brewery_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBeer {
    pub name: String,
    pub brewery_id: i64,
    pub style: Option<String>,
    pub abv: Option<f64>,
    pub description: Option<String>,
}

impl NewBeer {
    pub fn new(name: impl Into<String>, brewery_id: i64) -> Self {
        Self {
            name: name.into(),
            brewery_id,
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_abv(mut self, abv: f64) -> Self {
        self.abv = Some(abv);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
