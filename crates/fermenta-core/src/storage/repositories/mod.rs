mod beer_repository;
mod brewery_repository;

pub use beer_repository::{BeerRepository, SqliteBeerRepository};
pub use brewery_repository::{BreweryRepository, SqliteBreweryRepository};

use crate::error::Result;

pub trait Repository {
    type Entity;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, entity: &Self::Entity) -> Result<()>;
    fn delete(&self, id: &Self::Id) -> Result<bool>;
}
