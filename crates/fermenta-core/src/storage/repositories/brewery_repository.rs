use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::{Brewery, NewBrewery};

use super::Repository;

pub trait BreweryRepository: Repository<Entity = Brewery, Id = i64> {
    /// Every brewery, lowest id first.
    fn list_all(&self) -> Result<Vec<Brewery>>;
    fn insert(&self, brewery: &NewBrewery) -> Result<i64>;
    fn count(&self) -> Result<usize>;
}

/// Works on a plain connection or on an open transaction (which derefs to one).
pub struct SqliteBreweryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBreweryRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_brewery(row: &rusqlite::Row) -> rusqlite::Result<Brewery> {
        Ok(Brewery {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            region: row.get(3)?,
            website: row.get(4)?,
            description: row.get(5)?,
        })
    }
}

impl<'a> Repository for SqliteBreweryRepository<'a> {
    type Entity = Brewery;
    type Id = i64;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let result = self.conn.query_row(
            "SELECT id, name, city, region, website, description FROM breweries WHERE id = ?1",
            params![id],
            Self::row_to_brewery,
        );

        match result {
            Ok(brewery) => Ok(Some(brewery)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, brewery: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO breweries (id, name, city, region, website, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                city = excluded.city,
                region = excluded.region,
                website = excluded.website,
                description = excluded.description",
            params![
                brewery.id,
                brewery.name,
                brewery.city,
                brewery.region,
                brewery.website,
                brewery.description
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM breweries WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> BreweryRepository for SqliteBreweryRepository<'a> {
    fn list_all(&self) -> Result<Vec<Brewery>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, city, region, website, description FROM breweries ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_brewery)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert(&self, brewery: &NewBrewery) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO breweries (name, city, region, website, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                brewery.name,
                brewery.city,
                brewery.region,
                brewery.website,
                brewery.description
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM breweries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FermentaError;
    use crate::models::NewBeer;
    use crate::storage::database::Database;

    #[test]
    fn save_updates_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let repo = SqliteBreweryRepository::new(&conn);
        let id = repo.insert(&NewBrewery::new("Lambrate")).unwrap();

        let mut brewery = repo.find_by_id(&id).unwrap().unwrap();
        brewery.city = Some("Milano".to_string());
        repo.save(&brewery).unwrap();

        let reloaded = repo.find_by_id(&id).unwrap().unwrap();
        assert_eq!(reloaded.city.as_deref(), Some("Milano"));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn delete_missing_returns_false() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        assert!(!SqliteBreweryRepository::new(&conn).delete(&42).unwrap());
    }

    #[test]
    fn foreign_key_blocks_deleting_brewery_with_beers() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_brewery(&NewBrewery::new("Baladin")).unwrap();
        db.insert_beer(&NewBeer::new("Isaac", id)).unwrap();

        let conn = db.connection();
        let result = SqliteBreweryRepository::new(&conn).delete(&id);
        assert!(matches!(result, Err(FermentaError::Database(_))));
    }
}
