use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{Beer, NewBeer};

use super::Repository;

pub trait BeerRepository: Repository<Entity = Beer, Id = i64> {
    fn list_by_brewery(&self, brewery_id: i64) -> Result<Vec<Beer>>;
    fn find_by_name(&self, name: &str) -> Result<Vec<Beer>>;
    /// First beer (lowest id) with exactly this name under the brewery.
    fn find_by_name_in_brewery(&self, name: &str, brewery_id: i64) -> Result<Option<Beer>>;
    /// Re-parent a beer. Returns false when the beer does not exist.
    fn update_brewery(&self, id: i64, brewery_id: i64) -> Result<bool>;
    fn insert(&self, beer: &NewBeer) -> Result<i64>;
    fn count(&self) -> Result<usize>;
    /// Beers whose brewery_id has no matching brewery row.
    fn count_orphans(&self) -> Result<usize>;
}

pub struct SqliteBeerRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBeerRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_beer(row: &rusqlite::Row) -> rusqlite::Result<Beer> {
        Ok(Beer {
            id: row.get(0)?,
            name: row.get(1)?,
            brewery_id: row.get(2)?,
            style: row.get(3)?,
            abv: row.get(4)?,
            description: row.get(5)?,
        })
    }
}

impl<'a> Repository for SqliteBeerRepository<'a> {
    type Entity = Beer;
    type Id = i64;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let beer = self
            .conn
            .query_row(
                "SELECT id, name, brewery_id, style, abv, description FROM beers WHERE id = ?1",
                params![id],
                Self::row_to_beer,
            )
            .optional()?;
        Ok(beer)
    }

    fn save(&self, beer: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO beers (id, name, brewery_id, style, abv, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brewery_id = excluded.brewery_id,
                style = excluded.style,
                abv = excluded.abv,
                description = excluded.description",
            params![
                beer.id,
                beer.name,
                beer.brewery_id,
                beer.style,
                beer.abv,
                beer.description
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM beers WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> BeerRepository for SqliteBeerRepository<'a> {
    fn list_by_brewery(&self, brewery_id: i64) -> Result<Vec<Beer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, brewery_id, style, abv, description
             FROM beers WHERE brewery_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![brewery_id], Self::row_to_beer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Beer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, brewery_id, style, abv, description
             FROM beers WHERE name = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![name], Self::row_to_beer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_by_name_in_brewery(&self, name: &str, brewery_id: i64) -> Result<Option<Beer>> {
        let beer = self
            .conn
            .query_row(
                "SELECT id, name, brewery_id, style, abv, description
                 FROM beers WHERE name = ?1 AND brewery_id = ?2
                 ORDER BY id LIMIT 1",
                params![name, brewery_id],
                Self::row_to_beer,
            )
            .optional()?;
        Ok(beer)
    }

    fn update_brewery(&self, id: i64, brewery_id: i64) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE beers SET brewery_id = ?1 WHERE id = ?2",
            params![brewery_id, id],
        )?;
        Ok(updated > 0)
    }

    fn insert(&self, beer: &NewBeer) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO beers (name, brewery_id, style, abv, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![beer.name, beer.brewery_id, beer.style, beer.abv, beer.description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count(&self) -> Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM beers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_orphans(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM beers b
             LEFT JOIN breweries br ON br.id = b.brewery_id
             WHERE br.id IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBrewery;
    use crate::storage::database::Database;

    #[test]
    fn find_by_name_in_brewery_is_exact_and_lowest_id() {
        let db = Database::open_in_memory().unwrap();
        let baladin = db.insert_brewery(&NewBrewery::new("Baladin")).unwrap();
        let other = db.insert_brewery(&NewBrewery::new("Del Borgo")).unwrap();
        let first = db.insert_beer(&NewBeer::new("Nora", baladin)).unwrap();
        db.insert_beer(&NewBeer::new("Nora", baladin)).unwrap();
        db.insert_beer(&NewBeer::new("Nora", other)).unwrap();

        let conn = db.connection();
        let repo = SqliteBeerRepository::new(&conn);
        assert_eq!(repo.find_by_name_in_brewery("Nora", baladin).unwrap().unwrap().id, first);
        assert!(repo.find_by_name_in_brewery("nora", baladin).unwrap().is_none());
    }

    #[test]
    fn update_brewery_moves_beer_and_keeps_fields() {
        let db = Database::open_in_memory().unwrap();
        let from = db.insert_brewery(&NewBrewery::new("Lambrate (AB InBev)")).unwrap();
        let to = db.insert_brewery(&NewBrewery::new("Birrificio Lambrate")).unwrap();
        let beer = db
            .insert_beer(&NewBeer::new("Ghisa", from).with_abv(5.0))
            .unwrap();

        let conn = db.connection();
        let repo = SqliteBeerRepository::new(&conn);
        assert!(repo.update_brewery(beer, to).unwrap());
        assert!(!repo.update_brewery(9999, to).unwrap());

        let moved = repo.find_by_id(&beer).unwrap().unwrap();
        assert_eq!(moved.brewery_id, to);
        assert_eq!(moved.abv, Some(5.0));
        assert!(repo.list_by_brewery(from).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_returns_false() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        assert!(!SqliteBeerRepository::new(&conn).delete(&42).unwrap());
    }
}
