use rusqlite::Connection;

use super::Migration;
use crate::error::Result;
use crate::storage::database::schema;

pub struct V2LookupIndexes;

impl Migration for V2LookupIndexes {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Index beers by (brewery_id, name) and breweries by name"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        schema::create_indexes(conn)
    }
}
