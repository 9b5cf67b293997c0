use async_graphql::{InputObject, SimpleObject};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A persisted book as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Book {
    /// Server-assigned identifier, never reused
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

impl Book {
    /// Map a `SELECT id, title, author` row.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
        })
    }
}

/// Fields supplied when creating or replacing a book.
#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct BookInput {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}
