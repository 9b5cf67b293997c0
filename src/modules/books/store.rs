//! Book persistence. Every call runs in its own database session.

use bookshelf_db::{Database, DbError};
use rusqlite::{params, OptionalExtension};

use super::models::Book;

/// Storage accessor for the `books` table.
#[derive(Debug, Clone)]
pub struct BookStore {
    db: Database,
}

impl BookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every book, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Book>, DbError> {
        let books = self
            .db
            .with_session(|conn| -> rusqlite::Result<Vec<Book>> {
                let mut stmt = conn.prepare("SELECT id, title, author FROM books ORDER BY id")?;
                let rows = stmt.query_map([], Book::from_row)?;
                let books = rows.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(books)
            })
            .await?;
        tracing::debug!(op = "list_all", count = books.len(), "books listed");
        Ok(books)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Book>, DbError> {
        let book = self
            .db
            .with_session(move |conn| {
                conn.query_row(
                    "SELECT id, title, author FROM books WHERE id = ?1",
                    [id],
                    Book::from_row,
                )
                .optional()
            })
            .await?;
        tracing::debug!(op = "get_by_id", book_id = id, found = book.is_some(), "book looked up");
        Ok(book)
    }

    /// Insert a row and return it with its assigned id.
    pub async fn insert(&self, title: String, author: String) -> Result<Book, DbError> {
        let book = self
            .db
            .with_session(move |conn| {
                conn.query_row(
                    "INSERT INTO books (title, author) VALUES (?1, ?2) RETURNING id, title, author",
                    params![title, author],
                    Book::from_row,
                )
            })
            .await?;
        tracing::info!(op = "insert", book_id = book.id, "book created");
        Ok(book)
    }

    /// Overwrite title and author; `None` when no row has this id.
    pub async fn update_by_id(
        &self,
        id: i64,
        title: String,
        author: String,
    ) -> Result<Option<Book>, DbError> {
        let book = self
            .db
            .with_session(move |conn| {
                conn.query_row(
                    "UPDATE books SET title = ?1, author = ?2 WHERE id = ?3 \
                     RETURNING id, title, author",
                    params![title, author, id],
                    Book::from_row,
                )
                .optional()
            })
            .await?;
        tracing::info!(op = "update_by_id", book_id = id, updated = book.is_some(), "book update");
        Ok(book)
    }

    /// Remove a row; `false` when no row has this id.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, DbError> {
        let removed = self
            .db
            .with_session(move |conn| conn.execute("DELETE FROM books WHERE id = ?1", [id]))
            .await?;
        tracing::info!(op = "delete_by_id", book_id = id, deleted = removed > 0, "book delete");
        Ok(removed > 0)
    }
}
