//! GraphQL surface for the books module.
//!
//! Every field answers with a [`StandardResponse`]; resolvers never return a
//! GraphQL error. Failures are folded into `success: false` with a display
//! message and a machine-readable [`ResponseKind`].

use async_graphql::{EmptySubscription, Enum, Object, Schema, SimpleObject};
use bookshelf_db::DbError;
use thiserror::Error;

use super::models::{Book, BookInput};
use super::store::BookStore;

/// The GraphQL schema served by the books module.
pub type BookSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: BookStore) -> BookSchema {
    Schema::build(
        QueryRoot {
            store: store.clone(),
        },
        MutationRoot { store },
        EmptySubscription,
    )
    .finish()
}

/// Outcome category carried next to the human-readable message.
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Ok,
    NotFound,
    StoreFailure,
}

/// Uniform response envelope for every query and mutation.
#[derive(SimpleObject, Clone, Debug)]
pub struct StandardResponse {
    pub success: bool,
    pub message: String,
    pub kind: ResponseKind,
    /// Set by single-book operations
    pub data: Option<Book>,
    /// Set by the list query
    pub data_list: Option<Vec<Book>>,
}

impl StandardResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            kind: ResponseKind::Ok,
            data: None,
            data_list: None,
        }
    }

    fn with_book(message: &str, book: Book) -> Self {
        Self {
            data: Some(book),
            ..Self::ok(message)
        }
    }

    fn with_books(message: &str, books: Vec<Book>) -> Self {
        Self {
            data_list: Some(books),
            ..Self::ok(message)
        }
    }

    fn failure(err: &ApiError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            kind: err.kind(),
            data: None,
            data_list: None,
        }
    }
}

/// Why a book operation did not succeed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Book not found")]
    NotFound,

    #[error("Error: {0}")]
    Store(#[from] DbError),
}

impl ApiError {
    pub fn kind(&self) -> ResponseKind {
        match self {
            ApiError::NotFound => ResponseKind::NotFound,
            ApiError::Store(_) => ResponseKind::StoreFailure,
        }
    }
}

fn respond<T>(
    field: &'static str,
    result: Result<T, ApiError>,
    on_success: impl FnOnce(T) -> StandardResponse,
) -> StandardResponse {
    match result {
        Ok(value) => on_success(value),
        Err(ApiError::NotFound) => {
            tracing::debug!(field, "book not found");
            StandardResponse::failure(&ApiError::NotFound)
        }
        Err(err) => {
            tracing::warn!(field, error = %err, "book operation failed");
            StandardResponse::failure(&err)
        }
    }
}

fn found<T>(value: Option<T>) -> Result<T, ApiError> {
    value.ok_or(ApiError::NotFound)
}

/// Root query type.
pub struct QueryRoot {
    store: BookStore,
}

#[Object]
impl QueryRoot {
    /// List every book.
    async fn books(&self) -> StandardResponse {
        let result = self.store.list_all().await.map_err(ApiError::from);
        respond("books", result, |books| {
            StandardResponse::with_books("Books fetched successfully", books)
        })
    }

    /// Fetch one book by id.
    async fn book_by_id(&self, id: i64) -> StandardResponse {
        let result = self
            .store
            .get_by_id(id)
            .await
            .map_err(ApiError::from)
            .and_then(found);
        respond("bookById", result, |book| {
            StandardResponse::with_book("Book fetched successfully", book)
        })
    }
}

/// Root mutation type.
pub struct MutationRoot {
    store: BookStore,
}

#[Object]
impl MutationRoot {
    /// Create a book; the id is assigned by the store.
    async fn create_book(&self, input: BookInput) -> StandardResponse {
        let result = self
            .store
            .insert(input.title, input.author)
            .await
            .map_err(ApiError::from);
        respond("createBook", result, |book| {
            StandardResponse::with_book("Book created successfully", book)
        })
    }

    /// Replace the title and author of an existing book.
    async fn update_book(&self, id: i64, input: BookInput) -> StandardResponse {
        let result = self
            .store
            .update_by_id(id, input.title, input.author)
            .await
            .map_err(ApiError::from)
            .and_then(found);
        respond("updateBook", result, |book| {
            StandardResponse::with_book("Book updated successfully", book)
        })
    }

    /// Delete a book.
    async fn delete_book(&self, id: i64) -> StandardResponse {
        let result = self
            .store
            .delete_by_id(id)
            .await
            .map_err(ApiError::from)
            .and_then(|deleted| if deleted { Ok(()) } else { Err(ApiError::NotFound) });
        respond("deleteBook", result, |()| {
            StandardResponse::ok("Book deleted successfully")
        })
    }
}
