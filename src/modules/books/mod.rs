pub mod models;
pub mod schema;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use async_trait::async_trait;
use axum::{response::Html, routing::get, Extension, Router};
use bookshelf_db::Database;
use bookshelf_kernel::{InitCtx, Migration, Module};

use schema::{build_schema, BookSchema};
use store::BookStore;

/// Path the GraphQL endpoint and GraphiQL are served on
pub const GRAPHQL_PATH: &str = "/graphql";

pub(crate) const BOOKS_MIGRATION: Migration = Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            title  TEXT NOT NULL,
            author TEXT NOT NULL
        );
        "#,
};

/// Books module: owns the `books` table and the GraphQL endpoint over it
pub struct BooksModule {
    db: Database,
    schema: BookSchema,
}

impl BooksModule {
    pub fn new(db: Database) -> Self {
        let schema = build_schema(BookStore::new(db.clone()));
        Self { db, schema }
    }

    /// The executable schema, for embedding or testing without HTTP
    pub fn schema(&self) -> BookSchema {
        self.schema.clone()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %self.db.path().display(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
            .layer(Extension(self.schema.clone()))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![BOOKS_MIGRATION]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), path = GRAPHQL_PATH, "books module started");
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        self.db.ping().await.context("book store unreachable")
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

async fn graphql_handler(
    Extension(schema): Extension<BookSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// Create a new instance of the books module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(db))
}
