//! Application bootstrap. Settings resolve the database handle and the module
//! registry; migrations run before the HTTP server starts.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{migrate, Database};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

pub struct Application {
    settings: Settings,
    db: Database,
    registry: Arc<ModuleRegistry>,
}

impl Application {
    /// Resolve the database handle and register every module. Opens nothing.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .context("invalid database configuration")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        Ok(Self {
            settings,
            db,
            registry: Arc::new(registry),
        })
    }

    /// Apply pending module migrations, returning how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        migrate::apply(&self.db, self.registry.collect_migrations())
            .await
            .context("failed to apply database migrations")
    }

    /// The full HTTP router, with middleware, as served by [`Application::run`].
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(Arc::clone(&self.registry), &self.settings)
    }

    /// Initialize, migrate and start modules, then serve until shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_modules(&ctx).await?;
        let applied = self.migrate().await?;
        tracing::info!(applied, "schema ready");
        self.registry.start_modules(&ctx).await?;

        let served = bookshelf_http::start_server(Arc::clone(&self.registry), &self.settings).await;

        self.registry.stop_modules().await?;
        served
    }
}
