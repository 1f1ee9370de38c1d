//! Builder for opening the application's storage, session and store.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use tokio::task;

use crate::{
    error::{LarderError, Result},
    generation::GenerationService,
    session::Session,
    storage::{KeyValueStore, SqliteStore},
    store::{RecipeStore, StoreOptions},
};

/// Opened application state: the sign-in session over SQLite storage.
pub struct Larder {
    session: Session,
    options: StoreOptions,
}

impl Larder {
    /// The sign-in session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the sign-in session, for sign-up, login and logout.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Opens the signed-in user's recipe store.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::Auth` when nobody is signed in.
    pub fn recipe_store(&self, service: Arc<dyn GenerationService>) -> Result<RecipeStore> {
        RecipeStore::for_session(&self.session, service, self.options.clone())
    }
}

/// Builder for creating and configuring [`Larder`] instances.
#[derive(Debug, Clone, Default)]
pub struct LarderBuilder {
    database_path: Option<PathBuf>,
    options: StoreOptions,
}

impl LarderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/larder/larder.db` or `~/.local/share/larder/larder.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the pause before each generated recipe is revealed. Zero reveals
    /// the whole batch at once.
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.options.reveal_delay = delay;
        self
    }

    /// Opens the database and loads the session.
    ///
    /// # Errors
    ///
    /// Returns `LarderError::FileSystem` if the database directory cannot be
    /// created
    /// Returns `LarderError::Database` if database initialization fails
    pub async fn build(self) -> Result<Larder> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LarderError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let storage = task::spawn_blocking(move || SqliteStore::open(&db_path))
            .await
            .map_err(|e| LarderError::Storage {
                message: format!("Failed to open storage: {e}"),
            })??;
        let storage: Arc<dyn KeyValueStore> = Arc::new(storage);
        let session = Session::open(storage);

        Ok(Larder {
            session,
            options: self.options,
        })
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("larder")
            .place_data_file("larder.db")
            .map_err(|e| LarderError::XdgDirectory(e.to_string()))
    }
}
