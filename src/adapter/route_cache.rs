//! Last-visited route cache.
//!
//! The pool listing route is remembered in a small JSON file so a
//! detail view opened against an unknown address can fall back to the
//! listing instead of failing cold.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Fixed key under which the pool-listing route is cached.
pub const POOLS_ROUTE_KEY: &str = "/pools";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RouteFile {
    routes: HashMap<String, String>,
}

/// File-backed route cache.
pub struct RouteCache {
    path: PathBuf,
}

impl RouteCache {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Remember `route` as the current pool listing.
    pub fn store_listing(&self, route: &str) -> Result<()> {
        let mut file = self.read_file();
        file.routes
            .insert(POOLS_ROUTE_KEY.to_string(), route.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    /// The cached pool listing route, if any.
    #[must_use]
    pub fn listing(&self) -> Option<String> {
        self.read_file().routes.get(POOLS_ROUTE_KEY).cloned()
    }

    fn read_file(&self) -> RouteFile {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                debug!(error = %e, "Route cache unreadable, starting fresh");
                RouteFile::default()
            }),
            Err(_) => RouteFile::default(),
        }
    }
}
