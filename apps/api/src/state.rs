use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::backend::Backend;
use crate::config::Config;
use crate::profiles::AvatarResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Relational store binding. Default: `PgBackend`; `BACKEND=memory` swaps in `MemoryBackend`.
    pub backend: Arc<dyn Backend>,
    /// Hosted auth service. Handlers only see the `AuthUser` snapshot via extractors.
    pub auth: Arc<dyn AuthProvider>,
    pub avatars: AvatarResolver,
    pub config: Config,
}
