//! Application state and initialization
//!
//! This module wires the repository, providers and services together.
//! Everything the host shell needs is reachable through `AppState`.

use crate::artifact::ArtifactFactory;
use crate::config::DATABASE_FILE;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::providers::{
    AuthProvider, FixedCalendarProvider, FixedLocationProvider, HttpAuthProvider, LoginProvider,
    OpenMeteoProvider,
};
use crate::services::{
    AuthService, CollectorOptions, LocalRecordMigrator, MetadataCollector, RecordsService,
    SessionStore, SettingsService,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub repo: Repository,
    pub session: SessionStore,
    pub settings: SettingsService,
    pub auth: AuthService,
    pub collector: MetadataCollector,
    pub records: RecordsService,
    pub factory: Arc<ArtifactFactory>,
}

/// Application setup - called once on startup
pub async fn setup(app_data_dir: PathBuf) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", app_data_dir);

    tokio::fs::create_dir_all(&app_data_dir).await?;

    let settings = SettingsService::new(app_data_dir.clone());
    let app_settings = settings.load().await?;

    let pool = create_pool(&app_data_dir.join(DATABASE_FILE)).await?;
    let repo = Repository::new(pool);
    let session = SessionStore::new(repo.clone());

    let mut auth_providers: Vec<Arc<dyn AuthProvider>> = Vec::new();
    for provider in LoginProvider::ALL {
        auth_providers.push(Arc::new(HttpAuthProvider::new(
            provider,
            app_settings.endpoints.auth_api_base.clone(),
        )?));
    }

    let auth = AuthService::new(
        session.clone(),
        auth_providers,
        Arc::new(LocalRecordMigrator::new(repo.clone())),
        app_settings.registration.record_threshold,
    );
    let restored = auth.restore().await?;
    tracing::info!("Session state on startup: {:?}", restored);

    let collector = MetadataCollector::new(
        Arc::new(FixedLocationProvider::new(
            app_settings.metadata.home_location.clone(),
        )),
        None,
        Arc::new(
            OpenMeteoProvider::new(app_settings.endpoints.weather_api_base.clone())?
                .with_archive_base(app_settings.endpoints.weather_archive_api_base.clone()),
        ),
        CollectorOptions::from(&app_settings.metadata),
    );

    let records = RecordsService::new(
        repo.clone(),
        session.clone(),
        auth.clone(),
        collector.clone(),
        Arc::new(FixedCalendarProvider::default()),
        app_settings.artifacts.default_style,
    );

    let factory = Arc::new(ArtifactFactory::new(app_settings.sensory.clone()));

    tracing::info!("Application initialized successfully");

    Ok(AppState {
        app_data_dir,
        repo,
        session,
        settings,
        auth,
        collector,
        records,
        factory,
    })
}
