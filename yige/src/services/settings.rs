//! Settings service
//!
//! Persists user preferences as a JSON file in the app data directory.
//! Every field has a serde default so older files keep loading.

use crate::artifact::ArtifactStyle;
use crate::config::{
    DEFAULT_AUTH_API_BASE, DEFAULT_REGISTRATION_THRESHOLD, DEFAULT_WEATHER_API_BASE,
    DEFAULT_WEATHER_ARCHIVE_API_BASE,
    MAX_REGISTRATION_THRESHOLD, MIN_REGISTRATION_THRESHOLD, SETTINGS_FILE,
};
use crate::database::GeoLocation;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Artifact presentation preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactSettings {
    /// Style given to new records that don't pick one
    #[serde(default)]
    pub default_style: ArtifactStyle,
}

/// Sound and haptic feedback preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorySettings {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub haptics_enabled: bool,
    /// Master volume, 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    0.8
}

impl Default for SensorySettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptics_enabled: true,
            volume: default_volume(),
        }
    }
}

/// What the metadata collector may gather
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSettings {
    #[serde(default = "default_true")]
    pub collect_location: bool,
    #[serde(default = "default_true")]
    pub collect_weather: bool,
    /// Position reported on hosts without a positioning service
    #[serde(default)]
    pub home_location: Option<GeoLocation>,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            collect_location: true,
            collect_weather: true,
            home_location: None,
        }
    }
}

/// Guest mode limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSettings {
    #[serde(default = "default_record_threshold")]
    pub record_threshold: u64,
}

fn default_record_threshold() -> u64 {
    DEFAULT_REGISTRATION_THRESHOLD
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            record_threshold: default_record_threshold(),
        }
    }
}

/// Remote service locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default = "default_weather_api_base")]
    pub weather_api_base: String,
    #[serde(default = "default_weather_archive_api_base")]
    pub weather_archive_api_base: String,
    #[serde(default = "default_auth_api_base")]
    pub auth_api_base: String,
}

fn default_weather_api_base() -> String {
    DEFAULT_WEATHER_API_BASE.to_string()
}

fn default_weather_archive_api_base() -> String {
    DEFAULT_WEATHER_ARCHIVE_API_BASE.to_string()
}

fn default_auth_api_base() -> String {
    DEFAULT_AUTH_API_BASE.to_string()
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            weather_api_base: default_weather_api_base(),
            weather_archive_api_base: default_weather_archive_api_base(),
            auth_api_base: default_auth_api_base(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub artifacts: ArtifactSettings,
    #[serde(default)]
    pub sensory: SensorySettings,
    #[serde(default)]
    pub metadata: MetadataSettings,
    #[serde(default)]
    pub registration: RegistrationSettings,
    #[serde(default)]
    pub endpoints: EndpointSettings,
}

impl AppSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sensory.volume) {
            return Err(AppError::Settings(format!(
                "volume must be between 0 and 1, got {}",
                self.sensory.volume
            )));
        }

        let threshold = self.registration.record_threshold;
        if !(MIN_REGISTRATION_THRESHOLD..=MAX_REGISTRATION_THRESHOLD).contains(&threshold) {
            return Err(AppError::Settings(format!(
                "record threshold must be between {} and {}, got {}",
                MIN_REGISTRATION_THRESHOLD, MAX_REGISTRATION_THRESHOLD, threshold
            )));
        }

        for url in [
            &self.endpoints.weather_api_base,
            &self.endpoints.weather_archive_api_base,
            &self.endpoints.auth_api_base,
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(AppError::Settings(format!("not an http(s) URL: {}", url)));
            }
        }

        if let Some(home) = &self.metadata.home_location {
            if !(-90.0..=90.0).contains(&home.latitude) || !(-180.0..=180.0).contains(&home.longitude) {
                return Err(AppError::Settings("home location out of range".to_string()));
            }
        }

        Ok(())
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Validate and write settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        settings.validate()?;

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_sensory(&self) -> Result<SensorySettings> {
        Ok(self.load().await?.sensory)
    }

    pub async fn update_sensory(&self, sensory: SensorySettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.sensory = sensory;
        self.save(&settings).await
    }

    pub async fn get_metadata(&self) -> Result<MetadataSettings> {
        Ok(self.load().await?.metadata)
    }

    pub async fn update_metadata(&self, metadata: MetadataSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.metadata = metadata;
        self.save(&settings).await
    }

    pub async fn get_default_style(&self) -> Result<ArtifactStyle> {
        Ok(self.load().await?.artifacts.default_style)
    }

    pub async fn set_default_style(&self, style: ArtifactStyle) -> Result<()> {
        let mut settings = self.load().await?;
        settings.artifacts.default_style = style;
        self.save(&settings).await
    }

    pub async fn get_registration(&self) -> Result<RegistrationSettings> {
        Ok(self.load().await?.registration)
    }

    pub async fn update_registration(&self, registration: RegistrationSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.registration = registration;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.artifacts.default_style, ArtifactStyle::Polaroid);
        assert!(settings.sensory.sound_enabled);
        assert!(settings.metadata.collect_location);
        assert_eq!(settings.registration.record_threshold, 10);
        assert!(temp.path().join(SETTINGS_FILE).exists());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let (service, temp) = create_test_service();

        std::fs::write(
            temp.path().join(SETTINGS_FILE),
            r#"{"artifacts": {"default_style": "cassette"}, "sensory": {"sound_enabled": false}}"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.artifacts.default_style, ArtifactStyle::Cassette);
        assert!(!settings.sensory.sound_enabled);
        assert!(settings.sensory.haptics_enabled);
        assert_eq!(
            settings.endpoints.weather_archive_api_base,
            DEFAULT_WEATHER_ARCHIVE_API_BASE
        );
        assert_eq!(settings.endpoints.weather_api_base, DEFAULT_WEATHER_API_BASE);
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            service
                .set_default_style(ArtifactStyle::WaxSealEnvelope)
                .await
                .unwrap();
            service
                .update_metadata(MetadataSettings {
                    collect_location: true,
                    collect_weather: false,
                    home_location: Some(GeoLocation::new(22.54, 114.06)),
                })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            assert_eq!(
                service.get_default_style().await.unwrap(),
                ArtifactStyle::WaxSealEnvelope
            );
            let metadata = service.get_metadata().await.unwrap();
            assert!(!metadata.collect_weather);
            assert_eq!(metadata.home_location.unwrap().latitude, 22.54);
        }
    }

    #[tokio::test]
    async fn test_invalid_updates_rejected() {
        let (service, _temp) = create_test_service();

        let loud = SensorySettings {
            volume: 1.5,
            ..SensorySettings::default()
        };
        assert!(service.update_sensory(loud).await.is_err());

        let zero = RegistrationSettings { record_threshold: 0 };
        assert!(service.update_registration(zero).await.is_err());

        assert_eq!(service.get_sensory().await.unwrap().volume, 0.8);
    }
}
