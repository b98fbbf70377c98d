//! Error types for YiGe
//!
//! All errors use thiserror for structured error handling.
//! `AppError` serializes to its message so a UI layer can show it directly.

use crate::providers::LoginProvider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid record: {0}")]
    Validation(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("Image error: {0}")]
    Image(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures while acquiring or resolving the device location
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("定位权限被拒绝 (permission denied)")]
    PermissionDenied,

    #[error("位置不可用 (location unavailable): {0}")]
    Unavailable(String),

    #[error("地址解析失败 (geocoding failed): {0}")]
    GeocodingFailed(String),
}

/// Failures while fetching a weather snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("网络错误 (network error): {0}")]
    Network(String),

    #[error("天气不可用 (weather unavailable): {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        WeatherError::Network(e.to_string())
    }
}

/// Login failures, reported per provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{provider} 登录失败: {reason}")]
    Rejected {
        provider: LoginProvider,
        reason: String,
    },

    #[error("{provider} 凭证无效: {reason}")]
    InvalidCredentials {
        provider: LoginProvider,
        reason: String,
    },

    #[error("{provider} 网络错误 (network error): {reason}")]
    Network {
        provider: LoginProvider,
        reason: String,
    },

    #[error("未配置登录方式: {0}")]
    ProviderNotConfigured(LoginProvider),
}
