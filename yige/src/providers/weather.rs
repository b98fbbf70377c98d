//! Weather collaborators
//!
//! `WeatherProvider` looks up the weather for a position and date.
//! `OpenMeteoProvider` talks to an Open-Meteo compatible HTTP API: the
//! forecast endpoint for recent days, the archive endpoint for older ones.

use crate::config::{DEFAULT_WEATHER_ARCHIVE_API_BASE, FORECAST_PAST_DAYS};
use crate::database::{GeoLocation, Weather, WeatherSnapshot};
use crate::error::WeatherError;
use async_trait::async_trait;
use chrono::{Duration as DayDuration, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn weather(
        &self,
        location: &GeoLocation,
        day: NaiveDate,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyForecast>,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default, alias = "weathercode")]
    weather_code: Vec<Option<u8>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
}

/// Daily weather from an Open-Meteo compatible endpoint
#[derive(Clone)]
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    base_url: String,
    archive_base_url: String,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("yige/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            archive_base_url: DEFAULT_WEATHER_ARCHIVE_API_BASE.to_string(),
        })
    }

    pub fn with_archive_base(mut self, archive_base_url: impl Into<String>) -> Self {
        self.archive_base_url = archive_base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }

    fn archive_url(&self) -> String {
        format!("{}/v1/archive", self.archive_base_url)
    }

    /// Days older than the forecast window go to the archive
    fn url_for(&self, day: NaiveDate, today: NaiveDate) -> String {
        if day < today - DayDuration::days(FORECAST_PAST_DAYS) {
            self.archive_url()
        } else {
            self.forecast_url()
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn weather(
        &self,
        location: &GeoLocation,
        day: NaiveDate,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let date = day.format("%Y-%m-%d").to_string();

        tracing::debug!(
            "Fetching weather for ({}, {}) on {}",
            location.latitude,
            location.longitude,
            date
        );

        let response = self
            .client
            .get(self.url_for(day, Utc::now().date_naive()))
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("daily", "weather_code,temperature_2m_max".to_string()),
                ("timezone", "auto".to_string()),
                ("start_date", date.clone()),
                ("end_date", date.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Unavailable(format!(
                "weather service returned {}",
                response.status()
            )));
        }

        let forecast: ForecastResponse = response.json().await?;
        snapshot_for_day(forecast, &date)
    }
}

fn snapshot_for_day(forecast: ForecastResponse, date: &str) -> Result<WeatherSnapshot, WeatherError> {
    let daily = forecast
        .daily
        .ok_or_else(|| WeatherError::Unavailable("no daily forecast".to_string()))?;

    let index = daily
        .time
        .iter()
        .position(|t| t == date)
        .ok_or_else(|| WeatherError::Unavailable(format!("no forecast for {}", date)))?;

    let code = daily.weather_code.get(index).copied().flatten();
    let temperature = daily.temperature_2m_max.get(index).copied().flatten();

    match (code, temperature) {
        (Some(code), Some(temperature_celsius)) => Ok(WeatherSnapshot {
            condition: condition_from_wmo(code),
            temperature_celsius,
        }),
        _ => Err(WeatherError::Unavailable(format!("incomplete forecast for {}", date))),
    }
}

/// Map a WMO weather interpretation code to a condition
pub fn condition_from_wmo(code: u8) -> Weather {
    match code {
        0 => Weather::Sunny,
        1 | 2 => Weather::PartlyCloudy,
        3 => Weather::Cloudy,
        45 | 48 => Weather::Foggy,
        51..=67 | 80..=82 => Weather::Rainy,
        71..=77 | 85 | 86 => Weather::Snowy,
        95..=99 => Weather::Stormy,
        _ => Weather::Cloudy,
    }
}
