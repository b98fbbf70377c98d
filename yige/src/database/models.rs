//! Database models
//!
//! Rust structs representing journal entities.
//! Enums are stored as snake_case strings; metadata is stored as JSON.

use crate::artifact::ArtifactStyle;
use crate::error::{AppError, Result};
use crate::providers::LoginProvider;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// How the user felt that day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Calm,
    Grateful,
    Excited,
    Tired,
    Sad,
    Anxious,
    Angry,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Grateful,
        Mood::Excited,
        Mood::Tired,
        Mood::Sad,
        Mood::Anxious,
        Mood::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Grateful => "grateful",
            Mood::Excited => "excited",
            Mood::Tired => "tired",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Angry => "angry",
        }
    }

    /// Label shown on artifacts
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "开心",
            Mood::Calm => "平静",
            Mood::Grateful => "感恩",
            Mood::Excited => "兴奋",
            Mood::Tired => "疲惫",
            Mood::Sad => "难过",
            Mood::Anxious => "焦虑",
            Mood::Angry => "生气",
        }
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown mood: {}", s)))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather condition, chosen by the user or taken from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    Windy,
}

impl Weather {
    pub const ALL: [Weather; 8] = [
        Weather::Sunny,
        Weather::PartlyCloudy,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Snowy,
        Weather::Foggy,
        Weather::Windy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::PartlyCloudy => "partly_cloudy",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
            Weather::Snowy => "snowy",
            Weather::Foggy => "foggy",
            Weather::Windy => "windy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weather::Sunny => "晴",
            Weather::PartlyCloudy => "多云",
            Weather::Cloudy => "阴",
            Weather::Rainy => "雨",
            Weather::Stormy => "雷雨",
            Weather::Snowy => "雪",
            Weather::Foggy => "雾",
            Weather::Windy => "风",
        }
    }
}

impl FromStr for Weather {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Weather::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown weather: {}", s)))
    }
}

/// Special occasion a day may be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Ordinary,
    Birthday,
    Anniversary,
    Travel,
    Holiday,
    Milestone,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Ordinary,
        EventType::Birthday,
        EventType::Anniversary,
        EventType::Travel,
        EventType::Holiday,
        EventType::Milestone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Ordinary => "ordinary",
            EventType::Birthday => "birthday",
            EventType::Anniversary => "anniversary",
            EventType::Travel => "travel",
            EventType::Holiday => "holiday",
            EventType::Milestone => "milestone",
        }
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown event type: {}", s)))
    }
}

/// A resolved device position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
            place_name: None,
        }
    }
}

/// Weather observed for a record's date and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: Weather,
    pub temperature_celsius: f64,
}

/// Metadata gathered once while a record is being created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedMetadata {
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
}

impl CollectedMetadata {
    /// Metadata carrying nothing but the collection time
    pub fn timestamp_only(collected_at: DateTime<Utc>) -> Self {
        Self {
            collected_at,
            location: None,
            weather: None,
        }
    }
}

/// A day's journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub mood: Mood,
    pub weather: Option<Weather>,
    pub event_type: Option<EventType>,
    pub day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub style: ArtifactStyle,
    pub metadata: Option<CollectedMetadata>,
}

/// Raw `day_records` row
#[derive(Debug, Clone, FromRow)]
pub struct DayRecordRow {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub mood: String,
    pub weather: Option<String>,
    pub event_type: Option<String>,
    pub day: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub style: Option<String>,
    pub metadata_json: Option<String>,
}

impl TryFrom<DayRecordRow> for DayRecord {
    type Error = AppError;

    fn try_from(row: DayRecordRow) -> Result<Self> {
        let metadata = match row.metadata_json.as_deref() {
            Some(json) => Some(serde_json::from_str(json)?),
            None => None,
        };

        Ok(Self {
            mood: row.mood.parse()?,
            weather: row.weather.as_deref().map(str::parse::<Weather>).transpose()?,
            event_type: row.event_type.as_deref().map(str::parse::<EventType>).transpose()?,
            style: ArtifactStyle::from_stored(row.style.as_deref()),
            id: row.id,
            owner_id: row.owner_id,
            content: row.content,
            day: row.day,
            created_at: row.created_at,
            metadata,
        })
    }
}

/// What the user filled in before saving
#[derive(Debug, Clone, Deserialize)]
pub struct RecordDraft {
    pub content: String,
    pub mood: Mood,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    pub day: NaiveDate,
    /// Falls back to the configured default style
    #[serde(default)]
    pub style: Option<ArtifactStyle>,
}

/// Insert request for a fully resolved record
#[derive(Debug, Clone)]
pub struct NewDayRecord {
    pub owner_id: String,
    pub content: String,
    pub mood: Mood,
    pub weather: Option<Weather>,
    pub event_type: Option<EventType>,
    pub day: NaiveDate,
    pub style: ArtifactStyle,
    pub metadata: Option<CollectedMetadata>,
}

/// External account a user signed in with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub provider: LoginProvider,
    pub subject: String,
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub linked_account: Option<LinkedAccount>,
}
