//! Records service
//!
//! The saving ritual and the record lifecycle: validate the draft, collect
//! metadata, persist, keep the local record count in step.

use crate::artifact::ArtifactStyle;
use crate::config::MAX_CONTENT_CHARS;
use crate::database::{DayRecord, EventType, NewDayRecord, RecordDraft, Repository};
use crate::error::{AppError, Result};
use crate::providers::CalendarProvider;
use crate::services::auth::AuthService;
use crate::services::metadata::MetadataCollector;
use crate::services::session::SessionStore;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;

/// Service for managing day records
#[derive(Clone)]
pub struct RecordsService {
    repo: Repository,
    session: SessionStore,
    auth: AuthService,
    collector: MetadataCollector,
    calendar: Arc<dyn CalendarProvider>,
    default_style: ArtifactStyle,
}

impl RecordsService {
    pub fn new(
        repo: Repository,
        session: SessionStore,
        auth: AuthService,
        collector: MetadataCollector,
        calendar: Arc<dyn CalendarProvider>,
        default_style: ArtifactStyle,
    ) -> Self {
        Self {
            repo,
            session,
            auth,
            collector,
            calendar,
            default_style,
        }
    }

    /// Save a new record, optionally enriched with location and weather
    pub async fn create_record(&self, draft: RecordDraft, collect_metadata: bool) -> Result<DayRecord> {
        let content = validate_content(&draft.content)?;
        let owner_id = self.auth.owner_id().await?;

        let metadata = if collect_metadata {
            Some(self.collector.collect(draft.day).await)
        } else {
            None
        };

        let record = self
            .repo
            .create_record(NewDayRecord {
                owner_id,
                content,
                mood: draft.mood,
                weather: draft.weather,
                event_type: draft.event_type,
                day: draft.day,
                style: draft.style.unwrap_or(self.default_style),
                metadata,
            })
            .await?;

        let count = self.session.increment_record_count().await?;
        tracing::info!(
            "Record {} sealed as {} ({} saved on this device)",
            record.id,
            record.style,
            count
        );

        Ok(record)
    }

    /// One of the current owner's records; other owners' ids read as missing
    pub async fn get_record(&self, id: &str) -> Result<DayRecord> {
        let owner_id = self.auth.owner_id().await?;
        let record = self.repo.get_record(id).await?;

        if record.owner_id != owner_id {
            return Err(AppError::RecordNotFound(id.to_string()));
        }
        Ok(record)
    }

    /// The current owner's records, newest first
    pub async fn list_records(&self) -> Result<Vec<DayRecord>> {
        let owner_id = self.auth.owner_id().await?;
        self.repo.list_records(&owner_id).await
    }

    /// The current owner's records for a calendar range, inclusive
    pub async fn list_records_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayRecord>> {
        if start > end {
            return Err(AppError::Validation(format!(
                "range start {} is after end {}",
                start, end
            )));
        }

        let owner_id = self.auth.owner_id().await?;
        self.repo.list_records_between(&owner_id, start, end).await
    }

    /// Re-select a record's artifact style
    pub async fn update_style(&self, id: &str, style: ArtifactStyle) -> Result<DayRecord> {
        let owner_id = self.auth.owner_id().await?;
        tracing::debug!("Restyling record {} as {}", id, style);
        self.repo.update_style(id, &owner_id, style).await
    }

    pub async fn delete_record(&self, id: &str) -> Result<()> {
        let owner_id = self.auth.owner_id().await?;
        tracing::info!("Deleting record: {}", id);

        self.repo.delete_record(id, &owner_id).await?;
        self.session.decrement_record_count().await?;

        Ok(())
    }

    /// Guess the occasion of a day from the calendar
    pub async fn suggest_event_type(&self, day: NaiveDate) -> Option<EventType> {
        let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?);
        let end = start + chrono::Duration::days(1);

        self.calendar
            .events_in_range(start, end)
            .await
            .iter()
            .find_map(|event| event_type_from_title(&event.title))
    }
}

fn validate_content(content: &str) -> Result<String> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation("content is empty".to_string()));
    }

    let chars = trimmed.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "content is {} characters, limit is {}",
            chars, MAX_CONTENT_CHARS
        )));
    }

    Ok(trimmed.to_string())
}

/// Keyword match on a calendar event title
fn event_type_from_title(title: &str) -> Option<EventType> {
    const KEYWORDS: &[(EventType, &[&str])] = &[
        (EventType::Birthday, &["birthday", "生日", "生辰"]),
        (EventType::Anniversary, &["anniversary", "纪念"]),
        (EventType::Travel, &["trip", "flight", "travel", "旅行", "航班", "出差"]),
        (EventType::Holiday, &["holiday", "vacation", "假期", "放假", "节"]),
        (EventType::Milestone, &["graduation", "wedding", "毕业", "婚礼", "入职"]),
    ];

    let lower = title.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(event_type, _)| *event_type)
}
