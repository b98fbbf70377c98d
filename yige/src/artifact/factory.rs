//! Artifact factory
//!
//! Turns a record into the rendering decision the view layer draws.

use super::profile::{EntranceAnimation, SensoryProfile};
use super::renderers::{renderer_for, ArtifactDescription, ArtifactRenderer};
use super::style::{ArtifactCategory, ArtifactStyle};
use crate::database::DayRecord;
use crate::services::settings::SensorySettings;
use serde::Serialize;
use std::collections::HashMap;

/// Everything needed to draw and present one keepsake
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactRendering {
    pub record_id: String,
    pub style: ArtifactStyle,
    pub variant: &'static str,
    pub category: ArtifactCategory,
    pub display_name: &'static str,
    pub entrance: EntranceAnimation,
    /// How long the entrance plays, in milliseconds
    pub entrance_ms: u32,
    pub sensory: SensoryProfile,
    pub description: ArtifactDescription,
}

/// Entry in the style picker
#[derive(Debug, Clone, Serialize)]
pub struct StyleOption {
    pub style: ArtifactStyle,
    pub display_name: &'static str,
    pub category: ArtifactCategory,
}

/// Lookup table of renderers keyed by style
#[derive(Clone)]
pub struct ArtifactFactory {
    renderers: HashMap<ArtifactStyle, &'static dyn ArtifactRenderer>,
    sensory: SensorySettings,
}

impl ArtifactFactory {
    pub fn new(sensory: SensorySettings) -> Self {
        let renderers = ArtifactStyle::ALL
            .into_iter()
            .map(|style| (style, renderer_for(style)))
            .collect();

        Self { renderers, sensory }
    }

    pub fn renderer_for(&self, style: ArtifactStyle) -> &'static dyn ArtifactRenderer {
        self.renderers
            .get(&style)
            .copied()
            .unwrap_or_else(|| renderer_for(style))
    }

    /// Pick and run the renderer for a record's style
    pub fn render(&self, record: &DayRecord) -> ArtifactRendering {
        let renderer = self.renderer_for(record.style);
        let category = record.style.category();
        let entrance = EntranceAnimation::for_style(record.style);

        let sensory = SensoryProfile::for_category(category).with_preferences(
            self.sensory.sound_enabled,
            self.sensory.haptics_enabled,
            self.sensory.volume,
        );

        tracing::debug!(
            "Rendering record {} as {} ({})",
            record.id,
            renderer.variant(),
            category.as_str()
        );

        ArtifactRendering {
            record_id: record.id.clone(),
            style: record.style,
            variant: renderer.variant(),
            category,
            display_name: renderer.display_name(),
            entrance,
            entrance_ms: entrance.duration_ms(),
            sensory,
            description: renderer.describe(record),
        }
    }

    /// Styles for the picker, grouped by category
    pub fn styles(&self) -> Vec<StyleOption> {
        ArtifactCategory::ALL
            .into_iter()
            .flat_map(ArtifactStyle::in_category)
            .map(|style| StyleOption {
                style,
                display_name: self.renderer_for(style).display_name(),
                category: style.category(),
            })
            .collect()
    }
}

impl Default for ArtifactFactory {
    fn default() -> Self {
        Self::new(SensorySettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        CollectedMetadata, GeoLocation, Mood, Weather, WeatherSnapshot,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::HashSet;

    fn record(style: ArtifactStyle) -> DayRecord {
        DayRecord {
            id: "rec-1".to_string(),
            owner_id: "guest-1".to_string(),
            content: "和朋友去了西湖\n晚上下了一点雨".to_string(),
            mood: Mood::Happy,
            weather: None,
            event_type: None,
            day: NaiveDate::from_ymd_opt(2024, 4, 5).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 4, 5, 20, 30, 0).unwrap(),
            style,
            metadata: Some(CollectedMetadata {
                collected_at: Utc.with_ymd_and_hms(2024, 4, 5, 20, 29, 0).unwrap(),
                location: Some(GeoLocation {
                    latitude: 30.25,
                    longitude: 120.15,
                    address: Some("浙江省杭州市西湖区".to_string()),
                    place_name: Some("西湖".to_string()),
                }),
                weather: Some(WeatherSnapshot {
                    condition: Weather::Rainy,
                    temperature_celsius: 17.5,
                }),
            }),
        }
    }

    #[test]
    fn test_every_style_gets_a_distinct_rendering() {
        let factory = ArtifactFactory::default();
        let mut variants = HashSet::new();

        for style in ArtifactStyle::ALL {
            let rendering = factory.render(&record(style));
            assert_eq!(rendering.style, style);
            assert_eq!(rendering.category, style.category());
            assert!(!rendering.variant.is_empty());
            assert!(variants.insert(rendering.variant), "duplicate variant {}", rendering.variant);
        }

        assert_eq!(variants.len(), ArtifactStyle::ALL.len());
    }

    #[test]
    fn test_render_is_deterministic() {
        let factory = ArtifactFactory::default();
        let rec = record(ArtifactStyle::BoardingPass);
        assert_eq!(factory.render(&rec), factory.render(&rec));
    }

    #[test]
    fn test_description_uses_metadata() {
        let factory = ArtifactFactory::default();
        let rendering = factory.render(&record(ArtifactStyle::Postcard));

        assert_eq!(rendering.description.headline, "和朋友去了西湖");
        assert_eq!(rendering.description.place.as_deref(), Some("西湖"));
        assert_eq!(rendering.description.weather_label, Some("雨"));
        assert_eq!(rendering.description.details, vec!["寄自 西湖".to_string()]);
        assert_eq!(rendering.entrance, EntranceAnimation::Unfold);
    }

    #[test]
    fn test_boarding_pass_details() {
        let factory = ArtifactFactory::default();
        let rendering = factory.render(&record(ArtifactStyle::BoardingPass));

        assert_eq!(rendering.description.date_stamp, "05Apr24");
        assert!(rendering
            .description
            .details
            .contains(&"FLIGHT YG0405".to_string()));
        assert!(rendering.description.details.contains(&"SEAT 5A".to_string()));
    }

    #[test]
    fn test_muted_sensory_settings() {
        let factory = ArtifactFactory::new(SensorySettings {
            sound_enabled: false,
            haptics_enabled: false,
            volume: 1.0,
        });
        let rendering = factory.render(&record(ArtifactStyle::VinylRecord));

        assert!(rendering.sensory.sound.is_none());
        assert!(rendering.sensory.haptic.is_none());
        assert_eq!(rendering.entrance, EntranceAnimation::Spin);
        assert_eq!(rendering.entrance_ms, 1_500);
    }

    #[test]
    fn test_styles_lists_all_grouped() {
        let styles = ArtifactFactory::default().styles();
        assert_eq!(styles.len(), 24);
        assert_eq!(styles[0].category, ArtifactCategory::Photography);
        assert_eq!(styles[23].category, ArtifactCategory::Collection);
        assert_eq!(styles[12].display_name, "火漆信封");
    }
}
