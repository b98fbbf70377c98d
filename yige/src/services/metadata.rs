//! Metadata collector
//!
//! Gathers location, then weather for that location, into one
//! `CollectedMetadata`. Collection never fails: whatever could not be
//! gathered is simply absent, and the timestamp is always present.
//! Calls on one collector are queued, so at most one collection is in flight.

use crate::config::{GEOCODE_TIMEOUT, LOCATION_TIMEOUT, WEATHER_TIMEOUT};
use crate::database::{CollectedMetadata, GeoLocation, WeatherSnapshot};
use crate::error::LocationError;
use crate::providers::{Geocoder, LocationProvider, WeatherProvider};
use crate::services::settings::MetadataSettings;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub collect_location: bool,
    pub collect_weather: bool,
    pub location_timeout: Duration,
    pub geocode_timeout: Duration,
    pub weather_timeout: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            collect_location: true,
            collect_weather: true,
            location_timeout: LOCATION_TIMEOUT,
            geocode_timeout: GEOCODE_TIMEOUT,
            weather_timeout: WEATHER_TIMEOUT,
        }
    }
}

impl From<&MetadataSettings> for CollectorOptions {
    fn from(settings: &MetadataSettings) -> Self {
        Self {
            collect_location: settings.collect_location,
            collect_weather: settings.collect_weather,
            ..Self::default()
        }
    }
}

struct CollectorInner {
    location: Arc<dyn LocationProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    weather: Arc<dyn WeatherProvider>,
    options: CollectorOptions,
    in_flight: Mutex<()>,
}

#[derive(Clone)]
pub struct MetadataCollector {
    inner: Arc<CollectorInner>,
}

impl MetadataCollector {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        geocoder: Option<Arc<dyn Geocoder>>,
        weather: Arc<dyn WeatherProvider>,
        options: CollectorOptions,
    ) -> Self {
        Self {
            inner: Arc::new(CollectorInner {
                location,
                geocoder,
                weather,
                options,
                in_flight: Mutex::new(()),
            }),
        }
    }

    /// Collect metadata for a record about `day`
    pub async fn collect(&self, day: NaiveDate) -> CollectedMetadata {
        let _turn = self.inner.in_flight.lock().await;

        let mut metadata = CollectedMetadata::timestamp_only(Utc::now());

        let Some(location) = self.locate().await else {
            return metadata;
        };

        metadata.weather = self.weather_for(&location, day).await;
        metadata.location = Some(location);

        tracing::debug!(
            "Collected metadata: location={} weather={}",
            metadata.location.is_some(),
            metadata.weather.is_some()
        );
        metadata
    }

    async fn locate(&self) -> Option<GeoLocation> {
        let options = &self.inner.options;
        if !options.collect_location {
            return None;
        }

        let result = timeout(options.location_timeout, self.inner.location.current_location())
            .await
            .unwrap_or_else(|_| Err(LocationError::Unavailable("timed out".to_string())));

        let mut location = match result {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Location unavailable, keeping timestamp only: {}", e);
                return None;
            }
        };

        if let Some(geocoder) = &self.inner.geocoder {
            let resolved = timeout(options.geocode_timeout, geocoder.reverse_geocode(&location))
                .await
                .unwrap_or_else(|_| Err(LocationError::GeocodingFailed("timed out".to_string())));

            match resolved {
                Ok(place) => {
                    location.address = place.address;
                    location.place_name = place.place_name;
                }
                Err(e) => tracing::warn!("Keeping coordinates without address: {}", e),
            }
        }

        Some(location)
    }

    async fn weather_for(&self, location: &GeoLocation, day: NaiveDate) -> Option<WeatherSnapshot> {
        let options = &self.inner.options;
        if !options.collect_weather {
            return None;
        }

        match timeout(options.weather_timeout, self.inner.weather.weather(location, day)).await {
            Ok(Ok(snapshot)) => Some(snapshot),
            Ok(Err(e)) => {
                tracing::warn!("Weather unavailable: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Weather lookup timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Weather;
    use crate::error::WeatherError;
    use crate::providers::{FixedLocationProvider, ResolvedPlace};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeWeather {
        calls: AtomicUsize,
        result: std::result::Result<WeatherSnapshot, WeatherError>,
        delay: Duration,
    }

    impl FakeWeather {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(WeatherSnapshot {
                    condition: Weather::Snowy,
                    temperature_celsius: -3.0,
                }),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn weather(
            &self,
            _location: &GeoLocation,
            _day: NaiveDate,
        ) -> std::result::Result<WeatherSnapshot, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    /// Location provider that tracks overlapping calls
    struct SlowLocation {
        active: AtomicUsize,
        max_active: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl LocationProvider for SlowLocation {
        async fn current_location(&self) -> std::result::Result<GeoLocation, LocationError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(GeoLocation::new(45.75, 126.63))
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn reverse_geocode(
            &self,
            _location: &GeoLocation,
        ) -> std::result::Result<ResolvedPlace, LocationError> {
            Err(LocationError::GeocodingFailed("no address".to_string()))
        }
    }

    struct HarbinGeocoder;

    #[async_trait]
    impl Geocoder for HarbinGeocoder {
        async fn reverse_geocode(
            &self,
            _location: &GeoLocation,
        ) -> std::result::Result<ResolvedPlace, LocationError> {
            Ok(ResolvedPlace {
                address: Some("黑龙江省哈尔滨市道里区".to_string()),
                place_name: Some("中央大街".to_string()),
            })
        }
    }

    struct HangingGeocoder;

    #[async_trait]
    impl Geocoder for HangingGeocoder {
        async fn reverse_geocode(
            &self,
            _location: &GeoLocation,
        ) -> std::result::Result<ResolvedPlace, LocationError> {
            std::future::pending().await
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    fn harbin() -> Arc<FixedLocationProvider> {
        Arc::new(FixedLocationProvider::new(Some(GeoLocation::new(45.75, 126.63))))
    }

    #[tokio::test]
    async fn test_permission_denied_yields_timestamp_only() {
        let weather = Arc::new(FakeWeather::ok());
        let collector = MetadataCollector::new(
            Arc::new(FixedLocationProvider::default()),
            None,
            weather.clone(),
            CollectorOptions::default(),
        );

        let before = Utc::now();
        let metadata = collector.collect(day()).await;

        assert!(metadata.collected_at >= before);
        assert!(metadata.location.is_none());
        assert!(metadata.weather.is_none());
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_collection() {
        let collector = MetadataCollector::new(
            harbin(),
            Some(Arc::new(HarbinGeocoder)),
            Arc::new(FakeWeather::ok()),
            CollectorOptions::default(),
        );

        let metadata = collector.collect(day()).await;

        let location = metadata.location.unwrap();
        assert_eq!(location.place_name.as_deref(), Some("中央大街"));
        assert_eq!(metadata.weather.unwrap().condition, Weather::Snowy);
    }

    #[tokio::test]
    async fn test_weather_failure_keeps_location() {
        let weather = FakeWeather {
            result: Err(WeatherError::Network("offline".to_string())),
            ..FakeWeather::ok()
        };
        let collector = MetadataCollector::new(
            harbin(),
            Some(Arc::new(FailingGeocoder)),
            Arc::new(weather),
            CollectorOptions::default(),
        );

        let metadata = collector.collect(day()).await;

        let location = metadata.location.unwrap();
        assert!(location.address.is_none());
        assert_eq!(location.latitude, 45.75);
        assert!(metadata.weather.is_none());
    }

    #[tokio::test]
    async fn test_slow_weather_times_out() {
        let weather = FakeWeather {
            delay: Duration::from_secs(30),
            ..FakeWeather::ok()
        };
        let collector = MetadataCollector::new(
            harbin(),
            None,
            Arc::new(weather),
            CollectorOptions {
                weather_timeout: Duration::from_millis(50),
                ..CollectorOptions::default()
            },
        );

        let metadata = collector.collect(day()).await;

        assert!(metadata.location.is_some());
        assert!(metadata.weather.is_none());
    }

    #[tokio::test]
    async fn test_location_disabled_by_settings() {
        let settings = MetadataSettings {
            collect_location: false,
            ..MetadataSettings::default()
        };
        let collector = MetadataCollector::new(
            harbin(),
            None,
            Arc::new(FakeWeather::ok()),
            CollectorOptions::from(&settings),
        );

        let metadata = collector.collect(day()).await;
        assert!(metadata.location.is_none());
        assert!(metadata.weather.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_calls_are_queued() {
        let location = Arc::new(SlowLocation {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay: Duration::from_millis(20),
        });
        let collector = MetadataCollector::new(
            location.clone(),
            None,
            Arc::new(FakeWeather::ok()),
            CollectorOptions::default(),
        );

        let (a, b, c) = tokio::join!(
            collector.collect(day()),
            collector.collect(day()),
            collector.collect(day())
        );

        assert!(a.location.is_some() && b.location.is_some() && c.location.is_some());
        assert_eq!(location.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stuck_geocoder_keeps_coordinates() {
        let collector = MetadataCollector::new(
            harbin(),
            Some(Arc::new(HangingGeocoder)),
            Arc::new(FakeWeather::ok()),
            CollectorOptions {
                location_timeout: Duration::from_millis(50),
                geocode_timeout: Duration::from_millis(50),
                weather_timeout: Duration::from_millis(50),
                ..CollectorOptions::default()
            },
        );

        let first = timeout(Duration::from_secs(3), collector.collect(day()))
            .await
            .expect("collection finished");
        let location = first.location.unwrap();
        assert!(location.address.is_none());
        assert!(location.place_name.is_none());
        assert_eq!(location.longitude, 126.63);
        assert!(first.weather.is_some());

        // The queue is released for the next caller
        let second = timeout(Duration::from_secs(3), collector.collect(day())).await;
        assert!(second.is_ok());
    }
}
