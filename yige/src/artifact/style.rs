//! Artifact styles
//!
//! The closed set of keepsake styles a record can be rendered as,
//! grouped into four categories.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Family of visual metaphors; drives sound, haptics and entrance animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    Photography,
    Tickets,
    Letters,
    Collection,
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 4] = [
        ArtifactCategory::Photography,
        ArtifactCategory::Tickets,
        ArtifactCategory::Letters,
        ArtifactCategory::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactCategory::Photography => "photography",
            ArtifactCategory::Tickets => "tickets",
            ArtifactCategory::Letters => "letters",
            ArtifactCategory::Collection => "collection",
        }
    }
}

/// A keepsake style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStyle {
    // Photography
    #[default]
    Polaroid,
    FilmStrip,
    PhotoBooth,
    SlideMount,
    ContactSheet,
    Daguerreotype,
    // Tickets
    BoardingPass,
    MovieTicket,
    ConcertTicket,
    TrainTicket,
    Receipt,
    MuseumPass,
    // Letters
    WaxSealEnvelope,
    Postcard,
    Telegram,
    Airmail,
    JournalPage,
    Typewriter,
    // Collection
    VinylRecord,
    Cassette,
    PressedFlower,
    PostageStamp,
    Bookmark,
    MessageInBottle,
}

impl ArtifactStyle {
    pub const ALL: [ArtifactStyle; 24] = [
        ArtifactStyle::Polaroid,
        ArtifactStyle::FilmStrip,
        ArtifactStyle::PhotoBooth,
        ArtifactStyle::SlideMount,
        ArtifactStyle::ContactSheet,
        ArtifactStyle::Daguerreotype,
        ArtifactStyle::BoardingPass,
        ArtifactStyle::MovieTicket,
        ArtifactStyle::ConcertTicket,
        ArtifactStyle::TrainTicket,
        ArtifactStyle::Receipt,
        ArtifactStyle::MuseumPass,
        ArtifactStyle::WaxSealEnvelope,
        ArtifactStyle::Postcard,
        ArtifactStyle::Telegram,
        ArtifactStyle::Airmail,
        ArtifactStyle::JournalPage,
        ArtifactStyle::Typewriter,
        ArtifactStyle::VinylRecord,
        ArtifactStyle::Cassette,
        ArtifactStyle::PressedFlower,
        ArtifactStyle::PostageStamp,
        ArtifactStyle::Bookmark,
        ArtifactStyle::MessageInBottle,
    ];

    /// Stable identifier used in storage and settings
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStyle::Polaroid => "polaroid",
            ArtifactStyle::FilmStrip => "film_strip",
            ArtifactStyle::PhotoBooth => "photo_booth",
            ArtifactStyle::SlideMount => "slide_mount",
            ArtifactStyle::ContactSheet => "contact_sheet",
            ArtifactStyle::Daguerreotype => "daguerreotype",
            ArtifactStyle::BoardingPass => "boarding_pass",
            ArtifactStyle::MovieTicket => "movie_ticket",
            ArtifactStyle::ConcertTicket => "concert_ticket",
            ArtifactStyle::TrainTicket => "train_ticket",
            ArtifactStyle::Receipt => "receipt",
            ArtifactStyle::MuseumPass => "museum_pass",
            ArtifactStyle::WaxSealEnvelope => "wax_seal_envelope",
            ArtifactStyle::Postcard => "postcard",
            ArtifactStyle::Telegram => "telegram",
            ArtifactStyle::Airmail => "airmail",
            ArtifactStyle::JournalPage => "journal_page",
            ArtifactStyle::Typewriter => "typewriter",
            ArtifactStyle::VinylRecord => "vinyl_record",
            ArtifactStyle::Cassette => "cassette",
            ArtifactStyle::PressedFlower => "pressed_flower",
            ArtifactStyle::PostageStamp => "postage_stamp",
            ArtifactStyle::Bookmark => "bookmark",
            ArtifactStyle::MessageInBottle => "message_in_bottle",
        }
    }

    pub fn category(&self) -> ArtifactCategory {
        use ArtifactStyle::*;

        match self {
            Polaroid | FilmStrip | PhotoBooth | SlideMount | ContactSheet | Daguerreotype => {
                ArtifactCategory::Photography
            }
            BoardingPass | MovieTicket | ConcertTicket | TrainTicket | Receipt | MuseumPass => {
                ArtifactCategory::Tickets
            }
            WaxSealEnvelope | Postcard | Telegram | Airmail | JournalPage | Typewriter => {
                ArtifactCategory::Letters
            }
            VinylRecord | Cassette | PressedFlower | PostageStamp | Bookmark | MessageInBottle => {
                ArtifactCategory::Collection
            }
        }
    }

    /// Read a stored identifier.
    ///
    /// Rows written before styles existed carry no value, and retired styles
    /// carry identifiers no longer in the set; both render as the default.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value.map(str::parse::<ArtifactStyle>) {
            Some(Ok(style)) => style,
            Some(Err(_)) => {
                tracing::debug!("Unknown stored style {:?}, using default", value);
                ArtifactStyle::default()
            }
            None => ArtifactStyle::default(),
        }
    }

    /// All styles in a category, in picker order
    pub fn in_category(category: ArtifactCategory) -> impl Iterator<Item = ArtifactStyle> {
        ArtifactStyle::ALL
            .into_iter()
            .filter(move |style| style.category() == category)
    }
}

impl FromStr for ArtifactStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        ArtifactStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == key)
            .ok_or_else(|| AppError::Validation(format!("Unknown artifact style: {}", s)))
    }
}

impl fmt::Display for ArtifactStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
