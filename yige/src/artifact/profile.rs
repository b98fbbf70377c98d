//! Animation and sensory profiles
//!
//! Each category has an entrance animation and a sound/haptic pairing.
//! A few styles override the category animation.

use super::style::{ArtifactCategory, ArtifactStyle};
use serde::{Deserialize, Serialize};

/// How an artifact appears when the ritual completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceAnimation {
    /// Fades in from a blank frame, like an instant photo developing
    Develop,
    /// Slides out of a printer slot
    PrintOut,
    /// Unfolds from a folded sheet
    Unfold,
    /// Drops in and settles with a small bounce
    DropIn,
    /// Spins up to speed
    Spin,
    /// Floats up from below
    FloatUp,
}

impl EntranceAnimation {
    pub fn for_style(style: ArtifactStyle) -> Self {
        match style {
            ArtifactStyle::VinylRecord | ArtifactStyle::Cassette => EntranceAnimation::Spin,
            ArtifactStyle::MessageInBottle => EntranceAnimation::FloatUp,
            ArtifactStyle::Receipt => EntranceAnimation::PrintOut,
            _ => Self::for_category(style.category()),
        }
    }

    pub fn for_category(category: ArtifactCategory) -> Self {
        match category {
            ArtifactCategory::Photography => EntranceAnimation::Develop,
            ArtifactCategory::Tickets => EntranceAnimation::PrintOut,
            ArtifactCategory::Letters => EntranceAnimation::Unfold,
            ArtifactCategory::Collection => EntranceAnimation::DropIn,
        }
    }

    /// Nominal duration in milliseconds
    pub fn duration_ms(&self) -> u32 {
        match self {
            EntranceAnimation::Develop => 1_800,
            EntranceAnimation::PrintOut => 900,
            EntranceAnimation::Unfold => 1_200,
            EntranceAnimation::DropIn => 600,
            EntranceAnimation::Spin => 1_500,
            EntranceAnimation::FloatUp => 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    ShutterClick,
    TicketStamp,
    PaperRustle,
    NeedleDrop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticPattern {
    /// One sharp tap
    Rigid,
    /// Two quick taps
    DoubleTap,
    /// A soft rising swell
    Soft,
    /// A medium thud
    Medium,
}

/// Sound and haptic feedback played with the entrance animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensoryProfile {
    pub sound: Option<SoundCue>,
    pub haptic: Option<HapticPattern>,
    /// 0.0 ..= 1.0
    pub volume: f32,
}

impl SensoryProfile {
    pub fn for_category(category: ArtifactCategory) -> Self {
        let (sound, haptic, volume) = match category {
            ArtifactCategory::Photography => (SoundCue::ShutterClick, HapticPattern::Rigid, 0.8),
            ArtifactCategory::Tickets => (SoundCue::TicketStamp, HapticPattern::DoubleTap, 0.7),
            ArtifactCategory::Letters => (SoundCue::PaperRustle, HapticPattern::Soft, 0.5),
            ArtifactCategory::Collection => (SoundCue::NeedleDrop, HapticPattern::Medium, 0.6),
        };

        Self {
            sound: Some(sound),
            haptic: Some(haptic),
            volume,
        }
    }

    /// Apply the user's sound and haptics switches
    pub fn with_preferences(mut self, sound_enabled: bool, haptics_enabled: bool, volume: f32) -> Self {
        if !sound_enabled {
            self.sound = None;
        }
        if !haptics_enabled {
            self.haptic = None;
        }
        self.volume = (self.volume * volume).clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_overrides() {
        assert_eq!(
            EntranceAnimation::for_style(ArtifactStyle::VinylRecord),
            EntranceAnimation::Spin
        );
        assert_eq!(
            EntranceAnimation::for_style(ArtifactStyle::Postcard),
            EntranceAnimation::Unfold
        );
        assert_eq!(
            EntranceAnimation::for_style(ArtifactStyle::PressedFlower),
            EntranceAnimation::DropIn
        );
    }

    #[test]
    fn test_preferences_mute_feedback() {
        let profile = SensoryProfile::for_category(ArtifactCategory::Tickets)
            .with_preferences(false, true, 1.0);
        assert!(profile.sound.is_none());
        assert_eq!(profile.haptic, Some(HapticPattern::DoubleTap));

        let quiet = SensoryProfile::for_category(ArtifactCategory::Letters)
            .with_preferences(true, false, 0.5);
        assert!(quiet.haptic.is_none());
        assert!((quiet.volume - 0.25).abs() < f32::EPSILON);
    }
}
