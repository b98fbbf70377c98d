//! Keepsake artifacts
//!
//! - `style`: the closed set of artifact styles and their categories
//! - `profile`: entrance animations and sound/haptic profiles
//! - `renderers`: one renderer per style
//! - `factory`: record -> rendering decision

pub mod factory;
pub mod profile;
pub mod renderers;
pub mod style;

pub use factory::{ArtifactFactory, ArtifactRendering, StyleOption};
pub use profile::{EntranceAnimation, HapticPattern, SensoryProfile, SoundCue};
pub use renderers::{ArtifactDescription, ArtifactRenderer};
pub use style::{ArtifactCategory, ArtifactStyle};
