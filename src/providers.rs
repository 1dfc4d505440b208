//! Pluggable outward-facing services: report text, speech, and art.
//!
//! The game itself never blocks on these. Every provider is a trait
//! object the frontend wires in, and every consumer has a canned
//! fallback for providers that are offline or misbehaving.

use std::collections::HashMap;

use crate::constants::{CANCELLED_SHIFT_REPORT, FALLBACK_SHIFT_REPORT};
use crate::environment::Environment;

/// Report line used when the provider answers with an empty string.
pub(crate) const EMPTY_REPORT_FALLBACK: &str = "Just another day on the road.";

const ART_STYLE_SUFFIX: &str = "Style: High quality vector art, flat cartoon style, vibrant \
     colors, thick outlines, game asset, cel shaded, consistent aesthetic.";

/// Generates the end-of-shift social media blurb.
pub trait ContentProvider {
    /// One short in-character line about how the shift went.
    ///
    /// # Errors
    ///
    /// Whatever the backing service reports; callers fall back to a
    /// canned line.
    fn shift_report(
        &self,
        driver_name: &str,
        environment: Environment,
        score: i32,
    ) -> anyhow::Result<String>;
}

/// Reads driver lines aloud.
pub trait SpeechProvider {
    /// Synthesized audio for `text` in the given voice, or `None` when
    /// the voice is unavailable.
    ///
    /// # Errors
    ///
    /// Whatever the backing service reports; speech is best-effort.
    fn synthesize(&self, text: &str, voice_id: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Aspect ratios the art pipeline knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait,
}

impl AspectRatio {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "9:16",
        }
    }
}

/// Generates game art from a prompt.
pub trait AssetProvider {
    /// Image bytes for the prompt, or `None` when generation declined.
    ///
    /// # Errors
    ///
    /// Whatever the backing service reports.
    fn generate(&self, prompt: &str, aspect: AspectRatio) -> anyhow::Result<Option<Vec<u8>>>;
}

/// A provider with nothing behind it. Reports fall back, speech and
/// art stay absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl ContentProvider for OfflineProvider {
    fn shift_report(&self, _: &str, _: Environment, _: i32) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("content provider offline"))
    }
}

impl SpeechProvider for OfflineProvider {
    fn synthesize(&self, _: &str, _: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

impl AssetProvider for OfflineProvider {
    fn generate(&self, _: &str, _: AspectRatio) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Ask the provider for a report, folding every failure mode into a
/// line the player can still post.
pub fn shift_report_or_fallback(
    provider: &dyn ContentProvider,
    driver_name: &str,
    environment: Environment,
    score: i32,
    cancelled: bool,
) -> String {
    if cancelled {
        return CANCELLED_SHIFT_REPORT.to_string();
    }
    match provider.shift_report(driver_name, environment, score) {
        Ok(text) if text.trim().is_empty() => EMPTY_REPORT_FALLBACK.to_string(),
        Ok(text) => text,
        Err(_) => FALLBACK_SHIFT_REPORT.to_string(),
    }
}

/// Prompt for the report model.
#[must_use]
pub fn report_prompt(driver_name: &str, environment: Environment, score: i32) -> String {
    format!(
        "Character: {driver_name}, a rideshare driver.\n\
         Location: {environment}.\n\
         Performance: Scored {score} points (higher is better).\n\n\
         Write a very short, funny, 1-sentence social media status update \
         or \"tweet\" from this character complaining or bragging about \
         their shift. Use slang appropriate for the character. Max 20 words."
    )
}

#[must_use]
pub fn driver_avatar_prompt(name: &str, desc: &str) -> String {
    format!("A close-up square avatar icon of {name}, a rideshare driver. {desc}. Plain white background. {ART_STYLE_SUFFIX}")
}

#[must_use]
pub fn passenger_avatar_prompt(visual: &str) -> String {
    format!("A close-up square avatar icon of a passenger: {visual}. Plain white background. {ART_STYLE_SUFFIX}")
}

#[must_use]
pub fn obstacle_icon_prompt(visual: &str) -> String {
    format!(
        "A close-up square avatar icon representing a problem: {visual}. \
         Danger or warning aesthetic. Plain white background. {ART_STYLE_SUFFIX}"
    )
}

#[must_use]
pub fn environment_backdrop_prompt(environment: Environment) -> String {
    format!(
        "Full-screen mobile game background of {environment}. Perspective: \
         Street level looking forward from a car dashboard view. Style: Flat \
         vector art, clean lines, vibrant saturated colors, simple geometric \
         shapes, urban cartoon aesthetic. No people. 9:16 portrait aspect ratio."
    )
}

/// The shareable end-of-shift card.
#[must_use]
pub fn build_share_text(
    driver_name: &str,
    environment: Environment,
    report: &str,
    net_cents: i64,
    score: i32,
) -> String {
    let net = crate::economy::cents_to_dollars(net_cents);
    format!(
        "🚖 RIDESHARE RANDY REPORT 🚖\n\nDriver: {driver_name}\nLocation: \
         {environment}\n\n\"{report}\"\n\n💵 Net Earnings: ${net:.2}\n⭐ Score: \
         {score}\n\nCan you beat the hustle?"
    )
}

/// Generated art keyed by entity id, so each prompt runs once.
#[derive(Debug, Clone, Default)]
pub struct AssetCache {
    assets: HashMap<String, Vec<u8>>,
}

impl AssetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.assets.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.assets.contains_key(key)
    }

    /// Generate and store art for `key` unless it is already cached.
    /// Returns whether the cache holds the asset afterwards.
    ///
    /// # Errors
    ///
    /// Provider failures pass through; the cache is left unchanged.
    pub fn ensure(
        &mut self,
        key: &str,
        provider: &dyn AssetProvider,
        prompt: &str,
        aspect: AspectRatio,
    ) -> anyhow::Result<bool> {
        if self.assets.contains_key(key) {
            return Ok(true);
        }
        match provider.generate(prompt, aspect)? {
            Some(bytes) => {
                self.assets.insert(key.to_string(), bytes);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
