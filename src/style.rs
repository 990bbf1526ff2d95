//! Presets, background themes and the live tuning state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Presenter tuning values sent to the model.
///
/// Percentages; brightness and contrast may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningValues {
    pub sharpening: i32,
    pub brightness: i32,
    pub contrast: i32,
    pub facial_fidelity: i32,
    pub preserve_skin_tone: bool,
    pub expression: String,
}

/// A named, fixed bundle of tuning values.
#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub name: &'static str,
    sharpening: i32,
    brightness: i32,
    contrast: i32,
    facial_fidelity: i32,
    preserve_skin_tone: bool,
    expression: &'static str,
}

impl StylePreset {
    pub fn tuning(&self) -> TuningValues {
        TuningValues {
            sharpening: self.sharpening,
            brightness: self.brightness,
            contrast: self.contrast,
            facial_fidelity: self.facial_fidelity,
            preserve_skin_tone: self.preserve_skin_tone,
            expression: self.expression.to_string(),
        }
    }

    /// Look up a preset by name (case-insensitive).
    pub fn find(name: &str) -> Option<&'static StylePreset> {
        PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }
}

const fn preset(
    name: &'static str,
    sharpening: i32,
    brightness: i32,
    contrast: i32,
    expression: &'static str,
) -> StylePreset {
    StylePreset {
        name,
        sharpening,
        brightness,
        contrast,
        facial_fidelity: 100,
        preserve_skin_tone: true,
        expression,
    }
}

/// The preset catalog, in display order.
pub static PRESETS: [StylePreset; 6] = [
    preset("Energetic", 35, 5, 15, "power"),
    preset("Elegant", 15, 10, -5, "smile"),
    preset("Modern", 25, 0, 5, "neutral"),
    preset("Vivid Pop", 40, 10, 25, "smile"),
    preset("Cinematic", 30, -5, 20, "focus"),
    preset("Minimalist", 10, 5, -10, "neutral"),
];

pub const DEFAULT_PRESET: &str = "Energetic";

/// Named background themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackgroundTheme {
    #[default]
    GoldAndBlack,
    Christmas,
    NeonGlow,
    AbstractWatercolor,
    VintageFilm,
    CosmicNebula,
    UrbanGraffiti,
}

impl BackgroundTheme {
    pub const ALL: [BackgroundTheme; 7] = [
        BackgroundTheme::GoldAndBlack,
        BackgroundTheme::Christmas,
        BackgroundTheme::NeonGlow,
        BackgroundTheme::AbstractWatercolor,
        BackgroundTheme::VintageFilm,
        BackgroundTheme::CosmicNebula,
        BackgroundTheme::UrbanGraffiti,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackgroundTheme::GoldAndBlack => "Gold and Black",
            BackgroundTheme::Christmas => "Christmas",
            BackgroundTheme::NeonGlow => "Neon Glow",
            BackgroundTheme::AbstractWatercolor => "Abstract Watercolor",
            BackgroundTheme::VintageFilm => "Vintage Film",
            BackgroundTheme::CosmicNebula => "Cosmic Nebula",
            BackgroundTheme::UrbanGraffiti => "Urban Graffiti",
        }
    }

    /// Fixed description of the theme inserted into the instruction document.
    pub fn prompt_fragment(&self) -> &'static str {
        match self {
            BackgroundTheme::Christmas => "a festive 'Christmas' theme. The background should be filled with classic Christmas elements like twinkling lights, shiny baubles, elegant ribbons, and perhaps a hint of snowflakes or a cozy fireplace scene. The color palette should be rich with reds, greens, golds, and whites. The overall mood should be joyful, celebratory, and magical.",
            BackgroundTheme::NeonGlow => "a 'Neon Glow' theme. The background should be dark, featuring vibrant, glowing neon lines, shapes, and light effects that outline a dance scene. Think futuristic nightclub, with glowing grids on the floor, neon signs (without text), and light trails that convey movement and energy. The color palette should be electric pinks, blues, cyans, and purples against a deep black or dark blue base.",
            BackgroundTheme::AbstractWatercolor => "an 'Abstract Watercolor' theme. The background should be a beautiful, artistic blend of soft, flowing watercolor washes and splatters. The colors should be vibrant but harmonious, suggesting fluidity and grace, like a dance painting. Use a palette of blues, greens, purples, and pinks. The texture should feel organic and hand-painted, not digitally perfect.",
            BackgroundTheme::VintageFilm => "a 'Vintage Film' theme. The background should evoke the look of an old movie poster or a still from a classic film. Use warm, desaturated colors, film grain texture, and subtle light leaks. The scene could be a classic ballroom or a speakeasy-style dance club with vintage decor. The overall mood should be nostalgic, classy, and timeless.",
            BackgroundTheme::CosmicNebula => "a 'Cosmic Nebula' theme. The background should be a breathtaking view of a colorful galaxy or nebula, full of stars, cosmic dust, and swirling clouds of interstellar gas. The colors should be deep and rich, with purples, blues, magentas, and hints of gold. The presenter should look like they are dancing among the stars, creating a magical and epic atmosphere.",
            BackgroundTheme::UrbanGraffiti => "an 'Urban Graffiti' theme. The background should be a gritty, artistic brick wall covered in high-quality, stylish graffiti art. The style should be modern street art, not messy tagging. Use bold colors, dynamic shapes, and abstract patterns. The setting is an urban dance battle or street performance. The mood should be edgy, energetic, and cool.",
            BackgroundTheme::GoldAndBlack => "a 'Gold and Black' theme. The background should evoke a premium and energetic dance event. Key elements to include are: a sophisticated stage, a glossy dance floor reflecting the lights, dynamic lighting effects (like spotlights and ambient glows), and large LED screens in the background displaying abstract golden patterns or motion graphics. The overall atmosphere should be luxurious, modern, and exciting, perfectly complementing a high-end dance event.",
        }
    }
}

impl fmt::Display for BackgroundTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundTheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        BackgroundTheme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::ValidationError(format!("unknown background theme: {}", wanted)))
    }
}

/// Active preset label, live tuning and background theme.
#[derive(Debug, Clone)]
pub struct StyleConfig {
    active_preset: &'static str,
    tuning: TuningValues,
    background: BackgroundTheme,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let preset = &PRESETS[0];
        Self {
            active_preset: preset.name,
            tuning: preset.tuning(),
            background: BackgroundTheme::default(),
        }
    }
}

impl StyleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every tuning field with the named preset's bundle.
    ///
    /// The active preset is a label of the last applied preset; later
    /// single-field edits leave it untouched.
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        let preset = StylePreset::find(name)
            .ok_or_else(|| Error::ValidationError(format!("unknown preset: {}", name.trim())))?;
        self.active_preset = preset.name;
        self.tuning = preset.tuning();
        Ok(())
    }

    pub fn active_preset(&self) -> &'static str {
        self.active_preset
    }

    pub fn tuning(&self) -> &TuningValues {
        &self.tuning
    }

    pub fn background(&self) -> BackgroundTheme {
        self.background
    }

    pub fn set_background(&mut self, theme: BackgroundTheme) {
        self.background = theme;
    }

    pub fn set_sharpening(&mut self, value: i32) {
        self.tuning.sharpening = value;
    }

    pub fn set_brightness(&mut self, value: i32) {
        self.tuning.brightness = value;
    }

    pub fn set_contrast(&mut self, value: i32) {
        self.tuning.contrast = value;
    }

    pub fn set_facial_fidelity(&mut self, value: i32) {
        self.tuning.facial_fidelity = value;
    }

    pub fn set_preserve_skin_tone(&mut self, value: bool) {
        self.tuning.preserve_skin_tone = value;
    }

    pub fn set_expression(&mut self, value: impl Into<String>) {
        self.tuning.expression = value.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_applies_its_bundle() {
        let mut style = StyleConfig::new();
        for preset in PRESETS.iter() {
            style.set_sharpening(-99);
            style.set_expression("odd");
            style.apply_preset(preset.name).unwrap();
            assert_eq!(style.tuning(), &preset.tuning());
            assert_eq!(style.active_preset(), preset.name);
        }
    }

    #[test]
    fn elegant_bundle() {
        let mut style = StyleConfig::new();
        style.apply_preset("elegant").unwrap();
        let t = style.tuning();
        assert_eq!((t.sharpening, t.brightness, t.contrast), (15, 10, -5));
        assert_eq!(t.expression, "smile");
        assert_eq!(t.facial_fidelity, 100);
        assert!(t.preserve_skin_tone);
    }

    #[test]
    fn manual_override_keeps_preset_label() {
        let mut style = StyleConfig::new();
        style.apply_preset("Cinematic").unwrap();
        style.set_contrast(0);
        assert_eq!(style.active_preset(), "Cinematic");
        assert_eq!(style.tuning().contrast, 0);
    }

    #[test]
    fn unknown_preset_is_rejected_and_state_kept() {
        let mut style = StyleConfig::new();
        assert!(matches!(style.apply_preset("Baroque"), Err(Error::ValidationError(_))));
        assert_eq!(style.active_preset(), DEFAULT_PRESET);
    }

    #[test]
    fn themes_parse_by_display_name() {
        for theme in BackgroundTheme::ALL {
            assert_eq!(theme.name().parse::<BackgroundTheme>().unwrap(), theme);
        }
        assert_eq!(
            "neon glow".parse::<BackgroundTheme>().unwrap(),
            BackgroundTheme::NeonGlow
        );
        assert!("Plaid".parse::<BackgroundTheme>().is_err());
    }

    #[test]
    fn catalog_sizes() {
        assert_eq!(PRESETS.len(), 6);
        assert_eq!(BackgroundTheme::ALL.len(), 7);
    }
}
