//! Enhancement options with documented defaults.
//!
//! Defaults mirror the portrait short-form presets the composer was tuned
//! for: 720x1280 at 25 fps, gentle zoom and fade transitions, mild color
//! correction.

use serde::{Deserialize, Serialize};

/// Transition style between slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    Fade,
    Cut,
    Slide,
}

/// How images are fitted into the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFit {
    /// Letterbox/pillarbox to show the whole image.
    Contain,
    /// Fill the frame, cropping overflow.
    Cover,
}

/// Named toggles and values controlling slideshow composition and subtitles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementOptions {
    /// Master switch for visual effects.
    #[serde(default = "default_true")]
    pub use_effects: bool,
    /// Slow zoom (Ken Burns) on each slide.
    #[serde(default = "default_true")]
    pub zoom_effect: bool,
    /// Fade in/out at slide boundaries.
    #[serde(default = "default_true")]
    pub fade_effect: bool,
    /// Apply contrast/brightness/saturation correction.
    #[serde(default = "default_true")]
    pub color_correction: bool,
    #[serde(default = "default_contrast")]
    pub contrast: f32,
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    #[serde(default = "default_saturation")]
    pub saturation: f32,
    /// Zoom intensity, 0.0 (off) to 1.0.
    #[serde(default = "default_zoom_factor")]
    pub zoom_factor: f32,
    /// Output frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Output frame width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Output frame height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_transition")]
    pub transition: TransitionStyle,
    #[serde(default = "default_image_fit")]
    pub image_fit: ImageFit,
    /// Subtitle line wrap width.
    #[serde(default = "default_max_chars")]
    pub max_chars_per_line: u32,
}

fn default_true() -> bool {
    true
}

fn default_contrast() -> f32 {
    1.1
}

fn default_brightness() -> f32 {
    0.05
}

fn default_saturation() -> f32 {
    1.2
}

fn default_zoom_factor() -> f32 {
    0.5
}

fn default_frame_rate() -> u32 {
    25
}

fn default_width() -> u32 {
    720
}

fn default_height() -> u32 {
    1280
}

fn default_transition() -> TransitionStyle {
    TransitionStyle::Fade
}

fn default_image_fit() -> ImageFit {
    ImageFit::Contain
}

fn default_max_chars() -> u32 {
    56
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            use_effects: true,
            zoom_effect: true,
            fade_effect: true,
            color_correction: true,
            contrast: default_contrast(),
            brightness: default_brightness(),
            saturation: default_saturation(),
            zoom_factor: default_zoom_factor(),
            frame_rate: default_frame_rate(),
            width: default_width(),
            height: default_height(),
            transition: default_transition(),
            image_fit: default_image_fit(),
            max_chars_per_line: default_max_chars(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EnhancementOptions::default();
        assert!(options.use_effects);
        assert!(options.zoom_effect);
        assert!(options.fade_effect);
        assert_eq!(options.frame_rate, 25);
        assert_eq!(options.width, 720);
        assert_eq!(options.height, 1280);
        assert_eq!(options.transition, TransitionStyle::Fade);
        assert_eq!(options.image_fit, ImageFit::Contain);
        assert_eq!(options.max_chars_per_line, 56);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let options: EnhancementOptions = toml::from_str("").unwrap();
        assert!(options.use_effects);
        assert_eq!(options.zoom_factor, 0.5);
    }

    #[test]
    fn test_deserialize_partial_override() {
        let options: EnhancementOptions = toml::from_str(
            r#"
            use_effects = false
            frame_rate = 30
            transition = "cut"
            image_fit = "cover"
        "#,
        )
        .unwrap();
        assert!(!options.use_effects);
        assert_eq!(options.frame_rate, 30);
        assert_eq!(options.transition, TransitionStyle::Cut);
        assert_eq!(options.image_fit, ImageFit::Cover);
        // Untouched fields keep their defaults.
        assert!(options.zoom_effect);
        assert_eq!(options.width, 720);
    }
}
