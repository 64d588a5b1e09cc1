use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Continuous colour scales
// ---------------------------------------------------------------------------

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Position of `value` within `[min, max]`, clamped to `0..=1`.
/// A degenerate range maps everything to the top of the scale.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    let range = max - min;
    if !range.is_finite() || range.abs() < f64::EPSILON {
        return 1.0;
    }
    ((value - min) / range).clamp(0.0, 1.0) as f32
}

/// Sequential blue ramp: pale at 0, deep blue at 1.
pub fn blues(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    hsl_to_color32(Hsl::new(210.0, 0.65, 0.95 - 0.60 * t))
}

/// Diverging red → amber → green ramp for profit, centred at 0.5.
pub fn profit_scale(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    hsl_to_color32(Hsl::new(120.0 * t, 0.70, 0.50))
}

/// Text colour that stays readable on top of `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Colour for a profit value, symmetric around zero so losses are red and
/// gains green regardless of the range's skew.
pub fn profit_color(profit: f64, max_abs: f64) -> Color32 {
    profit_scale(normalize(profit, -max_abs, max_abs))
}
