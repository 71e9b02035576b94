use crate::matrix::Matrix;
use egui::Color32;

const NEGATIVE: (f32, f32, f32) = (58.0, 118.0, 175.0);
const CENTER: (f32, f32, f32) = (242.0, 242.0, 242.0);
const POSITIVE: (f32, f32, f32) = (190.0, 61.0, 68.0);

pub fn missing_color() -> Color32 {
    Color32::from_rgb(200, 200, 200)
}

/// Largest absolute value, so the scale is symmetric around zero.
pub fn color_limit(matrix: &Matrix) -> f64 {
    matrix
        .present_values()
        .filter(|v| v.is_finite())
        .fold(0.0, |acc, v| acc.max(v.abs()))
}

fn mix(from: (f32, f32, f32), to: (f32, f32, f32), t: f32) -> Color32 {
    let channel = |a: f32, b: f32| (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

/// Blue below zero, red above, near-white at zero; clamped at `limit`.
pub fn diverging_color(value: f64, limit: f64) -> Color32 {
    if !value.is_finite() || !limit.is_finite() || limit <= 0.0 {
        return mix(CENTER, CENTER, 0.0);
    }
    let t = (value / limit).clamp(-1.0, 1.0) as f32;
    if t < 0.0 {
        mix(CENTER, NEGATIVE, -t)
    } else {
        mix(CENTER, POSITIVE, t)
    }
}

fn linear_channel(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn relative_luminance(color: Color32) -> f32 {
    0.2126 * linear_channel(color.r())
        + 0.7152 * linear_channel(color.g())
        + 0.0722 * linear_channel(color.b())
}

/// Annotation color that stays readable on `fill`.
pub fn text_color_for(fill: Color32) -> Color32 {
    if relative_luminance(fill) < 0.408 {
        Color32::WHITE
    } else {
        Color32::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_center() {
        assert_eq!(diverging_color(0.0, 2.0), Color32::from_rgb(242, 242, 242));
        assert_eq!(diverging_color(-2.0, 2.0), Color32::from_rgb(58, 118, 175));
        assert_eq!(diverging_color(2.0, 2.0), Color32::from_rgb(190, 61, 68));
        assert_eq!(diverging_color(50.0, 2.0), diverging_color(2.0, 2.0));
    }

    #[test]
    fn degenerate_limits_map_to_center() {
        let center = Color32::from_rgb(242, 242, 242);
        assert_eq!(diverging_color(1.0, 0.0), center);
        assert_eq!(diverging_color(f64::NAN, 1.0), center);
    }

    #[test]
    fn text_contrasts_with_fill() {
        assert_eq!(text_color_for(Color32::from_rgb(242, 242, 242)), Color32::BLACK);
        assert_eq!(text_color_for(Color32::from_rgb(58, 118, 175)), Color32::WHITE);
    }
}
