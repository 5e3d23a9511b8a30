use crate::upload::{NotificationLevel, UploadStatus};
use eframe::egui::Color32;

pub const ACCENT: &str = "#5B8DEF";
const SUCCESS: &str = "#22A35A";
const DANGER: &str = "#DC3232";
const MUTED: &str = "#969696";

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

fn palette(hex: &str) -> Color32 {
    Color32::from_hex(hex).unwrap_or(Color32::GRAY)
}

pub fn accent() -> Color32 {
    palette(ACCENT)
}

/// Badge colour for a file row.
pub fn status_color(status: UploadStatus) -> Color32 {
    match status {
        UploadStatus::Uploading => palette(MUTED),
        UploadStatus::Complete => palette(SUCCESS),
        UploadStatus::Error => palette(DANGER),
    }
}

pub fn notification_color(level: NotificationLevel) -> Color32 {
    match level {
        NotificationLevel::Success => palette(SUCCESS),
        NotificationLevel::Error => palette(DANGER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        assert_eq!(
            Color32::from_hex("#DC3232"),
            Some(Color32::from_rgb(220, 50, 50))
        );
        assert_eq!(Color32::from_hex("zzzzzz"), None);
        assert_eq!(Color32::from_hex("#fff"), None);
    }

    #[test]
    fn error_badge_is_red() {
        assert_eq!(
            status_color(UploadStatus::Error),
            Color32::from_rgb(220, 50, 50)
        );
    }
}
