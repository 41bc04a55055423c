use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub stroke_color: String,
    pub glow_color: String,
    pub glow_blur: f32,
    pub marker_color: String,
    pub background: String,
}

impl Theme {
    /// White strokes with a pale blue halo, drawn over a dark page.
    pub fn electric() -> Self {
        Self {
            stroke_color: "#fff".to_string(),
            glow_color: "#eeeeff99".to_string(),
            glow_blur: 10.0,
            marker_color: "#fff".to_string(),
            background: "#312F54".to_string(),
        }
    }

    pub fn ink() -> Self {
        Self {
            stroke_color: "#392396".to_string(),
            glow_color: "#39239655".to_string(),
            glow_blur: 6.0,
            marker_color: "#392396".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "electric" | "default" => Some(Self::electric()),
            "ink" | "light" => Some(Self::ink()),
            _ => None,
        }
    }
}
