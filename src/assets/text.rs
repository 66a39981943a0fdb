//! Text asset settings, accumulated across header sections rather than
//! read in one shot.

use crate::datum::Datum;

/// Horizontal alignment of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Right,
    Center,
}

impl Justification {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x025c => Some(Self::Left),
            0x025d => Some(Self::Right),
            0x025e => Some(Self::Center),
            _ => None,
        }
    }
}

/// Vertical alignment of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalPosition {
    Middle,
    Top,
    Bottom,
}

impl VerticalPosition {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x025e => Some(Self::Middle),
            0x0260 => Some(Self::Top),
            0x0261 => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Everything a text asset declares in its header.
#[derive(Debug, Clone, Default)]
pub struct TextSettings {
    pub font_asset_id: Option<u32>,
    pub initial_text: Option<String>,
    pub max_width: Option<u32>,
    pub justification: Option<Justification>,
    pub position: Option<VerticalPosition>,
    /// Accepted character ranges, kept as raw values.
    pub character_ranges: Vec<Datum>,
}
