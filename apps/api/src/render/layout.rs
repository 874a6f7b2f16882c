//! Layout description produced by the renderer and consumed by the preview and the PDF export.

use serde::Serialize;

use crate::builder::model::{ColorToken, FontFamily, SectionKind, TemplateId};

/// Nominal page width in CSS pixels (A4 at 96 DPI).
pub const PAGE_WIDTH_PX: f32 = 816.0;
/// Portrait ISO A-series ratio (√2).
pub const PAGE_ASPECT_RATIO: f32 = 1.414;
/// Body font size before the style's font scale is applied.
pub const BASE_FONT_PX: f32 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub template: TemplateId,
    pub page: PageGeometry,
    pub typography: Typography,
    /// The single accent color. Every `Tone::Accent` / `Surface::Accent` resolves to it.
    pub accent: Accent,
    pub columns: Vec<Column>,
}

impl Layout {
    /// All blocks in reading order (sidebar first, then main).
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.columns.iter().flat_map(|c| c.blocks.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_px: f32,
    pub aspect_ratio: f32,
}

impl PageGeometry {
    pub fn height_px(&self) -> f32 {
        self.width_px * self.aspect_ratio
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_px: PAGE_WIDTH_PX,
            aspect_ratio: PAGE_ASPECT_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Typography {
    pub font: FontFamily,
    pub base_size_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accent {
    pub token: ColorToken,
    pub hex: &'static str,
}

impl From<ColorToken> for Accent {
    fn from(token: ColorToken) -> Self {
        Self {
            token,
            hex: token.hex(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Columns and blocks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Sidebar,
    Main,
    Full,
}

/// Background of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Plain,
    Muted,
    Accent,
}

/// Foreground role of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Default,
    Muted,
    Accent,
    /// Light text drawn on an accent surface.
    OnAccent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub role: ColumnRole,
    pub width_fraction: f32,
    pub surface: Surface,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
}

/// Where the profile photo sits relative to the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoPlacement {
    /// Centered above the name.
    Stacked,
    /// On the same row, left of the name.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub source: String,
    pub placement: PhotoPlacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub full_name: String,
    pub job_title: String,
    pub photo: Option<Photo>,
    pub alignment: Alignment,
    pub surface: Surface,
    pub name_tone: Tone,
    pub title_tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Address,
    Linkedin,
    Github,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactItem {
    pub kind: ContactKind,
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeading {
    pub text: String,
    pub tone: Tone,
    /// Accent rule under the heading.
    pub underline: bool,
}

/// An experience or education entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedEntry {
    pub id: String,
    /// Role or degree.
    pub heading: String,
    /// Company or institution.
    pub organization: String,
    pub date: String,
    /// Free text, embedded line breaks preserved verbatim.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Header(Header),
    Contact {
        items: Vec<ContactItem>,
        surface: Surface,
        tone: Tone,
    },
    Summary {
        heading: SectionHeading,
        text: String,
    },
    Entries {
        section: SectionKind,
        heading: SectionHeading,
        entries: Vec<DatedEntry>,
    },
    Pills {
        heading: SectionHeading,
        tone: Tone,
        items: Vec<String>,
    },
    Custom {
        id: String,
        heading: SectionHeading,
        content: String,
    },
}
