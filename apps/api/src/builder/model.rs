//! Resume document and style schema.
//!
//! The JSON shape is camelCase so documents persisted by the browser client
//! (`fullName`, `customSections`, `templateId`, …) load unchanged.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::ids::IdGenerator;

pub const FONT_SCALE_MIN: f32 = 0.8;
pub const FONT_SCALE_MAX: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("template id must be between 1 and 4, got {0}")]
    UnknownTemplate(u8),

    #[error("font scale must be within 0.8..=1.2, got {0}")]
    FontScaleOutOfRange(f32),

    #[error("duplicate item id '{id}' in {section}")]
    DuplicateItemId { section: SectionKind, id: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub full_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub github: String,
    /// Data URI or URL. An empty string is treated the same as `None` when rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl PersonalDetails {
    pub fn photo(&self) -> Option<&str> {
        self.profile_photo
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub role: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// The four repeatable sections of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Experience,
    Education,
    Skills,
    CustomSections,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::CustomSections => "customSections",
        })
    }
}

/// Common surface of items living in a repeatable section.
pub trait SectionItem: Clone {
    const SECTION: SectionKind;

    /// A new item with empty fields.
    fn blank(id: String) -> Self;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

impl SectionItem for Experience {
    const SECTION: SectionKind = SectionKind::Experience;

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl SectionItem for Education {
    const SECTION: SectionKind = SectionKind::Education;

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl SectionItem for Skill {
    const SECTION: SectionKind = SectionKind::Skills;

    fn blank(id: String) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl SectionItem for CustomSection {
    const SECTION: SectionKind = SectionKind::CustomSections;

    fn blank(id: String) -> Self {
        Self {
            id,
            title: "New Section".to_string(),
            content: String::new(),
        }
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal: PersonalDetails,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub custom_sections: Vec<CustomSection>,
}

impl ResumeDocument {
    /// Checks that item ids are unique within each section.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_unique(&self.experience)?;
        check_unique(&self.education)?;
        check_unique(&self.skills)?;
        check_unique(&self.custom_sections)?;
        Ok(())
    }

    /// Reassigns fresh ids to items whose id is empty or already taken in their section.
    /// Returns the number of items that were renamed.
    pub fn repair_ids(&mut self, ids: &dyn IdGenerator) -> usize {
        repair(&mut self.experience, ids)
            + repair(&mut self.education, ids)
            + repair(&mut self.skills, ids)
            + repair(&mut self.custom_sections, ids)
    }
}

fn check_unique<T: SectionItem>(items: &[T]) -> Result<(), ModelError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(ModelError::DuplicateItemId {
                section: T::SECTION,
                id: item.id().to_string(),
            });
        }
    }
    Ok(())
}

fn repair<T: SectionItem>(items: &mut [T], ids: &dyn IdGenerator) -> usize {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut renamed = 0;
    for item in items.iter_mut() {
        if item.id().is_empty() || seen.contains(item.id()) {
            let fresh = fresh_id(ids, |candidate| seen.contains(candidate));
            item.set_id(fresh);
            renamed += 1;
        }
        seen.insert(item.id().to_string());
    }
    renamed
}

/// Draws ids until one is not `taken`.
pub fn fresh_id(ids: &dyn IdGenerator, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = ids.next_id();
        if !taken(&candidate) {
            return candidate;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Style
// ────────────────────────────────────────────────────────────────────────────

/// The four layout variants. The wire form is the number 1–4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TemplateId {
    /// Two columns, colored sidebar with photo.
    Sidebar = 1,
    /// Single column, centered header, no photo.
    Classic = 2,
    /// Single column, photo inline beside the name.
    Creative = 3,
    /// Single column, left-aligned header, no photo.
    Minimal = 4,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Sidebar,
        TemplateId::Classic,
        TemplateId::Creative,
        TemplateId::Minimal,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TemplateId {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TemplateId::Sidebar),
            2 => Ok(TemplateId::Classic),
            3 => Ok(TemplateId::Creative),
            4 => Ok(TemplateId::Minimal),
            other => Err(ModelError::UnknownTemplate(other)),
        }
    }
}

impl From<TemplateId> for u8 {
    fn from(id: TemplateId) -> Self {
        id.number()
    }
}

/// Named accent palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    #[serde(alias = "bg-blue-800")]
    Blue,
    #[serde(alias = "bg-green-800")]
    Green,
    #[serde(alias = "bg-slate-800")]
    Slate,
    #[serde(alias = "bg-red-800")]
    Red,
    #[serde(alias = "bg-purple-800")]
    Purple,
}

impl ColorToken {
    pub const ALL: [ColorToken; 5] = [
        ColorToken::Blue,
        ColorToken::Green,
        ColorToken::Slate,
        ColorToken::Red,
        ColorToken::Purple,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColorToken::Blue => "Default Blue",
            ColorToken::Green => "Forest Green",
            ColorToken::Slate => "Slate Gray",
            ColorToken::Red => "Ruby Red",
            ColorToken::Purple => "Deep Purple",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Blue => "#1e40af",
            ColorToken::Green => "#166534",
            ColorToken::Slate => "#1e293b",
            ColorToken::Red => "#991b1b",
            ColorToken::Purple => "#6b21a8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[serde(alias = "font-sans")]
    Sans,
    #[serde(alias = "font-serif")]
    Serif,
    #[serde(alias = "font-mono")]
    Mono,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Sans, FontFamily::Serif, FontFamily::Mono];

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Sans => "Sans Serif",
            FontFamily::Serif => "Serif",
            FontFamily::Mono => "Monospace",
        }
    }
}

/// Multiplier on the base font size, always within `[0.8, 1.2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct FontScale(f32);

impl FontScale {
    pub fn new(value: f32) -> Result<Self, ModelError> {
        if value.is_finite() && (FONT_SCALE_MIN..=FONT_SCALE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::FontScaleOutOfRange(value))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for FontScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f32> for FontScale {
    type Error = ModelError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FontScale> for f32 {
    fn from(scale: FontScale) -> Self {
        scale.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub template_id: TemplateId,
    pub color: ColorToken,
    pub font_family: FontFamily,
    pub font_size: FontScale,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            template_id: TemplateId::Sidebar,
            color: ColorToken::Blue,
            font_family: FontFamily::Sans,
            font_size: FontScale::default(),
        }
    }
}

/// Document plus style: the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    pub data: ResumeDocument,
    pub style: StyleConfig,
}
