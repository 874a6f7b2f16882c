//! The state reducer: the only place a `ResumeState` changes.
//!
//! `reduce` is a pure transition. It reads the current state, never mutates it, and returns
//! either the fully-applied next state or an error (in which case the caller keeps the old one).
//! The only non-reproducible input is id generation, which comes in through `ReducerEnv`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::catalog::Catalog;
use crate::builder::ids::IdGenerator;
use crate::builder::model::{
    fresh_id, ColorToken, FontFamily, FontScale, ModelError, PersonalDetails, ResumeDocument,
    ResumeState, SectionItem, SectionKind, TemplateId,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    #[error("index {index} is out of range for {section} (len {len})")]
    IndexOutOfRange {
        section: SectionKind,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    InvalidDocument(#[from] ModelError),
}

// ────────────────────────────────────────────────────────────────────────────
// Actions
// ────────────────────────────────────────────────────────────────────────────

/// Wire form: `{"type": "UPDATE_SUMMARY", "payload": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the whole state (gallery pick or storage hydration).
    #[serde(rename = "LOAD_DATA")]
    LoadDocument(ResumeState),
    /// Switch template and load its starter content, keeping personal details.
    SetTemplate(TemplateId),
    SetColor(ColorToken),
    SetFontFamily(FontFamily),
    #[serde(rename = "SET_FONT_SIZE")]
    SetFontScale(FontScale),
    #[serde(rename = "UPDATE_PERSONAL")]
    UpdatePersonalField(PersonalPatch),
    UpdateSummary(String),
    AddItem {
        section: SectionKind,
    },
    UpdateField(FieldEdit),
    DeleteItem {
        section: SectionKind,
        index: usize,
    },
}

/// Partial personal details; only the `Some` fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    /// An empty string removes the photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl PersonalPatch {
    fn apply(self, personal: &mut PersonalDetails) {
        let PersonalPatch {
            full_name,
            job_title,
            email,
            phone,
            address,
            linkedin,
            github,
            profile_photo,
        } = self;
        let merge = |slot: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *slot = value;
            }
        };
        merge(&mut personal.full_name, full_name);
        merge(&mut personal.job_title, job_title);
        merge(&mut personal.email, email);
        merge(&mut personal.phone, phone);
        merge(&mut personal.address, address);
        merge(&mut personal.linkedin, linkedin);
        merge(&mut personal.github, github);
        if let Some(photo) = profile_photo {
            personal.profile_photo = Some(photo).filter(|p| !p.trim().is_empty());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceField {
    Company,
    Role,
    Date,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EducationField {
    Institution,
    Degree,
    Date,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillField {
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomSectionField {
    Title,
    Content,
}

/// A single-field edit, tagged by section so each section only accepts its own fields.
///
/// Wire form: `{"section": "experience", "index": 0, "field": "role", "value": "CTO"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum FieldEdit {
    Experience {
        index: usize,
        field: ExperienceField,
        value: String,
    },
    Education {
        index: usize,
        field: EducationField,
        value: String,
    },
    Skills {
        index: usize,
        field: SkillField,
        value: String,
    },
    CustomSections {
        index: usize,
        field: CustomSectionField,
        value: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Reducer
// ────────────────────────────────────────────────────────────────────────────

/// Collaborators the reducer reads from: starter documents and the id source.
pub struct ReducerEnv<'a> {
    pub catalog: &'a Catalog,
    pub ids: &'a dyn IdGenerator,
}

pub fn reduce(
    state: &ResumeState,
    action: Action,
    env: &ReducerEnv<'_>,
) -> Result<ResumeState, ReduceError> {
    let mut next = state.clone();

    match action {
        Action::LoadDocument(loaded) => {
            loaded.data.validate()?;
            return Ok(loaded);
        }
        Action::SetTemplate(template) => {
            // No starter for this template: fall back to the blank document.
            let starter = env
                .catalog
                .template_example(template)
                .unwrap_or_else(|| env.catalog.blank());
            next.style.template_id = template;
            next.data = ResumeDocument {
                personal: state.data.personal.clone(),
                ..starter.clone()
            };
        }
        Action::SetColor(color) => next.style.color = color,
        Action::SetFontFamily(font) => next.style.font_family = font,
        Action::SetFontScale(scale) => next.style.font_size = scale,
        Action::UpdatePersonalField(patch) => patch.apply(&mut next.data.personal),
        Action::UpdateSummary(summary) => next.data.summary = summary,
        Action::AddItem { section } => {
            let data = &mut next.data;
            match section {
                SectionKind::Experience => push_blank(&mut data.experience, env.ids),
                SectionKind::Education => push_blank(&mut data.education, env.ids),
                SectionKind::Skills => push_blank(&mut data.skills, env.ids),
                SectionKind::CustomSections => push_blank(&mut data.custom_sections, env.ids),
            }
        }
        Action::UpdateField(edit) => apply_edit(&mut next.data, edit)?,
        Action::DeleteItem { section, index } => {
            let data = &mut next.data;
            match section {
                SectionKind::Experience => remove_at(&mut data.experience, index)?,
                SectionKind::Education => remove_at(&mut data.education, index)?,
                SectionKind::Skills => remove_at(&mut data.skills, index)?,
                SectionKind::CustomSections => remove_at(&mut data.custom_sections, index)?,
            }
        }
    }

    Ok(next)
}

fn push_blank<T: SectionItem>(items: &mut Vec<T>, ids: &dyn IdGenerator) {
    let id = fresh_id(ids, |candidate| items.iter().any(|i| i.id() == candidate));
    items.push(T::blank(id));
}

fn item_mut<T: SectionItem>(items: &mut [T], index: usize) -> Result<&mut T, ReduceError> {
    let len = items.len();
    items.get_mut(index).ok_or(ReduceError::IndexOutOfRange {
        section: T::SECTION,
        index,
        len,
    })
}

/// Order-preserving removal.
fn remove_at<T: SectionItem>(items: &mut Vec<T>, index: usize) -> Result<(), ReduceError> {
    if index >= items.len() {
        return Err(ReduceError::IndexOutOfRange {
            section: T::SECTION,
            index,
            len: items.len(),
        });
    }
    items.remove(index);
    Ok(())
}

fn apply_edit(data: &mut ResumeDocument, edit: FieldEdit) -> Result<(), ReduceError> {
    match edit {
        FieldEdit::Experience {
            index,
            field,
            value,
        } => {
            let item = item_mut(&mut data.experience, index)?;
            let slot = match field {
                ExperienceField::Company => &mut item.company,
                ExperienceField::Role => &mut item.role,
                ExperienceField::Date => &mut item.date,
                ExperienceField::Description => &mut item.description,
            };
            *slot = value;
        }
        FieldEdit::Education {
            index,
            field,
            value,
        } => {
            let item = item_mut(&mut data.education, index)?;
            let slot = match field {
                EducationField::Institution => &mut item.institution,
                EducationField::Degree => &mut item.degree,
                EducationField::Date => &mut item.date,
                EducationField::Description => &mut item.description,
            };
            *slot = value;
        }
        FieldEdit::Skills {
            index,
            field: SkillField::Name,
            value,
        } => {
            item_mut(&mut data.skills, index)?.name = value;
        }
        FieldEdit::CustomSections {
            index,
            field,
            value,
        } => {
            let item = item_mut(&mut data.custom_sections, index)?;
            let slot = match field {
                CustomSectionField::Title => &mut item.title,
                CustomSectionField::Content => &mut item.content,
            };
            *slot = value;
        }
    }
    Ok(())
}
