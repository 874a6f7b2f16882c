//! The four template variants.
//!
//! | id | columns              | header                 | photo          |
//! |----|----------------------|------------------------|----------------|
//! | 1  | accent sidebar + main| centered, on accent    | stacked        |
//! | 2  | single               | centered, accent name  | never          |
//! | 3  | single               | left row, on accent    | inline         |
//! | 4  | single               | left, accent job title | never          |
//!
//! Section order in single-column variants: Summary, Experience, Education, Skills, custom
//! sections. Variant 1 puts Education and Skills in the sidebar only. Custom sections always
//! come last, in document order.

use crate::builder::model::{PersonalDetails, ResumeDocument, SectionKind, StyleConfig, TemplateId};
use crate::render::layout::{
    Alignment, Block, Column, ColumnRole, ContactItem, ContactKind, DatedEntry, Header, Layout,
    PageGeometry, Photo, PhotoPlacement, SectionHeading, Surface, Tone, Typography, BASE_FONT_PX,
};

/// Renders a document with the given style.
pub fn render(doc: &ResumeDocument, style: &StyleConfig) -> Layout {
    let columns = match style.template_id {
        TemplateId::Sidebar => sidebar_columns(doc),
        TemplateId::Classic => single_column(
            doc,
            HeaderSpec {
                alignment: Alignment::Center,
                placement: None,
                surface: Surface::Plain,
                name_tone: Tone::Accent,
                title_tone: Tone::Muted,
            },
            true,
        ),
        TemplateId::Creative => single_column(
            doc,
            HeaderSpec {
                alignment: Alignment::Left,
                placement: Some(PhotoPlacement::Inline),
                surface: Surface::Accent,
                name_tone: Tone::OnAccent,
                title_tone: Tone::OnAccent,
            },
            false,
        ),
        TemplateId::Minimal => single_column(
            doc,
            HeaderSpec {
                alignment: Alignment::Left,
                placement: None,
                surface: Surface::Plain,
                name_tone: Tone::Default,
                title_tone: Tone::Accent,
            },
            true,
        ),
    };

    Layout {
        template: style.template_id,
        page: PageGeometry::default(),
        typography: Typography {
            font: style.font_family,
            base_size_px: BASE_FONT_PX * style.font_size.get(),
        },
        accent: style.color.into(),
        columns,
    }
}

struct HeaderSpec {
    alignment: Alignment,
    placement: Option<PhotoPlacement>,
    surface: Surface,
    name_tone: Tone,
    title_tone: Tone,
}

fn header(personal: &PersonalDetails, spec: HeaderSpec) -> Block {
    let photo = spec.placement.and_then(|placement| {
        personal.photo().map(|source| Photo {
            source: source.to_string(),
            placement,
        })
    });
    Block::Header(Header {
        full_name: personal.full_name.clone(),
        job_title: personal.job_title.clone(),
        photo,
        alignment: spec.alignment,
        surface: spec.surface,
        name_tone: spec.name_tone,
        title_tone: spec.title_tone,
    })
}

fn sidebar_columns(doc: &ResumeDocument) -> Vec<Column> {
    let on_accent = |text: &str| SectionHeading {
        text: text.to_string(),
        tone: Tone::OnAccent,
        underline: false,
    };

    let sidebar = Column {
        role: ColumnRole::Sidebar,
        width_fraction: 1.0 / 3.0,
        surface: Surface::Accent,
        blocks: vec![
            header(
                &doc.personal,
                HeaderSpec {
                    alignment: Alignment::Center,
                    placement: Some(PhotoPlacement::Stacked),
                    surface: Surface::Accent,
                    name_tone: Tone::OnAccent,
                    title_tone: Tone::OnAccent,
                },
            ),
            Block::Contact {
                items: contact_items(&doc.personal),
                surface: Surface::Accent,
                tone: Tone::OnAccent,
            },
            education_block(doc, on_accent("Education")),
            Block::Pills {
                heading: on_accent("Skills"),
                tone: Tone::OnAccent,
                items: skill_names(doc),
            },
        ],
    };

    let mut main_blocks = vec![
        summary_block(doc, accent_heading("Summary", false)),
        experience_block(doc, accent_heading("Experience", false)),
    ];
    main_blocks.extend(custom_blocks(doc, false));

    let main = Column {
        role: ColumnRole::Main,
        width_fraction: 2.0 / 3.0,
        surface: Surface::Plain,
        blocks: main_blocks,
    };

    vec![sidebar, main]
}

fn single_column(doc: &ResumeDocument, spec: HeaderSpec, underline: bool) -> Vec<Column> {
    let mut blocks = vec![
        header(&doc.personal, spec),
        Block::Contact {
            items: contact_items(&doc.personal),
            surface: Surface::Muted,
            tone: Tone::Muted,
        },
        summary_block(doc, accent_heading("Summary", underline)),
        experience_block(doc, accent_heading("Experience", underline)),
        education_block(doc, accent_heading("Education", underline)),
        Block::Pills {
            heading: accent_heading("Skills", underline),
            tone: Tone::Accent,
            items: skill_names(doc),
        },
    ];
    blocks.extend(custom_blocks(doc, underline));

    vec![Column {
        role: ColumnRole::Full,
        width_fraction: 1.0,
        surface: Surface::Plain,
        blocks,
    }]
}

fn accent_heading(text: &str, underline: bool) -> SectionHeading {
    SectionHeading {
        text: text.to_string(),
        tone: Tone::Accent,
        underline,
    }
}

fn summary_block(doc: &ResumeDocument, heading: SectionHeading) -> Block {
    Block::Summary {
        heading,
        text: doc.summary.clone(),
    }
}

fn experience_block(doc: &ResumeDocument, heading: SectionHeading) -> Block {
    Block::Entries {
        section: SectionKind::Experience,
        heading,
        entries: doc
            .experience
            .iter()
            .map(|e| DatedEntry {
                id: e.id.clone(),
                heading: e.role.clone(),
                organization: e.company.clone(),
                date: e.date.clone(),
                body: e.description.clone(),
            })
            .collect(),
    }
}

fn education_block(doc: &ResumeDocument, heading: SectionHeading) -> Block {
    Block::Entries {
        section: SectionKind::Education,
        heading,
        entries: doc
            .education
            .iter()
            .map(|e| DatedEntry {
                id: e.id.clone(),
                heading: e.degree.clone(),
                organization: e.institution.clone(),
                date: e.date.clone(),
                body: e.description.clone(),
            })
            .collect(),
    }
}

fn skill_names(doc: &ResumeDocument) -> Vec<String> {
    doc.skills.iter().map(|s| s.name.clone()).collect()
}

fn custom_blocks(doc: &ResumeDocument, underline: bool) -> impl Iterator<Item = Block> + '_ {
    doc.custom_sections.iter().map(move |section| Block::Custom {
        id: section.id.clone(),
        heading: accent_heading(&section.title, underline),
        content: section.content.clone(),
    })
}

/// Non-empty contact fields in display order.
fn contact_items(personal: &PersonalDetails) -> Vec<ContactItem> {
    let fields = [
        (ContactKind::Email, &personal.email),
        (ContactKind::Phone, &personal.phone),
        (ContactKind::Address, &personal.address),
        (ContactKind::Linkedin, &personal.linkedin),
        (ContactKind::Github, &personal.github),
    ];

    fields
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(kind, value)| {
            let text = value.trim().to_string();
            let href = match kind {
                ContactKind::Email => Some(format!("mailto:{text}")),
                ContactKind::Phone => Some(format!("tel:{text}")),
                ContactKind::Address => None,
                ContactKind::Linkedin | ContactKind::Github => Some(web_link(&text)),
            };
            ContactItem { kind, text, href }
        })
        .collect()
}

fn web_link(text: &str) -> String {
    if text.starts_with("http://") || text.starts_with("https://") {
        text.to_string()
    } else {
        format!("https://{text}")
    }
}
