//! Typst source for a `Layout`.
//!
//! All user text is emitted as escaped string literals, never as markup, so no resume content
//! can inject Typst syntax. Embedded newlines in strings become line breaks.

use crate::builder::model::FontFamily;
use crate::render::layout::{
    Alignment, Block, Column, ContactItem, DatedEntry, Header, Layout, PhotoPlacement,
    SectionHeading, Surface, Tone,
};

/// A4 width in points; the layout's pixel width maps onto it.
pub const A4_WIDTH_PT: f32 = 595.28;

const TEXT_COLOR: &str = "rgb(\"#1f2937\")";
const MUTED_COLOR: &str = "rgb(\"#4b5563\")";
const MUTED_SURFACE: &str = "rgb(\"#f3f4f6\")";
const COLUMN_INSET_PX: f32 = 32.0;
const PHOTO_PX: f32 = 128.0;

/// `photo` is the path of the materialized profile photo relative to the source file.
pub fn document(layout: &Layout, photo: Option<&str>) -> String {
    let pt = A4_WIDTH_PT / layout.page.width_px;
    let widths: Vec<String> = layout
        .columns
        .iter()
        .map(|c| format!("{:.2}pt", c.width_fraction * A4_WIDTH_PT))
        .collect();
    let cells: String = layout
        .columns
        .iter()
        .map(|column| format!("{},\n", column_cell(column, pt, photo)))
        .collect();

    format!(
        "#set page(width: {:.2}pt, height: {:.2}pt, margin: 0pt)\n\
         #set text(font: {}, size: {:.2}pt, fill: {TEXT_COLOR})\n\
         #set par(leading: 0.5em, spacing: 0.6em)\n\
         #let accent = rgb({})\n\
         #grid(columns: ({},), rows: (100%,),\n\
         {cells})\n",
        A4_WIDTH_PT,
        layout.page.height_px() * pt,
        font_stack(layout.typography.font),
        layout.typography.base_size_px * pt,
        lit(layout.accent.hex),
        widths.join(", "),
    )
}

fn font_stack(font: FontFamily) -> &'static str {
    match font {
        FontFamily::Sans => r#"("Inter", "Liberation Sans", "DejaVu Sans")"#,
        FontFamily::Serif => r#"("Libertinus Serif", "Liberation Serif", "DejaVu Serif")"#,
        FontFamily::Mono => r#"("DejaVu Sans Mono", "Liberation Mono")"#,
    }
}

fn column_cell(column: &Column, pt: f32, photo: Option<&str>) -> String {
    let body: Vec<String> = column
        .blocks
        .iter()
        .map(|block| render_block(block, pt, photo))
        .collect();
    format!(
        "block(width: 100%, height: 100%, fill: {}, inset: {:.2}pt)[\n{}\n]",
        surface_fill(column.surface),
        COLUMN_INSET_PX * pt,
        body.join("\n#v(1.2em)\n")
    )
}

fn surface_fill(surface: Surface) -> &'static str {
    match surface {
        Surface::Plain => "none",
        Surface::Muted => MUTED_SURFACE,
        Surface::Accent => "accent",
    }
}

fn tone_fill(tone: Tone) -> &'static str {
    match tone {
        Tone::Default => TEXT_COLOR,
        Tone::Muted => MUTED_COLOR,
        Tone::Accent => "accent",
        Tone::OnAccent => "white",
    }
}

fn render_block(block: &Block, pt: f32, photo: Option<&str>) -> String {
    match block {
        Block::Header(header) => render_header(header, pt, photo),
        Block::Contact { items, surface, tone } => render_contact(items, *surface, *tone),
        Block::Summary { heading, text } => {
            format!("{}\n#text({})", render_heading(heading), lit(text))
        }
        Block::Entries {
            heading, entries, ..
        } => {
            let entries: Vec<String> = entries.iter().map(render_entry).collect();
            format!("{}\n{}", render_heading(heading), entries.join("\n#v(0.6em)\n"))
        }
        Block::Pills {
            heading,
            tone,
            items,
        } => {
            let pills: Vec<String> = items.iter().map(|item| render_pill(item, *tone)).collect();
            format!("{}\n{}", render_heading(heading), pills.join(" "))
        }
        Block::Custom {
            heading, content, ..
        } => format!("{}\n#text({})", render_heading(heading), lit(content)),
    }
}

fn render_header(header: &Header, pt: f32, photo: Option<&str>) -> String {
    let align = match header.alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
    };
    let name = format!(
        "text(size: 2.25em, weight: \"bold\", fill: {}, {})",
        tone_fill(header.name_tone),
        lit(&header.full_name)
    );
    let title = format!(
        "text(size: 1.25em, fill: {}, {})",
        tone_fill(header.title_tone),
        lit(&header.job_title)
    );
    let text_stack = format!("stack(spacing: 0.4em, {name}, {title})");

    let picture = match (&header.photo, photo) {
        (Some(placement), Some(path)) => Some((placement.placement, photo_box(path, pt))),
        _ => None,
    };

    let inner = match picture {
        Some((PhotoPlacement::Stacked, picture)) => {
            format!("stack(spacing: 1em, align(center, {picture}), {text_stack})")
        }
        Some((PhotoPlacement::Inline, picture)) => format!(
            "grid(columns: (auto, 1fr), column-gutter: 1.5em, align: horizon, {picture}, {text_stack})"
        ),
        None => text_stack,
    };

    let inset = match header.surface {
        Surface::Plain => String::new(),
        _ => format!(", inset: {:.2}pt", 16.0 * pt),
    };
    format!(
        "#block(width: 100%, fill: {}{inset}, align({align}, {inner}))",
        surface_fill(header.surface)
    )
}

fn photo_box(path: &str, pt: f32) -> String {
    let size = PHOTO_PX * pt;
    format!(
        "box(width: {size:.2}pt, height: {size:.2}pt, radius: 50%, clip: true, \
         image({}, width: 100%, height: 100%, fit: \"cover\"))",
        lit(path)
    )
}

fn render_contact(items: &[ContactItem], surface: Surface, tone: Tone) -> String {
    if items.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = items
        .iter()
        .map(|item| {
            let label = format!("text(fill: {}, {})", tone_fill(tone), lit(&item.text));
            match &item.href {
                Some(href) => format!("link({}, {label})", lit(href)),
                None => label,
            }
        })
        .collect();
    // Accent columns stack contact lines; single-column variants run them in a row.
    let separator = match surface {
        Surface::Accent => "linebreak()",
        _ => "h(1.2em)",
    };
    format!(
        "#block(width: 100%, fill: {}, inset: 0.6em)[#({},).join({separator})]",
        surface_fill(surface),
        parts.join(", ")
    )
}

fn render_heading(heading: &SectionHeading) -> String {
    let title = format!(
        "text(size: 1.25em, weight: \"bold\", fill: {}, upper({}))",
        tone_fill(heading.tone),
        lit(&heading.text)
    );
    let rule = if heading.underline {
        ", line(length: 100%, stroke: 1pt + accent)"
    } else {
        ""
    };
    format!("#block(width: 100%, below: 0.8em, stack(spacing: 0.3em, {title}{rule}))")
}

fn render_entry(entry: &DatedEntry) -> String {
    format!(
        "#stack(spacing: 0.4em, \
         grid(columns: (1fr, auto), text(weight: \"bold\", {}), text(fill: {MUTED_COLOR}, {})), \
         text(style: \"italic\", {}), \
         text({}))",
        lit(&entry.heading),
        lit(&entry.date),
        lit(&entry.organization),
        lit(&entry.body)
    )
}

fn render_pill(item: &str, tone: Tone) -> String {
    let (fill, text) = match tone {
        Tone::OnAccent => ("white.transparentize(80%)", "white"),
        _ => ("accent.transparentize(85%)", "accent"),
    };
    format!(
        "#box(fill: {fill}, inset: (x: 0.6em, y: 0.3em), radius: 1em, outset: (y: 0.2em), \
         text(size: 0.85em, fill: {text}, {}))",
        lit(item)
    )
}

/// Quoted, escaped Typst string literal.
pub fn lit(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
