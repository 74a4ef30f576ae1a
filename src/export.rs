//! Markdown rendering of stored reports.

use std::fmt::Write;

use crate::report::{ReportRecord, SectionBody};

/// Render a report as a standalone Markdown document.
pub fn to_markdown(record: &ReportRecord) -> String {
    let mut md = String::new();

    writeln!(md, "# {}\n", record.title).unwrap();
    writeln!(md, "**Company:** {}  ", record.company).unwrap();
    writeln!(md, "**Period:** {}  ", record.period).unwrap();
    if let Some(name) = &record.request.executive_name {
        writeln!(md, "**Prepared for:** {}  ", name).unwrap();
    }
    writeln!(
        md,
        "**Generated:** {}  ",
        record.created_at.format("%B %d, %Y")
    )
    .unwrap();
    writeln!(md, "**Model:** {}\n", record.model).unwrap();

    for section in &record.content.sections {
        writeln!(md, "## {}\n", section.title).unwrap();
        match &section.body {
            SectionBody::Text(text) => {
                writeln!(md, "{}\n", text.trim()).unwrap();
            }
            SectionBody::List(items) => {
                for item in items {
                    writeln!(md, "- {}", item).unwrap();
                }
                md.push('\n');
            }
        }
    }

    md.push_str("---\n\n");
    writeln!(md, "*Report id: {}*", record.id).unwrap();
    md
}

/// Download filename: `<company-slug>_<YYYYMMDD>.md`.
pub fn file_name(record: &ReportRecord) -> String {
    let mut slug = String::with_capacity(record.company.len());
    for c in record.company.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "report" } else { slug };

    format!("{}_{}.md", slug, record.created_at.format("%Y%m%d"))
}
