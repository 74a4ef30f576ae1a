use crate::consts::format_amount;
use crate::report::{ReportRequest, is_list_section, section_title};

const INTRO: &str = "You are a senior financial analyst writing an executive-level financial report.";
const TASK: &str = "Write the report from the company data below. Be professional, data-driven, and suitable for C-level executives.";
const COMPANY_LABEL: &str = "Company";
const SECTIONS_HEADER: &str = "Sections, in order:";
const KEYS_PREFIX: &str = "Respond with a JSON object whose keys are: ";
const RULES_HEADER: &str = "Rules:";
const RULES: &[&str] = &[
    "Output JSON only. No markdown, no extra text, no extra keys.",
    "Each value is a string of one to three paragraphs, except list sections.",
    "List sections are arrays of exactly 3 short strings.",
    "Ground every statement in the data given. Do not invent figures.",
];

/// Build the generation prompt for a normalized request.
///
/// Deterministic: the same request always yields the same prompt.
pub fn build_report_prompt(request: &ReportRequest) -> String {
    let mut data = Vec::new();
    data.push(format!("{COMPANY_LABEL}: {}", request.company));
    data.push(format!("Reporting period: {}", request.period));
    if let Some(title) = &request.title {
        data.push(format!("Report title: {title}"));
    }
    if let Some(name) = &request.executive_name {
        data.push(format!("Prepared for: {name}"));
    }
    if let Some(revenue) = request.revenue {
        data.push(format!("Revenue: {}", format_amount(revenue)));
    }
    if let Some(profit) = request.profit {
        data.push(format!("Profit: {}", format_amount(profit)));
    }
    if let Some(margin) = request.profit_margin() {
        data.push(format!("Profit margin: {margin:.1}%"));
    }
    if let Some(growth) = request.growth_percentage {
        data.push(format!("Growth: {growth}%"));
    }
    for (label, value) in [
        ("Sector trends", &request.sector_trends),
        ("Key metrics", &request.key_metrics),
        ("Identified risks", &request.risks),
        ("Proposed recommendations", &request.recommendations),
    ] {
        if let Some(value) = value {
            data.push(format!("{label}: {value}"));
        }
    }

    let sections = request
        .sections
        .iter()
        .map(|key| {
            if is_list_section(key) {
                format!("- {key}: {} (list)", section_title(key))
            } else {
                format!("- {key}: {}", section_title(key))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n{task}\n\n{data}\n\n{sections_header}\n{sections}\n\n{keys_prefix}{keys}\n\n{rules_header}\n{rules}\n",
        intro = INTRO,
        task = TASK,
        data = data.join("\n"),
        sections_header = SECTIONS_HEADER,
        sections = sections,
        keys_prefix = KEYS_PREFIX,
        keys = request.sections.join(", "),
        rules_header = RULES_HEADER,
        rules = rules
    )
}
