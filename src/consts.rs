//! Project-wide constants.

/// Default Gemini model when none is specified.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Placeholder key shipped in sample `.env` files. Treated as "no key".
pub const DEMO_API_KEY: &str = "demo_key";

/// Default cap on generated output, in tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Sections produced when a request does not name any.
pub const DEFAULT_SECTIONS: &[&str] = &[
    "executive_summary",
    "key_trends",
    "risks",
    "recommendations",
    "top_risks",
    "top_recommendations",
];

pub const MAX_COMPANY_LEN: usize = 255;
pub const MAX_SECTIONS: usize = 12;
pub const MAX_SECTION_KEY_LEN: usize = 64;

/// Page size for report listings when the caller does not pass one.
pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 200;

/// Format an amount with comma separators and two decimals (e.g. 1,234,567.50).
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
