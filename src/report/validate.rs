//! Request validation and normalization.
//!
//! Runs before anything leaves the process: a request that fails here never
//! reaches the model API.

use super::ReportRequest;
use crate::consts::{DEFAULT_SECTIONS, MAX_COMPANY_LEN, MAX_SECTIONS, MAX_SECTION_KEY_LEN};
use crate::error::{ReportError, Result};

/// Check a request and return its canonical form.
pub fn normalize(request: ReportRequest) -> Result<ReportRequest> {
    let company = request.company.trim().to_string();
    if company.is_empty() {
        return Err(invalid("company is required"));
    }
    if company.chars().count() > MAX_COMPANY_LEN {
        return Err(invalid(format!(
            "company must be at most {MAX_COMPANY_LEN} characters"
        )));
    }

    if request.period.trim().is_empty() {
        return Err(invalid("period is required"));
    }
    let period = normalize_period(&request.period).ok_or_else(|| {
        invalid(format!(
            "period '{}' is not one of YYYY, YYYY-Qn, YYYY-Hn, YYYY-MM",
            request.period.trim()
        ))
    })?;

    let sections = normalize_sections(&request.sections)?;

    for (name, value) in [
        ("revenue", request.revenue),
        ("profit", request.profit),
        ("growth_percentage", request.growth_percentage),
    ] {
        if let Some(v) = value
            && !v.is_finite()
        {
            return Err(invalid(format!("{name} must be a finite number")));
        }
    }

    Ok(ReportRequest {
        company,
        period,
        sections,
        title: clean(request.title),
        executive_name: clean(request.executive_name),
        revenue: request.revenue,
        profit: request.profit,
        growth_percentage: request.growth_percentage,
        sector_trends: clean(request.sector_trends),
        key_metrics: clean(request.key_metrics),
        risks: clean(request.risks),
        recommendations: clean(request.recommendations),
    })
}

/// Canonical form of a reporting period, or `None` if it is not one we accept.
pub fn normalize_period(raw: &str) -> Option<String> {
    let period = raw.trim().to_ascii_uppercase();
    let (year, rest) = match period.split_once('-') {
        Some((year, rest)) => (year, Some(rest)),
        None => (period.as_str(), None),
    };

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year_num: u32 = year.parse().ok()?;
    if !(1900..=2999).contains(&year_num) {
        return None;
    }

    let valid = match rest {
        None => true,
        Some(rest) => match rest.as_bytes() {
            [b'Q', n] => (b'1'..=b'4').contains(n),
            [b'H', n] => (b'1'..=b'2').contains(n),
            [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
                let month = (a - b'0') * 10 + (b - b'0');
                (1..=12).contains(&month)
            }
            _ => false,
        },
    };

    valid.then_some(period)
}

fn normalize_sections(raw: &[String]) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect());
    }
    if raw.len() > MAX_SECTIONS {
        return Err(invalid(format!(
            "at most {MAX_SECTIONS} sections may be requested"
        )));
    }

    let mut sections: Vec<String> = Vec::with_capacity(raw.len());
    for key in raw {
        let key = key.trim().to_ascii_lowercase();
        if !is_valid_section_key(&key) {
            return Err(invalid(format!(
                "section '{key}' must start with a letter and contain only a-z, 0-9 and '_' (max {MAX_SECTION_KEY_LEN})"
            )));
        }
        if sections.contains(&key) {
            return Err(invalid(format!("section '{key}' is listed twice")));
        }
        sections.push(key);
    }
    Ok(sections)
}

fn is_valid_section_key(key: &str) -> bool {
    let mut bytes = key.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    key.len() <= MAX_SECTION_KEY_LEN
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(message: impl Into<String>) -> ReportError {
    ReportError::Validation(message.into())
}
