use crate::models::InvoiceSummary;

pub const NUMBER_PREFIX: &str = "INV-";
pub const FIRST_NUMBER: &str = "INV-0001";

/// Suggests the display number for a new invoice from the one with the
/// highest identity. Advisory only: the user can edit it and nothing checks
/// uniqueness.
pub fn next_invoice_number(existing: &[InvoiceSummary]) -> String {
    let latest = existing.iter().max_by_key(|summary| summary.id);
    next_number_after(latest.map(|summary| summary.number.as_str()))
}

/// Increments the first run of ASCII digits in `previous`. A missing
/// previous number, or one without digits, restarts at `INV-0001`.
pub fn next_number_after(previous: Option<&str>) -> String {
    previous
        .and_then(first_digit_run)
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|last| format!("{NUMBER_PREFIX}{:04}", last.saturating_add(1)))
        .unwrap_or_else(|| FIRST_NUMBER.to_string())
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}
