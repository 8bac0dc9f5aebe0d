use anyhow::Error;

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Two-decimal amount with thousands separators, e.g. `1,250.00`.
pub(crate) fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

/// Cut `text` to at most `width` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn amounts_are_grouped() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(350.0), "350.00");
        assert_eq!(format_amount(1250.5), "1,250.50");
        assert_eq!(format_amount(-1234567.0), "-1,234,567.00");
    }

    #[test]
    fn truncation_marks_cut() {
        assert_eq!(truncate("Bruno", 10), "Bruno");
        assert_eq!(truncate("Bartholomew", 5), "Bart…");
        assert_eq!(truncate("Ana", 0), "");
    }

    #[test]
    fn innermost_cause_is_surfaced() {
        let err = Err::<(), _>(anyhow!("Student name is required."))
            .context("failed to save student")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Student name is required.");
    }
}
