//! Display formatting for raw cell values
//!
//! Cells arrive from the data source as plain text. Before they reach the
//! presentation host a small table of rules, keyed by column name, turns them
//! into display strings: monetary amounts get a fixed number of decimals,
//! quoted labels lose their quotes, and timestamp-like values are cut down to
//! their date or time prefix.

use crate::config::FormattingConfig;

/// What a rule does to a matching cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellTransform {
    /// Parse as a number and render with exactly this many fractional digits
    FixedDecimals(usize),
    /// Remove one surrounding pair of double quotes
    StripQuotes,
    /// Keep only the first N characters when the value has at least N
    Truncate(usize),
}

impl CellTransform {
    /// Apply the transform. `None` means the value is left as it is.
    fn apply(&self, raw: &str) -> Option<String> {
        match self {
            CellTransform::FixedDecimals(places) => {
                let number: f64 = raw.trim().parse().ok()?;
                if !number.is_finite() {
                    return None;
                }
                Some(format!("{:.*}", *places, number))
            }
            CellTransform::StripQuotes => {
                if raw.chars().count() < 2 {
                    return None;
                }
                raw.strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .map(str::to_string)
            }
            CellTransform::Truncate(len) => {
                if raw.chars().count() < *len {
                    return None;
                }
                Some(raw.chars().take(*len).collect())
            }
        }
    }
}

/// A (column predicate, transform) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRule {
    pub column: String,
    pub transform: CellTransform,
}

impl FormatRule {
    pub fn new(column: impl Into<String>, transform: CellTransform) -> Self {
        Self {
            column: column.into(),
            transform,
        }
    }

    /// Exact, case-sensitive column name match
    pub fn matches(&self, column_name: &str) -> bool {
        self.column == column_name
    }
}

/// Ordered rule table. The first rule whose column matches decides the
/// output; later rules are not consulted even if that rule leaves the value
/// unchanged.
#[derive(Debug, Clone)]
pub struct ValueFormatter {
    rules: Vec<FormatRule>,
}

impl ValueFormatter {
    pub fn new(rules: Vec<FormatRule>) -> Self {
        Self { rules }
    }

    /// A formatter with no rules passes every value through
    pub fn passthrough() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_config(config: &FormattingConfig) -> Self {
        Self::new(vec![
            FormatRule::new(
                config.amount_column.clone(),
                CellTransform::FixedDecimals(config.decimal_places),
            ),
            FormatRule::new(config.name_column.clone(), CellTransform::StripQuotes),
            FormatRule::new(
                config.date_column.clone(),
                CellTransform::Truncate(config.date_length),
            ),
            FormatRule::new(
                config.time_column.clone(),
                CellTransform::Truncate(config.time_length),
            ),
        ])
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FormatRule] {
        &self.rules
    }

    /// Format a cell. Absent values become an empty string without touching
    /// the rules.
    pub fn format(&self, column_name: &str, raw: Option<&str>) -> String {
        match raw {
            Some(raw) => self.format_text(column_name, raw),
            None => String::new(),
        }
    }

    /// Format a present value. Never fails: anything a rule cannot handle is
    /// returned unchanged.
    pub fn format_text(&self, column_name: &str, raw: &str) -> String {
        self.rules
            .iter()
            .find(|rule| rule.matches(column_name))
            .and_then(|rule| rule.transform.apply(raw))
            .unwrap_or_else(|| raw.to_string())
    }
}

impl Default for ValueFormatter {
    fn default() -> Self {
        Self::from_config(&FormattingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(column: &str, raw: &str) -> String {
        ValueFormatter::default().format_text(column, raw)
    }

    #[test]
    fn test_amount_two_decimals() {
        assert_eq!(fmt("amount", "100.5"), "100.50");
        assert_eq!(fmt("amount", "3"), "3.00");
        assert_eq!(fmt("amount", "600"), "600.00");
        assert_eq!(fmt("amount", "-2.5"), "-2.50");
        assert_eq!(fmt("amount", " 7.25 "), "7.25");
        assert_eq!(fmt("amount", "1e3"), "1000.00");
    }

    #[test]
    fn test_amount_not_numeric_is_unchanged() {
        assert_eq!(fmt("amount", "abc"), "abc");
        assert_eq!(fmt("amount", ""), "");
        assert_eq!(fmt("amount", "NaN"), "NaN");
    }

    #[test]
    fn test_name_strips_one_pair_of_quotes() {
        assert_eq!(fmt("name", "\"Item 1\""), "Item 1");
        assert_eq!(fmt("name", "\"\"x\"\""), "\"x\"");
        assert_eq!(fmt("name", "\"\""), "");
    }

    #[test]
    fn test_name_without_matching_quotes_is_unchanged() {
        assert_eq!(fmt("name", "\"x"), "\"x");
        assert_eq!(fmt("name", "\""), "\"");
        assert_eq!(fmt("name", "Item 1"), "Item 1");
        assert_eq!(fmt("name", ""), "");
    }

    #[test]
    fn test_date_truncation() {
        assert_eq!(fmt("creation_date", "2023-05-10 12:00:00"), "2023-05-10");
        assert_eq!(fmt("creation_date", "2023-05-10"), "2023-05-10");
        assert_eq!(fmt("creation_date", "2023-05"), "2023-05");
    }

    #[test]
    fn test_time_truncation() {
        assert_eq!(fmt("creation_time", "12:00:00.123"), "12:00:00");
        assert_eq!(fmt("creation_time", "12:00"), "12:00");
    }

    #[test]
    fn test_truncation_counts_characters() {
        // Multi-byte characters must not split
        assert_eq!(fmt("creation_time", "éééééééééé"), "éééééééé");
    }

    #[test]
    fn test_column_match_is_exact_and_case_sensitive() {
        assert_eq!(fmt("Amount", "100.5"), "100.5");
        assert_eq!(fmt("amount_total", "100.5"), "100.5");
        assert_eq!(fmt("id", "\"7\""), "\"7\"");
    }

    #[test]
    fn test_absent_value_bypasses_rules() {
        let formatter = ValueFormatter::default();
        assert_eq!(formatter.format("amount", None), "");
        assert_eq!(formatter.format("name", None), "");
        assert_eq!(formatter.format("amount", Some("1")), "1.00");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let formatter = ValueFormatter::new(vec![
            FormatRule::new("code", CellTransform::Truncate(2)),
            FormatRule::new("code", CellTransform::FixedDecimals(1)),
        ]);
        assert_eq!(formatter.format_text("code", "12345"), "12");

        // A failing first rule does not fall through to the next one
        assert_eq!(formatter.format_text("code", "1"), "1");
    }

    #[test]
    fn test_rules_compose() {
        let formatter = ValueFormatter::passthrough()
            .with_rule(FormatRule::new("price", CellTransform::FixedDecimals(3)));
        assert_eq!(formatter.format_text("price", "2"), "2.000");
        assert_eq!(formatter.format_text("amount", "2"), "2");
    }
}
