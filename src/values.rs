use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

/// Pattern grammar for medical value lines, treated as a versioned contract:
/// label = word chars / spaces / parentheses / `%` / `-`;
/// separator = one or more of whitespace, `:`, `-`;
/// value = digits with optional decimal point;
/// unit = optional, from a fixed recognized set including `x10^n/L` exponent
/// notation.
static VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w\s()%-]+)[\s:-]+([\d.]+)\s*(g/dL|mg/dL|%|x10\^?\d*/?L?)?")
        .expect("value pattern must compile")
});

/// Scans report text for `<label> <separator> <number> <unit>` instances and
/// returns them as an insertion-ordered parameter map.
///
/// A later match with an identical trimmed label overwrites the earlier one
/// (last-write-wins, position preserved). No matches yields an empty map,
/// which callers treat as "nothing to analyze" rather than an error.
pub fn extract_values(text: &str) -> IndexMap<String, String> {
    let mut extracted = IndexMap::new();

    for caps in VALUE_PATTERN.captures_iter(text) {
        // The greedy label class also admits `-`, so a `-`-separated line
        // leaves separator residue on the label; strip it along with the
        // surrounding whitespace.
        let parameter = caps[1]
            .trim()
            .trim_end_matches(|c: char| c == '-' || c.is_whitespace())
            .to_string();
        let value = caps[2].trim();
        let unit = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");

        extracted.insert(parameter, format!("{} {}", value, unit).trim().to_string());
    }

    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_value_with_unit() {
        let values = extract_values("Hemoglobin: 9.5 g/dL");
        assert_eq!(values.get("Hemoglobin").map(String::as_str), Some("9.5 g/dL"));
    }

    #[test]
    fn exponent_unit_is_recognized() {
        let values = extract_values("WBC - 11.2 x10^9/L");
        assert_eq!(values.get("WBC").map(String::as_str), Some("11.2 x10^9/L"));
    }

    #[test]
    fn value_without_unit_has_no_trailing_space() {
        let values = extract_values("Platelet ratio: 42");
        assert_eq!(values.get("Platelet ratio").map(String::as_str), Some("42"));
    }

    #[test]
    fn duplicate_label_is_last_write_wins() {
        let values = extract_values("A: 1\nA: 2");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("A").map(String::as_str), Some("2"));
    }

    #[test]
    fn text_without_values_yields_empty_map() {
        let values = extract_values("The patient reports feeling well overall.");
        assert!(values.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(extract_values("").is_empty());
    }

    #[test]
    fn multiple_lines_keep_document_order() {
        let text = "Hemoglobin: 9.5 g/dL\nGlucose - 140 mg/dL\nHematocrit: 38 %";
        let values = extract_values(text);
        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Hemoglobin", "Glucose", "Hematocrit"]);
        assert_eq!(values.get("Glucose").map(String::as_str), Some("140 mg/dL"));
        assert_eq!(values.get("Hematocrit").map(String::as_str), Some("38 %"));
    }
}
