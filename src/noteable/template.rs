//! # Template Resolution
//!
//! Template fields hold user-authored text with `$(...)` placeholders that
//! reference other fields' values:
//!
//! ```text
//! $(FieldKey)            <-- by field label, falling back to field id
//! $(TabName.FieldKey)    <-- restricted to fields of one tab
//! $(FieldKey|Param)      <-- formatting parameter applied to the value
//! ```
//!
//! The first `.` separates an optional tab-name qualifier, so field keys may
//! themselves contain dots. The first `)` after `$(` ends the span; a
//! literal `)` cannot appear inside an expression, and an unterminated `$(`
//! is left as written.
//!
//! Parameters, applied to the matched value:
//!
//! | Param   | Result |
//! |---------|--------|
//! | (none)  | raw value |
//! | `N`     | the N-th line, 1-indexed; out of range gives `""` |
//! | `csv`   | lines trimmed, blanks dropped, joined with `,` |
//! | `lines` | comma-split segments trimmed, blanks dropped, one per line |
//! | other   | raw value (unrecognized parameters are not errors) |
//!
//! Templates are authored by end users and must tolerate mistakes: a stale
//! or misspelled reference resolves to the empty string, never an error.
//! Resolution is single-pass and non-recursive; substituted text is never
//! rescanned, so self-referential templates cannot expand forever.

use crate::model::{Field, Tab};

/// Expand every placeholder in `template` against the document's tabs.
/// Pure and read-only.
pub fn resolve(template: &str, tabs: &[Tab]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                out.push_str(&resolve_placeholder(&after[..end], tabs));
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder, keep the text as written.
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_placeholder(expr: &str, tabs: &[Tab]) -> String {
    // Tab-qualified reference: Tab.Field|param
    let (tab_name, key_and_param) = match expr.split_once('.') {
        Some((tab, rest)) => (Some(tab), rest),
        None => (None, expr),
    };
    let (key, param) = match key_and_param.split_once('|') {
        Some((key, param)) => (key, Some(param)),
        None => (key_and_param, None),
    };

    let field = match find_field(tabs, tab_name, key) {
        Some(field) => field,
        None => return String::new(),
    };

    apply_param(&field.value, param)
}

/// First field, in tab order then field order, whose label or id equals
/// `key`, optionally restricted to tabs with an exactly matching name.
fn find_field<'a>(tabs: &'a [Tab], tab_name: Option<&str>, key: &str) -> Option<&'a Field> {
    tabs.iter()
        .filter(|tab| tab_name.map_or(true, |name| tab.name == name))
        .flat_map(|tab| tab.fields.iter())
        .find(|field| field.label == key || field.id == key)
}

fn apply_param(value: &str, param: Option<&str>) -> String {
    let param = match param {
        Some(p) if !p.is_empty() => p,
        _ => return value.to_string(),
    };

    if param.chars().all(|c| c.is_ascii_digit()) {
        let n: usize = match param.parse() {
            Ok(n) => n,
            Err(_) => return String::new(),
        };
        if n == 0 {
            return String::new();
        }
        return value.lines().nth(n - 1).unwrap_or("").to_string();
    }

    match param.to_ascii_lowercase().as_str() {
        "csv" => value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        "lines" => value
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, FieldKind};

    fn fixture() -> Document {
        let mut doc = Document::default();
        let t1 = doc.add_tab("Tab1").id.clone();
        let t2 = doc.add_tab("Tab2").id.clone();

        // Every new tab starts with a "Title" label field.
        let title = doc.find_tab(&t1).unwrap().fields[0].id.clone();
        doc.set_field_value(&t1, &title, "Hello");

        let notes = doc.add_field(&t1, FieldKind::Textarea, "Notes").unwrap().id.clone();
        doc.set_field_value(&t1, &notes, "a\nb\nc");

        let x1 = doc.add_field(&t1, FieldKind::Textarea, "X").unwrap().id.clone();
        doc.set_field_value(&t1, &x1, " a \n\n b ");

        let x2 = doc.add_field(&t2, FieldKind::Textarea, "X").unwrap().id.clone();
        doc.set_field_value(&t2, &x2, "from tab two");

        doc
    }

    #[test]
    fn test_plain_reference() {
        let doc = fixture();
        assert_eq!(resolve("$(Title)", &doc.tabs), "Hello");
    }

    #[test]
    fn test_reference_embedded_in_text() {
        let doc = fixture();
        assert_eq!(resolve("say $(Title), world", &doc.tabs), "say Hello, world");
    }

    #[test]
    fn test_reference_by_id() {
        let doc = fixture();
        let id = doc
            .all_fields()
            .find(|f| f.label == "Title")
            .unwrap()
            .id
            .clone();
        assert_eq!(resolve(&format!("$({})", id), &doc.tabs), "Hello");
    }

    #[test]
    fn test_missing_reference_resolves_empty() {
        let doc = fixture();
        assert_eq!(resolve("$(Missing)", &doc.tabs), "");
        assert_eq!(resolve("<$(Missing)>", &doc.tabs), "<>");
    }

    #[test]
    fn test_line_parameter() {
        let doc = fixture();
        assert_eq!(resolve("$(Notes|2)", &doc.tabs), "b");
        assert_eq!(resolve("$(Notes|1)", &doc.tabs), "a");
        assert_eq!(resolve("$(Notes|5)", &doc.tabs), "");
        assert_eq!(resolve("$(Notes|0)", &doc.tabs), "");
    }

    #[test]
    fn test_csv_parameter_trims_and_drops_blanks() {
        let doc = fixture();
        assert_eq!(resolve("$(Tab1.X|csv)", &doc.tabs), "a,b");
    }

    #[test]
    fn test_lines_parameter() {
        let mut doc = fixture();
        let t1 = doc.tabs[0].id.clone();
        let id = doc.add_field(&t1, FieldKind::Label, "Hosts").unwrap().id.clone();
        doc.set_field_value(&t1, &id, "alpha, beta, , gamma");
        assert_eq!(resolve("$(Hosts|lines)", &doc.tabs), "alpha\nbeta\ngamma");
    }

    #[test]
    fn test_parameters_are_case_insensitive() {
        let doc = fixture();
        assert_eq!(resolve("$(Tab1.X|CSV)", &doc.tabs), "a,b");
    }

    #[test]
    fn test_unrecognized_parameter_returns_raw() {
        let doc = fixture();
        assert_eq!(resolve("$(Title|shout)", &doc.tabs), "Hello");
        assert_eq!(resolve("$(Title|)", &doc.tabs), "Hello");
    }

    #[test]
    fn test_tab_qualifier_filters_by_name() {
        let doc = fixture();
        // Two fields are labeled "X"; the qualifier picks the second tab's.
        assert_eq!(resolve("$(Tab2.X)", &doc.tabs), "from tab two");
        assert_eq!(resolve("$(NoSuchTab.X)", &doc.tabs), "");
    }

    #[test]
    fn test_field_keys_may_contain_dots() {
        let mut doc = fixture();
        let t1 = doc.tabs[0].id.clone();
        let id = doc.add_field(&t1, FieldKind::Label, "v1.2").unwrap().id.clone();
        doc.set_field_value(&t1, &id, "release");
        // First dot segment is the tab name; the rest rejoins as the key.
        assert_eq!(resolve("$(Tab1.v1.2)", &doc.tabs), "release");
    }

    #[test]
    fn test_unterminated_placeholder_left_literal() {
        let doc = fixture();
        assert_eq!(resolve("before $(Title", &doc.tabs), "before $(Title");
    }

    #[test]
    fn test_multiple_placeholders_single_pass() {
        let mut doc = fixture();
        let t1 = doc.tabs[0].id.clone();
        // A field whose value itself looks like a placeholder must not be
        // expanded again.
        let id = doc.add_field(&t1, FieldKind::Label, "Loop").unwrap().id.clone();
        doc.set_field_value(&t1, &id, "$(Loop)");
        assert_eq!(resolve("$(Loop) and $(Title)", &doc.tabs), "$(Loop) and Hello");
    }

    #[test]
    fn test_no_placeholders_passthrough() {
        let doc = fixture();
        assert_eq!(resolve("plain text", &doc.tabs), "plain text");
        assert_eq!(resolve("", &doc.tabs), "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut doc = fixture();
        let t1 = doc.tabs[0].id.clone();
        let id = doc.add_field(&t1, FieldKind::Textarea, "Win").unwrap().id.clone();
        doc.set_field_value(&t1, &id, "one\r\ntwo\r\nthree");
        assert_eq!(resolve("$(Win|2)", &doc.tabs), "two");
        assert_eq!(resolve("$(Win|csv)", &doc.tabs), "one,two,three");
    }

    #[test]
    fn test_huge_numeric_parameter_resolves_empty() {
        let doc = fixture();
        assert_eq!(
            resolve("$(Notes|99999999999999999999999999)", &doc.tabs),
            ""
        );
    }
}
