//! Cleaning rules applied to individual cell values.
//!
//! Each rule is a pure function over a single value. The executor decides
//! which rule runs for which canonical field.

use crate::models::NULL_SENTINEL;

/// Sentinel conversion: `"NULL"` becomes `None`, anything else is trimmed.
pub fn clean_cell(raw: &str) -> Option<String> {
    if raw == NULL_SENTINEL {
        None
    } else {
        Some(raw.trim().to_string())
    }
}

/// Remove the span from the first `(` through the first `)`.
///
/// Values without both delimiters are returned as-is. When `)` comes first the
/// two slices overlap and the text between them appears twice.
pub fn strip_parenthetical(value: &str) -> String {
    match (value.find('('), value.find(')')) {
        (Some(open), Some(close)) => {
            let mut cleaned = String::with_capacity(value.len());
            cleaned.push_str(&value[..open]);
            cleaned.push_str(&value[close + 1..]);
            cleaned.trim().to_string()
        }
        _ => value.to_string(),
    }
}

/// A name is kept only when it is non-empty and made of letters and digits.
pub fn is_valid_name(value: &str) -> bool {
    !value.is_empty() && value.chars().all(char::is_alphanumeric)
}

/// Parse a `{a|b|c}` pseudo-array.
///
/// Exactly one leading `{` and one trailing `}` are stripped, the rest is split
/// on `|` and every piece trimmed. Empty pieces are kept. A value without the
/// brace envelope becomes a single-element list.
pub fn parse_array(value: &str) -> Vec<String> {
    match value
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(inner) => inner.split('|').map(|p| p.trim().to_string()).collect(),
        None => vec![value.to_string()],
    }
}

/// Get a description of all cleaning rules
pub fn rules_description() -> String {
    r#"Cleaning rules (applied per mapped column, in mapping order):

| Rule | Applies to | Behaviour |
|------|------------|-----------|
| null_sentinel | every column | "NULL" becomes null, other values are trimmed |
| classification | classification columns | stored under classification.<rank> |
| strip_parenthetical | label | removes first "(" through first ")" and trims |
| name_fallback | name | null, empty or non-alphanumeric names take the label value |
| parse_array | synonym | "{a|b}" becomes ["a", "b"], other values a one-element list |

Example:
  rdf-schema#label = "Argiope (spider)"  ->  label = "Argiope"
  name = "NULL"                          ->  name = label
  synonym = "{ One | Two }"              ->  synonym = ["One", "Two"]
  genus_label = "NULL"                   ->  classification.genus = null"#
        .to_string()
}
