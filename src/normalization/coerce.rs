//! Coercion of heterogeneous model output into flat lists of strings.
//!
//! Models answer the same schema in several shapes: plain strings, objects whose keys vary in
//! spelling and casing, or nested arrays. Every fragment is classified into a closed set of
//! [`Fragment`] shapes and handled by an explicit match. Coercion never fails; anything it
//! cannot salvage is dropped.

use serde_json::{Map, Value};

/// Separator used when flattening a nested array fragment.
const SEQUENCE_SEPARATOR: &str = ": ";

/// Semantic kind of a list field, selecting the alias table used for object fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Work history entries: `<title> at <company> (<years>): <summary>`.
    Experience,
    /// Degrees and certificates: `<degree> in <field> from <institution> (<years>)`.
    Education,
    /// Single-valued items such as skills, certifications and industries.
    Plain,
}

/// One semantic slot of an alias table and how it renders.
struct Slot {
    aliases: &'static [&'static str],
    prefix: &'static str,
    suffix: &'static str,
}

const fn slot(
    aliases: &'static [&'static str],
    prefix: &'static str,
    suffix: &'static str,
) -> Slot {
    Slot {
        aliases,
        prefix,
        suffix,
    }
}

const EXPERIENCE_SLOTS: &[Slot] = &[
    slot(&["title", "job_title", "role"], "", ""),
    slot(&["Company", "company"], " at ", ""),
    slot(&["Years", "years"], " (", ")"),
    slot(
        &[
            "Summary",
            "summary",
            "responsibilities",
            "Main responsibilities",
            "description",
        ],
        ": ",
        "",
    ),
];

const EDUCATION_SLOTS: &[Slot] = &[
    slot(&["Degree", "degree", "credential"], "", ""),
    slot(&["Field", "field", "Certificate Program"], " in ", ""),
    slot(&["Institution", "university", "institution"], " from ", ""),
    slot(
        &[
            "Year",
            "year",
            "Years",
            "years",
            "Year or Year Range",
            "Year or year range",
        ],
        " (",
        ")",
    ),
    slot(
        &[
            "Certification",
            "Certificate Completion",
            "Course",
            "Certificate",
            "certificate",
        ],
        " - Certification: ",
        "",
    ),
];

const PLAIN_SLOTS: &[Slot] = &[slot(
    &["name", "Name", "skill", "Skill", "value", "title"],
    "",
    "",
)];

impl FragmentKind {
    fn slots(self) -> &'static [Slot] {
        match self {
            Self::Experience => EXPERIENCE_SLOTS,
            Self::Education => EDUCATION_SLOTS,
            Self::Plain => PLAIN_SLOTS,
        }
    }
}

/// Shape categories a fragment can take.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    /// A plain string.
    Text(&'a str),
    /// A key/value object.
    Mapping(&'a Map<String, Value>),
    /// A nested array.
    Sequence(&'a [Value]),
    /// Numbers, booleans and nulls.
    Other,
}

impl<'a> Fragment<'a> {
    /// Classify a JSON value into its fragment shape.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Mapping(map),
            Value::Array(items) => Self::Sequence(items),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Other,
        }
    }
}

/// Coerce a sequence of fragments into non-empty strings, preserving input order.
pub fn coerce_fragments(items: &[Value], kind: FragmentKind) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| coerce_fragment(Fragment::classify(item), kind))
        .collect()
}

/// Coerce a whole field value: arrays are coerced element-wise, a lone fragment becomes a
/// one-element list, and a missing or null field becomes an empty list.
pub fn coerce_field(value: Option<&Value>, kind: FragmentKind) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => coerce_fragments(items, kind),
        Some(other) => coerce_fragment(Fragment::classify(other), kind)
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

fn coerce_fragment(fragment: Fragment<'_>, kind: FragmentKind) -> Option<String> {
    match fragment {
        Fragment::Text(text) => non_empty(text),
        Fragment::Mapping(map) => render_mapping(map, kind),
        Fragment::Sequence(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            non_empty(&parts.join(SEQUENCE_SEPARATOR))
        }
        Fragment::Other => None,
    }
}

fn render_mapping(map: &Map<String, Value>, kind: FragmentKind) -> Option<String> {
    let mut rendered = String::new();
    for slot in kind.slots() {
        let Some(value) = resolve_slot(map, slot.aliases) else {
            continue;
        };
        let prefix = if rendered.is_empty() {
            slot.prefix.trim_start_matches([' ', ':']).trim_start()
        } else {
            slot.prefix
        };
        rendered.push_str(prefix);
        rendered.push_str(&value);
        rendered.push_str(slot.suffix);
    }
    non_empty(&rendered)
}

/// First alias whose value renders to a non-empty scalar string.
fn resolve_slot(map: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| map.get(*alias).and_then(scalar_text))
}

/// Render a scalar JSON value as trimmed text; structured and null values yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn education_mapping_resolves_aliases() {
        let items = vec![json!({
            "Degree": "BSc",
            "field": "CS",
            "university": "MIT",
            "Years": "2018-2022"
        })];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Education),
            vec!["BSc in CS from MIT (2018-2022)".to_string()]
        );
    }

    #[test]
    fn experience_mapping_omits_missing_slots() {
        let items = vec![
            json!({
                "job_title": "Data Analyst",
                "company": "Acme",
                "years": "2019-2021",
                "Main responsibilities": "Built dashboards"
            }),
            json!({ "role": "Intern", "Years": 2018 }),
            json!({ "company": "Beta" }),
        ];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Experience),
            vec![
                "Data Analyst at Acme (2019-2021): Built dashboards".to_string(),
                "Intern (2018)".to_string(),
                "at Beta".to_string(),
            ]
        );
    }

    #[test]
    fn alias_order_prefers_first_present_key() {
        let items = vec![json!({ "title": "Lead", "role": "Ignored", "Summary": "", "summary": "Led team" })];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Experience),
            vec!["Lead: Led team".to_string()]
        );
    }

    #[test]
    fn alias_lookup_is_case_sensitive() {
        let items = vec![json!({ "TITLE": "Engineer", "COMPANY": "Acme" })];
        assert!(coerce_fragments(&items, FragmentKind::Experience).is_empty());
    }

    #[test]
    fn education_certification_slot_is_rendered() {
        let items = vec![json!({ "Course": "Machine Learning", "Year": "2020" })];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Education),
            vec!["(2020) - Certification: Machine Learning".to_string()]
        );
    }

    #[test]
    fn strings_are_trimmed_and_empties_dropped() {
        let items = vec![json!("  Rust  "), json!("   "), json!("SQL")];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Plain),
            vec!["Rust".to_string(), "SQL".to_string()]
        );
    }

    #[test]
    fn nested_sequences_are_joined_without_recursion() {
        let items = vec![json!(["Engineer", "Acme", ["ignored"], 2020])];
        assert_eq!(
            coerce_fragments(&items, FragmentKind::Experience),
            vec!["Engineer: Acme: 2020".to_string()]
        );
    }

    #[test]
    fn arbitrary_mixtures_never_fail() {
        let items = vec![
            json!(null),
            json!(42),
            json!(true),
            json!({}),
            json!([]),
            json!([null, {}]),
            json!({ "skill": "Go" }),
            json!("Python"),
        ];
        let out = coerce_fragments(&items, FragmentKind::Plain);
        assert_eq!(out, vec!["Go".to_string(), "Python".to_string()]);
        assert!(out.iter().all(|item| !item.is_empty()));
    }

    #[test]
    fn duplicates_are_preserved() {
        let items = vec![json!("Rust"), json!("Rust")];
        assert_eq!(coerce_fragments(&items, FragmentKind::Plain).len(), 2);
    }

    #[test]
    fn field_level_coercion_handles_lone_values() {
        assert_eq!(
            coerce_field(Some(&json!("Finance")), FragmentKind::Plain),
            vec!["Finance".to_string()]
        );
        assert!(coerce_field(Some(&json!(null)), FragmentKind::Plain).is_empty());
        assert!(coerce_field(None, FragmentKind::Education).is_empty());
    }
}
