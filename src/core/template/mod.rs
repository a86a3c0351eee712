use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
            .expect("static placeholder pattern compiles")
    })
}

/// Whole-document templating for `conf` content.
///
/// Substitutes `{{.KEY}}` placeholders from the given map; unknown keys
/// render as empty. This is a separate mechanism from the token-level
/// `$VAR` expansion used everywhere else, operating on the document as a
/// whole rather than on individual extracted values.
pub fn render(variables: &HashMap<String, String>, template: &str) -> String {
    placeholder()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            variables
                .get(&caps[1])
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}
