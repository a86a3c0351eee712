use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static VAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn var_pattern() -> &'static Regex {
    VAR_PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("static variable pattern compiles")
    })
}

/// Run-scoped environment manager.
///
/// Seeded from the process environment at construction, then extended in
/// document order by declared entries. Each declared entry mutates the
/// process-wide environment, is appended to the ordered subprocess seed
/// list, and updates the lookup map used for expansion. The process-wide
/// mutation has run-scoped lifetime but is never rolled back; callers
/// running multiple documents in one process must account for that.
#[derive(Debug, Clone)]
pub struct Environment {
    variables: HashMap<String, String>,
    seed: Vec<(String, String)>,
}

impl Environment {
    /// Seed the lookup map from the current process environment.
    pub fn from_process() -> Self {
        Environment {
            variables: std::env::vars().collect(),
            seed: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Environment {
            variables: HashMap::new(),
            seed: Vec::new(),
        }
    }

    /// Map-only insert so unit tests never mutate the process environment.
    #[cfg(test)]
    pub fn insert_for_tests(&mut self, key: &str, value: &str) {
        self.variables.insert(key.to_string(), value.to_string());
    }

    /// Apply one declared entry: process env, seed list, and lookup map.
    pub fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
        self.seed.push((key.to_string(), value.to_string()));
        self.variables.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Full lookup map, used by the whole-document templating of `conf` data.
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Declared entries in declaration order, appended to subprocess
    /// environments so they shadow inherited variables at invocation time.
    pub fn seed(&self) -> &[(String, String)] {
        &self.seed
    }

    /// `$VAR` / `${VAR}` substitution against the current state of the map.
    ///
    /// Unknown variables expand to the empty string. Expansion always reads
    /// current state, never an earlier snapshot.
    pub fn expand(&self, input: &str) -> String {
        var_pattern()
            .replace_all(input, |caps: &regex::Captures<'_>| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                self.variables.get(name).cloned().unwrap_or_default()
            })
            .into_owned()
    }

    /// Expand only when the operation's expansion flag is set.
    pub fn expand_if(&self, enabled: bool, input: &str) -> String {
        if enabled {
            self.expand(input)
        } else {
            input.to_string()
        }
    }
}
