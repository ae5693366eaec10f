//! Option registries for the global and module scopes.
//!
//! Names are normalized to uppercase; an option must be registered before it
//! can be set. `unset` clears the current value without touching the
//! registration, so required options can become unset and fail validation
//! again before a run.

use std::collections::BTreeMap;

/// One registered option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOption {
    pub value: Option<String>,
    pub required: bool,
    pub description: String,
}

/// Ordered name → option table.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    entries: BTreeMap<String, ConsoleOption>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The global defaults every session starts from.
    pub fn global_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "nameserver",
            Some("8.8.8.8"),
            true,
            "default nameserver for resolution",
        );
        registry.register("proxy", None, false, "proxy server (address:port)");
        registry.register("threads", Some("10"), true, "number of threads (where applicable)");
        registry.register("timeout", Some("10"), true, "socket timeout (seconds)");
        registry.register(
            "user-agent",
            Some(concat!("Lookout/v", env!("CARGO_PKG_VERSION"))),
            true,
            "user-agent string",
        );
        registry.register(
            "verbosity",
            Some("1"),
            true,
            "verbosity level (0 = minimal, 1 = verbose, 2 = debug)",
        );
        registry
    }

    /// Register an option (name is uppercased). Re-registration replaces the
    /// previous entry.
    pub fn register(
        &mut self,
        name: &str,
        default: Option<&str>,
        required: bool,
        description: &str,
    ) {
        self.entries.insert(
            name.to_uppercase(),
            ConsoleOption {
                value: default.map(str::to_string),
                required,
                description: description.to_string(),
            },
        );
    }

    /// Assign a value to a registered option.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        let key = name.to_uppercase();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.value = Some(value.to_string());
                Ok(())
            }
            None => Err(format!("unknown option: {key}")),
        }
    }

    /// Clear a registered option's value.
    pub fn unset(&mut self, name: &str) -> Result<(), String> {
        let key = name.to_uppercase();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.value = None;
                Ok(())
            }
            None => Err(format!("unknown option: {key}")),
        }
    }

    /// Current value of an option, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_uppercase())
            .and_then(|entry| entry.value.as_deref())
    }

    /// Whether the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_uppercase())
    }

    /// Names of required options that currently have no value.
    pub fn missing_required(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.required && entry.value.is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Snapshot of all assigned values, for persistence and module runs.
    pub fn assigned(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| entry.value.clone().map(|value| (name.clone(), value)))
            .collect()
    }

    /// Apply persisted assignments; unknown names are ignored.
    pub fn apply_assigned(&mut self, saved: &BTreeMap<String, String>) {
        for (name, value) in saved {
            if self.set(name, value).is_err() {
                tracing::debug!(option = %name, "ignoring saved value for unknown option");
            }
        }
    }

    /// Render the option table, framework style.
    pub fn table_lines(&self) -> Vec<String> {
        let header = ("Name", "Current Value", "Required", "Description");
        let name_width = self
            .entries
            .keys()
            .map(String::len)
            .chain([header.0.len()])
            .max()
            .unwrap_or(0);
        let value_width = self
            .entries
            .values()
            .map(|e| e.value.as_deref().unwrap_or("").len())
            .chain([header.1.len()])
            .max()
            .unwrap_or(0);
        let required_width = header.2.len();

        let mut lines = Vec::with_capacity(self.entries.len() + 2);
        lines.push(format!(
            "  {:name_width$}  {:value_width$}  {:required_width$}  {}",
            header.0, header.1, header.2, header.3
        ));
        lines.push(format!(
            "  {:name_width$}  {:value_width$}  {:required_width$}  {}",
            "-".repeat(header.0.len()),
            "-".repeat(header.1.len()),
            "-".repeat(header.2.len()),
            "-".repeat(header.3.len()),
        ));
        for (name, entry) in &self.entries {
            lines.push(format!(
                "  {:name_width$}  {:value_width$}  {:required_width$}  {}",
                name,
                entry.value.as_deref().unwrap_or(""),
                if entry.required { "yes" } else { "no" },
                entry.description,
            ));
        }
        lines
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
