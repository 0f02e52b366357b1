use serde::Deserialize;

/// Option names the host claims for itself. A generator may not declare these.
pub const HOST_OPTIONS: &[&str] = &[
    "source",
    "destination",
    "template",
    "mask",
    "custom",
    "config",
    "clone",
    "verbose",
    "help",
    "version",
];

/// Short flags the host claims for itself.
pub const HOST_SHORTS: &[char] = &['s', 'd', 't', 'm', 'c', 'v', 'h', 'V'];

/// A command-line option a generator asks the host to accept on its behalf.
/// Parsed values land in `GenerationConfig::generator` under the option name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptionSpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alias: Option<char>,
    /// Accepts the option more than once; stored as an array.
    #[serde(default)]
    pub multiple: bool,
    /// Boolean switch without a value.
    #[serde(default)]
    pub flag: bool,
    #[serde(default)]
    pub default: Option<String>,
}

impl OptionSpec {
    /// Option taking a single value.
    pub fn value(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Boolean switch.
    pub fn flag(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            flag: true,
            ..Self::default()
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Why a declared option breaks the generator contract, if it does.
pub fn option_violation(name: &str, spec: &OptionSpec) -> Option<String> {
    if name.trim().is_empty() {
        return Some("option names must not be empty".to_string());
    }

    if name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Some(format!("option '{name}' must be a bare name like 'title'"));
    }

    if HOST_OPTIONS.contains(&name) {
        return Some(format!("option '{name}' is reserved by the host"));
    }

    if let Some(alias) = spec.alias
        && HOST_SHORTS.contains(&alias)
    {
        return Some(format!("alias '-{alias}' of option '{name}' is reserved by the host"));
    }

    if spec.flag && spec.multiple {
        return Some(format!("option '{name}' cannot be both a flag and repeatable"));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_compose() {
        let spec = OptionSpec::value("Stylesheet to link")
            .multiple()
            .alias('c')
            .default_value("kss.css");
        assert_eq!(spec.description.as_deref(), Some("Stylesheet to link"));
        assert!(spec.multiple);
        assert!(!spec.flag);
        assert_eq!(spec.alias, Some('c'));
        assert_eq!(spec.default.as_deref(), Some("kss.css"));
    }

    #[test]
    fn deserializes_from_toml() {
        let spec: OptionSpec = toml::from_str(
            r#"
description = "Page title"
alias = "T"
"#,
        )
        .unwrap();
        assert_eq!(spec.alias, Some('T'));
        assert!(!spec.multiple);
    }

    #[test]
    fn violations() {
        assert!(option_violation("title", &OptionSpec::value("t")).is_none());
        assert!(option_violation("", &OptionSpec::default()).is_some());
        assert!(option_violation("--title", &OptionSpec::default()).is_some());
        assert!(option_violation("source", &OptionSpec::default()).is_some());
        assert!(option_violation("x", &OptionSpec::flag("x").multiple()).is_some());
        assert!(option_violation("theme", &OptionSpec::value("t").alias('t')).is_some());
        assert!(option_violation("theme", &OptionSpec::value("t").alias('T')).is_none());
    }
}
