//! Command line for the `kssgen` host: the host's own options plus whatever
//! the generator declares.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser};

use crate::model::config::GenerationConfig;
use crate::model::option::OptionSpec;

/// Build a living style guide from KSS comments in your stylesheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "kssgen", version)]
pub struct HostArgs {
    /// Directory (or file) to scan for KSS comments; repeatable
    #[arg(short, long, value_name = "DIR")]
    pub source: Vec<PathBuf>,

    /// Where to write the style guide
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Template directory with index.html and public/ assets
    #[arg(short, long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// File-name mask, e.g. "*.css|*.scss" or /regex/
    #[arg(short, long)]
    pub mask: Option<String>,

    /// Custom `Name:` property to extract from sections; repeatable
    #[arg(long, value_name = "FIELD")]
    pub custom: Vec<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Copy the template to DIR for customisation, then exit
    #[arg(long, value_name = "DIR")]
    pub clone: Option<PathBuf>,

    /// Report progress
    #[arg(short, long)]
    pub verbose: bool,
}

/// The host's command extended with one argument per generator option.
pub fn command(options: &BTreeMap<String, OptionSpec>) -> Command {
    options
        .iter()
        .fold(HostArgs::command(), |command, (name, spec)| {
            command.arg(generator_arg(name, spec))
        })
}

/// Parse the process arguments against [`command`].
pub fn parse_args(
    options: &BTreeMap<String, OptionSpec>,
) -> Result<(HostArgs, ArgMatches), clap::Error> {
    let matches = command(options).try_get_matches()?;
    let host = HostArgs::from_arg_matches(&matches)?;
    Ok((host, matches))
}

/// Default log filter once the command line and config file are merged.
pub fn log_filter(config: &GenerationConfig) -> &'static str {
    if config.verbose { "kssgen=info" } else { "kssgen=warn" }
}

fn generator_arg(name: &str, spec: &OptionSpec) -> Arg {
    let mut arg = Arg::new(name.to_string())
        .long(name.to_string())
        .help_heading("Generator options");

    if let Some(description) = &spec.description {
        arg = arg.help(description.clone());
    }
    if let Some(alias) = spec.alias {
        arg = arg.short(alias);
    }

    if spec.flag {
        arg.action(ArgAction::SetTrue)
    } else if spec.multiple {
        arg.value_name("VALUE").action(ArgAction::Append)
    } else {
        arg.value_name("VALUE").action(ArgAction::Set)
    }
}

/// Layer command-line values over a loaded configuration. Generator option
/// defaults fill in only where neither the file nor the command line set a
/// value.
pub fn apply_overrides(
    host: &HostArgs,
    matches: &ArgMatches,
    options: &BTreeMap<String, OptionSpec>,
    config: &mut GenerationConfig,
) {
    if !host.source.is_empty() {
        config.source = host.source.clone();
    }
    if let Some(destination) = &host.destination {
        config.destination = destination.clone();
    }
    if let Some(template) = &host.template {
        config.template = Some(template.clone());
    }
    if let Some(mask) = &host.mask {
        config.mask = mask.clone();
    }
    if !host.custom.is_empty() {
        config.custom = host.custom.clone();
    }
    if host.verbose {
        config.verbose = true;
    }

    for (name, spec) in options {
        let value = if spec.flag {
            matches
                .get_flag(name)
                .then_some(toml::Value::Boolean(true))
        } else if spec.multiple {
            matches.get_many::<String>(name).map(|values| {
                toml::Value::Array(values.cloned().map(toml::Value::String).collect())
            })
        } else {
            matches
                .get_one::<String>(name)
                .map(|value| toml::Value::String(value.clone()))
        };

        match value {
            Some(value) => {
                config.generator.insert(name.clone(), value);
            }
            None => {
                if let Some(default) = &spec.default {
                    config
                        .generator
                        .entry(name.clone())
                        .or_insert_with(|| toml::Value::String(default.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> BTreeMap<String, OptionSpec> {
        BTreeMap::from([
            (
                "title".to_string(),
                OptionSpec::value("Title").default_value("Style Guide"),
            ),
            ("css".to_string(), OptionSpec::value("Stylesheet").multiple()),
            ("dark".to_string(), OptionSpec::flag("Dark theme").alias('D')),
        ])
    }

    fn parse(args: &[&str]) -> (HostArgs, ArgMatches) {
        let matches = command(&options())
            .try_get_matches_from(std::iter::once("kssgen").chain(args.iter().copied()))
            .unwrap();
        (HostArgs::from_arg_matches(&matches).unwrap(), matches)
    }

    #[test]
    fn command_definition_is_valid() {
        command(&options()).debug_assert();
    }

    #[test]
    fn host_args() {
        let (host, _) = parse(&["--config", "kss.toml", "--clone", "my-template", "-v"]);
        assert_eq!(
            host,
            HostArgs {
                config: Some(PathBuf::from("kss.toml")),
                clone: Some(PathBuf::from("my-template")),
                verbose: true,
                ..HostArgs::default()
            }
        );
    }

    #[test]
    fn overrides_replace_config_values() {
        let (host, matches) = parse(&[
            "-s", "css", "-s", "scss", "-d", "out", "--mask", "*.scss", "--css", "a.css",
            "--css", "b.css", "-D",
        ]);
        let mut config = GenerationConfig::new(["ignored"]);
        apply_overrides(&host, &matches, &options(), &mut config);

        assert_eq!(config.source, vec![PathBuf::from("css"), PathBuf::from("scss")]);
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.mask, "*.scss");
        assert_eq!(config.generator_list("css"), vec!["a.css", "b.css"]);
        assert!(config.generator_flag("dark"));
        assert_eq!(config.generator_str("title"), Some("Style Guide"));
    }

    #[test]
    fn every_host_argument_is_reserved() {
        use crate::model::option::option_violation;

        let command = HostArgs::command();
        for arg in command.get_arguments() {
            let name = arg.get_id().as_str();
            assert!(
                option_violation(name, &OptionSpec::default()).is_some(),
                "--{name} is not reserved"
            );
            if let Some(short) = arg.get_short() {
                let spec = OptionSpec::value("x").alias(short);
                assert!(option_violation("extra", &spec).is_some(), "-{short} is not reserved");
            }
        }
    }

    #[test]
    fn verbose_from_the_config_file_raises_the_log_level() {
        let (host, matches) = parse(&[]);
        let mut config =
            GenerationConfig::from_toml_str("source = [\"css\"]\nverbose = true\n").unwrap();
        apply_overrides(&host, &matches, &options(), &mut config);
        assert_eq!(log_filter(&config), "kssgen=info");

        let mut quiet = GenerationConfig::new(["css"]);
        apply_overrides(&host, &matches, &options(), &mut quiet);
        assert_eq!(log_filter(&quiet), "kssgen=warn");
    }

    #[test]
    fn config_file_values_beat_option_defaults() {
        let (host, matches) = parse(&[]);
        let mut config = GenerationConfig::new(["css"]);
        config
            .generator
            .insert("title".into(), toml::Value::String("From file".into()));
        apply_overrides(&host, &matches, &options(), &mut config);

        assert_eq!(config.generator_str("title"), Some("From file"));
        assert_eq!(config.source, vec![PathBuf::from("css")]);
        assert!(!config.generator_flag("dark"));
    }
}
