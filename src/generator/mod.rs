//! The generator contract.
//!
//! A generator turns a parsed [`Styleguide`] into output. Every generator
//! embeds a [`GeneratorBase`] and implements [`Generator::generate`]; the rest
//! of the lifecycle (`check_generator → init → parse → generate`) comes with
//! default implementations that a generator may override.

pub mod clone;
pub mod highlight;
pub mod html;
pub mod pending;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::kss::{KssError, Kss, Styleguide, Traversal, TraverseOptions};
use crate::model::config::GenerationConfig;
use crate::model::option::{OptionSpec, option_violation};
use crate::model::stage::Stage;

pub use clone::{CopyOptions, clone_template, copy_tree};
pub use html::HtmlGenerator;
pub use pending::PendingStyleguide;

/// Generator API revision implemented by this crate.
pub const API: &str = "2.0";

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("the loaded generator does not satisfy the generator contract: {0}")]
    ContractViolation(String),

    #[error("this generator is incompatible with generator API {api}: \"{}\"", .instance.as_deref().unwrap_or("undefined"))]
    UnconfiguredVersion {
        api: &'static str,
        instance: Option<String>,
    },

    #[error("this folder already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("template folder not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("cannot copy {} into itself ({})", src.display(), dest.display())]
    CopyIntoSource { src: PathBuf, dest: PathBuf },

    #[error("generator used before init() stored a configuration")]
    NotInitialized,

    #[error("failed to parse the style guide: {0}")]
    Parse(#[from] KssError),

    #[error("the style guide traversal stopped without reporting a result")]
    TraversalPanicked,

    #[error("failed to start the style guide traversal: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

impl GeneratorError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io { path, source }
    }
}

/// How a generator's declared API revision relates to [`API`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    /// Written against an older revision.
    Older,
    /// Written against a revision this crate does not know yet.
    Newer,
    /// Declared version is missing or not a version number.
    Unparseable,
}

/// State shared by every generator.
pub struct GeneratorBase {
    api: &'static str,
    instance_api: Option<String>,
    options: BTreeMap<String, OptionSpec>,
    config: Option<GenerationConfig>,
    traversal: Arc<dyn Traversal>,
    stage: Stage,
}

impl fmt::Debug for GeneratorBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorBase")
            .field("api", &self.api)
            .field("instance_api", &self.instance_api)
            .field("options", &self.options)
            .field("config", &self.config)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl GeneratorBase {
    /// `version` is the generator API revision the generator was written
    /// against. `None` is kept as-is and rejected by `check_generator`.
    pub fn new(version: Option<&str>, options: BTreeMap<String, OptionSpec>) -> Self {
        Self {
            api: API,
            instance_api: version.map(str::to_string),
            options,
            config: None,
            traversal: Arc::new(Kss),
            stage: Stage::Constructed,
        }
    }

    /// Replace the KSS file traversal, e.g. when sources are already loaded.
    pub fn with_traversal(mut self, traversal: impl Traversal + 'static) -> Self {
        self.traversal = Arc::new(traversal);
        self
    }

    pub fn api(&self) -> &'static str {
        self.api
    }

    pub fn instance_api(&self) -> Option<&str> {
        self.instance_api.as_deref()
    }

    pub fn options(&self) -> &BTreeMap<String, OptionSpec> {
        &self.options
    }

    pub fn config(&self) -> Option<&GenerationConfig> {
        self.config.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            tracing::info!("generator {} -> {}", self.stage.label(), stage.label());
            self.stage = stage;
        }
    }

    /// Configuration stored by `init`, or [`GeneratorError::NotInitialized`].
    pub fn require_config(&self) -> Result<&GenerationConfig, GeneratorError> {
        self.config.as_ref().ok_or(GeneratorError::NotInitialized)
    }

    pub fn store_config(&mut self, config: GenerationConfig) {
        self.config = Some(config);
        self.set_stage(Stage::Configured);
    }

    /// Contract check: declared options must be usable by the host and a
    /// version must have been declared. Compatibility of that version is
    /// reported separately by [`GeneratorBase::compatibility`].
    pub fn check(&self) -> Result<(), GeneratorError> {
        for (name, spec) in &self.options {
            if let Some(reason) = option_violation(name, spec) {
                return Err(GeneratorError::ContractViolation(reason));
            }
        }

        if self.instance_api.is_none() {
            return Err(GeneratorError::UnconfiguredVersion {
                api: self.api,
                instance: None,
            });
        }

        Ok(())
    }

    pub fn compatibility(&self) -> Compatibility {
        let (Some(current), Some(declared)) = (
            lenient_version(self.api),
            self.instance_api.as_deref().and_then(lenient_version),
        ) else {
            return Compatibility::Unparseable;
        };

        match (
            declared.major.cmp(&current.major),
            declared.minor.cmp(&current.minor),
        ) {
            (Ordering::Less, _) | (Ordering::Equal, Ordering::Less) => Compatibility::Older,
            (Ordering::Greater, _) | (Ordering::Equal, Ordering::Greater) => Compatibility::Newer,
            (Ordering::Equal, Ordering::Equal) => Compatibility::Compatible,
        }
    }

    fn traverse_options(config: &GenerationConfig) -> TraverseOptions {
        TraverseOptions {
            multiline: true,
            markdown: true,
            markup: true,
            mask: Some(config.mask.clone()).filter(|mask| !mask.trim().is_empty()),
            custom: config.custom.clone(),
        }
    }
}

/// Accepts `2`, `2.0` and `2.0.1`.
fn lenient_version(text: &str) -> Option<semver::Version> {
    let text = text.trim().trim_start_matches('v');
    let padded = match text.matches('.').count() {
        0 => format!("{text}.0.0"),
        1 => format!("{text}.0"),
        _ => text.to_string(),
    };
    semver::Version::parse(&padded).ok()
}

/// Lifecycle every style guide generator follows.
pub trait Generator {
    fn base(&self) -> &GeneratorBase;

    fn base_mut(&mut self) -> &mut GeneratorBase;

    /// Verify the generator is usable. Hosts call this before anything else.
    fn check_generator(&mut self) -> Result<(), GeneratorError> {
        self.base().check()?;
        self.base_mut().set_stage(Stage::Checked);
        Ok(())
    }

    /// Copy a template directory to a new location. Hidden files are left
    /// behind and an existing destination is never touched.
    fn clone_template(&self, template: &Path, destination: &Path) -> Result<(), GeneratorError> {
        clone_template(template, destination)
    }

    /// Store the run configuration for the later steps.
    fn init(&mut self, config: GenerationConfig) -> Result<(), GeneratorError> {
        self.base_mut().store_config(config);
        Ok(())
    }

    /// Start reading the configured sources. The returned handle completes
    /// exactly once with either the style guide or the traversal's error.
    fn parse(&mut self) -> Result<PendingStyleguide, GeneratorError> {
        let config = self.base().require_config()?;
        if config.verbose {
            tracing::info!("parsing your style guide");
        }

        let sources = config.source.clone();
        let options = GeneratorBase::traverse_options(config);
        let traversal = Arc::clone(&self.base().traversal);

        let pending = PendingStyleguide::spawn(traversal, sources, options)?;
        self.base_mut().set_stage(Stage::Parsing);
        Ok(pending)
    }

    /// Render the style guide.
    fn generate(&mut self, styleguide: &Styleguide) -> Result<(), GeneratorError>;

    /// `parse` followed by `generate` on success. A failed parse never
    /// reaches `generate`.
    fn run(&mut self) -> Result<(), GeneratorError> {
        let result = self
            .parse()
            .and_then(|pending| pending.then(|styleguide| self.generate(&styleguide)))
            .and_then(|rendered| rendered);

        let stage = if result.is_ok() {
            Stage::Generated
        } else {
            Stage::Failed
        };
        self.base_mut().set_stage(stage);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare {
        base: GeneratorBase,
        rendered: usize,
    }

    impl Generator for Bare {
        fn base(&self) -> &GeneratorBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut GeneratorBase {
            &mut self.base
        }

        fn generate(&mut self, _styleguide: &Styleguide) -> Result<(), GeneratorError> {
            self.rendered += 1;
            Ok(())
        }
    }

    fn bare(version: Option<&str>) -> Bare {
        Bare {
            base: GeneratorBase::new(version, BTreeMap::new()),
            rendered: 0,
        }
    }

    #[test]
    fn check_passes_with_declared_version() {
        let mut generator = bare(Some("2.0"));
        generator.check_generator().unwrap();
        assert_eq!(generator.base().stage(), Stage::Checked);
        assert_eq!(generator.base().api(), API);
    }

    #[test]
    fn check_fails_without_version() {
        let mut generator = bare(None);
        let err = generator.check_generator().unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::UnconfiguredVersion { api: API, instance: None }
        ));
        assert!(err.to_string().contains("API 2.0: \"undefined\""));
        assert_eq!(generator.base().stage(), Stage::Constructed);
    }

    #[test]
    fn reserved_option_is_a_contract_violation() {
        let mut options = BTreeMap::new();
        options.insert("destination".to_string(), OptionSpec::value("clash"));
        let mut generator = Bare {
            base: GeneratorBase::new(Some("2.0"), options),
            rendered: 0,
        };
        assert!(matches!(
            generator.check_generator(),
            Err(GeneratorError::ContractViolation(_))
        ));
    }

    #[test]
    fn compatibility_levels() {
        let cases = [
            (Some("2.0"), Compatibility::Compatible),
            (Some("2"), Compatibility::Compatible),
            (Some("2.0.3"), Compatibility::Compatible),
            (Some("2.1"), Compatibility::Newer),
            (Some("1.4"), Compatibility::Older),
            (Some("3.0"), Compatibility::Newer),
            (Some("v2.0"), Compatibility::Compatible),
            (Some("latest"), Compatibility::Unparseable),
            (None, Compatibility::Unparseable),
        ];
        for (version, expected) in cases {
            assert_eq!(bare(version).base().compatibility(), expected, "{version:?}");
        }
    }

    #[test]
    fn init_stores_config() {
        let mut generator = bare(Some("2.0"));
        assert!(generator.base().config().is_none());

        let config = GenerationConfig::new(["./src"]);
        generator.init(config.clone()).unwrap();
        assert_eq!(generator.base().config(), Some(&config));
        assert_eq!(generator.base().stage(), Stage::Configured);
    }

    #[test]
    fn parse_before_init_fails() {
        let mut generator = bare(Some("2.0"));
        assert!(matches!(
            generator.parse(),
            Err(GeneratorError::NotInitialized)
        ));
    }

    struct Empty;

    impl Traversal for Empty {
        fn traverse(
            &self,
            _: &[PathBuf],
            _: &TraverseOptions,
        ) -> Result<Styleguide, KssError> {
            Ok(Styleguide::default())
        }
    }

    #[test]
    fn run_renders_once() {
        let mut generator = Bare {
            base: GeneratorBase::new(Some("2.0"), BTreeMap::new()).with_traversal(Empty),
            rendered: 0,
        };
        generator.init(GenerationConfig::new(["src"])).unwrap();
        generator.run().unwrap();
        assert_eq!(generator.rendered, 1);
        assert_eq!(generator.base().stage(), Stage::Generated);
    }

    #[test]
    fn empty_mask_falls_back_to_default() {
        let mut config = GenerationConfig::new(["a"]);
        config.mask = "  ".into();
        assert!(GeneratorBase::traverse_options(&config).mask.is_none());
    }
}
