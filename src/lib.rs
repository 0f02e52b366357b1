//! Build browsable HTML style guides from KSS comments.
//!
//! - [`kss`] walks stylesheets and parses their documentation comments into a
//!   [`kss::Styleguide`].
//! - [`generator`] defines the [`generator::Generator`] contract and ships the
//!   [`generator::HtmlGenerator`].
//! - [`model`] holds run configuration, generator option declarations and the
//!   lifecycle stage.
//! - [`cli`] is the command line used by the `kssgen` binary.

pub mod cli;
pub mod generator;
pub mod kss;
pub mod model;

pub use generator::{API, Generator, GeneratorBase, GeneratorError, HtmlGenerator};
pub use kss::{Styleguide, Traversal, TraverseOptions};
pub use model::config::GenerationConfig;
pub use model::option::OptionSpec;
