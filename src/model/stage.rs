/// Where a generator is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Built, nothing checked yet.
    #[default]
    Constructed,
    /// `check_generator` passed.
    Checked,
    /// Configuration stored by `init`.
    Configured,
    /// Traversal running in the background.
    Parsing,
    /// Output written.
    Generated,
    /// Parse or render failed. Terminal.
    Failed,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Constructed => "constructed",
            Stage::Checked => "checked",
            Stage::Configured => "configured",
            Stage::Parsing => "parsing",
            Stage::Generated => "generated",
            Stage::Failed => "failed",
        }
    }
}
