/// Knobs applied to a single compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Render constants as SQL literals instead of bound parameters.
    pub inline_constants: bool,
    /// Replace the dialect parameter prefix (`@`, `:`, `$`).
    pub parameter_prefix_override: Option<String>,
    /// Maximum number of bound parameters in one command, the dialect limit when `None`.
    pub max_parameters: Option<usize>,
}

impl CompileOptions {
    pub fn inline_constants(mut self, value: bool) -> Self {
        self.inline_constants = value;
        self
    }

    pub fn parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_prefix_override = Some(prefix.into());
        self
    }

    pub fn max_parameters(mut self, value: usize) -> Self {
        self.max_parameters = Some(value);
        self
    }
}
