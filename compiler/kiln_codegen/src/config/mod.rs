//! Codegen configuration.

use kiln_diagnostic::DiagnosticConfig;
use kiln_types::TargetLayout;

/// Settings shared by every unit lowered in one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Target data layout (pointer width, alignment).
    pub layout: TargetLayout,
    /// Emit `lifetime.start`/`lifetime.end` around scratch slots.
    pub lifetime_markers: bool,
    /// Deduplication and the optional error limit for user diagnostics.
    pub diagnostics: DiagnosticConfig,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            layout: TargetLayout::default(),
            lifetime_markers: true,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl CodegenConfig {
    /// Use `layout` for sizes and offsets.
    #[must_use]
    pub fn with_layout(mut self, layout: TargetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable lifetime markers on scratch slots.
    #[must_use]
    pub fn with_lifetime_markers(mut self, enabled: bool) -> Self {
        self.lifetime_markers = enabled;
        self
    }

    /// Use `config` when collecting user diagnostics.
    #[must_use]
    pub fn with_diagnostics(mut self, config: DiagnosticConfig) -> Self {
        self.diagnostics = config;
        self
    }
}

#[cfg(test)]
mod tests;
