use pretty_assertions::assert_eq;

use super::*;
use kiln_types::LayoutOracle;

#[test]
fn defaults() {
    let config = CodegenConfig::default();
    assert_eq!(config.layout.pointer_size(), 8);
    assert!(config.lifetime_markers);
    assert_eq!(config.diagnostics.error_limit, 0);
    assert!(config.diagnostics.deduplicate);
}

#[test]
fn builder_overrides() {
    let config = CodegenConfig::default()
        .with_layout(TargetLayout::target_32())
        .with_lifetime_markers(false)
        .with_diagnostics(DiagnosticConfig {
            error_limit: 3,
            deduplicate: false,
        });

    assert_eq!(config.layout.pointer_size(), 4);
    assert!(!config.lifetime_markers);
    assert_eq!(config.diagnostics.error_limit, 3);
    assert!(!config.diagnostics.deduplicate);
}
