use pretty_assertions::assert_eq;

use super::*;

fn key_error(at: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E5101)
        .with_message(format!("bad key at {at}"))
        .with_label(Span::point(at), "here")
}

#[test]
fn keeps_report_order() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(key_error(30));
    queue.add(key_error(10));
    queue.add(key_error(20));

    let spans: Vec<_> = queue.flush().iter().map(|d| d.primary_span()).collect();
    assert_eq!(
        spans,
        vec![Some(Span::point(30)), Some(Span::point(10)), Some(Span::point(20))]
    );
    assert!(queue.is_empty());
}

#[test]
fn deduplicates_identical_reports() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(key_error(4)));
    assert!(!queue.add(key_error(4)));
    assert!(queue.add(key_error(5)));
    assert_eq!(queue.len(), 2);
}

#[test]
fn dedup_disabled_keeps_everything() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(key_error(4));
    queue.add(key_error(4));
    assert_eq!(queue.len(), 2);
}

#[test]
fn default_config_keeps_every_error() {
    let mut queue = DiagnosticQueue::new();
    for at in 0..25 {
        assert!(queue.add(key_error(at)));
    }
    assert!(!queue.limit_reached());

    let set = queue.into_error_set().unwrap();
    assert_eq!(set.len(), 25);
}

#[test]
fn error_limit_drops_excess_errors() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.add(key_error(1)));
    assert!(queue.add(key_error(2)));
    assert!(queue.limit_reached());
    assert!(!queue.add(key_error(3)));
    assert_eq!(queue.len(), 2);
}

#[test]
fn into_error_set_keeps_report_order() {
    let mut queue = DiagnosticQueue::new();
    queue.add(key_error(2));
    queue.add(key_error(1));

    let set = queue.into_error_set().unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.first().message, "bad key at 2");
    assert_eq!(set.iter().last().map(|d| d.message.as_str()), Some("bad key at 1"));
}

#[test]
fn no_errors_no_set() {
    let queue = DiagnosticQueue::new();
    assert!(!queue.has_errors());
    assert_eq!(queue.into_error_set(), None);
}
