use super::*;

#[test]
fn point_span_starts_and_ends_together() {
    let span = Span::point(42);
    assert_eq!(span, Span::new(42, 42));
    assert_eq!(format!("{span}"), "42..42");
    assert_eq!(format!("{span:?}"), "42..42");
}

#[test]
fn spans_order_by_start() {
    let mut spans = vec![Span::new(9, 10), Span::new(1, 3), Span::DUMMY];
    spans.sort();
    assert_eq!(spans, vec![Span::DUMMY, Span::new(1, 3), Span::new(9, 10)]);
}
