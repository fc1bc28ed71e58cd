use calc_session::{CalcError, ParseError, Session, TokenKind};

fn typed(fragments: &[&str]) -> Session {
    let mut session = Session::default();
    for fragment in fragments {
        session.append(fragment);
    }
    session
}

fn calculated(input: &str) -> String {
    let mut session = typed(&[input]);
    session.calculate().unwrap().text
}

#[test]
fn end_to_end_results() {
    assert_eq!(calculated("3+4×2"), "11");
    assert_eq!(calculated("sqrt(16)+2^3"), "12");
    assert_eq!(calculated("10mod3"), "1");
    assert_eq!(calculated("50%"), "0.5");
    assert_eq!(calculated("(2+3)%"), "0.05");
    assert_eq!(calculated("5!"), "120");
    assert_eq!(calculated("0.1+0.2"), "0.3");
}

#[test]
fn typing_digit_by_digit() {
    let mut session = typed(&["1", "0", "mod", "3"]);
    assert_eq!(session.display_text(), "10mod3");
    assert_eq!(session.live_preview(), Some("1"));

    let kinds: Vec<_> = session
        .classified_tokens()
        .into_iter()
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Number, TokenKind::ModKeyword, TokenKind::Number]
    );

    assert_eq!(session.calculate().unwrap().text, "1");
}

#[test]
fn undo_after_appends_returns_to_first_fragment() {
    let fragments = ["7", "+", "sin(", "0", ")"];
    let mut session = typed(&fragments);
    for _ in 1..fragments.len() {
        session.undo();
    }
    assert_eq!(session.input(), "7");

    // the first snapshot is never undone
    session.undo();
    assert_eq!(session.input(), "7");
}

#[test]
fn redo_replays_undone_edits() {
    let mut session = typed(&["1", "2", "3"]);
    session.undo();
    session.undo();
    assert_eq!(session.input(), "1");

    session.redo();
    assert_eq!(session.input(), "12");
    session.redo();
    assert_eq!(session.input(), "123");
    assert!(!session.can_redo());

    let snapshot = session.snapshot();
    assert_eq!(session.redo(), snapshot);
}

#[test]
fn new_edits_clear_redo() {
    let mut session = typed(&["1", "2"]);
    session.undo();
    assert!(session.can_redo());

    session.append("5");
    assert!(!session.can_redo());
    session.redo();
    assert_eq!(session.input(), "15");
}

#[test]
fn history_round_trip() {
    let mut session = typed(&["6", "×", "7"]);
    session.calculate().unwrap();
    assert_eq!(session.input(), "42");

    let latest = session.history_entries().next().unwrap();
    assert_eq!(latest.input, "6×7");
    assert_eq!(latest.result, "42");

    session.reuse_from_history(0);
    assert_eq!(session.input(), "6×7");
    session.undo();
    assert_eq!(session.input(), "42");
}

#[test]
fn history_is_newest_first() {
    let mut session = Session::default();
    for expression in ["1+1", "2×3"] {
        session.clear();
        session.append(expression);
        session.calculate().unwrap();
    }
    let entries: Vec<_> = session
        .history_entries()
        .map(|entry| (entry.input.as_str(), entry.result.as_str()))
        .collect();
    assert_eq!(entries, vec![("2×3", "6"), ("1+1", "2")]);
}

#[test]
fn results_can_be_extended() {
    let mut session = typed(&["1/4"]);
    session.calculate().unwrap();
    session.append("+1");
    assert_eq!(session.live_preview(), Some("1.25"));

    let mut session = typed(&["2-5"]);
    session.calculate().unwrap();
    assert_eq!(session.input(), "-3");
    session.append("×2");
    assert_eq!(session.live_preview(), Some("-6"));
}

#[test]
fn calculate_reports_typed_errors() {
    let mut session = typed(&["(1+2"]);
    assert!(matches!(
        session.calculate(),
        Err(CalcError::Parse(ParseError::UnmatchedParen { .. }))
    ));
    assert_eq!(session.display_text(), "0");
    assert_eq!(session.live_preview(), None);
}
