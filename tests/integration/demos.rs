//! The shipped demo configurations

use multihop_foundation::{InfoType, OperatorType};
use multihop_runtime::{Outcome, RunConfig, Session};

fn run(name: &str) -> (Session, Outcome) {
    let path = format!("{}/demos/{name}", env!("CARGO_MANIFEST_DIR"));
    let config = RunConfig::load(&path).unwrap();
    let session = Session::from_config(&config).unwrap();
    let outcome = session.generate().unwrap();
    (session, outcome)
}

#[test]
fn duration_demo() {
    let (_, outcome) = run("duration.toml");
    assert_eq!(outcome.strategy, "backward");
    assert_eq!(outcome.chain.applications(), 3);
    assert_eq!(outcome.question.answer.as_deref(), Some("60.47"));
}

#[test]
fn artwork_demo() {
    let (session, outcome) = run("artwork.toml");
    assert!(outcome.chain.applications() >= 2);
    assert!(outcome.chain.total_cost(session.rules()) <= 4);
}

#[test]
fn template_demo() {
    let (session, outcome) = run("template.toml");
    assert_eq!(
        outcome.chain.operators(session.rules()),
        vec![OperatorType::Search, OperatorType::Search, OperatorType::Calculate]
    );
    assert_eq!(outcome.chain.steps()[0].produced_by.as_ref().map(|r| r.as_str()), Some("birth-date"));
    assert_eq!(outcome.question.answer.as_deref(), Some("1867"));
}

#[test]
fn custom_rules_demo() {
    let (session, outcome) = run("custom_rules.toml");
    assert!(session.rules().len() > 1);
    assert_eq!(
        outcome.chain.final_state().map(|s| s.info_type),
        Some(InfoType::CountryName)
    );
    assert_eq!(outcome.question.answer.as_deref(), Some("United States"));
}
