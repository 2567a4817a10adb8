//! Validator and sequence behaviour through the public API.
//!
//! Each test builds a sequence from the standard catalog the way a front end
//! would, then checks the findings the sequence reports.

use blocklab_core::catalog::Catalog;
use blocklab_core::domain::{InstanceId, ParamValue};
use blocklab_core::sequence::{SequenceError, StrategySequence};
use blocklab_core::validator::{self, ACTIONS_MUST_FOLLOW_CONDITIONS, EMPTY_STRATEGY};

fn build(templates: &[&str]) -> (StrategySequence, Vec<InstanceId>) {
    let catalog = Catalog::standard();
    let mut seq = StrategySequence::new();
    let ids = templates
        .iter()
        .map(|t| seq.add(catalog.get(t).expect("template exists")))
        .collect();
    (seq, ids)
}

fn messages_for<'a>(seq: &'a StrategySequence, id: &InstanceId) -> Vec<&'a str> {
    seq.findings()
        .iter()
        .filter(|f| f.concerns(id))
        .map(|f| f.message.as_str())
        .collect()
}

#[test]
fn empty_sequence_has_exactly_one_sequence_level_finding() {
    let seq = StrategySequence::new();
    assert_eq!(seq.findings().len(), 1);
    assert!(seq.findings()[0].is_sequence_level());
    assert_eq!(seq.findings()[0].message, EMPTY_STRATEGY);
}

#[test]
fn removing_the_last_block_brings_back_the_empty_finding() {
    let (mut seq, _) = build(&["sma"]);
    assert!(seq.can_save());
    seq.remove(0).unwrap();
    assert_eq!(seq.findings()[0].message, EMPTY_STRATEGY);
}

#[test]
fn indicator_period_rule_names_the_instance() {
    let (mut seq, ids) = build(&["sma", "rsi"]);
    seq.set_parameter(&ids[1], "period", ParamValue::Number(0.0)).unwrap();

    assert_eq!(seq.findings().len(), 1);
    assert_eq!(messages_for(&seq, &ids[1]), vec!["RSI period must be greater than 0"]);

    seq.set_parameter(&ids[1], "period", ParamValue::Number(-3.0)).unwrap();
    assert_eq!(messages_for(&seq, &ids[1]).len(), 1);
}

#[test]
fn cross_above_with_both_references_passes() {
    let (mut seq, ids) = build(&["sma", "ema", "cross_above"]);
    assert_eq!(
        messages_for(&seq, &ids[2]),
        vec!["Cross Above requires two indicators to be selected"]
    );

    seq.set_parameter(&ids[2], "indicator1", ParamValue::text(ids[0].as_str())).unwrap();
    seq.set_parameter(&ids[2], "indicator2", ParamValue::text(ids[1].as_str())).unwrap();
    assert!(messages_for(&seq, &ids[2]).is_empty());
    assert!(seq.can_save());
}

#[test]
fn condition_then_action_has_no_sequencing_finding() {
    let (mut seq, ids) = build(&["greater_than", "buy"]);
    seq.set_parameter(&ids[0], "value", ParamValue::Number(1.0)).unwrap();
    assert!(seq.findings().is_empty());
}

#[test]
fn only_the_second_of_two_actions_is_out_of_sequence() {
    let (seq, ids) = build(&["buy", "sell"]);
    assert!(messages_for(&seq, &ids[0]).is_empty());
    assert_eq!(messages_for(&seq, &ids[1]), vec![ACTIONS_MUST_FOLLOW_CONDITIONS]);
}

#[test]
fn sequencing_checks_only_the_immediate_predecessor() {
    // Condition, Indicator, Action: a condition earlier in the chain does not help.
    let (mut seq, ids) = build(&["less_than", "rsi", "buy"]);
    seq.set_parameter(&ids[0], "value", ParamValue::Number(30.0)).unwrap();
    assert_eq!(messages_for(&seq, &ids[2]), vec![ACTIONS_MUST_FOLLOW_CONDITIONS]);

    // Moving the indicator to the front fixes it.
    seq.reorder(1, 0).unwrap();
    assert!(seq.findings().is_empty());
}

#[test]
fn bad_quantity_and_bad_position_accumulate() {
    let (mut seq, ids) = build(&["sma", "sell"]);
    seq.set_parameter(&ids[1], "quantity", ParamValue::Number(0.0)).unwrap();
    assert_eq!(
        messages_for(&seq, &ids[1]),
        vec!["Sell quantity must be greater than 0", ACTIONS_MUST_FOLLOW_CONDITIONS]
    );
}

#[test]
fn remove_on_empty_and_past_end_fail_without_change() {
    let mut empty = StrategySequence::new();
    assert_eq!(
        empty.remove(0),
        Err(SequenceError::OutOfRange { index: 0, len: 0 })
    );

    let (mut seq, ids) = build(&["sma", "buy"]);
    let before = seq.findings().to_vec();
    assert_eq!(
        seq.remove(2),
        Err(SequenceError::OutOfRange { index: 2, len: 2 })
    );
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.blocks()[0].instance_id, ids[0]);
    assert_eq!(seq.findings(), before.as_slice());
}

#[test]
fn reorder_first_to_last_shifts_the_rest_down() {
    let (mut seq, ids) = build(&["sma", "ema", "cross_above", "buy", "sell"]);
    let last = seq.len() - 1;
    seq.reorder(0, last).unwrap();

    let order: Vec<_> = seq.blocks().iter().map(|b| b.instance_id.clone()).collect();
    assert_eq!(order, vec![ids[1].clone(), ids[2].clone(), ids[3].clone(), ids[4].clone(), ids[0].clone()]);
}

#[test]
fn set_parameter_on_removed_block_is_not_found() {
    let (mut seq, ids) = build(&["sma"]);
    seq.remove(0).unwrap();
    assert_eq!(
        seq.set_parameter(&ids[0], "period", ParamValue::Number(5.0)),
        Err(SequenceError::NotFound(ids[0].clone()))
    );
}

#[test]
fn cached_findings_match_a_fresh_pass() {
    let (mut seq, ids) = build(&["buy", "sma", "cross_below", "sell", "greater_than"]);
    seq.set_parameter(&ids[1], "period", ParamValue::text("")).unwrap();
    seq.reorder(4, 0).unwrap();
    assert_eq!(seq.findings(), validator::validate(seq.blocks()).as_slice());
}
