//! Strategy validator: pure function from a block sequence to findings.
//!
//! Rules run in a fixed order and each rule walks the sequence front to back,
//! so identical input always yields an identical finding list. Only the
//! empty-sequence rule short-circuits.

use crate::domain::{BlockInstance, BlockKind, ValidationFinding};
use crate::schema::{self, Variant};

pub const EMPTY_STRATEGY: &str = "Strategy must contain at least one block";
pub const ACTIONS_MUST_FOLLOW_CONDITIONS: &str = "Actions must follow conditions";

/// Validate a sequence. An empty result means the strategy may be saved.
pub fn validate(blocks: &[BlockInstance]) -> Vec<ValidationFinding> {
    if blocks.is_empty() {
        return vec![ValidationFinding::sequence(EMPTY_STRATEGY)];
    }

    let mut findings = Vec::new();
    check_indicators(blocks, &mut findings);
    check_conditions(blocks, &mut findings);
    check_actions(blocks, &mut findings);
    check_sequencing(blocks, &mut findings);
    findings
}

/// True when the value under `key` reads as a number greater than zero.
/// Missing and non-numeric values fail.
fn is_positive(block: &BlockInstance, key: &str) -> bool {
    block
        .param(key)
        .and_then(|v| v.as_number())
        .is_some_and(|n| n > 0.0)
}

fn is_set(block: &BlockInstance, key: &str) -> bool {
    block.param(key).is_some_and(|v| v.is_present())
}

fn of_kind(blocks: &[BlockInstance], kind: BlockKind) -> impl Iterator<Item = &BlockInstance> {
    blocks.iter().filter(move |b| b.kind == kind)
}

fn check_indicators(blocks: &[BlockInstance], out: &mut Vec<ValidationFinding>) {
    for block in of_kind(blocks, BlockKind::Indicator) {
        if !is_positive(block, schema::PERIOD) {
            out.push(ValidationFinding::block(
                &block.instance_id,
                format!("{} period must be greater than 0", block.display_name),
            ));
        }
    }
}

fn check_conditions(blocks: &[BlockInstance], out: &mut Vec<ValidationFinding>) {
    for block in of_kind(blocks, BlockKind::Condition) {
        match schema::variant_of(block.kind, &block.display_name) {
            Variant::Cross => {
                if !(is_set(block, schema::INDICATOR_1) && is_set(block, schema::INDICATOR_2)) {
                    out.push(ValidationFinding::block(
                        &block.instance_id,
                        format!("{} requires two indicators to be selected", block.display_name),
                    ));
                }
            }
            _ => {
                if !is_set(block, schema::VALUE) {
                    out.push(ValidationFinding::block(
                        &block.instance_id,
                        format!("{} requires a value to be set", block.display_name),
                    ));
                }
            }
        }
    }
}

fn check_actions(blocks: &[BlockInstance], out: &mut Vec<ValidationFinding>) {
    for block in of_kind(blocks, BlockKind::Action) {
        if !is_positive(block, schema::QUANTITY) {
            out.push(ValidationFinding::block(
                &block.instance_id,
                format!("{} quantity must be greater than 0", block.display_name),
            ));
        }
    }
}

/// Only the immediate predecessor is checked.
fn check_sequencing(blocks: &[BlockInstance], out: &mut Vec<ValidationFinding>) {
    for pair in blocks.windows(2) {
        let (prev, block) = (&pair[0], &pair[1]);
        if block.kind == BlockKind::Action && prev.kind != BlockKind::Condition {
            out.push(ValidationFinding::block(
                &block.instance_id,
                ACTIONS_MUST_FOLLOW_CONDITIONS,
            ));
        }
    }
}

/// Findings attached to one instance.
pub fn findings_for<'a>(
    findings: &'a [ValidationFinding],
    block: &'a BlockInstance,
) -> impl Iterator<Item = &'a ValidationFinding> {
    findings.iter().filter(move |f| f.concerns(&block.instance_id))
}
