//! Strategy sequence: the ordered, mutable block list of one editing session.
//!
//! Every successful mutation re-runs the validator before returning, so
//! `findings()` and `can_save()` always describe the current blocks. Failed
//! mutations leave blocks and findings untouched.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::domain::{BlockInstance, BlockTemplate, InstanceId, ParamValue, ValidationFinding};
use crate::fingerprint::SequenceHash;
use crate::validator;

/// Contract violations raised by sequence mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("index {index} is out of range for a sequence of {len} blocks")]
    OutOfRange { index: usize, len: usize },

    #[error("no block with instance id '{0}'")]
    NotFound(InstanceId),

    #[error("instance id '{0}' appears more than once")]
    DuplicateInstance(InstanceId),
}

/// Ordered block list plus the findings of its latest validation pass.
#[derive(Debug, Clone)]
pub struct StrategySequence {
    blocks: Vec<BlockInstance>,
    findings: Vec<ValidationFinding>,
    minted: u64,
}

impl Default for StrategySequence {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategySequence {
    pub fn new() -> Self {
        Self::with_blocks(Vec::new())
    }

    /// Rebuild a sequence from previously saved blocks.
    pub fn from_blocks(blocks: Vec<BlockInstance>) -> Result<Self, SequenceError> {
        let mut seen = HashSet::new();
        for block in &blocks {
            if !seen.insert(&block.instance_id) {
                return Err(SequenceError::DuplicateInstance(block.instance_id.clone()));
            }
        }
        Ok(Self::with_blocks(blocks))
    }

    fn with_blocks(blocks: Vec<BlockInstance>) -> Self {
        let findings = validator::validate(&blocks);
        Self {
            blocks,
            findings,
            minted: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlockInstance> {
        self.blocks.get(index)
    }

    pub fn position(&self, id: &InstanceId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.instance_id == id)
    }

    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// Save is only possible with zero findings.
    pub fn can_save(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn fingerprint(&self) -> SequenceHash {
        SequenceHash::of(&self.blocks)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Append a new instance of `template`. Never fails.
    pub fn add(&mut self, template: &BlockTemplate) -> InstanceId {
        let id = self.mint_id(template);
        self.blocks.push(BlockInstance::from_template(template, id.clone()));
        debug!(instance = %id, template = %template.id, "block added");
        self.revalidate();
        id
    }

    /// Remove the instance at `index`; later blocks shift left.
    pub fn remove(&mut self, index: usize) -> Result<BlockInstance, SequenceError> {
        self.check_index(index)?;
        let removed = self.blocks.remove(index);
        debug!(instance = %removed.instance_id, index, "block removed");
        self.revalidate();
        Ok(removed)
    }

    /// Move the instance at `from` to `to`.
    ///
    /// The block is removed first and `to` is then applied to the shortened
    /// list, so `reorder(0, len - 1)` moves the first block to the end.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), SequenceError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let block = self.blocks.remove(from);
        debug!(instance = %block.instance_id, from, to, "block moved");
        self.blocks.insert(to, block);
        self.revalidate();
        Ok(())
    }

    /// Overwrite one parameter of the named instance. No type coercion.
    pub fn set_parameter(
        &mut self,
        id: &InstanceId,
        key: &str,
        value: ParamValue,
    ) -> Result<(), SequenceError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| &b.instance_id == id)
            .ok_or_else(|| SequenceError::NotFound(id.clone()))?;
        debug!(instance = %id, key, value = %value, "parameter set");
        block.parameters.insert(key.to_string(), value);
        self.revalidate();
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn check_index(&self, index: usize) -> Result<(), SequenceError> {
        if index < self.blocks.len() {
            Ok(())
        } else {
            Err(SequenceError::OutOfRange {
                index,
                len: self.blocks.len(),
            })
        }
    }

    /// Next `<template>-<n>` not already used by a block in this sequence.
    fn mint_id(&mut self, template: &BlockTemplate) -> InstanceId {
        loop {
            self.minted += 1;
            let candidate = InstanceId::minted(&template.id, self.minted);
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn revalidate(&mut self) {
        self.findings = validator::validate(&self.blocks);
    }
}
