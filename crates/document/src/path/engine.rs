//! Evaluates relative paths against an element tree.

use super::ast::{Predicate, RelativePath, Step, StepKind};
use crate::node::{Element, ElementPath};
use std::collections::HashSet;

/// Selects the elements `path` designates from the element at `context`.
///
/// Results are element paths from `root`, deduplicated and in document
/// order. Steps never leave the subtree rooted at `context`.
pub fn select(root: &Element, context: &[usize], path: &RelativePath) -> Vec<ElementPath> {
    let mut current: Vec<ElementPath> = vec![context.to_vec()];

    for step in &path.steps {
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        for node in &current {
            let bases = if step.descend {
                descendant_or_self(root, node)
            } else {
                vec![node.clone()]
            };
            for base in bases {
                for found in apply_step(root, context, &base, step) {
                    if seen.insert(found.clone()) {
                        next.push(found);
                    }
                }
            }
        }
        current = next;
    }

    current.sort();
    current
}

fn descendant_or_self(root: &Element, node: &[usize]) -> Vec<ElementPath> {
    let mut out = vec![node.to_vec()];
    if let Some(element) = root.get_path(node) {
        out.extend(element.descendant_paths(node));
    }
    out
}

fn apply_step(root: &Element, context: &[usize], base: &[usize], step: &Step) -> Vec<ElementPath> {
    match &step.kind {
        StepKind::SelfNode => vec![base.to_vec()],
        StepKind::Parent if base.len() > context.len() => vec![base[..base.len() - 1].to_vec()],
        StepKind::Parent => vec![],
        StepKind::Select(test) => {
            let Some(element) = root.get_path(base) else {
                return vec![];
            };
            // Candidates share a parent, which is what positional predicates count against.
            let mut candidates: Vec<ElementPath> = element
                .children
                .iter()
                .enumerate()
                .filter(|(_, n)| n.as_element().is_some_and(|e| test.matches(e)))
                .map(|(index, _)| {
                    let mut path = base.to_vec();
                    path.push(index);
                    path
                })
                .collect();
            for predicate in &step.predicates {
                candidates = apply_predicate(root, candidates, predicate);
            }
            candidates
        }
    }
}

fn apply_predicate(root: &Element, candidates: Vec<ElementPath>, predicate: &Predicate) -> Vec<ElementPath> {
    match predicate {
        Predicate::Position(n) => candidates.into_iter().nth(n - 1).into_iter().collect(),
        Predicate::Last(offset) => {
            let len = candidates.len();
            if *offset < len {
                candidates.into_iter().nth(len - 1 - offset).into_iter().collect()
            } else {
                vec![]
            }
        }
        other => candidates
            .into_iter()
            .filter(|p| root.get_path(p).is_some_and(|e| other.matches(e)))
            .collect(),
    }
}
