//! Discovery pass over all translation units
//!
//! Runs before any allocation. Finds which unit defines each routine, orders
//! units so that a unit depending on a routine defined elsewhere runs after
//! the defining unit, and lists routines that are opened but never
//! forward-declared (used when implicit declarations are enabled).
//!
//! Directive order inside a unit is never changed.

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::BTreeSet;

use super::{SessionError, TranslationUnit};
use crate::ast::Directive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPlan {
    /// Unit indices in processing order
    pub order: Vec<usize>,
    /// Routines opened somewhere but never forward-declared, first-seen order
    pub undeclared: Vec<String>,
}

pub fn plan(units: &[TranslationUnit]) -> Result<UnitPlan, SessionError> {
    let mut definer: HashMap<&str, usize> = HashMap::default();
    let mut forward: HashSet<&str> = HashSet::default();
    let mut opened: Vec<&str> = Vec::new();

    for (index, unit) in units.iter().enumerate() {
        for directive in &unit.directives {
            match &directive.node {
                Directive::OpenRoutine(name) => {
                    definer.entry(name.node.as_str()).or_insert(index);
                    opened.push(name.node.as_str());
                }
                Directive::ForwardDeclare(names) => {
                    forward.extend(names.iter().map(|n| n.node.as_str()));
                }
                _ => {}
            }
        }
    }

    // edges[v] = units that must run after v
    let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); units.len()];
    let mut indegree = vec![0usize; units.len()];
    for (index, unit) in units.iter().enumerate() {
        for directive in &unit.directives {
            let Directive::DeclareDependencies(names) = &directive.node else {
                continue;
            };
            for name in names {
                let Some(&defining) = definer.get(name.node.as_str()) else {
                    continue;
                };
                if defining != index && edges[defining].insert(index) {
                    indegree[index] += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..units.len()).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(units.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &after in &edges[next] {
            indegree[after] -= 1;
            if indegree[after] == 0 {
                ready.insert(after);
            }
        }
    }

    if order.len() < units.len() {
        let blocked = cycle_members(&edges, &indegree);
        let units = blocked.into_iter().map(|i| units[i].name.clone()).collect();
        return Err(SessionError::UnitCycle { units });
    }

    let mut seen = HashSet::default();
    let undeclared = opened
        .into_iter()
        .filter(|name| !forward.contains(name) && seen.insert(*name))
        .map(str::to_string)
        .collect();

    Ok(UnitPlan { order, undeclared })
}

/// Units left after the forward pass, minus those that merely wait on a
/// cycle without leading back into one
fn cycle_members(edges: &[BTreeSet<usize>], indegree: &[usize]) -> BTreeSet<usize> {
    let mut remaining: BTreeSet<usize> = (0..indegree.len()).filter(|&i| indegree[i] > 0).collect();
    loop {
        let dead_ends: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| !edges[i].iter().any(|after| remaining.contains(after)))
            .collect();
        if dead_ends.is_empty() {
            return remaining;
        }
        for i in dead_ends {
            remaining.remove(&i);
        }
    }
}
