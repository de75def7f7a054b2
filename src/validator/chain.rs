//! Validation of a journey's automation step chain.

use crate::error::ValidationError;
use crate::model::{AutomationStep, Resource, StepEvent};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use tracing::debug;

/// A validated step chain.
///
/// Edges point from a step to the steps whose events reference it, i.e. in activation order.
#[derive(Debug, Clone, PartialEq)]
pub struct StepGraph {
    journey_id: String,
    ids: Vec<String>,
    entries: Vec<String>,
    dependents: AHashMap<String, Vec<String>>,
}

impl StepGraph {
    pub fn journey_id(&self) -> &str {
        &self.journey_id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Active steps activated by `onJourneyStart`.
    pub fn entry_steps(&self) -> &[String] {
        &self.entries
    }

    /// Steps whose events reference `id`.
    pub fn dependents(&self, id: &str) -> &[String] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every step an enduser can reach from an entry step, entries first.
    pub fn reachable(&self) -> Vec<String> {
        let mut seen = AHashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<String> = self.entries.iter().cloned().collect();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            queue.extend(self.dependents(&id).iter().cloned());
            order.push(id);
        }
        order
    }

    /// Steps no entry step leads to.
    pub fn unreachable(&self) -> Vec<String> {
        let reachable: AHashSet<String> = self.reachable().into_iter().collect();
        self.ids
            .iter()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect()
    }

    /// Steps ordered so every referenced step comes before the steps referencing it.
    ///
    /// Ties keep creation order. Edges of non-chaining events (`onError`, `formResponse`, ...)
    /// are included, so a step pair referencing each other through those is left out.
    pub fn activation_order(&self) -> Vec<String> {
        let mut in_degree: AHashMap<&str, usize> =
            self.ids.iter().map(|id| (id.as_str(), 0)).collect();
        for targets in self.dependents.values() {
            for target in targets {
                if let Some(count) = in_degree.get_mut(target.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut queue: VecDeque<&str> = self
            .ids
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut ordered = Vec::with_capacity(self.ids.len());
        while let Some(next) = queue.pop_front() {
            ordered.push(next.to_string());
            for child in self.dependents(next) {
                if let Some(count) = in_degree.get_mut(child.as_str())
                    && *count > 0
                {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(child.as_str());
                    }
                }
            }
        }
        ordered
    }
}

/// Validates the complete step set of `journey_id`.
///
/// Checks run in order: every step has an id, every step reference resolves, at least one
/// active step has an `onJourneyStart` event, and no `afterAction`/`waitForTrigger` chain
/// leads back to the step it started from.
pub fn validate_journey_steps(
    journey_id: &str,
    steps: &[AutomationStep],
) -> Result<StepGraph, ValidationError> {
    debug!(journey_id, steps = steps.len(), "Validating automation step chain");

    let mut ids = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        match step.id() {
            Some(id) => ids.push(id.to_string()),
            None => {
                return Err(ValidationError::MissingId {
                    path: format!("steps[{i}].id"),
                });
            }
        }
    }
    let known: AHashSet<&str> = ids.iter().map(String::as_str).collect();

    for step in steps {
        check_references(step, |id| known.contains(id))?;
    }

    let entries: Vec<String> = steps
        .iter()
        .filter(|s| !s.is_archived() && s.is_entry())
        .map(|s| s.label())
        .collect();
    if entries.is_empty() {
        return Err(ValidationError::MissingEntryStep {
            journey_id: journey_id.to_string(),
        });
    }

    if let Some(cycle) = find_cycle(steps) {
        return Err(ValidationError::CyclicStepChain {
            journey_id: journey_id.to_string(),
            cycle,
        });
    }

    let mut dependents: AHashMap<String, Vec<String>> = AHashMap::new();
    for step in steps {
        let id = step.label();
        for target in step.events.iter().filter_map(StepEvent::referenced_step) {
            let next = dependents.entry(target.to_string()).or_default();
            if !next.contains(&id) {
                next.push(id.clone());
            }
        }
    }

    Ok(StepGraph {
        journey_id: journey_id.to_string(),
        ids,
        entries,
        dependents,
    })
}

fn check_references(
    step: &AutomationStep,
    is_step: impl Fn(&str) -> bool,
) -> Result<(), ValidationError> {
    for (j, event) in step.events.iter().enumerate() {
        if let Some(target) = event.referenced_step()
            && !is_step(target)
        {
            let step_id = step.label();
            return Err(ValidationError::DanglingStepReference {
                path: format!("steps.{step_id}.events[{j}].info.automationStepId"),
                step_id,
                target: target.to_string(),
            });
        }
    }
    Ok(())
}

/// Follows `afterAction`/`waitForTrigger` back-references from every step and returns the
/// first cycle found as `[a, b, ..., a]`.
fn find_cycle(steps: &[AutomationStep]) -> Option<Vec<String>> {
    let follows: AHashMap<&str, Vec<&str>> = steps
        .iter()
        .filter_map(|step| {
            let targets = step
                .events
                .iter()
                .filter(|e| e.chains())
                .filter_map(StepEvent::referenced_step)
                .collect();
            step.id().map(|id| (id, targets))
        })
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        id: &'a str,
        follows: &AHashMap<&'a str, Vec<&'a str>>,
        marks: &mut AHashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(id) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|s| *s == id).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(id.to_string());
                return Some(cycle);
            }
            None => {}
        }
        marks.insert(id, Mark::Visiting);
        stack.push(id);
        for &next in follows.get(id).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(cycle) = visit(next, follows, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(id, Mark::Done);
        None
    }

    let mut marks = AHashMap::new();
    let mut stack = Vec::new();
    for step in steps {
        if let Some(id) = step.id()
            && let Some(cycle) = visit(id, &follows, &mut marks, &mut stack)
        {
            return Some(cycle);
        }
    }
    None
}

/// The steps of one journey, held in creation order.
#[derive(Debug, Clone, Default)]
pub struct StepArena {
    journey_id: String,
    steps: Vec<AutomationStep>,
    index: AHashMap<String, usize>,
}

impl StepArena {
    pub fn new(journey_id: impl Into<String>) -> Self {
        Self {
            journey_id: journey_id.into(),
            ..Self::default()
        }
    }

    pub fn journey_id(&self) -> &str {
        &self.journey_id
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AutomationStep> {
        self.index.get(id).map(|&i| &self.steps[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn steps(&self) -> &[AutomationStep] {
        &self.steps
    }

    /// Checks a step before it is created or updated.
    ///
    /// References may only point at steps already in the arena. When an existing step is
    /// updated its new references may close a loop, so the chain is re-checked for cycles.
    pub fn check(&self, step: &AutomationStep) -> Result<(), ValidationError> {
        let own_id = step.id();
        let updating = own_id.is_some_and(|id| self.index.contains_key(id));
        check_references(step, |id| {
            self.index.contains_key(id) || (updating && own_id == Some(id))
        })?;

        if updating {
            let candidate: Vec<AutomationStep> = self
                .steps
                .iter()
                .map(|s| if s.id() == own_id { step.clone() } else { s.clone() })
                .collect();
            if let Some(cycle) = find_cycle(&candidate) {
                return Err(ValidationError::CyclicStepChain {
                    journey_id: self.journey_id.clone(),
                    cycle,
                });
            }
        }
        Ok(())
    }

    /// Records a step returned by the platform, replacing any earlier version with the same id.
    pub fn commit(&mut self, step: AutomationStep) -> Result<(), ValidationError> {
        let id = step
            .id()
            .map(str::to_string)
            .ok_or_else(|| ValidationError::MissingId {
                path: format!("journeys.{}.steps[{}].id", self.journey_id, self.steps.len()),
            })?;
        match self.index.get(&id) {
            Some(&i) => self.steps[i] = step,
            None => {
                self.index.insert(id, self.steps.len());
                self.steps.push(step);
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, step: AutomationStep) -> Result<(), ValidationError> {
        self.check(&step)?;
        self.commit(step)
    }

    /// Validates the complete chain, including the entry-step requirement.
    pub fn finish(&self) -> Result<StepGraph, ValidationError> {
        validate_journey_steps(&self.journey_id, &self.steps)
    }
}
