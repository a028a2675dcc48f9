//! The in-memory graph.

use crate::term::Term;
use std::collections::BTreeMap;

/// A set of triples, grouped by subject then predicate.
///
/// Ordering is deterministic (sorted maps, insertion-ordered values with
/// duplicates dropped), so serializing the same graph always yields the same
/// bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeMap<String, BTreeMap<String, Vec<Term>>>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple. Duplicate triples are ignored.
    pub fn insert(&mut self, subject: impl Into<String>, predicate: impl Into<String>, object: Term) {
        let values = self
            .nodes
            .entry(subject.into())
            .or_default()
            .entry(predicate.into())
            .or_default();
        if !values.contains(&object) {
            values.push(object);
        }
    }

    /// Registers a subject without adding any triples.
    pub fn ensure_subject(&mut self, subject: impl Into<String>) {
        self.nodes.entry(subject.into()).or_default();
    }

    /// All values of `predicate` on `subject`; empty when either is absent.
    pub fn predicate_values(&self, subject: &str, predicate: &str) -> &[Term] {
        self.nodes
            .get(subject)
            .and_then(|props| props.get(predicate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value of `predicate` on `subject`.
    pub fn first_value(&self, subject: &str, predicate: &str) -> Option<&Term> {
        self.predicate_values(subject, predicate).first()
    }

    /// Returns true if the subject appears in the graph.
    pub fn contains_subject(&self, subject: &str) -> bool {
        self.nodes.contains_key(subject)
    }

    /// Subjects in sorted order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Predicates and values of one subject.
    pub fn properties(&self, subject: &str) -> impl Iterator<Item = (&str, &[Term])> {
        self.nodes
            .get(subject)
            .into_iter()
            .flat_map(|props| props.iter().map(|(p, v)| (p.as_str(), v.as_slice())))
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.nodes
            .values()
            .flat_map(|props| props.values())
            .map(Vec::len)
            .sum()
    }

    /// Returns true if there are no subjects.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes a predicate from every subject. Returns the number of triples removed.
    pub fn remove_predicate(&mut self, predicate: &str) -> usize {
        self.nodes
            .values_mut()
            .filter_map(|props| props.remove(predicate))
            .map(|values| values.len())
            .sum()
    }

    /// Keeps only the subjects for which `keep` returns true.
    pub fn retain_subjects(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.nodes.retain(|subject, _| keep(subject));
    }

    /// Rewrites every IRI (subjects and IRI objects) through `map`.
    ///
    /// Subjects that collapse onto the same IRI are merged.
    pub fn map_iris(&mut self, map: impl Fn(&str) -> String) {
        let nodes = std::mem::take(&mut self.nodes);
        for (subject, props) in nodes {
            let subject = map(&subject);
            self.ensure_subject(subject.clone());
            for (predicate, values) in props {
                for value in values {
                    let value = match value {
                        Term::Iri(iri) => Term::Iri(map(&iri)),
                        literal => literal,
                    };
                    self.insert(subject.clone(), predicate.clone(), value);
                }
            }
        }
    }
}
