//! Term classification.
//!
//! Finds the IRIs of a graph that have no label. A term is eligible when it
//! appears as a named node in any position, matches the namespace filter,
//! and has no outgoing edge via the label predicate.

use std::collections::{BTreeSet, HashSet};

use oxrdf::{NamedNode, NamedNodeRef, SubjectRef, TermRef};
use tracing::trace;

use lodkit_core::QuadSource;

/// Deduplicated, ordered set of terms to label.
pub type TermSet = BTreeSet<NamedNode>;

/// Namespace prefixes eligible for labeling.
///
/// An empty filter accepts every IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceFilter {
    prefixes: Vec<String>,
}

impl NamespaceFilter {
    /// Filter that accepts every IRI.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter that accepts IRIs starting with any of `prefixes`.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Build from the two configuration forms. A non-empty single prefix wins.
    pub fn from_config(single: Option<&str>, many: &[String]) -> Self {
        match single {
            Some(prefix) if !prefix.is_empty() => Self::new([prefix]),
            _ => Self::new(many.iter().cloned()),
        }
    }

    /// True when no prefix restriction applies.
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether `iri` is eligible.
    pub fn matches(&self, iri: &str) -> bool {
        self.is_empty() || self.prefixes.iter().any(|p| iri.starts_with(p.as_str()))
    }
}

fn subject_iri(subject: SubjectRef<'_>) -> Option<NamedNodeRef<'_>> {
    match subject {
        SubjectRef::NamedNode(node) => Some(node),
        _ => None,
    }
}

fn object_iri(object: TermRef<'_>) -> Option<NamedNodeRef<'_>> {
    match object {
        TermRef::NamedNode(node) => Some(node),
        _ => None,
    }
}

/// Collect every IRI in `graph` that passes `filter` and has no outgoing
/// `label` edge.
///
/// Blank nodes and literals are never returned. The label predicate itself
/// is a candidate like any other IRI.
pub fn find_unlabeled_terms<G>(graph: &G, filter: &NamespaceFilter, label: NamedNodeRef<'_>) -> TermSet
where
    G: QuadSource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut terms = TermSet::new();

    for quad in graph.quads() {
        let candidates = [
            subject_iri(quad.subject),
            Some(quad.predicate),
            object_iri(quad.object),
        ];

        for node in candidates.into_iter().flatten() {
            if !seen.insert(node) {
                continue;
            }
            if filter.matches(node.as_str()) && !graph.has_outgoing(node, label) {
                trace!(term = node.as_str(), "Term has no label");
                terms.insert(node.into_owned());
            }
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Dataset, Graph, GraphName, Literal, Quad, Triple};

    const NAME: &str = "http://schema.org/name";

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    fn label() -> NamedNode {
        iri(NAME)
    }

    fn dataset(quads: &[(&str, &str, &str)]) -> Dataset {
        let mut dataset = Dataset::new();
        for (s, p, o) in quads {
            dataset.insert(&Quad::new(iri(s), iri(p), iri(o), GraphName::DefaultGraph));
        }
        dataset
    }

    #[test]
    fn test_collects_all_positions() {
        let data = dataset(&[("https://a.example/s", "https://a.example/p", "https://a.example/o")]);
        let terms = find_unlabeled_terms(&data, &NamespaceFilter::all(), label().as_ref());

        assert_eq!(terms.len(), 3);
        assert!(terms.contains(&iri("https://a.example/s")));
        assert!(terms.contains(&iri("https://a.example/p")));
        assert!(terms.contains(&iri("https://a.example/o")));
    }

    #[test]
    fn test_labeled_term_is_excluded() {
        let mut data = dataset(&[("https://a.example/s", "https://a.example/p", "https://a.example/o")]);
        data.insert(&Quad::new(
            iri("https://a.example/s"),
            label(),
            Literal::new_simple_literal("S"),
            GraphName::DefaultGraph,
        ));

        let terms = find_unlabeled_terms(&data, &NamespaceFilter::all(), label().as_ref());

        assert!(!terms.contains(&iri("https://a.example/s")));
        assert!(terms.contains(&iri("https://a.example/o")));
        // The label predicate itself has no label of its own.
        assert!(terms.contains(&label()));
    }

    #[test]
    fn test_namespace_filter_restricts_terms() {
        let data = dataset(&[("https://a.example/s", "https://b.example/p", "https://a.example/o")]);
        let filter = NamespaceFilter::new(["https://a.example/"]);
        let terms = find_unlabeled_terms(&data, &filter, label().as_ref());

        assert_eq!(terms.len(), 2);
        assert!(!terms.contains(&iri("https://b.example/p")));
    }

    #[test]
    fn test_blank_nodes_and_literals_are_skipped() {
        let mut data = Dataset::new();
        data.insert(&Quad::new(
            BlankNode::default(),
            iri("https://a.example/p"),
            Literal::new_simple_literal("x"),
            GraphName::DefaultGraph,
        ));

        let terms = find_unlabeled_terms(&data, &NamespaceFilter::all(), label().as_ref());
        assert_eq!(terms.len(), 1);
        assert!(terms.contains(&iri("https://a.example/p")));
    }

    #[test]
    fn test_repeated_terms_are_deduplicated() {
        let data = dataset(&[
            ("https://a.example/s", "https://a.example/p", "https://a.example/o"),
            ("https://a.example/o", "https://a.example/p", "https://a.example/s"),
        ]);
        let terms = find_unlabeled_terms(&data, &NamespaceFilter::all(), label().as_ref());
        assert_eq!(terms.len(), 3);
    }

    #[test]
    fn test_empty_graph_yields_empty_set() {
        let terms = find_unlabeled_terms(&Dataset::new(), &NamespaceFilter::all(), label().as_ref());
        assert!(terms.is_empty());
    }

    #[test]
    fn test_works_on_plain_graph() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            iri("https://a.example/s"),
            label(),
            Literal::new_simple_literal("S"),
        ));
        graph.insert(&Triple::new(
            iri("https://a.example/s"),
            iri("https://a.example/p"),
            iri("https://a.example/o"),
        ));

        let filter = NamespaceFilter::new(["https://a.example/"]);
        let terms = find_unlabeled_terms(&graph, &filter, label().as_ref());

        assert_eq!(
            terms.into_iter().collect::<Vec<_>>(),
            vec![iri("https://a.example/o"), iri("https://a.example/p")]
        );
    }

    #[test]
    fn test_filter_from_config() {
        let many = vec!["https://a.example/".to_string()];

        let filter = NamespaceFilter::from_config(Some("https://b.example/"), &many);
        assert_eq!(filter.prefixes(), ["https://b.example/"]);

        let filter = NamespaceFilter::from_config(Some(""), &many);
        assert_eq!(filter.prefixes(), ["https://a.example/"]);

        let filter = NamespaceFilter::from_config(None, &[]);
        assert!(filter.is_empty());
        assert!(filter.matches("urn:anything"));
    }
}
