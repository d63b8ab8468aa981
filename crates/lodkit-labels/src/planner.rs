//! Batch planning and query rendering.

use oxrdf::{NamedNode, NamedNodeRef};
use tracing::debug;

use lodkit_core::{defaults, Error, Result};

use crate::classifier::TermSet;

/// A contiguous slice of the term set, queried together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in the plan.
    pub index: usize,
    /// Terms in this batch, in term-set order.
    pub terms: Vec<NamedNode>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether `node` belongs to this batch.
    pub fn contains(&self, node: NamedNodeRef<'_>) -> bool {
        self.terms.iter().any(|term| term.as_ref() == node)
    }
}

/// Split `terms` into batches of at most `batch_size`.
///
/// A `batch_size` of zero falls back to the default. Every term lands in
/// exactly one batch, batch order follows term-set order, and only the last
/// batch may be short. An empty term set yields no batches.
pub fn plan(terms: TermSet, batch_size: usize) -> Vec<Batch> {
    let size = if batch_size == 0 {
        debug!(
            default = defaults::LABEL_CHUNK_SIZE,
            "Batch size of zero, using default"
        );
        defaults::LABEL_CHUNK_SIZE
    } else {
        batch_size
    };

    let mut batches = Vec::with_capacity(terms.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);

    for term in terms {
        current.push(term);
        if current.len() == size {
            batches.push(Batch {
                index: batches.len(),
                terms: std::mem::replace(&mut current, Vec::with_capacity(size)),
            });
        }
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            terms: current,
        });
    }

    batches
}

/// Label query text with placeholders.
///
/// `{{iris}}` is replaced by the batch terms as space-separated `<iri>`
/// tokens. `{{label}}` is replaced by the bare label predicate IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
    label: NamedNode,
}

impl QueryTemplate {
    /// Create a template. The text must contain the `{{iris}}` placeholder.
    pub fn new(text: impl Into<String>, label: NamedNode) -> Result<Self> {
        let text = text.into();
        if !text.contains(defaults::TEMPLATE_IRIS_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "Query template is missing the {} placeholder",
                defaults::TEMPLATE_IRIS_PLACEHOLDER
            )));
        }
        Ok(Self { text, label })
    }

    /// The built-in CONSTRUCT template for `label`.
    pub fn default_for(label: NamedNode) -> Self {
        Self {
            text: defaults::LABEL_QUERY_TEMPLATE.to_string(),
            label,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render the query for one batch.
    pub fn render(&self, batch: &Batch) -> String {
        let iris = batch
            .terms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        self.text
            .replace(defaults::TEMPLATE_LABEL_PLACEHOLDER, self.label.as_str())
            .replace(defaults::TEMPLATE_IRIS_PLACEHOLDER, &iris)
    }
}
