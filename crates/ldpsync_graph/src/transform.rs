//! CMS graph → repository payload.

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::jsonld::{to_jsonld_bytes, JSONLD_CONTENT_TYPE};
use crate::term::Term;
use crate::vocab;
use bytes::Bytes;
use ldpsync_protocol::ModifiedMarker;
use std::collections::BTreeSet;
use tracing::trace;

/// Options for [`MetadataTransformer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Predicates removed from every node before writing.
    pub exclude_predicates: Vec<String>,
    /// Strip the `_format` query parameter the CMS appends for content negotiation.
    pub strip_jsonld_suffix: bool,
    /// Predicate carrying the modified marker.
    pub modified_predicate: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            exclude_predicates: vocab::REPOSITORY_MANAGED
                .iter()
                .map(|p| p.to_string())
                .collect(),
            strip_jsonld_suffix: true,
            modified_predicate: vocab::SCHEMA_DATE_MODIFIED.to_string(),
        }
    }
}

/// The write body produced for the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryPayload {
    /// Transformed graph.
    pub graph: Graph,
    /// Serialized graph.
    pub body: Bytes,
    /// Media type of `body`.
    pub content_type: &'static str,
}

/// Converts a CMS entity graph into the triples the repository should store.
///
/// Deterministic and free of I/O.
#[derive(Debug, Clone, Default)]
pub struct MetadataTransformer {
    options: TransformOptions,
}

impl MetadataTransformer {
    /// Creates a transformer.
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Normalizes a CMS URI the same way `transform` does.
    pub fn normalize(&self, uri: &str) -> String {
        if self.options.strip_jsonld_suffix {
            strip_format_suffix(uri)
        } else {
            uri.to_string()
        }
    }

    /// Builds the repository payload.
    ///
    /// Every occurrence of `cms_subject` (and of its `#fragment` children) is
    /// rewritten to `target_subject`. Only the target, its fragments and the
    /// blank nodes reachable from them are kept; the repository refuses
    /// statements about other resources.
    pub fn transform(
        &self,
        graph: &Graph,
        cms_subject: &str,
        target_subject: &str,
    ) -> GraphResult<RepositoryPayload> {
        let source = self.normalize(cms_subject);
        let fragment_prefix = format!("{}#", source);

        let mut out = graph.clone();
        out.map_iris(|iri| {
            let iri = self.normalize(iri);
            if iri == source {
                target_subject.to_string()
            } else if let Some(fragment) = iri.strip_prefix(&fragment_prefix) {
                format!("{}#{}", target_subject, fragment)
            } else {
                iri
            }
        });

        if !out.contains_subject(target_subject) {
            return Err(GraphError::SubjectNotFound {
                subject: cms_subject.to_string(),
            });
        }

        for predicate in &self.options.exclude_predicates {
            let removed = out.remove_predicate(predicate);
            if removed > 0 {
                trace!(predicate = %predicate, removed, "stripped repository-managed triples");
            }
        }

        let target_fragments = format!("{}#", target_subject);
        let owned = |s: &str| s == target_subject || s.starts_with(&target_fragments);
        let blanks = reachable_blank_nodes(&out, owned);
        out.retain_subjects(|s| owned(s) || blanks.contains(s));

        // The marker must still parse after the rewrite.
        modified_marker(&out, target_subject, &self.options.modified_predicate)?;
        let body = to_jsonld_bytes(&out)?;

        Ok(RepositoryPayload {
            graph: out,
            body,
            content_type: JSONLD_CONTENT_TYPE,
        })
    }
}

/// Blank nodes referenced, directly or through other blank nodes, by a
/// subject accepted by `root`.
fn reachable_blank_nodes(graph: &Graph, root: impl Fn(&str) -> bool) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut pending: Vec<String> = graph
        .subjects()
        .filter(|s| root(s))
        .map(str::to_string)
        .collect();
    while let Some(subject) = pending.pop() {
        for (_, values) in graph.properties(&subject) {
            for blank in values
                .iter()
                .filter_map(Term::as_iri)
                .filter(|iri| iri.starts_with("_:"))
            {
                if seen.insert(blank.to_string()) {
                    pending.push(blank.to_string());
                }
            }
        }
    }
    seen
}

/// Reads the modified marker of `subject`.
///
/// Returns `Ok(None)` when the predicate is absent, so callers can treat the
/// marker as unknown. When several values are present the newest wins.
pub fn modified_marker(
    graph: &Graph,
    subject: &str,
    predicate: &str,
) -> GraphResult<Option<ModifiedMarker>> {
    let mut newest: Option<ModifiedMarker> = None;
    for value in graph.predicate_values(subject, predicate) {
        let Term::Literal(literal) = value else {
            return Err(GraphError::MalformedLiteral {
                predicate: predicate.to_string(),
                value: value.to_string(),
            });
        };
        let marker =
            ModifiedMarker::parse(&literal.lexical).map_err(|_| GraphError::MalformedLiteral {
                predicate: predicate.to_string(),
                value: literal.lexical.clone(),
            })?;
        newest = Some(newest.map_or(marker, |n| n.max(marker)));
    }
    Ok(newest)
}

/// Removes the `_format` query parameter from a URI.
///
/// `http://cms/node/1?_format=jsonld` becomes `http://cms/node/1`; other
/// query parameters and the fragment are preserved.
pub fn strip_format_suffix(uri: &str) -> String {
    let (without_fragment, fragment) = match uri.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (uri, None),
    };
    let Some((path, query)) = without_fragment.split_once('?') else {
        return uri.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|param| {
            let key = param.split('=').next().unwrap_or("");
            !param.is_empty() && key != "_format"
        })
        .collect();

    let mut out = path.to_string();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Literal;

    const CMS: &str = "http://cms/node/1?_format=jsonld";
    const TARGET: &str = "http://repo/rest/ab/cd/ef/01/abcdef01";

    fn cms_graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(CMS, "http://purl.org/dc/terms/title", Term::literal("A title"));
        graph.insert(
            CMS,
            vocab::SCHEMA_DATE_MODIFIED,
            Term::Literal(Literal::typed("2024-05-01T10:00:00+00:00", vocab::XSD_DATE_TIME)),
        );
        graph.insert(CMS, "http://schema.org/hasPart", Term::iri("http://cms/node/1#part"));
        graph.insert(
            CMS,
            "http://fedora.info/definitions/v4/repository#lastModified",
            Term::literal("x"),
        );
        graph.insert("http://cms/node/1#part", "http://p", Term::literal("part"));
        graph.insert("http://cms/user/7", "http://xmlns.com/foaf/0.1/name", Term::literal("u"));
        graph
    }

    #[test]
    fn rewrites_subject_and_fragments() {
        let transformer = MetadataTransformer::default();
        let payload = transformer.transform(&cms_graph(), CMS, TARGET).unwrap();

        assert!(payload.graph.contains_subject(TARGET));
        assert!(payload.graph.contains_subject(&format!("{}#part", TARGET)));
        assert_eq!(
            payload.graph.first_value(TARGET, "http://schema.org/hasPart"),
            Some(&Term::iri(format!("{}#part", TARGET)))
        );
        assert!(!payload.graph.contains_subject("http://cms/user/7"));
    }

    #[test]
    fn strips_excluded_predicates() {
        let transformer = MetadataTransformer::default();
        let payload = transformer.transform(&cms_graph(), CMS, TARGET).unwrap();
        assert!(payload
            .graph
            .predicate_values(TARGET, "http://fedora.info/definitions/v4/repository#lastModified")
            .is_empty());
    }

    #[test]
    fn keeps_marker() {
        let transformer = MetadataTransformer::default();
        let payload = transformer.transform(&cms_graph(), CMS, TARGET).unwrap();
        assert_eq!(
            modified_marker(&payload.graph, TARGET, vocab::SCHEMA_DATE_MODIFIED).unwrap(),
            Some(ModifiedMarker::parse("2024-05-01T10:00:00Z").unwrap())
        );
        assert_eq!(payload.content_type, JSONLD_CONTENT_TYPE);
    }

    #[test]
    fn missing_marker_is_allowed() {
        let mut graph = Graph::new();
        graph.insert(CMS, "http://p", Term::literal("v"));
        let payload = MetadataTransformer::default()
            .transform(&graph, CMS, TARGET)
            .unwrap();
        assert_eq!(
            modified_marker(&payload.graph, TARGET, vocab::SCHEMA_DATE_MODIFIED).unwrap(),
            None
        );
    }

    #[test]
    fn keeps_only_blank_nodes_owned_by_the_target() {
        let mut graph = cms_graph();
        graph.insert(CMS, "http://schema.org/spatial", Term::iri("_:place"));
        graph.insert("_:place", "http://schema.org/geo", Term::iri("_:geo"));
        graph.insert("_:geo", "http://schema.org/latitude", Term::literal("52.1"));
        graph.insert("http://cms/user/7", "http://schema.org/address", Term::iri("_:addr"));
        graph.insert("_:addr", "http://schema.org/streetAddress", Term::literal("1 Private Lane"));

        let payload = MetadataTransformer::default()
            .transform(&graph, CMS, TARGET)
            .unwrap();
        assert!(payload.graph.contains_subject("_:place"));
        assert!(payload.graph.contains_subject("_:geo"));
        assert!(!payload.graph.contains_subject("_:addr"));
        assert!(!payload.graph.contains_subject("http://cms/user/7"));
    }

    #[test]
    fn unparseable_marker_is_an_error() {
        let mut graph = Graph::new();
        graph.insert(CMS, vocab::SCHEMA_DATE_MODIFIED, Term::literal("last tuesday"));
        let err = MetadataTransformer::default()
            .transform(&graph, CMS, TARGET)
            .unwrap_err();
        assert!(matches!(err, GraphError::MalformedLiteral { .. }));
    }

    #[test]
    fn missing_subject_is_an_error() {
        let mut graph = Graph::new();
        graph.insert("http://elsewhere", "http://p", Term::literal("v"));
        let err = MetadataTransformer::default()
            .transform(&graph, CMS, TARGET)
            .unwrap_err();
        assert!(matches!(err, GraphError::SubjectNotFound { .. }));
    }

    #[test]
    fn suffix_kept_when_disabled() {
        let options = TransformOptions {
            strip_jsonld_suffix: false,
            ..TransformOptions::default()
        };
        let mut graph = Graph::new();
        graph.insert("http://cms/node/1", "http://p", Term::literal("v"));
        // Without stripping, the suffixed locator does not name the node.
        let err = MetadataTransformer::new(options)
            .transform(&graph, CMS, TARGET)
            .unwrap_err();
        assert!(matches!(err, GraphError::SubjectNotFound { .. }));
    }

    #[test]
    fn newest_marker_wins() {
        let mut graph = Graph::new();
        graph.insert("s", "m", Term::literal("2024-01-01T00:00:00Z"));
        graph.insert("s", "m", Term::literal("2024-06-01T00:00:00Z"));
        let marker = modified_marker(&graph, "s", "m").unwrap().unwrap();
        assert_eq!(marker, ModifiedMarker::parse("2024-06-01T00:00:00Z").unwrap());
    }

    #[test]
    fn format_suffix_stripping() {
        assert_eq!(strip_format_suffix("http://x/n/1?_format=jsonld"), "http://x/n/1");
        assert_eq!(
            strip_format_suffix("http://x/n/1?a=1&_format=jsonld#f"),
            "http://x/n/1?a=1#f"
        );
        assert_eq!(strip_format_suffix("http://x/n/1"), "http://x/n/1");
    }

    #[test]
    fn transform_is_deterministic() {
        let transformer = MetadataTransformer::default();
        let a = transformer.transform(&cms_graph(), CMS, TARGET).unwrap();
        let b = transformer.transform(&cms_graph(), CMS, TARGET).unwrap();
        assert_eq!(a.body, b.body);
    }
}
