//! Expanded JSON-LD reading and writing.
//!
//! Only the expanded form is handled: a node array, a `@graph` object, or a
//! single node object, with full IRIs as property keys. `@context` is
//! ignored.

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::term::{Literal, Term};
use crate::vocab;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Media type for JSON-LD documents.
pub const JSONLD_CONTENT_TYPE: &str = "application/ld+json";

/// Parses a JSON-LD document from bytes.
pub fn parse_jsonld(bytes: &[u8]) -> GraphResult<Graph> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_json(&value)
}

/// Builds a graph from a parsed JSON-LD value.
pub fn from_json(value: &Value) -> GraphResult<Graph> {
    let mut reader = Reader::default();
    match value {
        Value::Array(nodes) => {
            for node in nodes {
                reader.node(node)?;
            }
        }
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(nodes)) => {
                for node in nodes {
                    reader.node(node)?;
                }
            }
            Some(node @ Value::Object(_)) => {
                reader.node(node)?;
            }
            Some(_) => {
                return Err(GraphError::InvalidStructure(
                    "@graph must be an array or object".into(),
                ))
            }
            None => {
                reader.node(value)?;
            }
        },
        _ => {
            return Err(GraphError::InvalidStructure(
                "expected a JSON-LD array or object".into(),
            ))
        }
    }
    Ok(reader.graph)
}

/// Serializes a graph as an expanded JSON-LD node array.
pub fn to_json(graph: &Graph) -> Value {
    let mut nodes = Vec::new();
    for subject in graph.subjects() {
        let mut node = Map::new();
        node.insert("@id".into(), Value::String(subject.to_string()));
        for (predicate, values) in graph.properties(subject) {
            if predicate == vocab::RDF_TYPE {
                let types: Vec<Value> = values
                    .iter()
                    .filter_map(Term::as_iri)
                    .map(|t| Value::String(t.to_string()))
                    .collect();
                node.insert("@type".into(), Value::Array(types));
            } else {
                let values: Vec<Value> = values.iter().map(term_to_json).collect();
                node.insert(predicate.to_string(), Value::Array(values));
            }
        }
        nodes.push(Value::Object(node));
    }
    Value::Array(nodes)
}

/// Serializes a graph to JSON-LD bytes.
pub fn to_jsonld_bytes(graph: &Graph) -> GraphResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(&to_json(graph))?))
}

fn term_to_json(term: &Term) -> Value {
    let mut object = Map::new();
    match term {
        Term::Iri(iri) => {
            object.insert("@id".into(), Value::String(iri.clone()));
        }
        Term::Literal(lit) => {
            object.insert("@value".into(), Value::String(lit.lexical.clone()));
            if let Some(dt) = &lit.datatype {
                object.insert("@type".into(), Value::String(dt.clone()));
            }
            if let Some(lang) = &lit.language {
                object.insert("@language".into(), Value::String(lang.clone()));
            }
        }
    }
    Value::Object(object)
}

/// Document blank-node labels are relabelled into the same counter space as
/// anonymous nodes, so the two can never share a subject.
#[derive(Default)]
struct Reader {
    graph: Graph,
    blank_counter: usize,
    blank_labels: HashMap<String, String>,
}

impl Reader {
    /// Reads one node object and returns its subject.
    fn node(&mut self, value: &Value) -> GraphResult<String> {
        let map = value
            .as_object()
            .ok_or_else(|| GraphError::InvalidStructure("node must be an object".into()))?;

        let subject = match map.get("@id") {
            Some(Value::String(id)) => self.identifier(id),
            Some(_) => return Err(GraphError::InvalidStructure("@id must be a string".into())),
            None => self.blank(),
        };
        self.graph.ensure_subject(subject.clone());

        for (key, value) in map {
            match key.as_str() {
                "@type" => {
                    for ty in string_list(value)? {
                        self.graph
                            .insert(subject.clone(), vocab::RDF_TYPE, Term::Iri(ty));
                    }
                }
                k if k.starts_with('@') => {}
                predicate => self.values(&subject, predicate, value)?,
            }
        }
        Ok(subject)
    }

    fn values(&mut self, subject: &str, predicate: &str, value: &Value) -> GraphResult<()> {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    self.values(subject, predicate, item)?;
                }
            }
            Value::Object(map) if map.contains_key("@value") => {
                if let Some(literal) = literal_from_object(map)? {
                    self.graph
                        .insert(subject, predicate, Term::Literal(literal));
                }
            }
            Value::Object(map) if map.contains_key("@list") || map.contains_key("@set") => {
                let items = map
                    .get("@list")
                    .or_else(|| map.get("@set"))
                    .unwrap_or(&Value::Null);
                self.values(subject, predicate, items)?;
            }
            Value::Object(map) => {
                let object = if map.len() == 1 && map.contains_key("@id") {
                    match map.get("@id") {
                        Some(Value::String(id)) => self.identifier(id),
                        _ => {
                            return Err(GraphError::InvalidStructure(
                                "@id must be a string".into(),
                            ))
                        }
                    }
                } else {
                    self.node(value)?
                };
                self.graph.insert(subject, predicate, Term::Iri(object));
            }
            scalar => {
                if let Some(literal) = literal_from_scalar(scalar, None) {
                    self.graph
                        .insert(subject, predicate, Term::Literal(literal));
                }
            }
        }
        Ok(())
    }

    fn identifier(&mut self, id: &str) -> String {
        if !id.starts_with("_:") {
            return id.to_string();
        }
        if let Some(label) = self.blank_labels.get(id) {
            return label.clone();
        }
        let label = self.blank();
        self.blank_labels.insert(id.to_string(), label.clone());
        label
    }

    fn blank(&mut self) -> String {
        self.blank_counter += 1;
        format!("_:b{}", self.blank_counter)
    }
}

fn literal_from_object(map: &Map<String, Value>) -> GraphResult<Option<Literal>> {
    let datatype = match map.get("@type") {
        Some(Value::String(dt)) => Some(dt.clone()),
        Some(_) => {
            return Err(GraphError::InvalidStructure(
                "literal @type must be a string".into(),
            ))
        }
        None => None,
    };
    let mut literal = match map.get("@value") {
        Some(value) => literal_from_scalar(value, datatype),
        None => None,
    };
    if let (Some(lit), Some(Value::String(lang))) = (literal.as_mut(), map.get("@language")) {
        lit.language = Some(lang.clone());
    }
    Ok(literal)
}

fn literal_from_scalar(value: &Value, datatype: Option<String>) -> Option<Literal> {
    let (lexical, implied) = match value {
        Value::String(s) => (s.clone(), None),
        Value::Bool(b) => (b.to_string(), Some(vocab::XSD_BOOLEAN)),
        Value::Number(n) if n.is_i64() || n.is_u64() => (n.to_string(), Some(vocab::XSD_INTEGER)),
        Value::Number(n) => (n.to_string(), Some(vocab::XSD_DOUBLE)),
        _ => return None,
    };
    Some(Literal {
        lexical,
        datatype: datatype.or_else(|| implied.map(str::to_string)),
        language: None,
    })
}

fn string_list(value: &Value) -> GraphResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    GraphError::InvalidStructure("@type entries must be strings".into())
                })
            })
            .collect(),
        _ => Err(GraphError::InvalidStructure(
            "@type must be a string or array".into(),
        )),
    }
}
