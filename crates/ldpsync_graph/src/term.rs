//! RDF terms.

use std::fmt;

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// Lexical form.
    pub lexical: String,
    /// Datatype IRI, if typed.
    pub datatype: Option<String>,
    /// Language tag, if language-tagged.
    pub language: Option<String>,
}

impl Literal {
    /// A plain string literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// A language-tagged literal.
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// The object position of a triple: either a resource or a literal value.
///
/// Blank nodes are kept as IRIs with a `_:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A resource reference.
    Iri(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Shorthand for an IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Shorthand for a plain literal term.
    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(lexical))
    }

    /// The IRI, if this is a resource reference.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    /// The literal, if this is a value.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Iri(_) => None,
            Term::Literal(lit) => Some(lit),
        }
    }

    /// IRI or lexical form.
    pub fn as_str(&self) -> &str {
        match self {
            Term::Iri(iri) => iri,
            Term::Literal(lit) => &lit.lexical,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(Literal {
                lexical,
                datatype: Some(dt),
                ..
            }) => write!(f, "{:?}^^<{}>", lexical, dt),
            Term::Literal(Literal {
                lexical,
                language: Some(lang),
                ..
            }) => write!(f, "{:?}@{}", lexical, lang),
            Term::Literal(lit) => write!(f, "{:?}", lit.lexical),
        }
    }
}
