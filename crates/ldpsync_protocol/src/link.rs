//! `Link` header parsing (RFC 8288).

/// One parsed link: a target URI, its relation type and any extra parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    /// Target URI.
    pub target: String,
    /// Relation type, e.g. `describedby`.
    pub rel: String,
    /// Remaining parameters in header order.
    pub params: Vec<(String, String)>,
}

impl LinkRelation {
    /// Returns the value of a parameter other than `rel`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// All links advertised by one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    links: Vec<LinkRelation>,
}

impl LinkRelations {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `Link` header value of a response.
    ///
    /// Malformed entries are skipped rather than rejected: a missing relation
    /// is handled by whoever needed it.
    pub fn parse<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut links = Vec::new();
        for header in headers {
            parse_header(header, &mut links);
        }
        Self { links }
    }

    /// Adds a link.
    pub fn push(&mut self, target: impl Into<String>, rel: impl Into<String>) {
        self.links.push(LinkRelation {
            target: target.into(),
            rel: rel.into(),
            params: Vec::new(),
        });
    }

    /// First target with the given relation type.
    pub fn find(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.eq_ignore_ascii_case(rel))
            .map(|l| l.target.as_str())
    }

    /// Returns true if a link with this relation points at `target`.
    pub fn has(&self, rel: &str, target: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.rel.eq_ignore_ascii_case(rel) && l.target == target)
    }

    /// Iterates over all links.
    pub fn iter(&self) -> impl Iterator<Item = &LinkRelation> {
        self.links.iter()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no links were advertised.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn parse_header(header: &str, out: &mut Vec<LinkRelation>) {
    let mut rest = header.trim();
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            return;
        };
        let target = after[..end].trim().to_string();
        let (params_str, tail) = split_params(&after[end + 1..]);
        rest = tail;

        let mut rels = Vec::new();
        let mut params = Vec::new();
        for param in split_unquoted(params_str, ';') {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if name == "rel" {
                rels.extend(value.split_whitespace().map(str::to_string));
            } else {
                params.push((name, value));
            }
        }

        for rel in rels {
            out.push(LinkRelation {
                target: target.clone(),
                rel,
                params: params.clone(),
            });
        }
    }
}

/// Splits the parameters of one link from the links that follow it.
fn split_params(s: &str) -> (&str, &str) {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return (&s[..i], &s[i + 1..]),
            _ => {}
        }
    }
    (s, "")
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == sep && !quoted {
            parts.push(&s[last..i]);
            last = i + 1;
        }
    }
    parts.push(&s[last..]);
    parts
}
