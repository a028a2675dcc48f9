//! Well-known IRIs.

/// `rdf:type`, written as `@type` in JSON-LD.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// `xsd:dateTime`.
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
/// `xsd:integer`.
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
/// `xsd:double`.
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
/// `xsd:boolean`.
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

/// `schema:dateModified`, the default staleness predicate.
pub const SCHEMA_DATE_MODIFIED: &str = "http://schema.org/dateModified";

/// Predicates the repository manages itself. Writing them back would either
/// be rejected or clobber server-managed state.
pub const REPOSITORY_MANAGED: &[&str] = &[
    "http://fedora.info/definitions/v4/repository#created",
    "http://fedora.info/definitions/v4/repository#createdBy",
    "http://fedora.info/definitions/v4/repository#lastModified",
    "http://fedora.info/definitions/v4/repository#lastModifiedBy",
    "http://fedora.info/definitions/v4/repository#hasParent",
    "http://fedora.info/definitions/v4/repository#writable",
    "http://www.w3.org/ns/ldp#contains",
    "http://www.w3.org/ns/auth/acl#accessControl",
];
