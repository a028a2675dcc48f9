//! JSON-LD fixtures and well-known test addresses.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Root of the fake CMS.
pub const CMS_BASE: &str = "http://cms.test";
/// Root of the fake repository.
pub const REPOSITORY_BASE: &str = "http://repo.test/rest";
/// Default modified predicate.
pub const DATE_MODIFIED: &str = "http://schema.org/dateModified";
/// Dublin Core title.
pub const DC_TITLE: &str = "http://purl.org/dc/terms/title";

/// An earlier timestamp.
pub const T1: &str = "2024-05-01T10:00:00+00:00";
/// A later timestamp.
pub const T2: &str = "2024-05-02T10:00:00+00:00";
/// The latest timestamp.
pub const T3: &str = "2024-05-03T10:00:00+00:00";

/// A fresh random identifier.
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// A deterministic identifier for test `n`.
pub fn fixed_identifier(n: u128) -> String {
    Uuid::from_u128(0x0a1b_2c3d_0000_4000_8000_0000_0000_0000 | n).to_string()
}

/// CMS URL of node `n`.
pub fn node_url(n: u32) -> String {
    format!("{}/node/{}", CMS_BASE, n)
}

/// CMS URL of media `n`.
pub fn media_url(n: u32) -> String {
    format!("{}/media/{}", CMS_BASE, n)
}

/// CMS URL of file `name`.
pub fn file_url(name: &str) -> String {
    format!("{}/files/{}", CMS_BASE, name)
}

/// The JSON-LD request locator for an entity URL.
pub fn jsonld_locator(url: &str) -> String {
    format!("{}?_format=jsonld", url)
}

/// The pairtree URI the repository will hold for `identifier`.
pub fn pairtree_uri(identifier: &str) -> String {
    let lower = identifier.to_ascii_lowercase();
    let hex: String = lower.chars().filter(|c| *c != '-').take(8).collect();
    format!(
        "{}/{}/{}/{}/{}/{}",
        REPOSITORY_BASE,
        &hex[0..2],
        &hex[2..4],
        &hex[4..6],
        &hex[6..8],
        lower
    )
}

/// A node entity in expanded JSON-LD, as the CMS serializes it.
pub fn node_jsonld(subject: &str, title: &str, modified: &str) -> Value {
    json!([
        {
            "@id": jsonld_locator(subject),
            "@type": ["http://pcdm.org/models#Object"],
            DC_TITLE: [{"@value": title}],
            DATE_MODIFIED: [{
                "@value": modified,
                "@type": "http://www.w3.org/2001/XMLSchema#dateTime"
            }],
            "http://schema.org/author": [{"@id": format!("{}/user/1", CMS_BASE)}]
        },
        {
            "@id": format!("{}/user/1", CMS_BASE),
            "http://xmlns.com/foaf/0.1/name": [{"@value": "admin"}]
        }
    ])
}

/// A media entity in expanded JSON-LD.
pub fn media_jsonld(subject: &str, title: &str, modified: &str) -> Value {
    json!([
        {
            "@id": jsonld_locator(subject),
            "@type": ["http://pcdm.org/use#OriginalFile"],
            DC_TITLE: [{"@value": title}],
            DATE_MODIFIED: [{
                "@value": modified,
                "@type": "http://www.w3.org/2001/XMLSchema#dateTime"
            }]
        }
    ])
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
