//! Property-based test generators using proptest.

use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for generating valid entity identifiers.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    any::<u128>().prop_map(|n| Uuid::from_u128(n).to_string())
}

/// Strategy for generating identifiers with arbitrary letter case.
pub fn mixed_case_identifier_strategy() -> impl Strategy<Value = String> {
    (identifier_strategy(), any::<bool>()).prop_map(|(id, upper)| {
        if upper {
            id.to_ascii_uppercase()
        } else {
            id
        }
    })
}

/// Strategy for generating RFC 3339 timestamps between 2000 and 2100.
pub fn timestamp_strategy() -> impl Strategy<Value = String> {
    (2000u32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", y, mo, d, h, mi, s),
    )
}

/// Strategy for generating entity titles.
pub fn title_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,31}").expect("Invalid regex")
}

/// Strategy for generating file contents.
pub fn file_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..512)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to generate.
    pub cases: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self { cases: 64 }
    }
}

impl PropTestConfig {
    /// Creates a proptest config.
    pub fn to_proptest_config(&self) -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: self.cases,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn identifiers_parse(id in identifier_strategy()) {
            prop_assert!(Uuid::parse_str(&id).is_ok());
        }

        #[test]
        fn timestamps_parse(ts in timestamp_strategy()) {
            prop_assert!(ldpsync_protocol::ModifiedMarker::parse(&ts).is_ok());
        }
    }
}
