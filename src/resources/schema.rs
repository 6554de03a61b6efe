//! Static schema of child collections per resource type.
//!
//! The API exposes a fixed resource hierarchy; this map records which child
//! collection names each resource type may expose. It is consulted to
//! distinguish "unknown field" from "legal but not yet fetched child
//! collection" and to synthesize attribute listings. Pure data, initialized
//! at compile time, never mutated.

/// Returns the ordered set of legal child-collection names for a resource
/// type.
///
/// Unknown and leaf types yield the empty set.
///
/// # Example
///
/// ```rust
/// use aweber_api::resources::schema::children_of;
///
/// assert!(children_of("list").contains(&"subscribers"));
/// assert!(children_of("web_form").is_empty());
/// assert!(children_of("no_such_type").is_empty());
/// ```
#[must_use]
pub fn children_of(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "account" => &["lists", "integrations"],
        "broadcast_campaign" | "followup_campaign" => &["links", "messages", "stats"],
        "link" => &["clicks"],
        "list" => &[
            "campaigns",
            "custom_fields",
            "subscribers",
            "web_forms",
            "web_form_split_tests",
        ],
        "web_form_split_test" => &["components"],
        _ => &[],
    }
}

/// Returns `true` if `name` is a legal child collection of `resource_type`.
#[must_use]
pub fn is_child_of(resource_type: &str, name: &str) -> bool {
    children_of(resource_type).contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_children() {
        assert_eq!(children_of("account"), &["lists", "integrations"]);
    }

    #[test]
    fn test_campaign_types_share_children() {
        assert_eq!(
            children_of("broadcast_campaign"),
            children_of("followup_campaign")
        );
        assert_eq!(children_of("broadcast_campaign"), &["links", "messages", "stats"]);
    }

    #[test]
    fn test_list_children_are_ordered() {
        assert_eq!(
            children_of("list"),
            &[
                "campaigns",
                "custom_fields",
                "subscribers",
                "web_forms",
                "web_form_split_tests"
            ]
        );
    }

    #[test]
    fn test_leaf_and_unknown_types_have_no_children() {
        assert!(children_of("web_form").is_empty());
        assert!(children_of("subscriber").is_empty());
        assert!(children_of("bogus").is_empty());
    }

    #[test]
    fn test_is_child_of() {
        assert!(is_child_of("list", "subscribers"));
        assert!(!is_child_of("list", "integrations"));
        assert!(!is_child_of("subscriber", "subscribers"));
    }
}
