//! Helpers for fully qualified Resource Manager ids
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}
//! ```

/// Index of the resource group after splitting an id on `/`.
///
/// The leading slash produces an empty first segment.
const RESOURCE_GROUP_SEGMENT: usize = 4;

/// Resource group of a resource id, if the id has one.
pub fn resource_group(id: &str) -> Option<&str> {
    id.split('/')
        .nth(RESOURCE_GROUP_SEGMENT)
        .filter(|segment| !segment.is_empty())
}

/// Name of the resource, i.e. the last path segment.
pub fn resource_name(id: &str) -> Option<&str> {
    id.rsplit('/').next().filter(|segment| !segment.is_empty())
}
