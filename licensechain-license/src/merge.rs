//! Strict-narrowing fold of grants along a chain.
//!
//! Each delegatee may only narrow what its parent granted:
//!
//! | parent      | child       | result                  |
//! |-------------|-------------|-------------------------|
//! | `Unbounded` | any         | child                   |
//! | any         | `Unbounded` | parent                  |
//! | `Number(a)` | `Number(b)` | `Number(min(a, b))`     |
//! | `Flag(a)`   | `Flag(b)`   | `Flag(a && b)`          |
//! | `Map`       | `Map`       | per key, see below      |
//! | otherwise   |             | `GrantConflict`         |
//!
//! Keys only the parent has are dropped. Keys only the child has are a
//! conflict.

use crate::chain::Chain;
use crate::error::{LicenseError, LicenseResult};
use crate::grant::{Grant, GrantValue};
use std::collections::BTreeMap;

/// Merges the grants of a resolved chain, root first.
pub fn merge(chain: &Chain<'_>) -> LicenseResult<Grant> {
    merge_grants(chain.licenses().map(|l| l.license().grant()))
}

/// Folds grants in order, each narrowing the result so far.
///
/// An empty sequence yields the empty grant.
pub fn merge_grants<'g>(grants: impl IntoIterator<Item = &'g Grant>) -> LicenseResult<Grant> {
    let mut grants = grants.into_iter();
    let Some(first) = grants.next() else {
        return Ok(Grant::new());
    };
    grants.try_fold(first.clone(), |acc, next| narrow(&acc, next))
}

/// Narrows `parent` by `child`.
///
/// # Errors
///
/// [`LicenseError::GrantConflict`] naming the dotted path of the first
/// feature the child tries to widen or retype.
pub fn narrow(parent: &Grant, child: &Grant) -> LicenseResult<Grant> {
    let mut path = Vec::new();
    narrow_value(parent.as_value(), child.as_value(), &mut path).map(Grant::from_root)
}

fn narrow_value(
    parent: &GrantValue,
    child: &GrantValue,
    path: &mut Vec<String>,
) -> LicenseResult<GrantValue> {
    match (parent, child) {
        (GrantValue::Unbounded, c) => Ok(c.clone()),
        (p, GrantValue::Unbounded) => Ok(p.clone()),
        (GrantValue::Number(a), GrantValue::Number(b)) => Ok(GrantValue::Number(*a.min(b))),
        (GrantValue::Flag(a), GrantValue::Flag(b)) => Ok(GrantValue::Flag(*a && *b)),
        (GrantValue::Map(p), GrantValue::Map(c)) => {
            let mut merged = BTreeMap::new();
            for (key, child_value) in c {
                path.push(key.clone());
                let Some(parent_value) = p.get(key) else {
                    return Err(conflict(path, "not granted by the parent license".to_string()));
                };
                merged.insert(key.clone(), narrow_value(parent_value, child_value, path)?);
                path.pop();
            }
            Ok(GrantValue::Map(merged))
        }
        (p, c) => Err(conflict(
            path,
            format!("{} cannot narrow a {} grant", c.kind(), p.kind()),
        )),
    }
}

fn conflict(path: &[String], reason: String) -> LicenseError {
    let feature = if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    };
    LicenseError::GrantConflict { feature, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(json: serde_json::Value) -> Grant {
        Grant::from_json(json).unwrap()
    }

    #[test]
    fn conflict_path_is_dotted() {
        let parent = grant(serde_json::json!({"limits": {"hz": 10}}));
        let child = grant(serde_json::json!({"limits": {"hz": true}}));
        match narrow(&parent, &child) {
            Err(LicenseError::GrantConflict { feature, .. }) => assert_eq!(feature, "limits.hz"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn unbounded_root_adopts_child() {
        let child = grant(serde_json::json!({"seats": 3}));
        assert_eq!(narrow(&Grant::unbounded(), &child).unwrap(), child);
    }

    #[test]
    fn empty_fold_is_empty_grant() {
        assert_eq!(merge_grants(std::iter::empty::<&Grant>()).unwrap(), Grant::new());
    }
}
