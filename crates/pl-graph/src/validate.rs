//! Registration validation.

use std::collections::HashSet;

use pl_core::{PlError, PlResult, PortKind};
use tracing::debug;

use crate::config::DuplicateNamePolicy;

/// Check the names registered for one port kind against `policy`.
///
/// Under `Overwrite` duplicates are allowed and only logged.
pub(crate) fn validate_names<'a>(
    kind: PortKind,
    names: impl IntoIterator<Item = &'a str>,
    policy: DuplicateNamePolicy,
) -> PlResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for name in names {
        if seen.insert(name) {
            continue;
        }
        match policy {
            DuplicateNamePolicy::Reject => {
                return Err(PlError::DuplicatePortName {
                    kind,
                    name: name.to_string(),
                });
            }
            DuplicateNamePolicy::Overwrite => {
                debug!(%kind, name, "duplicate port name; later registration wins");
            }
        }
    }
    Ok(())
}
