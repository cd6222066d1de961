//! Greedy grouping of entries into runs.

use crate::asset::AssetKind;
use crate::manifest::Entry;

/// Split `entries` into maximal runs and flush each one in order.
///
/// An entry joins the current run when it is mergeable with the run's first
/// entry; otherwise the run is flushed and a new one starts. `flush` may
/// produce no entry for a run.
pub fn group_runs<E, F>(kind: AssetKind, entries: &[Entry], mut flush: F) -> Result<Vec<Entry>, E>
where
    F: FnMut(&[Entry]) -> Result<Option<Entry>, E>,
{
    let mut result = Vec::new();
    let mut run: Vec<Entry> = Vec::new();

    for entry in entries {
        if let Some(head) = run.first()
            && !kind.mergeable(entry, head)
        {
            result.extend(flush(&run)?);
            run.clear();
        }
        run.push(entry.clone());
    }

    if !run.is_empty() {
        result.extend(flush(&run)?);
    }
    Ok(result)
}
