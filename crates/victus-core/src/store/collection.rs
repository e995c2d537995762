// ── Collection merge utility ──
//
// Pure, non-mutating operations over an ordered list keyed by id. Lists
// are shared as `Arc<Vec<T>>`; a no-op hands back the same `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::Identified;

/// Replace the entity with the same id in place, or append it.
///
/// Returns `list` unchanged when the entity has no id.
pub fn upsert<T: Identified + Clone>(list: &Arc<Vec<T>>, entity: T) -> Arc<Vec<T>> {
    if entity.id().is_empty() {
        return Arc::clone(list);
    }
    let mut next = Vec::clone(list);
    match next.iter().position(|e| e.id() == entity.id()) {
        Some(idx) => next[idx] = entity,
        None => next.push(entity),
    }
    Arc::new(next)
}

/// Drop every entity whose id matches.
///
/// Returns `list` unchanged when `id` is `None` or nothing matches.
pub fn remove_by_id<T: Identified + Clone>(list: &Arc<Vec<T>>, id: Option<&str>) -> Arc<Vec<T>> {
    match id {
        Some(id) => remove_where(list, |e| e.id() == id),
        None => Arc::clone(list),
    }
}

/// Drop every entity matching `pred`. Returns `list` unchanged when
/// nothing matches.
pub fn remove_where<T: Clone>(list: &Arc<Vec<T>>, pred: impl Fn(&T) -> bool) -> Arc<Vec<T>> {
    if !list.iter().any(&pred) {
        return Arc::clone(list);
    }
    Arc::new(list.iter().filter(|e| !pred(*e)).cloned().collect())
}

/// Build a list from a bulk listing with upsert semantics: records
/// without an id are skipped and a repeated id replaces the earlier entry.
pub fn from_records<T: Identified>(records: impl IntoIterator<Item = T>) -> Arc<Vec<T>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::new();
    for record in records {
        if record.id().is_empty() {
            continue;
        }
        if let Some(&idx) = index.get(record.id()) {
            out[idx] = record;
        } else {
            index.insert(record.id().to_owned(), out.len());
            out.push(record);
        }
    }
    Arc::new(out)
}
