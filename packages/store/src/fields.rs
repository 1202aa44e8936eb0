//! Field-path resolution.
//!
//! Form fields address nested component data with dotted paths; array
//! indices appear either in dot form (`list.0.field`) or bracket form
//! (`list[0].field`). The in-form field tree is a sparse overlay over the
//! canonical component data: writing a leaf seeds every missing ancestor by
//! copying it out of the canonical tree, so entire components are never
//! deep-cloned on a keystroke.

use serde_json::{json, Value};

/// `foo[0].bar` → `foo.0.bar`
pub fn to_dot_notation(path: &str) -> String {
    path.replace('[', ".").replace(']', "")
}

/// `foo.0.bar` → `foo[0].bar`
pub fn from_dot_notation(path: &str) -> String {
    let mut out = String::new();
    for seg in path.split('.') {
        if seg.chars().all(|c| c.is_ascii_digit()) && !seg.is_empty() {
            out.push('[');
            out.push_str(seg);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(seg);
        }
    }
    out
}

fn get_segment<'a>(value: &'a Value, seg: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn get_segment_mut<'a>(value: &'a mut Value, seg: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn set_segment(value: &mut Value, seg: &str, data: Value) {
    match value {
        Value::Object(map) => {
            map.insert(seg.to_string(), data);
        }
        Value::Array(items) => {
            if let Ok(i) = seg.parse::<usize>() {
                if i < items.len() {
                    items[i] = data;
                } else {
                    while items.len() < i {
                        items.push(Value::Null);
                    }
                    items.push(data);
                }
            }
        }
        other => {
            // overwrite a scalar ancestor with a fresh container
            let mut container = container_for(seg);
            set_segment(&mut container, seg, data);
            *other = container;
        }
    }
}

fn container_for(seg: &str) -> Value {
    if seg.chars().all(|c| c.is_ascii_digit()) && !seg.is_empty() {
        json!([])
    } else {
        json!({})
    }
}

/// Read a dotted path out of a value
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = value;
    for seg in to_dot_notation(path).split('.') {
        cur = get_segment(cur, seg)?;
    }
    Some(cur)
}

/// Write `data` at `path` inside the sparse overlay `fields`, seeding every
/// intermediate segment not yet present by copying it from `canonical`.
/// Ancestors are re-checked (and reseeded if absent) on every call.
pub fn write_field(fields: &mut Value, canonical: &Value, path: &str, data: Value) {
    let dotted = to_dot_notation(path);
    let segments: Vec<&str> = dotted.split('.').collect();

    let mut cur_fields = fields;
    let mut cur_canonical = Some(canonical);

    for (i, seg) in segments.iter().enumerate() {
        let canon_child = cur_canonical.and_then(|c| get_segment(c, seg));

        if i == segments.len() - 1 {
            set_segment(cur_fields, seg, data);
            return;
        }

        if get_segment(cur_fields, seg).is_none() {
            // seed the missing branch from canonical data, or start an
            // empty container shaped for the next segment
            let seeded = canon_child
                .cloned()
                .unwrap_or_else(|| container_for(segments[i + 1]));
            set_segment(cur_fields, seg, seeded);
        }

        cur_fields = match get_segment_mut(cur_fields, seg) {
            Some(next) => next,
            None => return, // unreachable shape (non-numeric array segment)
        };
        cur_canonical = canon_child;
    }
}

/// Fold a sparse overlay back into canonical data. Objects merge key by
/// key; anything else (arrays included — they were seeded whole) is
/// replaced by the overlay's value.
pub fn merge_overlay(canonical: &mut Value, overlay: &Value) {
    match (canonical, overlay) {
        (Value::Object(canon), Value::Object(over)) => {
            for (key, value) in over {
                match canon.get_mut(key) {
                    Some(existing) => merge_overlay(existing, value),
                    None => {
                        canon.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (canon, over) => *canon = over.clone(),
    }
}
