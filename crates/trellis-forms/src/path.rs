//! Dotted property paths into JSON values (`"user.address.0.city"`)

use serde_json::{Map, Value};

/// Read the value at `path`
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at `path`, creating intermediate objects as needed.
/// A segment that is not a valid index into an array skips the write.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, parents)) = parts.split_last() else {
        *root = value;
        return;
    };
    let mut current = root;
    for segment in parents {
        match child_mut(current, segment) {
            Some(child) => current = child,
            None => {
                tracing::warn!("Path {:?}: no array element {:?}, value not written", path, segment);
                return;
            }
        }
    }
    match current {
        Value::Array(items) => match last.parse::<usize>().ok().filter(|&i| i <= items.len()) {
            Some(i) if i < items.len() => items[i] = value,
            Some(_) => items.push(value),
            None => tracing::warn!("Path {:?}: no array element {:?}, value not written", path, last),
        },
        current => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            if let Value::Object(map) = current {
                map.insert((*last).to_string(), value);
            }
        }
    }
}

fn child_mut<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if current.is_array() {
        let i = segment.parse::<usize>().ok()?;
        return current.get_mut(i);
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => Some(
            map.entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
        ),
        _ => None,
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}
