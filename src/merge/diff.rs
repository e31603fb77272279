use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One difference between two JSON documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    /// JSON pointer (RFC 6901) to the changed value.
    pub path: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        match (&self.old, &self.new) {
            (None, Some(new)) => write!(f, "added {} = {}", path, new),
            (Some(old), None) => write!(f, "removed {} (was {})", path, old),
            (Some(old), Some(new)) => write!(f, "{}: {} -> {}", path, old, new),
            (None, None) => write!(f, "{}", path),
        }
    }
}

/// Structural diff of `old` against `new`.
///
/// Objects are compared by key (old key order first, then keys new in `new`),
/// arrays by index. A mismatch of any other kind, including a change of type,
/// is reported as `Modified` at the level where it occurs.
pub fn diff(old: &Value, new: &Value) -> Vec<Change> {
    let mut out = Vec::new();
    walk(&mut String::new(), old, new, &mut out);
    out
}

fn walk(path: &mut String, old: &Value, new: &Value, out: &mut Vec<Change>) {
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, va) in a {
                let len = path.len();
                push_segment(path, key);
                match b.get(key) {
                    Some(vb) => walk(path, va, vb, out),
                    None => out.push(removed(path, va)),
                }
                path.truncate(len);
            }
            for (key, vb) in b {
                if a.contains_key(key) {
                    continue;
                }
                let len = path.len();
                push_segment(path, key);
                out.push(added(path, vb));
                path.truncate(len);
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for i in 0..a.len().max(b.len()) {
                let len = path.len();
                push_segment(path, &i.to_string());
                match (a.get(i), b.get(i)) {
                    (Some(va), Some(vb)) => walk(path, va, vb, out),
                    (Some(va), None) => out.push(removed(path, va)),
                    (None, Some(vb)) => out.push(added(path, vb)),
                    (None, None) => {}
                }
                path.truncate(len);
            }
        }
        _ if old == new => {}
        _ => out.push(Change {
            path: path.clone(),
            kind: ChangeKind::Modified,
            old: Some(old.clone()),
            new: Some(new.clone()),
        }),
    }
}

fn push_segment(path: &mut String, key: &str) {
    path.push('/');
    path.push_str(&key.replace('~', "~0").replace('/', "~1"));
}

fn added(path: &str, v: &Value) -> Change {
    Change {
        path: path.to_string(),
        kind: ChangeKind::Added,
        old: None,
        new: Some(v.clone()),
    }
}

fn removed(path: &str, v: &Value) -> Change {
    Change {
        path: path.to_string(),
        kind: ChangeKind::Removed,
        old: Some(v.clone()),
        new: None,
    }
}
