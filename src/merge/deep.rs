use crate::record::Record;
use serde_json::Value;

/// Merge `overlay` into `target`.
///
/// Objects merge key by key; anything else in `overlay` (arrays, scalars,
/// null) replaces the value in `target` wholesale.
pub fn deep_merge(target: &mut Record, overlay: &Record) {
    for (key, new) in overlay {
        match (target.get_mut(key), new) {
            (Some(Value::Object(old)), Value::Object(new)) => deep_merge(old, new),
            _ => {
                target.insert(key.clone(), new.clone());
            }
        }
    }
}

/// `a ⊕ b ⊕ ...`, skipping absent layers.
pub fn layered<'a>(layers: impl IntoIterator<Item = Option<&'a Record>>) -> Record {
    let mut out = Record::new();
    for layer in layers.into_iter().flatten() {
        deep_merge(&mut out, layer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn nested_objects_merge_and_keep_target_only_keys() {
        let mut target = rec(json!({
            "id": "S",
            "contact": {"name": "a", "email": "a@x"},
            "local": true
        }));
        let overlay = rec(json!({"contact": {"email": "b@x"}, "title": "T"}));
        deep_merge(&mut target, &overlay);
        assert_eq!(
            Value::Object(target),
            json!({
                "id": "S",
                "contact": {"name": "a", "email": "b@x"},
                "local": true,
                "title": "T"
            })
        );
    }

    #[test]
    fn arrays_and_type_changes_replace() {
        let mut target = rec(json!({"catalog": [{"id": "a"}, {"id": "b"}], "x": {"y": 1}}));
        let overlay = rec(json!({"catalog": [{"id": "c"}], "x": null}));
        deep_merge(&mut target, &overlay);
        assert_eq!(
            Value::Object(target),
            json!({"catalog": [{"id": "c"}], "x": null})
        );
    }

    #[test]
    fn layered_skips_missing_layers() {
        let a = rec(json!({"k": 1, "d": 0}));
        let c = rec(json!({"k": 3}));
        let out = layered([Some(&a), None, Some(&c)]);
        assert_eq!(Value::Object(out), json!({"k": 3, "d": 0}));
        assert!(layered([None, None]).is_empty());
    }
}
