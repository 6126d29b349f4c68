use serde_json::Value;

use crate::store::keys::StoreKey;

/// A subscriber callback. Receives the full new value for its key, or `None`
/// when the key was cleared.
///
/// Subscribers must not write back into the store synchronously; notification
/// runs under the store's serialization lock.
pub type SubscriberFn = Box<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`KeyValueStore::connect`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(pub(crate) u64);

/// The local reactive store contract.
///
/// All session state mutations flow through these primitives, which serialize
/// subscriber notification so a subscriber never observes a torn intermediate
/// value.
pub trait KeyValueStore: Send + Sync {
    /// Returns the current value for `key`, if any.
    fn get(&self, key: StoreKey) -> Option<Value>;

    /// Replaces the value for `key`. A null value clears the key.
    fn set(&self, key: StoreKey, value: Value);

    /// Shallow-merges `partial` into the value for `key`.
    ///
    /// A null field value deletes that field; a top-level null clears the
    /// key; a non-object partial replaces the value outright.
    fn merge(&self, key: StoreKey, partial: Value);

    /// Replaces several keys at once. All writes land before any subscriber
    /// is notified.
    fn multi_set(&self, entries: Vec<(StoreKey, Value)>);

    /// Subscribes to `key`. The callback fires immediately with the current
    /// value and again on every subsequent write to the key.
    fn connect(&self, key: StoreKey, callback: SubscriberFn) -> SubscriptionId;

    /// Removes a subscription.
    fn disconnect(&self, id: SubscriptionId);
}

/// Applies the store's shallow-merge semantics.
pub(crate) fn shallow_merge(existing: Option<Value>, partial: Value) -> Option<Value> {
    match (existing, partial) {
        (_, Value::Null) => None,
        (Some(Value::Object(mut base)), Value::Object(patch)) => {
            for (field, value) in patch {
                if value.is_null() {
                    base.remove(&field);
                } else {
                    base.insert(field, value);
                }
            }
            Some(Value::Object(base))
        }
        (_, Value::Object(patch)) => {
            let mut base = serde_json::Map::new();
            for (field, value) in patch {
                if !value.is_null() {
                    base.insert(field, value);
                }
            }
            Some(Value::Object(base))
        }
        (_, replacement) => Some(replacement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_adds_and_overwrites_fields() {
        let merged = shallow_merge(
            Some(json!({"a": 1, "b": 2})),
            json!({"b": 3, "c": 4}),
        );
        assert_eq!(merged, Some(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn merge_to_null_deletes_the_field() {
        let merged = shallow_merge(Some(json!({"a": 1, "b": 2})), json!({"a": null}));
        assert_eq!(merged, Some(json!({"b": 2})));
    }

    #[test]
    fn top_level_null_clears_the_key() {
        let merged = shallow_merge(Some(json!({"a": 1})), Value::Null);
        assert_eq!(merged, None);
    }

    #[test]
    fn merge_into_missing_key_drops_null_fields() {
        let merged = shallow_merge(None, json!({"a": 1, "b": null}));
        assert_eq!(merged, Some(json!({"a": 1})));
    }

    #[test]
    fn non_object_partial_replaces() {
        let merged = shallow_merge(Some(json!({"a": 1})), json!("plain"));
        assert_eq!(merged, Some(json!("plain")));
    }
}
