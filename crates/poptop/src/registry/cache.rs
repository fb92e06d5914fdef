//! Per-template REST cache.

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

/// Cached payloads for one path template, keyed by item id.
///
/// Entries keep the provider's ordering; ids added later by POST are
/// appended. `warmed` records that the provider's full collection has been
/// loaded, so a single-item miss afterwards is a genuine not-found.
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateCache {
    order: Vec<i64>,
    entries: HashMap<i64, Bytes>,
    warmed: bool,
}

impl TemplateCache {
    pub fn get(&self, id: i64) -> Option<&Bytes> {
        self.entries.get(&id)
    }

    /// Insert or overwrite; an overwritten id keeps its position.
    pub fn put(&mut self, id: i64, data: Bytes) {
        if self.entries.insert(id, data).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Bytes> {
        let removed = self.entries.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        if self.entries.is_empty() {
            self.warmed = false;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.warmed = false;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_warmed(&self) -> bool {
        self.warmed
    }

    pub fn ids(&self) -> &[i64] {
        &self.order
    }

    /// Load a provider collection.
    ///
    /// Ids already cached keep their payload (a POST overwrite wins over the
    /// provider). The resulting order is the provider's, followed by cached
    /// ids the provider does not know about.
    pub fn warm(&mut self, items: Vec<(i64, Bytes)>) {
        let mut order = Vec::with_capacity(items.len() + self.order.len());
        for (id, data) in items {
            if order.contains(&id) {
                continue;
            }
            self.entries.entry(id).or_insert(data);
            order.push(id);
        }
        for id in &self.order {
            if !order.contains(id) {
                order.push(*id);
            }
        }
        self.order = order;
        self.warmed = true;
    }

    /// Cached entries rendered as a JSON array, in cache order.
    pub fn joined(&self) -> Bytes {
        let capacity = self.entries.values().map(|v| v.len() + 1).sum::<usize>() + 2;
        let mut out = BytesMut::with_capacity(capacity);
        out.put_u8(b'[');
        let items = self.order.iter().filter_map(|id| self.entries.get(id));
        for (i, data) in items.enumerate() {
            if i > 0 {
                out.put_u8(b',');
            }
            out.put_slice(data);
        }
        out.put_u8(b']');
        out.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> (i64, Bytes) {
        (id, Bytes::from(format!(r#"{{"id":{id}}}"#)))
    }

    #[test]
    fn test_warm_and_join_in_provider_order() {
        let mut cache = TemplateCache::default();
        cache.warm(vec![item(3), item(1), item(2)]);

        assert!(cache.is_warmed());
        assert_eq!(cache.ids(), &[3, 1, 2]);
        assert_eq!(&cache.joined()[..], br#"[{"id":3},{"id":1},{"id":2}]"#);
    }

    #[test]
    fn test_put_overwrites_in_place_and_appends_new() {
        let mut cache = TemplateCache::default();
        cache.warm(vec![item(1), item(2)]);
        cache.put(1, Bytes::from_static(b"{\"id\":1,\"v\":2}"));
        cache.put(9, Bytes::from_static(b"{\"id\":9}"));

        assert_eq!(cache.ids(), &[1, 2, 9]);
        assert_eq!(
            &cache.joined()[..],
            br#"[{"id":1,"v":2},{"id":2},{"id":9}]"#
        );
    }

    #[test]
    fn test_warm_keeps_posted_payloads() {
        let mut cache = TemplateCache::default();
        cache.put(2, Bytes::from_static(b"posted"));
        cache.put(7, Bytes::from_static(b"extra"));
        cache.warm(vec![item(1), item(2)]);

        assert_eq!(cache.ids(), &[1, 2, 7]);
        assert_eq!(cache.get(2).unwrap(), &Bytes::from_static(b"posted"));
    }

    #[test]
    fn test_remove_last_entry_resets_warm_state() {
        let mut cache = TemplateCache::default();
        cache.warm(vec![item(1)]);
        assert_eq!(cache.remove(5), None);
        assert!(cache.remove(1).is_some());
        assert!(cache.is_empty());
        assert!(!cache.is_warmed());
        assert_eq!(&cache.joined()[..], b"[]");
    }
}
