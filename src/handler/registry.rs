//! The per-session handler registry.

use std::sync::Arc;

use crate::oid::Oid;

use super::table::OidMap;
use super::traits::{
    CleanupSetHandler, CommitSetHandler, GetHandler, SubtreeHandler, TestSetHandler,
};

/// One entry of the merged GetNext walk: either a subtree handler or a
/// point handler, tagged so the dispatcher can apply the right probe.
#[derive(Clone)]
pub(crate) enum NextEntry {
    Subtree(Arc<dyn SubtreeHandler>),
    Point(Arc<dyn GetHandler>),
}

/// The handler tables owned by a session: point-Get and subtree-Get maps,
/// a prefix-matched TestSet map, and the CommitSet/CleanupSet singletons.
///
/// Append-only once the session is serving; installs before that may
/// replace earlier entries.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    point_get: OidMap<Arc<dyn GetHandler>>,
    subtree_get: OidMap<Arc<dyn SubtreeHandler>>,
    test_set: OidMap<Arc<dyn TestSetHandler>>,
    commit_set: Option<Arc<dyn CommitSetHandler>>,
    cleanup_set: Option<Arc<dyn CleanupSetHandler>>,
}

impl HandlerRegistry {
    pub(crate) fn install_get(&mut self, oid: Oid, handler: Arc<dyn GetHandler>) {
        self.point_get.insert(oid, handler);
    }

    pub(crate) fn install_subtree(&mut self, oid: Oid, handler: Arc<dyn SubtreeHandler>) {
        self.subtree_get.insert(oid, handler);
    }

    pub(crate) fn install_test_set(&mut self, oid: Oid, handler: Arc<dyn TestSetHandler>) {
        self.test_set.insert(oid, handler);
    }

    pub(crate) fn install_commit_set(&mut self, handler: Arc<dyn CommitSetHandler>) {
        self.commit_set = Some(handler);
    }

    pub(crate) fn install_cleanup_set(&mut self, handler: Arc<dyn CleanupSetHandler>) {
        self.cleanup_set = Some(handler);
    }

    /// Exact-match point handler for a Get.
    pub(crate) fn point_get(&self, oid: &Oid) -> Option<Arc<dyn GetHandler>> {
        self.point_get.get(oid).cloned()
    }

    /// Point and subtree handlers merged into one key-ascending list for
    /// the GetNext walk. A subtree sorts before a point handler at the
    /// same key: the subtree owns the region.
    pub(crate) fn next_entries(&self) -> Vec<(Oid, NextEntry)> {
        let mut merged = Vec::with_capacity(self.point_get.len() + self.subtree_get.len());
        let mut points = self.point_get.iter().peekable();
        let mut subtrees = self.subtree_get.iter().peekable();

        loop {
            let take_subtree = match (subtrees.peek(), points.peek()) {
                // <= so a subtree wins a tie with a point handler
                (Some((sk, _)), Some((pk, _))) => sk <= pk,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            if take_subtree {
                let (k, h) = subtrees.next().unwrap();
                merged.push((k.clone(), NextEntry::Subtree(h.clone())));
            } else {
                let (k, h) = points.next().unwrap();
                merged.push((k.clone(), NextEntry::Point(h.clone())));
            }
        }
        merged
    }

    /// The first TestSet handler (in key order) whose key prefixes `name`.
    pub(crate) fn test_set_for(&self, name: &Oid) -> Option<Arc<dyn TestSetHandler>> {
        self.test_set
            .iter()
            .find(|(key, _)| name.has_prefix(key))
            .map(|(_, handler)| handler.clone())
    }

    pub(crate) fn commit_set(&self) -> Option<Arc<dyn CommitSetHandler>> {
        self.commit_set.clone()
    }

    pub(crate) fn cleanup_set(&self) -> Option<Arc<dyn CleanupSetHandler>> {
        self.cleanup_set.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BoxFuture, SetResult};
    use crate::oid;
    use crate::value::Value;
    use crate::varbind::VarBind;

    struct Fixed(i32);

    impl GetHandler for Fixed {
        fn get<'a>(&'a self, oid: &'a crate::Oid) -> BoxFuture<'a, VarBind> {
            let vb = VarBind::new(oid.clone(), Value::Integer(self.0));
            Box::pin(async move { vb })
        }
    }

    struct Empty;

    impl SubtreeHandler for Empty {
        fn get_subtree<'a>(&'a self, oid: &'a crate::Oid, _next: bool) -> BoxFuture<'a, VarBind> {
            let vb = VarBind::end_of_mib_view(oid.clone());
            Box::pin(async move { vb })
        }
    }

    struct Accept;

    impl TestSetHandler for Accept {
        fn test_set<'a>(&'a self, _vb: &'a VarBind, _sid: u32) -> BoxFuture<'a, SetResult> {
            Box::pin(async { SetResult::NoError })
        }
    }

    #[test]
    fn test_merged_walk_order_and_tie_break() {
        let mut reg = HandlerRegistry::default();
        reg.install_get(oid!(1, 3, 6, 1, 2), Arc::new(Fixed(2)));
        reg.install_get(oid!(1, 3, 6, 1, 4), Arc::new(Fixed(4)));
        reg.install_subtree(oid!(1, 3, 6, 1, 3), Arc::new(Empty));
        // Same key as a point handler: the subtree must come first
        reg.install_subtree(oid!(1, 3, 6, 1, 4), Arc::new(Empty));

        let entries = reg.next_entries();
        let shape: Vec<(String, bool)> = entries
            .iter()
            .map(|(k, e)| (k.to_string(), matches!(e, NextEntry::Subtree(_))))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("1.3.6.1.2".to_string(), false),
                ("1.3.6.1.3".to_string(), true),
                ("1.3.6.1.4".to_string(), true),
                ("1.3.6.1.4".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_test_set_prefix_match_takes_first_key() {
        let mut reg = HandlerRegistry::default();
        reg.install_test_set(oid!(1, 3, 6, 1, 9), Arc::new(Accept));
        reg.install_test_set(oid!(1, 3, 6, 1), Arc::new(Accept));

        // Both keys prefix the name; the shorter key sorts first and wins
        assert!(reg.test_set_for(&oid!(1, 3, 6, 1, 9, 5)).is_some());
        assert!(reg.test_set_for(&oid!(1, 3, 6, 1, 2)).is_some());
        assert!(reg.test_set_for(&oid!(1, 3, 7)).is_none());
    }

    #[test]
    fn test_point_get_is_exact() {
        let mut reg = HandlerRegistry::default();
        reg.install_get(oid!(1, 3, 6, 1, 2, 0), Arc::new(Fixed(1)));
        assert!(reg.point_get(&oid!(1, 3, 6, 1, 2, 0)).is_some());
        assert!(reg.point_get(&oid!(1, 3, 6, 1, 2)).is_none());
        assert!(reg.point_get(&oid!(1, 3, 6, 1, 2, 0, 0)).is_none());
    }
}
