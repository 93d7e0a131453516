//! The ordering engine.
//!
//! Translates a drag gesture (source index, destination index) over a
//! rendered list into a new working sequence for the draft store. Nothing
//! here persists; the dense `0..n-1` ranks are stamped by the reconciler at
//! save time. Hosts must only wire this up while edit mode is active - the
//! public rendering of the same collections never reorders.

use crate::content::ContentRecord;
use crate::draft::DraftList;

/// Move the element at `from` to `to` within the working sequence.
///
/// The element is removed at the source index and reinserted at the
/// destination index; the resulting full sequence replaces the working copy
/// via [`DraftList::reorder`]. Returns `false` (leaving the list untouched)
/// when the gesture is a no-op or the source index is out of range.
pub fn move_item<T: ContentRecord>(list: &mut DraftList<T>, from: usize, to: usize) -> bool {
    let len = list.len();
    if from >= len {
        return false;
    }
    let to = to.min(len - 1);
    if from == to {
        return false;
    }

    let mut sequence = list.items().to_vec();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);
    list.reorder(sequence);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;

    fn list_of(ids: &[&str]) -> DraftList<Post> {
        let mut list = DraftList::new();
        list.load(
            ids.iter()
                .map(|id| {
                    let mut p = Post::new_draft();
                    p.id = id.to_string();
                    p
                })
                .collect(),
        );
        list
    }

    fn ids(list: &DraftList<Post>) -> Vec<String> {
        list.items().iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut list = list_of(&["a", "b", "c", "d"]);

        assert!(move_item(&mut list, 0, 2));
        assert_eq!(ids(&list), vec!["b", "c", "a", "d"]);

        assert!(move_item(&mut list, 2, 0));
        assert_eq!(ids(&list), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_move_clamps_destination() {
        let mut list = list_of(&["a", "b", "c"]);
        assert!(move_item(&mut list, 0, 99));
        assert_eq!(ids(&list), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_rejects_bad_source() {
        let mut list = list_of(&["a", "b"]);
        assert!(!move_item(&mut list, 5, 0));
        assert_eq!(ids(&list), vec!["a", "b"]);
    }

    #[test]
    fn test_noop_move() {
        let mut list = list_of(&["a", "b"]);
        assert!(!move_item(&mut list, 1, 1));
        assert_eq!(ids(&list), vec!["a", "b"]);
    }

    // The working sequence stays a permutation of its identifier set under
    // any sequence of moves.
    #[test]
    fn test_moves_preserve_permutation() {
        let mut list = list_of(&["a", "b", "c", "d", "e"]);

        let gestures = [(0, 4), (3, 1), (2, 2), (4, 0), (1, 3), (0, 1)];
        for (from, to) in gestures {
            move_item(&mut list, from, to);

            let mut sorted = ids(&list);
            sorted.sort();
            assert_eq!(sorted, vec!["a", "b", "c", "d", "e"]);
            assert_eq!(list.len(), 5);
        }
    }
}
