//! Gallery ordering: dense renumbering, drag moves and removal.
//!
//! Every function takes a gallery and hands back the next one; nothing
//! here keeps state between calls except [`DragSession`], which only
//! remembers which index is being dragged.

use crate::entry::Ordered;
use crate::error::{GalleryError, GalleryResult};

/// Rewrites every `order` to its list position.
pub fn renumber<T: Ordered>(gallery: &mut [T]) {
    for (index, item) in gallery.iter_mut().enumerate() {
        item.set_order(index);
    }
}

/// True when `order` values are exactly `0..len` in list order.
pub fn is_dense<T: Ordered>(gallery: &[T]) -> bool {
    gallery.iter().enumerate().all(|(index, item)| item.order() == index)
}

fn check_index(index: usize, len: usize) -> GalleryResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(GalleryError::IndexOutOfRange { index, len })
    }
}

/// Moves the item at `from` so it ends up at `to`, then renumbers.
///
/// Splice semantics: remove at `from`, insert at `to`. Moving an item
/// onto itself returns the gallery untouched.
pub fn move_item<T: Ordered + Clone>(gallery: &[T], from: usize, to: usize) -> GalleryResult<Vec<T>> {
    check_index(from, gallery.len())?;
    check_index(to, gallery.len())?;

    let mut next = gallery.to_vec();
    if from == to {
        return Ok(next);
    }

    let item = next.remove(from);
    next.insert(to, item);
    renumber(&mut next);
    Ok(next)
}

/// Removes the item at `index` and renumbers what is left.
pub fn remove_at<T: Ordered + Clone>(gallery: &[T], index: usize) -> GalleryResult<(Vec<T>, T)> {
    check_index(index, gallery.len())?;

    let mut next = gallery.to_vec();
    let removed = next.remove(index);
    renumber(&mut next);
    Ok((next, removed))
}

/// Tracks one drag gesture across hover events.
///
/// Each hover over another slot moves the dragged item there immediately,
/// and the dragged index follows it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<usize>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, index: usize) {
        self.dragged = Some(index);
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    /// Returns the reordered gallery, or `None` when hovering the item's own slot.
    pub fn hover<T: Ordered + Clone>(&mut self, gallery: &[T], target: usize) -> GalleryResult<Option<Vec<T>>> {
        let from = self.dragged.ok_or(GalleryError::NoActiveDrag)?;
        if from == target {
            return Ok(None);
        }

        let next = move_item(gallery, from, target)?;
        self.dragged = Some(target);
        Ok(Some(next))
    }

    pub fn end(&mut self) {
        self.dragged = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{GalleryImage, ImageEntry};

    fn gallery(n: usize) -> Vec<GalleryImage> {
        (0..n)
            .map(|i| GalleryImage {
                url: format!("https://img/{i}.jpg"),
                path: format!("products/p/{i}.jpg"),
                order: i,
            })
            .collect()
    }

    fn urls(g: &[GalleryImage]) -> Vec<&str> {
        g.iter().map(|i| i.url.as_str()).collect()
    }

    #[test]
    fn moving_first_to_last_shifts_the_rest_forward() {
        let g = gallery(3);
        let moved = move_item(&g, 0, 2).unwrap();

        assert_eq!(urls(&moved), vec!["https://img/1.jpg", "https://img/2.jpg", "https://img/0.jpg"]);
        assert_eq!(moved.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn moving_backwards_inserts_before_target() {
        let g = gallery(4);
        let moved = move_item(&g, 3, 1).unwrap();
        assert_eq!(
            urls(&moved),
            vec!["https://img/0.jpg", "https://img/3.jpg", "https://img/1.jpg", "https://img/2.jpg"]
        );
        assert!(is_dense(&moved));
    }

    #[test]
    fn identity_and_idempotence() {
        let g = gallery(5);
        assert_eq!(move_item(&g, 2, 2).unwrap(), g);

        for (a, b) in [(0, 4), (4, 0), (1, 3), (2, 2)] {
            let once = move_item(&g, a, b).unwrap();
            assert_eq!(move_item(&once, b, b).unwrap(), once);
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let g = gallery(2);
        assert_eq!(
            move_item(&g, 0, 2).unwrap_err(),
            GalleryError::IndexOutOfRange { index: 2, len: 2 }
        );
        assert!(move_item(&Vec::<GalleryImage>::new(), 0, 0).is_err());
        assert!(remove_at(&g, 5).is_err());
    }

    #[test]
    fn removal_keeps_orders_dense() {
        let g = gallery(4);
        let (rest, removed) = remove_at(&g, 1).unwrap();
        assert_eq!(removed.url, "https://img/1.jpg");
        assert_eq!(urls(&rest), vec!["https://img/0.jpg", "https://img/2.jpg", "https://img/3.jpg"]);
        assert!(is_dense(&rest));

        let (only_main_left, _) = remove_at(&rest[..1], 0).unwrap();
        assert!(only_main_left.is_empty());
    }

    #[test]
    fn renumber_fixes_sparse_orders() {
        let mut g = vec![
            ImageEntry::remote("a", "pa", 7),
            ImageEntry::placeholder("b", 3),
        ];
        assert!(!is_dense(&g));
        renumber(&mut g);
        assert!(is_dense(&g));
        assert!(g[0].is_main());
    }

    #[test]
    fn drag_session_follows_the_dragged_item() {
        let g = gallery(4);
        let mut drag = DragSession::new();
        assert_eq!(drag.hover(&g, 1), Err(GalleryError::NoActiveDrag));

        drag.start(0);
        assert_eq!(drag.hover(&g, 0).unwrap(), None);

        let g = drag.hover(&g, 1).unwrap().unwrap();
        let g = drag.hover(&g, 2).unwrap().unwrap();
        assert_eq!(drag.dragged(), Some(2));
        assert_eq!(
            urls(&g),
            vec!["https://img/1.jpg", "https://img/2.jpg", "https://img/0.jpg", "https://img/3.jpg"]
        );

        drag.end();
        assert_eq!(drag.dragged(), None);
    }
}
