//! Keyboard selection over the visible subset of autocomplete matches.
//!
//! Selection is tracked as an underlying match index but navigated by
//! position within the visible subset, so typed-mode cycling never lands on
//! the hidden verbatim row. Deleting a match remembers its visible position;
//! when the refreshed list arrives, the match now occupying that position is
//! selected, or the selection clears if the list got too short.

#[derive(Default)]
pub struct SelectionNavigator {
    /// Underlying match index, not a visible position.
    selected: Option<usize>,
    /// Visible position to re-select after a deletion round-trips.
    pending_restore: Option<usize>,
}

impl SelectionNavigator {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Advance to the next visible match, wrapping at the end. Returns the
    /// newly selected underlying index.
    pub fn move_next(&mut self, visible: &[usize]) -> Option<usize> {
        if visible.is_empty() {
            return None;
        }
        let next = match self.visible_position(visible) {
            Some(position) => (position + 1) % visible.len(),
            None => 0,
        };
        self.selected = Some(visible[next]);
        self.selected
    }

    /// Move to the previous visible match, wrapping at the start.
    pub fn move_previous(&mut self, visible: &[usize]) -> Option<usize> {
        if visible.is_empty() {
            return None;
        }
        let previous = match self.visible_position(visible) {
            Some(position) => (position + visible.len() - 1) % visible.len(),
            None => visible.len() - 1,
        };
        self.selected = Some(visible[previous]);
        self.selected
    }

    fn visible_position(&self, visible: &[usize]) -> Option<usize> {
        let selected = self.selected?;
        visible.iter().position(|&index| index == selected)
    }

    /// Record that the match at `visible_position` is being deleted. The
    /// selection is cleared until the refreshed list confirms what now sits
    /// at that position.
    pub fn note_deleted(&mut self, visible_position: usize) {
        self.pending_restore = Some(visible_position);
        self.selected = None;
    }

    /// A fresh match list arrived. Re-selection happens only positionally
    /// after a deletion; any other refresh drops the selection.
    pub fn on_matches_refreshed(&mut self, visible: &[usize]) {
        match self.pending_restore.take() {
            Some(position) => self.selected = visible.get(position).copied(),
            None => self.selected = None,
        }
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.pending_restore = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cycles_forward_with_wraparound() {
        let mut navigator = SelectionNavigator::default();
        let visible = [0, 1, 2, 3];
        assert_eq!(navigator.move_next(&visible), Some(0));
        assert_eq!(navigator.move_next(&visible), Some(1));
        assert_eq!(navigator.move_next(&visible), Some(2));
        assert_eq!(navigator.move_next(&visible), Some(3));
        assert_eq!(navigator.move_next(&visible), Some(0));
    }

    #[test]
    fn cycles_backward_from_no_selection() {
        let mut navigator = SelectionNavigator::default();
        let visible = [0, 1, 2];
        assert_eq!(navigator.move_previous(&visible), Some(2));
        assert_eq!(navigator.move_previous(&visible), Some(1));
    }

    #[test]
    fn typed_mode_subset_never_selects_the_hidden_row() {
        let mut navigator = SelectionNavigator::default();
        // Verbatim row at index 0 excluded from the visible subset.
        let visible = [1, 2, 3];
        assert_eq!(navigator.move_next(&visible), Some(1));
        assert_eq!(navigator.move_next(&visible), Some(2));
        assert_eq!(navigator.move_next(&visible), Some(3));
        assert_eq!(navigator.move_next(&visible), Some(1));
    }

    #[test]
    fn empty_subset_yields_no_selection() {
        let mut navigator = SelectionNavigator::default();
        assert_eq!(navigator.move_next(&[]), None);
        assert_eq!(navigator.selected(), None);
    }

    #[test]
    fn deletion_reselects_by_position() {
        let mut navigator = SelectionNavigator::default();
        let visible = [0, 1, 2];
        navigator.move_next(&visible);
        navigator.move_next(&visible);
        assert_eq!(navigator.selected(), Some(1));

        navigator.note_deleted(1);
        assert_eq!(navigator.selected(), None);

        // Backend pushed the shrunken list; position 1 now holds another row.
        navigator.on_matches_refreshed(&[0, 1]);
        assert_eq!(navigator.selected(), Some(1));
    }

    #[test]
    fn deletion_of_last_row_clears_selection() {
        let mut navigator = SelectionNavigator::default();
        let visible = [0, 1];
        navigator.move_next(&visible);
        navigator.move_next(&visible);
        navigator.note_deleted(1);

        navigator.on_matches_refreshed(&[0]);
        assert_eq!(navigator.selected(), None);
    }

    #[test]
    fn plain_refresh_drops_selection() {
        let mut navigator = SelectionNavigator::default();
        navigator.move_next(&[0, 1]);
        navigator.on_matches_refreshed(&[0, 1]);
        assert_eq!(navigator.selected(), None);
    }
}
