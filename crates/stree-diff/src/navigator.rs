//! Cursor over a finished report.

/// Steps forward and backward through `len` entries.
///
/// Starts before the first entry. Stepping stops at either end; it does
/// not wrap around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffNavigator {
    len: usize,
    current: Option<usize>,
}

impl DiffNavigator {
    pub fn new(len: usize) -> Self {
        Self { len, current: None }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the selected entry, if any.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn has_next(&self) -> bool {
        match self.current {
            Some(i) => i + 1 < self.len,
            None => self.len > 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    /// Select the next entry. Returns the new index, or `None` at the end
    /// (the selection is unchanged).
    pub fn next(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        self.current
    }

    /// Select the previous entry. Returns the new index, or `None` at the
    /// start (the selection is unchanged).
    pub fn previous(&mut self) -> Option<usize> {
        if !self.has_previous() {
            return None;
        }
        self.current = self.current.map(|i| i - 1);
        self.current
    }

    /// Clear the selection, optionally for a new report length.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.current = None;
    }
}
