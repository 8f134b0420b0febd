//! Focus Management
//!
//! Index arithmetic behind roving focus and active-item movement. Widgets
//! re-query their items on every event, so the model works on positions in
//! a freshly resolved list rather than holding node ids.

/// What happens when movement crosses either end of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPolicy {
    /// Continue from the opposite end
    #[default]
    Wrap,
    /// Stay on the boundary item
    Clamp,
    /// Report no movement at all
    None,
}

/// Position within a list of `len` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RovingIndex {
    pub current: Option<usize>,
    pub len: usize,
    pub policy: NavigationPolicy,
}

impl RovingIndex {
    pub fn new(current: Option<usize>, len: usize, policy: NavigationPolicy) -> Self {
        Self {
            current: current.filter(|&i| i < len),
            len,
            policy,
        }
    }

    /// Build from a list and the item currently holding focus/activity
    pub fn locate<T: PartialEq>(items: &[T], current: Option<&T>, policy: NavigationPolicy) -> Self {
        let index = current.and_then(|c| items.iter().position(|i| i == c));
        Self::new(index, items.len(), policy)
    }

    pub fn is_first(&self) -> bool {
        self.current == Some(0)
    }

    pub fn is_last(&self) -> bool {
        self.len > 0 && self.current == Some(self.len - 1)
    }

    pub fn first(&self) -> Option<usize> {
        (self.len > 0).then_some(0)
    }

    pub fn last(&self) -> Option<usize> {
        self.len.checked_sub(1)
    }

    /// Index after the current one. With nothing current, the first item.
    pub fn next(&self) -> Option<usize> {
        let Some(current) = self.current else {
            return self.first();
        };
        if current + 1 < self.len {
            return Some(current + 1);
        }
        match self.policy {
            NavigationPolicy::Wrap => self.first(),
            NavigationPolicy::Clamp => Some(current),
            NavigationPolicy::None => None,
        }
    }

    /// Index before the current one. With nothing current, the last item.
    pub fn prev(&self) -> Option<usize> {
        let Some(current) = self.current else {
            return self.last();
        };
        if current > 0 {
            return Some(current - 1);
        }
        match self.policy {
            NavigationPolicy::Wrap => self.last(),
            NavigationPolicy::Clamp => Some(current),
            NavigationPolicy::None => None,
        }
    }
}

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    /// tabindex="-1" or not set
    NotFocusable,
    /// tabindex="0" or positive
    Sequential(i32),
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Self::NotFocusable,
            Ok(n) => Self::Sequential(n),
            Err(_) => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }

    /// Roving tabindex value: 0 for the single tabbable item, -1 otherwise
    pub fn roving(tabbable: bool) -> i32 {
        if tabbable { 0 } else { -1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        let last = RovingIndex::new(Some(2), 3, NavigationPolicy::Wrap);
        assert_eq!(last.next(), Some(0));
        let first = RovingIndex::new(Some(0), 3, NavigationPolicy::Wrap);
        assert_eq!(first.prev(), Some(2));
    }

    #[test]
    fn test_clamp_and_none() {
        let last = RovingIndex::new(Some(2), 3, NavigationPolicy::Clamp);
        assert_eq!(last.next(), Some(2));
        let last = RovingIndex::new(Some(2), 3, NavigationPolicy::None);
        assert_eq!(last.next(), None);
        assert_eq!(last.prev(), Some(1));
    }

    #[test]
    fn test_no_current() {
        let idx = RovingIndex::new(None, 4, NavigationPolicy::None);
        assert_eq!(idx.next(), Some(0));
        assert_eq!(idx.prev(), Some(3));
        let empty = RovingIndex::new(None, 0, NavigationPolicy::Wrap);
        assert_eq!(empty.next(), None);
        assert_eq!(empty.last(), None);
    }

    #[test]
    fn test_locate() {
        let idx = RovingIndex::locate(&['a', 'b', 'c'], Some(&'b'), NavigationPolicy::Wrap);
        assert_eq!(idx.current, Some(1));
        let idx = RovingIndex::locate(&['a'], Some(&'z'), NavigationPolicy::Wrap);
        assert_eq!(idx.current, None);
        // Out of range positions are dropped
        assert_eq!(RovingIndex::new(Some(7), 2, NavigationPolicy::Wrap).current, None);
    }

    #[test]
    fn test_tab_index() {
        assert!(!TabIndex::parse("-1").is_focusable());
        assert!(TabIndex::parse("0").is_focusable());
        assert!(!TabIndex::parse("x").is_focusable());
        assert_eq!(TabIndex::roving(true), 0);
    }
}
