//! Baseline-relative selection state
//!
//! Anchor and focus are `(baseline index, offset within baseline)` pairs
//! rather than absolute character offsets, because baseline indices are
//! recomputed on every layout pass. Negative components are the
//! "no selection" sentinel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: i32,
    pub focus: i32,
    pub anchor_offset: i32,
    pub focus_offset: i32,
}

/// Partial update merged into the current selection by `Selection::merge`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub anchor: Option<i32>,
    pub focus: Option<i32>,
    pub anchor_offset: Option<i32>,
    pub focus_offset: Option<i32>,
}

impl SelectionUpdate {
    pub fn collapsed(baseline: i32, offset: i32) -> Self {
        Self {
            anchor: Some(baseline),
            focus: Some(baseline),
            anchor_offset: Some(offset),
            focus_offset: Some(offset),
        }
    }

    pub fn range(anchor: i32, anchor_offset: i32, focus: i32, focus_offset: i32) -> Self {
        Self {
            anchor: Some(anchor),
            focus: Some(focus),
            anchor_offset: Some(anchor_offset),
            focus_offset: Some(focus_offset),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::NONE
    }
}

impl Selection {
    pub const NONE: Selection = Selection {
        anchor: -1,
        focus: -1,
        anchor_offset: -1,
        focus_offset: -1,
    };

    pub fn merge(&mut self, update: SelectionUpdate) {
        if let Some(anchor) = update.anchor {
            self.anchor = anchor;
        }
        if let Some(focus) = update.focus {
            self.focus = focus;
        }
        if let Some(anchor_offset) = update.anchor_offset {
            self.anchor_offset = anchor_offset;
        }
        if let Some(focus_offset) = update.focus_offset {
            self.focus_offset = focus_offset;
        }
    }

    /// All four components valid
    pub fn has_selection(&self) -> bool {
        self.anchor >= 0 && self.focus >= 0 && self.anchor_offset >= 0 && self.focus_offset >= 0
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus && self.anchor_offset == self.focus_offset
    }

    /// Anchor-before-focus in reading order
    pub fn normalized(&self) -> Selection {
        if self.anchor > self.focus
            || (self.anchor == self.focus && self.anchor_offset > self.focus_offset)
        {
            Selection {
                anchor: self.focus,
                focus: self.anchor,
                anchor_offset: self.focus_offset,
                focus_offset: self.anchor_offset,
            }
        } else {
            *self
        }
    }
}
