//! Table-row export layout.
//!
//! Older exports render the conversation as a table, one `tr.message-row`
//! per message. Cells are usually classed like the `div` layout, but some
//! versions leave them bare; bare rows are read by position as
//! `time | sender | body`.

use crate::markup::{ElementRef, NodeId};
use crate::parser::{ExportLayout, Layout};
use crate::parsing::{self, LabelLimits, label_text};

const TIME_CELL: usize = 0;
const SENDER_CELL: usize = 1;
const BODY_CELL: usize = 2;

/// Layout for `tr.message-row` tables.
pub struct TableLayout;

impl TableLayout {
    pub fn new() -> Self {
        Self
    }

    /// Returns the `index`-th cell of a row that has at least three cells.
    fn cell<'a>(row: &ElementRef<'a>, index: usize) -> Option<ElementRef<'a>> {
        let cells: Vec<ElementRef<'a>> = row.children().filter(|c| c.is_any(&["td", "th"])).collect();
        if cells.len() < 3 {
            return None;
        }
        cells.get(index).copied().filter(|c| !label_text(c).is_empty())
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportLayout for TableLayout {
    fn name(&self) -> &'static str {
        "Table"
    }

    fn layout(&self) -> Layout {
        Layout::Table
    }

    fn is_container(&self, el: &ElementRef<'_>) -> bool {
        el.name() == "tr" && el.has_class("message-row")
    }

    fn sender_label<'a>(
        &self,
        block: &ElementRef<'a>,
        limits: &LabelLimits,
    ) -> Option<ElementRef<'a>> {
        parsing::find_sender_by_class(block, limits)
            .or_else(|| {
                Self::cell(block, SENDER_CELL)
                    .filter(|c| label_text(c).chars().count() < limits.max_sender_len)
            })
            .or_else(|| parsing::find_bold_sender(block, limits))
    }

    fn timestamp_label<'a>(&self, block: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        parsing::find_timestamp(block).or_else(|| Self::cell(block, TIME_CELL))
    }

    fn body_region<'a>(&self, block: &ElementRef<'a>, roles: &[NodeId]) -> Option<ElementRef<'a>> {
        parsing::find_body(block, roles).or_else(|| {
            Self::cell(block, BODY_CELL).filter(|c| !roles.contains(&c.id()))
        })
    }
}
