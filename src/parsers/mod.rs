//! Export layout implementations.
//!
//! Each layout implements [`ExportLayout`](crate::parser::ExportLayout) for one
//! markup shape the compliance export tool has produced.
//!
//! # Available Layouts
//!
//! - [`PurviewLayout`] - native `div.message` blocks
//! - [`TableLayout`] - `tr.message-row` table rows
//! - [`CardLayout`] - `MessageCard` blocks
//! - [`GenericLayout`] - any element whose class names it a message
//!
//! Use [`create_layout`](crate::parser::create_layout) to get one by
//! [`Layout`](crate::parser::Layout), or
//! [`detect_layout`](crate::parser::detect_layout) to pick one automatically.

mod card;
mod generic;
mod purview;
mod table;

pub use card::CardLayout;
pub use generic::GenericLayout;
pub use purview::PurviewLayout;
pub use table::TableLayout;
