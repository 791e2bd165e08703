//! View selection and layout state
//!
//! Everything here is synchronous and free of side effects, so hosts can
//! call it on every render.

mod layout;
mod mode;

pub use layout::{MainLayout, document_title, spinner_visible};
pub use mode::{ViewMode, ViewSelection, select_view};
