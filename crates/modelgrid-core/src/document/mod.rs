//! Sheet state and logic (UI-agnostic).
//!
//! A [`Sheet`] owns the cell store, focus, selection and the model list view.
//! Front ends feed it [`Action`]s through [`Sheet::apply`] and carry out the
//! [`Effect`]s it returns; backend effects come back later as further actions.

mod actions;
mod apply;
mod state;

pub use actions::{Action, Effect, Notice, NoticeKind};
pub use state::{ModelList, Sheet};
