//! View-level services over the API client: list and calendar state
//! containers, concurrent milestone loading and the delete confirmation flow.

pub mod calendar;
pub mod confirm;
pub mod listing;
