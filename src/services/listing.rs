// List-view state for server-paginated tables (clients, documents, people, tags).
// Search, sort and page-size changes reset to page 1; results land via `Loaded`.

use serde::Serialize;

use crate::error::{ApiError, ErrorPayload};
use crate::types::{ListParams, Page, SortDirection};

/// Outcome shown by a list view: rows, an empty-state message, or an error panel.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewResult<T> {
    Success { data: Vec<T>, total: u64 },
    Empty { message: String },
    Error { error: ErrorPayload },
}

impl<T> ViewResult<T> {
    pub fn from_page(result: Result<Page<T>, ApiError>, empty_message: &str) -> Self {
        match result {
            Ok(page) if page.is_empty() => ViewResult::Empty {
                message: empty_message.to_string(),
            },
            Ok(page) => ViewResult::Success {
                total: page.total,
                data: page.data,
            },
            Err(e) => {
                log::warn!("List load failed: {}", e);
                ViewResult::Error {
                    error: ErrorPayload::from(&e),
                }
            }
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, ViewResult::Error { error } if error.can_retry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Search(String),
    Sort(String, SortDirection),
    /// Clicking the active column flips its direction; a new column starts ascending.
    ToggleSort(String),
    GoToPage(u32),
    SetPageSize(u32),
    Loaded { total: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub search: String,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            sort_field: None,
            sort_direction: SortDirection::Asc,
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn apply(&mut self, action: ListAction) {
        match action {
            ListAction::Search(search) => {
                if search != self.search {
                    self.search = search;
                    self.page = 1;
                }
            }
            ListAction::Sort(field, direction) => {
                self.sort_field = Some(field);
                self.sort_direction = direction;
                self.page = 1;
            }
            ListAction::ToggleSort(field) => {
                if self.sort_field.as_deref() == Some(field.as_str()) {
                    self.sort_direction = self.sort_direction.toggled();
                } else {
                    self.sort_field = Some(field);
                    self.sort_direction = SortDirection::Asc;
                }
                self.page = 1;
            }
            ListAction::GoToPage(page) => {
                self.page = page.clamp(1, self.total_pages());
            }
            ListAction::SetPageSize(size) => {
                self.page_size = size.max(1);
                self.page = 1;
            }
            ListAction::Loaded { total } => {
                self.total = total;
                self.page = self.page.clamp(1, self.total_pages());
            }
        }
    }

    /// Query for the current state.
    pub fn params(&self) -> ListParams {
        ListParams {
            page: Some(self.page),
            limit: Some(self.page_size),
            sort_field: self.sort_field.clone(),
            sort_direction: self.sort_field.as_ref().map(|_| self.sort_direction),
            search: Some(self.search.clone()).filter(|s| !s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_resets_page() {
        let mut state = ListState::new(10);
        state.apply(ListAction::Loaded { total: 95 });
        state.apply(ListAction::GoToPage(7));
        assert_eq!(state.page, 7);
        state.apply(ListAction::Search("acme".into()));
        assert_eq!(state.page, 1);
        assert_eq!(state.params().search.as_deref(), Some("acme"));
    }

    #[test]
    fn test_same_search_keeps_page() {
        let mut state = ListState::new(10);
        state.apply(ListAction::Loaded { total: 50 });
        state.apply(ListAction::GoToPage(3));
        state.apply(ListAction::Search(String::new()));
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_toggle_sort() {
        let mut state = ListState::new(10);
        state.apply(ListAction::ToggleSort("razon_social".into()));
        assert_eq!(state.sort_direction, SortDirection::Asc);
        state.apply(ListAction::ToggleSort("razon_social".into()));
        assert_eq!(state.sort_direction, SortDirection::Desc);
        state.apply(ListAction::ToggleSort("cif".into()));
        assert_eq!(state.sort_field.as_deref(), Some("cif"));
        assert_eq!(state.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn test_loaded_clamps_page() {
        let mut state = ListState::new(10);
        state.apply(ListAction::Loaded { total: 100 });
        state.apply(ListAction::GoToPage(10));
        state.apply(ListAction::Loaded { total: 31 });
        assert_eq!(state.page, 4);
        state.apply(ListAction::GoToPage(99));
        assert_eq!(state.page, 4);
    }

    #[test]
    fn test_params_omit_sort_direction_without_field() {
        let state = ListState::new(20);
        let params = state.params();
        assert_eq!(params.sort_direction, None);
        assert_eq!(params.limit, Some(20));
        assert_eq!(params.search, None);
    }

    #[test]
    fn test_view_result_variants() {
        let empty: ViewResult<u32> = ViewResult::from_page(Ok(Page::empty()), "Sin clientes");
        assert!(matches!(empty, ViewResult::Empty { ref message } if message == "Sin clientes"));

        let err: ViewResult<u32> = ViewResult::from_page(
            Err(ApiError::Server {
                status: 503,
                message: String::new(),
            }),
            "",
        );
        assert!(err.can_retry());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
    }
}
