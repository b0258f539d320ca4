// Milestone calendar: concurrent loading across processes plus the view state
// (filters, sort, page) recomputed from the loaded milestones.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::api::procesos::ClienteProcesoHito;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::hitos::classify::{self, DueCategory, Reference};
use crate::hitos::filter::{DateFilter, FilterContext, FulfillmentFilter, HitoFilter};
use crate::hitos::paginate::Pagination;
use crate::hitos::sort::{sort_hitos, SortKey};
use crate::types::SortDirection;

/// Where milestones for a client process come from.
#[async_trait]
pub trait HitoSource: Send + Sync {
    async fn hitos_for_process(
        &self,
        cliente_proceso_id: u32,
    ) -> Result<Vec<ClienteProcesoHito>, ApiError>;
}

#[async_trait]
impl HitoSource for ApiClient {
    async fn hitos_for_process(
        &self,
        cliente_proceso_id: u32,
    ) -> Result<Vec<ClienteProcesoHito>, ApiError> {
        self.list_hitos_proceso(cliente_proceso_id).await
    }
}

/// Fetch milestones for every process concurrently and join them in input order.
///
/// A failed fetch contributes nothing instead of failing the whole load.
pub async fn load_hitos(
    source: Arc<dyn HitoSource>,
    proceso_ids: &[u32],
) -> Vec<ClienteProcesoHito> {
    let mut tasks = JoinSet::new();
    for (index, &proceso_id) in proceso_ids.iter().enumerate() {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            let result = source.hitos_for_process(proceso_id).await;
            (index, proceso_id, result)
        });
    }

    let mut per_process: Vec<Vec<ClienteProcesoHito>> = vec![Vec::new(); proceso_ids.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(hitos))) => per_process[index] = hitos,
            Ok((_, proceso_id, Err(e))) => {
                log::warn!("Failed to load hitos for proceso {}: {}", proceso_id, e);
            }
            Err(e) => log::warn!("Hito load task failed: {}", e),
        }
    }

    let hitos: Vec<ClienteProcesoHito> = per_process.into_iter().flatten().collect();
    log::debug!(
        "Loaded {} hitos across {} procesos",
        hitos.len(),
        proceso_ids.len()
    );
    hitos
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarAction {
    Loaded(Vec<ClienteProcesoHito>),
    ToggleDateFilter(DateFilter),
    ClearDateFilters,
    SetFulfillment(FulfillmentFilter),
    SetText(String),
    SetRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    SetSort(SortKey, SortDirection),
    GoToPage(u32),
    SetPageSize(u32),
}

/// One table row with its derived flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRow<'a> {
    pub hito: &'a ClienteProcesoHito,
    pub nombre: String,
    pub category: DueCategory,
    pub urgent: bool,
    pub due_tomorrow: bool,
    pub finished_late: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPage<'a> {
    pub rows: Vec<CalendarRow<'a>>,
    /// Milestones matching the filters, across all pages
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
    /// Counts over every loaded milestone, for the summary badges
    pub counts: BTreeMap<DueCategory, usize>,
    pub urgent_count: usize,
}

/// Calendar view state. Every filter or sort change returns to page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarState {
    hitos: Vec<ClienteProcesoHito>,
    pub filter: HitoFilter,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub pagination: Pagination,
    pub urgent_window_hours: u32,
}

impl CalendarState {
    pub fn new(page_size: u32, urgent_window_hours: u32) -> Self {
        Self {
            hitos: Vec::new(),
            filter: HitoFilter::default(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::Asc,
            pagination: Pagination::new(page_size),
            urgent_window_hours,
        }
    }

    pub fn hitos(&self) -> &[ClienteProcesoHito] {
        &self.hitos
    }

    pub fn apply(&mut self, action: CalendarAction) {
        match action {
            CalendarAction::Loaded(hitos) => {
                self.hitos = hitos;
                // Non-empty loads are clamped in `view` against the filtered length.
                if self.hitos.is_empty() {
                    self.pagination.reset();
                }
                return;
            }
            CalendarAction::ToggleDateFilter(f) => {
                if !self.filter.categories.remove(&f) {
                    self.filter.categories.insert(f);
                }
            }
            CalendarAction::ClearDateFilters => self.filter.categories.clear(),
            CalendarAction::SetFulfillment(f) => self.filter.fulfillment = f,
            CalendarAction::SetText(text) => self.filter.text = text,
            CalendarAction::SetRange { from, to } => {
                self.filter.from = from;
                self.filter.to = to;
            }
            CalendarAction::SetSort(key, direction) => {
                self.sort_key = key;
                self.sort_direction = direction;
            }
            CalendarAction::GoToPage(page) => {
                self.pagination.go_to(page);
                return;
            }
            CalendarAction::SetPageSize(size) => {
                self.pagination.set_page_size(size);
                return;
            }
        }
        self.pagination.reset();
    }

    fn context(&self, at: &Reference) -> FilterContext {
        FilterContext {
            at: *at,
            urgent_window_hours: self.urgent_window_hours,
        }
    }

    /// Filter, sort and slice the loaded milestones as of `at`.
    ///
    /// A page past the end of the filtered set is pulled back to the last page.
    pub fn view(&mut self, at: &Reference) -> CalendarPage<'_> {
        let ctx = self.context(at);
        let mut filtered = self.filter.apply(&self.hitos, &ctx);
        sort_hitos(&mut filtered, self.sort_key, self.sort_direction);
        self.pagination.clamp(filtered.len());

        let mut counts: BTreeMap<DueCategory, usize> =
            DueCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut urgent_count = 0;
        for hito in &self.hitos {
            *counts.entry(classify::classify(hito, at)).or_default() += 1;
            if classify::is_urgent(hito, at, self.urgent_window_hours) {
                urgent_count += 1;
            }
        }

        let rows = self
            .pagination
            .slice(&filtered)
            .iter()
            .map(|&hito| CalendarRow {
                hito,
                nombre: hito.display_name(),
                category: classify::classify(hito, at),
                urgent: classify::is_urgent(hito, at, self.urgent_window_hours),
                due_tomorrow: classify::is_due_tomorrow(hito, at),
                finished_late: classify::finished_late(hito),
            })
            .collect();

        CalendarPage {
            rows,
            total: filtered.len(),
            page: self.pagination.page,
            total_pages: self.pagination.total_pages(filtered.len()),
            counts,
            urgent_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::procesos::EstadoHito;
    use crate::hitos::testing::hito;
    use std::collections::HashMap;

    struct FakeSource {
        by_process: HashMap<u32, Result<Vec<ClienteProcesoHito>, u16>>,
    }

    #[async_trait]
    impl HitoSource for FakeSource {
        async fn hitos_for_process(
            &self,
            cliente_proceso_id: u32,
        ) -> Result<Vec<ClienteProcesoHito>, ApiError> {
            match self.by_process.get(&cliente_proceso_id) {
                Some(Ok(hitos)) => Ok(hitos.clone()),
                Some(Err(status)) => Err(ApiError::Server {
                    status: *status,
                    message: "boom".into(),
                }),
                None => Err(ApiError::NotFound(String::new())),
            }
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_load_hitos_isolates_failures_and_keeps_order() {
        let mut by_process = HashMap::new();
        by_process.insert(
            10,
            Ok(vec![hito(1, "a", None, EstadoHito::Nuevo), hito(2, "b", None, EstadoHito::Nuevo)]),
        );
        by_process.insert(20, Err(500));
        by_process.insert(30, Ok(vec![hito(3, "c", None, EstadoHito::Nuevo)]));
        let source: Arc<dyn HitoSource> = Arc::new(FakeSource { by_process });

        let hitos = load_hitos(source, &[30, 20, 10, 99]).await;
        let ids: Vec<u32> = hitos.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_load_hitos_with_no_processes() {
        let source: Arc<dyn HitoSource> = Arc::new(FakeSource {
            by_process: HashMap::new(),
        });
        assert!(load_hitos(source, &[]).await.is_empty());
    }

    fn loaded_state() -> CalendarState {
        let mut state = CalendarState::new(2, 2);
        state.apply(CalendarAction::Loaded(vec![
            hito(1, "Nóminas", Some("2024-06-09"), EstadoHito::Nuevo),
            hito(2, "IVA", Some("2024-06-10"), EstadoHito::Nuevo),
            hito(3, "Seguros", Some("2024-06-11"), EstadoHito::Nuevo),
            hito(4, "Cafe y bebidas", Some("2024-06-12"), EstadoHito::Finalizado),
            hito(5, "Renta", None, EstadoHito::Nuevo),
        ]));
        state
    }

    #[test]
    fn test_view_paginates_sorted_rows() {
        let mut state = loaded_state();
        let at = Reference::on(date("2024-06-10"));
        let page = state.view(&at);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        // Undated milestones sort as the epoch, so first ascending
        let ids: Vec<u32> = page.rows.iter().map(|r| r.hito.id).collect();
        assert_eq!(ids, vec![5, 1]);
        assert_eq!(page.rows[1].category, DueCategory::Vencido);
        assert_eq!(page.counts[&DueCategory::Hoy], 1);
        assert_eq!(page.counts[&DueCategory::Finalizado], 1);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut state = loaded_state();
        state.apply(CalendarAction::GoToPage(3));
        assert_eq!(state.pagination.page, 3);
        state.apply(CalendarAction::SetText("cafe".into()));
        assert_eq!(state.pagination.page, 1);
        let page = state.view(&Reference::on(date("2024-06-10")));
        assert_eq!(page.total, 1);
        assert!(page.rows[0].nombre.starts_with("Cafe"));
    }

    #[test]
    fn test_toggle_date_filter() {
        let mut state = loaded_state();
        state.apply(CalendarAction::ToggleDateFilter(DateFilter::Hoy));
        state.apply(CalendarAction::ToggleDateFilter(DateFilter::Manana));
        let at = Reference::on(date("2024-06-10"));
        let ids: Vec<u32> = state.view(&at).rows.iter().map(|r| r.hito.id).collect();
        assert_eq!(ids, vec![2, 3]);

        state.apply(CalendarAction::ToggleDateFilter(DateFilter::Hoy));
        let ids: Vec<u32> = state.view(&at).rows.iter().map(|r| r.hito.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(state.view(&at).rows[0].due_tomorrow);
    }

    #[test]
    fn test_view_clamps_page_after_reload() {
        let mut state = loaded_state();
        state.apply(CalendarAction::GoToPage(3));
        state.apply(CalendarAction::Loaded(vec![hito(9, "x", None, EstadoHito::Nuevo)]));
        let page = state.view(&Reference::on(date("2024-06-10")));
        assert_eq!(page.page, 1);
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn test_sort_descending_by_due_date() {
        let mut state = loaded_state();
        state.apply(CalendarAction::SetSort(SortKey::FechaLimite, SortDirection::Desc));
        let page = state.view(&Reference::on(date("2024-06-10")));
        let ids: Vec<u32> = page.rows.iter().map(|r| r.hito.id).collect();
        assert_eq!(ids, vec![4, 3]);
    }
}
