//! Multi-criterion milestone filter.
//!
//! Each dimension is independent and the result is their logical AND:
//! - date categories: OR-combined, empty set matches everything
//! - fulfillment: all / with / without records
//! - free text: diacritic- and case-insensitive substring on the display name
//! - inclusive due-date range
//!
//! Filtering never mutates or reorders the input.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::classify::{self, DueCategory, Reference};
use super::text;
use crate::api::procesos::ClienteProcesoHito;

/// A toggleable due-date filter chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    Vencido,
    Hoy,
    Manana,
    EnPlazo,
    Finalizado,
    FinalizadoFueraDePlazo,
    SinFecha,
    Urgente,
}

impl DateFilter {
    pub const ALL: [DateFilter; 8] = [
        DateFilter::Vencido,
        DateFilter::Hoy,
        DateFilter::Manana,
        DateFilter::EnPlazo,
        DateFilter::Finalizado,
        DateFilter::FinalizadoFueraDePlazo,
        DateFilter::SinFecha,
        DateFilter::Urgente,
    ];

    fn matches(&self, hito: &ClienteProcesoHito, ctx: &FilterContext) -> bool {
        match self {
            DateFilter::Vencido => classify::classify(hito, &ctx.at) == DueCategory::Vencido,
            DateFilter::Hoy => classify::classify(hito, &ctx.at) == DueCategory::Hoy,
            DateFilter::EnPlazo => classify::classify(hito, &ctx.at) == DueCategory::EnPlazo,
            DateFilter::Finalizado => classify::classify(hito, &ctx.at) == DueCategory::Finalizado,
            DateFilter::SinFecha => classify::classify(hito, &ctx.at) == DueCategory::SinFecha,
            DateFilter::Manana => classify::is_due_tomorrow(hito, &ctx.at),
            DateFilter::FinalizadoFueraDePlazo => classify::finished_late(hito),
            DateFilter::Urgente => classify::is_urgent(hito, &ctx.at, ctx.urgent_window_hours),
        }
    }
}

impl std::str::FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match text::fold(s.trim()).replace(['-', ' '], "_").as_str() {
            "vencido" => Ok(DateFilter::Vencido),
            "hoy" => Ok(DateFilter::Hoy),
            "manana" => Ok(DateFilter::Manana),
            "en_plazo" => Ok(DateFilter::EnPlazo),
            "finalizado" => Ok(DateFilter::Finalizado),
            "finalizado_fuera_de_plazo" => Ok(DateFilter::FinalizadoFueraDePlazo),
            "sin_fecha" => Ok(DateFilter::SinFecha),
            "urgente" => Ok(DateFilter::Urgente),
            other => Err(format!("Unknown date filter: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentFilter {
    #[default]
    All,
    With,
    Without,
}

impl std::str::FromStr for FulfillmentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todos" => Ok(FulfillmentFilter::All),
            "with" | "con" => Ok(FulfillmentFilter::With),
            "without" | "sin" => Ok(FulfillmentFilter::Without),
            other => Err(format!("Unknown fulfillment filter: {}", other)),
        }
    }
}

/// Evaluation context shared by every predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub at: Reference,
    pub urgent_window_hours: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitoFilter {
    pub categories: BTreeSet<DateFilter>,
    pub fulfillment: FulfillmentFilter,
    pub text: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HitoFilter {
    /// True when no dimension restricts anything.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.fulfillment == FulfillmentFilter::All
            && self.text.trim().is_empty()
            && self.from.is_none()
            && self.to.is_none()
    }

    pub fn matches(&self, hito: &ClienteProcesoHito, ctx: &FilterContext) -> bool {
        self.matches_categories(hito, ctx)
            && self.matches_fulfillment(hito)
            && text::contains_folded(&hito.display_name(), &self.text)
            && self.matches_range(hito)
    }

    /// Matching milestones, in input order.
    pub fn apply<'a, I>(&self, hitos: I, ctx: &FilterContext) -> Vec<&'a ClienteProcesoHito>
    where
        I: IntoIterator<Item = &'a ClienteProcesoHito>,
    {
        hitos.into_iter().filter(|h| self.matches(h, ctx)).collect()
    }

    fn matches_categories(&self, hito: &ClienteProcesoHito, ctx: &FilterContext) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c.matches(hito, ctx))
    }

    fn matches_fulfillment(&self, hito: &ClienteProcesoHito) -> bool {
        match self.fulfillment {
            FulfillmentFilter::All => true,
            FulfillmentFilter::With => hito.has_cumplimientos(),
            FulfillmentFilter::Without => !hito.has_cumplimientos(),
        }
    }

    fn matches_range(&self, hito: &ClienteProcesoHito) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(due) = classify::due_date(hito) else {
            return false;
        };
        self.from.map_or(true, |from| due >= from) && self.to.map_or(true, |to| due <= to)
    }
}
