//! Milestone table ordering.
//!
//! String columns compare folded (accent- and case-insensitive) first and
//! raw second. Missing dates and timestamps sort as the Unix epoch. The
//! milestone id is the last tie-break, so every key gives a total order.

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::classify;
use super::text::fold;
use crate::api::procesos::ClienteProcesoHito;
use crate::types::SortDirection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Nombre,
    Estado,
    FechaEstado,
    #[default]
    FechaLimite,
    HoraLimite,
    Responsable,
    UltimoCumplimiento,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "nombre" => Ok(SortKey::Nombre),
            "estado" => Ok(SortKey::Estado),
            "fecha_estado" => Ok(SortKey::FechaEstado),
            "fecha_limite" | "fecha" => Ok(SortKey::FechaLimite),
            "hora_limite" | "hora" => Ok(SortKey::HoraLimite),
            "responsable" => Ok(SortKey::Responsable),
            "ultimo_cumplimiento" | "cumplimiento" => Ok(SortKey::UltimoCumplimiento),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

fn epoch() -> NaiveDateTime {
    DateTime::from_timestamp(0, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or(NaiveDateTime::MIN)
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

fn due_date_or_epoch(hito: &ClienteProcesoHito) -> chrono::NaiveDate {
    classify::due_date(hito).unwrap_or_else(|| epoch().date())
}

fn due_time_or_midnight(hito: &ClienteProcesoHito) -> NaiveTime {
    classify::due_time(hito).unwrap_or(NaiveTime::MIN)
}

fn status_changed_at(hito: &ClienteProcesoHito) -> NaiveDateTime {
    hito.fecha_estado
        .as_deref()
        .and_then(classify::parse_timestamp)
        .unwrap_or_else(epoch)
}

/// Ascending comparison of two milestones under `key`.
pub fn compare(a: &ClienteProcesoHito, b: &ClienteProcesoHito, key: SortKey) -> Ordering {
    let primary = match key {
        SortKey::Nombre => cmp_text(&a.display_name(), &b.display_name()),
        SortKey::Estado => cmp_text(a.estado.as_str(), b.estado.as_str()),
        SortKey::FechaEstado => status_changed_at(a).cmp(&status_changed_at(b)),
        SortKey::FechaLimite => due_date_or_epoch(a)
            .cmp(&due_date_or_epoch(b))
            .then_with(|| due_time_or_midnight(a).cmp(&due_time_or_midnight(b))),
        SortKey::HoraLimite => due_time_or_midnight(a)
            .cmp(&due_time_or_midnight(b))
            .then_with(|| due_date_or_epoch(a).cmp(&due_date_or_epoch(b))),
        SortKey::Responsable => cmp_text(
            a.responsable.as_deref().unwrap_or(""),
            b.responsable.as_deref().unwrap_or(""),
        ),
        SortKey::UltimoCumplimiento => classify::latest_fulfillment(a)
            .unwrap_or_else(epoch)
            .cmp(&classify::latest_fulfillment(b).unwrap_or_else(epoch)),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Stable in-place sort of owned milestones or references to them.
pub fn sort_hitos<H: Borrow<ClienteProcesoHito>>(
    hitos: &mut [H],
    key: SortKey,
    direction: SortDirection,
) {
    hitos.sort_by(|a, b| {
        let ord = compare(a.borrow(), b.borrow(), key);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
