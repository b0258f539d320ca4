//! Due-date classification of milestones.
//!
//! The four-state classification compares calendar dates only, in UTC.
//! Urgency compares time of day in local time. Unparseable dates never
//! panic: they classify as `SinFecha` and fail every date predicate.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::procesos::ClienteProcesoHito;

/// Mutually exclusive due-date category of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueCategory {
    SinFecha,
    Finalizado,
    Vencido,
    Hoy,
    EnPlazo,
}

impl DueCategory {
    pub const ALL: [DueCategory; 5] = [
        DueCategory::SinFecha,
        DueCategory::Finalizado,
        DueCategory::Vencido,
        DueCategory::Hoy,
        DueCategory::EnPlazo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DueCategory::SinFecha => "Sin fecha",
            DueCategory::Finalizado => "Finalizado",
            DueCategory::Vencido => "Vencido",
            DueCategory::Hoy => "Vence hoy",
            DueCategory::EnPlazo => "En plazo",
        }
    }
}

/// The moment classification is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Today's calendar date in UTC
    pub today_utc: NaiveDate,
    /// Wall-clock time in the user's zone
    pub now_local: NaiveDateTime,
}

impl Reference {
    /// Reference for the current instant. `tz` of None uses the system zone.
    pub fn now(tz: Option<chrono_tz::Tz>) -> Self {
        Self::from_instant(Utc::now(), tz)
    }

    pub fn from_instant(now: DateTime<Utc>, tz: Option<chrono_tz::Tz>) -> Self {
        let now_local = match tz {
            Some(tz) => now.with_timezone(&tz).naive_local(),
            None => now.with_timezone(&chrono::Local).naive_local(),
        };
        Self {
            today_utc: now.date_naive(),
            now_local,
        }
    }

    /// Midnight of `date`, with UTC and local agreeing.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            today_utc: date,
            now_local: date.and_time(NaiveTime::MIN),
        }
    }

    pub fn tomorrow_utc(&self) -> Option<NaiveDate> {
        self.today_utc.succ_opt()
    }
}

/// Parse a due/fulfillment date. Accepts `YYYY-MM-DD`, `DD/MM/YYYY`,
/// RFC 3339 and `YYYY-MM-DD[T ]HH:MM:SS`; timestamps with an offset are
/// converted to UTC before taking the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|dt| dt.date())
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Parse a timestamp such as `fecha_estado`. Missing or bad values are None.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(raw).map(|d| d.and_time(NaiveTime::MIN)))
}

pub fn due_date(hito: &ClienteProcesoHito) -> Option<NaiveDate> {
    hito.fecha_limite.as_deref().and_then(parse_date)
}

/// Due time. `00:00` means "no specific time" and maps to None, as do unparseable values.
pub fn due_time(hito: &ClienteProcesoHito) -> Option<NaiveTime> {
    let time = parse_time(hito.hora_limite.as_deref()?)?;
    if time == NaiveTime::MIN {
        None
    } else {
        Some(time)
    }
}

pub fn classify(hito: &ClienteProcesoHito, at: &Reference) -> DueCategory {
    if hito.estado.is_finalizado() {
        return DueCategory::Finalizado;
    }
    let Some(due) = due_date(hito) else {
        return DueCategory::SinFecha;
    };
    match due.cmp(&at.today_utc) {
        std::cmp::Ordering::Less => DueCategory::Vencido,
        std::cmp::Ordering::Equal => DueCategory::Hoy,
        std::cmp::Ordering::Greater => DueCategory::EnPlazo,
    }
}

/// Due today, with a specific due time falling within `window_hours` from now.
pub fn is_urgent(hito: &ClienteProcesoHito, at: &Reference, window_hours: u32) -> bool {
    if hito.estado.is_finalizado() {
        return false;
    }
    let (Some(date), Some(time)) = (due_date(hito), due_time(hito)) else {
        return false;
    };
    if date != at.today_utc {
        return false;
    }
    let due = date.and_time(time);
    let limit = at.now_local + Duration::hours(i64::from(window_hours));
    due >= at.now_local && due <= limit
}

/// Due date is exactly one day after today (UTC). Independent of status.
pub fn is_due_tomorrow(hito: &ClienteProcesoHito, at: &Reference) -> bool {
    match (due_date(hito), at.tomorrow_utc()) {
        (Some(due), Some(tomorrow)) => due == tomorrow,
        _ => false,
    }
}

/// Most recent fulfillment moment by (fecha, hora). Records without a
/// parseable date are ignored; a missing time counts as midnight.
pub fn latest_fulfillment(hito: &ClienteProcesoHito) -> Option<NaiveDateTime> {
    hito.cumplimientos
        .iter()
        .filter_map(|c| {
            let date = c.fecha.as_deref().and_then(parse_date)?;
            let time = c
                .hora
                .as_deref()
                .and_then(parse_time)
                .unwrap_or(NaiveTime::MIN);
            Some(date.and_time(time))
        })
        .max()
}

/// Deadline moment: due date plus due time, or end of day when there is none.
pub fn deadline(hito: &ClienteProcesoHito) -> Option<NaiveDateTime> {
    let date = due_date(hito)?;
    let time = due_time(hito).unwrap_or_else(end_of_day);
    Some(date.and_time(time))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Finalized, and the latest fulfillment strictly postdates the deadline.
pub fn finished_late(hito: &ClienteProcesoHito) -> bool {
    if !hito.estado.is_finalizado() {
        return false;
    }
    match (latest_fulfillment(hito), deadline(hito)) {
        (Some(done), Some(limit)) => done > limit,
        _ => false,
    }
}
