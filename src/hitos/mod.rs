//! Milestone calendar logic.
//!
//! Pure, synchronous functions over milestones already held in memory:
//! - classify: due-date category, urgency, due tomorrow, finished late
//! - filter: multi-criterion filter combinator
//! - sort: comparator over the table columns
//! - paginate: page slicing
//! - text: diacritic-insensitive folding

pub mod classify;
pub mod filter;
pub mod paginate;
pub mod sort;
pub mod text;

pub use classify::{DueCategory, Reference};
pub use filter::{DateFilter, FilterContext, FulfillmentFilter, HitoFilter};
pub use paginate::Pagination;
pub use sort::{sort_hitos, SortKey};

#[cfg(test)]
pub(crate) mod testing {
    use proptest::prelude::*;

    use crate::api::procesos::{ClienteProcesoHito, ClienteProcesoHitoCumplimiento, EstadoHito};

    pub fn hito(id: u32, nombre: &str, fecha: Option<&str>, estado: EstadoHito) -> ClienteProcesoHito {
        ClienteProcesoHito {
            id,
            nombre: Some(nombre.to_string()),
            fecha_limite: fecha.map(str::to_string),
            estado,
            ..Default::default()
        }
    }

    fn arb_estado() -> impl Strategy<Value = EstadoHito> {
        prop_oneof![
            Just(EstadoHito::Nuevo),
            Just(EstadoHito::EnProceso),
            Just(EstadoHito::Finalizado),
        ]
    }

    fn arb_fecha() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            1 => Just(None),
            1 => Just(Some("no es fecha".to_string())),
            8 => (1u32..=30).prop_map(|d| Some(format!("2024-06-{:02}", d))),
        ]
    }

    fn arb_hora() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("00:00".to_string())),
            (0u32..24, 0u32..60).prop_map(|(h, m)| Some(format!("{:02}:{:02}", h, m))),
        ]
    }

    fn arb_cumplimientos() -> impl Strategy<Value = Vec<ClienteProcesoHitoCumplimiento>> {
        proptest::collection::vec(
            (1u32..=30, 0u32..24).prop_map(|(d, h)| ClienteProcesoHitoCumplimiento {
                fecha: Some(format!("2024-06-{:02}", d)),
                hora: Some(format!("{:02}:15", h)),
                ..Default::default()
            }),
            0..3,
        )
    }

    pub fn arb_hito() -> impl Strategy<Value = ClienteProcesoHito> {
        (
            1u32..10_000,
            proptest::sample::select(vec!["Nóminas", "nominas", "IVA", "Cafe", "café", "Seguros"]),
            arb_fecha(),
            arb_hora(),
            arb_estado(),
            proptest::option::of(proptest::sample::select(vec!["Cliente", "Gestoría", "asesor"])),
            arb_cumplimientos(),
        )
            .prop_map(|(id, nombre, fecha, hora, estado, responsable, cumplimientos)| {
                ClienteProcesoHito {
                    id,
                    nombre: Some(nombre.to_string()),
                    fecha_limite: fecha,
                    hora_limite: hora,
                    estado,
                    responsable: responsable.map(str::to_string),
                    cumplimientos,
                    ..Default::default()
                }
            })
    }

    pub fn arb_hitos() -> impl Strategy<Value = Vec<ClienteProcesoHito>> {
        proptest::collection::vec(arb_hito(), 0..40)
    }
}
