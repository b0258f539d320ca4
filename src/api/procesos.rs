//! Client processes, their milestones ("hitos") and fulfillment records.
//!
//! A `ClienteProceso` is one recurring process assigned to a client for a
//! given month/year. Each carries dated milestones; each milestone keeps a
//! history of fulfillment uploads.

use serde::{Deserialize, Serialize};

use super::{file_part, ApiClient};
use crate::error::{ApiError, ValidationError};
use crate::types::{null_as_default, ListParams, Page};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClienteProceso {
    pub id: u32,
    #[serde(default)]
    pub cliente_id: Option<u32>,
    #[serde(default)]
    pub proceso_id: Option<u32>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub mes: Option<u32>,
    #[serde(default)]
    pub anio: Option<i32>,
}

/// Milestone status. Unknown strings from the backend are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum EstadoHito {
    #[default]
    Nuevo,
    EnProceso,
    Finalizado,
    Other(String),
}

impl EstadoHito {
    pub fn as_str(&self) -> &str {
        match self {
            EstadoHito::Nuevo => "Nuevo",
            EstadoHito::EnProceso => "En proceso",
            EstadoHito::Finalizado => "Finalizado",
            EstadoHito::Other(s) => s,
        }
    }

    pub fn is_finalizado(&self) -> bool {
        matches!(self, EstadoHito::Finalizado)
    }
}

impl From<String> for EstadoHito {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "nuevo" => EstadoHito::Nuevo,
            "en proceso" | "en_proceso" | "enproceso" => EstadoHito::EnProceso,
            "finalizado" => EstadoHito::Finalizado,
            _ => EstadoHito::Other(s),
        }
    }
}

impl From<Option<String>> for EstadoHito {
    fn from(s: Option<String>) -> Self {
        s.map(EstadoHito::from).unwrap_or_default()
    }
}

impl From<EstadoHito> for String {
    fn from(e: EstadoHito) -> Self {
        e.as_str().to_string()
    }
}

impl std::fmt::Display for EstadoHito {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fulfillment event: a document or completion recorded against a milestone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClienteProcesoHitoCumplimiento {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub cliente_proceso_hito_id: Option<u32>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub fecha: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub observacion: Option<String>,
    #[serde(default)]
    pub nombre_documento: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClienteProcesoHito {
    pub id: u32,
    #[serde(default)]
    pub cliente_proceso_id: Option<u32>,
    #[serde(default)]
    pub hito_id: Option<u32>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_limite: Option<String>,
    #[serde(default)]
    pub hora_limite: Option<String>,
    #[serde(default)]
    pub estado: EstadoHito,
    /// When `estado` last changed
    #[serde(default)]
    pub fecha_estado: Option<String>,
    #[serde(default)]
    pub responsable: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub obligatorio: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cumplimientos: Vec<ClienteProcesoHitoCumplimiento>,
}

impl ClienteProcesoHito {
    /// Name shown in tables; falls back to the catalog id.
    pub fn display_name(&self) -> String {
        match self.nombre.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(nombre) => nombre.to_string(),
            None => match self.hito_id {
                Some(hito_id) => format!("Hito {}", hito_id),
                None => format!("Hito #{}", self.id),
            },
        }
    }

    pub fn has_cumplimientos(&self) -> bool {
        !self.cumplimientos.is_empty()
    }
}

/// Fulfillment to record, optionally with an attached document.
#[derive(Debug, Clone, Default)]
pub struct NuevoCumplimiento {
    pub observacion: Option<String>,
    pub archivo: Option<(String, Vec<u8>)>,
}

// ============================================================================
// Endpoints
// ============================================================================

impl ApiClient {
    /// Processes assigned to a client for a month/year.
    pub async fn list_cliente_procesos(
        &self,
        cliente_id: u32,
        mes: u32,
        anio: i32,
    ) -> Result<Vec<ClienteProceso>, ApiError> {
        if !(1..=12).contains(&mes) {
            return Err(ValidationError::invalid("mes", "debe estar entre 1 y 12").into());
        }
        let page: Page<ClienteProceso> = self
            .list(
                "cliente-procesos",
                &ListParams::default(),
                &[
                    ("cliente_id", cliente_id.to_string()),
                    ("mes", mes.to_string()),
                    ("anio", anio.to_string()),
                ],
            )
            .await?;
        Ok(page.data)
    }

    pub async fn list_hitos_proceso(
        &self,
        cliente_proceso_id: u32,
    ) -> Result<Vec<ClienteProcesoHito>, ApiError> {
        let page: Page<ClienteProcesoHito> = self
            .list(
                "cliente-proceso-hitos",
                &ListParams::default(),
                &[("cliente_proceso_id", cliente_proceso_id.to_string())],
            )
            .await?;
        Ok(page.data)
    }

    pub async fn get_hito(&self, id: u32) -> Result<ClienteProcesoHito, ApiError> {
        self.get_json(&format!("cliente-proceso-hitos/{}", id), &[]).await
    }

    pub async fn update_estado_hito(
        &self,
        id: u32,
        estado: EstadoHito,
    ) -> Result<ClienteProcesoHito, ApiError> {
        self.put_json(
            &format!("cliente-proceso-hitos/{}", id),
            &serde_json::json!({ "estado": estado }),
        )
        .await
    }

    pub async fn list_cumplimientos(
        &self,
        hito_id: u32,
    ) -> Result<Vec<ClienteProcesoHitoCumplimiento>, ApiError> {
        let page: Page<ClienteProcesoHitoCumplimiento> = self
            .list(
                "cliente-proceso-hito-cumplimientos",
                &ListParams::default(),
                &[("cliente_proceso_hito_id", hito_id.to_string())],
            )
            .await?;
        Ok(page.data)
    }

    /// Record a fulfillment. The server stamps date and time.
    pub async fn create_cumplimiento(
        &self,
        hito_id: u32,
        nuevo: NuevoCumplimiento,
    ) -> Result<ClienteProcesoHitoCumplimiento, ApiError> {
        let mut form = reqwest::multipart::Form::new()
            .text("cliente_proceso_hito_id", hito_id.to_string());
        if let Some(obs) = nuevo.observacion.filter(|o| !o.trim().is_empty()) {
            form = form.text("observacion", obs);
        }
        if let Some((filename, bytes)) = nuevo.archivo {
            if bytes.is_empty() {
                return Err(ValidationError::invalid("archivo", "el archivo está vacío").into());
            }
            form = form.part("file", file_part(bytes, &filename, None)?);
        }
        log::info!("Recording cumplimiento for hito {}", hito_id);
        self.post_multipart("cliente-proceso-hito-cumplimientos", form).await
    }
}
