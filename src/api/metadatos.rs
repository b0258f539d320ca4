//! Document tags (`/metadatos`).

use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::{require, ApiError};
use crate::services::confirm::{Confirmed, ResourceKind};
use crate::types::{ListParams, Page};

/// How a tag's value is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoGeneracion {
    #[default]
    Manual,
    #[serde(alias = "automatica")]
    Automatico,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadato {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub tipo_generacion: TipoGeneracion,
    /// Applies to every client rather than a single one
    #[serde(default)]
    pub global: bool,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

impl ApiClient {
    pub async fn list_metadatos(&self, params: &ListParams) -> Result<Page<Metadato>, ApiError> {
        self.list("metadatos", params, &[]).await
    }

    pub async fn get_metadato(&self, id: u32) -> Result<Metadato, ApiError> {
        self.get_json(&format!("metadatos/{}", id), &[]).await
    }

    pub async fn create_metadato(&self, metadato: &Metadato) -> Result<Metadato, ApiError> {
        require("nombre", &metadato.nombre)?;
        self.post_json("metadatos", metadato).await
    }

    pub async fn update_metadato(&self, id: u32, metadato: &Metadato) -> Result<Metadato, ApiError> {
        require("nombre", &metadato.nombre)?;
        self.put_json(&format!("metadatos/{}", id), metadato).await
    }

    /// Flip the `activo` flag, returning the stored record.
    pub async fn toggle_metadato_activo(&self, metadato: &Metadato) -> Result<Metadato, ApiError> {
        let id = metadato
            .id
            .ok_or_else(|| crate::error::ValidationError::required("id"))?;
        let updated = Metadato {
            activo: !metadato.activo,
            ..metadato.clone()
        };
        self.update_metadato(id, &updated).await
    }

    pub async fn delete_metadato(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Metadato)?;
        self.delete(&format!("metadatos/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadato_defaults() {
        let m: Metadato = serde_json::from_str(r#"{"id": 1, "nombre": "Trimestre"}"#).unwrap();
        assert_eq!(m.tipo_generacion, TipoGeneracion::Manual);
        assert!(m.activo);
        assert!(!m.global);
    }

    #[test]
    fn test_tipo_generacion_wire_format() {
        let m: Metadato =
            serde_json::from_str(r#"{"nombre": "Fecha", "tipo_generacion": "automatica"}"#)
                .unwrap();
        assert_eq!(m.tipo_generacion, TipoGeneracion::Automatico);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["tipo_generacion"], "automatico");
    }
}
