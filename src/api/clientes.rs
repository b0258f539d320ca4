//! Clients (`/clientes`), their departments and per-department alert schedules.

use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::{require, ApiError, ValidationError};
use crate::services::confirm::{Confirmed, ResourceKind};
use crate::types::{null_as_default, ListParams, Page};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Tax id (CIF/NIF)
    #[serde(default)]
    pub cif: String,
    #[serde(default)]
    pub razon_social: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub localidad: Option<String>,
    #[serde(default)]
    pub provincia: Option<String>,
    #[serde(default)]
    pub codigo_postal: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub departamentos: Vec<Departamento>,
}

impl Cliente {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("cif", &self.cif)?;
        require("razon_social", &self.razon_social)?;
        if let Some(cp) = self.codigo_postal.as_deref().filter(|c| !c.is_empty()) {
            if cp.len() != 5 || !cp.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::invalid(
                    "codigo_postal",
                    "debe tener 5 dígitos",
                ));
            }
        }
        Ok(())
    }
}

/// Cost-center sub-unit of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Departamento {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub cliente_id: Option<u32>,
    /// Cost-center code
    #[serde(default)]
    pub codigo: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuracion_aviso: Option<ConfiguracionAviso>,
}

impl Departamento {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("codigo", &self.codigo)?;
        require("nombre", &self.nombre)?;
        if let Some(config) = &self.configuracion_aviso {
            config.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicidad {
    Horas,
    #[default]
    Dias,
    Semanas,
}

/// One alert rule: whether it fires, how often, and at what time of day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReglaAviso {
    #[serde(default)]
    pub habilitado: bool,
    #[serde(default)]
    pub periodicidad: Periodicidad,
    #[serde(default)]
    pub valor: u32,
    /// Send time `HH:MM`
    #[serde(default)]
    pub hora: Option<String>,
}

impl ReglaAviso {
    fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        if let Some(hora) = self.hora.as_deref().filter(|h| !h.is_empty()) {
            if chrono::NaiveTime::parse_from_str(hora, "%H:%M").is_err() {
                return Err(ValidationError::invalid(field, "hora debe ser HH:MM"));
            }
        }
        if self.habilitado && self.valor == 0 {
            return Err(ValidationError::invalid(
                field,
                "el valor debe ser mayor que cero",
            ));
        }
        Ok(())
    }
}

/// Department notification schedule: three independent rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguracionAviso {
    #[serde(default)]
    pub vence_hoy: ReglaAviso,
    #[serde(default)]
    pub proximo_vencimiento: ReglaAviso,
    #[serde(default)]
    pub vencido: ReglaAviso,
}

impl ConfiguracionAviso {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.vence_hoy.validate("vence_hoy")?;
        self.proximo_vencimiento.validate("proximo_vencimiento")?;
        self.vencido.validate("vencido")?;
        Ok(())
    }

    pub fn any_enabled(&self) -> bool {
        self.vence_hoy.habilitado || self.proximo_vencimiento.habilitado || self.vencido.habilitado
    }
}

// ============================================================================
// Endpoints
// ============================================================================

impl ApiClient {
    pub async fn list_clientes(&self, params: &ListParams) -> Result<Page<Cliente>, ApiError> {
        self.list("clientes", params, &[]).await
    }

    pub async fn get_cliente(&self, id: u32) -> Result<Cliente, ApiError> {
        self.get_json(&format!("clientes/{}", id), &[]).await
    }

    pub async fn create_cliente(&self, cliente: &Cliente) -> Result<Cliente, ApiError> {
        cliente.validate()?;
        self.post_json("clientes", cliente).await
    }

    pub async fn update_cliente(&self, id: u32, cliente: &Cliente) -> Result<Cliente, ApiError> {
        cliente.validate()?;
        self.put_json(&format!("clientes/{}", id), cliente).await
    }

    pub async fn delete_cliente(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Cliente)?;
        self.delete(&format!("clientes/{}", id)).await
    }

    pub async fn list_departamentos(
        &self,
        cliente_id: u32,
        params: &ListParams,
    ) -> Result<Page<Departamento>, ApiError> {
        self.list(
            "clientes/departamentos",
            params,
            &[("cliente_id", cliente_id.to_string())],
        )
        .await
    }

    pub async fn create_departamento(
        &self,
        departamento: &Departamento,
    ) -> Result<Departamento, ApiError> {
        departamento.validate()?;
        if departamento.cliente_id.is_none() {
            return Err(ValidationError::required("cliente_id").into());
        }
        self.post_json("clientes/departamentos", departamento).await
    }

    pub async fn update_departamento(
        &self,
        id: u32,
        departamento: &Departamento,
    ) -> Result<Departamento, ApiError> {
        departamento.validate()?;
        self.put_json(&format!("clientes/departamentos/{}", id), departamento).await
    }

    pub async fn delete_departamento(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Departamento)?;
        self.delete(&format!("clientes/departamentos/{}", id)).await
    }

    /// Alert schedule of a department. Departments without one get the default (all disabled).
    pub async fn get_configuracion_aviso(
        &self,
        departamento_id: u32,
    ) -> Result<ConfiguracionAviso, ApiError> {
        let path = format!("clientes/departamentos/{}/configuracion-aviso", departamento_id);
        match self.get_json(&path, &[]).await {
            Err(ApiError::NotFound(_)) => Ok(ConfiguracionAviso::default()),
            other => other,
        }
    }

    pub async fn update_configuracion_aviso(
        &self,
        departamento_id: u32,
        config: &ConfiguracionAviso,
    ) -> Result<ConfiguracionAviso, ApiError> {
        config.validate()?;
        let path = format!("clientes/departamentos/{}/configuracion-aviso", departamento_id);
        self.put_json(&path, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cliente_requires_cif_and_name() {
        let mut cliente = Cliente {
            razon_social: "Acme SL".into(),
            ..Default::default()
        };
        assert_eq!(cliente.validate().unwrap_err().field, "cif");
        cliente.cif = "B12345678".into();
        assert!(cliente.validate().is_ok());
    }

    #[test]
    fn test_cliente_postal_code() {
        let cliente = Cliente {
            cif: "B1".into(),
            razon_social: "Acme".into(),
            codigo_postal: Some("2800".into()),
            ..Default::default()
        };
        assert_eq!(cliente.validate().unwrap_err().field, "codigo_postal");
    }

    #[test]
    fn test_cliente_deserializes_nested_departamentos() {
        let json = r#"{
            "id": 7, "cif": "B1", "razon_social": "Acme",
            "departamentos": [{ "id": 1, "codigo": "CC01", "nombre": "Nóminas" }]
        }"#;
        let cliente: Cliente = serde_json::from_str(json).unwrap();
        assert_eq!(cliente.departamentos.len(), 1);
        assert_eq!(cliente.departamentos[0].codigo, "CC01");
        assert!(cliente.departamentos[0].configuracion_aviso.is_none());
    }

    #[test]
    fn test_new_cliente_omits_id() {
        let value = serde_json::to_value(Cliente::default()).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("departamentos").is_none());
    }

    #[test]
    fn test_aviso_validation() {
        let mut config = ConfiguracionAviso::default();
        assert!(config.validate().is_ok());
        assert!(!config.any_enabled());

        config.vencido = ReglaAviso {
            habilitado: true,
            periodicidad: Periodicidad::Dias,
            valor: 0,
            hora: Some("09:00".into()),
        };
        assert_eq!(config.validate().unwrap_err().field, "vencido");

        config.vencido.valor = 2;
        config.vence_hoy.hora = Some("25:00".into());
        assert_eq!(config.validate().unwrap_err().field, "vence_hoy");
    }

    #[test]
    fn test_aviso_periodicidad_wire_format() {
        let regla: ReglaAviso =
            serde_json::from_str(r#"{"habilitado":true,"periodicidad":"semanas","valor":1}"#)
                .unwrap();
        assert_eq!(regla.periodicidad, Periodicidad::Semanas);
    }
}
