//! People (`/personas`) and admin roles (`/roles`).

use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::error::{require, ApiError, ValidationError};
use crate::services::confirm::{Confirmed, ResourceKind};
use crate::types::{ListParams, Page};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub rol_id: Option<u32>,
}

impl Persona {
    pub fn full_name(&self) -> String {
        match self.apellidos.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(apellidos) => format!("{} {}", self.nombre.trim(), apellidos),
            None => self.nombre.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("nombre", &self.nombre)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            let valid = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                return Err(ValidationError::invalid("email", "formato de email no válido"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rol {
    pub id: u32,
    pub nombre: String,
}

impl ApiClient {
    pub async fn list_personas(&self, params: &ListParams) -> Result<Page<Persona>, ApiError> {
        self.list("personas", params, &[]).await
    }

    pub async fn get_persona(&self, id: u32) -> Result<Persona, ApiError> {
        self.get_json(&format!("personas/{}", id), &[]).await
    }

    pub async fn create_persona(&self, persona: &Persona) -> Result<Persona, ApiError> {
        persona.validate()?;
        self.post_json("personas", persona).await
    }

    pub async fn update_persona(&self, id: u32, persona: &Persona) -> Result<Persona, ApiError> {
        persona.validate()?;
        self.put_json(&format!("personas/{}", id), persona).await
    }

    pub async fn delete_persona(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Persona)?;
        self.delete(&format!("personas/{}", id)).await
    }

    pub async fn list_roles(&self) -> Result<Vec<Rol>, ApiError> {
        let page: Page<Rol> = self.list("roles", &ListParams::default(), &[]).await?;
        Ok(page.data)
    }

    /// Grant or revoke admin rights. Revoking also clears the role id.
    pub async fn set_admin(
        &self,
        persona: &Persona,
        admin: bool,
        rol_id: Option<u32>,
    ) -> Result<Persona, ApiError> {
        let id = persona.id.ok_or_else(|| ValidationError::required("id"))?;
        if admin && rol_id.is_none() {
            return Err(ValidationError::required("rol_id").into());
        }
        let updated = Persona {
            admin,
            rol_id: if admin { rol_id } else { None },
            ..persona.clone()
        };
        log::info!("Setting admin={} for persona {}", admin, id);
        self.update_persona(id, &updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let p = Persona {
            nombre: "Lucía ".into(),
            apellidos: Some("Pérez Gil".into()),
            ..Default::default()
        };
        assert_eq!(p.full_name(), "Lucía Pérez Gil");
        let solo = Persona {
            nombre: "Lucía".into(),
            apellidos: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(solo.full_name(), "Lucía");
    }

    #[test]
    fn test_persona_email_validation() {
        let mut p = Persona {
            nombre: "Ana".into(),
            email: Some("ana.example.com".into()),
            ..Default::default()
        };
        assert_eq!(p.validate().unwrap_err().field, "email");
        p.email = Some("ana@example.com".into());
        assert!(p.validate().is_ok());
    }
}
