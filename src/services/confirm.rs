// Typed confirmation flow for destructive operations.
// Delete endpoints take a `Confirmed` token, which can only be obtained by
// calling `confirm()` on a pending `Confirmation`.

use crate::error::{ApiError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Cliente,
    Departamento,
    Categoria,
    Documento,
    Archivo,
    Metadato,
    Persona,
}

impl ResourceKind {
    fn label(&self) -> &'static str {
        match self {
            ResourceKind::Cliente => "el cliente",
            ResourceKind::Departamento => "el departamento",
            ResourceKind::Categoria => "la categoría",
            ResourceKind::Documento => "el documento",
            ResourceKind::Archivo => "el archivo",
            ResourceKind::Metadato => "el metadato",
            ResourceKind::Persona => "la persona",
        }
    }
}

/// A destructive action awaiting the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Confirmation {
    kind: ResourceKind,
    id: u32,
    name: String,
}

/// Proof that the user accepted a `Confirmation`.
#[derive(Debug, PartialEq, Eq)]
pub struct Confirmed {
    kind: ResourceKind,
    id: u32,
}

impl Confirmation {
    pub fn delete(kind: ResourceKind, id: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }

    /// Question shown to the user.
    pub fn prompt(&self) -> String {
        if self.name.trim().is_empty() {
            format!("¿Eliminar {} #{}? Esta acción no se puede deshacer.", self.kind.label(), self.id)
        } else {
            format!(
                "¿Eliminar {} \"{}\"? Esta acción no se puede deshacer.",
                self.kind.label(),
                self.name
            )
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn confirm(self) -> Confirmed {
        log::debug!("Confirmed delete of {:?} {}", self.kind, self.id);
        Confirmed {
            kind: self.kind,
            id: self.id,
        }
    }

    pub fn decline(self) {
        log::debug!("Declined delete of {:?} {}", self.kind, self.id);
    }
}

impl Confirmed {
    /// The confirmed id, provided it was confirmed for `kind`.
    pub fn id_for(&self, kind: ResourceKind) -> Result<u32, ApiError> {
        if self.kind == kind {
            Ok(self.id)
        } else {
            Err(ValidationError::invalid(
                "confirmacion",
                format!("se confirmó {:?}, no {:?}", self.kind, kind),
            )
            .into())
        }
    }
}
