//! Document management: categories → documents → uploaded files.
//!
//! Files are opaque blobs: uploaded as `multipart/form-data` and fetched
//! back from a dedicated download path.

use serde::{Deserialize, Serialize};

use super::{file_part, ApiClient, Blob};
use crate::error::{require, ApiError, ValidationError};
use crate::services::confirm::{Confirmed, ResourceKind};
use crate::types::{ListParams, Page};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentalCategoria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentalDocumento {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub categoria_id: Option<u32>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// A file stored in a client's folder for a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentalCarpetaDocumento {
    pub id: u32,
    #[serde(default)]
    pub documento_id: Option<u32>,
    #[serde(default)]
    pub cliente_id: Option<u32>,
    #[serde(default)]
    pub nombre_archivo: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub tamano: Option<u64>,
    #[serde(default)]
    pub fecha_subida: Option<String>,
}

/// A file to upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub documento_id: u32,
    pub cliente_id: u32,
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read a file from disk, guessing the MIME type from its extension.
    pub async fn from_path(
        documento_id: u32,
        cliente_id: u32,
        path: &std::path::Path,
    ) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ValidationError::invalid("archivo", "ruta sin nombre de archivo"))?;
        Ok(Self {
            documento_id,
            cliente_id,
            mime_type: mime_guess::from_path(path).first_raw().map(str::to_string),
            filename,
            bytes,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("archivo", &self.filename)?;
        if self.bytes.is_empty() {
            return Err(ValidationError::invalid("archivo", "el archivo está vacío"));
        }
        Ok(())
    }
}

impl ApiClient {
    // Categories

    pub async fn list_categorias(
        &self,
        params: &ListParams,
    ) -> Result<Page<DocumentalCategoria>, ApiError> {
        self.list("documental-categorias", params, &[]).await
    }

    pub async fn create_categoria(
        &self,
        categoria: &DocumentalCategoria,
    ) -> Result<DocumentalCategoria, ApiError> {
        require("nombre", &categoria.nombre)?;
        self.post_json("documental-categorias", categoria).await
    }

    pub async fn update_categoria(
        &self,
        id: u32,
        categoria: &DocumentalCategoria,
    ) -> Result<DocumentalCategoria, ApiError> {
        require("nombre", &categoria.nombre)?;
        self.put_json(&format!("documental-categorias/{}", id), categoria).await
    }

    pub async fn delete_categoria(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Categoria)?;
        self.delete(&format!("documental-categorias/{}", id)).await
    }

    // Documents

    pub async fn list_documentos(
        &self,
        categoria_id: Option<u32>,
        params: &ListParams,
    ) -> Result<Page<DocumentalDocumento>, ApiError> {
        let extra: Vec<(&str, String)> = categoria_id
            .map(|id| vec![("categoria_id", id.to_string())]).unwrap_or_default();
        self.list("documental-documentos", params, &extra).await
    }

    pub async fn get_documento(&self, id: u32) -> Result<DocumentalDocumento, ApiError> {
        self.get_json(&format!("documental-documentos/{}", id), &[]).await
    }

    pub async fn create_documento(
        &self,
        documento: &DocumentalDocumento,
    ) -> Result<DocumentalDocumento, ApiError> {
        require("nombre", &documento.nombre)?;
        if documento.categoria_id.is_none() {
            return Err(ValidationError::required("categoria_id").into());
        }
        self.post_json("documental-documentos", documento).await
    }

    pub async fn update_documento(
        &self,
        id: u32,
        documento: &DocumentalDocumento,
    ) -> Result<DocumentalDocumento, ApiError> {
        require("nombre", &documento.nombre)?;
        self.put_json(&format!("documental-documentos/{}", id), documento).await
    }

    pub async fn delete_documento(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Documento)?;
        self.delete(&format!("documental-documentos/{}", id)).await
    }

    // Folder files

    pub async fn list_archivos(
        &self,
        documento_id: u32,
        cliente_id: u32,
        params: &ListParams,
    ) -> Result<Page<DocumentalCarpetaDocumento>, ApiError> {
        self.list(
            "documental-carpeta-documentos",
            params,
            &[
                ("documento_id", documento_id.to_string()),
                ("cliente_id", cliente_id.to_string()),
            ],
        )
        .await
    }

    pub async fn upload_archivo(
        &self,
        upload: Upload,
    ) -> Result<DocumentalCarpetaDocumento, ApiError> {
        upload.validate()?;
        log::info!(
            "Uploading '{}' ({} bytes) to documento {}",
            upload.filename,
            upload.bytes.len(),
            upload.documento_id
        );
        let part = file_part(upload.bytes, &upload.filename, upload.mime_type.as_deref())?;
        let form = reqwest::multipart::Form::new()
            .text("documento_id", upload.documento_id.to_string())
            .text("cliente_id", upload.cliente_id.to_string()).part("file", part);
        self.post_multipart("documental-carpeta-documentos/upload", form).await
    }

    pub async fn download_archivo(&self, id: u32) -> Result<Blob, ApiError> {
        self.download(&format!("documental-carpeta-documentos/{}/download", id)).await
    }

    pub async fn delete_archivo(&self, confirmed: Confirmed) -> Result<(), ApiError> {
        let id = confirmed.id_for(ResourceKind::Archivo)?;
        self.delete(&format!("documental-carpeta-documentos/{}", id)).await
    }
}
