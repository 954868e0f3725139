use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    errors::AppError,
    export::{
        docx::render_docx, filename_slug, pdf::render_pdf, ExportDocument, DOCX_CONTENT_TYPE,
        PDF_CONTENT_TYPE,
    },
    resumes::services::load_owned,
    sections::ensure_sections,
    state::AppState,
};

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/resumes/:id/export/pdf", get(export_pdf))
        .route("/resumes/:id/export/docx", get(export_docx))
}

/// Owned resume with reconciled sections; an unreadable photo is left out.
async fn load_document(state: &AppState, id: Uuid, user_id: Uuid) -> Result<ExportDocument, AppError> {
    let resume = load_owned(&state.db, id, user_id).await?;
    let (sections, _) = ensure_sections(state.sections.as_ref(), resume.id).await?;

    let photo = match resume.photo_key.as_deref() {
        Some(key) => match state.storage.get_object(key).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, resume_id = %resume.id, "photo unavailable for export");
                None
            }
        },
        None => None,
    };
    Ok(ExportDocument::new(&resume.title, photo, &sections))
}

fn attachment(body: Vec<u8>, content_type: &'static str, filename: String) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn export_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let doc = load_document(&state, id, user_id).await?;
    let bytes = render_pdf(&doc)?;
    info!(resume_id = %id, bytes = bytes.len(), "pdf exported");
    attachment(bytes, PDF_CONTENT_TYPE, format!("{}.pdf", filename_slug(&doc.title)))
}

#[instrument(skip(state))]
pub async fn export_docx(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let doc = load_document(&state, id, user_id).await?;
    let bytes = render_docx(&doc)?;
    info!(resume_id = %id, bytes = bytes.len(), "docx exported");
    attachment(bytes, DOCX_CONTENT_TYPE, format!("{}.docx", filename_slug(&doc.title)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample;

    #[tokio::test]
    async fn attachment_sets_download_headers() {
        let doc = sample("My CV", "C");
        let resp = attachment(render_pdf(&doc).unwrap(), PDF_CONTENT_TYPE, "my-cv.pdf".into()).unwrap();
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"my-cv.pdf\""
        );
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }
}
