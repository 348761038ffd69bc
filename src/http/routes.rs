//! Content generation endpoints.
//!
//! Every handler stores the upload in a temp file, runs one or more
//! [`GenerationService`] calls against it and lets the temp file drop.

use crate::http::error::{AppError, AppResult};
use crate::http::upload::UploadedPdf;
use crate::http::AppState;
use crate::parsers::{Flashcard, KeyConcept, Quiz};
use crate::service::{GenerationService, KEY_CONCEPTS_PROMPT, SUMMARY_PROMPT};
use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub key_concepts: Vec<KeyConcept>,
    pub topics: Vec<String>,
    pub quizzes: Vec<Quiz>,
}

#[derive(Debug, Serialize)]
pub struct ConceptDetailsResponse {
    pub concept: String,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct QuizzesResponse {
    pub concept: String,
    pub quizzes: Vec<Quiz>,
}

#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub concept: String,
    pub flashcards: Vec<Flashcard>,
}

async fn receive(state: &AppState, multipart: Multipart) -> AppResult<UploadedPdf> {
    UploadedPdf::from_multipart(multipart, state.upload_dir.as_deref()).await
}

fn service_for(state: &AppState, upload: &UploadedPdf) -> GenerationService {
    GenerationService::new(upload.path(), state.pipeline.clone(), state.index_cache_ttl)
}

/// One multiple-choice item per key concept, with the concept as first option
fn topic_quizzes(key_concepts: &[KeyConcept]) -> Vec<Quiz> {
    key_concepts
        .iter()
        .map(|kc| {
            Quiz::with_options(
                format!("What is the meaning of '{}'?", kc.key_concept),
                vec![
                    kc.key_concept.clone(),
                    "Option 2".to_string(),
                    "Option 3".to_string(),
                    "Option 4".to_string(),
                ],
            )
        })
        .collect()
}

/// Handler: POST /content/generate_summary
pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<SummaryResponse>> {
    let upload = receive(&state, multipart).await?;
    let service = service_for(&state, &upload);
    let on_error = "Error processing file";

    let summary = service
        .get_summary(SUMMARY_PROMPT)
        .await
        .map_err(AppError::processing(on_error))?;
    let key_concepts = service
        .get_key_concepts(KEY_CONCEPTS_PROMPT)
        .await
        .map_err(AppError::processing(on_error))?;

    let topics = key_concepts
        .iter()
        .map(|kc| kc.key_concept.clone())
        .collect();
    let quizzes = topic_quizzes(&key_concepts);
    info!("Generated summary with {} key concepts", key_concepts.len());

    Ok(Json(SummaryResponse {
        summary,
        key_concepts,
        topics,
        quizzes,
    }))
}

/// Handler: POST /content/get_key_concept_details
pub async fn get_key_concept_details(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<ConceptDetailsResponse>> {
    let upload = receive(&state, multipart).await?;
    let concept = upload.concept()?.to_string();

    let details = service_for(&state, &upload)
        .get_key_concept_details(&concept)
        .await
        .map_err(AppError::processing("Error processing key concept details"))?;

    Ok(Json(ConceptDetailsResponse { concept, details }))
}

/// Handler: POST /content/generate_quizzes
pub async fn generate_quizzes(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<QuizzesResponse>> {
    let upload = receive(&state, multipart).await?;
    let concept = upload.concept()?.to_string();

    let quizzes = service_for(&state, &upload)
        .generate_quizzes_for_key_concept(&concept)
        .await
        .map_err(AppError::processing(
            "Error generating quizzes for key concept",
        ))?;

    Ok(Json(QuizzesResponse { concept, quizzes }))
}

/// Handler: POST /content/generate_flashcards
pub async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<FlashcardsResponse>> {
    let upload = receive(&state, multipart).await?;
    let concept = upload.concept()?.to_string();

    let flashcards = service_for(&state, &upload)
        .generate_flashcards_for_key_concept(&concept)
        .await
        .map_err(AppError::processing(
            "Error generating flashcards for key concept",
        ))?;

    Ok(Json(FlashcardsResponse {
        concept,
        flashcards,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_quizzes_offer_concept_as_first_option() {
        let quizzes = topic_quizzes(&[KeyConcept {
            key_concept: "TF-IDF".to_string(),
            description: "term weighting".to_string(),
        }]);

        assert_eq!(
            serde_json::to_value(&quizzes).unwrap(),
            json!([{
                "question": "What is the meaning of 'TF-IDF'?",
                "options": ["TF-IDF", "Option 2", "Option 3", "Option 4"]
            }])
        );
    }
}
