//! Turns free-text model answers into study artifacts.
//!
//! The model is asked to emit records as `name: description`, one per line or
//! one per blank-line separated block. Only the first colon separates the two
//! halves. Output that does not follow the format is skipped, never rejected,
//! so an empty result is a valid outcome.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConcept {
    pub key_concept: String,
    pub description: String,
}

/// A quiz question, answered either directly or by choosing an option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    #[serde(flatten)]
    pub response: QuizResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizResponse {
    Answer { answer: String },
    Options { options: Vec<String> },
}

impl Quiz {
    pub fn with_answer(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Quiz {
            question: question.into(),
            response: QuizResponse::Answer {
                answer: answer.into(),
            },
        }
    }

    pub fn with_options(question: impl Into<String>, options: Vec<String>) -> Self {
        Quiz {
            question: question.into(),
            response: QuizResponse::Options { options },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Converts raw model text into artifacts.
///
/// The generation service only depends on this trait, so a stricter output
/// format can replace [`PermissiveParser`] without touching the pipeline.
pub trait ArtifactParser: Send + Sync {
    fn key_concepts(&self, raw: &str) -> Vec<KeyConcept>;
    fn quizzes(&self, raw: &str) -> Vec<Quiz>;
    fn flashcards(&self, raw: &str) -> Vec<Flashcard>;
    fn detail(&self, raw: &str) -> String;
}

/// Line/block parser that skips anything it cannot split
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveParser;

impl ArtifactParser for PermissiveParser {
    fn key_concepts(&self, raw: &str) -> Vec<KeyConcept> {
        parse_key_concepts(raw)
    }

    fn quizzes(&self, raw: &str) -> Vec<Quiz> {
        parse_quizzes(raw)
    }

    fn flashcards(&self, raw: &str) -> Vec<Flashcard> {
        parse_flashcards(raw)
    }

    fn detail(&self, raw: &str) -> String {
        parse_detail(raw)
    }
}

/// Split on the first colon, trimming both halves
fn split_record(record: &str) -> Option<(String, String)> {
    record
        .split_once(':')
        .map(|(name, rest)| (name.trim().to_string(), rest.trim().to_string()))
}

fn blocks(raw: &str) -> Vec<&str> {
    raw.trim().split("\n\n").collect()
}

/// Key concepts live in the second block, one `name: description` per line.
///
/// The first block is the model's preamble. Fewer than two blocks yields an
/// empty list.
pub fn parse_key_concepts(raw: &str) -> Vec<KeyConcept> {
    let Some(block) = blocks(raw).get(1).copied() else {
        return Vec::new();
    };

    block
        .split('\n')
        .filter_map(split_record)
        .map(|(key_concept, description)| KeyConcept {
            key_concept,
            description,
        })
        .collect()
}

/// Each block holding a colon becomes one question/answer quiz
pub fn parse_quizzes(raw: &str) -> Vec<Quiz> {
    blocks(raw)
        .into_iter()
        .filter_map(split_record)
        .map(|(question, answer)| Quiz::with_answer(question, answer))
        .collect()
}

/// Same block format as quizzes
pub fn parse_flashcards(raw: &str) -> Vec<Flashcard> {
    blocks(raw)
        .into_iter()
        .filter_map(split_record)
        .map(|(question, answer)| Flashcard { question, answer })
        .collect()
}

pub fn parse_detail(raw: &str) -> String {
    raw.trim().to_string()
}
