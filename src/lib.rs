pub mod cache;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod gemini;
pub mod groq;
pub mod http;
pub mod index;
pub mod llm;
pub mod parsers;
pub mod rag;
pub mod service;

#[cfg(test)]
mod testing;
