//! # Farm Advisor
//!
//! A retrieval-augmented question answering assistant for agricultural
//! advice.
//!
//! Farm Advisor ingests a corpus of agricultural reference material (PDF,
//! plain text, CSV), chunks and embeds it into a persisted vector index,
//! and answers farmer questions by retrieving the most similar passages
//! and asking a language model to compose a cited answer. A second path
//! turns a location/crop/hemisphere triple into seasonal farming advice
//! from the same model, with no retrieval involved.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌───────────┐
//! │  Corpus  │──▶│  Pipeline    │──▶│  SQLite    │
//! │ PDF/txt/ │   │ Chunk+Embed │   │  vector    │
//! │   csv    │   │             │   │  index     │
//! └──────────┘   └─────────────┘   └────┬──────┘
//!                                       │ query
//!                  ┌────────────────────┤
//!                  ▼                    ▼
//!             ┌─────────┐        ┌────────────┐
//!             │ Season  │        │  Answer     │
//!             │ advice  │        │ + citations │
//!             └─────────┘        └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! fad build                                # embed the corpus into the index
//! fad ask "How do I manage pests?"         # cited, corpus-grounded answer
//! fad search "irrigation" --k 3            # inspect raw retrieval
//! fad advise --location "US Midwest" --crop corn
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | Corpus loading (PDF pages, text files, CSV rows) |
//! | [`chunk`] | Overlapping character-window chunking |
//! | [`embedding`] | Embedding provider abstraction (Gemini, Ollama) |
//! | [`generation`] | Generation provider abstraction (Gemini, Ollama) |
//! | [`index`] | SQLite-backed vector index: build, open, query |
//! | [`season`] | Calendar-season resolution per hemisphere |
//! | [`answer`] | Prompt assembly, synthesis, citations |
//! | [`advise`] | Seasonal advice prompt and call |
//! | [`advisor`] | Caller-constructed pipeline context |
//! | [`error`] | Typed pipeline errors |

pub mod advise;
pub mod advisor;
pub mod answer;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod loader;
pub mod models;
pub mod season;
