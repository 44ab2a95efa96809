//! Answer synthesis from retrieved context.
//!
//! Assembles a prompt from the question and the retrieved chunk texts,
//! invokes the generation service once, and attaches a deduplicated,
//! first-seen-order citation list derived from chunk provenance. The
//! retrieval step and this synthesis step are deliberately separate
//! operations so each can be exercised on its own.

use std::collections::HashSet;

use crate::error::PipelineError;
use crate::generation::Generator;
use crate::models::{Answer, RetrievedChunk};

/// Synthesize an answer for `question` grounded in `retrieved`.
///
/// With zero retrieved chunks the generation service is still invoked, but
/// the returned [`Answer`] is marked ungrounded so the presentation layer
/// can say so instead of passing the text off as corpus-backed.
pub async fn answer_with_context(
    generator: &dyn Generator,
    question: &str,
    retrieved: &[RetrievedChunk],
) -> Result<Answer, PipelineError> {
    let prompt = build_prompt(question, retrieved);
    let text = generator.generate(&prompt).await?;

    Ok(Answer {
        text,
        citations: collect_citations(retrieved),
        grounded: !retrieved.is_empty(),
    })
}

fn build_prompt(question: &str, retrieved: &[RetrievedChunk]) -> String {
    let context = retrieved
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an expert agricultural assistant helping farmers with practical advice.\n\
         \n\
         User Question: {question}\n\
         \n\
         Here is some relevant information from agricultural resources:\n\
         {context}\n\
         \n\
         Based on the above context and your knowledge about agriculture, provide a detailed, \
         helpful, and accurate response. If the context doesn't contain enough information \
         to fully answer the question, say so clearly and provide general best practices.\n\
         \n\
         Remember to:\n\
         - Cite specific data from the context when available\n\
         - Provide actionable advice that farmers can implement\n\
         - Use clear, non-technical language accessible to all farming backgrounds\n\
         - Organize your response with appropriate headings if the answer is complex\n\
         \n\
         Your helpful response:"
    )
}

/// Each distinct (source, page) pair exactly once, in first-seen order.
pub fn collect_citations(retrieved: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();
    for chunk in retrieved {
        let label = citation_label(&chunk.source, chunk.page);
        if seen.insert(label.clone()) {
            citations.push(label);
        }
    }
    citations
}

/// `"pest.pdf (Page 1)"` for paged sources, the bare file name otherwise.
pub fn citation_label(source: &str, page: Option<u32>) -> String {
    match page {
        Some(p) => format!("{} (Page {})", source, p),
        None => source.to_string(),
    }
}
