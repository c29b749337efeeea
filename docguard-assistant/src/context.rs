//! Prompt context assembly from retrieved documents.
//!
//! All lengths are counted in characters and every cut lands on a char
//! boundary.

use docguard_rag::Document;

use crate::config::ContextConfig;

/// Appended to a document cut at `max_chars_per_doc`.
pub const DOC_TRUNCATED: &str = "\n…[TRUNCATED]";

/// Appended to the last block when the context budget runs out.
pub const CONTEXT_TRUNCATED: &str = "\n…[CONTEXT TRUNCATED]";

const BLOCK_SEPARATOR: &str = "\n\n";
const BLOCK_BOUNDARY: &str = "\n\n[DOC";

/// The first `n` characters of `s`.
pub(crate) fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render documents as numbered `[DOC i] source=<src>` blocks.
///
/// Blocks are added while they fit `max_context_chars`; the block that
/// overflows is cut and marked, and nothing after it is included.
pub fn format_documents<'a, I>(docs: I, config: &ContextConfig) -> String
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut blocks: Vec<String> = Vec::new();
    let mut total = 0usize;

    for (i, doc) in docs.into_iter().enumerate() {
        let text = if doc.char_len() > config.max_chars_per_doc {
            format!("{}{DOC_TRUNCATED}", prefix_chars(&doc.content, config.max_chars_per_doc).trim_end())
        } else {
            doc.content.clone()
        };
        let block = format!("[DOC {}] source={}\n{}", i + 1, doc.source_or_unknown(), text);
        let block_len = block.chars().count();

        if total + block_len > config.max_context_chars {
            let remain = config.max_context_chars.saturating_sub(total);
            if remain > 0 {
                blocks.push(format!("{}{CONTEXT_TRUNCATED}", prefix_chars(&block, remain).trim_end()));
            }
            break;
        }

        total += block_len + BLOCK_SEPARATOR.len();
        blocks.push(block);
    }

    blocks.join(BLOCK_SEPARATOR)
}

/// Cap `context` at `limit` characters.
///
/// Prefers cutting at the last document boundary before `limit`, as long as
/// that keeps at least half the limit; otherwise cuts at `limit` exactly.
pub fn trim_context(context: &str, limit: usize) -> &str {
    let hard = prefix_chars(context, limit);
    if hard.len() == context.len() {
        return context;
    }
    match hard.rfind(BLOCK_BOUNDARY) {
        Some(cut) if hard[..cut].chars().count() * 2 >= limit => hard[..cut].trim_end(),
        _ => hard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(per_doc: usize, total: usize) -> ContextConfig {
        ContextConfig { max_chars_per_doc: per_doc, max_context_chars: total, ..Default::default() }
    }

    #[test]
    fn formats_numbered_blocks_with_sources() {
        let docs = vec![Document::new("alpha").with_source("a.pdf"), Document::new("beta")];
        let out = format_documents(&docs, &ContextConfig::default());
        assert_eq!(out, "[DOC 1] source=a.pdf\nalpha\n\n[DOC 2] source=unknown\nbeta");
    }

    #[test]
    fn cuts_long_documents_on_char_boundaries() {
        let docs = vec![Document::new("가나다라마바").with_source("k")];
        let out = format_documents(&docs, &config(3, 1000));
        assert_eq!(out, "[DOC 1] source=k\n가나다\n…[TRUNCATED]");
    }

    #[test]
    fn stops_at_context_budget() {
        let docs = vec![
            Document::new("x".repeat(20)).with_source("a"),
            Document::new("y".repeat(20)).with_source("b"),
            Document::new("z".repeat(20)).with_source("c"),
        ];
        // First block is 37 chars; the second overflows a 70-char budget.
        let out = format_documents(&docs, &config(900, 70));
        let blocks: Vec<&str> = out.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].starts_with("[DOC 2] source=b"));
        assert!(blocks[1].ends_with(CONTEXT_TRUNCATED));
        assert!(!out.contains("[DOC 3]"));
    }

    #[test]
    fn trim_keeps_short_context() {
        assert_eq!(trim_context("short", 100), "short");
    }

    #[test]
    fn trim_prefers_doc_boundary() {
        let context = format!("[DOC 1] source=a\n{}\n\n[DOC 2] source=b\n{}", "a".repeat(60), "b".repeat(60));
        let trimmed = trim_context(&context, 100);
        assert_eq!(trimmed, format!("[DOC 1] source=a\n{}", "a".repeat(60)));
    }

    #[test]
    fn trim_hard_cuts_when_boundary_too_early() {
        let context = format!("[DOC 1] a\n\n[DOC 2] {}", "b".repeat(200));
        let trimmed = trim_context(&context, 100);
        assert_eq!(trimmed.chars().count(), 100);
        assert!(context.starts_with(trimmed));
    }
}
