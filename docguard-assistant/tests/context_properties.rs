//! Property tests for prompt context assembly.

use docguard_assistant::context::CONTEXT_TRUNCATED;
use docguard_assistant::{ContextConfig, format_documents, trim_context};
use docguard_rag::Document;
use proptest::prelude::*;

/// **Property 1: Formatted context respects its budget**
/// *For any* documents and limits, the formatted context SHALL be at most
/// `max_context_chars` plus the truncation marker, and blocks SHALL be
/// numbered in order.
mod prop_format_budget {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn bounded_and_numbered(
            texts in proptest::collection::vec("[a-zé ]{0,120}", 0..10),
            per_doc in 1usize..200,
            budget in 1usize..600,
        ) {
            let docs: Vec<Document> =
                texts.iter().map(|t| Document::new(t.clone()).with_source("s")).collect();
            let config = ContextConfig {
                max_chars_per_doc: per_doc,
                max_context_chars: budget,
                ..Default::default()
            };
            let out = format_documents(&docs, &config);

            let marker = CONTEXT_TRUNCATED.chars().count();
            prop_assert!(out.chars().count() <= budget + marker);
            for (i, block) in out.split("\n\n[DOC ").enumerate() {
                if i == 0 {
                    prop_assert!(block.is_empty() || block.starts_with('['));
                } else {
                    prop_assert!(block.starts_with(&(i + 1).to_string()));
                }
            }
        }
    }
}

/// **Property 2: Trimming yields a bounded prefix**
/// *For any* context and limit, `trim_context` SHALL return a prefix of the
/// input of at most `limit` characters, and the input itself when it fits.
mod prop_trim_prefix {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prefix_within_limit(
            parts in proptest::collection::vec("[a-z가-힣 ]{0,80}", 0..8),
            limit in 1usize..400,
        ) {
            let context = parts
                .iter()
                .enumerate()
                .map(|(i, p)| format!("[DOC {}] source=s\n{p}", i + 1))
                .collect::<Vec<_>>()
                .join("\n\n");
            let trimmed = trim_context(&context, limit);

            prop_assert!(context.starts_with(trimmed));
            prop_assert!(trimmed.chars().count() <= limit);
            if context.chars().count() <= limit {
                prop_assert_eq!(trimmed, context.as_str());
            }
        }
    }
}
