//! Property tests for confidence scoring, guardrail ordering and command validation.

use docguard_guardrail::{
    CommandAction, CommandRejection, CommandResponse, CommandValidator, CommandWhitelist,
    ConfidenceEngine, GuardReason, GuardrailPolicy,
};
use docguard_rag::{Document, ScoredDocument};
use proptest::prelude::*;

/// **Property 1: Normalization is bounded and non-increasing**
/// *For any* two distances `a <= b`, `normalize(a)` SHALL lie in `[0, 1]`
/// and be at least `normalize(b)`.
mod prop_normalize_monotone {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn bounded_and_non_increasing(a in -1.0f64..2.0, b in -1.0f64..2.0) {
            let engine = ConfidenceEngine::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let (n_lo, n_hi) = (engine.normalize(lo), engine.normalize(hi));
            prop_assert!((0.0..=1.0).contains(&n_lo));
            prop_assert!((0.0..=1.0).contains(&n_hi));
            prop_assert!(n_lo >= n_hi, "normalize({lo}) = {n_lo} < normalize({hi}) = {n_hi}");
        }
    }
}

/// **Property 2: Good-hit bonus is non-decreasing and capped**
/// *For any* counts `m <= n`, `hits_bonus(m) <= hits_bonus(n) <= 0.15`.
mod prop_bonus_monotone {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn non_decreasing_and_capped(m in 0usize..50, n in 0usize..50) {
            let (lo, hi) = if m <= n { (m, n) } else { (n, m) };
            prop_assert!(ConfidenceEngine::hits_bonus(lo) <= ConfidenceEngine::hits_bonus(hi));
            prop_assert!(ConfidenceEngine::hits_bonus(hi) <= 0.15);
        }
    }
}

/// **Property 3: Score blends base and bonus within bounds**
/// *For any* top distance and good-hit count, the score SHALL equal
/// `min(normalize(top) + bonus, 1.0)` and lie in `[0, 1]`.
mod prop_score_blend {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn score_is_capped_sum(top in 0.0f64..1.5, good_hits in 0usize..10) {
            let engine = ConfidenceEngine::default();
            let result = engine.calculate(top, good_hits);
            let expected = (engine.normalize(top) + ConfidenceEngine::hits_bonus(good_hits)).min(1.0);
            prop_assert_eq!(result.score, expected);
            prop_assert!((0.0..=1.0).contains(&result.score));
        }
    }
}

/// **Property 4: Refusals before `ok`**
/// *For any* non-empty result list whose first distance exceeds
/// `top_score_max`, the decision SHALL be `low_confidence` regardless of the
/// rest of the list; an empty list SHALL always be `no_results`.
mod prop_guardrail_order {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn weak_top_hit_is_low_confidence(
            top in 0.36f64..3.0,
            rest in proptest::collection::vec((0.0f64..1.0, 1usize..600), 0..8),
        ) {
            let mut results = vec![ScoredDocument::new(Document::new("top"), top)];
            results.extend(
                rest.iter().map(|(d, len)| ScoredDocument::new(Document::new("x".repeat(*len)), *d)),
            );
            let policy = GuardrailPolicy::default();
            prop_assert_eq!(policy.evaluate(&results).reason, GuardReason::LowConfidence);
            prop_assert_eq!(policy.evaluate(&[]).reason, GuardReason::NoResults);
        }
    }
}

fn arb_action() -> impl Strategy<Value = CommandAction> {
    let names = prop_oneof![
        Just("OpenUrl"),
        Just("Navigate"),
        Just("PlaySound"),
        Just("FormatDisk"),
        Just("SendEmail"),
    ];
    let args = prop_oneof![Just("url"), Just("route"), Just("soundId"), Just("title")];
    (names, proptest::collection::vec(args, 0..3)).prop_map(|(name, args)| {
        args.into_iter().fold(CommandAction::new(name), |action, arg| action.with_arg(arg, "v"))
    })
}

/// **Property 5: Validation is all-or-nothing**
/// *For any* action list, the response SHALL be accepted iff every action is
/// whitelisted with all of its required arguments, and a rejection SHALL name
/// an action that is actually present.
mod prop_validator_all_or_nothing {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn accepted_iff_every_action_valid(actions in proptest::collection::vec(arb_action(), 0..6)) {
            let whitelist = CommandWhitelist::default();
            let all_valid = actions.iter().all(|a| {
                whitelist
                    .required_args(&a.name)
                    .is_some_and(|req| req.iter().all(|r| a.args.contains_key(r)))
            });

            let response = CommandResponse::new("s", actions.clone());
            match CommandValidator::new(whitelist).validate(&response) {
                Ok(()) => prop_assert!(all_valid),
                Err(rejection) => {
                    prop_assert!(!all_valid);
                    prop_assert!(actions.iter().any(|a| a.name == rejection.command()));
                    if let CommandRejection::MissingArgument { argument, .. } = &rejection {
                        prop_assert!(rejection.to_string().ends_with(argument.as_str()));
                    }
                }
            }
        }
    }
}
