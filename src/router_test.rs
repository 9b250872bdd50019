//! End-to-end train/predict scenarios driven through the public
//! facade, with a deterministic embedder injected through the
//! `Embedder` seam.

use std::sync::Arc;

use rstest::rstest;

use crate::config::RouterConfig;
use crate::router::PromptRouter;
use crate::test_fixtures::HashEmbedder;
use crate::validation::{ImproveOutcome, PromptImprover, MAX_PROMPT_CHARS};

const CORPUS: &str = r#"[
    {"model": "fast", "prompts": ["hi there", "yo hello"]},
    {"model": "smart", "prompts": ["explain quantum mechanics", "prove a theorem about primes"]}
]"#;

struct Fixture {
    _dir: tempfile::TempDir,
    router: PromptRouter,
}

impl Fixture {
    /// Router over a temp directory with the hash embedder installed.
    fn new(corpus: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("training_data.json");
        std::fs::write(&corpus_path, corpus).unwrap();

        let mut config = RouterConfig::default().with_model_dir(dir.path().join("models"));
        config.training_data_path = corpus_path;
        config.mlp_hidden_layers = vec![16];
        config.mlp_max_iter = 300;

        let router = PromptRouter::new(config);
        router.cache().set_embedding_model(Arc::new(HashEmbedder::new()));
        Self { _dir: dir, router }
    }

    /// Second router over the same directory, with a fresh cache.
    fn reopen(&self) -> PromptRouter {
        let router = PromptRouter::new(self.router.config().clone());
        router.cache().set_embedding_model(Arc::new(HashEmbedder::new()));
        router
    }

    fn rewrite_corpus(&self, corpus: &str) {
        std::fs::write(&self.router.config().training_data_path, corpus).unwrap();
    }
}

#[test]
fn test_train_reports_example_count() {
    let f = Fixture::new(CORPUS);
    let outcome = f.router.train();
    assert!(outcome.success, "training failed: {}", outcome.message);
    assert_eq!(outcome.message, "4 examples trained");
    assert!(f.router.config().classifier_path.exists());
    assert!(f.router.config().encoder_path.exists());
}

#[test]
fn test_training_prompts_predict_their_own_label() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);

    for (prompt, expected) in [
        ("hi there", "fast"),
        ("yo hello", "fast"),
        ("explain quantum mechanics", "smart"),
        ("prove a theorem about primes", "smart"),
    ] {
        let result = f.router.predict(prompt);
        assert!(result.success, "prediction failed: {:?}", result.error);
        assert_eq!(result.predicted_model.as_deref(), Some(expected));
        // Two labels, so calibrated confidence is at least 1/2.
        assert!(result.confidence.unwrap() >= 0.5);
    }
}

#[test]
fn test_prediction_distribution_is_calibrated() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);

    // Unseen prompt made of fast-class vocabulary only.
    let result = f.router.predict("hi there yo hello");
    assert!(result.success);
    assert_eq!(result.predicted_model.as_deref(), Some("fast"));

    let probabilities = result.probabilities.as_ref().unwrap();
    assert_eq!(probabilities.len(), 2);
    let total: f32 = probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-4, "probabilities sum to {total}");

    // The argmax of the mapping equals the predicted model with the
    // reported confidence.
    let (argmax, &max_p) = probabilities
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .unwrap();
    assert_eq!(Some(argmax.as_str()), result.predicted_model.as_deref());
    assert!((max_p - result.confidence.unwrap()).abs() < 1e-6);

    let ranked = result.ranked(f.router.config().top_n_predictions);
    assert_eq!(ranked[0].0, "fast");
}

#[test]
fn test_predict_before_training_is_not_trained_error() {
    let f = Fixture::new(CORPUS);
    let result = f.router.predict("hi there");
    assert!(!result.success);
    assert!(result.predicted_model.is_none());
    assert!(result.error.as_ref().unwrap().contains("train"));
}

#[rstest]
#[case("")]
#[case("   ")]
fn test_blank_prompts_fail_validation(#[case] prompt: &str) {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);
    let result = f.router.predict(prompt);
    assert!(!result.success);
    assert!(result.error.is_some());
}

#[test]
fn test_over_long_prompt_fails_regardless_of_cache_state() {
    let f = Fixture::new(CORPUS);
    let prompt = "x".repeat(MAX_PROMPT_CHARS + 1);

    let before_training = f.router.predict(&prompt);
    assert!(!before_training.success);
    assert!(before_training.error.as_ref().unwrap().contains("too long"));

    assert!(f.router.train().success);
    let after_training = f.router.predict(&prompt);
    assert!(!after_training.success);
    assert!(after_training.error.as_ref().unwrap().contains("too long"));
}

#[test]
fn test_failed_retrain_keeps_previous_model() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);
    let before = f
        .router
        .cache()
        .get_classifier(&f.router.config().classifier_path)
        .unwrap()
        .unwrap();

    f.rewrite_corpus(r#"[{"model": "fast", "prompts": [""]}]"#);
    let outcome = f.router.train();
    assert!(!outcome.success);
    assert!(!outcome.message.is_empty());

    let after = f
        .router
        .cache()
        .get_classifier(&f.router.config().classifier_path)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(f.router.predict("hi there").success);
}

#[test]
fn test_ensure_ready_trains_then_reuses_artifacts() {
    let f = Fixture::new(CORPUS);
    let first = f.router.ensure_ready();
    assert!(first.success);
    assert_eq!(first.message, "4 examples trained");

    // A fresh process sees up-to-date artifacts and skips training.
    let reopened = f.reopen();
    let second = reopened.ensure_ready();
    assert!(second.success);
    assert_eq!(second.message, "using existing trained model");
    assert!(reopened.predict("hi there").success);
}

#[test]
fn test_artifacts_lazy_load_in_fresh_process() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);

    // No training in the reopened router: classifier and encoder come
    // off disk on first prediction.
    let reopened = f.reopen();
    let result = reopened.predict("explain quantum mechanics");
    assert!(result.success, "prediction failed: {:?}", result.error);
    assert_eq!(result.predicted_model.as_deref(), Some("smart"));
}

struct StaticImprover {
    outcome: ImproveOutcome,
}

impl PromptImprover for StaticImprover {
    fn improve(&self, _prompt: &str) -> ImproveOutcome {
        self.outcome.clone()
    }
}

#[test]
fn test_improver_success_routes_improved_prompt() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);

    let improver = StaticImprover {
        outcome: ImproveOutcome {
            success: true,
            improved_prompt: Some("explain quantum mechanics".to_string()),
            error: None,
        },
    };
    let result = f.router.predict_with_improver("hi there", &improver);
    assert!(result.success);
    assert_eq!(result.predicted_model.as_deref(), Some("smart"));
}

#[test]
fn test_improver_failure_degrades_to_original_prompt() {
    let f = Fixture::new(CORPUS);
    assert!(f.router.train().success);

    let improver = StaticImprover {
        outcome: ImproveOutcome {
            success: false,
            improved_prompt: None,
            error: Some("timeout".to_string()),
        },
    };
    let result = f.router.predict_with_improver("hi there", &improver);
    assert!(result.success);
    assert_eq!(result.predicted_model.as_deref(), Some("fast"));
}

#[test]
fn test_train_with_missing_corpus_fails_cleanly() {
    let f = Fixture::new(CORPUS);
    std::fs::remove_file(&f.router.config().training_data_path).unwrap();
    let outcome = f.router.train();
    assert!(!outcome.success);
    assert!(outcome.message.contains("not found"));
    assert!(!f.router.config().classifier_path.exists());
}
