//! End-to-end orchestrator scenarios with a fake host and a fixed
//! candidate source.

use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use modelmux::core::mapping::{MappingEntry, UsageMatcher};
use modelmux::core::models::{ModelId, UsageCandidate, UsageReport, UsageWindow};
use modelmux::core::provider::Provider;
use modelmux::core::rank::PriorityRule;
use modelmux::core::switcher::{
    CandidateSource, ModelHost, Selection, SkipOutcome, Switcher,
};
use modelmux::storage::{AppPaths, Config};

// =============================================================================
// Test doubles
// =============================================================================

/// Host that records switch calls instead of running anything.
#[derive(Debug, Default)]
struct FakeHost {
    active: Option<ModelId>,
    switches: Vec<ModelId>,
}

impl ModelHost for FakeHost {
    fn active_model(&self) -> Option<ModelId> {
        self.active.clone()
    }

    fn set_model(&mut self, model: &ModelId) -> modelmux::Result<()> {
        self.switches.push(model.clone());
        self.active = Some(model.clone());
        Ok(())
    }
}

/// Candidate source returning a fixed list on every cycle.
struct StaticSource(Vec<UsageCandidate>);

impl CandidateSource for StaticSource {
    async fn candidates(&mut self, _config: &Config) -> Vec<UsageCandidate> {
        self.0.clone()
    }
}

fn candidate(provider: Provider, window: &str, used: f64) -> UsageCandidate {
    let report = UsageReport::new(provider);
    let w = UsageWindow::new(window, used);
    UsageCandidate::from_window(&report, &w)
}

fn model_mapping(provider: &str, model_provider: &str, model_id: &str) -> MappingEntry {
    MappingEntry {
        usage: UsageMatcher {
            provider: provider.to_string(),
            ..UsageMatcher::default()
        },
        model: Some(ModelId {
            provider: model_provider.to_string(),
            id: model_id.to_string(),
        }),
        ignore: None,
    }
}

fn test_paths(tmp: &TempDir) -> AppPaths {
    AppPaths {
        config: tmp.path().join("config"),
        state: tmp.path().join("state"),
    }
}

fn test_config() -> Config {
    Config {
        priority: Some(vec![
            PriorityRule::RemainingPercent,
            PriorityRule::FullAvailability,
            PriorityRule::EarliestReset,
        ]),
        mappings: vec![
            model_mapping("claude", "anthropic", "claude-sonnet"),
            model_mapping("codex", "openai", "gpt-5-codex"),
        ],
        ..Config::default()
    }
}

fn sonnet() -> ModelId {
    ModelId {
        provider: "anthropic".to_string(),
        id: "claude-sonnet".to_string(),
    }
}

// =============================================================================
// Select
// =============================================================================

#[tokio::test]
async fn select_reports_already_using_without_switching() {
    let tmp = TempDir::new().unwrap();
    let host = FakeHost {
        active: Some(sonnet()),
        switches: Vec::new(),
    };
    let source = StaticSource(vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ]);

    let mut switcher = Switcher::new(test_config(), &test_paths(&tmp), host, source).unwrap();
    let selection = switcher.select().await.unwrap();

    assert_eq!(selection, Selection::AlreadyUsing { model: sonnet() });
    assert_eq!(selection.message(), "Already using anthropic/claude-sonnet");
    assert!(
        switcher.host().switches.is_empty(),
        "host switch must not be called when already on the model"
    );
}

#[tokio::test]
async fn select_switches_when_host_is_elsewhere() {
    let tmp = TempDir::new().unwrap();
    let source = StaticSource(vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ]);

    let mut switcher =
        Switcher::new(test_config(), &test_paths(&tmp), FakeHost::default(), source).unwrap();
    let selection = switcher.select().await.unwrap();

    assert_eq!(selection, Selection::Switched { model: sonnet() });
    assert_eq!(selection.message(), "Set model to anthropic/claude-sonnet");
    assert_eq!(switcher.host().switches, vec![sonnet()]);
}

#[tokio::test]
async fn select_with_no_candidates_reports_none_available() {
    let tmp = TempDir::new().unwrap();
    let mut switcher = Switcher::new(
        test_config(),
        &test_paths(&tmp),
        FakeHost::default(),
        StaticSource(Vec::new()),
    )
    .unwrap();

    let selection = switcher.select().await.unwrap();
    assert_eq!(selection, Selection::NoneAvailable);
    assert_eq!(selection.message(), "No usable provider");
}

#[tokio::test]
async fn ignored_candidates_never_win() {
    let tmp = TempDir::new().unwrap();
    let mut config = test_config();
    config.mappings.insert(
        0,
        MappingEntry {
            usage: UsageMatcher {
                provider: "claude".to_string(),
                ..UsageMatcher::default()
            },
            model: None,
            ignore: Some(true),
        },
    );

    // Claude has more headroom but is ignored wholesale
    let source = StaticSource(vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ]);
    let mut switcher =
        Switcher::new(config, &test_paths(&tmp), FakeHost::default(), source).unwrap();

    let selection = switcher.select().await.unwrap();
    assert_eq!(
        selection,
        Selection::Switched {
            model: ModelId {
                provider: "openai".to_string(),
                id: "gpt-5-codex".to_string(),
            }
        }
    );
}

#[tokio::test]
async fn unmapped_candidate_resolves_to_raw_identity() {
    let tmp = TempDir::new().unwrap();
    let config = Config {
        priority: Some(vec![
            PriorityRule::RemainingPercent,
            PriorityRule::FullAvailability,
            PriorityRule::EarliestReset,
        ]),
        ..Config::default()
    };
    let source = StaticSource(vec![candidate(Provider::Gemini, "Daily requests", 5.0)]);
    let mut switcher =
        Switcher::new(config, &test_paths(&tmp), FakeHost::default(), source).unwrap();

    let selection = switcher.select().await.unwrap();
    assert_eq!(
        selection,
        Selection::Switched {
            model: ModelId {
                provider: "gemini".to_string(),
                id: "Daily requests".to_string(),
            }
        }
    );
}

// =============================================================================
// Skip
// =============================================================================

#[tokio::test]
async fn skip_cools_down_current_and_selects_next_best() {
    let tmp = TempDir::new().unwrap();
    let paths = test_paths(&tmp);
    let host = FakeHost {
        active: Some(sonnet()),
        switches: Vec::new(),
    };
    let source = StaticSource(vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ]);
    let mut switcher = Switcher::new(test_config(), &paths, host, source).unwrap();

    // Establish the selection first: host is already on claude-sonnet
    let selection = switcher.select().await.unwrap();
    assert_eq!(selection, Selection::AlreadyUsing { model: sonnet() });

    let outcome = switcher.skip().await.unwrap();
    match &outcome {
        SkipOutcome::Skipped {
            skipped,
            cooldown,
            next,
        } => {
            assert_eq!(skipped, "anthropic/claude-sonnet");
            assert_eq!(*cooldown, Duration::from_secs(30 * 60));
            assert_eq!(
                *next,
                Selection::Switched {
                    model: ModelId {
                        provider: "openai".to_string(),
                        id: "gpt-5-codex".to_string(),
                    }
                }
            );
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(outcome.message().contains("cooldown 30m"));
    assert!(outcome.message().contains("Set model to openai/gpt-5-codex"));
    assert_eq!(
        switcher.host().switches,
        vec![ModelId {
            provider: "openai".to_string(),
            id: "gpt-5-codex".to_string(),
        }]
    );

    // The cooldown landed in the persisted store
    let store = modelmux::storage::CooldownStore::load(paths.cooldown_file());
    assert!(store.is_cooling_down("anthropic/claude-sonnet", Utc::now()));
}

#[tokio::test]
async fn skip_without_prior_selection_selects_implicitly() {
    let tmp = TempDir::new().unwrap();
    let source = StaticSource(vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ]);
    let mut switcher =
        Switcher::new(test_config(), &test_paths(&tmp), FakeHost::default(), source).unwrap();

    // No select() ran before; skip establishes one, cools it, moves on
    let outcome = switcher.skip().await.unwrap();
    match outcome {
        SkipOutcome::Skipped { skipped, next, .. } => {
            assert_eq!(skipped, "anthropic/claude-sonnet");
            assert!(matches!(next, Selection::Switched { .. }));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn skip_with_nothing_available_reports_nothing_to_skip() {
    let tmp = TempDir::new().unwrap();
    let mut switcher = Switcher::new(
        test_config(),
        &test_paths(&tmp),
        FakeHost::default(),
        StaticSource(Vec::new()),
    )
    .unwrap();

    let outcome = switcher.skip().await.unwrap();
    assert_eq!(outcome, SkipOutcome::NothingToSkip);
}

#[tokio::test]
async fn cooldown_expiry_restores_the_candidate() {
    let tmp = TempDir::new().unwrap();
    let paths = test_paths(&tmp);
    let candidates = vec![
        candidate(Provider::Claude, "Weekly", 10.0),
        candidate(Provider::Codex, "Weekly", 20.0),
    ];
    let mut switcher = Switcher::new(
        test_config(),
        &paths,
        FakeHost::default(),
        StaticSource(candidates.clone()),
    )
    .unwrap();

    switcher.select().await.unwrap();
    switcher.skip().await.unwrap();

    // While cooling, claude stays excluded
    let now = Utc::now();
    let selection = switcher.select_from(candidates.clone(), now).unwrap();
    assert_eq!(
        selection,
        Selection::AlreadyUsing {
            model: ModelId {
                provider: "openai".to_string(),
                id: "gpt-5-codex".to_string(),
            }
        }
    );

    // Once the cooldown lapses, claude wins again
    let later = now + chrono::Duration::hours(2);
    let selection = switcher.select_from(candidates, later).unwrap();
    assert_eq!(selection, Selection::Switched { model: sonnet() });
}
