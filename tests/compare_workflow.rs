mod common;

use std::path::Path;
use std::sync::Arc;

use common::{settings_with_keys, test_config, FakeArena, FILE_ID};
use ragrace_arena::error::{AppError, BattleError, ConfigError};
use ragrace_arena::models::{BenchmarkRequest, Provider};
use ragrace_arena::orchestrator::{App, ProviderTally};
use ragrace_arena::services::OutputWriter;
use ragrace_arena::workflow::{CompareFlow, CostOutcome, ResultsBrowser};
use ragrace_arena::Config;

#[tokio::test]
async fn test_failing_provider_does_not_block_others() {
    let fake = Arc::new(FakeArena::new());
    fake.failing_providers
        .lock()
        .unwrap()
        .push("reducto".to_string());
    let flow = CompareFlow::new(fake.clone()).unwrap();

    let doc = flow.upload(Path::new("paper.pdf")).await.unwrap();
    let outcome = flow
        .run(&doc, &Provider::ALL, &settings_with_keys(), None)
        .await
        .unwrap();

    assert_eq!(outcome.providers.len(), 3);
    assert_eq!(outcome.success_count(), 2);
    let failures: Vec<_> = outcome.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(*failures[0].0, Provider::Reducto);
    assert_eq!(failures[0].1, "reducto parsing failed");

    let llama = outcome.providers[0].result.as_ref().unwrap();
    assert_eq!(llama.pages.len(), 3);

    // 每个 provider 单独请求，按给定顺序
    let requests = fake.compare_requests.lock().unwrap().clone();
    let order: Vec<_> = requests.iter().map(|r| r.providers.clone()).collect();
    assert_eq!(
        order,
        vec![
            vec![Provider::LlamaIndex],
            vec![Provider::Reducto],
            vec![Provider::LandingAI]
        ]
    );
    assert!(requests.iter().all(|r| !r.battle_mode && r.api_keys.len() == 1));
}

#[tokio::test]
async fn test_missing_key_is_inline_error() {
    let fake = Arc::new(FakeArena::new());
    let flow = CompareFlow::new(fake.clone()).unwrap();
    let mut settings = settings_with_keys();
    settings.api_keys.insert("landingai".to_string(), "  ".to_string());

    let doc = flow.attach(FILE_ID).await.unwrap();
    let outcome = flow
        .run(&doc, &Provider::ALL, &settings, Some(1))
        .await
        .unwrap();

    assert_eq!(outcome.success_count(), 2);
    let (provider, error) = outcome.failures().next().unwrap();
    assert_eq!(*provider, Provider::LandingAI);
    assert!(error.contains("LandingAI"));
    assert_eq!(fake.count_calls("compare:landingai"), 0);

    let rendered = flow.render(&outcome.providers[2]);
    assert!(rendered.starts_with("# LandingAI"));
    assert!(rendered.contains("❌"));
}

#[tokio::test]
async fn test_cost_ranked_and_estimated_on_failure() {
    let fake = Arc::new(FakeArena::new());
    let flow = CompareFlow::new(fake.clone()).unwrap();
    let doc = flow.attach(FILE_ID).await.unwrap();

    let outcome = flow
        .run(&doc, &Provider::ALL, &settings_with_keys(), None)
        .await
        .unwrap();
    assert!(matches!(outcome.cost, CostOutcome::Backend(_)));
    let ranked: Vec<_> = flow
        .cost_service()
        .rank_by_cost(outcome.cost.costs())
        .iter()
        .map(|c| c.provider.clone())
        .collect();
    assert_eq!(ranked, vec!["landingai", "reducto", "llamaindex"]);

    *fake.cost_fails.lock().unwrap() = true;
    let outcome = flow
        .run(&doc, &Provider::ALL, &settings_with_keys(), Some(2))
        .await
        .unwrap();
    match &outcome.cost {
        CostOutcome::Estimated { estimate, error } => {
            assert_eq!(error, "cost service down");
            assert_eq!(estimate.costs["landingai"].credits, 3.0);
        }
        other => panic!("expected estimate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_page_out_of_range() {
    let fake = Arc::new(FakeArena::new());
    let flow = CompareFlow::new(fake.clone()).unwrap();
    let doc = flow.attach(FILE_ID).await.unwrap();

    let err = flow
        .run(&doc, &Provider::ALL, &settings_with_keys(), Some(9))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Battle(BattleError::PageOutOfRange { page: 9, page_count: 3 })
    ));
    assert_eq!(fake.count_calls("compare"), 0);
}

#[tokio::test]
async fn test_save_writes_reports_and_cost() {
    let dir = tempfile::tempdir().unwrap();
    let fake = Arc::new(FakeArena::new());
    let flow = CompareFlow::new(fake.clone()).unwrap();
    let doc = flow.upload(Path::new("annual-report.pdf")).await.unwrap();

    let outcome = flow
        .run(&doc, &[Provider::Reducto], &settings_with_keys(), Some(1))
        .await
        .unwrap();
    let written = flow
        .save(&outcome, &OutputWriter::new(dir.path()))
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
    let report = std::fs::read_to_string(dir.path().join("annual-report").join("reducto.md")).unwrap();
    assert!(report.starts_with("# Reducto"));
    assert!(report.contains("## 第 1 页\n\noutput 1 page 1"));
    assert!(dir.path().join("annual-report").join("cost.json").exists());
}

#[tokio::test]
async fn test_results_limit_checked_locally() {
    let fake = Arc::new(FakeArena::new());
    let browser = ResultsBrowser::new(fake.clone());

    for limit in [0, 101] {
        let err = browser.list_runs(None, limit, 0).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidValue { .. })));
    }
    assert_eq!(fake.count_calls("list_results"), 0);

    let page = browser.list_runs(Some("qasper"), 20, 20).await.unwrap();
    assert_eq!(page.runs.len(), 20);
    assert_eq!(page.next_offset(), Some(40));

    let last = browser.list_runs(None, 20, 40).await.unwrap();
    assert_eq!(last.runs.len(), 5);
    assert_eq!(last.next_offset(), None);
}

#[tokio::test]
async fn test_run_detail_errors_surface_detail() {
    let fake = Arc::new(FakeArena::new());
    let browser = ResultsBrowser::new(fake.clone());

    let err = browser.run_detail("missing").await.unwrap_err();
    assert_eq!(err.user_message(), "Run missing not found");

    let run = browser.run_detail("run_001").await.unwrap();
    let averages = browser.performance().provider_averages(&run);
    assert_eq!(averages.len(), 1);
    assert_eq!(averages[0].provider, "llamaindex");
}

#[tokio::test]
async fn test_performance_ranking_defaults_to_first_metric() {
    let fake = Arc::new(FakeArena::new());
    let browser = ResultsBrowser::new(fake.clone());
    let summary = browser.dataset_performance("qasper").await.unwrap();

    let (metric, ranked) = browser.ranking(&summary, None);
    assert_eq!(metric.as_deref(), Some("context_recall"));
    let names: Vec<_> = ranked.iter().map(|p| p.provider.as_str()).collect();
    assert_eq!(names, vec!["llamaindex", "reducto", "landingai"]);

    let (_, ranked) = browser.ranking(&summary, Some("faithfulness"));
    let names: Vec<_> = ranked.iter().map(|p| p.provider.as_str()).collect();
    assert_eq!(names, vec!["landingai", "reducto", "llamaindex"]);
}

#[tokio::test]
async fn test_benchmark_uses_settings_keys() {
    let fake = Arc::new(FakeArena::new());
    let browser = ResultsBrowser::new(fake.clone());

    let request = BenchmarkRequest::new("qasper", vec![Provider::LandingAI]);
    let response = browser
        .run_benchmark(request, &settings_with_keys())
        .await
        .unwrap();
    assert_eq!(response.run_id, "run_new");

    let sent = fake.benchmark_requests.lock().unwrap()[0].clone();
    let keys = sent.api_keys.unwrap();
    assert_eq!(keys["vision_agent"], "la-test");
    assert_eq!(keys["openai"], "sk-test");
    assert!(!keys.contains_key("landingai"));
}

#[test]
fn test_dataset_listing_blocking() {
    let fake = Arc::new(FakeArena::new());
    let browser = ResultsBrowser::new(fake.clone());

    let datasets = tokio_test::block_on(browser.datasets()).unwrap();
    assert_eq!(datasets[0].name, "qasper");
    assert_eq!(datasets[0].available_splits, vec!["train", "validation"]);
}

#[tokio::test]
async fn test_batch_compares_every_pdf() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for name in ["a.pdf", "b.PDF", "c.pdf", "notes.txt"] {
        std::fs::write(input.path().join(name), b"%PDF-1.4").unwrap();
    }

    let config = Config {
        pdf_folder: input.path().to_string_lossy().to_string(),
        output_dir: output.path().to_string_lossy().to_string(),
        max_concurrent_documents: 2,
        ..test_config()
    };
    let fake = Arc::new(FakeArena::new());
    fake.failing_providers
        .lock()
        .unwrap()
        .push("landingai".to_string());

    let app = App::initialize(
        config,
        fake.clone(),
        settings_with_keys(),
        vec![Provider::Reducto, Provider::LandingAI],
        None,
    )
    .unwrap();
    let stats = app.run().await.unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(fake.count_calls("upload"), 3);
    assert_eq!(stats.providers[&Provider::Reducto], ProviderTally { success: 3, failed: 0 });
    assert_eq!(stats.providers[&Provider::LandingAI], ProviderTally { success: 0, failed: 3 });
    assert!(stats.total_usd > 0.0);

    let log = std::fs::read_to_string(output.path().join("batch.log")).unwrap();
    assert!(log.contains("provider: Reducto, LandingAI | 范围: 整份文档"));
    assert!(log.contains("LandingAI 失败"));
    assert!(log.contains("LandingAI  成功 0/3 (0%)"));
    assert!(log.contains("费用合计"));
}
