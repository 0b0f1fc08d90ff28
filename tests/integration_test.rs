use std::path::Path;
use std::sync::Arc;

use ragrace_arena::clients::{ArenaApi, RagRaceClient};
use ragrace_arena::models::{load_settings, Preference, Provider};
use ragrace_arena::utils::logging;
use ragrace_arena::workflow::{BattleFlow, CompareFlow, ResultsBrowser};
use ragrace_arena::Config;

fn live_client(config: &Config) -> Arc<dyn ArenaApi> {
    Arc::new(RagRaceClient::new(config).expect("创建客户端失败"))
}

#[tokio::test]
#[ignore] // 默认忽略，需要后端运行：cargo test -- --ignored
async fn test_backend_health() {
    logging::init(true);
    let config = Config::from_env();

    let health = live_client(&config).health().await.expect("健康检查失败");
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_compare_single_page() {
    logging::init(true);
    let config = Config::from_env();
    let settings = load_settings(Path::new(&config.settings_file))
        .await
        .expect("读取设置文件失败");

    // 注意：请根据实际情况修改文件路径
    let pdf = Path::new(&config.pdf_folder).join("sample.pdf");

    let flow = CompareFlow::new(live_client(&config)).unwrap();
    let doc = flow.upload(&pdf).await.expect("上传失败");
    let outcome = flow
        .run(&doc, &Provider::ALL, &settings, Some(1))
        .await
        .expect("对比失败");

    assert!(outcome.success_count() > 0, "至少一个 provider 应该成功");
}

#[tokio::test]
#[ignore]
async fn test_battle_round_trip() {
    logging::init(true);
    let config = Config::from_env();
    let settings = load_settings(Path::new(&config.settings_file))
        .await
        .expect("读取设置文件失败");
    let pdf = Path::new(&config.pdf_folder).join("sample.pdf");

    let mut flow = BattleFlow::new(live_client(&config), &config)
        .unwrap()
        .without_feedback_log();
    flow.upload(&pdf).await.expect("上传失败");
    let blind = flow
        .run(1, &Provider::ALL, &settings)
        .await
        .expect("对战失败");
    assert_eq!(blind.len(), 2);

    let revealed = flow
        .submit_feedback(Preference::BothGood, Some("integration test".to_string()))
        .await
        .expect("提交反馈失败");
    assert!(revealed.iter().all(|r| r.preferred));
}

#[tokio::test]
#[ignore]
async fn test_list_results_and_datasets() {
    logging::init(true);
    let config = Config::from_env();
    let browser = ResultsBrowser::new(live_client(&config));

    let page = browser.list_runs(None, 5, 0).await.expect("列出运行失败");
    assert!(page.runs.len() <= 5);

    let datasets = browser.datasets().await.expect("列出数据集失败");
    assert!(!datasets.is_empty());
}
