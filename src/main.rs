//! ragrace - 文档解析 provider 对比与基准测试客户端
//!
//! ## 命令
//!
//! - `compare`: 多 provider 对比（逐个 provider 串行调用）
//! - `battle`: 两个匿名 provider 盲测，提交偏好后揭晓
//! - `results` / `datasets`: 浏览历史基准测试与数据集表现
//! - `benchmark`: 触发一次基准测试
//! - `batch`: 批量对比 `pdf_folder` 下的所有 PDF

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use ragrace_arena::clients::{ArenaApi, RagRaceClient};
use ragrace_arena::models::{load_settings, BenchmarkRequest, Preference, Provider, ProviderSettings};
use ragrace_arena::orchestrator::App;
use ragrace_arena::services::OutputWriter;
use ragrace_arena::utils::logging;
use ragrace_arena::workflow::{
    BattleFlow, CompareFlow, ComparisonOutcome, CostOutcome, ResultsBrowser,
};
use ragrace_arena::Config;

const ALL_PROVIDERS: &str = "llamaindex,reducto,landingai";
const BATTLE_PROVIDERS: &str = "reducto,landingai";

#[derive(Parser)]
#[command(name = "ragrace")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RAGRace: 文档解析 provider 对比、盲测与基准测试", long_about = None)]
struct Cli {
    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    json: bool,

    /// 后端地址（覆盖 RAGRACE_API_BASE_URL）
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// 设置文件路径（覆盖 RAGRACE_SETTINGS_FILE）
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 后端健康检查
    Health,

    /// 上传 PDF
    Upload {
        pdf: PathBuf,
    },

    /// 查询已上传文件的页数
    Pages {
        file_id: String,
    },

    /// 多 provider 对比
    Compare {
        /// 待对比的 PDF
        #[arg(long, conflicts_with = "file_id", required_unless_present = "file_id")]
        pdf: Option<PathBuf>,

        /// 复用已上传的文件
        #[arg(long)]
        file_id: Option<String>,

        /// 逗号分隔的 provider 列表
        #[arg(short, long, default_value = ALL_PROVIDERS)]
        providers: String,

        /// 只解析指定页（从 1 开始）
        #[arg(long)]
        page: Option<u32>,

        /// 把报告与费用写入输出目录
        #[arg(long)]
        save: bool,
    },

    /// 计算解析费用
    Cost {
        file_id: String,

        #[arg(short, long, default_value = ALL_PROVIDERS)]
        providers: String,

        /// 不调用后端，按页数离线估算
        #[arg(long)]
        offline_pages: Option<u32>,
    },

    /// 两个匿名 provider 的盲测对战
    Battle {
        pdf: PathBuf,

        /// 对战页码（从 1 开始）
        #[arg(long, default_value = "1")]
        page: u32,

        /// 参战的 provider，至少两个
        #[arg(short, long, default_value = BATTLE_PROVIDERS)]
        providers: String,

        /// 偏好：A / B / BOTH_GOOD / BOTH_BAD，未指定时交互输入
        #[arg(long)]
        preference: Option<Preference>,

        /// 附加评论
        #[arg(long)]
        comment: Option<String>,
    },

    /// 浏览基准测试运行
    Results {
        #[command(subcommand)]
        action: ResultsAction,
    },

    /// 浏览数据集
    Datasets {
        #[command(subcommand)]
        action: DatasetsAction,
    },

    /// 触发基准测试（同步，可能耗时数分钟）
    Benchmark {
        /// 数据集名称（qasper, policyqa, squad2）
        dataset: String,

        #[arg(short, long, default_value = ALL_PROVIDERS)]
        providers: String,

        #[arg(long, default_value = "train")]
        split: String,

        #[arg(long)]
        max_docs: Option<u32>,

        #[arg(long)]
        max_questions_per_doc: Option<u32>,

        /// 保留无法回答的问题
        #[arg(long)]
        keep_unanswerable: bool,
    },

    /// 批量对比 pdf_folder 下的所有 PDF
    Batch {
        #[arg(short, long, default_value = ALL_PROVIDERS)]
        providers: String,

        #[arg(long)]
        page: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ResultsAction {
    /// 列出运行记录
    List {
        #[arg(long)]
        dataset: Option<String>,

        /// 每页数量（1-100）
        #[arg(short, long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// 查看单次运行详情
    Show {
        run_id: String,
    },
}

#[derive(Subcommand)]
enum DatasetsAction {
    /// 列出数据集
    List,
    /// 数据集上所有文档的最新结果
    Documents {
        name: String,
    },
    /// 各 provider 的聚合表现
    Performance {
        name: String,

        /// 排名使用的指标，默认取第一个
        #[arg(short, long)]
        metric: Option<String>,
    },
    /// 单个 provider 的明细
    Provider {
        name: String,
        provider: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }
    if let Some(settings) = cli.settings.clone() {
        config.settings_file = settings;
    }
    config.verbose_logging |= cli.verbose;

    logging::init(config.verbose_logging);

    let api: Arc<dyn ArenaApi> = Arc::new(RagRaceClient::new(&config)?);
    run_command(cli.command, api, &config, cli.json).await
}

async fn run_command(command: Commands, api: Arc<dyn ArenaApi>, config: &Config, json: bool) -> Result<()> {
    match command {
        Commands::Health => {
            let health = api.health().await?;
            print_json(&health)?;
        }
        Commands::Upload { pdf } => {
            let uploaded = api.upload_pdf(&pdf).await?;
            if json {
                print_json(&uploaded)?;
            } else {
                println!("file_id: {}\nfilename: {}", uploaded.file_id, uploaded.filename);
            }
        }
        Commands::Pages { file_id } => {
            let pages = api.page_count(&file_id).await?;
            if json {
                print_json(&pages)?;
            } else {
                println!("{}: {} 页", pages.filename, pages.page_count);
            }
        }
        Commands::Compare {
            pdf,
            file_id,
            providers,
            page,
            save,
        } => {
            let providers = Provider::parse_list(&providers)?;
            let settings = read_settings(config).await?;
            let flow = CompareFlow::new(api)?;
            let doc = match (pdf, file_id) {
                (Some(pdf), _) => flow.upload(&pdf).await?,
                (None, Some(file_id)) => flow.attach(&file_id).await?,
                (None, None) => bail!("需要 --pdf 或 --file-id"),
            };

            let outcome = flow.run(&doc, &providers, &settings, page).await?;
            if save {
                let written = flow.save(&outcome, &OutputWriter::new(&config.output_dir)).await?;
                info!("✓ 已写入 {} 个文件到 {}", written.len(), config.output_dir);
            }
            print_comparison(&flow, &outcome, json)?;
        }
        Commands::Cost {
            file_id,
            providers,
            offline_pages,
        } => {
            let providers = Provider::parse_list(&providers)?;
            let settings = read_settings(config).await?;
            let flow = CompareFlow::new(Arc::clone(&api))?;
            let costs = match offline_pages {
                Some(pages) => flow
                    .cost_service()
                    .estimate_all(&file_id, &providers, &settings, pages),
                None => {
                    let request = ragrace_arena::models::CostRequest {
                        file_id: file_id.clone(),
                        providers: providers.clone(),
                        configs: settings.configs_for(&providers),
                    };
                    api.calculate_cost(&request).await?
                }
            };
            if json {
                print_json(&costs)?;
            } else {
                for cost in flow.cost_service().rank_by_cost(&costs) {
                    println!(
                        "{:<12} {:>10.1} credits  {}",
                        Provider::display_name_of(&cost.provider),
                        cost.credits,
                        flow.cost_service().format_usd(cost.total_usd)
                    );
                }
                println!("合计 {}", flow.cost_service().format_usd(costs.total_usd));
            }
        }
        Commands::Battle {
            pdf,
            page,
            providers,
            preference,
            comment,
        } => {
            let providers = Provider::parse_list(&providers)?;
            let settings = read_settings(config).await?;
            run_battle(api, config, &pdf, page, &providers, &settings, preference, comment, json).await?;
        }
        Commands::Results { action } => {
            let browser = ResultsBrowser::new(api);
            match action {
                ResultsAction::List {
                    dataset,
                    limit,
                    offset,
                } => {
                    let page = browser.list_runs(dataset.as_deref(), limit, offset).await?;
                    if json {
                        print_json(&page.runs)?;
                    } else {
                        for run in &page.runs {
                            println!(
                                "{}  {:<10} {:<10} {:>3} 文档 {:>4} 问题  {}  {}",
                                run.run_id,
                                run.dataset,
                                run.status,
                                run.num_docs,
                                run.num_questions,
                                browser.performance().format_duration(run.duration_seconds),
                                run.started_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                        println!("共 {} 条 (offset {}, limit {})", page.total, page.offset, page.limit);
                        if let Some(next) = page.next_offset() {
                            println!("下一页: --offset {}", next);
                        }
                    }
                }
                ResultsAction::Show { run_id } => {
                    let run = browser.run_detail(&run_id).await?;
                    if json {
                        print_json(&run)?;
                    } else {
                        println!("{} [{}] {} / {}", run.run_id, run.status, run.dataset, run.split);
                        if let Some(message) = &run.error_message {
                            println!("错误: {}", message);
                        }
                        for perf in browser.performance().provider_averages(&run) {
                            print_scores(&perf.provider, &perf.aggregated_scores);
                        }
                    }
                }
            }
        }
        Commands::Datasets { action } => {
            let browser = ResultsBrowser::new(api);
            match action {
                DatasetsAction::List => {
                    let datasets = browser.datasets().await?;
                    if json {
                        print_json(&datasets)?;
                    } else {
                        for d in &datasets {
                            println!("{:<10} {}  [{}]", d.name, d.display_name, d.available_splits.join(", "));
                        }
                    }
                }
                DatasetsAction::Documents { name } => {
                    let documents = browser.dataset_documents(&name).await?;
                    if json {
                        print_json(&documents)?;
                    } else {
                        for doc in &documents.documents {
                            let statuses: Vec<String> = doc
                                .providers
                                .iter()
                                .map(|(p, r)| format!("{}={}", Provider::display_name_of(p), r.status))
                                .collect();
                            println!("{}  {}", doc.doc_title, statuses.join(" "));
                        }
                    }
                }
                DatasetsAction::Performance { name, metric } => {
                    let summary = browser.dataset_performance(&name).await?;
                    if json {
                        print_json(&summary)?;
                    } else {
                        let (metric, ranked) = browser.ranking(&summary, metric.as_deref());
                        println!(
                            "{}: {} 次运行, {} 个文档, 排名指标 {}",
                            summary.dataset_name,
                            summary.total_runs,
                            summary.total_documents,
                            metric.as_deref().unwrap_or("-")
                        );
                        for (rank, perf) in ranked.iter().enumerate() {
                            print!("{}. ", rank + 1);
                            print_scores(&perf.provider, &perf.aggregated_scores);
                        }
                    }
                }
                DatasetsAction::Provider { name, provider } => {
                    let detail = browser.provider_detail(&name, &provider).await?;
                    if json {
                        print_json(&detail)?;
                    } else {
                        print_scores(&detail.provider, &detail.overall_scores);
                        for doc in &detail.documents {
                            println!(
                                "  {} [{}] {}",
                                doc.doc_title,
                                doc.status,
                                browser.performance().format_duration(doc.duration_seconds)
                            );
                        }
                    }
                }
            }
        }
        Commands::Benchmark {
            dataset,
            providers,
            split,
            max_docs,
            max_questions_per_doc,
            keep_unanswerable,
        } => {
            let mut request = BenchmarkRequest::new(dataset, Provider::parse_list(&providers)?);
            request.split = split;
            request.max_docs = max_docs;
            request.max_questions_per_doc = max_questions_per_doc;
            request.filter_unanswerable = !keep_unanswerable;

            let settings = read_settings(config).await?;
            let response = ResultsBrowser::new(api).run_benchmark(request, &settings).await?;
            if json {
                print_json(&response)?;
            } else {
                println!("{} [{}] {}", response.run_id, response.status, response.message);
            }
        }
        Commands::Batch { providers, page } => {
            let providers = Provider::parse_list(&providers)?;
            let settings = read_settings(config).await?;
            let stats = App::initialize(config.clone(), api, settings, providers, page)?
                .run()
                .await?;
            if json {
                print_json(&json!({
                    "success": stats.success,
                    "failed": stats.failed,
                    "total": stats.total,
                    "total_usd": stats.total_usd,
                    "providers": stats
                        .providers
                        .iter()
                        .map(|(provider, tally)| {
                            (
                                provider.as_str().to_string(),
                                json!({"success": tally.success, "failed": tally.failed}),
                            )
                        })
                        .collect::<serde_json::Map<String, serde_json::Value>>(),
                }))?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_battle(
    api: Arc<dyn ArenaApi>,
    config: &Config,
    pdf: &Path,
    page: u32,
    providers: &[Provider],
    settings: &ProviderSettings,
    preference: Option<Preference>,
    comment: Option<String>,
    json: bool,
) -> Result<()> {
    let mut flow = BattleFlow::new(api, config)?;
    flow.upload(pdf).await?;

    let blind = flow.run(page, providers, settings).await?;
    for output in &blind {
        println!("\n========== {} ==========\n", output.title);
        println!("{}", output.markdown.as_deref().unwrap_or("*本页无内容*"));
    }

    let preference = match preference {
        Some(p) => p,
        None => prompt_preference().await?,
    };

    let revealed = flow.submit_feedback(preference, comment).await?;
    if json {
        let items: Vec<_> = revealed
            .iter()
            .map(|r| json!({"label": r.label, "provider": r.provider, "preferred": r.preferred}))
            .collect();
        print_json(&items)?;
    } else {
        println!();
        for r in &revealed {
            println!(
                "Provider {} = {}{}",
                r.label,
                r.provider,
                if r.preferred { "  ✓" } else { "" }
            );
        }
    }
    Ok(())
}

async fn prompt_preference() -> Result<Preference> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("\n哪个更好？[A / B / BOTH_GOOD / BOTH_BAD]");
        let Some(line) = lines.next_line().await? else {
            bail!("没有读取到偏好输入");
        };
        match line.parse::<Preference>() {
            Ok(preference) => return Ok(preference),
            Err(e) => println!("{}", e),
        }
    }
}

async fn read_settings(config: &Config) -> Result<ProviderSettings> {
    load_settings(Path::new(&config.settings_file))
        .await
        .with_context(|| format!("读取设置文件失败: {}", config.settings_file))
}

fn print_comparison(flow: &CompareFlow, outcome: &ComparisonOutcome, json: bool) -> Result<()> {
    if json {
        let providers: serde_json::Map<String, serde_json::Value> = outcome
            .providers
            .iter()
            .map(|p| -> Result<(String, serde_json::Value)> {
                let value = match &p.result {
                    Ok(parsed) => serde_json::to_value(parsed)?,
                    Err(e) => json!({ "error": e }),
                };
                Ok((p.provider.as_str().to_string(), value))
            })
            .collect::<Result<_>>()?;
        return print_json(&json!({
            "file_id": outcome.doc.file_id,
            "filename": outcome.doc.filename,
            "page_number": outcome.page_number,
            "results": providers,
            "cost": outcome.cost.costs(),
            "cost_estimated": outcome.cost.is_estimated(),
        }));
    }

    for provider in &outcome.providers {
        println!("\n{}", flow.render(provider));
    }

    let costs = outcome.cost.costs();
    println!("---------- 费用 ----------");
    if let CostOutcome::Estimated { error, .. } = &outcome.cost {
        println!("(后端费用计算失败: {}，以下为离线估算)", error);
    }
    for cost in flow.cost_service().rank_by_cost(costs) {
        let per_page = flow
            .cost_service()
            .usd_per_page(cost, outcome.page_number.map_or(outcome.doc.page_count, |_| 1))
            .map(|usd| format!("{}/页", flow.cost_service().format_usd(usd)))
            .unwrap_or_default();
        println!(
            "{:<12} {}  {}",
            Provider::display_name_of(&cost.provider),
            flow.cost_service().format_usd(cost.total_usd),
            per_page
        );
    }
    println!("合计 {}", flow.cost_service().format_usd(costs.total_usd));
    Ok(())
}

fn print_scores<V: std::fmt::Display>(provider: &str, scores: &std::collections::BTreeMap<String, V>) {
    let scores: Vec<String> = scores.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    println!("{:<12} {}", Provider::display_name_of(provider), scores.join("  "));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
