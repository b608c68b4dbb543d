use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use sendflow::actions::Agent;
use sendflow::actions::builtin::DryRunAgent;
use sendflow::actions::catalog::{ACTION_DEFINITIONS, categories};
use sendflow::actions::http::RemoteAgent;
use sendflow::actions::registry::RegistryConfig;
use sendflow::config::Config;
use sendflow::generator::llm::OpenAiClient;
use sendflow::generator::{FlowGenerator, GenerateRequest};
use sendflow::graph::FlowGraph;
use sendflow::graph::builder::{materialize_steps, portfolio_nodes};
use sendflow::graph::loader::{load_graph, save_graph};
use sendflow::graph::store::{GraphStore, InMemoryGraphStore};
use sendflow::portfolio::{MoralisClient, Portfolio, PortfolioSource};
use sendflow::runtime::context::{ExecutionContext, WalletSession};
use sendflow::runtime::engine::{Engine, EngineConfig, SelectionPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the action nodes of a flow file
    Run {
        /// Path to the flow file (.yaml, .yml or .json)
        #[arg(long, short)]
        file: PathBuf,

        /// Agent bridge base URL (defaults to SENDFLOW_AGENT_URL)
        #[arg(long)]
        agent_url: Option<String>,

        /// Connected wallet public key (defaults to SENDFLOW_WALLET)
        #[arg(long)]
        wallet: Option<String>,

        /// Simulate every action instead of calling the bridge
        #[arg(long)]
        dry_run: bool,

        /// Also run action nodes without any edge
        #[arg(long)]
        all_nodes: bool,

        /// Fail on missing parameters instead of filling placeholders
        #[arg(long)]
        strict_params: bool,

        /// Save the canvas with its result nodes back to the flow file
        #[arg(long)]
        write_back: bool,
    },

    /// Turn a natural-language instruction into flow steps
    Generate {
        /// The instruction, e.g. "swap 50% of my USDC to SOL"
        prompt: String,

        /// Wallet whose balances ground percentages (defaults to SENDFLOW_WALLET)
        #[arg(long)]
        wallet: Option<String>,

        /// Write a flow file with the portfolio and the generated steps
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// List the action catalog
    Actions {
        /// Only show one category
        #[arg(long, short)]
        category: Option<String>,
    },
}

async fn fetch_portfolio(config: &Config, wallet: &str) -> Option<Portfolio> {
    let Some(key) = &config.moralis_api_key else {
        warn!("MORALIS_API_KEY not set, running without a portfolio snapshot");
        return None;
    };
    MoralisClient::with_base_url(key.as_str(), config.moralis_base_url.as_str())
        .fetch(wallet)
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Run {
            file,
            agent_url,
            wallet,
            dry_run,
            all_nodes,
            strict_params,
            write_back,
        } => {
            let wallet = wallet
                .or_else(|| config.wallet.clone())
                .ok_or_else(|| anyhow!("No wallet given: pass --wallet or set SENDFLOW_WALLET"))?;

            let agent: Arc<dyn Agent> = if dry_run {
                info!("Running in dry-run mode");
                Arc::new(DryRunAgent::from_catalog())
            } else {
                let url = agent_url
                    .or_else(|| config.agent_url.clone())
                    .ok_or_else(|| anyhow!("No agent bridge: pass --agent-url or set SENDFLOW_AGENT_URL"))?;
                Arc::new(RemoteAgent::connect(&url, &wallet).await?)
            };

            let mut ctx = ExecutionContext::new(Arc::new(WalletSession::connected(&wallet)), agent);
            if let Some(portfolio) = fetch_portfolio(&config, &wallet).await {
                ctx = ctx.with_portfolio(portfolio);
            }

            let engine = Engine::with_config(
                EngineConfig {
                    selection: if all_nodes { SelectionPolicy::All } else { SelectionPolicy::Connected },
                    ..EngineConfig::default()
                },
                RegistryConfig {
                    inject_defaults: !strict_params,
                },
            );

            let flow_id = file.display().to_string();
            let store = Arc::new(InMemoryGraphStore::new(load_graph(&file)?));
            engine.register_flow(&flow_id, store.clone());

            let report = engine.execute_flow(&flow_id, &ctx).await?;
            for node in &report.nodes {
                println!(
                    "[{:?}] {} -> {}{}",
                    node.status,
                    node.label,
                    node.message,
                    node.signature
                        .as_deref()
                        .map(|s| format!(" ({s})"))
                        .unwrap_or_default()
                );
            }
            println!("{} succeeded, {} failed", report.succeeded(), report.failed());

            if write_back {
                save_graph(&file, &store.snapshot().await?)?;
                info!("Results written to {}", file.display());
            }
        }

        Commands::Generate { prompt, wallet, out } => {
            let mut client = OpenAiClient::new(
                config.require_openai_key()?,
                &config.openai_base_url,
                &config.openai_model,
            );
            if let Some(temperature) = config.openai_temperature {
                client = client.with_temperature(temperature);
            }
            let generator = FlowGenerator::new(Arc::new(client));

            let portfolio = match wallet.or_else(|| config.wallet.clone()) {
                Some(wallet) => fetch_portfolio(&config, &wallet).await,
                None => None,
            };

            let mut request = GenerateRequest::new(&prompt);
            if let Some(portfolio) = &portfolio {
                request = request.with_assets(portfolio.user_assets());
            }

            let steps = generator.generate_flow_steps(&request).await?;
            println!("{}", serde_json::to_string_pretty(&steps)?);

            if let Some(out) = out {
                let canvas = FlowGraph {
                    nodes: portfolio.as_ref().map(portfolio_nodes).unwrap_or_default(),
                    edges: Vec::new(),
                };
                save_graph(&out, &materialize_steps(canvas, &steps))?;
                info!("Flow written to {}", out.display());
            }
        }

        Commands::Actions { category } => {
            for cat in categories() {
                if category.as_deref().is_some_and(|c| !c.eq_ignore_ascii_case(cat)) {
                    continue;
                }
                println!("{cat}");
                for def in ACTION_DEFINITIONS.iter().filter(|d| d.category == cat) {
                    println!("  {:<32} {}", def.action_type, def.label);
                }
            }
        }
    }

    Ok(())
}
