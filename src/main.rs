use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use knowledgemap::api::HttpServer;
use knowledgemap::{Config, KnowledgeMapAgent};

const SAMPLE_TEXT: &str = "人工智能是计算机科学的一个分支，机器学习是人工智能的核心技术，深度学习是机器学习的一个重要分支。";

#[derive(Parser, Debug)]
#[command(name = "knowledgemap")]
#[command(about = "KnowledgeMap agent: demonstration knowledge graph over HTTP", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        /// Listen address (overrides KNOWLEDGEMAP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides KNOWLEDGEMAP_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run extraction on a sample text, print the results and save the graph
    Demo {
        /// Text to extract from
        #[arg(short, long, default_value = SAMPLE_TEXT)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();
    let mut config = Config::load()?;
    log::info!("Agent config: {}", config.config_path.display());
    log::info!("Graph file: {}", config.graph_path.display());

    match args.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            run_server(&config).await?;
        }
        Command::Demo { text } => {
            run_demo(&config, &text)?;
        }
    }

    Ok(())
}

/// Run the HTTP server
async fn run_server(config: &Config) -> Result<()> {
    log::info!("Starting KnowledgeMap HTTP server v{}", env!("CARGO_PKG_VERSION"));

    let agent = KnowledgeMapAgent::from_config(config);
    let server = HttpServer::new(agent);
    server.run(&config.bind_addr()).await?;

    Ok(())
}

/// Walk through one extraction end to end and save the result
fn run_demo(config: &Config, text: &str) -> Result<()> {
    let mut agent = KnowledgeMapAgent::from_config(config);

    println!("=== KnowledgeMap Agent demo ===");
    let status = serde_json::to_string_pretty(&agent.status())?;
    println!("Agent status: {}", status);

    let entities = agent.extract_entities(text);
    let names: Vec<_> = entities.iter().map(|e| e.name.as_str()).collect();
    println!("\nExtracted entities: {:?}", names);

    let relations = agent.extract_relations(text, &entities);
    let edges: Vec<_> = relations
        .iter()
        .map(|r| format!("{} -> {}", r.source, r.target))
        .collect();
    println!("\nExtracted relations: {:?}", edges);

    let graph = agent.build_knowledge_graph(&entities, &relations);
    println!(
        "\nKnowledge graph built: {}",
        serde_json::to_string(&graph.metadata)?
    );

    agent
        .save_graph()
        .with_context(|| format!("Failed to save graph to {}", agent.graph_path().display()))?;
    println!("\nGraph saved to {}", agent.graph_path().display());

    println!("\n=== Demo complete ===");
    Ok(())
}
