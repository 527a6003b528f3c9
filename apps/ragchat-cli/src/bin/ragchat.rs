use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ragchat_cli::ingest::{load_indexes, process_sources};
use ragchat_cli::models::{switch_model, system_info};
use ragchat_cli::repl::{HistoryPager, ReplCommand, ABOUT_TEXT, HELP_TEXT};
use ragchat_cli::{RagChat, Stage};
use ragchat_core::config::Settings;
use ragchat_core::traits::Embedder;
use ragchat_embed::get_default_embedder;
use ragchat_hybrid::HybridRetriever;
use ragchat_llm::{OllamaClient, PromptDispatcher};
use ragchat_text::TantivyIndexer;
use ragchat_vector::{DenseIndex, LanceDbIndexer};

#[derive(Parser)]
#[command(name = "ragchat", about = "Ask questions about your lecture notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the vector store from the data directory.
    Ingest,
    /// Answer a single question.
    Ask { question: Vec<String> },
    /// Interactive session.
    Chat,
    /// List models installed on the generation service.
    Models,
}

type Chat = RagChat<DenseIndex<LanceDbIndexer>, TantivyIndexer>;

fn print_stage(stage: Stage) {
    if stage != Stage::Answered {
        eprintln!("» {stage}");
    }
}

async fn build(settings: &Settings, refresh_dense: bool, client: Arc<OllamaClient>) -> Result<Chat> {
    let timeout = Duration::from_secs(settings.generation.timeout_secs);
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&settings.embedding, &settings.ollama_url, timeout)?);
    let store = LanceDbIndexer::new(&settings.db_path(), &settings.embedding.table, settings.embedding.dimension).await?;
    if refresh_dense {
        store.reset().await?;
    }
    let retriever = HybridRetriever::new(DenseIndex::new(embedder, store, settings.embedding.batch_size), TantivyIndexer::new()?);

    let chunks = process_sources(settings)?;
    let report = load_indexes(&retriever, &chunks, refresh_dense).await;
    eprintln!(
        "Indexed {} chunks (sparse: {}, vector store: {} documents)",
        report.chunks,
        if report.sparse_indexed { "ready" } else { "unavailable" },
        report.dense_documents
    );

    let dispatcher = PromptDispatcher::new(client, &settings.generation);
    Ok(RagChat::new(retriever, dispatcher, settings))
}

async fn run_chat(mut chat: Chat, client: Arc<OllamaClient>, settings: &Settings) -> Result<()> {
    println!("Ask a question. Type /help for commands or /exit to quit.");
    let mut pager = HistoryPager::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await? else { break };
        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Help => println!("{HELP_TEXT}"),
            ReplCommand::About => println!("{ABOUT_TEXT}"),
            ReplCommand::Clear => {
                chat.clear_history();
                pager.first();
                println!("Conversation history cleared.");
            }
            ReplCommand::History => {
                pager.first();
                println!("{}", pager.render(chat.history()));
            }
            ReplCommand::NextPage | ReplCommand::PrevPage if chat.history().is_empty() => {}
            ReplCommand::NextPage => {
                pager.next(chat.history());
                println!("{}", pager.render(chat.history()));
            }
            ReplCommand::PrevPage => {
                pager.prev();
                println!("{}", pager.render(chat.history()));
            }
            ReplCommand::Models => println!("{}", client.list_models().await.map(|m| m.join("\n")).unwrap_or_else(|e| e.to_markdown())),
            ReplCommand::Info => {
                let info = system_info(&client, chat.retriever().dense(), &settings.processed_path()).await;
                println!("Model: {}\nAvailable models: {}\nVector documents: {}\nProcessed files: {}",
                    info.model, info.available_models.join(", "), info.dense_documents, info.processed_files.join(", "));
            }
            ReplCommand::Model(name) if name.is_empty() => println!("Please specify a model name. Example: /model mistral:7b"),
            ReplCommand::Model(name) => match switch_model(&client, &name).await {
                Ok(()) => println!("Now using {name}"),
                Err(e) => println!("{e}"),
            },
            ReplCommand::Ask(question) => {
                let answer = chat.generate_response(&question, print_stage).await;
                println!("\n{answer}\n");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load()?;
    let client = Arc::new(OllamaClient::from_settings(&settings)?);

    match cli.command {
        Command::Models => {
            for m in client.list_models().await? {
                println!("{m}");
            }
        }
        Command::Ingest => {
            build(&settings, true, client).await?;
        }
        Command::Ask { question } => {
            client.check_availability().await;
            let mut chat = build(&settings, false, client).await?;
            let answer = chat.generate_response(&question.join(" "), print_stage).await;
            println!("{answer}");
        }
        Command::Chat => {
            client.check_availability().await;
            let chat = build(&settings, false, client.clone()).await?;
            run_chat(chat, client, &settings).await?;
        }
    }
    Ok(())
}
