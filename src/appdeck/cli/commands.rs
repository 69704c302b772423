use super::open::open_url;
use super::print::{
    print_card, print_entries, print_messages, print_subscription, print_summary,
};
use super::setup::{Cli, Commands, EntryFields};
use appdeck::api::{CmdMessage, CmdResult, DeckApi};
use appdeck::config::{DeckConfig, KEYS};
use appdeck::debounce::Debouncer;
use appdeck::error::{DeckError, Result};
use appdeck::form::{favicon_url, EntryForm};
use appdeck::model::{Collection, EntryRef};
use appdeck::render::{entry_card, subscription_view};
use appdeck::store::http::HttpStore;
use chrono::Utc;
use clap::Parser;
use directories::ProjectDirs;
use std::io::BufRead;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Directory holding `config.json`; defaults to the OS config dir.
const ENV_CONFIG_DIR: &str = "APPDECK_CONFIG_DIR";
/// Log filter for stderr diagnostics, e.g. `APPDECK_LOG=appdeck=debug`.
const ENV_LOG: &str = "APPDECK_LOG";

struct AppContext {
    api: DeckApi<HttpStore>,
    config: DeckConfig,
    runtime: Runtime,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // These don't talk to the store, and config must work even when base_url is broken.
    let command = match cli.command {
        Some(Commands::Favicon { url }) => return handle_favicon(&url),
        Some(Commands::Config { key, value }) => return handle_config(key, value),
        other => other,
    };

    let mut ctx = init_context()?;

    match command {
        Some(Commands::List { search, category }) => handle_list(&mut ctx, search, category),
        Some(Commands::Search {
            term,
            interactive,
            category,
        }) => {
            if interactive {
                handle_interactive_search(&mut ctx, category)
            } else {
                handle_list(&mut ctx, term, category)
            }
        }
        Some(Commands::Add {
            name,
            url,
            collection,
            fields,
        }) => handle_add(&mut ctx, name, url, collection, fields),
        Some(Commands::Edit {
            reference,
            name,
            url,
            fields,
        }) => handle_edit(&mut ctx, &reference, name, url, fields),
        Some(Commands::Open { reference, print }) => handle_open(&mut ctx, &reference, print),
        Some(Commands::Fav { reference }) => handle_fav(&mut ctx, &reference),
        Some(Commands::Rm { reference }) => handle_rm(&mut ctx, &reference),
        Some(Commands::View { reference }) => handle_view(&mut ctx, &reference),
        Some(Commands::Favicon { .. }) | Some(Commands::Config { .. }) => Ok(()),
        None => handle_list(&mut ctx, None, None),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("appdeck=debug")
    } else {
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "appdeck", "appdeck")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| DeckError::Config("Could not determine config dir".to_string()))
}

fn init_context() -> Result<AppContext> {
    let mut config = DeckConfig::load(config_dir()?)?;
    config.apply_env()?;
    tracing::debug!(base_url = %config.base_url, "using table api");

    let store = HttpStore::new(&config)?;
    let api = DeckApi::new(store, config.list_query());
    let runtime = Runtime::new()?;

    Ok(AppContext {
        api,
        config,
        runtime,
    })
}

/// Positions refer to the arranged listing, so load it first when given one.
fn resolve(ctx: &mut AppContext, selector: &str) -> Result<EntryRef> {
    if ctx.api.listed().is_empty() && selector.trim().parse::<usize>().is_ok() {
        let listing = ctx.runtime.block_on(ctx.api.load_all())?;
        print_messages(&listing.messages);
    }
    ctx.api.resolve(selector)
}

fn print_listing(result: &CmdResult) {
    let now = Utc::now();
    if let Some(summary) = &result.summary {
        print_summary(summary);
    }
    let cards: Vec<_> = result
        .listed_entries
        .iter()
        .map(|entry| entry_card(entry, now))
        .collect();
    print_entries(&cards);
    print_messages(&result.messages);
}

fn handle_list(
    ctx: &mut AppContext,
    search: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let result = if search.is_some() || category.is_some() {
        ctx.runtime.block_on(
            ctx.api
                .filter(search.as_deref().unwrap_or_default(), category.as_deref()),
        )?
    } else {
        ctx.runtime.block_on(ctx.api.load_all())?
    };
    print_listing(&result);
    Ok(())
}

/// Each stdin line is a search term; only the last of a quick burst is applied.
fn handle_interactive_search(ctx: &mut AppContext, category: Option<String>) -> Result<()> {
    let delay = ctx.config.debounce();
    let api = &mut ctx.api;

    ctx.runtime.block_on(async {
        let (debouncer, mut settled) = Debouncer::new(delay);

        // A plain thread: a blocked stdin read must not hold up runtime shutdown.
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if !debouncer.call(line) {
                    break;
                }
            }
        });

        let initial = api.filter("", category.as_deref()).await?;
        print_listing(&initial);

        while let Some(term) = settled.recv().await {
            println!();
            let result = api.filter(&term, category.as_deref()).await?;
            print_listing(&result);
        }
        Ok::<(), DeckError>(())
    })
}

fn handle_add(
    ctx: &mut AppContext,
    name: String,
    url: String,
    collection: Collection,
    fields: EntryFields,
) -> Result<()> {
    let mut form = EntryForm {
        name,
        url,
        ..EntryForm::new()
    };
    fields.apply(&mut form)?;

    let result = ctx
        .runtime
        .block_on(ctx.api.create_from_form(collection, &mut form))?;
    if let Some(entry) = result.affected_entries.first() {
        println!("{}", entry.entry_ref());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    reference: &str,
    name: Option<String>,
    url: Option<String>,
    fields: EntryFields,
) -> Result<()> {
    let target = resolve(ctx, reference)?;
    let mut form = ctx.runtime.block_on(ctx.api.edit_form(&target))?;
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(url) = url {
        form.url = url;
    }
    fields.apply(&mut form)?;

    let result = ctx
        .runtime
        .block_on(ctx.api.update_from_form(&target, &mut form))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_open(ctx: &mut AppContext, reference: &str, print_only: bool) -> Result<()> {
    let target = resolve(ctx, reference)?;
    let result = ctx.runtime.block_on(ctx.api.launch(&target))?;

    let Some(url) = result.launch_url.as_deref() else {
        print_messages(&result.messages);
        return Ok(());
    };
    if print_only {
        println!("{}", url);
        return Ok(());
    }
    print_messages(&result.messages);
    open_url(url)
}

fn handle_fav(ctx: &mut AppContext, reference: &str) -> Result<()> {
    let target = resolve(ctx, reference)?;
    let result = ctx.runtime.block_on(ctx.api.toggle_favorite(&target))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rm(ctx: &mut AppContext, reference: &str) -> Result<()> {
    let target = resolve(ctx, reference)?;
    let result = ctx.runtime.block_on(ctx.api.remove(&target))?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &mut AppContext, reference: &str) -> Result<()> {
    let target = resolve(ctx, reference)?;
    let result = ctx.runtime.block_on(ctx.api.show(&target))?;
    let now = Utc::now();
    for entry in &result.affected_entries {
        print_card(&entry_card(entry, now));
        print_subscription(&subscription_view(entry, now));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_favicon(url: &str) -> Result<()> {
    println!("{}", favicon_url(url)?);
    Ok(())
}

fn handle_config(key: Option<String>, value: Option<String>) -> Result<()> {
    let dir = config_dir()?;
    let mut config = DeckConfig::load(&dir)?;

    match (key, value) {
        (None, _) => {
            for key in KEYS {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
        (Some(key), None) => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => {
                return Err(DeckError::Config(format!(
                    "Unknown config key: {} (expected one of: {})",
                    key,
                    KEYS.join(", ")
                )))
            }
        },
        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save(&dir)?;
            print_messages(&[CmdMessage::success(format!(
                "{} = {}",
                key,
                config.get(&key).unwrap_or_default()
            ))]);
        }
    }
    Ok(())
}
