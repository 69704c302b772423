use appdeck::error::Result;
use appdeck::form::{CategorySelection, EntryForm};
use appdeck::model::Collection;
use clap::{Args, Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.4.1" for releases, "0.4.1@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "appdeck", bin_name = "appdeck", version = get_version())]
#[command(about = "Catalog of AI apps: browse, launch, rate and track subscriptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entries from every collection
    #[command(alias = "ls")]
    List {
        /// Only entries whose name, description or tags contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only entries in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Search entries; with --interactive, reads search terms line by line from stdin
    Search {
        term: Option<String>,

        #[arg(short, long)]
        interactive: bool,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Register a new entry
    #[command(alias = "new")]
    Add {
        name: String,

        url: String,

        /// Table to store the entry in (general, creative, tools)
        #[arg(long, default_value = "general")]
        collection: Collection,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit an entry (only the given fields change)
    #[command(alias = "e")]
    Edit {
        /// Position in the listing (e.g. 3) or collection/id
        reference: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Open an entry's site and count the visit
    #[command(alias = "o")]
    Open {
        reference: String,

        /// Print the URL instead of starting the browser
        #[arg(long)]
        print: bool,
    },

    /// Toggle an entry's favorite flag
    Fav { reference: String },

    /// Delete an entry
    #[command(alias = "delete")]
    Rm { reference: String },

    /// Show an entry with its subscription details
    #[command(alias = "v")]
    View { reference: String },

    /// Print the favicon URL for a site
    Favicon { url: String },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., base_url)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

/// Form fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct EntryFields {
    /// Category (repeatable); replaces the current set on edit
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Icon image URL
    #[arg(long)]
    pub icon: Option<String>,

    /// Use the site's /favicon.ico as icon
    #[arg(long, conflicts_with = "icon")]
    pub favicon: bool,

    /// Comma-separated tags
    #[arg(short, long)]
    pub tags: Option<String>,

    /// 0 to 5 stars
    #[arg(short, long)]
    pub rating: Option<u32>,

    #[arg(long)]
    pub favorite: bool,

    /// free, paid or trial
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub plan: Option<String>,

    /// Monthly price
    #[arg(long)]
    pub price: Option<String>,

    /// monthly or yearly
    #[arg(long)]
    pub cycle: Option<String>,

    /// Subscription start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Next billing date, or trial end date (YYYY-MM-DD)
    #[arg(long)]
    pub next: Option<String>,
}

impl EntryFields {
    /// Copies the given flags onto the form. Must run after name and URL are set.
    pub fn apply(self, form: &mut EntryForm) -> Result<()> {
        if !self.categories.is_empty() {
            form.categories = CategorySelection::from_selected(self.categories);
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(icon) = self.icon {
            form.icon_url = icon;
        }
        if let Some(tags) = self.tags {
            form.tags = tags;
        }
        if let Some(rating) = self.rating {
            form.rating.select(rating)?;
        }
        if self.favorite {
            form.is_favorite = true;
        }

        let sub = &mut form.subscription;
        for (value, slot) in [
            (self.status, &mut sub.status),
            (self.plan, &mut sub.plan),
            (self.price, &mut sub.price),
            (self.cycle, &mut sub.billing_cycle),
            (self.start, &mut sub.start_date),
            (self.next, &mut sub.next_billing_date),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if self.favicon {
            form.use_favicon()?;
        }
        Ok(())
    }
}
