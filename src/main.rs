use clap::{Parser, Subcommand};
use pressdir::{DigestOptions, Filter, Output};
use url::Url;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Data root holding `sites.json` and `feeds/`, a url or a directory.
    /// Overrides the configured `data_root`
    #[clap(long, global = true, value_parser = pressdir::parse_data_root)]
    data: Option<Url>,
    /// Print markdown instead of html
    #[clap(long, short, global = true)]
    markdown: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List publishers matching the filters
    List {
        /// Case-insensitive text matched against name, url, slug,
        /// category and descriptions
        #[clap(long, short, default_value = "")]
        search: String,
        /// Only publishers in exactly this category
        #[clap(long, short, default_value = "")]
        category: String,
        /// Only publishers with a Mastodon profile
        #[clap(long)]
        social_only: bool,
        /// How many times to press "load more"
        #[clap(long, default_value_t = 0)]
        more: usize,
    },
    /// Show publisher counts, the category select and category chips
    Categories,
    /// Show the cached articles and social posts of one publisher
    Feed {
        slug: String,
        /// How many times to press "load more" on each panel
        #[clap(long, default_value_t = 0)]
        more: usize,
    },
    /// Show publishers in the same category as `slug`
    Related {
        slug: String,
        #[clap(long, default_value_t = 0)]
        more: usize,
    },
    /// Show the most recent social posts across publishers
    Digest {
        /// Number of publishers to sample
        #[clap(long)]
        sample: Option<usize>,
        /// Number of posts to show
        #[clap(long)]
        top: Option<usize>,
    },
    /// Write a default configuration file
    Setup {
        #[clap(long, short)]
        force: bool,
    },
    /// Interact with Configuration
    Config {
        /// The provided key will be reset to its default
        #[clap(long, short)]
        #[arg(conflicts_with("value"))]
        delete: bool,
        /// If a value is provided, the key to assign the value to
        /// if no value is provided print the configuration key's value
        #[arg(required_if_eq("delete", "true"))]
        key: Option<String>,
        /// The value to assign to the key
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), pressdir::Error> {
    env_logger::init();
    let args = Args::parse();
    let output = if args.markdown {
        Output::Markdown
    } else {
        Output::Html
    };
    let mut config = match &args.command {
        Command::Setup { .. } | Command::Config { .. } => pressdir::Config::default(),
        _ => pressdir::get_config().await?,
    };
    if let Some(data) = args.data {
        config.data_root = data;
    }
    match args.command {
        Command::List {
            search,
            category,
            social_only,
            more,
        } => {
            let filter = Filter::builder()
                .term(search)
                .category(category)
                .social_only(social_only)
                .build();
            pressdir::run_list(&config, output, filter, more).await?
        }
        Command::Categories => pressdir::run_categories(&config, output).await?,
        Command::Feed { slug, more } => pressdir::run_feed(&config, output, &slug, more).await?,
        Command::Related { slug, more } => {
            pressdir::run_related(&config, output, &slug, more).await?
        }
        Command::Digest { sample, top } => {
            let defaults = config.digest_options();
            let options = DigestOptions::builder()
                .sample(sample.unwrap_or(defaults.sample))
                .top(top.unwrap_or(defaults.top))
                .delay(defaults.delay)
                .build();
            pressdir::run_digest(&config, output, options).await?
        }
        Command::Setup { force } => pressdir::run_setup(force).await?,
        Command::Config { delete, key, value } => {
            pressdir::run_config(delete, key, value).await?
        }
    }
    Ok(())
}
