use clap::{Args, Parser, Subcommand};
use travel_search::ContentType;

#[derive(Debug, Parser)]
#[command(name = "travel")]
#[command(about = "Search destinations, flights and hotels from the terminal")]
pub struct Cli {
    /// Use seeded in-memory data instead of the search API
    #[arg(long, global = true)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one search and print a page of results
    Search(SearchArgs),
    /// Print autocomplete suggestions for a partial query
    Suggest {
        query: String,
    },
    /// Interactive search prompt
    Interactive {
        #[arg(long = "type", short = 't', default_value_t = ContentType::Destinations)]
        content_type: ContentType,
    },
    /// Check that the search service is up
    Health,
    /// Store a bearer token for later requests
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: Option<String>,
    },
    /// Remove the stored session
    Logout,
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,

    #[arg(long = "type", short = 't', default_value_t = ContentType::Destinations)]
    pub content_type: ContentType,

    #[arg(long, short, default_value_t = 1)]
    pub page: u32,

    /// Field to sort by, e.g. "price" for flights
    #[arg(long)]
    pub sort_by: Option<String>,

    #[arg(long)]
    pub desc: bool,

    /// Filter as key=value, may be repeated
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,
}

pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_filters() {
        let cli = Cli::try_parse_from([
            "travel", "search", "paris", "--type", "hotels", "--sort-by", "rating", "--desc",
            "-f", "destination=Paris", "-f", "rating=5",
        ])
        .unwrap();

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.content_type, ContentType::Hotels);
        assert_eq!(args.sort_by.as_deref(), Some("rating"));
        assert!(args.desc);
        assert_eq!(args.page, 1);
        assert_eq!(
            args.filters,
            vec![
                ("destination".to_string(), "Paris".to_string()),
                ("rating".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["travel", "search", "x", "--type", "cars"]).is_err());
    }

    #[test]
    fn dev_flag_is_global() {
        let cli = Cli::try_parse_from(["travel", "suggest", "par", "--dev"]).unwrap();
        assert!(cli.dev);
    }

    #[test]
    fn filter_needs_a_key() {
        assert!(parse_filter("=5").is_err());
        assert!(parse_filter("rating").is_err());
        assert_eq!(
            parse_filter("rating=").unwrap(),
            ("rating".to_string(), String::new())
        );
    }
}
