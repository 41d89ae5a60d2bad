use std::{io::Write, sync::Arc};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use travel_search::{ContentType, SearchBackend, SearchCoordinator, SuggestionFetcher};

use crate::{config::TravelConfig, render};

const HELP: &str = "\
Type a query to search, or one of:
  ?text           autocomplete suggestions for text
  :select N       search for suggestion N
  :type T         destinations | flights | hotels
  :sort KEY [desc]  sort by KEY, `:sort` alone for server order
  :page N, :next, :prev
  :filter k=v, :unfilter k
  :clear, :reset, :help, :quit";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Search(String),
    Suggest(String),
    Select(usize),
    Type(ContentType),
    Sort(Option<String>, bool),
    Page(u32),
    Next,
    Prev,
    Filter(String, String),
    Unfilter(String),
    Clear,
    Reset,
    Help,
    Quit,
    Empty,
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }
        if let Some(text) = line.strip_prefix('?') {
            return Ok(Command::Suggest(text.to_string()));
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Search(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();

        match (name, arg) {
            ("select", Some(n)) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::Select)
                .ok_or_else(|| format!("Not a suggestion number: {}", n)),
            ("type", Some(t)) => t.parse().map(Command::Type).map_err(|e| e.to_string()),
            ("sort", key) => {
                let descending = words.next().is_some_and(|w| w.eq_ignore_ascii_case("desc"));
                Ok(Command::Sort(key.map(str::to_string), descending))
            }
            ("page", Some(n)) => n
                .parse()
                .map(Command::Page)
                .map_err(|_| format!("Not a page number: {}", n)),
            ("next", None) => Ok(Command::Next),
            ("prev", None) => Ok(Command::Prev),
            ("filter", Some(pair)) => crate::cli::parse_filter(pair)
                .map(|(key, value)| Command::Filter(key, value)),
            ("unfilter", Some(key)) => Ok(Command::Unfilter(key.to_string())),
            ("clear", None) => Ok(Command::Clear),
            ("reset", None) => Ok(Command::Reset),
            ("help", _) => Ok(Command::Help),
            ("quit" | "q" | "exit", _) => Ok(Command::Quit),
            _ => Err(format!("Unknown command :{}. Try :help", rest)),
        }
    }
}

struct Repl {
    search: SearchCoordinator<dyn SearchBackend>,
    suggestions: SuggestionFetcher<dyn SearchBackend>,
    page_window: u32,
}

pub async fn run(
    backend: Arc<dyn SearchBackend>,
    config: &TravelConfig,
    content_type: ContentType,
) -> Result<()> {
    let mut repl = Repl {
        search: SearchCoordinator::new(Arc::clone(&backend)),
        suggestions: SuggestionFetcher::with_delay(backend, config.debounce()),
        page_window: config.page_window,
    };
    repl.search.set_content_type(content_type);

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", repl.search.state().content_type);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => repl.handle(command).await?,
            Err(message) => eprintln!("{}", message),
        }
    }
    Ok(())
}

impl Repl {
    async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Search(query) => {
                self.suggestions.clear();
                self.run_search(1, Some(&query), None).await;
            }
            Command::Suggest(text) => {
                self.suggestions.set_query(text).await?;
                let state = self.suggestions.snapshot();
                match state.error {
                    Some(e) => eprintln!("Error: {}", e),
                    None if !state.has_results() => println!("No suggestions."),
                    None => print!("{}", render::suggestions(&state.items)),
                }
            }
            Command::Select(n) => {
                let items = self.suggestions.snapshot().items;
                match items.get(n - 1).cloned() {
                    Some(item) => {
                        let item = self.suggestions.select_result(item);
                        self.run_search(1, Some(&item.text), Some(item.content_type()))
                            .await;
                    }
                    None => eprintln!("No suggestion {}", n),
                }
            }
            Command::Type(content_type) => {
                self.search.set_content_type(content_type);
                println!("Searching {}", content_type);
            }
            Command::Sort(key, descending) => {
                let content_type = self.search.state().content_type;
                match self.search.set_sort(key.as_deref(), descending).await {
                    Ok(Some(response)) => {
                        print!("{}", render::results(response, content_type));
                        self.print_pager();
                    }
                    Ok(None) => println!("Sort updated."),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Command::Page(page) => self.go_to(|p| p.go_to_page(page)).await,
            Command::Next => self.go_to(|p| p.next_page()).await,
            Command::Prev => self.go_to(|p| p.prev_page()).await,
            Command::Filter(key, value) => {
                self.search.filters_mut().add(key, value);
                println!("{} filter(s) active", self.search.filters().len());
            }
            Command::Unfilter(key) => {
                if self.search.filters_mut().remove(&key).is_none() {
                    eprintln!("No filter on {}", key);
                }
            }
            Command::Clear => {
                self.search.clear_results();
                self.suggestions.clear();
            }
            Command::Reset => {
                self.search.reset_search();
                self.suggestions.clear();
            }
            Command::Help => println!("{}", HELP),
            Command::Quit | Command::Empty => {}
        }
        Ok(())
    }

    async fn run_search(
        &mut self,
        page: u32,
        query: Option<&str>,
        content_type: Option<ContentType>,
    ) {
        let shown_as = content_type.unwrap_or(self.search.state().content_type);
        match self.search.execute_search(page, query, content_type).await {
            Ok(response) => {
                print!("{}", render::results(response, shown_as));
                self.print_pager();
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    /// Move within the current result set and fetch the new page.
    async fn go_to(&mut self, step: impl FnOnce(&mut travel_search::Pagination) -> bool) {
        if !self.search.has_results() {
            eprintln!("Search first.");
            return;
        }
        let mut pagination = self.search.pagination();
        if step(&mut pagination) {
            self.run_search(pagination.current_page(), None, None).await;
        } else {
            eprintln!("No such page.");
        }
    }

    fn print_pager(&self) {
        let pager = render::pager(&self.search.pagination(), self.page_window);
        if !pager.is_empty() {
            println!("{}", pager);
        }
    }
}
