use anyhow::Result;
use catalog_classifier::{sort_categories, CatalogSources, Location, SearchHit};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

/// What the table is showing
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Categories,
    Brands { category: String },
    Items { location: Location },
    Search { query: String, hits: Vec<SearchHit> },
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::Categories => " Categories ".to_string(),
            View::Brands { category } => format!(" {} ", category),
            View::Items { location } => format!(" {} ", location),
            View::Search { query, hits } => format!(" Search \"{}\" ({}) ", query, hits.len()),
        }
    }
}

pub struct App {
    pub sources: CatalogSources,
    pub view: View,
    pub state: TableState,
    /// Some while the search prompt is open
    pub search_input: Option<String>,
}

impl App {
    pub fn new(sources: CatalogSources) -> Self {
        let mut app = Self {
            sources,
            view: View::Categories,
            state: TableState::default(),
            search_input: None,
        };
        app.reset_selection();
        app
    }

    /// Table rows for the current view: (number, label, detail)
    pub fn rows(&self) -> Vec<[String; 3]> {
        let merged = self.sources.merged();
        match &self.view {
            View::Categories => sort_categories(&merged.category_names())
                .into_iter()
                .enumerate()
                .map(|(i, category)| {
                    let count = merged.category_count(&category);
                    [(i + 1).to_string(), category, count.to_string()]
                })
                .collect(),
            View::Brands { category } => merged
                .subcategories(category)
                .into_iter()
                .enumerate()
                .map(|(i, (brand, count))| [(i + 1).to_string(), brand, count.to_string()])
                .collect(),
            View::Items { location } => self
                .sources
                .bucket_listing(location)
                .into_iter()
                .map(|listed| {
                    [
                        listed.number.to_string(),
                        listed.item.description.clone(),
                        listed.item.price.to_string(),
                    ]
                })
                .collect(),
            View::Search { hits, .. } => hits
                .iter()
                .enumerate()
                .map(|(i, hit)| {
                    [
                        (i + 1).to_string(),
                        format!("{} ({} / {})", hit.item.description, hit.category, hit.subcategory),
                        hit.item.price.to_string(),
                    ]
                })
                .collect(),
        }
    }

    fn selected_label(&self) -> Option<String> {
        let index = self.state.selected()?;
        self.rows().into_iter().nth(index).map(|[_, label, _]| label)
    }

    fn reset_selection(&mut self) {
        let has_rows = !self.rows().is_empty();
        self.state.select(if has_rows { Some(0) } else { None });
    }

    /// Drill into the selected category or brand
    pub fn enter(&mut self) {
        let Some(label) = self.selected_label() else {
            return;
        };
        let next = match &self.view {
            View::Categories => View::Brands { category: label },
            View::Brands { category } => View::Items {
                location: Location::new(category.as_str(), label),
            },
            View::Items { .. } | View::Search { .. } => return,
        };
        self.view = next;
        self.reset_selection();
    }

    /// One level up
    pub fn back(&mut self) {
        self.view = match &self.view {
            View::Items { location } => View::Brands {
                category: location.category.clone(),
            },
            View::Brands { .. } | View::Search { .. } | View::Categories => View::Categories,
        };
        self.reset_selection();
    }

    pub fn run_search(&mut self, query: &str) {
        let hits = catalog_classifier::search(query, &self.sources.merged());
        self.view = View::Search {
            query: query.trim().to_string(),
            hits,
        };
        self.reset_selection();
    }

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Search prompt captures typing
            if let Some(input) = app.search_input.as_mut() {
                match key.code {
                    KeyCode::Enter => {
                        let query = input.clone();
                        app.search_input = None;
                        app.run_search(&query);
                    }
                    KeyCode::Esc => app.search_input = None,
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('/') => app.search_input = Some(String::new()),
                KeyCode::Enter => app.enter(),
                KeyCode::Backspace | KeyCode::Esc => app.back(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.reset_selection(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Status bar / search prompt
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Catalog",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Items: {}", app.sources.total_items()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("auto {} · moved {} · manual {}",
                app.sources.auto.item_count(),
                app.sources.moved.item_count(),
                app.sources.manual.item_count()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let columns = match app.view {
        View::Categories => ["#", "Category", "Items"],
        View::Brands { .. } => ["#", "Brand", "Items"],
        View::Items { .. } | View::Search { .. } => ["#", "Description", "Price"],
    };
    let header_cells = columns.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.rows().into_iter().map(|[number, label, detail]| {
        Row::new(vec![
            Cell::from(number),
            Cell::from(truncate(&label, 70)),
            Cell::from(detail).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [Constraint::Length(5), Constraint::Min(30), Constraint::Length(16)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(app.view.title()),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let spans = match &app.search_input {
        Some(input) => vec![
            Span::styled(" Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
            Span::styled("█", Style::default().fg(Color::White)),
        ],
        None => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            vec![
                Span::styled(
                    format!(" Row: {}/{} ", selected, app.rows().len()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" | "),
                Span::styled("Enter", Style::default().fg(Color::Yellow)),
                Span::raw(" Open | "),
                Span::styled("Esc", Style::default().fg(Color::Yellow)),
                Span::raw(" Back | "),
                Span::styled("/", Style::default().fg(Color::Yellow)),
                Span::raw(" Search | "),
                Span::styled("q", Style::default().fg(Color::Red)),
                Span::raw(" Quit"),
            ]
        }
    };

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Cut on characters, not bytes: descriptions are often Cyrillic
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
