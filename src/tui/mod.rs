//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a country, date range,
//! granularity and chart resolution, then renders the statistic cards, the
//! cases/recovered/deaths chart and the population breakdown.
//!
//! Fetches run on a background worker. Every request carries a generation
//! number and only the response to the latest request is applied.

use std::io;
use std::num::NonZeroUsize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chrono::{Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{CountryData, DashboardView, build_view, fetch_country_data, load_country_data};
use crate::cli::DashArgs;
use crate::data::DataSources;
use crate::domain::{CountryMeta, DashboardConfig, Granularity, RangePreset, Sample, SliceKind};
use crate::error::AppError;
use crate::report::{format_grouped, format_number, format_population};
use crate::stats::is_increase;

mod plotters_chart;

use plotters_chart::{DashboardChart, hex_rgb};

/// Start the TUI.
pub fn run(args: DashArgs) -> Result<(), AppError> {
    let config = crate::app::dashboard_config_from_args(&args);
    let today = chrono::Local::now().date_naive();

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, today, Worker::spawn());
    app.start();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

enum Request {
    Country { generation: u64, config: DashboardConfig },
    CountryList,
}

enum Response {
    Country {
        generation: u64,
        result: Result<CountryData, AppError>,
    },
    CountryList(Result<Vec<CountryMeta>, AppError>),
}

/// Channel pair to the background fetch thread.
struct Worker {
    requests: Sender<Request>,
    responses: Receiver<Response>,
}

impl Worker {
    fn spawn() -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel::<Response>();

        std::thread::spawn(move || {
            let sources = DataSources::from_env();
            // Exits once the UI drops its sender.
            while let Ok(first) = req_rx.recv() {
                for request in latest_requests(first, req_rx.try_iter()) {
                    if resp_tx.send(serve(&sources, request)).is_err() {
                        return;
                    }
                }
            }
        });

        Self {
            requests: req_tx,
            responses: resp_rx,
        }
    }
}

/// Collapse a backlog of requests: only the newest country fetch survives,
/// and the country list is fetched at most once (first).
fn latest_requests(first: Request, rest: impl IntoIterator<Item = Request>) -> Vec<Request> {
    let mut wants_list = false;
    let mut country = None;
    let mut skipped = 0usize;

    for request in std::iter::once(first).chain(rest) {
        match request {
            Request::CountryList => wants_list = true,
            Request::Country { .. } => {
                if country.replace(request).is_some() {
                    skipped += 1;
                }
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "skipping superseded country fetches");
    }

    let mut batch = Vec::with_capacity(2);
    if wants_list {
        batch.push(Request::CountryList);
    }
    batch.extend(country);
    batch
}

fn serve(sources: &Result<DataSources, AppError>, request: Request) -> Response {
    match request {
        Request::Country { generation, config } => {
            let result = match (&config.timeline_file, sources) {
                (Some(_), _) => load_country_data(&config),
                (None, Ok(sources)) => fetch_country_data(sources, &config.country),
                (None, Err(err)) => Err(err.clone()),
            };
            Response::Country { generation, result }
        }
        Request::CountryList => Response::CountryList(match sources {
            Ok(sources) => sources.countries.fetch_all(),
            Err(err) => Err(err.clone()),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Country,
    Range,
    Start,
    End,
    Granularity,
    Points,
}

const FIELDS: [Field; 6] = [
    Field::Country,
    Field::Range,
    Field::Start,
    Field::End,
    Field::Granularity,
    Field::Points,
];

struct App {
    config: DashboardConfig,
    today: NaiveDate,
    selected_field: usize,
    editing: Option<Field>,
    input: String,
    status: String,
    worker: Worker,
    /// Generation of the latest country request; older responses are dropped.
    generation: u64,
    loading: bool,
    countries: Vec<CountryMeta>,
    data: Option<CountryData>,
    view: Option<DashboardView>,
}

impl App {
    fn new(config: DashboardConfig, today: NaiveDate, worker: Worker) -> Self {
        Self {
            config,
            today,
            selected_field: 0,
            editing: None,
            input: String::new(),
            status: String::new(),
            worker,
            generation: 0,
            loading: false,
            countries: Vec::new(),
            data: None,
            view: None,
        }
    }

    fn start(&mut self) {
        // The country list only drives ←/→ cycling; an offline session skips it.
        if self.config.timeline_file.is_none() {
            let _ = self.worker.requests.send(Request::CountryList);
        }
        self.request_fetch();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            while let Ok(response) = self.worker.responses.try_recv() {
                self.handle_response(response);
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn request_fetch(&mut self) {
        self.generation += 1;
        let request = Request::Country {
            generation: self.generation,
            config: self.config.clone(),
        };
        if self.worker.requests.send(request).is_err() {
            self.status = "Background fetch worker stopped.".to_string();
            return;
        }
        self.loading = true;
        self.status = format!("Fetching {}...", self.config.country);
    }

    fn handle_response(&mut self, response: Response) {
        match response {
            Response::Country { generation, result } => {
                if generation != self.generation {
                    tracing::debug!(generation, latest = self.generation, "discarding stale response");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(data) => {
                        let name = data.display_name();
                        self.data = Some(data);
                        if self.recompute() {
                            self.status = format!("Loaded {name}.");
                        }
                    }
                    Err(err) => {
                        tracing::warn!(country = %self.config.country, %err, "fetch failed");
                        self.status = err.message().to_string();
                        // Settings must describe what is on screen: fall back to the loaded country.
                        if let Some(data) = &self.data {
                            if !data.code.eq_ignore_ascii_case(&self.config.country) {
                                self.config.country = data.code.clone();
                                self.status = format!("{} Still showing {}.", err.message(), data.display_name());
                            }
                        }
                    }
                }
            }
            Response::CountryList(Ok(countries)) => {
                tracing::debug!(count = countries.len(), "country list loaded");
                self.countries = countries;
            }
            Response::CountryList(Err(err)) => {
                tracing::warn!(%err, "country list unavailable");
                if !self.loading {
                    self.status = format!("Country list unavailable: {err}");
                }
            }
        }
    }

    /// Rebuild the view from the payload already held. Keeps the last good view on error.
    fn recompute(&mut self) -> bool {
        let Some(data) = &self.data else {
            return false;
        };
        let result = self
            .config
            .resolve_interval(self.today)
            .and_then(|interval| build_view(data, interval, &self.config));
        match result {
            Ok(view) => {
                self.view = Some(view);
                true
            }
            Err(err) => {
                self.status = err.to_string();
                false
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let Some(field) = self.editing {
            self.handle_edit(field, code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELDS.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('g') => {
                self.config.granularity = self.config.granularity.next();
                self.after_setting_change(format!("granularity: {}", self.config.granularity.display_name()));
            }
            KeyCode::Char('p') => self.set_preset(self.config.preset.next()),
            KeyCode::Char('r') => self.request_fetch(),
            _ => {}
        }

        false
    }

    fn begin_edit(&mut self) {
        let field = FIELDS[self.selected_field];
        let current = match field {
            Field::Country => self.config.country.clone(),
            Field::Start => self.resolved_bounds().0.to_string(),
            Field::End => self.resolved_bounds().1.to_string(),
            _ => return,
        };
        self.editing = Some(field);
        self.input = current;
        self.status = match field {
            Field::Country => "Editing country code. Enter to fetch, Esc to cancel.".to_string(),
            _ => "Editing date (YYYY-MM-DD, empty = preset). Enter to apply, Esc to cancel.".to_string(),
        };
    }

    fn handle_edit(&mut self, field: Field, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                self.apply_input(field);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                let accepted = match field {
                    Field::Country => c.is_ascii_alphabetic(),
                    _ => c.is_ascii_digit() || c == '-',
                };
                if accepted {
                    self.input.push(c.to_ascii_uppercase());
                }
            }
            _ => {}
        }
    }

    fn apply_input(&mut self, field: Field) {
        let trimmed = self.input.trim().to_string();
        if field == Field::Country {
            if trimmed.is_empty() {
                self.status = "Country code cannot be empty.".to_string();
                return;
            }
            self.select_country(trimmed);
            return;
        }

        let date = if trimmed.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    self.status = format!("Invalid date '{trimmed}': {e}");
                    return;
                }
            }
        };
        match field {
            Field::Start => self.config.start = date,
            _ => self.config.end = date,
        }
        self.after_setting_change(format!("range: {}", self.range_label()));
    }

    fn adjust_field(&mut self, delta: i32) {
        match FIELDS[self.selected_field] {
            Field::Country => self.cycle_country(delta),
            Field::Range => {
                let preset = if delta >= 0 {
                    self.config.preset.next()
                } else {
                    prev_preset(self.config.preset)
                };
                self.set_preset(preset);
            }
            Field::Start | Field::End => {
                let is_start = FIELDS[self.selected_field] == Field::Start;
                let (start, end) = self.resolved_bounds();
                let current = if is_start { start } else { end };
                let shifted = if delta >= 0 {
                    current.checked_add_months(Months::new(1))
                } else {
                    current.checked_sub_months(Months::new(1))
                };
                let Some(shifted) = shifted else {
                    return;
                };
                if is_start {
                    self.config.start = Some(shifted);
                } else {
                    self.config.end = Some(shifted);
                }
                self.after_setting_change(format!("range: {}", self.range_label()));
            }
            Field::Granularity => {
                self.config.granularity = if delta >= 0 {
                    self.config.granularity.next()
                } else {
                    prev_granularity(self.config.granularity)
                };
                self.after_setting_change(format!("granularity: {}", self.config.granularity.display_name()));
            }
            Field::Points => {
                let next = if delta >= 0 {
                    self.config.target_points.get().saturating_add(1)
                } else {
                    self.config.target_points.get().saturating_sub(1)
                };
                self.config.target_points = NonZeroUsize::new(next).unwrap_or(NonZeroUsize::MIN);
                self.after_setting_change(format!("points: {}", self.config.target_points));
            }
        }
    }

    fn set_preset(&mut self, preset: RangePreset) {
        self.config.preset = preset;
        // A preset replaces any explicit bounds.
        self.config.start = None;
        self.config.end = None;
        self.after_setting_change(format!("range: {}", preset.display_name()));
    }

    fn after_setting_change(&mut self, message: String) {
        if self.data.is_none() || self.recompute() {
            self.status = message;
        }
    }

    fn cycle_country(&mut self, delta: i32) {
        if self.countries.is_empty() {
            self.status = "Country list not loaded; press Enter to type a code.".to_string();
            return;
        }
        let n = self.countries.len();
        let next = match self
            .countries
            .iter()
            .position(|c| c.code.eq_ignore_ascii_case(&self.config.country))
        {
            Some(idx) if delta >= 0 => (idx + 1) % n,
            Some(idx) => (idx + n - 1) % n,
            None => 0,
        };
        let code = self.countries[next].code.clone();
        self.select_country(code);
    }

    fn select_country(&mut self, code: String) {
        self.config.country = code.to_uppercase();
        self.request_fetch();
    }

    fn resolved_bounds(&self) -> (NaiveDate, NaiveDate) {
        let end = self.config.end.unwrap_or(self.today);
        let start = self.config.start.unwrap_or_else(|| self.config.preset.start_for(end));
        (start, end)
    }

    fn range_label(&self) -> String {
        let (start, end) = self.resolved_bounds();
        format!("{start} .. {end}")
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_cards(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("covid-dash", Style::default().fg(Color::Cyan)),
            Span::raw(" | COVID-19 and population dashboard"),
        ]));

        let detail = match &self.view {
            Some(view) => {
                let population = view
                    .population
                    .map(|p| format!("{} ({})", format_population(p), format_grouped(p)))
                    .unwrap_or_else(|| "unknown".to_string());
                let as_of = view
                    .statistics
                    .as_of
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let name = match &view.official_name {
                    Some(official) => format!("{} ({}, {official})", view.country, view.code),
                    None => format!("{} ({})", view.country, view.code),
                };
                format!("{name} | population: {population} | latest data: {as_of}")
            }
            None if self.loading => format!("Loading {}...", self.config.country),
            None => "No data loaded.".to_string(),
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_cards(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let cards = self.view.as_ref().map(|v| {
            [
                ("Total Cases", SliceKind::Active, v.statistics.cases.clone()),
                ("Recoveries", SliceKind::Recovered, v.statistics.recovered.clone()),
                ("Deaths", SliceKind::Deaths, v.statistics.deaths.clone()),
            ]
        });

        let Some(cards) = cards else {
            for (chunk, title) in chunks.iter().zip(["Total Cases", "Recoveries", "Deaths"]) {
                let block = Block::default().title(title).borders(Borders::ALL);
                frame.render_widget(Paragraph::new("-").block(block), *chunk);
            }
            return;
        };

        for (chunk, (title, kind, sample)) in chunks.iter().zip(cards) {
            let block = Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(slice_color(kind)));
            frame.render_widget(Paragraph::new(card_lines(&sample)).block(block), *chunk);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(42)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_chart(frame, chunks[0]);
        self.draw_partition(frame, side[0]);
        self.draw_settings(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut title = vec![
            Span::styled("Cases", Style::default().fg(slice_color(SliceKind::Active))),
            Span::raw(" / "),
            Span::styled("Recovered", Style::default().fg(slice_color(SliceKind::Recovered))),
            Span::raw(" / "),
            Span::styled("Deaths", Style::default().fg(slice_color(SliceKind::Deaths))),
        ];
        if self.view.as_ref().is_some_and(|v| v.chart.recovered_estimated) {
            title.push(Span::raw(" (recoveries estimated)"));
        }

        let block = Block::default().title(Line::from(title)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        if view.chart.is_empty() {
            let msg = Paragraph::new("No data available for the selected period.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let labels: Vec<String> = view.chart.rows.iter().map(|r| r.label.clone()).collect();
        frame.render_widget(DashboardChart::from_series(&view.chart, &labels), inner);
    }

    fn draw_partition(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Population").borders(Borders::ALL);
        let inner_width = block.inner(area).width as usize;

        let Some(partition) = self.view.as_ref().and_then(|v| v.partition.as_ref()) else {
            let p = Paragraph::new("Population data unavailable.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        };

        // "Unaffected " + bar + " 100.00%"
        let bar_width = inner_width.saturating_sub(20);
        let lines: Vec<Line> = partition
            .slices
            .iter()
            .map(|slice| {
                let share = partition.share(slice);
                let color = slice_color(slice.kind);
                let filled = bar_len(share, bar_width);
                Line::from(vec![
                    Span::raw(format!("{:<11}", slice.label)),
                    Span::styled("█".repeat(filled), Style::default().fg(color)),
                    Span::raw(" ".repeat(bar_width - filled)),
                    Span::raw(format!(" {share:>6.2}%")),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (start, end) = self.resolved_bounds();
        let country = self
            .countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(&self.config.country))
            .map(|c| format!("{} ({})", c.name, c.code))
            .unwrap_or_else(|| self.config.country.clone());
        let explicit = |set: bool| if set { "" } else { " (preset)" };

        let editing = |field: Field, value: String| {
            if self.editing == Some(field) {
                format!("{}_", self.input)
            } else {
                value
            }
        };

        let items = vec![
            ListItem::new(format!("Country: {}", editing(Field::Country, country))),
            ListItem::new(format!("Range: {}", self.config.preset.display_name())),
            ListItem::new(format!(
                "Start: {}",
                editing(Field::Start, format!("{start}{}", explicit(self.config.start.is_some())))
            )),
            ListItem::new(format!(
                "End: {}",
                editing(Field::End, format!("{end}{}", explicit(self.config.end.is_some())))
            )),
            ListItem::new(format!("Granularity: {}", self.config.granularity.display_name())),
            ListItem::new(format!("Points: {}", self.config.target_points)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new("Editing…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  p range  g granularity  r refetch  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn card_lines(sample: &Sample) -> Text<'static> {
    let (arrow, color) = if is_increase(&sample.percentage) {
        ("▲", Color::Red)
    } else {
        ("▼", Color::Green)
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format_number(sample.value),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(arrow, Style::default().fg(color)),
            Span::raw(format!(" {}", sample.percentage)),
        ]),
    ];
    if sample.estimated {
        lines.push(Line::from(Span::styled(
            "(estimated)",
            Style::default().fg(Color::Gray),
        )));
    }
    Text::from(lines)
}

fn slice_color(kind: SliceKind) -> Color {
    hex_rgb(kind.color())
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::White)
}

/// Filled cells for a `share` (percent) of a `width`-cell bar.
fn bar_len(share: f64, width: usize) -> usize {
    if !share.is_finite() || share <= 0.0 {
        return 0;
    }
    ((share / 100.0 * width as f64).round() as usize).min(width)
}

fn prev_preset(cur: RangePreset) -> RangePreset {
    let idx = RangePreset::ALL.iter().position(|p| *p == cur).unwrap_or(0);
    RangePreset::ALL[(idx + RangePreset::ALL.len() - 1) % RangePreset::ALL.len()]
}

fn prev_granularity(cur: Granularity) -> Granularity {
    cur.next().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricSeries, RawTimeline};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(entries: &[(&str, u64)]) -> MetricSeries {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn data(code: &str) -> CountryData {
        CountryData {
            code: code.to_string(),
            meta: None,
            summary: None,
            timeline_country: Some(format!("Country {code}")),
            timeline: RawTimeline {
                cases: series(&[("1/1/22", 100), ("1/2/22", 110)]),
                deaths: series(&[("1/1/22", 1), ("1/2/22", 2)]),
                recovered: None,
            },
        }
    }

    /// App wired to plain channels instead of a live worker thread.
    fn app() -> (App, Receiver<Request>, Sender<Response>) {
        let (req_tx, req_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let worker = Worker {
            requests: req_tx,
            responses: resp_rx,
        };
        let config = DashboardConfig {
            population: Some(1_000),
            ..DashboardConfig::default()
        };
        (App::new(config, d(2023, 6, 1), worker), req_rx, resp_tx)
    }

    fn deliver(app: &mut App, responses: &Sender<Response>, response: Response) {
        responses.send(response).unwrap();
        while let Ok(r) = app.worker.responses.try_recv() {
            app.handle_response(r);
        }
    }

    fn loaded_app() -> (App, Receiver<Request>, Sender<Response>) {
        let (mut app, requests, responses) = app();
        app.request_fetch();
        let generation = app.generation;
        deliver(
            &mut app,
            &responses,
            Response::Country {
                generation,
                result: Ok(data("USA")),
            },
        );
        while requests.try_recv().is_ok() {}
        (app, requests, responses)
    }

    #[test]
    fn stale_responses_are_discarded() {
        let (mut app, requests, responses) = app();
        app.request_fetch();
        app.select_country("DEU".to_string());
        assert_eq!(app.generation, 2);
        assert!(matches!(requests.try_recv(), Ok(Request::Country { generation: 1, .. })));
        assert!(matches!(
            requests.try_recv(),
            Ok(Request::Country { generation: 2, ref config }) if config.country == "DEU"
        ));

        deliver(&mut app, &responses, Response::Country { generation: 1, result: Ok(data("USA")) });
        assert!(app.data.is_none());
        assert!(app.loading);

        deliver(&mut app, &responses, Response::Country { generation: 2, result: Ok(data("DEU")) });
        assert_eq!(app.view.as_ref().unwrap().code, "DEU");
        assert!(!app.loading);
    }

    #[test]
    fn setting_changes_recompute_without_refetching() {
        let (mut app, requests, _responses) = loaded_app();
        let before = app.view.as_ref().unwrap().interval;
        assert_eq!(before.start(), d(2020, 6, 1));

        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.config.preset, RangePreset::AllTime);
        assert_eq!(app.view.as_ref().unwrap().interval.start(), d(2019, 1, 1));

        app.handle_key(KeyCode::Char('g'));
        assert_eq!(app.view.as_ref().unwrap().chart.granularity, Granularity::Month);

        app.selected_field = FIELDS.iter().position(|f| *f == Field::Points).unwrap();
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.target_points.get(), 9);

        assert!(requests.try_recv().is_err());
    }

    #[test]
    fn errors_keep_last_good_view() {
        let (mut app, _requests, responses) = loaded_app();

        app.select_country("ATA".to_string());
        let generation = app.generation;
        deliver(
            &mut app,
            &responses,
            Response::Country {
                generation,
                result: Err(AppError::new(3, "No data available: COVID-19 data is not available for ATA.")),
            },
        );
        assert_eq!(app.view.as_ref().unwrap().code, "USA");
        assert!(app.status.contains("not available for ATA"));
        assert!(app.status.ends_with("Still showing Country USA."));
        // Settings follow the data on screen, so later recomputes stay consistent.
        assert_eq!(app.config.country, "USA");
        app.handle_key(KeyCode::Char('g'));
        assert_eq!(app.view.as_ref().unwrap().code, "USA");

        // Start after end: the range is rejected and the view stays.
        app.config.start = Some(d(2024, 1, 1));
        assert!(!app.recompute());
        assert!(app.status.starts_with("Invalid date range"));
        assert_eq!(app.view.as_ref().unwrap().interval.start(), d(2020, 6, 1));
    }

    #[test]
    fn date_edit_applies_typed_bound() {
        let (mut app, _requests, _responses) = loaded_app();
        app.selected_field = FIELDS.iter().position(|f| *f == Field::Start).unwrap();
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.editing, Some(Field::Start));

        app.input.clear();
        for c in "2022-01-02".chars() {
            app.handle_key(KeyCode::Char(c));
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.editing, None);
        assert_eq!(app.config.start, Some(d(2022, 1, 2)));
        assert_eq!(app.view.as_ref().unwrap().interval.start(), d(2022, 1, 2));
    }

    #[test]
    fn country_cycling_wraps_and_fetches() {
        let (mut app, requests, _responses) = loaded_app();
        app.countries = ["DEU", "IND", "USA"]
            .iter()
            .map(|code| CountryMeta {
                name: code.to_string(),
                official_name: code.to_string(),
                code: code.to_string(),
                population: 1,
            })
            .collect();

        app.cycle_country(1);
        assert_eq!(app.config.country, "DEU");
        app.cycle_country(-1);
        assert_eq!(app.config.country, "USA");
        assert_eq!(requests.try_iter().count(), 2);
    }

    #[test]
    fn worker_backlog_keeps_only_newest_fetch() {
        let fetch = |generation| Request::Country {
            generation,
            config: DashboardConfig::default(),
        };

        let batch = latest_requests(fetch(1), vec![Request::CountryList, fetch(2), fetch(3)]);
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch[0], Request::CountryList));
        assert!(matches!(batch[1], Request::Country { generation: 3, .. }));

        let batch = latest_requests(fetch(7), Vec::new());
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch[0], Request::Country { generation: 7, .. }));

        let batch = latest_requests(Request::CountryList, vec![Request::CountryList]);
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch[0], Request::CountryList));
    }

    #[test]
    fn queued_keypresses_collapse_to_last_country() {
        let (mut app, requests, _responses) = loaded_app();
        for code in ["DEU", "FRA", "IND"] {
            app.select_country(code.to_string());
        }
        let first = requests.recv().unwrap();
        let batch = latest_requests(first, requests.try_iter());
        assert_eq!(batch.len(), 1);
        assert!(matches!(
            &batch[0],
            Request::Country { generation, config } if *generation == app.generation && config.country == "IND"
        ));
    }

    #[test]
    fn bar_len_scales_and_clamps() {
        assert_eq!(bar_len(0.0, 20), 0);
        assert_eq!(bar_len(50.0, 20), 10);
        assert_eq!(bar_len(100.0, 20), 20);
        assert_eq!(bar_len(150.0, 20), 20);
        assert_eq!(bar_len(f64::NAN, 20), 0);
    }
}
