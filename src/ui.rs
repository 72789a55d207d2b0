use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState,
    },
    Frame, Terminal,
};
use tracing::warn;

use crate::config::{self, Config};
use crate::entry::WeightEntry;
use crate::error::ValidationError;
use crate::form::EntryForm;
use crate::notice::NoticeBoard;
use crate::store::EntryStore;
use crate::units::format_weight;

/// How far PageUp/PageDown jump in the history table.
const PAGE_JUMP: usize = 10;

/// How long the event loop waits for input before redrawing, so an expired
/// notice disappears without a keypress.
const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Log,
    History,
    Chart,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Log => Page::History,
            Page::History => Page::Chart,
            Page::Chart => Page::Log,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Log => Page::Chart,
            Page::History => Page::Log,
            Page::Chart => Page::History,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Log => "Log Entry",
            Page::History => "History",
            Page::Chart => "Chart",
        }
    }
}

/// Form field holding keyboard focus on the log page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Weight,
    MuscleMass,
    BodyFat,
    VisceralFat,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Weight => Field::MuscleMass,
            Field::MuscleMass => Field::BodyFat,
            Field::BodyFat => Field::VisceralFat,
            Field::VisceralFat => Field::Weight,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Weight => Field::VisceralFat,
            Field::MuscleMass => Field::Weight,
            Field::BodyFat => Field::MuscleMass,
            Field::VisceralFat => Field::BodyFat,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Field::Weight => "Weight",
            Field::MuscleMass => "Muscle Mass %",
            Field::BodyFat => "Body Fat %",
            Field::VisceralFat => "Visceral Fat",
        }
    }
}

pub struct App {
    store: EntryStore,
    pub config: Config,
    pub page: Page,
    pub form: EntryForm,
    pub focus: Field,
    /// Id of the entry being edited, if the form was loaded from one.
    pub editing: Option<String>,
    /// History cache, newest first. Refreshed after every mutation.
    pub entries: Vec<WeightEntry>,
    pub table: TableState,
    pub notices: NoticeBoard,
}

impl App {
    pub fn new(store: EntryStore, config: Config) -> Result<Self> {
        let display_unit = config.display_unit;
        let mut app = App {
            store,
            config,
            page: Page::Log,
            form: EntryForm::new(display_unit),
            focus: Field::Weight,
            editing: None,
            entries: Vec::new(),
            table: TableState::default(),
            notices: NoticeBoard::new(),
        };
        app.refresh()?;
        Ok(app)
    }

    /// Re-reads the history from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.entries = self.store.newest_first()?;
        if self.entries.is_empty() {
            self.table.select(None);
        } else {
            match self.table.selected() {
                Some(i) if i < self.entries.len() => {}
                _ => self.table.select(Some(0)),
            }
        }
        Ok(())
    }

    pub fn selected_entry(&self) -> Option<&WeightEntry> {
        self.table.selected().and_then(|i| self.entries.get(i))
    }

    pub fn next_row(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.table.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.table.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.table.selected() {
            Some(i) => (i + PAGE_JUMP).min(len - 1),
            None => 0,
        };
        self.table.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.table.selected() {
            Some(i) => i.saturating_sub(PAGE_JUMP),
            None => 0,
        };
        self.table.select(Some(i));
    }

    pub fn next_page(&mut self) {
        self.page = self.page.next();
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.previous();
    }

    /// Rotates the unit the history and chart render in, and keeps the
    /// preference for the next start.
    pub fn cycle_display_unit(&mut self) {
        self.config.display_unit = self.config.display_unit.next();
        if let Err(err) = config::save(&self.config) {
            warn!(error = %err, "failed to save display unit preference");
        }
    }

    pub fn post_notice(&mut self, message: impl Into<String>) {
        self.notices.post(message, Instant::now());
    }

    fn apply_form<F>(&mut self, action: F)
    where
        F: FnOnce(EntryForm) -> (EntryForm, Option<ValidationError>),
    {
        let form = std::mem::take(&mut self.form);
        let (form, error) = action(form);
        self.form = form;
        if let Some(error) = error {
            self.post_notice(error.to_string());
        }
    }

    pub fn type_char(&mut self, c: char) {
        // Numeric fields only; letters stay free for key commands.
        if !(c.is_ascii_digit() || c == '.' || c == '-') {
            return;
        }
        let focus = self.focus;
        self.apply_form(|form| {
            let form = match focus {
                Field::Weight => {
                    let text = format!("{}{}", form.weight, c);
                    form.type_weight(text)
                }
                Field::MuscleMass => {
                    let text = format!("{}{}", form.muscle_mass, c);
                    form.type_muscle_mass(text)
                }
                Field::BodyFat => {
                    let text = format!("{}{}", form.body_fat, c);
                    form.type_body_fat(text)
                }
                Field::VisceralFat => {
                    let text = format!("{}{}", form.visceral_fat, c);
                    form.type_visceral_fat(text)
                }
            };
            (form, None)
        });
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        self.apply_form(|form| {
            let shorten = |text: &str| {
                let mut text = text.to_string();
                text.pop();
                text
            };
            let form = match focus {
                Field::Weight => {
                    let text = shorten(&form.weight);
                    form.type_weight(text)
                }
                Field::MuscleMass => {
                    let text = shorten(&form.muscle_mass);
                    form.type_muscle_mass(text)
                }
                Field::BodyFat => {
                    let text = shorten(&form.body_fat);
                    form.type_body_fat(text)
                }
                Field::VisceralFat => {
                    let text = shorten(&form.visceral_fat);
                    form.type_visceral_fat(text)
                }
            };
            (form, None)
        });
    }

    /// Validates the field the cursor is leaving.
    pub fn commit_focused(&mut self) {
        let focus = self.focus;
        self.apply_form(|form| match focus {
            Field::Weight => form.commit_weight(),
            Field::MuscleMass => form.commit_muscle_mass(),
            Field::BodyFat => form.commit_body_fat(),
            Field::VisceralFat => form.commit_visceral_fat(),
        });
    }

    pub fn focus_next(&mut self) {
        self.commit_focused();
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.commit_focused();
        self.focus = self.focus.previous();
    }

    pub fn cycle_form_unit(&mut self) {
        self.apply_form(|form| {
            let next = form.unit.next();
            (form.select_unit(next), None)
        });
    }

    pub fn adjust_date(&mut self, days: i64) {
        self.apply_form(|form| {
            let date = form.date + ChronoDuration::days(days);
            (form.with_date(date), None)
        });
    }

    pub fn reset_date(&mut self) {
        self.apply_form(|form| (form.with_date(Utc::now()), None));
    }

    /// Finishes the form and persists it, either as a new entry or over the
    /// one being edited. The form resets on success; on failure it stays,
    /// minus the rejected field, and the broken rule shows in the banner.
    pub fn save_form(&mut self) {
        let form = std::mem::take(&mut self.form);
        let unit = form.unit;
        match form.finish(Utc::now()) {
            Ok(draft) => {
                let result = match self.editing.as_deref() {
                    Some(id) => self.store.update_entry(id, draft).map(|_| ()),
                    None => self.store.add_entry(draft).map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        self.form = EntryForm::new(unit);
                        self.editing = None;
                        if let Err(err) = self.refresh() {
                            self.post_notice(err.to_string());
                        }
                    }
                    Err(err) => self.post_notice(err.to_string()),
                }
            }
            Err((form, error)) => {
                self.form = form;
                self.post_notice(error.to_string());
            }
        }
    }

    /// Loads the selected history row into the form for editing.
    pub fn edit_selected(&mut self) {
        let Some(entry) = self.selected_entry().cloned() else {
            return;
        };
        self.form = EntryForm::for_entry(&entry);
        self.editing = Some(entry.id);
        self.focus = Field::Weight;
        self.page = Page::Log;
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_entry().map(|e| e.id.clone()) else {
            return;
        };
        match self.store.delete_entry(&id) {
            Ok(_) => {
                if let Err(err) = self.refresh() {
                    self.post_notice(err.to_string());
                }
            }
            Err(err) => self.post_notice(err.to_string()),
        }
    }

    /// Abandons the current form contents and any edit in progress.
    pub fn clear_form(&mut self) {
        let unit = self.form.unit;
        self.form = EntryForm::new(unit);
        self.editing = None;
        self.focus = Field::Weight;
    }

    /// Weight series for the chart, oldest first, in the display unit.
    /// X is days since the first entry.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.entries.len());
        let Some(first) = self.entries.last() else {
            return points;
        };
        for entry in self.entries.iter().rev() {
            let x = (entry.date - first.date).num_seconds() as f64 / 86_400.0;
            points.push((x, entry.weight_in(self.config.display_unit)));
        }
        points
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                _ => match app.page {
                    Page::Log => handle_log_key(app, key.code),
                    Page::History => {
                        if handle_history_key(app, key.code) {
                            return Ok(());
                        }
                    }
                    Page::Chart => {
                        if handle_chart_key(app, key.code) {
                            return Ok(());
                        }
                    }
                },
            }
        }
    }
}

fn handle_log_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char(c @ ('0'..='9' | '.' | '-')) => app.type_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Down => app.focus_next(),
        KeyCode::Up => app.focus_previous(),
        KeyCode::Enter => app.save_form(),
        KeyCode::Char('u') => app.cycle_form_unit(),
        KeyCode::Char('[') => app.adjust_date(-1),
        KeyCode::Char(']') => app.adjust_date(1),
        KeyCode::Char('t') => app.reset_date(),
        KeyCode::Char('x') => app.clear_form(),
        _ => {}
    }
}

/// Returns true when the app should quit.
fn handle_history_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Down | KeyCode::Char('j') => app.next_row(),
        KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Home => app.table.select(Some(0)),
        KeyCode::End => {
            if !app.entries.is_empty() {
                app.table.select(Some(app.entries.len() - 1));
            }
        }
        KeyCode::Char('u') => app.cycle_display_unit(),
        KeyCode::Char('e') => app.edit_selected(),
        KeyCode::Char('d') => app.delete_selected(),
        _ => {}
    }
    false
}

fn handle_chart_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('u') => app.cycle_display_unit(),
        _ => {}
    }
    false
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with page tabs
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar / notice banner
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.page {
        Page::Log => render_form(f, chunks[1], app),
        Page::History => render_history(f, chunks[1], app),
        Page::Chart => render_chart(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Log, Page::History, Page::Chart];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" | "));
        }
        let style = if *page == app.page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("    "));
    tab_spans.push(Span::styled(
        format!("Entries: {}", app.entries.len()),
        Style::default().fg(Color::White),
    ));
    if let Some(latest) = app.entries.first() {
        tab_spans.push(Span::raw("    "));
        tab_spans.push(Span::styled(
            format!(
                "Latest: {}",
                format_weight(latest.weight_kg, app.config.display_unit)
            ),
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.form;

    let field_line = |field: Field, text: &str, suffix: &str| {
        let focused = app.focus == field;
        let marker = if focused { "> " } else { "  " };
        let value_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::raw(format!("  {marker}")),
            Span::styled(
                format!("{:<16}", field.label()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(format!("{text}{cursor}"), value_style),
            Span::styled(format!(" {suffix}"), Style::default().fg(Color::DarkGray)),
        ])
    };

    let title = match &app.editing {
        Some(_) => " Edit Entry ",
        None => " New Entry ",
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Date            ", Style::default().fg(Color::Cyan)),
            Span::styled(
                form.date.format("%d/%m/%y %H:%M").to_string(),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                "   ([ / ] shift day, t = now)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(""),
        field_line(Field::Weight, &form.weight, form.unit.as_str()),
        Line::from(""),
        field_line(Field::MuscleMass, &form.muscle_mass, "%"),
        Line::from(""),
        field_line(Field::BodyFat, &form.body_fat, "%"),
        Line::from(""),
        field_line(Field::VisceralFat, &form.visceral_fat, ""),
        Line::from(""),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Photo           ", Style::default().fg(Color::Cyan)),
            Span::styled(
                form.photo.as_deref().unwrap_or("-"),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "    Hint: ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            Span::styled(
                "Up/Down moves between fields, u switches unit, Enter saves, x clears",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );
    f.render_widget(paragraph, area);
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    let unit = app.config.display_unit;

    let header_cells = [
        "Date".to_string(),
        format!("Weight ({unit})"),
        "Muscle %".to_string(),
        "Body Fat %".to_string(),
        "Visc. Fat".to_string(),
        "Pic".to_string(),
    ]
    .into_iter()
    .map(|h| {
        Cell::from(h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.entries.iter().map(|entry| {
        let cells = vec![
            Cell::from(entry.date.format("%d/%m/%y %H:%M").to_string()),
            Cell::from(format!("{:.1}", entry.weight_in(unit))),
            Cell::from(format!("{:.1}", entry.muscle_mass_percent)),
            Cell::from(format!("{:.1}", entry.body_fat_percent)),
            Cell::from(entry.visceral_fat.to_string()),
            Cell::from(if entry.photo.is_some() { "yes" } else { "-" }),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Stored Records "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    f.render_stateful_widget(table, area, &mut app.table);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let unit = app.config.display_unit;
    let points = app.chart_points();

    if points.is_empty() {
        let empty = Paragraph::new("No entries yet. Log one on the first page.").block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Weight over time ({unit}) ")),
        );
        f.render_widget(empty, area);
        return;
    }

    let max_x = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
    let (min_y, max_y) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
    let y_bounds = [min_y - 1.0, max_y + 1.0];

    let datasets = vec![Dataset::default()
        .name(format!("weight ({unit})"))
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" Weight over time ({unit}) ")),
        )
        .x_axis(
            Axis::default()
                .title("days")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, max_x])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", max_x / 2.0)),
                    Span::raw(format!("{:.0}", max_x)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(unit.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .bounds(y_bounds)
                .labels(vec![
                    Span::raw(format!("{:.1}", y_bounds[0])),
                    Span::raw(format!("{:.1}", (y_bounds[0] + y_bounds[1]) / 2.0)),
                    Span::raw(format!("{:.1}", y_bounds[1])),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    // An active notice takes over the whole bar.
    if let Some(notice) = app.notices.current(Instant::now()) {
        let banner = Paragraph::new(vec![Line::from(vec![Span::styled(
            format!(" {} ", notice.message()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )])])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        f.render_widget(banner, area);
        return;
    }

    let mut spans = vec![];
    match app.page {
        Page::Log => {
            spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Save | "));
            spans.push(Span::styled("Up/Down", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Field | "));
            spans.push(Span::styled("u", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Unit | "));
            spans.push(Span::styled("x", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Clear | "));
        }
        Page::History => {
            let selected = app.table.selected().map(|i| i + 1).unwrap_or(0);
            spans.push(Span::styled(
                format!(" Row: {}/{} ", selected, app.entries.len()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw("| "));
            spans.push(Span::styled("e", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Edit | "));
            spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Delete | "));
            spans.push(Span::styled("u", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Unit | "));
        }
        Page::Chart => {
            spans.push(Span::styled("u", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Unit | "));
        }
    }
    spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Page | "));
    spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entry::EntryDraft;
    use crate::units::WeightUnit;

    fn create_test_app() -> App {
        let mut store = EntryStore::open_in_memory().unwrap();
        for days_ago in [5, 3, 1] {
            store
                .add_entry(EntryDraft {
                    date: Utc::now() - ChronoDuration::days(days_ago),
                    weight_kg: 80.0 + days_ago as f64,
                    muscle_mass_percent: 40.0,
                    body_fat_percent: 20.0,
                    visceral_fat: 6,
                    weight_unit: WeightUnit::Kilograms,
                    photo: None,
                })
                .unwrap();
        }
        App::new(store, Config::default()).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    #[test]
    fn test_history_cache_is_newest_first() {
        let app = create_test_app();
        assert_eq!(app.entries.len(), 3);
        assert!(app.entries[0].date > app.entries[1].date);
        assert!(app.entries[1].date > app.entries[2].date);
    }

    #[test]
    fn test_row_selection_wraps() {
        let mut app = create_test_app();
        assert_eq!(app.table.selected(), Some(0));

        app.previous_row();
        assert_eq!(app.table.selected(), Some(2));
        app.next_row();
        assert_eq!(app.table.selected(), Some(0));
    }

    #[test]
    fn test_typed_entry_saves_and_clears_form() {
        let mut app = create_test_app();
        type_text(&mut app, "82.5");
        app.focus_next();
        type_text(&mut app, "40");
        app.focus_next();
        type_text(&mut app, "20");
        app.focus_next();
        app.type_char('6');

        app.save_form();
        assert_eq!(app.entries.len(), 4);
        assert_eq!(app.form.weight, "");
        assert!(!app.notices.is_visible(Instant::now()));
    }

    #[test]
    fn test_invalid_save_posts_notice_and_keeps_other_fields() {
        let mut app = create_test_app();
        type_text(&mut app, "82.5");
        // Muscle mass left empty, so the save must fail and say which field.
        app.save_form();

        assert_eq!(app.entries.len(), 3);
        assert!(app.notices.is_visible(Instant::now()));
        assert_eq!(app.form.weight, "82.5");
    }

    #[test]
    fn test_leaving_field_rejects_bad_percentage() {
        let mut app = create_test_app();
        app.focus = Field::MuscleMass;
        type_text(&mut app, "120");
        app.focus_next();

        assert!(app.notices.is_visible(Instant::now()));
        assert_eq!(app.form.muscle_mass, "");
    }

    #[test]
    fn test_edit_selected_loads_form_and_updates() {
        let mut app = create_test_app();
        app.table.select(Some(1));
        app.edit_selected();

        assert_eq!(app.page, Page::Log);
        let editing = app.editing.clone().unwrap();
        assert_eq!(editing, app.entries[1].id);

        app.focus = Field::Weight;
        app.apply_form(|form| (form.type_weight("90"), None));
        app.save_form();

        assert_eq!(app.entries.len(), 3);
        let edited = app.entries.iter().find(|e| e.id == editing).unwrap();
        assert_eq!(edited.weight_kg, 90.0);
        assert!(app.editing.is_none());
    }

    #[test]
    fn test_delete_selected_removes_row() {
        let mut app = create_test_app();
        let doomed = app.entries[0].id.clone();
        app.table.select(Some(0));
        app.delete_selected();

        assert_eq!(app.entries.len(), 2);
        assert!(app.entries.iter().all(|e| e.id != doomed));
    }

    #[test]
    fn test_chart_points_ascend_in_display_unit() {
        let mut app = create_test_app();
        app.config.display_unit = WeightUnit::Pounds;

        let points = app.chart_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].0, 0.0);
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        // Oldest test entry weighs 85 kg.
        assert!((points[0].1 - 85.0 * 2.20462).abs() < 1e-6);
    }
}
