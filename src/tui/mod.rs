//! Ratatui-based terminal UI.
//!
//! Four tabs mirror the panel's views: latest readings (auto-refreshing),
//! merged daily series with a chart, compliance KPIs, and the per-day
//! history. Fetches run on worker threads so the UI never blocks on the
//! network; see `spawn_fetch` for the stale-response guard.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Terminal,
};

use crate::app::pipeline::{self, DailyRun, HistoryRun};
use crate::cli::RangeArgs;
use crate::data::api::{finite, ComplianceStats, CurrentStats, DerivedMetric, StatsClient};
use crate::domain::{ComplianceStatus, DateRange, KpiGrade, MergedDailyRow, Metric, RangeBand};
use crate::error::AppError;
use crate::report::format::{fmt_opt, fmt_pct, fmt_summary};

mod plotters_chart;

use plotters_chart::DailySeriesChart;

/// The dashboard view re-polls the backend on this fixed interval, but only
/// while that tab is active (navigating away cancels the timer).
const CURRENT_REFRESH: Duration = Duration::from_secs(10);

/// Start the TUI.
pub fn run(args: RangeArgs) -> Result<(), AppError> {
    let client = StatsClient::from_env()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::data(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(client, args.resolve());
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::data(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::data(format!(
                "Failed to enter alternate screen: {e}"
            )));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Current,
    Daily,
    Compliance,
    History,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Current, Tab::Daily, Tab::Compliance, Tab::History];

    fn title(self) -> &'static str {
        match self {
            Tab::Current => "1 Current",
            Tab::Daily => "2 Daily",
            Tab::Compliance => "3 Compliance",
            Tab::History => "4 History",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

/// What a worker thread was asked to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Current,
    Daily,
    Compliance,
    History,
}

impl RequestKind {
    fn index(self) -> usize {
        match self {
            RequestKind::Current => 0,
            RequestKind::Daily => 1,
            RequestKind::Compliance => 2,
            RequestKind::History => 3,
        }
    }
}

enum Payload {
    Current(CurrentStats),
    Daily(DailyRun),
    Compliance(ComplianceStats),
    History(HistoryRun),
}

struct Reply {
    kind: RequestKind,
    seq: u64,
    outcome: Result<Payload, AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditStage {
    From,
    To,
}

struct App {
    client: StatsClient,
    tab: Tab,
    range: DateRange,

    editing: Option<EditStage>,
    from_input: String,
    to_input: String,

    status: String,

    current: Option<CurrentStats>,
    daily: Option<DailyRun>,
    compliance: Option<ComplianceStats>,
    history: Option<HistoryRun>,

    chart_metric: Metric,
    history_scroll: u16,

    tx: mpsc::Sender<Reply>,
    rx: mpsc::Receiver<Reply>,
    /// Last-issued sequence number per request kind; replies that do not
    /// match are stale and dropped, so an old response can never overwrite
    /// state produced by a newer request.
    issued: [u64; 4],
    pending: [bool; 4],
    next_seq: u64,

    last_current_fetch: Instant,
}

impl App {
    fn new(client: StatsClient, range: DateRange) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            client,
            tab: Tab::Current,
            range,
            editing: None,
            from_input: String::new(),
            to_input: String::new(),
            status: "Fetching latest readings...".to_string(),
            current: None,
            daily: None,
            compliance: None,
            history: None,
            chart_metric: Metric::Temperature,
            history_scroll: 0,
            tx,
            rx,
            issued: [0; 4],
            pending: [false; 4],
            next_seq: 0,
            last_current_fetch: Instant::now(),
        };
        app.spawn_fetch(RequestKind::Current);
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::data(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if self.drain_replies() {
                needs_redraw = true;
            }

            if self.tab == Tab::Current && self.last_current_fetch.elapsed() >= CURRENT_REFRESH {
                self.last_current_fetch = Instant::now();
                self.spawn_fetch(RequestKind::Current);
                needs_redraw = true;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::data(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::data(format!("Event read error: {e}")))? {
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

    // ----- fetching ---------------------------------------------------

    fn spawn_fetch(&mut self, kind: RequestKind) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.issued[kind.index()] = seq;
        self.pending[kind.index()] = true;

        let client = self.client.clone();
        let range = self.range;
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = fetch(kind, &client, &range);
            // The receiver is gone once the UI exits; nothing to do then.
            let _ = tx.send(Reply { kind, seq, outcome });
        });
    }

    fn drain_replies(&mut self) -> bool {
        let mut changed = false;
        while let Ok(reply) = self.rx.try_recv() {
            if reply.seq != self.issued[reply.kind.index()] {
                log::debug!(
                    "discarding stale {:?} response (seq {} != {})",
                    reply.kind,
                    reply.seq,
                    self.issued[reply.kind.index()],
                );
                continue;
            }
            self.pending[reply.kind.index()] = false;
            changed = true;

            match reply.outcome {
                Ok(payload) => {
                    match payload {
                        Payload::Current(stats) => self.current = Some(stats),
                        Payload::Daily(run) => self.daily = Some(run),
                        Payload::Compliance(stats) => self.compliance = Some(stats),
                        Payload::History(run) => {
                            self.history_scroll = 0;
                            self.history = Some(run);
                        }
                    }
                    self.status = format!(
                        "Updated at {}",
                        chrono::Local::now().format("%H:%M:%S")
                    );
                }
                Err(err) => {
                    // Previously displayed data stays visible (stale but
                    // shown) until the next refresh succeeds.
                    self.status = format!("Fetch failed: {err}");
                }
            }
        }
        changed
    }

    fn refresh_tab(&mut self, tab: Tab) {
        let kind = match tab {
            Tab::Current => RequestKind::Current,
            Tab::Daily => RequestKind::Daily,
            Tab::Compliance => RequestKind::Compliance,
            Tab::History => RequestKind::History,
        };
        if tab == Tab::Current {
            self.last_current_fetch = Instant::now();
        }
        self.status = "Fetching...".to_string();
        self.spawn_fetch(kind);
    }

    // ----- input ------------------------------------------------------

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_range_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('1') => self.switch_tab(Tab::Current),
            KeyCode::Char('2') => self.switch_tab(Tab::Daily),
            KeyCode::Char('3') => self.switch_tab(Tab::Compliance),
            KeyCode::Char('4') => self.switch_tab(Tab::History),
            KeyCode::Tab => {
                let next = Tab::ALL[(self.tab.index() + 1) % Tab::ALL.len()];
                self.switch_tab(next);
            }
            KeyCode::BackTab => {
                let prev = Tab::ALL[(self.tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len()];
                self.switch_tab(prev);
            }
            KeyCode::Char('r') => self.refresh_tab(self.tab),
            KeyCode::Char('m') => {
                if self.tab == Tab::Daily {
                    self.chart_metric = next_metric(self.chart_metric);
                    self.status = format!("chart: {}", self.chart_metric.display_name());
                }
            }
            KeyCode::Up => {
                if self.tab == Tab::History {
                    self.history_scroll = self.history_scroll.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if self.tab == Tab::History {
                    self.history_scroll = self.history_scroll.saturating_add(1);
                }
            }
            KeyCode::Enter => {
                self.editing = Some(EditStage::From);
                self.from_input = self.range.from_str_key();
                self.to_input = self.range.to_str_key();
                self.status =
                    "Editing range start (YYYY-MM-DD). Enter to continue, Esc to cancel."
                        .to_string();
            }
            KeyCode::Char('e') => self.export_report(),
            _ => {}
        }

        false
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        if tab == Tab::Current {
            self.last_current_fetch = Instant::now();
        }

        let missing = match tab {
            Tab::Current => self.current.is_none(),
            Tab::Daily => self.daily.is_none(),
            Tab::Compliance => self.compliance.is_none(),
            Tab::History => self.history.is_none(),
        };
        if missing {
            self.refresh_tab(tab);
        }
    }

    fn handle_range_edit(&mut self, code: KeyCode) {
        let Some(stage) = self.editing else {
            return;
        };

        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Range edit canceled.".to_string();
            }
            KeyCode::Enter => match stage {
                EditStage::From => {
                    self.editing = Some(EditStage::To);
                    self.status =
                        "Editing range end (YYYY-MM-DD). Enter to apply, Esc to cancel."
                            .to_string();
                }
                EditStage::To => self.apply_range_input(),
            },
            KeyCode::Backspace => {
                let input = match stage {
                    EditStage::From => &mut self.from_input,
                    EditStage::To => &mut self.to_input,
                };
                input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    let input = match stage {
                        EditStage::From => &mut self.from_input,
                        EditStage::To => &mut self.to_input,
                    };
                    if input.len() < 10 {
                        input.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn apply_range_input(&mut self) {
        let parse = |s: &str| chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d");

        let from = match parse(&self.from_input) {
            Ok(d) => d,
            Err(e) => {
                self.status = format!("Invalid start date '{}': {e}", self.from_input.trim());
                self.editing = Some(EditStage::From);
                return;
            }
        };
        let to = match parse(&self.to_input) {
            Ok(d) => d,
            Err(e) => {
                self.status = format!("Invalid end date '{}': {e}", self.to_input.trim());
                self.editing = Some(EditStage::To);
                return;
            }
        };
        if from > to {
            self.status = "Range start must not be after its end.".to_string();
            self.editing = Some(EditStage::From);
            return;
        }

        self.editing = None;
        self.range = DateRange { from, to };

        // Everything range-scoped is now stale; each tab refetches on entry.
        self.daily = None;
        self.compliance = None;
        self.history = None;
        if self.tab != Tab::Current {
            self.refresh_tab(self.tab);
        } else {
            self.status = format!("Range set to {}.", self.range);
        }
    }

    fn export_report(&mut self) {
        let report = crate::report::build_report(&crate::report::ReportInput {
            range: self.range,
            current: self.current.as_ref(),
            daily: self.daily.as_ref(),
            compliance: self.compliance.as_ref(),
            history: self.history.as_ref(),
        });
        let path = PathBuf::from(format!(
            "comfort_report_{}_{}.md",
            self.range.from_str_key(),
            self.range.to_str_key()
        ));
        match crate::io::export::write_report(&path, &report) {
            Ok(()) => self.status = format!("Wrote report: {}", path.display()),
            Err(err) => self.status = format!("Report write failed: {err}"),
        }
    }

    // ----- drawing ----------------------------------------------------

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Current => self.draw_current(frame, chunks[1]),
            Tab::Daily => self.draw_daily(frame, chunks[1]),
            Tab::Compliance => self.draw_compliance(frame, chunks[1]),
            Tab::History => self.draw_history(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut tabs: Vec<Span> = Vec::new();
        for tab in Tab::ALL {
            let style = if tab == self.tab {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            tabs.push(Span::styled(format!(" {} ", tab.title()), style));
            tabs.push(Span::raw(" "));
        }

        let range_line = if self.editing.is_some() {
            format!(
                "range: {} → {} (editing)",
                self.from_input, self.to_input
            )
        } else {
            format!("range: {}", self.range)
        };

        let fetching = if self.pending.iter().any(|p| *p) {
            " | fetching..."
        } else {
            ""
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("comfort", Style::default().fg(Color::Cyan)),
                Span::raw(" — classroom environment panel"),
            ]),
            Line::from(tabs),
            Line::from(Span::styled(
                format!("{range_line}{fetching}"),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "1-4/Tab views  r refresh  m chart metric  ↑/↓ scroll  Enter range  e report  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_current(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Min(0),
            ])
            .split(area);

        let Some(stats) = &self.current else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        // Source chips: last reading per sensor set.
        let last = |reading: &Option<crate::data::api::LatestReading>| {
            reading
                .as_ref()
                .and_then(|r| r.created_at.clone())
                .unwrap_or_else(|| "no readings yet".to_string())
        };
        let chips = Line::from(vec![
            Span::styled("BME680 ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(last(&stats.sources.bme_latest)),
            Span::raw("   "),
            Span::styled(
                "DHT22+BH1750 ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(last(&stats.sources.dht_latest)),
        ]);
        frame.render_widget(
            Paragraph::new(chips).block(Block::default().borders(Borders::ALL).title("Sources")),
            chunks[0],
        );

        // One card per metric.
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(chunks[1]);

        self.draw_stat_card(
            frame,
            cards[0],
            "Temperature",
            &stats.derived.temperature,
            1,
            "ASHRAE 23-27 °C",
        );
        self.draw_stat_card(
            frame,
            cards[1],
            "Humidity",
            &stats.derived.humidity,
            1,
            "recommended 40-60 %",
        );
        self.draw_stat_card(
            frame,
            cards[2],
            "Light",
            &stats.derived.light,
            0,
            "ISO 8995 300-500 lux",
        );
        self.draw_stat_card(
            frame,
            cards[3],
            "Pressure",
            &stats.derived.pressure,
            1,
            "informative only",
        );

        let note = Paragraph::new(
            "Values are compared against ASHRAE / WHO / ISO 8995 classroom \
             recommendations to surface out-of-comfort conditions quickly. \
             This view refreshes every 10 s while it is open.",
        )
        .wrap(ratatui::widgets::Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
        frame.render_widget(note, chunks[2]);
    }

    fn draw_stat_card(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        metric: &Option<DerivedMetric>,
        decimals: usize,
        hint: &str,
    ) {
        let (value, unit, status) = match metric {
            Some(m) => (
                fmt_opt(m.value, decimals),
                m.unit.clone().unwrap_or_default(),
                ComplianceStatus::from_wire(m.status.as_deref()),
            ),
            None => ("-".to_string(), String::new(), ComplianceStatus::NoData),
        };

        let lines = vec![
            Line::from(Span::styled(
                format!("{value} {unit}"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                status.display_name(),
                Style::default().fg(status_color(status)),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ];

        let card = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(status_color(status))),
        );
        frame.render_widget(card, area);
    }

    fn draw_daily(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.daily else {
            let msg = Paragraph::new("Waiting for data... (r to fetch)")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_daily_chart(frame, chunks[0], run);
        self.draw_daily_table(frame, chunks[1], run);
    }

    fn draw_daily_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &DailyRun) {
        let title = format!(
            "Daily {} ({})",
            self.chart_metric.display_name().to_lowercase(),
            self.chart_metric.unit()
        );
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = chart_data(run, self.chart_metric) else {
            let msg = Paragraph::new("No data for this metric in the selected range.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = DailySeriesChart {
            primary: &data.primary,
            secondary: &data.secondary,
            band: data.band,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            // Dates go on the manual tick row below; suppress the numeric
            // day-index labels Plotters would render.
            fmt_x: |_| String::new(),
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data, &run.rows);
        }
    }

    fn draw_daily_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect, run: &DailyRun) {
        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::from(Span::styled(
            format!(
                "{:<12} {:>8} {:>8} {:>8} {:>8} {:>7} {:>9}",
                "date", "bme °C", "dht °C", "bme %", "dht %", "lux", "hPa"
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for row in &run.rows {
            lines.push(Line::from(format!(
                "{:<12} {:>8} {:>8} {:>8} {:>8} {:>7} {:>9}",
                row.date,
                fmt_opt(row.bme_avg_temp, 1),
                fmt_opt(row.dht_avg_temp, 1),
                fmt_opt(row.bme_avg_hum, 1),
                fmt_opt(row.dht_avg_hum, 1),
                fmt_opt(row.dht_avg_lux, 0),
                fmt_opt(row.bme_avg_press, 1),
            )));
        }
        if run.rows.is_empty() {
            lines.push(Line::from("No data in the selected range."));
        } else {
            let s = &run.summary;
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "within band: temp {} | hum {} | light {} | temp+hum {}",
                    fmt_summary(&s.bme_temp),
                    fmt_summary(&s.bme_hum),
                    fmt_summary(&s.light),
                    fmt_summary(&s.both),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Daily averages"),
        );
        frame.render_widget(p, area);
    }

    fn draw_compliance(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(stats) = &self.compliance else {
            let msg = Paragraph::new("Waiting for data... (r to fetch)")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let th = stats.temperature_humidity.as_ref();
        let light = stats.light.as_ref();
        let temp_ok = th.and_then(|t| t.temp_ok_pct);
        let hum_ok = th.and_then(|t| t.hum_ok_pct);
        let both_ok = th.and_then(|t| t.both_ok_pct);
        let light_ok = light.and_then(|l| l.light_ok_pct);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        draw_kpi_gauge(frame, chunks[0], "Temperature within 23-27 °C", temp_ok);
        draw_kpi_gauge(frame, chunks[1], "Humidity within 40-60 %", hum_ok);
        draw_kpi_gauge(frame, chunks[2], "Temp + humidity simultaneously", both_ok);
        draw_kpi_gauge(frame, chunks[3], "Light within 300-500 lux", light_ok);

        let mut text = format!(
            "Based on {} BME680 readings and {} light readings.\n\n",
            th.and_then(|t| t.total).unwrap_or(0),
            light.and_then(|l| l.total).unwrap_or(0),
        );
        for line in
            crate::report::format::interpretation_lines(temp_ok, hum_ok, both_ok, light_ok)
        {
            text.push_str("- ");
            text.push_str(&line);
            text.push('\n');
        }
        let p = Paragraph::new(text)
            .wrap(ratatui::widgets::Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Interpretation"),
            );
        frame.render_widget(p, chunks[4]);
    }

    fn draw_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(run) = &self.history else {
            let msg = Paragraph::new("Waiting for data... (r to fetch)")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let text = crate::report::format::format_history(run);
        let p = Paragraph::new(text)
            .scroll((self.history_scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Daily history (↑/↓ to scroll)"),
            );
        frame.render_widget(p, area);
    }
}

fn fetch(kind: RequestKind, client: &StatsClient, range: &DateRange) -> Result<Payload, AppError> {
    match kind {
        RequestKind::Current => client.current().map(Payload::Current),
        RequestKind::Daily => pipeline::run_daily(client, range).map(Payload::Daily),
        RequestKind::Compliance => client.compliance(range).map(Payload::Compliance),
        RequestKind::History => pipeline::run_history(client, range).map(Payload::History),
    }
}

fn next_metric(cur: Metric) -> Metric {
    match cur {
        Metric::Temperature => Metric::Humidity,
        Metric::Humidity => Metric::Light,
        Metric::Light => Metric::Pressure,
        Metric::Pressure => Metric::Temperature,
    }
}

fn status_color(status: ComplianceStatus) -> Color {
    match status {
        ComplianceStatus::Within => Color::Green,
        ComplianceStatus::Below => Color::Cyan,
        ComplianceStatus::Above => Color::Red,
        ComplianceStatus::NoData => Color::DarkGray,
    }
}

fn grade_color(grade: KpiGrade) -> Color {
    match grade {
        KpiGrade::Good => Color::Green,
        KpiGrade::Mid => Color::Yellow,
        KpiGrade::Bad => Color::Red,
        KpiGrade::Neutral => Color::DarkGray,
    }
}

fn draw_kpi_gauge(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, pct: Option<f64>) {
    let grade = KpiGrade::from_pct(pct);
    let ratio = pct.map(|p| (p / 100.0).clamp(0.0, 1.0)).unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(grade_color(grade)))
        .ratio(ratio)
        .label(fmt_pct(pct));
    frame.render_widget(gauge, area);
}

/// Chart-ready series for one metric over the merged rows.
struct ChartData {
    primary: Vec<(f64, f64)>,
    secondary: Vec<(f64, f64)>,
    band: Option<RangeBand>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_data(run: &DailyRun, metric: Metric) -> Option<ChartData> {
    let rows = &run.rows;
    if rows.is_empty() {
        return None;
    }

    let pick = |row: &MergedDailyRow| -> (Option<f64>, Option<f64>) {
        match metric {
            Metric::Temperature => (row.bme_avg_temp, row.dht_avg_temp),
            Metric::Humidity => (row.bme_avg_hum, row.dht_avg_hum),
            Metric::Light => (row.dht_avg_lux, None),
            Metric::Pressure => (row.bme_avg_press, None),
        }
    };

    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let (p, s) = pick(row);
        if let Some(v) = finite(p) {
            primary.push((i as f64, v));
        }
        if let Some(v) = finite(s) {
            secondary.push((i as f64, v));
        }
    }
    if primary.is_empty() && secondary.is_empty() {
        return None;
    }

    let band = metric.band();
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(_, y) in primary.iter().chain(secondary.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    // Keep the band guides in view even when all values sit outside it.
    if let Some(band) = band {
        y_min = y_min.min(band.min);
        y_max = y_max.max(band.max);
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-9);

    let x_max = (rows.len() - 1) as f64;
    Some(ChartData {
        primary,
        secondary,
        band,
        x_bounds: [-0.25, x_max + 0.25],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Render date ticks under the x axis and value ticks beside the y axis.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    data: &ChartData,
    rows: &[MergedDailyRow],
) {
    let style = Style::default().fg(Color::Gray);

    // X ticks: dates at up to four evenly spaced day indexes, shortened to
    // MM-DD so neighboring labels stay apart.
    let ticks = rows.len().min(4);
    if ticks > 0 {
        for i in 0..ticks {
            let u = if ticks == 1 {
                0.0
            } else {
                i as f64 / (ticks as f64 - 1.0)
            };
            let idx = (u * (rows.len() - 1) as f64).round() as usize;
            let date = &rows[idx].date;
            let label = date.get(5..).unwrap_or(date).to_string();

            let x_span = data.x_bounds[1] - data.x_bounds[0];
            let frac = ((idx as f64 - data.x_bounds[0]) / x_span).clamp(0.0, 1.0);
            let x = chart.x + ((chart.width.saturating_sub(1)) as f64 * frac).round() as u16;
            let label_len = label.len() as u16;
            let start = x.saturating_sub(label_len / 2);
            let y = chart.y + chart.height;
            if y >= inner.y + inner.height {
                continue;
            }
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y,
                    width: label_len,
                    height: 1,
                },
            );
        }
    }

    // Y ticks: five evenly spaced values.
    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = data.y_bounds[0] + u * (data.y_bounds[1] - data.y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.1}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }
}
