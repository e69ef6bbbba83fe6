//! Ratatui-based terminal dashboard.
//!
//! The TUI loads the dataset once, then lets the user pick a metric, a
//! country, the moving-average window and the forecast toggle. Every change
//! recomputes the view from the retained dataset.

use std::io;
use std::path::Path;
use std::time::Duration;

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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::{ChartView, build_view};
use crate::data::{LoadedData, load_dataset};
use crate::domain::{DashboardConfig, MOVING_AVERAGE_COLOR_RGB, RegionFilter, ViewSelection};
use crate::error::AppError;
use crate::io::export::{ExportFormat, write_view};
use crate::report::fmt_count;

mod plotters_chart;

use plotters_chart::SeriesPlottersChart;

/// File written by the `e` key, relative to the working directory.
pub const EXPORT_PATH: &str = "covid-dash-export.csv";

const FORECAST_COLOR_RGB: (u8, u8, u8) = (255, 215, 0);

/// Settings rows, in display order.
const FIELD_METRIC: usize = 0;
const FIELD_COUNTRY: usize = 1;
const FIELD_FORECAST: usize = 2;
const FIELD_WINDOW: usize = 3;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before touching the terminal; a slow URL fetch should not leave a
    // blank alternate screen behind.
    let mut app = App::new(config);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

struct App {
    selection: ViewSelection,
    loaded: LoadedData,
    regions: Vec<String>,
    region_index: Option<usize>,
    selected_field: usize,
    status: String,
    view: ChartView,
}

impl App {
    fn new(config: DashboardConfig) -> Self {
        let loaded = load_dataset(config.source.as_ref(), config.seed);
        let regions = loaded.dataset.regions();
        let selection = config.selection;
        let region_index = regions
            .iter()
            .position(|r| r == selection.region.display_name());

        let status = match (&region_index, &loaded.fallback_reason) {
            (None, _) => format!("'{}' not in dataset", selection.region),
            (Some(_), Some(reason)) => format!("Synthetic data: {reason}"),
            (Some(_), None) => "Ready.".to_string(),
        };

        let view = build_view(&loaded.dataset, &selection);
        Self {
            selection,
            loaded,
            regions,
            region_index,
            selected_field: FIELD_METRIC,
            status,
            view,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > FIELD_METRIC {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_WINDOW {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('m') => self.step_metric(1),
            KeyCode::Char('f') => self.toggle_forecast(),
            KeyCode::Char('c') => self.step_region(1),
            KeyCode::Char('C') => self.step_region(-1),
            KeyCode::Char('e') => self.export(Path::new(EXPORT_PATH)),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_field {
            FIELD_METRIC => self.step_metric(delta),
            FIELD_COUNTRY => self.step_region(delta),
            FIELD_FORECAST => self.toggle_forecast(),
            FIELD_WINDOW => {
                let next = if delta >= 0 {
                    self.selection.window.saturating_add(1)
                } else {
                    self.selection.window.saturating_sub(1)
                };
                self.selection.window = next.max(1);
                self.refresh_view();
                self.status = format!("window: {}", self.selection.window);
            }
            _ => {}
        }
    }

    fn step_metric(&mut self, delta: i32) {
        self.selection.metric = if delta >= 0 {
            self.selection.metric.next()
        } else {
            self.selection.metric.prev()
        };
        self.refresh_view();
        self.status = format!("metric: {}", self.selection.metric.label());
    }

    fn toggle_forecast(&mut self) {
        self.selection.show_forecast = !self.selection.show_forecast;
        self.refresh_view();
        self.status = match (self.selection.show_forecast, self.view.forecast.is_empty()) {
            (false, _) => "forecast: off".to_string(),
            (true, false) => format!("forecast: {} steps", self.view.forecast.len()),
            (true, true) => "forecast: not enough history".to_string(),
        };
    }

    fn step_region(&mut self, delta: i32) {
        if self.regions.is_empty() {
            return;
        }
        let n = self.regions.len();
        let next = match self.region_index {
            Some(i) if delta >= 0 => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        self.region_index = Some(next);
        self.selection.region = RegionFilter::parse(&self.regions[next]);
        self.refresh_view();
        self.status = format!("country: {}", self.selection.region);
    }

    fn export(&mut self, path: &Path) {
        let note = self.loaded.dataset.source_note();
        match write_view(path, &self.view, &note, ExportFormat::Csv) {
            Ok(()) => {
                info!(path = %path.display(), rows = self.view.rows.len(), "exported view");
                self.status = format!("Wrote {} rows to {}", self.view.rows.len(), path.display());
            }
            Err(err) => {
                warn!(error = %err, "export failed");
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn refresh_view(&mut self) {
        self.view = build_view(&self.loaded.dataset, &self.selection);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("covid-dash", Style::default().fg(Color::Cyan)),
            Span::raw(" | COVID-19 Time Series & Forecasting"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "{} | regions: {} | points: {}",
                self.loaded.dataset.source_note(),
                self.regions.len().saturating_sub(1),
                self.view.series.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let latest = match self.view.latest() {
            Some(p) => format!(
                "latest {}: {} ({})",
                p.date,
                fmt_count(p.value(self.selection.metric)),
                p.period_label
            ),
            None => "no data".to_string(),
        };
        lines.push(Line::from(Span::styled(latest, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = chart_series(&self.view) else {
            let msg = Paragraph::new(format!("No data for {}.", self.selection.region))
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let fmt_x = |v: f64| period_at(&self.view, v);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SeriesPlottersChart {
            values: &data.values,
            moving_average: &data.moving_average,
            forecast: &data.forecast,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "period",
            y_label: self.selection.metric.label(),
            color: self.selection.metric.color_rgb(),
            ma_color: MOVING_AVERAGE_COLOR_RGB,
            forecast_color: FORECAST_COLOR_RGB,
            fmt_x: &fmt_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &data, &fmt_x, self.selection.metric.label());
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let country = match self.region_index {
            Some(i) => format!("{} ({}/{})", self.selection.region, i + 1, self.regions.len()),
            None => format!("{} (not in dataset)", self.selection.region),
        };
        let forecast = if self.selection.show_forecast {
            format!("on ({} steps)", self.selection.horizon)
        } else {
            "off".to_string()
        };

        let items = vec![
            ListItem::new(format!("Metric: {}", self.selection.metric.label())),
            ListItem::new(format!("Country: {country}")),
            ListItem::new(format!("Forecast: {forecast}")),
            ListItem::new(format!("Window: {}", self.selection.window)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  m metric  f forecast  c/C country  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart series in row-index coordinates.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    values: Vec<(f64, f64)>,
    moving_average: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters. `None` when the view has no rows.
fn chart_series(view: &ChartView) -> Option<ChartData> {
    if view.rows.is_empty() {
        return None;
    }

    let mut values = Vec::with_capacity(view.series.len());
    let mut moving_average = Vec::with_capacity(view.series.len());
    let mut forecast = Vec::with_capacity(view.forecast.len() + 1);

    for (i, row) in view.rows.iter().enumerate() {
        let x = i as f64;
        if row.is_forecast {
            // Join the forecast line onto the last observed point.
            if forecast.is_empty() {
                if let Some(&last) = values.last() {
                    forecast.push(last);
                }
            }
            forecast.push((x, row.value as f64));
        } else {
            values.push((x, row.value as f64));
            if let Some(ma) = row.moving_average {
                moving_average.push((x, ma as f64));
            }
        }
    }

    let x_bounds = [0.0, (view.rows.len().saturating_sub(1)).max(1) as f64];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in values.iter().chain(&moving_average).chain(&forecast) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    Some(ChartData {
        values,
        moving_average,
        forecast,
        x_bounds,
        y_bounds,
    })
}

/// Period label of the row nearest to `x`.
fn period_at(view: &ChartView, x: f64) -> String {
    if view.rows.is_empty() || !x.is_finite() {
        return String::new();
    }
    let i = (x.round().max(0.0) as usize).min(view.rows.len() - 1);
    view.rows[i].period_label.clone()
}

fn fmt_axis_y(v: f64) -> String {
    fmt_count(v.round() as i64)
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
        left: 12,
        right: 4,
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

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    data: &ChartData,
    fmt_x: &dyn Fn(f64) -> String,
    y_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = data.x_bounds;
    let [y0, y1] = data.y_bounds;

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_x(x0 + u * (x1 - x0));
        let label_len = label.chars().count() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
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

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y0 + u * (y1 - y0));
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

    let x_label = Paragraph::new("period")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(y_label.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metric;

    fn synthetic_app() -> App {
        App::new(DashboardConfig {
            source: None,
            seed: 7,
            selection: ViewSelection::default(),
        })
    }

    #[test]
    fn metric_and_forecast_keys_recompute_the_view() {
        let mut app = synthetic_app();
        assert_eq!(app.view.rows.len(), 100);

        assert!(!app.handle_key(KeyCode::Char('m')));
        assert_eq!(app.selection.metric, Metric::Deaths);
        assert_eq!(app.view.metric(), Metric::Deaths);

        app.handle_key(KeyCode::Char('f'));
        assert!(app.selection.show_forecast);
        assert_eq!(app.view.forecast.len(), app.selection.horizon);
        assert_eq!(app.view.rows.len(), 100 + app.selection.horizon);

        app.handle_key(KeyCode::Char('f'));
        assert_eq!(app.view.rows.len(), 100);
    }

    #[test]
    fn window_field_never_drops_below_one() {
        let mut app = synthetic_app();
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_field, FIELD_WINDOW);

        for _ in 0..10 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.selection.window, 1);
        assert_eq!(app.view.rows[3].moving_average, Some(app.view.rows[3].value));
    }

    #[test]
    fn country_keys_cycle_through_regions() {
        // Synthetic data only offers "Global", so cycling stays there.
        let mut app = synthetic_app();
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.selection.region, RegionFilter::Global);
        app.handle_key(KeyCode::Char('C'));
        assert_eq!(app.region_index, Some(0));
    }

    #[test]
    fn quit_keys() {
        let mut app = synthetic_app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn chart_series_joins_forecast_to_last_observation() {
        let mut app = synthetic_app();
        app.handle_key(KeyCode::Char('f'));
        let data = chart_series(&app.view).unwrap();

        assert_eq!(data.values.len(), 100);
        assert_eq!(data.forecast.len(), app.selection.horizon + 1);
        assert_eq!(data.forecast[0], data.values[99]);
        assert_eq!(data.x_bounds, [0.0, (100 + app.selection.horizon - 1) as f64]);
        assert!(data.y_bounds[0] < data.y_bounds[1]);
    }

    #[test]
    fn period_ticks_map_back_to_labels() {
        let app = synthetic_app();
        assert_eq!(period_at(&app.view, 0.0), "Week 1");
        assert_eq!(period_at(&app.view, 6.6), "Week 8");
        assert_eq!(period_at(&app.view, 1e9), "Week 100");
    }

    #[test]
    fn unknown_region_yields_empty_chart() {
        let app = App::new(DashboardConfig {
            source: None,
            seed: 1,
            selection: ViewSelection {
                region: RegionFilter::Region("Atlantis".to_string()),
                ..ViewSelection::default()
            },
        });
        assert_eq!(app.region_index, None);
        assert!(chart_series(&app.view).is_none());
    }
}
