use crate::app::{App, DashboardTab};
use crate::stats::{KEY_IMPROVEMENTS, Palette, RECOMMENDATIONS};
use crate::views::{
    self, PredictionIcon, StatusBadge, accuracy_series, current_error, format_confidence,
    format_percent, format_thousands, format_training_time, gauge_ratio, mean_recent_accuracy,
    prediction_icon, status_badge, success_rate,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType, List,
        ListItem, Paragraph, Tabs, Wrap,
    },
};

pub fn render(f: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, layout[0]);
    render_cards(f, app, layout[1]);
    render_tabs(f, app, layout[2]);

    match app.active_tab {
        DashboardTab::Performance => render_performance(f, app, layout[3]),
        DashboardTab::Predictions => render_predictions(f, app, layout[3]),
        DashboardTab::Symbols => render_symbols(f, app, layout[3]),
        DashboardTab::Analysis => render_analysis(f, layout[3]),
    }

    render_footer(f, app, layout[4]);
}

pub fn palette_color(palette: Palette) -> Color {
    match palette {
        Palette::Primary => Color::Cyan,
        Palette::Secondary => Color::Blue,
        Palette::Accent => Color::Magenta,
        Palette::Muted => Color::Gray,
        Palette::Destructive => Color::Red,
    }
}

fn icon_style(icon: PredictionIcon) -> Style {
    match icon {
        PredictionIcon::TrendingUp => Style::default().fg(Color::Green),
        PredictionIcon::TrendingDown => Style::default().fg(Color::Red),
        PredictionIcon::Activity => Style::default().fg(Color::Yellow),
    }
}

fn badge_span(badge: StatusBadge) -> Span<'static> {
    let (glyph, bg) = if badge.is_positive() {
        ("✔", Color::Green)
    } else {
        ("⚠", Color::Red)
    };
    Span::styled(
        format!(" {} {} ", glyph, badge.label()),
        Style::default().fg(Color::Black).bg(bg).add_modifier(Modifier::BOLD),
    )
}

fn status_span(active: bool, on: &str, off: &str) -> Span<'static> {
    let (label, style) = if active {
        (on, Style::default().fg(Color::Black).bg(Color::Cyan))
    } else {
        (off, Style::default().fg(Color::White).bg(Color::DarkGray))
    };
    Span::styled(format!(" {} ", label), style)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let spans = vec![
        Span::styled(
            " ML Trading System Dashboard ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            "Crypto trading model monitoring",
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        status_span(app.model.is_training, "Training active", "Training stopped"),
        Span::raw(" "),
        status_span(app.collection.is_running, "Collection active", "Collection stopped"),
    ];

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn card_block(title: &str, accent: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(Color::Gray)))
}

fn render_cards(f: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let value_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let note_style = Style::default().fg(Color::Gray);

    let samples = Paragraph::new(vec![
        Line::from(Span::styled(format_thousands(app.model.samples_processed), value_style)),
        Line::from(Span::styled(
            format!("⚡ Model version: {}", app.model.model_version),
            note_style,
        )),
    ])
    .block(card_block("Samples processed", Color::Cyan));
    f.render_widget(samples, cards[0]);

    let rate = success_rate(&app.collection);
    let accuracy_block = card_block("Model accuracy", Color::Green);
    let inner = accuracy_block.inner(cards[1]);
    f.render_widget(accuracy_block, cards[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(
        Paragraph::new(Span::styled(
            format_percent(rate),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
            .ratio(gauge_ratio(rate))
            .label(""),
        rows[1],
    );

    let buffer = Paragraph::new(vec![
        Line::from(Span::styled(app.model.buffer_size.to_string(), value_style)),
        Line::from(Span::styled(
            format!("Tracked symbols: {}", app.collection.symbols_count),
            note_style,
        )),
    ])
    .block(card_block("Data buffer", Color::Blue));
    f.render_widget(buffer, cards[2]);

    let total = Paragraph::new(vec![
        Line::from(Span::styled(format_thousands(app.collection.total_samples), value_style)),
        Line::from(Span::styled(
            format!("+{} successful", app.collection.successful_predictions),
            Style::default().fg(Color::Green),
        )),
    ])
    .block(card_block("Total predictions", Color::Magenta));
    f.render_widget(total, cards[3]);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = DashboardTab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active_tab.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider(symbols::line::VERTICAL)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(tabs, area);
}

fn render_performance(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let series = accuracy_series(&app.model);
    let accuracy_points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| (p.iteration as f64, p.accuracy))
        .collect();
    let error_points: Vec<(f64, f64)> = series
        .iter()
        .filter(|p| p.error.is_finite())
        .map(|p| (p.iteration as f64, p.error))
        .collect();
    let x_max = series.len().max(2) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Accuracy (%)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&accuracy_points),
        Dataset::default()
            .name("Error (%)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&error_points),
    ];

    let axis_style = Style::default().fg(Color::Gray);
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(
                    " Model accuracy history ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("Iteration")
                .style(axis_style)
                .bounds([1.0, x_max])
                .labels(vec![
                    Span::styled("1", axis_style),
                    Span::styled(format!("{}", x_max as usize), axis_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("%")
                .style(axis_style)
                .bounds([0.0, 100.0])
                .labels(vec![
                    Span::styled("0", axis_style),
                    Span::styled("50", axis_style),
                    Span::styled("100", axis_style),
                ]),
        );
    f.render_widget(chart, chunks[0]);

    let stat = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<22}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let mean = format_percent(mean_recent_accuracy(&app.model));
    let error = current_error(&app.model).map_or_else(|| "--".to_string(), |e| format!("{:.2}%", e));

    let lines = vec![
        Line::from(Span::styled(
            "Key ML system metrics",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        stat(
            "Last training",
            format_training_time(&app.model.last_training_time),
            Color::White,
        ),
        stat(
            "Prediction success",
            format!(
                "{} / {}",
                app.collection.successful_predictions, app.collection.total_samples
            ),
            Color::White,
        ),
        stat("Mean accuracy", mean, Color::Green),
        stat("Current error", error, Color::Red),
    ];

    let info = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Training statistics "))
        .wrap(Wrap { trim: true });
    f.render_widget(info, chunks[1]);
}

fn render_predictions(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .predictions
        .iter()
        .map(|pred| {
            let icon = prediction_icon(&pred.prediction);
            let badge = status_badge(&pred.prediction, &pred.actual);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", icon.glyph()), icon_style(icon)),
                    Span::styled(
                        format!("{:<10}", pred.symbol),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<8}", pred.prediction.as_label()),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:<18}", format_confidence(pred.confidence)),
                        Style::default().fg(Color::Gray),
                    ),
                    badge_span(badge),
                ]),
                Line::from(Span::styled(
                    format!("    {}", pred.timestamp),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Recent predictions (with observed outcome) "),
    );
    f.render_widget(list, area);
}

fn render_symbols(f: &mut Frame, app: &App, area: Rect) {
    let bars: Vec<Bar> = views::symbol_chart(&app.symbols)
        .into_iter()
        .zip(&app.symbols)
        .map(|((symbol, accuracy), perf)| {
            Bar::default()
                .value(accuracy)
                .label(Line::from(symbol))
                .text_value(format!("{}%", accuracy))
                .style(Style::default().fg(palette_color(perf.color)))
                .value_style(Style::default().fg(Color::Black).bg(palette_color(perf.color)))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Prediction accuracy per trading pair "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(3)
        .max(100)
        .label_style(Style::default().fg(Color::Gray));
    f.render_widget(chart, area);
}

fn render_analysis(f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let notes = |entries: &[(&'static str, &'static str)], glyph: &'static str, color: Color| {
        entries
            .iter()
            .flat_map(|(title, detail)| {
                [
                    Line::from(vec![
                        Span::styled(format!("{} ", glyph), Style::default().fg(color)),
                        Span::styled(*title, Style::default().add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::styled(format!("  {}", detail), Style::default().fg(Color::Gray))),
                    Line::from(""),
                ]
            })
            .collect::<Vec<Line>>()
    };

    let improvements = Paragraph::new(notes(KEY_IMPROVEMENTS, "✔", Color::Green))
        .block(Block::default().borders(Borders::ALL).title(" Key improvements "))
        .wrap(Wrap { trim: false });
    f.render_widget(improvements, chunks[0]);

    let recommendations = Paragraph::new(notes(RECOMMENDATIONS, "⚠", Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Recommendations "))
        .wrap(Wrap { trim: false });
    f.render_widget(recommendations, chunks[1]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let sim = if app.paused {
        Span::styled("paused", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("live", Style::default().fg(Color::Green))
    };

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" Controls: ", Style::default().fg(Color::Gray)),
        Span::styled(
            "Tab/←/→: switch | 1-4: select | space: pause | q/Esc: quit",
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  Simulation: "),
        sim,
        Span::raw(format!(" ({} ticks)", app.ticks)),
    ]))
    .alignment(Alignment::Left)
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_header_and_cards_render() {
        let app = App::new();
        let text = rendered_text(&app);
        assert!(text.contains("ML Trading System Dashboard"));
        assert!(text.contains("Training active"));
        assert!(text.contains("1,250"));
        assert!(text.contains("90.3%"));
        assert!(text.contains("5,420"));
        assert!(text.contains("+4895 successful"));
    }

    #[test]
    fn test_each_tab_renders_its_content() {
        let mut app = App::new();
        assert!(rendered_text(&app).contains("Model accuracy history"));

        app.select_tab(DashboardTab::Predictions);
        let text = rendered_text(&app);
        assert!(text.contains("XRPUSDT"));
        assert!(text.contains("Miss"));
        assert!(text.contains("85% confidence"));

        app.select_tab(DashboardTab::Symbols);
        assert!(rendered_text(&app).contains("Prediction accuracy per trading pair"));

        app.select_tab(DashboardTab::Analysis);
        let text = rendered_text(&app);
        assert!(text.contains("Key improvements"));
        assert!(text.contains("Monitor model drift"));
    }

    #[test]
    fn test_zero_total_renders_placeholder() {
        let mut app = App::new();
        app.collection.total_samples = 0;
        let text = rendered_text(&app);
        assert!(!text.contains("NaN"));
        assert!(!text.contains("inf%"));
    }
}
