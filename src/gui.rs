use crate::app::{App, DashboardTab};
use crate::stats::{KEY_IMPROVEMENTS, Palette, RECOMMENDATIONS};
use crate::views::{
    PredictionIcon, accuracy_series, current_error, format_confidence, format_percent,
    format_thousands, format_training_time, gauge_ratio, mean_recent_accuracy, prediction_icon,
    status_badge, success_rate,
};
use eframe::egui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

// ──────────────────────────────────────────────────────────────────────────────
// Color Palette
// ──────────────────────────────────────────────────────────────────────────────

const ACCENT_BLUE: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const ACCENT_GREEN: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const ACCENT_RED: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const ACCENT_YELLOW: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);
const ACCENT_CYAN: egui::Color32 = egui::Color32::from_rgb(34, 211, 238);
const ACCENT_PURPLE: egui::Color32 = egui::Color32::from_rgb(168, 85, 247);

const BG_DARK: egui::Color32 = egui::Color32::from_rgb(15, 15, 20);
const BG_CARD: egui::Color32 = egui::Color32::from_rgb(24, 24, 32);
const BG_ELEVATED: egui::Color32 = egui::Color32::from_rgb(32, 32, 44);
const TEXT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(148, 163, 184);
const BORDER_SUBTLE: egui::Color32 = egui::Color32::from_rgb(51, 51, 68);

pub fn palette_color(palette: Palette) -> egui::Color32 {
    match palette {
        Palette::Primary => ACCENT_BLUE,
        Palette::Secondary => ACCENT_CYAN,
        Palette::Accent => ACCENT_PURPLE,
        Palette::Muted => TEXT_SECONDARY,
        Palette::Destructive => ACCENT_RED,
    }
}

fn icon_color(icon: PredictionIcon) -> egui::Color32 {
    match icon {
        PredictionIcon::TrendingUp => ACCENT_GREEN,
        PredictionIcon::TrendingDown => ACCENT_RED,
        PredictionIcon::Activity => ACCENT_YELLOW,
    }
}

/// Repaints are driven by the simulator's tick notification and by input.
pub struct GuiApp {
    app: App,
}

impl GuiApp {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    fn apply_theme(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.window_rounding = egui::Rounding::same(8.0);
        style.visuals.widgets.noninteractive.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);

        style.visuals.dark_mode = true;
        style.visuals.panel_fill = BG_DARK;
        style.visuals.window_fill = BG_CARD;
        style.visuals.faint_bg_color = BG_ELEVATED;

        style.visuals.widgets.noninteractive.bg_fill = BG_CARD;
        style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
        style.visuals.widgets.inactive.bg_fill = BG_ELEVATED;
        style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
        style.visuals.widgets.active.bg_fill = ACCENT_BLUE;
        style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

        style.visuals.selection.bg_fill = ACCENT_BLUE.linear_multiply(0.4);
        style.visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT_BLUE);

        style.spacing.item_spacing = egui::vec2(8.0, 6.0);

        ctx.set_style(style);
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        Self::apply_theme(ctx);
        self.app.tick();

        // ── Top Bar ──
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("ML Trading System Dashboard")
                    .size(18.0)
                    .strong()
                    .color(ACCENT_BLUE));
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Crypto trading model monitoring")
                    .size(11.0)
                    .color(TEXT_SECONDARY));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    let pause_label = if self.app.paused { "Resume" } else { "Pause" };
                    if ui.button(pause_label).clicked() {
                        self.app.toggle_pause();
                    }
                    status_badge_label(
                        ui,
                        self.app.collection.is_running,
                        "Collection active",
                        "Collection stopped",
                    );
                    status_badge_label(
                        ui,
                        self.app.model.is_training,
                        "Training active",
                        "Training stopped",
                    );
                });
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_cards(ui);
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                for tab in DashboardTab::ALL {
                    let btn = ui.selectable_label(
                        self.app.active_tab == tab,
                        egui::RichText::new(tab.title()).size(13.0),
                    );
                    if btn.clicked() {
                        self.app.select_tab(tab);
                    }
                }
            });
            ui.add_space(6.0);

            egui::ScrollArea::vertical().show(ui, |ui| match self.app.active_tab {
                DashboardTab::Performance => self.render_performance_tab(ui),
                DashboardTab::Predictions => self.render_predictions_tab(ui),
                DashboardTab::Symbols => self.render_symbols_tab(ui),
                DashboardTab::Analysis => render_analysis_tab(ui),
            });
        });
    }
}

fn card_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(BG_CARD)
        .rounding(egui::Rounding::same(8.0))
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .inner_margin(egui::Margin::same(12.0))
}

fn status_badge_label(ui: &mut egui::Ui, active: bool, on: &str, off: &str) {
    let (text, fill) = if active { (on, ACCENT_BLUE) } else { (off, BG_ELEVATED) };
    egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(10.0))
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).size(11.0).color(egui::Color32::WHITE));
        });
}

fn section_header(ui: &mut egui::Ui, title: &str) {
    ui.label(egui::RichText::new(title)
        .size(13.0)
        .strong()
        .color(TEXT_PRIMARY));
    ui.add_space(4.0);
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: &str, color: egui::Color32) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).size(12.0).color(TEXT_SECONDARY));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(value).size(12.0).strong().color(color));
        });
    });
}

fn metric_card(
    ui: &mut egui::Ui,
    title: &str,
    value: &str,
    value_color: egui::Color32,
    accent: egui::Color32,
    add_footer: impl FnOnce(&mut egui::Ui),
) {
    card_frame()
        .stroke(egui::Stroke::new(1.5, accent))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(title).size(11.0).color(TEXT_SECONDARY));
            ui.label(egui::RichText::new(value).size(22.0).strong().color(value_color));
            add_footer(ui);
        });
}

impl GuiApp {
    fn render_cards(&self, ui: &mut egui::Ui) {
        let model = &self.app.model;
        let collection = &self.app.collection;
        let rate = success_rate(collection);

        ui.columns(4, |cols| {
            metric_card(
                &mut cols[0],
                "Samples processed",
                &format_thousands(model.samples_processed),
                TEXT_PRIMARY,
                ACCENT_BLUE,
                |ui| {
                    ui.label(egui::RichText::new(format!("Model version: {}", model.model_version))
                        .size(11.0)
                        .color(TEXT_SECONDARY));
                },
            );
            metric_card(
                &mut cols[1],
                "Model accuracy",
                &format_percent(rate),
                ACCENT_GREEN,
                ACCENT_GREEN,
                |ui| {
                    ui.add(egui::ProgressBar::new(gauge_ratio(rate) as f32).fill(ACCENT_GREEN));
                },
            );
            metric_card(
                &mut cols[2],
                "Data buffer",
                &model.buffer_size.to_string(),
                TEXT_PRIMARY,
                ACCENT_CYAN,
                |ui| {
                    ui.label(egui::RichText::new(format!("Tracked symbols: {}", collection.symbols_count))
                        .size(11.0)
                        .color(TEXT_SECONDARY));
                },
            );
            metric_card(
                &mut cols[3],
                "Total predictions",
                &format_thousands(collection.total_samples),
                TEXT_PRIMARY,
                ACCENT_PURPLE,
                |ui| {
                    ui.label(egui::RichText::new(format!("+{} successful", collection.successful_predictions))
                        .size(11.0)
                        .color(ACCENT_GREEN));
                },
            );
        });
    }

    fn render_performance_tab(&self, ui: &mut egui::Ui) {
        let series = accuracy_series(&self.app.model);

        ui.columns(2, |cols| {
            card_frame().show(&mut cols[0], |ui| {
                section_header(ui, "Model accuracy history");
                ui.label(egui::RichText::new("Prediction accuracy across training iterations")
                    .size(11.0)
                    .color(TEXT_SECONDARY));

                let accuracy: PlotPoints = series
                    .iter()
                    .map(|p| [p.iteration as f64, p.accuracy])
                    .collect();
                let error: PlotPoints = series
                    .iter()
                    .filter(|p| p.error.is_finite())
                    .map(|p| [p.iteration as f64, p.error])
                    .collect();

                Plot::new("accuracy_history")
                    .legend(Legend::default())
                    .height(300.0)
                    .include_y(0.0)
                    .include_y(100.0)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new(accuracy)
                            .name("Accuracy (%)")
                            .color(ACCENT_BLUE)
                            .width(2.0));
                        plot_ui.line(Line::new(error)
                            .name("Error (%)")
                            .color(ACCENT_RED)
                            .width(2.0));
                    });
            });

            card_frame().show(&mut cols[1], |ui| {
                let model = &self.app.model;
                let collection = &self.app.collection;

                section_header(ui, "Training statistics");
                ui.label(egui::RichText::new("Key ML system metrics")
                    .size(11.0)
                    .color(TEXT_SECONDARY));
                ui.add_space(8.0);

                stat_row(ui, "Last training", &format_training_time(&model.last_training_time), TEXT_PRIMARY);
                stat_row(
                    ui,
                    "Prediction success",
                    &format!("{} / {}", collection.successful_predictions, collection.total_samples),
                    TEXT_PRIMARY,
                );
                let mean = format_percent(mean_recent_accuracy(model));
                stat_row(ui, "Mean accuracy", &mean, ACCENT_GREEN);
                let error = current_error(model).map_or_else(|| "--".to_string(), |e| format!("{:.2}%", e));
                stat_row(ui, "Current error", &error, ACCENT_RED);
            });
        });
    }

    fn render_predictions_tab(&self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            section_header(ui, "Recent predictions");
            ui.label(egui::RichText::new("Recent model predictions with observed outcomes")
                .size(11.0)
                .color(TEXT_SECONDARY));
            ui.add_space(6.0);

            for pred in &self.app.predictions {
                let icon = prediction_icon(&pred.prediction);
                let badge = status_badge(&pred.prediction, &pred.actual);

                egui::Frame::none()
                    .fill(BG_ELEVATED)
                    .rounding(egui::Rounding::same(6.0))
                    .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(icon.glyph()).size(16.0).color(icon_color(icon)));
                            ui.vertical(|ui| {
                                ui.label(egui::RichText::new(&pred.symbol).strong().color(TEXT_PRIMARY));
                                ui.label(egui::RichText::new(&pred.timestamp).size(10.0).color(TEXT_SECONDARY));
                            });

                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let fill = if badge.is_positive() { ACCENT_GREEN } else { ACCENT_RED };
                                egui::Frame::none()
                                    .fill(fill)
                                    .rounding(egui::Rounding::same(10.0))
                                    .inner_margin(egui::Margin::symmetric(8.0, 2.0))
                                    .show(ui, |ui| {
                                        ui.label(egui::RichText::new(badge.label())
                                            .size(11.0)
                                            .color(egui::Color32::WHITE));
                                    });
                                ui.vertical(|ui| {
                                    ui.label(egui::RichText::new(pred.prediction.as_label()).strong());
                                    ui.label(egui::RichText::new(format_confidence(pred.confidence))
                                        .size(10.0)
                                        .color(TEXT_SECONDARY));
                                });
                            });
                        });
                    });
                ui.add_space(4.0);
            }
        });
    }

    fn render_symbols_tab(&self, ui: &mut egui::Ui) {
        card_frame().show(ui, |ui| {
            section_header(ui, "Performance by symbol");
            ui.label(egui::RichText::new("Prediction accuracy per trading pair")
                .size(11.0)
                .color(TEXT_SECONDARY));

            let symbols = &self.app.symbols;
            let bars: Vec<Bar> = symbols
                .iter()
                .enumerate()
                .map(|(idx, s)| {
                    Bar::new(idx as f64, s.accuracy as f64)
                        .name(&s.symbol)
                        .width(0.6)
                        .fill(palette_color(s.color))
                })
                .collect();
            let labels: Vec<String> = symbols.iter().map(|s| s.symbol.clone()).collect();

            Plot::new("symbol_performance")
                .height(400.0)
                .include_y(0.0)
                .include_y(100.0)
                .allow_drag(false)
                .allow_zoom(false)
                .x_axis_formatter(move |mark, _range| {
                    let idx = mark.value.round();
                    if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                        labels.get(idx as usize).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                })
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).name("Accuracy (%)"));
                });
        });
    }
}

fn render_analysis_tab(ui: &mut egui::Ui) {
    ui.columns(2, |cols| {
        card_frame().show(&mut cols[0], |ui| {
            section_header(ui, "Key improvements");
            ui.label(egui::RichText::new("Fixes shipped for critical issues")
                .size(11.0)
                .color(TEXT_SECONDARY));
            ui.add_space(6.0);
            note_list(ui, KEY_IMPROVEMENTS, "✔", ACCENT_GREEN);
        });
        card_frame().show(&mut cols[1], |ui| {
            section_header(ui, "Recommendations");
            ui.label(egui::RichText::new("Next steps for tuning the system")
                .size(11.0)
                .color(TEXT_SECONDARY));
            ui.add_space(6.0);
            note_list(ui, RECOMMENDATIONS, "⚠", ACCENT_YELLOW);
        });
    });
}

fn note_list(ui: &mut egui::Ui, entries: &[(&str, &str)], glyph: &str, color: egui::Color32) {
    for (title, detail) in entries {
        ui.horizontal_top(|ui| {
            ui.label(egui::RichText::new(glyph).color(color));
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(*title).strong().color(TEXT_PRIMARY));
                ui.label(egui::RichText::new(*detail).size(11.0).color(TEXT_SECONDARY));
            });
        });
        ui.add_space(4.0);
    }
}
