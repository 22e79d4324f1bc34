use crate::config::{DashboardConfig, EVENT_POLL_MS};
use crate::simulator::{Perturbation, SimulatorHandle, TickNotify};
use crate::stats::{
    self, CollectionStats, ModelStats, PredictionRecord, SymbolPerformance,
};
use crate::views::DashboardSnapshot;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardTab {
    Performance,
    Predictions,
    Symbols,
    Analysis,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 4] = [
        DashboardTab::Performance,
        DashboardTab::Predictions,
        DashboardTab::Symbols,
        DashboardTab::Analysis,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardTab::Performance => "Performance",
            DashboardTab::Predictions => "Predictions",
            DashboardTab::Symbols => "By Symbol",
            DashboardTab::Analysis => "Analysis",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub should_quit: bool,
    pub active_tab: DashboardTab,
    pub paused: bool,
    /// Perturbations applied since start.
    pub ticks: u64,
    pub model: ModelStats,
    pub collection: CollectionStats,
    pub predictions: Vec<PredictionRecord>,
    pub symbols: Vec<SymbolPerformance>,
    simulator: Option<SimulatorHandle>,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            active_tab: DashboardTab::Performance,
            paused: false,
            ticks: 0,
            model: ModelStats::sample(),
            collection: CollectionStats::sample(),
            predictions: stats::sample_predictions(),
            symbols: stats::sample_symbol_performance(),
            simulator: None,
        }
    }

    /// Builds the app and starts the metric simulator. Needs a tokio runtime.
    pub fn with_simulator(config: &DashboardConfig) -> Self {
        Self::with_simulator_notify(config, None)
    }

    /// Like `with_simulator`, calling `notify` whenever a tick is queued.
    pub fn with_simulator_notify(config: &DashboardConfig, notify: Option<TickNotify>) -> Self {
        let mut app = Self::new();
        app.simulator = Some(SimulatorHandle::spawn(config.tick_interval, config.seed, notify));
        app
    }

    /// Applies one simulator tick to the counters.
    pub fn apply(&mut self, perturbation: &Perturbation) {
        perturbation.apply(&mut self.model, &mut self.collection);
        self.ticks += 1;
    }

    /// Applies every pending simulator tick. Returns how many were applied.
    pub fn tick(&mut self) -> usize {
        let Some(sim) = self.simulator.as_mut() else {
            return 0;
        };

        let pending = sim.drain();
        if pending.is_empty() {
            if sim.is_finished() {
                warn!("Metric simulator stopped unexpectedly");
                self.simulator = None;
            }
            return 0;
        }

        if self.paused {
            debug!("Discarding {} simulator ticks while paused", pending.len());
            return 0;
        }

        for p in &pending {
            self.apply(p);
        }
        debug!(
            "Applied {} tick(s): samples={} buffer={} total={}",
            pending.len(),
            self.model.samples_processed,
            self.model.buffer_size,
            self.collection.total_samples
        );
        pending.len()
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn select_tab(&mut self, tab: DashboardTab) {
        if self.active_tab != tab {
            debug!("Switching to tab {}", tab.title());
            self.active_tab = tab;
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::build(
            self.ticks,
            &self.model,
            &self.collection,
            &self.predictions,
            &self.symbols,
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab | KeyCode::Right => self.select_tab(self.active_tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.select_tab(self.active_tab.previous()),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.select_tab(DashboardTab::ALL[idx]);
            }
            KeyCode::Char(' ') => self.toggle_pause(),
            _ => {}
        }
    }

    pub async fn run(&mut self, terminal: &mut crate::tui::Tui) -> io::Result<()> {
        while !self.should_quit {
            self.tick();
            terminal.draw(|f| crate::ui::render(f, self))?;

            if event::poll(std::time::Duration::from_millis(EVENT_POLL_MS))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        info!("Dashboard closed after {} ticks", self.ticks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use tokio::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = App::new();
        assert_eq!(app.active_tab, DashboardTab::Performance);

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.active_tab, DashboardTab::Predictions);
        app.handle_key(press(KeyCode::Left));
        app.handle_key(press(KeyCode::Left));
        assert_eq!(app.active_tab, DashboardTab::Analysis);
        app.handle_key(press(KeyCode::Char('3')));
        assert_eq!(app.active_tab, DashboardTab::Symbols);
    }

    #[test]
    fn test_quit_and_pause_keys() {
        let mut app = App::new();
        app.handle_key(press(KeyCode::Char(' ')));
        assert!(app.paused);
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tick_without_simulator_is_noop() {
        let mut app = App::new();
        assert_eq!(app.tick(), 0);
        assert_eq!(app.ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_applies_simulated_perturbations() {
        let cfg = DashboardConfig {
            tick_interval: Duration::from_millis(3000),
            seed: Some(5),
        };
        let mut app = App::with_simulator(&cfg);
        let before_samples = app.model.samples_processed;
        let before_total = app.collection.total_samples;

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(app.tick(), 1);
        assert_eq!(app.ticks, 1);
        assert!(app.model.samples_processed - before_samples < 5);
        assert!(app.collection.total_samples - before_total < 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_app_discards_ticks() {
        let cfg = DashboardConfig {
            tick_interval: Duration::from_millis(1000),
            seed: Some(5),
        };
        let mut app = App::with_simulator(&cfg);
        let before = app.model.clone();
        app.toggle_pause();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(app.tick(), 0);
        assert_eq!(app.model, before);
        assert_eq!(app.ticks, 0);
    }

    #[test]
    fn test_apply_counts_ticks() {
        let mut app = App::new();
        let p = Perturbation {
            samples_processed: 4,
            buffer_delta: -5,
            total_samples: 2,
            successful_predictions: 1,
        };
        app.apply(&p);
        app.apply(&p);

        assert_eq!(app.ticks, 2);
        assert_eq!(app.model.samples_processed, 1258);
        assert_eq!(app.model.buffer_size, 140);
        assert_eq!(app.collection.total_samples, 5424);
        assert_eq!(app.collection.successful_predictions, 4897);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_simulator_is_released() {
        let cfg = DashboardConfig {
            tick_interval: Duration::from_millis(1000),
            seed: Some(5),
        };
        let mut app = App::with_simulator(&cfg);
        if let Some(sim) = app.simulator.as_ref() {
            sim.abort();
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(app.tick(), 0);
        assert!(app.simulator.is_none());
        assert_eq!(app.ticks, 0);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(app.tick(), 0);
    }
}
