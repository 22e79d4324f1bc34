use crate::stats::{CollectionStats, ModelStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Capacity of the tick channel. The UI drains it every frame, so this only
/// matters while the UI is blocked.
const CHANNEL_CAPACITY: usize = 64;

/// One simulator tick: the random deltas applied to the dashboard counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Perturbation {
    /// In [0, 5).
    pub samples_processed: u64,
    /// In [-5, 5).
    pub buffer_delta: i64,
    /// In [0, 3).
    pub total_samples: u64,
    /// In [0, 2).
    pub successful_predictions: u64,
}

impl Perturbation {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            samples_processed: rng.gen_range(0..5),
            buffer_delta: rng.gen_range(0..10) - 5,
            total_samples: rng.gen_range(0..3),
            successful_predictions: rng.gen_range(0..2),
        }
    }

    /// Buffer size walks with a floor of zero; every other counter only grows.
    pub fn apply(&self, model: &mut ModelStats, collection: &mut CollectionStats) {
        model.samples_processed += self.samples_processed;
        model.buffer_size = model.buffer_size.saturating_add_signed(self.buffer_delta);
        collection.total_samples += self.total_samples;
        collection.successful_predictions += self.successful_predictions;
    }
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Called by the simulator task after each perturbation is queued, so a
/// front-end can schedule a redraw.
pub type TickNotify = Box<dyn Fn() + Send + Sync + 'static>;

/// Background interval task producing one `Perturbation` per period.
///
/// Dropping the handle aborts the task.
pub struct SimulatorHandle {
    rx: mpsc::Receiver<Perturbation>,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Must be called from within a tokio runtime.
    pub fn spawn(period: Duration, seed: Option<u64>, notify: Option<TickNotify>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut rng = make_rng(seed);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let perturbation = Perturbation::sample(&mut rng);
                if tx.send(perturbation).await.is_err() {
                    debug!("Simulator receiver dropped, stopping");
                    break;
                }
                if let Some(notify) = &notify {
                    notify();
                }
            }
        });

        info!("Metric simulator started (period={:?}, seeded={})", period, seed.is_some());
        Self { rx, task }
    }

    /// Non-blocking: returns every perturbation that arrived since the last call.
    pub fn drain(&mut self) -> Vec<Perturbation> {
        let mut pending = Vec::new();
        while let Ok(p) = self.rx.try_recv() {
            pending.push(p);
        }
        pending
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    #[cfg(test)]
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Metric simulator cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_perturbation_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = Perturbation::sample(&mut rng);
            assert!(p.samples_processed < 5);
            assert!((-5..5).contains(&p.buffer_delta));
            assert!(p.total_samples < 3);
            assert!(p.successful_predictions < 2);
        }
    }

    #[test]
    fn test_single_tick_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let mut model = ModelStats::sample();
            let mut collection = CollectionStats::sample();
            let before = model.clone();

            Perturbation::sample(&mut rng).apply(&mut model, &mut collection);

            let samples_delta = model.samples_processed - before.samples_processed;
            assert!(samples_delta < 5);
            let buffer_delta = model.buffer_size as i64 - before.buffer_size as i64;
            assert!((-5..5).contains(&buffer_delta));
        }
    }

    #[test]
    fn test_buffer_never_goes_below_zero() {
        let mut model = ModelStats::sample();
        let mut collection = CollectionStats::sample();
        model.buffer_size = 2;

        let p = Perturbation {
            samples_processed: 0,
            buffer_delta: -5,
            total_samples: 0,
            successful_predictions: 0,
        };
        p.apply(&mut model, &mut collection);
        assert_eq!(model.buffer_size, 0);

        p.apply(&mut model, &mut collection);
        assert_eq!(model.buffer_size, 0);
    }

    #[test]
    fn test_apply_leaves_static_fields_alone() {
        let mut model = ModelStats::sample();
        let mut collection = CollectionStats::sample();
        let p = Perturbation {
            samples_processed: 3,
            buffer_delta: 4,
            total_samples: 2,
            successful_predictions: 1,
        };
        p.apply(&mut model, &mut collection);

        assert_eq!(model.samples_processed, 1253);
        assert_eq!(model.buffer_size, 154);
        assert_eq!(model.model_version, 3);
        assert_eq!(collection.total_samples, 5422);
        assert_eq!(collection.successful_predictions, 4896);
        assert_eq!(collection.failed_predictions, 525);
        assert_eq!(collection.buffer_size, 150);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: Vec<_> = {
            let mut rng = make_rng(Some(99));
            (0..10).map(|_| Perturbation::sample(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = make_rng(Some(99));
            (0..10).map(|_| Perturbation::sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulator_emits_once_per_period() {
        let mut sim = SimulatorHandle::spawn(Duration::from_millis(3000), Some(1), None);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(sim.drain().is_empty(), "no tick before the first full period");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sim.drain().len(), 1);

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(sim.drain().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let sim = SimulatorHandle::spawn(Duration::from_millis(100), Some(1), None);
        let abort = sim.task.abort_handle();
        drop(sim);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(abort.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_fires_for_every_tick() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut sim = SimulatorHandle::spawn(
            Duration::from_millis(3000),
            Some(3),
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "redraw requested as soon as the tick lands");
        assert_eq!(sim.drain().len(), 1);

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert_eq!(sim.drain().len(), 2);
    }
}
