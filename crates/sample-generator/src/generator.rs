//! Sample Generator Implementation
//!
//! Two-stage pipeline: the ticker only sleeps and enqueues a [`Tick`]; the
//! worker owns the [`GeneratorState`] and does the actual work. At most one
//! tick is pending at a time, a tick that finds the queue full is coalesced.

use crate::state::GeneratorState;
use crate::stats::Statistics;
use crate::waveform::Waveform;
use config_store::{ConfigStore, Configuration};
use sample_buffer::{ReadinessNotifier, SampleBuffer};
use simtemp_protocol::{errno, Sample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Producer state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorPhase {
    Stopped,
    Armed,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Sample buffered
    Produced(Sample),
    /// Sample generated but the buffer was full
    Dropped(Sample),
    /// Device disabled, nothing generated
    Skipped,
}

/// Unit of work handed from the ticker to the worker
#[derive(Debug, Clone, Copy)]
struct Tick {
    sequence: u64,
}

/// Everything a tick touches, shared between the device and the producer
pub struct GeneratorContext {
    buffer: Arc<SampleBuffer>,
    config: Arc<ConfigStore>,
    stats: Arc<Statistics>,
    notifier: Arc<ReadinessNotifier>,
    waveform: Waveform,
    epoch: Instant,
    armed: AtomicBool,
}

impl GeneratorContext {
    /// Bundle the shared device parts
    pub fn new(
        buffer: Arc<SampleBuffer>,
        config: Arc<ConfigStore>,
        stats: Arc<Statistics>,
        notifier: Arc<ReadinessNotifier>,
        waveform: Waveform,
    ) -> Self {
        Self {
            buffer,
            config,
            stats,
            notifier,
            waveform,
            epoch: Instant::now(),
            armed: AtomicBool::new(false),
        }
    }

    /// Monotonic nanoseconds since the context was created
    pub fn timestamp_ns(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Generate one sample and push it.
    ///
    /// Never suspends: the configuration is read from its published
    /// snapshot before the buffer lock is taken.
    pub fn generate(&self, state: &mut GeneratorState) -> TickOutcome {
        let config: Configuration = self.config.get();
        if !config.enabled {
            return TickOutcome::Skipped;
        }

        let counter = state.advance();
        let temp_mc = self.waveform.temperature(config.mode, counter, state.rng_mut());
        let crossed = state.observe(temp_mc, config.threshold_mc);
        let sample = Sample::new(self.timestamp_ns(), temp_mc, crossed);

        let outcome = match self.buffer.push(sample) {
            Ok(_) => {
                self.stats.record_update();
                if crossed {
                    self.stats.record_alert();
                }
                TickOutcome::Produced(sample)
            }
            Err(e) => {
                self.stats.record_overflow(errno::EOVERFLOW);
                warn!("Sample buffer overflow: {} (lost={})", e, self.buffer.lost());
                TickOutcome::Dropped(sample)
            }
        };

        // Wake consumers even on overflow, older samples may still be waiting
        self.notifier.notify_all();

        debug!(
            "Generated sample: temp={}.{:03}°C, flags={:#x}",
            sample.temp_mc / 1000,
            (sample.temp_mc % 1000).abs(),
            sample.flags
        );
        outcome
    }
}

struct Running {
    stop_tx: oneshot::Sender<()>,
    ticker: JoinHandle<()>,
    worker: JoinHandle<GeneratorState>,
}

struct Lifecycle {
    /// State parked while stopped
    parked: Option<GeneratorState>,
    running: Option<Running>,
}

/// Periodic sample producer
pub struct SampleGenerator {
    ctx: Arc<GeneratorContext>,
    lifecycle: Mutex<Lifecycle>,
    seed: Option<u64>,
}

impl SampleGenerator {
    /// Create a stopped generator
    pub fn new(ctx: GeneratorContext, seed: Option<u64>) -> Self {
        info!("Sample generator created");
        Self {
            ctx: Arc::new(ctx),
            lifecycle: Mutex::new(Lifecycle {
                parked: Some(GeneratorState::new(seed)),
                running: None,
            }),
            seed,
        }
    }

    /// Shared context
    pub fn context(&self) -> &GeneratorContext {
        &self.ctx
    }

    /// Current phase
    pub fn phase(&self) -> GeneratorPhase {
        if self.ctx.armed.load(Ordering::Acquire) {
            GeneratorPhase::Armed
        } else {
            GeneratorPhase::Stopped
        }
    }

    /// Check if the generator is armed
    pub fn is_armed(&self) -> bool {
        self.phase() == GeneratorPhase::Armed
    }

    /// stopped → armed. Returns `false` if already armed.
    pub async fn arm(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.running.is_some() {
            return false;
        }
        let state = lifecycle
            .parked
            .take()
            .unwrap_or_else(|| GeneratorState::new(self.seed));

        let (stop_tx, stop_rx) = oneshot::channel();
        let (work_tx, work_rx) = mpsc::channel(1);

        self.ctx.armed.store(true, Ordering::Release);
        let ticker = tokio::spawn(run_ticker(self.ctx.config.subscribe(), work_tx, stop_rx));
        let worker = tokio::spawn(run_worker(self.ctx.clone(), state, work_rx));

        lifecycle.running = Some(Running {
            stop_tx,
            ticker,
            worker,
        });
        info!(
            "Sample generator armed (interval {} ms)",
            self.ctx.config.get().sampling_ms
        );
        true
    }

    /// armed → stopped. Cancels the pending tick and waits for an in-flight
    /// one to finish. Returns `false` if already stopped.
    pub async fn disarm(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(running) = lifecycle.running.take() else {
            return false;
        };

        self.ctx.armed.store(false, Ordering::Release);
        // Ticker may already have exited
        let _ = running.stop_tx.send(());
        if let Err(e) = running.ticker.await {
            warn!("Ticker task ended abnormally: {}", e);
        }

        let state = match running.worker.await {
            Ok(state) => state,
            Err(e) => {
                warn!("Worker task ended abnormally, resetting generator state: {}", e);
                GeneratorState::new(self.seed)
            }
        };
        info!(
            "Sample generator stopped after {} samples (last {} mC)",
            state.counter(),
            state.last_temperature()
        );
        lifecycle.parked = Some(state);
        true
    }
}

async fn run_ticker(
    mut config_rx: watch::Receiver<Configuration>,
    work_tx: mpsc::Sender<Tick>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut period = config_rx.borrow_and_update().interval();
    let timer = sleep(period);
    tokio::pin!(timer);
    let mut sequence = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            changed = config_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = config_rx.borrow_and_update().interval();
                if next != period {
                    debug!("Interval changed {:?} -> {:?}, restarting timer", period, next);
                    period = next;
                    timer.as_mut().reset(Instant::now() + period);
                }
            }
            _ = &mut timer => {
                sequence += 1;
                match work_tx.try_send(Tick { sequence }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!("Tick {} coalesced, previous work still pending", sequence);
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
                period = config_rx.borrow().interval();
                let next = timer.deadline() + period;
                timer.as_mut().reset(next);
            }
        }
    }
    debug!("Ticker exited after {} ticks", sequence);
}

async fn run_worker(
    ctx: Arc<GeneratorContext>,
    mut state: GeneratorState,
    mut work_rx: mpsc::Receiver<Tick>,
) -> GeneratorState {
    while let Some(tick) = work_rx.recv().await {
        if !ctx.armed.load(Ordering::Acquire) {
            debug!("Dropping pending tick {}", tick.sequence);
            continue;
        }
        ctx.generate(&mut state);
    }
    state
}
