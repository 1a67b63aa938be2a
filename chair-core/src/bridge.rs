//! ChairBridge: the scheduler loop tying inputs to the CAN bus.

use crate::config::{BridgeConfig, ConfigError};
use crate::debug::{DebugReporter, DebugSink};
use crate::encoder::MessageEncoder;
use crate::input::AnalogInput;
use crate::sampler::InputSampler;
use crate::transport::{CanController, CanError, J1939Transport};
use crate::types::ControlState;
use j1939_proto::J1939Frame;

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Fires at most once per interval.
///
/// The watermark is set to the time the gate actually fired, so a late tick
/// delays the next firing rather than bunching them up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalGate {
    interval_ms: u64,
    last_ms: u64,
}

impl IntervalGate {
    /// A gate whose first interval starts at `start_ms`.
    #[must_use]
    pub const fn new(interval_ms: u32, start_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as u64,
            last_ms: start_ms,
        }
    }

    /// Returns true (and restarts the interval) once `interval_ms` has elapsed.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub const fn last_ms(&self) -> u64 {
        self.last_ms
    }
}

/// Error type for bridge startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// CAN controller failed to initialize.
    Startup(CanError),
    /// Configuration rejected by validation.
    Config(ConfigError),
}

impl From<CanError> for BridgeError {
    fn from(e: CanError) -> Self {
        BridgeError::Startup(e)
    }
}

impl From<ConfigError> for BridgeError {
    fn from(e: ConfigError) -> Self {
        BridgeError::Config(e)
    }
}

/// Running counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeStats {
    pub ticks: u64,
    pub frames_sent: u32,
    pub transmit_failures: u32,
    /// Failures since the last successful transmit.
    pub consecutive_failures: u32,
    pub sensor_faults: u32,
    pub last_error: Option<CanError>,
}

/// Outcome of one [`ChairBridge::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Snapshot sampled this tick.
    pub state: ControlState,
    /// Transmit result, `None` if the interval had not elapsed.
    pub transmitted: Option<Result<(), CanError>>,
    /// Debug lines written this tick.
    pub debug_lines: usize,
}

/// Samples inputs every tick and sends the state over J1939 at a fixed interval.
///
/// A bridge only exists after a successful [`ChairBridge::start`], so no frame
/// can reach an uninitialized controller. Transmit failures are counted and the
/// loop carries on; the next interval sends fresh state.
pub struct ChairBridge<'a, I, C, D> {
    input: I,
    transport: J1939Transport<C>,
    debug: D,
    sampler: InputSampler<'a>,
    encoder: MessageEncoder<'a>,
    reporter: DebugReporter<'a>,
    tx_gate: IntervalGate,
    /// `None` when every debug flag is off.
    debug_gate: Option<IntervalGate>,
    stats: BridgeStats,
}

impl<'a, I, C, D> ChairBridge<'a, I, C, D>
where
    I: AnalogInput,
    C: CanController,
    D: DebugSink,
{
    /// Validate `config`, bring up the CAN controller once, and return an idle bridge.
    pub fn start(
        config: &'a BridgeConfig,
        input: I,
        can: C,
        debug: D,
        now_ms: u64,
    ) -> Result<Self, BridgeError> {
        if let Err(e) = config.validate() {
            error!("Invalid configuration: {:?}", e);
            return Err(e.into());
        }

        let mut transport = J1939Transport::new(can);
        if let Err(e) = transport.initialize(config.can.bus_speed) {
            error!("CAN initialize failed: {:?}", e);
            return Err(e.into());
        }
        info!(
            "CAN up at {} bit/s, PGN {=u32:#x} every {} ms",
            config.can.bus_speed,
            config.can.pgn.value(),
            config.can.message_interval_ms
        );

        Ok(Self {
            input,
            transport,
            debug,
            sampler: InputSampler::new(config),
            encoder: MessageEncoder::new(&config.can),
            reporter: DebugReporter::new(&config.debug),
            tx_gate: IntervalGate::new(config.can.message_interval_ms, now_ms),
            debug_gate: config
                .debug
                .enabled()
                .then(|| IntervalGate::new(config.debug.interval_ms, now_ms)),
            stats: BridgeStats::default(),
        })
    }

    /// Run one loop iteration: sample, then transmit and report if due.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        let state = self.sampler.sample(&mut self.input, now_ms);
        self.stats.sensor_faults = self.sampler.sensor_faults();
        trace!(
            "buttons={=u8:#x} x={} y={} present={}",
            state.buttons.pressed.raw(),
            state.joystick.x,
            state.joystick.y,
            state.joystick.present
        );

        let transmitted = if self.tx_gate.ready(now_ms) {
            let frame = self.encoder.encode(&state);
            Some(self.transmit(&frame))
        } else {
            None
        };

        let report_due = self
            .debug_gate
            .as_mut()
            .is_some_and(|gate| gate.ready(now_ms));
        let debug_lines = if report_due {
            self.reporter.report(&mut self.debug, &state, &self.stats)
        } else {
            0
        };

        TickReport {
            state,
            transmitted,
            debug_lines,
        }
    }

    fn transmit(&mut self, frame: &J1939Frame) -> Result<(), CanError> {
        let result = self.transport.transmit(frame);
        match result {
            Ok(()) => {
                self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
                self.stats.consecutive_failures = 0;
            }
            Err(e) => {
                self.stats.transmit_failures = self.stats.transmit_failures.wrapping_add(1);
                self.stats.consecutive_failures =
                    self.stats.consecutive_failures.saturating_add(1);
                self.stats.last_error = Some(e);
                warn!(
                    "CAN transmit failed: {:?} ({} in a row)",
                    e, self.stats.consecutive_failures
                );
            }
        }
        result
    }

    /// Run the loop forever, yielding to the executor between iterations.
    pub async fn run<K: Clock>(&mut self, clock: &K) -> ! {
        loop {
            self.tick(clock.now_ms());
            embassy_futures::yield_now().await;
        }
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Get a reference to the input.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Get a mutable reference to the input.
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Get a reference to the CAN controller.
    pub fn controller(&self) -> &C {
        self.transport.controller()
    }

    /// Decompose the bridge into its input, CAN controller and debug sink.
    pub fn into_parts(self) -> (I, C, D) {
        (self.input, self.transport.into_inner(), self.debug)
    }
}
