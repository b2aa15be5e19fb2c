//! The polling pipeline: read → decode → edge-detect → engine → drain.
//!
//! One [`Runtime`] owns the open device handles, the engine, and the software
//! key-repeat timer. Each tick polls every device once, merges their snapshots
//! (dual-JoyCon mode contributes left-hand events before right-hand ones),
//! routes the merged tick through the engine, executes the queued actions, and
//! finally services any repeat pulses posted by the timer thread.

use crate::backends::RawDeviceSource;
use crate::button::{AxisType, AxisValues, ButtonEvent, ButtonStates};
use crate::edge::EdgeDetector;
use crate::engine::{Engine, EngineContext};
use crate::error::RuntimeError;
use crate::out_event::InputInjector;
use crate::repeat::{RepeatTimer, TIMER_INTERVAL};
use crate::report::{decode, DeviceFamily};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

const REPORT_BUF_LEN: usize = 64;

/// One open device with its own edge detector and last-known axes.
///
/// Edge state is strictly per handle, so two JoyCons never see each other's
/// transitions.
pub struct DeviceHandle {
    source: Box<dyn RawDeviceSource>,
    family: DeviceFamily,
    edges: EdgeDetector,
    axes: AxisValues,
}

impl DeviceHandle {
    pub fn new(source: Box<dyn RawDeviceSource>, family: DeviceFamily) -> Self {
        Self { source, family, edges: EdgeDetector::new(), axes: AxisValues::centered() }
    }

    /// Which axes this device is authoritative for when merging.
    fn owned_axes(&self) -> &'static [AxisType] {
        match self.family {
            DeviceFamily::JoyConLeft => &[AxisType::AnalogLDown, AxisType::AnalogLRight],
            DeviceFamily::JoyConRight => &[AxisType::AnalogRDown, AxisType::AnalogRRight],
            _ => &AxisType::ALL,
        }
    }
}

/// Owns the tick loop state. Construct, add devices, then call [`Runtime::run`]
/// (or [`Runtime::tick`] directly for finer control).
pub struct Runtime {
    ctx: EngineContext,
    engine: Engine,
    devices: Vec<DeviceHandle>,
    repeat_pulses: Receiver<String>,
    pulse_sender: Sender<String>,
    timer: Option<RepeatTimer>,
    stop: Arc<AtomicBool>,
}

impl Runtime {
    pub fn new(ctx: EngineContext) -> Self {
        let engine = Engine::new(&ctx);
        let (pulse_sender, repeat_pulses) = crossbeam_channel::unbounded();
        Self {
            ctx,
            engine,
            devices: Vec::new(),
            repeat_pulses,
            pulse_sender,
            timer: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a device. In dual-JoyCon mode add the left source first; event
    /// order follows registration order.
    pub fn add_device(&mut self, source: Box<dyn RawDeviceSource>, family: DeviceFamily) {
        debug!(name = source.name(), ?family, "device registered");
        self.devices.push(DeviceHandle::new(source, family));
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Flag that stops [`Runtime::run`] from another thread or a signal
    /// handler. Stopping never attempts cleanup injection; held synthetic keys
    /// are released by the OS session, not by us.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run one poll/decode/engine/drain iteration.
    ///
    /// A device with no pending report contributes no events this tick. Decode
    /// failures abort only the current tick; previously held state is kept.
    pub fn tick(&mut self, injector: &mut dyn InputInjector, now: Instant) -> Result<(), RuntimeError> {
        let mut events: Vec<ButtonEvent> = Vec::new();
        let mut states = ButtonStates::empty();
        let mut axes = AxisValues::centered();

        let settings = &self.ctx.settings;
        for device in &mut self.devices {
            let mut buf = [0u8; REPORT_BUF_LEN];
            let len = device.source.read_report(&mut buf)?;
            if len > 0 {
                trace!(name = device.source.name(), report = ?&buf[..len], "raw report");
                let (new_states, new_axes) = decode(
                    &buf[..len],
                    device.family,
                    settings.face_button_layout,
                    settings.axis_threshold,
                )?;
                events.extend(device.edges.update(new_states));
                device.axes = new_axes;
            }
            states = states.union(device.edges.state());
            for axis in device.owned_axes() {
                axes.set(*axis, device.axes.get(*axis));
            }
        }

        if !events.is_empty() {
            debug!(?events, states = format_args!("{:#x}", states.bits()), "tick");
        }

        self.engine.tick(&events, &axes, states, now)?;
        self.engine.drain(injector, &self.ctx);
        self.service_repeat_pulses(injector);
        Ok(())
    }

    /// Re-issue an up+down pair for every key the repeat timer marked due.
    fn service_repeat_pulses(&mut self, injector: &mut dyn InputInjector) {
        while let Ok(key) = self.repeat_pulses.try_recv() {
            if !self.ctx.repeat.is_pressing(&key) {
                // Released between the pulse and now.
                continue;
            }
            if let Err(e) = injector.key_up(&key).and_then(|()| injector.key_down(&key)) {
                warn!(key = %key, error = %e, "key repeat injection failed");
            }
        }
    }

    /// Poll until the stop flag is raised.
    ///
    /// Decode and read errors are logged and the loop continues; the tick that
    /// failed is simply dropped.
    pub fn run(&mut self, injector: &mut dyn InputInjector) {
        self.timer = Some(RepeatTimer::spawn(
            Arc::clone(&self.ctx.repeat),
            self.pulse_sender.clone(),
        ));

        while !self.stop.load(Ordering::Relaxed) {
            if let Err(e) = self.tick(injector, Instant::now()) {
                warn!(error = %e, "tick failed");
            }
            std::thread::sleep(TIMER_INTERVAL);
        }

        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
    }
}
