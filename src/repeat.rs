//! Software key repeat.
//!
//! Some target environments suppress hardware auto-repeat for injected keys,
//! so repeat is reproduced in software: for every held repeatable key, re-issue
//! an up+down pair after `delay_sec_first`, then every `delay_sec`.
//!
//! The bookkeeping maps are shared between the main loop (key down/up at
//! injection time) and a timer thread, so they live behind a
//! `parking_lot::Mutex`. The timer never calls the injector itself; it posts
//! due key names over a channel drained by the main loop.

use crate::config::KeyRepeatSettings;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::debug;

/// Recommended wake interval for the repeat timer thread.
pub const TIMER_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct PressEntry {
    press_start: Instant,
    repeat_started: bool,
}

/// Shared repeat state: which repeatable keys are held and since when.
#[derive(Debug)]
pub struct KeyRepeat {
    settings: KeyRepeatSettings,
    pressing: Mutex<HashMap<String, PressEntry>>,
}

impl KeyRepeat {
    pub fn new(settings: KeyRepeatSettings) -> Self {
        Self { settings, pressing: Mutex::new(HashMap::new()) }
    }

    pub fn enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Register a repeatable key press at the current instant.
    pub fn key_down(&self, key: &str) {
        self.key_down_at(key, Instant::now());
    }

    pub(crate) fn key_down_at(&self, key: &str, now: Instant) {
        self.pressing.lock().insert(
            key.to_string(),
            PressEntry { press_start: now, repeat_started: false },
        );
    }

    /// Stop repeating a key. Safe to call for keys that were never registered.
    pub fn key_up(&self, key: &str) {
        self.pressing.lock().remove(key);
    }

    pub fn is_pressing(&self, key: &str) -> bool {
        self.pressing.lock().contains_key(key)
    }

    /// Keys whose repeat delay has elapsed as of `now`.
    ///
    /// Each returned key has its press clock reset, so calling again
    /// immediately returns nothing.
    pub fn due_keys(&self, now: Instant) -> Vec<String> {
        if !self.settings.enabled {
            return Vec::new();
        }

        let mut due = Vec::new();
        let mut pressing = self.pressing.lock();
        for (key, entry) in pressing.iter_mut() {
            let delay = if entry.repeat_started {
                self.settings.delay_sec
            } else {
                self.settings.delay_sec_first
            };
            if now.duration_since(entry.press_start) > Duration::from_secs_f32(delay) {
                entry.repeat_started = true;
                entry.press_start = now;
                due.push(key.clone());
            }
        }
        due
    }
}

/// Handle to the background repeat timer thread.
pub struct RepeatTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatTimer {
    /// Spawn a timer that posts due key names to `pulses` every ~1 ms.
    pub fn spawn(repeat: Arc<KeyRepeat>, pulses: Sender<String>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                for key in repeat.due_keys(Instant::now()) {
                    debug!(key = %key, "software key repeat");
                    if pulses.send(key).is_err() {
                        // Receiver gone: the main loop has shut down.
                        return;
                    }
                }
                std::thread::sleep(TIMER_INTERVAL);
            }
        });
        Self { stop, handle: Some(handle) }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RepeatTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
