#![allow(dead_code)]

use std::{
    sync::{mpsc, Arc},
    time::{Duration, Instant},
};

use embedded_hal::blocking::delay::DelayMs;
use parking_lot::Mutex;
use ringlight_app::{
    core::{RingGeometry, BLACK, RGB8},
    RenderLoop, RenderOptions, SmartLedsSurface,
};
use smart_leds::SmartLedsWrite;

pub type Frames = Arc<Mutex<Vec<Vec<RGB8>>>>;
pub type TestSurface = SmartLedsSurface<FrameRecorder>;

/// Strip driver which remembers every written frame.
#[derive(Default, Clone)]
pub struct FrameRecorder {
    pub frames: Frames,
    /// Number of writes to fail before the driver starts working.
    pub failures: Arc<Mutex<usize>>,
}

impl SmartLedsWrite for FrameRecorder {
    type Error = &'static str;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut failures = self.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err("strip is disconnected");
        }

        let frame = iterator.into_iter().map(Into::into).collect();
        self.frames.lock().push(frame);
        Ok(())
    }
}

/// Delay which records the requested durations without waiting.
#[derive(Default, Clone)]
pub struct RecordingDelay(pub Arc<Mutex<Vec<u32>>>);

impl DelayMs<u32> for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.lock().push(ms);
    }
}

/// Delay which blocks until the test releases it.
///
/// Every delay call consumes a single token, dropping the sender releases all of them.
pub struct GateDelay(pub mpsc::Receiver<()>);

impl DelayMs<u32> for GateDelay {
    fn delay_ms(&mut self, _ms: u32) {
        let _ = self.0.recv();
    }
}

pub fn geometry() -> RingGeometry {
    RingGeometry::new(40, 48).unwrap()
}

pub fn options() -> RenderOptions {
    RenderOptions {
        poll_interval: Duration::from_millis(10),
        shutdown_wipe_ms: 0,
    }
}

pub fn spawn_loop<D>(delay: D) -> (RenderLoop<TestSurface>, FrameRecorder)
where
    D: DelayMs<u32> + Send + 'static,
{
    let _ = env_logger::try_init();

    let recorder = FrameRecorder::default();
    let surface = SmartLedsSurface::new(recorder.clone(), geometry().led_count(), 255);
    let render = RenderLoop::spawn(surface, delay, geometry(), options()).unwrap();
    (render, recorder)
}

pub fn wait_until(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition is not met in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

pub fn lit(frame: &[RGB8]) -> usize {
    frame.iter().filter(|pixel| **pixel != BLACK).count()
}

pub fn is_filled(frame: &[RGB8], color: RGB8) -> bool {
    frame.iter().all(|pixel| *pixel == color)
}
