//! Actions rendering task.

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use anyhow::Context;
use displaydoc::Display;
use embedded_hal::blocking::delay::DelayMs;
use parking_lot::{Condvar, Mutex};
use ringlight_core::{Action, Animator, PixelSurface, RingGeometry, BLACK};

/// Rendering task parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// How often the idle rendering task checks its state without being woken up.
    pub poll_interval: Duration,
    /// Delay between pixels of the black wipe performed on shutdown.
    pub shutdown_wipe_ms: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            shutdown_wipe_ms: 10,
        }
    }
}

/// Rendering task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Waiting for a next action.
    #[default]
    Idle,
    /// Rendering an action.
    Rendering,
}

/// Rendering task counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Actions rendered to completion.
    pub rendered: usize,
    /// Actions interrupted by a hardware error.
    pub failed: usize,
    /// Pending actions replaced by a newer one before rendering has started.
    pub superseded: usize,
}

/// Action submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SubmitError {
    /// rendering task is stopped
    Stopped,
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<Action>,
    state: RenderState,
    stats: RenderStats,
    stopped: bool,
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

/// Cheap handle used to pass actions to the rendering task.
///
/// Submission never waits for the rendering, the newest action submitted before the rendering
/// task picks it up replaces the previous one.
#[derive(Debug, Clone)]
pub struct ActionSender {
    shared: Arc<Shared>,
}

impl ActionSender {
    /// Puts an action into the pending slot.
    pub fn submit(&self, action: Action) -> Result<(), SubmitError> {
        let mut slot = self.shared.slot.lock();
        if slot.stopped {
            return Err(SubmitError::Stopped);
        }

        if let Some(previous) = slot.pending.replace(action) {
            slot.stats.superseded += 1;
            log::warn!("Pending {} action superseded by {}", previous.mode(), action.mode());
        }
        drop(slot);

        self.shared.changed.notify_all();
        Ok(())
    }

    /// Asks the rendering task to stop.
    ///
    /// An action being rendered runs to completion, the pending one is dropped. This method
    /// can be called any number of times from any thread.
    pub fn stop(&self) {
        let mut slot = self.shared.slot.lock();
        if !slot.stopped {
            slot.stopped = true;
            log::info!("Stopping the rendering task");
        }
        drop(slot);

        self.shared.changed.notify_all();
    }

    /// Returns the current rendering task state.
    pub fn state(&self) -> RenderState {
        self.shared.slot.lock().state
    }

    /// Returns the rendering task counters.
    pub fn stats(&self) -> RenderStats {
        self.shared.slot.lock().stats
    }

    /// Returns true if the stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.shared.slot.lock().stopped
    }

    /// Waits until the rendering task has neither pending nor active actions.
    ///
    /// Returns false if the timeout elapsed first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let mut slot = self.shared.slot.lock();
        let result = self.shared.changed.wait_while_for(
            &mut slot,
            |slot| slot.pending.is_some() || slot.state == RenderState::Rendering,
            timeout,
        );
        !result.timed_out()
    }
}

/// Dedicated rendering thread, the only owner of the pixel surface.
#[derive(Debug)]
pub struct RenderLoop<S> {
    sender: ActionSender,
    rendering_task: JoinHandle<anyhow::Result<S>>,
}

impl<S> RenderLoop<S>
where
    S: PixelSurface + Send + 'static,
{
    /// Spawns a rendering thread which takes the ownership of the given surface.
    pub fn spawn<D>(
        surface: S,
        delay: D,
        geometry: RingGeometry,
        options: RenderOptions,
    ) -> anyhow::Result<Self>
    where
        D: DelayMs<u32> + Send + 'static,
    {
        let sender = ActionSender {
            shared: Arc::default(),
        };

        let shared = sender.shared.clone();
        let rendering_task = std::thread::Builder::new()
            .name("rendering".to_owned())
            .spawn(move || run(&shared, surface, delay, geometry, options))
            .context("Unable to spawn rendering thread")?;

        Ok(Self {
            sender,
            rendering_task,
        })
    }

    /// Returns a handle to submit actions from the other tasks.
    pub fn sender(&self) -> ActionSender {
        self.sender.clone()
    }

    /// Puts an action into the pending slot.
    pub fn submit(&self, action: Action) -> Result<(), SubmitError> {
        self.sender.submit(action)
    }

    /// Stops the rendering task and returns back the surface.
    ///
    /// Waits until the active action completes and the strip is turned off.
    pub fn stop(self) -> anyhow::Result<S> {
        self.sender.stop();
        self.rendering_task
            .join()
            .map_err(|_| anyhow::anyhow!("Rendering thread panicked"))?
    }
}

fn run<S, D>(
    shared: &Shared,
    mut surface: S,
    mut delay: D,
    geometry: RingGeometry,
    options: RenderOptions,
) -> anyhow::Result<S>
where
    S: PixelSurface,
    D: DelayMs<u32>,
{
    log::info!(
        "Rendering task started, strip has {} LEDs",
        geometry.led_count()
    );

    while let Some(action) = next_action(shared, options.poll_interval) {
        log::info!(
            "Rendering {} action with color {:?}",
            action.mode(),
            action.animation.color()
        );
        let result = Animator::new(&mut surface, &mut delay, geometry).play(&action);

        let mut slot = shared.slot.lock();
        slot.state = RenderState::Idle;
        match result {
            Ok(()) => slot.stats.rendered += 1,
            Err(err) => {
                slot.stats.failed += 1;
                log::error!("Unable to render {} action: {err}", action.mode());
            }
        }
        drop(slot);
        shared.changed.notify_all();
    }
    shared.changed.notify_all();

    // Never leave the strip lit after termination.
    Animator::new(&mut surface, &mut delay, geometry)
        .color_wipe(BLACK, options.shutdown_wipe_ms, 0..geometry.led_count())
        .map_err(|err| anyhow::anyhow!("Unable to turn the strip off: {err}"))?;

    log::info!("Rendering task finished");
    Ok(surface)
}

/// Blocks until there is a pending action, returns `None` once the task is stopped.
///
/// The pending slot is cleared before the rendering starts, so the actions submitted during
/// the rendering wait for the next cycle.
fn next_action(shared: &Shared, poll_interval: Duration) -> Option<Action> {
    let mut slot = shared.slot.lock();
    loop {
        if slot.stopped {
            if let Some(action) = slot.pending.take() {
                log::info!("Dropping pending {} action", action.mode());
            }
            return None;
        }

        if let Some(action) = slot.pending.take() {
            slot.state = RenderState::Rendering;
            return Some(action);
        }

        shared.changed.wait_for(&mut slot, poll_interval);
    }
}
