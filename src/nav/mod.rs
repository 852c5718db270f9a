//! Screen navigator. Owns the active screen and its background task.
//!
//! ```text
//!   (no screen) ──start(id)──▶ screen X ──transition_to(Y)──▶ screen Y ──▶ …
//! ```
//!
//! Each [`poll`](Navigator::poll) is one sampling pass: every button the
//! current screen binds is sampled in stable order, and each debounced
//! press resolves its [`Action`] against the current screen.
//!
//! A transition runs:
//!
//! 1. cancel the old background task, show "Please wait...", join it
//! 2. build the target from the [`ScreenTable`] and call `initialize()`
//! 3. start the target's update job, if it has one
//!
//! Under [`JoinPolicy::Hard`] step 2 never overlaps the old job.

pub mod task;

use std::time::Duration;

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ButtonInput, Clock};
use crate::config::{ControllerConfig, JoinPolicy};
use crate::drivers::button::ButtonSampler;
use crate::error::{Error, NavigationError, Result};
use crate::screens::{Action, MenuScreen, Outcome, Screen, ScreenContext, ScreenId, ScreenTable};
use task::{BackgroundTask, JoinOutcome};

pub const PLEASE_WAIT: &str = "Please wait...";

pub struct Navigator<B: ButtonInput, C: Clock> {
    table: ScreenTable,
    ctx: ScreenContext,
    buttons: B,
    clock: C,
    sampler: ButtonSampler,
    current: Option<Box<dyn Screen>>,
    task: Option<BackgroundTask>,
    poll_interval: Duration,
    update_interval: Duration,
    join_policy: JoinPolicy,
    join_timeout: Duration,
}

impl<B: ButtonInput, C: Clock> Navigator<B, C> {
    pub fn new(
        table: ScreenTable,
        ctx: ScreenContext,
        buttons: B,
        clock: C,
        config: &ControllerConfig,
    ) -> Self {
        let sampler = ButtonSampler::new(clock.now_ms(), config.debounce_ms, config.repeat_policy);
        Self {
            table,
            ctx,
            buttons,
            clock,
            sampler,
            current: None,
            task: None,
            poll_interval: Duration::from_millis(config.poll_interval_ms.into()),
            update_interval: Duration::from_millis(config.update_interval_ms.into()),
            join_policy: config.join_policy,
            join_timeout: Duration::from_millis(config.join_timeout_ms.into()),
        }
    }

    /// Identity of the active screen, `None` before [`start`](Self::start).
    pub fn current(&self) -> Option<ScreenId> {
        self.current.as_ref().map(|s| s.id())
    }

    /// Whether a background task is running.
    pub fn has_task(&self) -> bool {
        self.task.is_some()
    }

    /// Load the glyphs and activate the first screen.
    pub fn start(&mut self, initial: ScreenId) -> Result<()> {
        self.ctx.display.load_glyphs()?;
        self.transition_to(initial)?;
        self.ctx.emit(AppEvent::Started(initial));
        Ok(())
    }

    /// Replace the active screen with a fresh instance of `target`.
    pub fn transition_to(&mut self, target: ScreenId) -> Result<()> {
        let from = self.current();
        self.stop_task()?;
        // Old screen is dropped only after its task has been handled.
        self.current = None;

        let mut screen = self.table.build(target, &self.ctx);
        screen.initialize()?;
        if let Some(job) = screen.updater() {
            self.task = Some(BackgroundTask::spawn(target, job, self.update_interval)?);
        }
        self.current = Some(screen);

        self.ctx.emit(AppEvent::ScreenChanged { from, to: target });
        Ok(())
    }

    fn stop_task(&mut self) -> Result<()> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        let screen = task.screen();
        task.cancel();
        self.ctx.display.show(&[PLEASE_WAIT])?;
        match task.join(self.join_policy, self.join_timeout) {
            JoinOutcome::Stopped => self.ctx.emit(AppEvent::TaskStopped { screen }),
            JoinOutcome::TimedOut => self.ctx.emit(AppEvent::TaskJoinTimedOut { screen }),
        }
        Ok(())
    }

    /// One sampling pass.
    ///
    /// Presses that arrive after a transition in the same pass are
    /// dropped; their buttons are still sampled so debounce state keeps
    /// advancing.
    pub fn poll(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let bindings = *self
            .current
            .as_ref()
            .ok_or(NavigationError::NoActiveScreen)?
            .bindings();

        let mut transitioned = false;
        for button in bindings.buttons() {
            let level = self.buttons.level(button)?;
            if !self.sampler.sample(button, level, now) || transitioned {
                continue;
            }
            let action = bindings.action(button)?;
            debug!("NAV | {button:?} -> {action:?}");
            transitioned = self.dispatch(action)?;
        }
        Ok(())
    }

    /// Poll forever with the configured spacing.  Returns only on error.
    pub fn run(&mut self) -> Result<()> {
        info!("NAV | input loop running every {:?}", self.poll_interval);
        loop {
            self.poll()?;
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Perform one action.  Returns `true` if it changed the screen.
    fn dispatch(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::TransitionTo(target) => {
                self.transition_to(target)?;
                Ok(true)
            }
            Action::TransitionToSelected => {
                let menu = self.current_menu()?;
                let id = menu.id();
                let target = menu
                    .selected_target()
                    .ok_or(NavigationError::UnsupportedAction(id))?;
                self.transition_to(target)?;
                Ok(true)
            }
            Action::SelectNextItem => {
                self.current_menu()?.select_next_item()?;
                Ok(false)
            }
            Action::SelectPreviousItem => {
                self.current_menu()?.select_previous_item()?;
                Ok(false)
            }
            Action::Screen(local) => {
                let screen = self.current.as_mut().ok_or(NavigationError::NoActiveScreen)?;
                match screen.handle(local)? {
                    Outcome::Stay => Ok(false),
                    Outcome::TransitionTo(target) => {
                        self.transition_to(target)?;
                        Ok(true)
                    }
                }
            }
        }
    }

    fn current_menu(&mut self) -> Result<&mut MenuScreen> {
        let screen = self.current.as_mut().ok_or(NavigationError::NoActiveScreen)?;
        let id = screen.id();
        screen
            .menu()
            .ok_or(Error::Navigation(NavigationError::UnsupportedAction(id)))
    }
}

impl<B: ButtonInput, C: Clock> Drop for Navigator<B, C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let screen = task.screen();
            task.cancel();
            match task.join(JoinPolicy::BestEffort, self.join_timeout) {
                JoinOutcome::Stopped => self.ctx.emit(AppEvent::TaskStopped { screen }),
                JoinOutcome::TimedOut => {
                    warn!("NAV | {} update still running at shutdown", screen);
                    self.ctx.emit(AppEvent::TaskJoinTimedOut { screen });
                }
            }
        }
    }
}
