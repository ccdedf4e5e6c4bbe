use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result;
use ratatui::prelude::Rect;

use crate::{
    config::Config,
    enums::ScreenId,
    providers::Providers,
    screens::{build_screen, Payload, Screen, ScreenContext, Transition},
    tui,
    widgets::{InputEvent, Surface},
};

/// Whether the event loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the active screen and performs transitions between screens.
pub struct Navigator {
    ctx: ScreenContext,
    active: Box<dyn Screen>,
    /// The main menu while another screen is active. Built once, then reused.
    parked_main: Option<Box<dyn Screen>>,
    rendered: bool,
}

impl Navigator {
    pub fn new(ctx: ScreenContext) -> Self {
        let mut active = build_screen(ScreenId::Main, &ctx, None);
        active.set_touch_mode(true);
        Self {
            ctx,
            active,
            parked_main: None,
            rendered: false,
        }
    }

    pub fn active_id(&self) -> ScreenId {
        self.active.id()
    }

    pub fn is_live(&self) -> bool {
        self.active.is_live()
    }

    pub fn render(&mut self, surface: &mut dyn Surface) {
        self.active.render(surface);
        self.rendered = true;
    }

    /// Route one event to the active screen and apply the transition it asks for.
    pub fn dispatch(&mut self, event: &InputEvent) -> Flow {
        // Regions from before the latest switch belong to another layout.
        if !self.rendered && matches!(event, InputEvent::Pointer(_)) {
            log::debug!("Dropping pointer event before first render of {}", self.active_id());
            return Flow::Continue;
        }
        match self.active.handle_input(event) {
            Transition::Stay => Flow::Continue,
            Transition::Switch { to, payload } => {
                self.switch(to, payload);
                Flow::Continue
            }
            Transition::Quit => Flow::Quit,
        }
    }

    fn switch(&mut self, to: ScreenId, payload: Option<Payload>) {
        let from = self.active_id();
        if let Err(e) = self.active.shutdown() {
            log::warn!("Shutting down {from} failed: {e}");
        }
        let incoming = match (to, self.parked_main.take()) {
            (ScreenId::Main, Some(main)) => main,
            (_, parked) => {
                self.parked_main = parked;
                build_screen(to, &self.ctx, payload)
            }
        };
        let outgoing = std::mem::replace(&mut self.active, incoming);
        if from == ScreenId::Main {
            self.parked_main = Some(outgoing);
        }
        self.active.set_touch_mode(true);
        self.rendered = false;
        log::info!("Screen {from} -> {to}");
    }

    /// Stop whatever the active screen runs in the background.
    pub fn shutdown(&mut self) -> Result<()> {
        self.active.shutdown()
    }
}

pub struct App {
    pub config: Config,
    pub navigator: Navigator,
}

impl App {
    pub fn new(config: Config, providers: Arc<dyn Providers>) -> Self {
        let ctx = ScreenContext::new(providers, config.dashboard.clone());
        Self {
            config,
            navigator: Navigator::new(ctx),
        }
    }

    fn draw(&mut self, tui: &mut tui::Tui) -> Result<()> {
        tui.draw(|f| self.navigator.render(f.buffer_mut()))?;
        Ok(())
    }

    /// Wait for the next terminal event. Live screens get an `Idle` tick instead
    /// when nothing arrives within the redraw interval.
    async fn next_event(&self, tui: &mut tui::Tui) -> Option<NextEvent> {
        if !self.navigator.is_live() {
            return tui.next().await.map(NextEvent::Terminal);
        }
        let redraw = Duration::from_millis(self.config.dashboard.live_redraw_ms.max(10));
        match tokio::time::timeout(redraw, tui.next()).await {
            Ok(event) => event.map(NextEvent::Terminal),
            Err(_) => Some(NextEvent::Idle),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = tui::Tui::new()?.mouse(true);
        tui.enter()?;

        loop {
            let Some(event) = self.next_event(&mut tui).await else {
                log::info!("Terminal event stream ended");
                break;
            };
            let flow = match event {
                NextEvent::Idle => self.navigator.dispatch(&InputEvent::Idle),
                NextEvent::Terminal(tui::Event::Mouse(mouse)) => {
                    self.navigator.dispatch(&InputEvent::Pointer(mouse))
                }
                NextEvent::Terminal(tui::Event::Resize(w, h)) => {
                    tui.resize(Rect::new(0, 0, w, h))?;
                    Flow::Continue
                }
                NextEvent::Terminal(tui::Event::Quit | tui::Event::Closed) => Flow::Quit,
                NextEvent::Terminal(tui::Event::Error) => {
                    log::warn!("Terminal reported an input error");
                    Flow::Continue
                }
                NextEvent::Terminal(_) => Flow::Continue,
            };
            if flow == Flow::Quit {
                break;
            }
            self.draw(&mut tui)?;
        }

        self.navigator.shutdown()?;
        tui.exit()?;
        Ok(())
    }
}

enum NextEvent {
    Terminal(tui::Event),
    Idle,
}
