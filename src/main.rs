use std::sync::Arc;

use ambient_backdrop::cli::Cli;
use ambient_backdrop::config::AppConfig;
use ambient_backdrop::core::{AmbientSceneController, WgpuBackend, WindowHost};
use ambient_backdrop::frame::FrameStats;
use ambient_backdrop::navigation::{NavMenu, ScrollSpy, Section, SectionLayout};
use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const SCROLL_LINE_HEIGHT: f32 = 40.0;

type Background = AmbientSceneController<WgpuBackend, WindowHost>;

/// Scroll position, active section and menu state of the page
struct Page {
    spy: ScrollSpy,
    menu: NavMenu,
    scroll_y: f32,
    viewport_height: f32,
    layouts: Vec<SectionLayout>,
}

impl Page {
    fn new(viewport_height: f32) -> Self {
        Self {
            spy: ScrollSpy::new(),
            menu: NavMenu::new(),
            scroll_y: 0.0,
            viewport_height,
            layouts: SectionLayout::uniform(viewport_height),
        }
    }

    /// Sections are one viewport tall
    fn relayout(&mut self, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let progress = self.scroll_y / self.viewport_height.max(1.0);
        self.viewport_height = viewport_height;
        self.layouts = SectionLayout::uniform(viewport_height);
        self.scroll_y = progress * viewport_height;
        self.spy.on_scroll(self.scroll_y, &self.layouts);
    }

    fn max_scroll(&self) -> f32 {
        let page_height: f32 = self.layouts.iter().map(|l| l.height).sum();
        (page_height - self.viewport_height).max(0.0)
    }

    fn scroll_by(&mut self, dy: f32) -> Option<Section> {
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, self.max_scroll());
        self.spy.on_scroll(self.scroll_y, &self.layouts)
    }

    fn jump_to(&mut self, section: Section) -> Option<Section> {
        let target = self.menu.scroll_to(section, &self.layouts)?;
        self.scroll_y = target.min(self.max_scroll());
        self.spy.on_scroll(self.scroll_y, &self.layouts)
    }

    fn title(&self, base: &str) -> String {
        let menu = if self.menu.is_open() { " [menu]" } else { "" };
        format!("{} | {}{}", base, self.spy.active(), menu)
    }
}

struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    host: Option<WindowHost>,
    background: Option<Background>,
    page: Page,
    stats: FrameStats,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let page = Page::new(config.window.height as f32);
        Self {
            config,
            window: None,
            host: None,
            background: None,
            page,
            stats: FrameStats::new(),
        }
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.page.title(&self.config.window.title));
        }
    }

    fn section_changed(&self, section: Option<Section>) {
        if let Some(section) = section {
            log::info!("Active section: {}", section.id());
            self.refresh_title();
        }
    }

    fn unmount_background(&mut self) {
        if let Some(background) = &mut self.background {
            background.teardown();
        }
    }

    fn tick_background(&mut self) {
        let Some(background) = &mut self.background else {
            return;
        };
        if !background.frame_due() {
            return;
        }

        self.stats.record();
        if let Err(e) = background.frame_tick() {
            // The page stays usable without its backdrop
            log::error!("Ambient frame failed, removing background: {:#}", e);
            background.teardown();
        }
    }

    fn handle_key(&mut self, keycode: KeyCode) {
        let section = match keycode {
            KeyCode::KeyM => {
                let open = self.page.menu.toggle();
                log::debug!("Menu {}", if open { "opened" } else { "closed" });
                self.refresh_title();
                return;
            }
            KeyCode::Digit1 => Section::Home,
            KeyCode::Digit2 => Section::About,
            KeyCode::Digit3 => Section::Skills,
            KeyCode::Digit4 => Section::Projects,
            KeyCode::Digit5 => Section::Contact,
            _ => return,
        };

        let changed = self.page.jump_to(section);
        self.section_changed(changed);
        self.refresh_title();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_transparent(self.config.window.transparent)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let host = WindowHost::new(window.clone());
        let size = window.inner_size();
        let mut background =
            AmbientSceneController::new(WgpuBackend::new(self.config.render_settings()));

        let mount = self.config.background.enabled.then(|| host.clone());
        if let Err(e) = background.initialize(size.width, size.height, mount) {
            log::error!("Ambient background unavailable: {:#}", e);
        }

        self.page.relayout(size.height as f32);
        self.window = Some(window);
        self.host = Some(host);
        self.background = Some(background);
        self.refresh_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.unmount_background();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(keycode),
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(keycode),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => -lines * SCROLL_LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                let changed = self.page.scroll_by(dy);
                self.section_changed(changed);
            }
            WindowEvent::Resized(size) => {
                let listening = self.host.as_ref().is_some_and(|h| h.has_resize_listener());
                if let (true, Some(background)) = (listening, &mut self.background) {
                    background.on_resize(size.width, size.height);
                }
                self.page.relayout(size.height as f32);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.tick_background(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount_background();
        log::info!(
            "{} background frames in {:.1}s, last {:.1} FPS",
            self.stats.frame_number(),
            self.stats.elapsed(),
            self.stats.fps()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli)?;
    log::debug!("Configuration: {:?}", config);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    log::info!("Scroll to move between sections, 1-5 to jump, M for menu, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
