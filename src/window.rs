use std::sync::Arc;

use anyhow::{anyhow, Context};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{
    config::AppConfig,
    demo::DemoState,
    engine,
    rendering::{draw_list::DrawList, renderer::Renderer},
};

/// How the frame loop reacts to a failed surface acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
    Fatal,
}

fn surface_recovery(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Fatal,
        wgpu::SurfaceError::Timeout => {
            log::warn!("Timeout");
            SurfaceRecovery::SkipFrame
        }
        other => {
            log::error!("Unexpected error: {:?}", other);
            SurfaceRecovery::SkipFrame
        }
    }
}

struct App {
    config: AppConfig,
    renderer: Option<Renderer>,
    demo_state: DemoState,
    draw_list: DrawList,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig, demo_state: DemoState) -> Self {
        Self {
            config,
            renderer: None,
            demo_state,
            draw_list: DrawList::new(),
            fatal: None,
        }
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Renderer> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = event_loop
            .create_window(window_attributes)
            .context("Unable to create window")?;

        pollster::block_on(Renderer::new(Arc::new(window), &self.config))
    }

    /// Stops the event loop; `run` hands `error` back to the caller.
    fn abort(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        engine::update(
            &mut self.demo_state,
            &mut self.draw_list,
            renderer.aspect_ratio(),
        );

        if let Err(error) = renderer.render(&self.draw_list) {
            match surface_recovery(&error) {
                SurfaceRecovery::Reconfigure => renderer.resize(renderer.size),
                SurfaceRecovery::SkipFrame => {}
                SurfaceRecovery::Fatal => {
                    self.abort(event_loop, anyhow!("Surface error while rendering: {error}"));
                    return;
                }
            }
        }

        renderer.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                renderer.window.request_redraw();
                self.renderer = Some(renderer);
            }
            Err(error) => self.abort(event_loop, error),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new().context("Failed to create demo state")?;
    let mut app = App::new(config, demo_state);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_ends_the_run() {
        assert_eq!(
            surface_recovery(&wgpu::SurfaceError::OutOfMemory),
            SurfaceRecovery::Fatal
        );
    }

    #[test]
    fn stale_surfaces_are_reconfigured() {
        for error in [wgpu::SurfaceError::Lost, wgpu::SurfaceError::Outdated] {
            assert_eq!(surface_recovery(&error), SurfaceRecovery::Reconfigure);
        }
        assert_eq!(
            surface_recovery(&wgpu::SurfaceError::Timeout),
            SurfaceRecovery::SkipFrame
        );
    }
}
