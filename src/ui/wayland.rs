use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_output, delegate_pointer, delegate_registry,
    delegate_seat, delegate_shm, delegate_layer,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Modifiers},
        pointer::{PointerEvent as WlPointerEvent, PointerEventKind, PointerHandler, BTN_LEFT},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm, ShmHandler},
};
use wayland_client::{
    globals::GlobalList,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_shm, wl_surface},
    Connection, QueueHandle,
};
use xkbcommon::xkb::{self, keysyms};
use log::{debug, error, warn};
use crate::events::{Key, KeyboardEvent};
use crate::launcher;
use crate::state::{Action, AppState};
use crate::ui::render::Renderer;

pub struct WaylandApp {
    pub registry_state: RegistryState,
    pub seat_state: SeatState,
    pub output_state: OutputState,
    pub compositor_state: CompositorState,
    pub shm_state: Shm,
    pub layer_shell_state: LayerShell,

    pub layer_surface: Option<LayerSurface>,
    pub pool: Option<SlotPool>,
    pub keyboard: Option<wl_keyboard::WlKeyboard>,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub modifiers: Modifiers,
    pub width: u32,
    pub height: u32,
    pub first_configure: bool,
    pub surface_visible: bool,
    pub should_exit: bool,

    pub state: AppState,
    pub renderer: Renderer,
}

impl WaylandApp {
    pub fn new(globals: &GlobalList, qh: &QueueHandle<Self>, state: AppState, renderer: Renderer) -> anyhow::Result<Self> {
        let registry_state = RegistryState::new(globals);
        let seat_state = SeatState::new(globals, qh);
        let output_state = OutputState::new(globals, qh);
        let compositor_state = CompositorState::bind(globals, qh)
            .map_err(|e| anyhow::anyhow!("wl_compositor not available: {e}"))?;
        let shm_state = Shm::bind(globals, qh)
            .map_err(|e| anyhow::anyhow!("wl_shm not available: {e}"))?;
        let layer_shell_state = LayerShell::bind(globals, qh)
            .map_err(|e| anyhow::anyhow!("zwlr_layer_shell_v1 not available: {e}"))?;

        let height = state.config.general.bar_height;
        Ok(Self {
            registry_state,
            seat_state,
            output_state,
            compositor_state,
            shm_state,
            layer_shell_state,
            layer_surface: None,
            pool: None,
            keyboard: None,
            pointer: None,
            modifiers: Modifiers::default(),
            width: 0,
            height,
            first_configure: true,
            surface_visible: false,
            should_exit: false,
            state,
            renderer,
        })
    }

    /// Anchors and sizing for the bar (overlay hidden) or the full-output
    /// backdrop (overlay visible).
    pub fn configure_surface(&self, layer_surface: &LayerSurface, visible: bool) {
        let bar_height = self.state.config.general.bar_height;
        if visible {
            layer_surface.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
            layer_surface.set_size(0, 0);
            layer_surface.set_exclusive_zone(-1);
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
        } else {
            layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT);
            layer_surface.set_size(0, bar_height);
            layer_surface.set_exclusive_zone(bar_height as i32);
            layer_surface.set_keyboard_interactivity(KeyboardInteractivity::OnDemand);
        }
        layer_surface.commit();
    }

    /// Follows the overlay's visibility after an input event, then redraws.
    fn after_input(&mut self, conn: &Connection, qh: &QueueHandle<Self>, action: Option<Action>) {
        match action {
            Some(Action::Open(entry)) => {
                if let Err(e) = launcher::open(&entry, &self.state.config) {
                    error!("Failed to open '{}': {e:#}", entry.link);
                }
            }
            Some(Action::Exit) => self.should_exit = true,
            None => {}
        }

        let visible = self.state.overlay.is_visible();
        if visible != self.surface_visible {
            self.surface_visible = visible;
            debug!("WaylandApp: reconfiguring surface, visible={visible}");
            if let Some(layer_surface) = &self.layer_surface {
                self.configure_surface(layer_surface, visible);
            }
            // configure brings the new size and the redraw
            return;
        }
        self.draw(conn, qh);
    }

    pub fn draw(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>) {
        if let Some(layer_surface) = &self.layer_surface {
            let width = self.width;
            let height = self.height;
            if width == 0 || height == 0 { return; }

            let Some(pool) = self.pool.as_mut() else { return; };

            let (buffer, canvas) = match pool.create_buffer(
                width as i32,
                height as i32,
                (width * 4) as i32,
                wl_shm::Format::Argb8888,
            ) {
                Ok(created) => created,
                Err(e) => {
                    error!("Failed to create buffer: {e}");
                    return;
                }
            };

            if let Some(mut pixmap) = tiny_skia::PixmapMut::from_bytes(canvas, width, height) {
                self.renderer.draw(&mut pixmap, &self.state);

                // RGBA -> BGRA for Argb8888
                for chunk in canvas.chunks_exact_mut(4) {
                    chunk.swap(0, 2);
                }

                layer_surface.wl_surface().attach(Some(buffer.wl_buffer()), 0, 0);
                layer_surface.wl_surface().damage(0, 0, width as i32, height as i32);
                layer_surface.wl_surface().commit();
            }
        }
    }
}

fn translate_key(event: &KeyEvent, modifiers: &Modifiers) -> KeyboardEvent {
    let key = match u32::from(event.keysym) {
        keysyms::KEY_Escape => Key::Escape,
        keysyms::KEY_Return | keysyms::KEY_KP_Enter => Key::Enter,
        keysyms::KEY_BackSpace => Key::Backspace,
        keysyms::KEY_Up => Key::Up,
        keysyms::KEY_Down => Key::Down,
        _ => char::from_u32(xkb::keysym_to_utf32(event.keysym))
            .filter(|c| *c != '\0' && !c.is_control())
            .map(Key::Char)
            .unwrap_or(Key::Other),
    };

    let mut translated = KeyboardEvent::new(key);
    if modifiers.ctrl {
        translated = translated.with_ctrl();
    }
    if modifiers.logo {
        translated = translated.with_meta();
    }
    translated
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        if configure.new_size.0 > 0 {
            self.width = configure.new_size.0;
        }
        if configure.new_size.1 > 0 {
            self.height = configure.new_size.1;
        }
        self.state.resize(self.width as f32, self.height as f32);

        let needed = (self.width * self.height * 4) as usize;
        if self.first_configure {
            self.first_configure = false;
            match SlotPool::new(needed, &self.shm_state) {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    error!("Failed to create shm pool: {e}");
                    self.should_exit = true;
                    return;
                }
            }
        }

        if let Some(pool) = &mut self.pool {
            if pool.len() < needed {
                if let Err(e) = pool.resize(needed) {
                    error!("Failed to resize shm pool: {e}");
                    return;
                }
            }
        }

        self.draw(conn, qh);
    }
}

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {}

    fn frame(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        self.draw(conn, qh);
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {}

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {}

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {}
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }
    fn new_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
    fn update_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
    fn output_destroyed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Keyboard && self.keyboard.is_none() {
            match self.seat_state.get_keyboard(qh, &seat, None) {
                Ok(keyboard) => self.keyboard = Some(keyboard),
                Err(e) => warn!("Failed to get keyboard: {e}"),
            }
        }
        if capability == Capability::Pointer && self.pointer.is_none() {
            match self.seat_state.get_pointer(qh, &seat) {
                Ok(pointer) => self.pointer = Some(pointer),
                Err(e) => warn!("Failed to get pointer: {e}"),
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _: &QueueHandle<Self>,
        _: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Keyboard {
            if let Some(keyboard) = self.keyboard.take() {
                keyboard.release();
            }
        }
        if capability == Capability::Pointer {
            if let Some(pointer) = self.pointer.take() {
                pointer.release();
            }
        }
    }

    fn remove_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: &wl_surface::WlSurface,
        _: u32,
        _: &[u32],
        _: &[xkb::Keysym],
    ) {}

    fn leave(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: &wl_surface::WlSurface,
        _: u32,
    ) {}

    fn press_key(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let action = self.state.handle_key(translate_key(&event, &self.modifiers));
        self.after_input(conn, qh, action);
    }

    fn release_key(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: u32,
        _: KeyEvent,
    ) {}

    fn update_modifiers(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _serial: u32,
        modifiers: Modifiers,
        _layout: u32,
    ) {
        self.modifiers = modifiers;
    }
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[WlPointerEvent],
    ) {
        for event in events {
            let (x, y) = (event.position.0 as f32, event.position.1 as f32);
            match event.kind {
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    let action = self.state.handle_pointer_down(x, y);
                    self.after_input(conn, qh, action);
                }
                PointerEventKind::Motion { .. } => {
                    if self.state.handle_pointer_motion(x, y) {
                        self.draw(conn, qh);
                    }
                }
                _ => {}
            }
        }
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }
}

delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_registry!(WaylandApp);

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    fn runtime_add_global(&mut self, _: &Connection, _: &QueueHandle<Self>, _: u32, _: &str, _: u32) {
    }
    fn runtime_remove_global(&mut self, _: &Connection, _: &QueueHandle<Self>, _: u32, _: &str) {
    }
}
