use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlContextAttributes, WebGlPowerPreference,
    WebGlProgram, WebGlShader, WebGlUniformLocation, Window,
};

use super::{dom, PageContext};
use crate::config::BackgroundConfig;
use crate::device::Environment;
use crate::error::{PageError, Result};
use crate::particles::{Camera, CloudSpec, Rotation};

const VERTEX_SHADER: &str = r#"#version 300 es
in vec3 a_position;
uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_size;
uniform float u_scale;

void main() {
    vec4 mv = u_model_view * vec4(a_position, 1.0);
    gl_Position = u_projection * mv;
    gl_PointSize = max(u_size * (u_scale / -mv.z), 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform vec4 u_color;
out vec4 out_color;

void main() {
    out_color = u_color;
}
"#;

struct Uniforms {
    model_view: WebGlUniformLocation,
    projection: WebGlUniformLocation,
    size: WebGlUniformLocation,
    scale: WebGlUniformLocation,
    color: WebGlUniformLocation,
}

/// Point cloud drawn straight through WebGL2.
pub struct ParticleRenderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    uniforms: Uniforms,
    count: i32,
    size: f32,
    camera: Camera,
    rotation: Rotation,
    config: BackgroundConfig,
}

impl ParticleRenderer {
    fn new(canvas: HtmlCanvasElement, config: &BackgroundConfig, env: &Environment) -> Result<Self> {
        let low_end = env.is_low_end();
        let attributes = WebGlContextAttributes::new();
        attributes.set_alpha(true);
        attributes.set_antialias(!low_end);
        attributes.set_power_preference(if low_end {
            WebGlPowerPreference::LowPower
        } else {
            WebGlPowerPreference::HighPerformance
        });

        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &attributes)?
            .ok_or(PageError::WebGlUnavailable)?
            .dyn_into()
            .map_err(|_| PageError::WebGlUnavailable)?;

        let vertex = compile_shader(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;
        let uniforms = Uniforms {
            model_view: uniform(&gl, &program, "u_model_view")?,
            projection: uniform(&gl, &program, "u_projection")?,
            size: uniform(&gl, &program, "u_size")?,
            scale: uniform(&gl, &program, "u_scale")?,
            color: uniform(&gl, &program, "u_color")?,
        };

        let cloud = CloudSpec::build(config, env.width, || js_sys::Math::random() as f32);
        let buffer = gl
            .create_buffer()
            .ok_or_else(|| PageError::Js("create_buffer failed".into()))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let positions = js_sys::Float32Array::from(cloud.positions.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &positions, GL::STATIC_DRAW);

        let location = gl.get_attrib_location(&program, "a_position");
        if location < 0 {
            return Err(PageError::Link("a_position not bound".into()));
        }
        gl.enable_vertex_attrib_array(location as u32);
        gl.vertex_attrib_pointer_with_i32(location as u32, 3, GL::FLOAT, false, 0, 0);

        // Additive blending, no depth: the cloud is pure decoration.
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        gl.disable(GL::DEPTH_TEST);

        log::debug!(
            "particle background: {} points, size {}",
            cloud.point_count(),
            cloud.tier.size
        );

        let mut renderer = Self {
            gl,
            canvas,
            program,
            uniforms,
            count: cloud.point_count() as i32,
            size: cloud.tier.size,
            camera: Camera::new(config, env.aspect()),
            rotation: Rotation::default(),
            config: config.clone(),
        };
        renderer.resize(env);
        Ok(renderer)
    }

    /// Matches the canvas and camera to the viewport.
    pub fn resize(&mut self, env: &Environment) {
        let ratio = env.render_pixel_ratio(self.config.max_pixel_ratio);
        self.canvas.set_width((env.width * ratio).round() as u32);
        self.canvas.set_height((env.height * ratio).round() as u32);
        dom::set_style(&self.canvas, "width", &format!("{}px", env.width));
        dom::set_style(&self.canvas, "height", &format!("{}px", env.height));
        self.camera.set_aspect(env.aspect());
    }

    /// Advances the rotation by one step and draws.
    pub fn frame(&mut self) {
        self.rotation.advance(self.config.rotation_step);
        self.render();
    }

    fn render(&self) {
        let gl = &self.gl;
        let (width, height) = (self.canvas.width() as i32, self.canvas.height() as i32);
        gl.viewport(0, 0, width, height);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(GL::COLOR_BUFFER_BIT);

        gl.use_program(Some(&self.program));
        let model_view = self.camera.model_view(self.rotation).to_cols_array();
        let projection = self.camera.projection().to_cols_array();
        gl.uniform_matrix4fv_with_f32_array(Some(&self.uniforms.model_view), false, &model_view);
        gl.uniform_matrix4fv_with_f32_array(Some(&self.uniforms.projection), false, &projection);
        gl.uniform1f(Some(&self.uniforms.size), self.size);
        gl.uniform1f(Some(&self.uniforms.scale), height as f32 * 0.5);
        let [r, g, b] = self.config.color;
        gl.uniform4f(Some(&self.uniforms.color), r, g, b, self.config.opacity);
        gl.draw_arrays(GL::POINTS, 0, self.count);
    }
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| PageError::Shader("create_shader failed".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(PageError::Shader(gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| PageError::Link("create_program failed".into()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(PageError::Link(gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn uniform(gl: &GL, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| PageError::Link(format!("uniform {name} not found")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Stopped,
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// `requestAnimationFrame` loop with an explicit run state.
///
/// Two independent holds can pause it: a caller through [`FrameLoop::pause`]
/// and the page going hidden. The loop runs only while neither is held, so
/// the tab becoming visible never overrides a caller's pause. A paused loop
/// stops rescheduling; a stopped loop never runs again.
pub struct FrameLoop {
    window: Window,
    state: Rc<Cell<LoopState>>,
    held: Cell<bool>,
    hidden: Cell<bool>,
    scheduled: Rc<Cell<bool>>,
    tick: Tick,
}

impl FrameLoop {
    pub fn start(window: Window, mut on_frame: impl FnMut() + 'static) -> Result<Self> {
        let state = Rc::new(Cell::new(LoopState::Running));
        let scheduled = Rc::new(Cell::new(false));
        // `tick` holds the animation-frame closure so that it can keep
        // calling `request_animation_frame` on itself.
        let tick: Tick = Rc::new(RefCell::new(None));

        let frame_loop = Self {
            window: window.clone(),
            state: Rc::clone(&state),
            held: Cell::new(false),
            hidden: Cell::new(false),
            scheduled: Rc::clone(&scheduled),
            tick: Rc::clone(&tick),
        };

        let next = Rc::clone(&tick);
        let rescheduled = Rc::clone(&scheduled);
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            rescheduled.set(false);
            if state.get() != LoopState::Running {
                return;
            }
            on_frame();
            if let Err(e) = schedule(&window, &next, &rescheduled) {
                log::error!("animation frame: {e}");
            }
        }) as Box<dyn FnMut()>));

        schedule(&frame_loop.window, &frame_loop.tick, &frame_loop.scheduled)?;
        Ok(frame_loop)
    }

    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    pub fn pause(&self) {
        self.held.set(true);
        self.refresh();
    }

    pub fn resume(&self) {
        self.held.set(false);
        self.refresh();
    }

    /// Page visibility hold, driven by `visibilitychange`.
    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
        self.refresh();
    }

    pub fn stop(&self) {
        self.state.set(LoopState::Stopped);
    }

    fn refresh(&self) {
        if self.state.get() == LoopState::Stopped {
            return;
        }
        if self.held.get() || self.hidden.get() {
            self.state.set(LoopState::Paused);
            return;
        }
        self.state.set(LoopState::Running);
        if let Err(e) = schedule(&self.window, &self.tick, &self.scheduled) {
            log::error!("animation frame: {e}");
        }
    }
}

fn schedule(window: &Window, tick: &Tick, scheduled: &Cell<bool>) -> Result<()> {
    if scheduled.get() {
        return Ok(());
    }
    if let Some(callback) = tick.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
        scheduled.set(true);
    }
    Ok(())
}

/// Control surface for the background animation, also exported to JS.
#[wasm_bindgen]
#[derive(Clone)]
pub struct BackgroundHandle {
    frame_loop: Rc<FrameLoop>,
    renderer: Rc<RefCell<ParticleRenderer>>,
}

#[wasm_bindgen]
impl BackgroundHandle {
    pub fn pause(&self) {
        self.frame_loop.pause();
    }

    pub fn resume(&self) {
        self.frame_loop.resume();
    }

    pub fn stop(&self) {
        self.frame_loop.stop();
    }

    #[wasm_bindgen(js_name = "isRunning")]
    pub fn is_running(&self) -> bool {
        self.frame_loop.state() == LoopState::Running
    }
}

impl BackgroundHandle {
    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    pub fn frame_loop(&self) -> Rc<FrameLoop> {
        Rc::clone(&self.frame_loop)
    }

    pub fn renderer(&self) -> Rc<RefCell<ParticleRenderer>> {
        Rc::clone(&self.renderer)
    }
}

thread_local! {
    static BACKGROUND: RefCell<Option<BackgroundHandle>> = const { RefCell::new(None) };
}

/// Keeps the handle reachable from `backgroundHandle()`.
pub fn install(handle: BackgroundHandle) {
    BACKGROUND.with(|slot| *slot.borrow_mut() = Some(handle));
}

#[wasm_bindgen(js_name = "backgroundHandle")]
pub fn background_handle() -> Option<BackgroundHandle> {
    BACKGROUND.with(|slot| slot.borrow().clone())
}

/// Creates the canvas, builds the cloud and starts the loop. On failure the
/// canvas is removed again and the page carries on without it.
pub fn start(ctx: &PageContext, env: &Environment) -> Result<BackgroundHandle> {
    let config = &ctx.config.background;
    let container = dom::by_id(&ctx.document, config.container_id)
        .ok_or_else(|| PageError::MissingElement(format!("#{}", config.container_id)))?;
    let canvas: HtmlCanvasElement = ctx
        .document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| PageError::Js("canvas element has the wrong type".into()))?;
    container.append_child(&canvas)?;

    let renderer = match ParticleRenderer::new(canvas.clone(), config, env) {
        Ok(renderer) => Rc::new(RefCell::new(renderer)),
        Err(e) => {
            canvas.remove();
            return Err(e);
        }
    };

    let drawn = Rc::clone(&renderer);
    let frame_loop = Rc::new(FrameLoop::start(ctx.window.clone(), move || {
        drawn.borrow_mut().frame()
    })?);

    // No point drawing into a hidden tab.
    let document = ctx.document.clone();
    let visibility = Rc::clone(&frame_loop);
    dom::listen(&ctx.document, "visibilitychange", move |_: web_sys::Event| {
        visibility.set_hidden(document.hidden())
    })?;

    Ok(BackgroundHandle {
        frame_loop,
        renderer,
    })
}
