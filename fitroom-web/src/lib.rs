/// Fitroom Web - WebGL2 front end for the viewer transform pipeline
///
/// The page owns the canvas and the `requestAnimationFrame` loop. It calls
/// `frame()` once per callback and forwards pointer, wheel and resize events;
/// everything else lives in `WebRenderer`.

use fitroom_core::{IndexedMesh, TransformPipeline, TransformState, ViewerConfig};
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlProgram, WebGlUniformLocation,
};

pub mod gl;

pub use gl::RenderError;
use gl::MeshBuffers;

/// Background grey of the fitting room (0x808080)
const CLEAR_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

#[wasm_bindgen]
pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    matrix_uniform: WebGlUniformLocation,
    mesh: MeshBuffers,
    pipeline: TransformPipeline,
    state: TransformState,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Attach to an existing canvas and prepare the program and cube buffers
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        Ok(Self::init(canvas_id, ViewerConfig::default())?)
    }

    /// Render one frame: advance auto-rotation, rebuild the matrix, draw
    pub fn frame(&mut self) {
        let matrix = self.pipeline.frame(&mut self.state);

        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        self.gl.use_program(Some(&self.program));
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&self.matrix_uniform), false, matrix.as_slice());
        self.gl.bind_vertex_array(Some(&self.mesh.vao));
        self.gl
            .draw_elements_with_i32(Gl::TRIANGLES, self.mesh.index_count, Gl::UNSIGNED_SHORT, 0);
        self.gl.bind_vertex_array(None);
    }

    /// New drawing-buffer size in device pixels. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Err(err) = self.pipeline.resize(width as f32, height as f32) {
            warn!("resize to {width}x{height} rejected: {err}");
            return;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pipeline.pointer_down(&mut self.state, x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pipeline.pointer_move(&mut self.state, x, y);
    }

    pub fn pointer_up(&mut self) {
        self.pipeline.pointer_up(&mut self.state);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.pipeline.wheel(&mut self.state, delta_y);
    }

    /// Returns whether auto-rotation is now on
    pub fn toggle_rotation(&mut self) -> bool {
        self.state.toggle_rotation()
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        self.state.set_rotation_enabled(enabled);
    }

    pub fn reset(&mut self) {
        self.pipeline.reset(&mut self.state);
    }

    pub fn rotation_angle(&self) -> f32 {
        self.state.rotation_angle
    }

    pub fn camera_distance(&self) -> f32 {
        self.state.camera_distance
    }
}

impl WebRenderer {
    /// Fallible setup with an explicit config
    pub fn init(canvas_id: &str, config: ViewerConfig) -> Result<WebRenderer, RenderError> {
        let canvas = find_canvas(canvas_id)?;

        let width = canvas.client_width().max(0) as u32;
        let height = canvas.client_height().max(0) as u32;
        // Zero or negative size is fatal here, not a per-frame condition
        let pipeline = TransformPipeline::new(config, width as f32, height as f32)?;
        canvas.set_width(width);
        canvas.set_height(height);

        let gl = canvas
            .get_context("webgl2")
            .map_err(|_| RenderError::ContextUnavailable)?
            .ok_or(RenderError::ContextUnavailable)?
            .dyn_into::<Gl>()
            .map_err(|_| RenderError::ContextUnavailable)?;

        let program = gl::link_program(&gl)?;
        let matrix_uniform = gl::uniform(&gl, &program, gl::MATRIX_UNIFORM)?;
        let mesh = MeshBuffers::upload(&gl, &program, &IndexedMesh::cube(2.0))?;

        gl.viewport(0, 0, width as i32, height as i32);
        gl.enable(Gl::DEPTH_TEST);
        gl.enable(Gl::CULL_FACE);
        let [r, g, b, a] = CLEAR_COLOR;
        gl.clear_color(r, g, b, a);

        info!("renderer attached to '{canvas_id}' at {width}x{height}");

        let state = pipeline.initial_state();
        Ok(WebRenderer {
            canvas,
            gl,
            program,
            matrix_uniform,
            mesh,
            pipeline,
            state,
        })
    }
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, RenderError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(RenderError::NoWindow)?;

    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| RenderError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| RenderError::NotACanvas(canvas_id.to_string()))
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info)
        .map_err(|e| JsValue::from_str(&format!("Failed to init logger: {}", e)))?;

    Ok(())
}
