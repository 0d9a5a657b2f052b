/// WebGL2 program and buffer setup
use fitroom_core::{ColoredVertex, IndexedMesh, ViewerError};
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const COLOR_ATTRIBUTE: &str = "a_color";
pub const MATRIX_UNIFORM: &str = "u_matrix";

pub const VERTEX_SHADER: &str = r#"#version 300 es
in vec3 a_position;
in vec4 a_color;

uniform mat4 u_matrix;

out vec4 v_color;

void main() {
    gl_Position = u_matrix * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec4 v_color;
out vec4 out_color;

void main() {
    out_color = v_color;
}
"#;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no global window")]
    NoWindow,
    #[error("canvas '{0}' not found")]
    CanvasNotFound(String),
    #[error("element '{0}' is not a canvas")]
    NotACanvas(String),
    #[error("WebGL2 context unavailable")]
    ContextUnavailable,
    #[error("failed to create {0}")]
    Create(&'static str),
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("shader input '{0}' not found in program")]
    MissingInput(&'static str),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

impl From<RenderError> for JsValue {
    fn from(err: RenderError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, RenderError> {
    let stage = if kind == Gl::VERTEX_SHADER { "vertex" } else { "fragment" };
    let shader = gl.create_shader(kind).ok_or(RenderError::Create("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(RenderError::ShaderCompile { stage, log })
    }
}

/// Compile both stages and link them. Nothing is drawn unless this succeeds.
pub fn link_program(gl: &Gl) -> Result<WebGlProgram, RenderError> {
    let vertex = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
    let fragment = compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or(RenderError::Create("program"))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    // The program keeps its own copy once linked
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(RenderError::ProgramLink(log))
    }
}

/// GPU copies of one static mesh, uploaded once
pub struct MeshBuffers {
    pub vao: WebGlVertexArrayObject,
    _vertices: WebGlBuffer,
    _indices: WebGlBuffer,
    pub index_count: i32,
}

impl MeshBuffers {
    pub fn upload(
        gl: &Gl,
        program: &WebGlProgram,
        mesh: &IndexedMesh,
    ) -> Result<Self, RenderError> {
        let vao = gl.create_vertex_array().ok_or(RenderError::Create("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let vertices = gl.create_buffer().ok_or(RenderError::Create("vertex buffer"))?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vertices));
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        gl.buffer_data_with_u8_array(Gl::ARRAY_BUFFER, vertex_bytes, Gl::STATIC_DRAW);

        let stride = ColoredVertex::STRIDE as i32;
        let position = attribute(gl, program, POSITION_ATTRIBUTE)?;
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_with_i32(position, 3, Gl::FLOAT, false, stride, 0);

        let color = attribute(gl, program, COLOR_ATTRIBUTE)?;
        gl.enable_vertex_attrib_array(color);
        gl.vertex_attrib_pointer_with_i32(
            color,
            4,
            Gl::FLOAT,
            false,
            stride,
            ColoredVertex::COLOR_OFFSET as i32,
        );

        // Element buffer binding is recorded in the VAO
        let indices = gl.create_buffer().ok_or(RenderError::Create("index buffer"))?;
        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&indices));
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
        gl.buffer_data_with_u8_array(Gl::ELEMENT_ARRAY_BUFFER, index_bytes, Gl::STATIC_DRAW);

        gl.bind_vertex_array(None);

        Ok(Self {
            vao,
            _vertices: vertices,
            _indices: indices,
            index_count: mesh.indices.len() as i32,
        })
    }
}

fn attribute(gl: &Gl, program: &WebGlProgram, name: &'static str) -> Result<u32, RenderError> {
    let location = gl.get_attrib_location(program, name);
    u32::try_from(location).map_err(|_| RenderError::MissingInput(name))
}

pub fn uniform(
    gl: &Gl,
    program: &WebGlProgram,
    name: &'static str,
) -> Result<WebGlUniformLocation, RenderError> {
    gl.get_uniform_location(program, name)
        .ok_or(RenderError::MissingInput(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_inputs_match_names() {
        assert!(VERTEX_SHADER.contains(&format!("in vec3 {POSITION_ATTRIBUTE};")));
        assert!(VERTEX_SHADER.contains(&format!("in vec4 {COLOR_ATTRIBUTE};")));
        assert!(VERTEX_SHADER.contains(&format!("uniform mat4 {MATRIX_UNIFORM};")));
        assert!(VERTEX_SHADER.starts_with("#version 300 es"));
        assert!(FRAGMENT_SHADER.starts_with("#version 300 es"));
    }

    #[test]
    fn test_cube_upload_sizes() {
        let cube = IndexedMesh::cube(2.0);
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&cube.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&cube.indices);
        assert_eq!(vertex_bytes.len(), 24 * ColoredVertex::STRIDE);
        assert_eq!(index_bytes.len(), 36 * 2);
    }

    #[test]
    fn test_error_messages() {
        let err = RenderError::ShaderCompile {
            stage: "vertex",
            log: "ERROR: 0:3".to_string(),
        };
        assert_eq!(err.to_string(), "vertex shader failed to compile: ERROR: 0:3");

        let err: RenderError = ViewerError::InvalidViewport { width: 300.0, height: 0.0 }.into();
        assert!(err.to_string().contains("300x0"));
    }
}
