use crate::device::{GraphicsDevice, ProgramHandle, ShaderStage};
use crate::error::{Error, Result};
use crate::resources::ResourceLoader;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ProgramState {
    Uncompiled,
    Compiled { program: ProgramHandle, in_use: bool },
}

/// Vertex + fragment shader pair and the program linked from them.
///
/// Sources are loaded when the value is constructed; GPU objects exist only after
/// [`compile`](Self::compile). Binding is tracked so repeated [`bind`](Self::bind)
/// calls reach the device once.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex_name: String,
    fragment_name: String,
    vertex_source: String,
    fragment_source: String,
    state: ProgramState,
}

impl ShaderProgram {
    /// Loads both stage sources through `loader`.
    pub fn load(loader: &dyn ResourceLoader, vertex_name: &str, fragment_name: &str) -> Result<Self> {
        let vertex_source = loader.load_text(vertex_name)?;
        let fragment_source = loader.load_text(fragment_name)?;

        Ok(Self::from_sources(vertex_name, vertex_source, fragment_name, fragment_source))
    }

    /// Builds a program from sources already in memory. Names are used in diagnostics.
    pub fn from_sources(
        vertex_name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_name: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            vertex_name: vertex_name.into(),
            fragment_name: fragment_name.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            state: ProgramState::Uncompiled,
        }
    }

    /// Compiles both stages and links them.
    ///
    /// Stage objects are deleted before returning, whether or not linking
    /// succeeded. On failure the device log is written at error level and the
    /// program stays uncompiled. Compiling an already compiled program is a no-op.
    pub fn compile(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.is_compiled() {
            return Ok(());
        }

        let vertex = device
            .create_shader(ShaderStage::Vertex, &self.vertex_source)
            .map_err(|source| {
                log::error!("'{}': vertex shader compilation failed\n{source}", self.vertex_name);
                Error::ShaderCompile {
                    stage: ShaderStage::Vertex,
                    name: self.vertex_name.clone(),
                    source,
                }
            })?;

        let fragment = match device.create_shader(ShaderStage::Fragment, &self.fragment_source) {
            Ok(f) => f,
            Err(source) => {
                device.delete_shader(vertex);
                log::error!("'{}': fragment shader compilation failed\n{source}", self.fragment_name);
                return Err(Error::ShaderCompile {
                    stage: ShaderStage::Fragment,
                    name: self.fragment_name.clone(),
                    source,
                });
            }
        };

        let linked = device.link_program(vertex, fragment);

        // Stages are not needed once linked (or once linking has failed).
        device.delete_shader(vertex);
        device.delete_shader(fragment);

        let program = linked.map_err(|source| {
            log::error!(
                "'{}' or '{}': linking of shaders failed\n{source}",
                self.vertex_name,
                self.fragment_name
            );
            Error::ShaderLink {
                vertex: self.vertex_name.clone(),
                fragment: self.fragment_name.clone(),
                source,
            }
        })?;

        log::debug!(
            "compiled program {} from '{}' + '{}'",
            program.raw(),
            self.vertex_name,
            self.fragment_name
        );
        self.state = ProgramState::Compiled { program, in_use: false };
        Ok(())
    }

    /// Makes this the device's active program. Does nothing if already bound.
    pub fn bind(&mut self, device: &mut dyn GraphicsDevice) {
        match &mut self.state {
            ProgramState::Compiled { program, in_use } => {
                if !*in_use {
                    device.use_program(Some(*program));
                    *in_use = true;
                }
            }
            ProgramState::Uncompiled => {
                log::warn!("'{}': bind before compile ignored", self.vertex_name);
            }
        }
    }

    /// Clears the device's active program.
    pub fn detach(&mut self, device: &mut dyn GraphicsDevice) {
        device.use_program(None);
        if let ProgramState::Compiled { in_use, .. } = &mut self.state {
            *in_use = false;
        }
    }

    /// Deletes the program object. The value returns to the uncompiled state.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let ProgramState::Compiled { program, in_use } = self.state {
            if in_use {
                device.use_program(None);
            }
            device.delete_program(program);
            self.state = ProgramState::Uncompiled;
        }
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.state, ProgramState::Compiled { .. })
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, ProgramState::Compiled { in_use: true, .. })
    }

    pub fn handle(&self) -> Option<ProgramHandle> {
        match self.state {
            ProgramState::Compiled { program, .. } => Some(program),
            ProgramState::Uncompiled => None,
        }
    }

    pub fn vertex_name(&self) -> &str {
        &self.vertex_name
    }

    pub fn fragment_name(&self) -> &str {
        &self.fragment_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingDevice};
    use crate::resources::{EmbeddedResources, ResourceError};

    fn program() -> ShaderProgram {
        ShaderProgram::from_sources("test.vert", "// vs", "test.frag", "// fs")
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn load_reads_both_sources() {
        let res = EmbeddedResources::new().with("a.vert", "vs").with("a.frag", "fs");
        let p = ShaderProgram::load(&res, "a.vert", "a.frag").unwrap();
        assert_eq!(p.vertex_name(), "a.vert");
        assert_eq!(p.fragment_name(), "a.frag");
        assert!(!p.is_compiled());
    }

    #[test]
    fn load_fails_on_missing_source() {
        let res = EmbeddedResources::new().with("a.vert", "vs");
        let err = ShaderProgram::load(&res, "a.vert", "missing.frag").unwrap_err();
        assert!(matches!(
            err,
            Error::Resource(ResourceError::NotFound { ref name }) if name == "missing.frag"
        ));
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compile_links_and_releases_stages() {
        let mut dev = RecordingDevice::new();
        let mut p = program();
        p.compile(&mut dev).unwrap();

        assert!(p.is_compiled());
        assert_eq!(dev.count(|c| matches!(c, Call::CreateShader(..))), 2);
        assert_eq!(dev.count(|c| matches!(c, Call::LinkProgram(_))), 1);
        assert_eq!(dev.count(|c| matches!(c, Call::DeleteShader(_))), 2);
        // Only the program object survives.
        assert_eq!(dev.live_objects(), 1);
    }

    #[test]
    fn vertex_compile_failure_is_reported() {
        let mut dev = RecordingDevice::new();
        dev.fail_compile = Some(ShaderStage::Vertex);
        let mut p = program();

        let err = p.compile(&mut dev).unwrap_err();
        assert!(matches!(err, Error::ShaderCompile { stage: ShaderStage::Vertex, ref name, .. } if name == "test.vert"));
        assert!(!p.is_compiled());
        assert_eq!(dev.live_objects(), 0);
    }

    #[test]
    fn fragment_compile_failure_releases_vertex_stage() {
        let mut dev = RecordingDevice::new();
        dev.fail_compile = Some(ShaderStage::Fragment);
        let mut p = program();

        let err = p.compile(&mut dev).unwrap_err();
        assert!(matches!(err, Error::ShaderCompile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(dev.live_objects(), 0);
        assert_eq!(dev.count(|c| matches!(c, Call::LinkProgram(_))), 0);
    }

    #[test]
    fn link_failure_is_reported_and_stages_released() {
        let mut dev = RecordingDevice::new();
        dev.fail_link = true;
        let mut p = program();

        let err = p.compile(&mut dev).unwrap_err();
        assert!(matches!(err, Error::ShaderLink { .. }));
        assert!(!p.is_compiled());
        assert_eq!(dev.live_objects(), 0);
    }

    // ── bind / detach ─────────────────────────────────────────────────────

    #[test]
    fn bind_is_idempotent() {
        let mut dev = RecordingDevice::new();
        let mut p = program();
        p.compile(&mut dev).unwrap();

        p.bind(&mut dev);
        p.bind(&mut dev);

        assert_eq!(dev.count(|c| matches!(c, Call::UseProgram(Some(_)))), 1);
        assert_eq!(dev.current_program, p.handle());
        assert!(p.is_bound());
    }

    #[test]
    fn detach_unbinds_and_allows_rebind() {
        let mut dev = RecordingDevice::new();
        let mut p = program();
        p.compile(&mut dev).unwrap();

        p.bind(&mut dev);
        p.detach(&mut dev);
        assert_eq!(dev.current_program, None);
        assert!(!p.is_bound());

        p.bind(&mut dev);
        assert_eq!(dev.count(|c| matches!(c, Call::UseProgram(Some(_)))), 2);
    }

    #[test]
    fn release_deletes_program() {
        let mut dev = RecordingDevice::new();
        let mut p = program();
        p.compile(&mut dev).unwrap();
        p.bind(&mut dev);

        p.release(&mut dev);
        assert!(!p.is_compiled());
        assert_eq!(dev.current_program, None);
        assert_eq!(dev.live_objects(), 0);
    }
}
