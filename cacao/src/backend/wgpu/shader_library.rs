use fxhash::FxHashMap;

use crate::ComputeShader;

/// Compiled shader modules, keyed by the variant they implement.
///
/// Shaders are compiled by the host; a variant missing from the library fails
/// its dispatch with [`crate::Error::Failed`].
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    modules: Vec<wgpu::ShaderModule>,
    entries: FxHashMap<ComputeShader, (usize, String)>,
}

impl ShaderLibrary {
    /// Creates a library where a single module implements every variant,
    /// under [`ComputeShader::entry_point()`] names.
    pub fn from_module(module: wgpu::ShaderModule) -> Self {
        let entries = ComputeShader::ALL
            .into_iter()
            .map(|shader| (shader, (0, shader.entry_point().to_string())))
            .collect();

        Self {
            modules: vec![module],
            entries,
        }
    }

    /// Adds a module implementing a single variant; replaces the previous one,
    /// if any.
    pub fn with(
        mut self,
        shader: ComputeShader,
        module: wgpu::ShaderModule,
        entry_point: impl ToString,
    ) -> Self {
        self.modules.push(module);

        self.entries.insert(
            shader,
            (self.modules.len() - 1, entry_point.to_string()),
        );

        self
    }

    pub fn contains(&self, shader: ComputeShader) -> bool {
        self.entries.contains_key(&shader)
    }

    pub fn get(
        &self,
        shader: ComputeShader,
    ) -> Option<(&wgpu::ShaderModule, &str)> {
        let (module, entry_point) = self.entries.get(&shader)?;

        Some((&self.modules[*module], entry_point.as_str()))
    }
}
