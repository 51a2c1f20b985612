use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc,
    },
    time::Duration,
};

use anyhow::{bail, Context};
use naga::{
    valid::{Capabilities, ValidationFlags, Validator},
    Binding, ShaderStage, TypeInner,
};
use notify_debouncer_mini::{
    new_debouncer_opt,
    notify::{RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::PollType;

use crate::{
    config::ShaderConfig,
    rendering::vertex::{COLOR_LOCATION, POSITION_LOCATION},
};

pub const VERTEX_ENTRY_POINT: &str = "vs_main";
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Vertex inputs the pipeline feeds, by name and location.
const VERTEX_ATTRIBUTES: [(&str, u32); 2] = [
    ("position", POSITION_LOCATION),
    ("color", COLOR_LOCATION),
];

pub type PipelineFactory =
    Arc<dyn Fn(&wgpu::Device, &ProgramSources) -> wgpu::RenderPipeline + Send + Sync>;

#[derive(Debug, Clone)]
pub struct StageSource {
    pub path: PathBuf,
    pub code: String,
}

impl StageSource {
    fn read(folder: &Path, file: &str) -> anyhow::Result<Self> {
        let path = folder.join(file);
        let code = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read shader file {}", path.display()))?;
        Ok(Self { path, code })
    }

    pub fn label(&self) -> String {
        self.path.display().to_string()
    }
}

/// The vertex and fragment stage sources that make up one program.
#[derive(Debug, Clone)]
pub struct ProgramSources {
    pub vertex: StageSource,
    pub fragment: StageSource,
}

impl ProgramSources {
    pub fn load(config: &ShaderConfig) -> anyhow::Result<Self> {
        Ok(Self {
            vertex: StageSource::read(&config.folder, &config.vertex_file)?,
            fragment: StageSource::read(&config.folder, &config.fragment_file)?,
        })
    }

    /// Compiles both stages and checks that they fit the pipeline's vertex
    /// layout. Diagnostics are logged as they are found.
    pub fn compile(&self) -> anyhow::Result<()> {
        let vertex = compile_stage(
            &self.vertex.label(),
            &self.vertex.code,
            ShaderStage::Vertex,
            VERTEX_ENTRY_POINT,
        )?;
        compile_stage(
            &self.fragment.label(),
            &self.fragment.code,
            ShaderStage::Fragment,
            FRAGMENT_ENTRY_POINT,
        )?;

        link_vertex_inputs(&vertex, VERTEX_ENTRY_POINT).inspect_err(|err| {
            log::error!("Failed to link {}: {err:#}", self.vertex.label());
        })
    }
}

pub fn compile_stage(
    label: &str,
    code: &str,
    stage: ShaderStage,
    entry_point: &str,
) -> anyhow::Result<naga::Module> {
    let module = match naga::front::wgsl::parse_str(code) {
        Ok(module) => module,
        Err(err) => {
            log::error!("Failed to compile {label}:\n{}", err.emit_to_string(code));
            bail!("Shader compilation failed for {label}");
        }
    };

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::default());
    if let Err(err) = validator.validate(&module) {
        log::error!("Failed to validate {label}: {err}");
        bail!("Shader validation failed for {label}");
    }

    let has_entry_point = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == entry_point);

    if !has_entry_point {
        log::error!("{label} has no {stage:?} entry point named {entry_point}");
        bail!("Missing {stage:?} entry point {entry_point} in {label}");
    }

    log::debug!("Compiled {label}");
    Ok(module)
}

/// Location-bound inputs of an entry point, flattening struct arguments.
pub fn vertex_inputs(module: &naga::Module, entry_point: &str) -> Vec<(String, u32)> {
    let Some(ep) = module.entry_points.iter().find(|ep| ep.name == entry_point) else {
        return Vec::new();
    };

    let mut inputs = Vec::new();
    for argument in &ep.function.arguments {
        match (&argument.binding, &module.types[argument.ty].inner) {
            (Some(Binding::Location { location, .. }), _) => {
                if let Some(name) = &argument.name {
                    inputs.push((name.clone(), *location));
                }
            }
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let (Some(name), Some(Binding::Location { location, .. })) =
                        (&member.name, &member.binding)
                    {
                        inputs.push((name.clone(), *location));
                    }
                }
            }
            _ => {}
        }
    }

    inputs
}

fn link_vertex_inputs(module: &naga::Module, entry_point: &str) -> anyhow::Result<()> {
    let inputs = vertex_inputs(module, entry_point);

    for (name, expected) in VERTEX_ATTRIBUTES {
        match inputs.iter().find(|(input, _)| input == name) {
            Some((_, location)) if *location == expected => {}
            Some((_, location)) => {
                bail!("vertex input `{name}` is at location {location}, expected {expected}")
            }
            None => bail!("vertex stage has no input named `{name}`"),
        }
    }

    Ok(())
}

fn build_pipeline(
    device: &wgpu::Device,
    config: &ShaderConfig,
    factory: &PipelineFactory,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let sources = ProgramSources::load(config)?;
    sources.compile()?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, &sources);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        log::error!("Failed to link shader program: {error}");
        bail!(
            "Pipeline creation failed for {} + {}",
            sources.vertex.label(),
            sources.fragment.label()
        );
    }

    Ok(pipeline)
}

/// Owns the render pipeline built from the configured shader pair and
/// rebuilds it on a watcher thread whenever either file changes.
pub struct ShaderLoader {
    pipeline: wgpu::RenderPipeline,
    receiver: mpsc::Receiver<wgpu::RenderPipeline>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(
        device: &wgpu::Device,
        config: &ShaderConfig,
        factory: PipelineFactory,
    ) -> anyhow::Result<Self> {
        let pipeline = build_pipeline(device, config, &factory)?;
        log::info!(
            "Shader program ready ({} + {})",
            config.vertex_file,
            config.fragment_file
        );

        let (sender, receiver) = channel();

        let debouncer = if config.hot_reload {
            Some(watch_shaders(device.clone(), config.clone(), factory, sender)?)
        } else {
            None
        };

        Ok(Self {
            pipeline,
            receiver,
            _debouncer: debouncer,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Swaps in the most recent pipeline rebuilt by the watcher, if any.
    pub fn load_pending_shaders(&mut self) {
        while let Ok(pipeline) = self.receiver.try_recv() {
            log::info!("Shader program reloaded");
            self.pipeline = pipeline;
        }
    }
}

fn watch_shaders(
    device: wgpu::Device,
    config: ShaderConfig,
    factory: PipelineFactory,
    sender: mpsc::Sender<wgpu::RenderPipeline>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let folder = config
        .folder
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", config.folder.display()))?;

    let mut debouncer: Debouncer<RecommendedWatcher> = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                let touched = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && (event.path.ends_with(&config.vertex_file)
                            || event.path.ends_with(&config.fragment_file))
                });
                if !touched {
                    return;
                }

                match build_pipeline(&device, &config, &factory) {
                    Ok(pipeline) => {
                        if sender.send(pipeline).is_err() {
                            log::debug!("Shader loader dropped, discarding reloaded pipeline");
                        }
                    }
                    Err(e) => log::warn!("Keeping previous shader program: {e:#}"),
                }
            }
            Err(e) => log::warn!("Error watching shader folder: {e:?}"),
        },
    )
    .context("Failed to create shader watcher")?;

    debouncer
        .watcher()
        .watch(&folder, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", folder.display()))?;

    log::info!("Watching {} for shader changes", folder.display());
    Ok(debouncer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
struct Transform {
    mvp: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> transform: Transform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform.mvp * vec4<f32>(in.position, 1.0);
    out.color = in.color.wzyx;
    return out;
}
"#;

    const FRAGMENT: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

    fn sources(vertex: &str, fragment: &str) -> ProgramSources {
        ProgramSources {
            vertex: StageSource {
                path: PathBuf::from("test.vert.wgsl"),
                code: vertex.to_string(),
            },
            fragment: StageSource {
                path: PathBuf::from("test.frag.wgsl"),
                code: fragment.to_string(),
            },
        }
    }

    #[test]
    fn valid_program_compiles_and_links() {
        sources(VERTEX, FRAGMENT).compile().unwrap();
    }

    #[test]
    fn shipped_shaders_compile_and_link() {
        let config = crate::config::AppConfig::default().shaders;
        let folder = Path::new(env!("CARGO_MANIFEST_DIR")).join(&config.folder);
        let config = ShaderConfig { folder, ..config };
        ProgramSources::load(&config).unwrap().compile().unwrap();
    }

    #[test]
    fn struct_inputs_are_flattened() {
        let module = compile_stage("v", VERTEX, ShaderStage::Vertex, VERTEX_ENTRY_POINT).unwrap();
        assert_eq!(
            vertex_inputs(&module, VERTEX_ENTRY_POINT),
            vec![("position".to_string(), 0), ("color".to_string(), 1)]
        );
    }

    #[test]
    fn syntax_errors_fail_compilation() {
        let broken = VERTEX.replace("return out;", "return out");
        let err = sources(&broken, FRAGMENT).compile().unwrap_err();
        assert!(err.to_string().contains("compilation failed"), "{err:#}");
    }

    #[test]
    fn missing_entry_point_fails_compilation() {
        let renamed = FRAGMENT.replace("fs_main", "main");
        let err = sources(VERTEX, &renamed).compile().unwrap_err();
        assert!(err.to_string().contains("entry point"), "{err:#}");
    }

    #[test]
    fn attribute_locations_are_checked() {
        let swapped = VERTEX
            .replace("@location(0) position", "@location(2) position")
            .replace("@location(1) color", "@location(0) color");
        let err = sources(&swapped, FRAGMENT).compile().unwrap_err();
        assert!(err.to_string().contains("`position`"), "{err:#}");

        let renamed = VERTEX.replace("in.color", "in.tint").replace(
            "@location(1) color: vec4<f32>,\n}",
            "@location(1) tint: vec4<f32>,\n}",
        );
        let err = sources(&renamed, FRAGMENT).compile().unwrap_err();
        assert!(err.to_string().contains("`color`"), "{err:#}");
    }

    #[test]
    fn loose_arguments_are_collected() {
        let code = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>, @builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0) + color * 0.0;
}
"#;
        let module = compile_stage("v", code, ShaderStage::Vertex, VERTEX_ENTRY_POINT).unwrap();
        assert_eq!(
            vertex_inputs(&module, VERTEX_ENTRY_POINT),
            vec![("position".to_string(), 0), ("color".to_string(), 1)]
        );
    }
}
