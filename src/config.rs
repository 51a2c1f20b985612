use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderConfig {
    pub folder: PathBuf,
    pub vertex_file: String,
    pub fragment_file: String,
    pub hot_reload: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub shaders: ShaderConfig,
    pub vsync: bool,
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                title: "Pyramid Scene".to_string(),
                width: 640,
                height: 640,
            },
            shaders: ShaderConfig {
                folder: PathBuf::from("assets/shaders"),
                vertex_file: "pyramid.vert.wgsl".to_string(),
                fragment_file: "pyramid.frag.wgsl".to_string(),
                hot_reload: true,
            },
            vsync: true,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(std::env::vars());
        config
    }

    /// Applies `PYRAMID_*` overrides. Unknown keys are ignored, invalid
    /// values are logged and skipped.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "PYRAMID_SHADER_DIR" => self.shaders.folder = PathBuf::from(value),
                "PYRAMID_VSYNC" => {
                    if let Some(flag) = parse_flag(key, value) {
                        self.vsync = flag;
                    }
                }
                "PYRAMID_HOT_RELOAD" => {
                    if let Some(flag) = parse_flag(key, value) {
                        self.shaders.hot_reload = flag;
                    }
                }
                "PYRAMID_WINDOW_SIZE" => match parse_size(value) {
                    Some((width, height)) => {
                        self.window.width = width;
                        self.window.height = height;
                    }
                    None => log::warn!("Ignoring {key}={value:?}: expected WIDTHxHEIGHT"),
                },
                _ => {}
            }
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            log::warn!("Ignoring {key}={value:?}: expected a boolean");
            None
        }
    }
}

fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (width, height) = value.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse().ok().filter(|w| *w > 0)?;
    let height = height.trim().parse().ok().filter(|h| *h > 0)?;
    Some((width, height))
}
