//! WGSL shader sources loaded from disk.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: String,
    pub code: String,
}

impl ShaderSource {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    /// Checks that both pipeline entry points are declared.
    pub fn validate(&self) -> Result<()> {
        for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
            if !declares_fn(&self.code, entry) {
                bail!("Shader '{}' has no entry point '{}'", self.label, entry);
            }
        }
        Ok(())
    }
}

fn declares_fn(code: &str, name: &str) -> bool {
    code.lines()
        .map(|l| l.split("//").next().unwrap_or_default())
        .any(|l| {
            l.split_whitespace()
                .collect::<Vec<_>>()
                .windows(2)
                .any(|w| w[0] == "fn" && w[1].split('(').next() == Some(name))
        })
}

/// Load and validate a WGSL file.
pub fn load_wgsl_from_path(path: impl AsRef<Path>) -> Result<ShaderSource> {
    let path = path.as_ref();
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read shader file: {}", path.display()))?;
    let shader = ShaderSource::new(path.display().to_string(), code);
    shader.validate()?;
    log::info!("Loaded shader {} ({} bytes)", shader.label, shader.code.len());
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"
        @vertex
        fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(pos, 1.0);
        }
        @fragment
        fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
    "#;

    #[test]
    fn accepts_both_entry_points() {
        assert!(ShaderSource::new("ok", SRC).validate().is_ok());
    }

    #[test]
    fn rejects_missing_fragment_entry() {
        let src = SRC.replace("fs_main", "frag");
        let err = ShaderSource::new("bad", src).validate().unwrap_err();
        assert!(err.to_string().contains("fs_main"));
    }

    #[test]
    fn commented_out_entry_does_not_count() {
        let src = SRC.replace("fn fs_main", "// fn fs_main");
        assert!(ShaderSource::new("commented", src).validate().is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_wgsl_from_path("/definitely/not/here.wgsl").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.wgsl"));
    }

    #[test]
    fn loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("asset-shader-{}.wgsl", std::process::id()));
        fs::write(&path, SRC).unwrap();
        let shader = load_wgsl_from_path(&path).unwrap();
        assert_eq!(shader.code, SRC);
        fs::remove_file(&path).unwrap();
    }
}
