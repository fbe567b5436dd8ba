//! Command-line configuration: `--key=value` flags layered over defaults.

use asset::MeshKind;
use corelib::{Projection, Transform};
use platform::RunConfig;

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_switch(arg: &str, name: &str) -> Option<bool> {
    let flag = format!("--{name}");
    if arg == flag {
        return Some(true);
    }
    arg.strip_prefix(&flag)
        .and_then(|rest| rest.strip_prefix('='))
        .map(|val| {
            matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        })
}

fn parse_f32(name: &str, val: &str) -> Option<f32> {
    match val.parse::<f32>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::warn!("Ignoring --{}={}: not a finite number", name, val);
            None
        }
    }
}

fn parse_size(val: &str) -> Option<(u32, u32)> {
    let (sw, sh) = val.split_once('x').or_else(|| val.split_once('X'))?;
    match (sw.parse::<u32>(), sh.parse::<u32>()) {
        (Ok(w), Ok(h)) => Some((w, h)),
        _ => {
            log::warn!("Ignoring --size={}: expected WIDTHxHEIGHT", val);
            None
        }
    }
}

/// Build the run configuration from `args` (program name excluded).
pub fn parse_args<I, S>(args: I) -> RunConfig
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cfg = RunConfig::default();
    let mut projection = cfg.projection;

    for arg in args {
        let arg = arg.as_ref();
        if let Some(show) = parse_switch(arg, "show-fps") {
            cfg.show_fps = show;
            continue;
        }
        let Some((key, val)) = arg.strip_prefix("--").and_then(|a| a.split_once('=')) else {
            log::warn!("Ignoring unrecognized argument '{}'", arg);
            continue;
        };
        match key {
            "gpu-backend" => cfg.backends = parse_backend(val),
            "size" => {
                if let Some((w, h)) = parse_size(val) {
                    cfg.width = w;
                    cfg.height = h;
                }
            }
            "width" => match val.parse::<u32>() {
                Ok(w) => cfg.width = w,
                Err(_) => log::warn!("Ignoring --width={}", val),
            },
            "height" => match val.parse::<u32>() {
                Ok(h) => cfg.height = h,
                Err(_) => log::warn!("Ignoring --height={}", val),
            },
            "mesh" => match val.parse::<MeshKind>() {
                Ok(mesh) => cfg.mesh = mesh,
                Err(e) => log::warn!("{e}; keeping {}", cfg.mesh),
            },
            "shader" => match asset::shader::load_wgsl_from_path(val) {
                Ok(shader) => cfg.shader = shader,
                Err(e) => log::warn!("{e:#}; using built-in shader"),
            },
            "fov" => projection.fov_deg = parse_f32(key, val).unwrap_or(projection.fov_deg),
            "near" => projection.near_z = parse_f32(key, val).unwrap_or(projection.near_z),
            "far" => projection.far_z = parse_f32(key, val).unwrap_or(projection.far_z),
            "move-speed" => cfg.move_speed = parse_f32(key, val).unwrap_or(cfg.move_speed),
            "turn-speed" => cfg.turn_speed = parse_f32(key, val).unwrap_or(cfg.turn_speed),
            "spin" => {
                cfg.spin_deg_per_sec = parse_f32(key, val).unwrap_or(cfg.spin_deg_per_sec)
            }
            _ => log::warn!("Ignoring unknown option --{}", key),
        }
    }

    cfg.width = cfg.width.max(1);
    cfg.height = cfg.height.max(1);
    projection.aspect = cfg.width as f32 / cfg.height as f32;

    match Transform::new().try_add_perspective(&projection) {
        Ok(_) => cfg.projection = projection,
        Err(e) => {
            log::warn!("{e}; using the default projection");
            cfg.projection = Projection::default().with_aspect(projection.aspect);
        }
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_args() {
        let cfg = parse_args(Vec::<String>::new());
        assert_eq!((cfg.width, cfg.height), (1000, 800));
        assert_eq!(cfg.projection, Projection::default());
        assert_eq!(cfg.mesh, MeshKind::Cube);
        assert!(!cfg.show_fps);
        assert_eq!(cfg.backends, wgpu::Backends::all());
    }

    #[test]
    fn size_sets_aspect_ratio() {
        let cfg = parse_args(["--size=1920x1080"]);
        assert_eq!((cfg.width, cfg.height), (1920, 1080));
        assert!((cfg.projection.aspect - 16.0 / 9.0).abs() < 1e-6);

        let cfg = parse_args(["--width=640", "--height=0"]);
        assert_eq!((cfg.width, cfg.height), (640, 1));
    }

    #[test]
    fn camera_and_projection_flags() {
        let cfg = parse_args([
            "--fov=60",
            "--near=0.5",
            "--far=50",
            "--move-speed=0.25",
            "--turn-speed=3",
            "--mesh=pyramid",
            "--gpu-backend=vk",
            "--show-fps",
        ]);
        assert_eq!(cfg.projection.fov_deg, 60.0);
        assert_eq!(cfg.projection.near_z, 0.5);
        assert_eq!(cfg.projection.far_z, 50.0);
        assert_eq!(cfg.move_speed, 0.25);
        assert_eq!(cfg.turn_speed, 3.0);
        assert_eq!(cfg.mesh, MeshKind::Pyramid);
        assert_eq!(cfg.backends, wgpu::Backends::VULKAN);
        assert!(cfg.show_fps);
    }

    #[test]
    fn degenerate_projection_falls_back() {
        let cfg = parse_args(["--near=4", "--far=4"]);
        assert_eq!(cfg.projection.near_z, 1.0);
        assert_eq!(cfg.projection.far_z, 10.0);

        let cfg = parse_args(["--fov=0", "--size=800x800"]);
        assert_eq!(cfg.projection, Projection::default().with_aspect(1.0));
    }

    #[test]
    fn bad_values_are_ignored() {
        let cfg = parse_args(["--fov=wide", "--mesh=teapot", "--size=big", "--bogus=1", "stray"]);
        assert_eq!(cfg.projection.fov_deg, 90.0);
        assert_eq!(cfg.mesh, MeshKind::Cube);
        assert_eq!((cfg.width, cfg.height), (1000, 800));
    }

    #[test]
    fn show_fps_switch_values() {
        assert_eq!(parse_switch("--show-fps=off", "show-fps"), Some(false));
        assert_eq!(parse_switch("--show-fps=ON", "show-fps"), Some(true));
        assert_eq!(parse_switch("--show-fpsx", "show-fps"), None);
        assert_eq!(parse_switch("--mesh=cube", "show-fps"), None);
    }

    #[test]
    fn unreadable_shader_keeps_builtin() {
        let cfg = parse_args(["--shader=/no/such/shader.wgsl"]);
        assert_eq!(cfg.shader, RunConfig::default().shader);
    }
}
