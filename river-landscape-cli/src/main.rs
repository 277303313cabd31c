mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Action, CliArgs, FormatKind};
use obj_exporter::{Geometry, ObjSet, Object, Primitive, Shape, TVertex, Vertex};
use river_landscape_core::prelude::*;
use river_landscape_image::{load_height_field, save_height_field, settings::HeightImageSettings};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let filter = if args.verbose() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    run_app(args)
}

fn run_app(args: CliArgs) -> anyhow::Result<()> {
    match args.action {
        Action::Generate {
            config,
            seed,
            output,
            mesh,
            format,
            verbose,
        } => {
            let mut settings = load_settings(&config)?;
            if let Some(seed) = seed {
                settings.river.seed = seed;
            }
            if let Some(output) = output {
                settings.output_file = output.to_string_lossy().into_owned();
            }
            if let Some(mesh) = mesh {
                settings.mesh_file = Some(mesh.to_string_lossy().into_owned());
            }
            settings.validate().context("Invalid landscape settings")?;
            if verbose {
                println!("{:#?}", settings);
            }
            let format = format.kind();
            let image_path = settings.image_path();
            let mesh_path = match (&settings.mesh_file, format) {
                (None, FormatKind::Obj) | (Some(_), _) => settings.mesh_path(),
                (None, format) => image_path.with_extension(format.extension()),
            };
            let plane = settings.plane.clone();
            let landscape = if verbose {
                generate_landscape_tracked(settings, |current, limit, percentage| {
                    println!(
                        "Progress: {}% ({} / {})",
                        (percentage * 100.0).max(0.0).min(100.0),
                        current,
                        limit
                    );
                })
            } else {
                generate_landscape(settings)
            }
            .context("Cannot generate landscape")?;
            save_height_field(&landscape, &image_path)
                .with_context(|| format!("Cannot save height map: {:?}", image_path))?;
            let mut mesh = triangulate_plane(&landscape, plane.width, plane.height)
                .context("Cannot triangulate landscape")?;
            mesh.scale_heights(plane.delta);
            write_mesh(&mesh, &mesh_path, format)?;
            log::info!(
                "Landscape saved to {:?}, mesh saved to {:?}",
                image_path,
                mesh_path
            );
        }
        Action::Mesh {
            input,
            output,
            height_source,
            scale,
            width,
            height,
            delta,
            format,
            verbose,
        } => {
            let settings = HeightImageSettings {
                height_source: height_source.into(),
                scale,
            };
            if verbose {
                println!("{:#?}", settings);
            }
            let field = load_height_field(&input, &settings)
                .with_context(|| format!("Cannot load height map: {:?}", input))?;
            let mut mesh =
                triangulate_plane(&field, width, height).context("Cannot triangulate height map")?;
            mesh.scale_heights(delta);
            write_mesh(&mesh, &output, format.kind())?;
        }
        Action::Noise {
            output,
            size,
            perlin_weight,
            perlin_scale,
            perlin_octaves,
            seed,
            voronoi_weight,
            voronoi_scale,
            verbose,
        } => {
            let field = noise_field(
                size,
                perlin_weight,
                perlin_scale,
                perlin_octaves,
                seed,
                voronoi_weight,
                voronoi_scale,
            )?;
            if verbose {
                println!("Noise range: {} - {}", field.min(), field.max());
            }
            save_height_field(&field, &output)
                .with_context(|| format!("Cannot save noise image: {:?}", output))?;
        }
    }
    Ok(())
}

fn load_settings(path: &Path) -> anyhow::Result<LandscapeSettings> {
    let contents = read_to_string(path)
        .with_context(|| format!("Cannot read config file: {:?}", path))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let settings = if yaml {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Cannot parse YAML config: {:?}", path))?
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("Cannot parse JSON config: {:?}", path))?
    };
    Ok(settings)
}

fn noise_field(
    size: usize,
    perlin_weight: Scalar,
    perlin_scale: Scalar,
    perlin_octaves: usize,
    seed: u32,
    voronoi_weight: Scalar,
    voronoi_scale: Scalar,
) -> anyhow::Result<HeightField> {
    let mut field = HeightField::new(size, size).context("Invalid noise image size")?;
    add_perlin(&mut field, perlin_weight, perlin_scale, perlin_octaves, seed);
    add_voronoi(&mut field, voronoi_weight, voronoi_scale);
    field.quantize();
    Ok(field)
}

fn write_mesh(mesh: &PlaneMesh, path: &Path, format: FormatKind) -> anyhow::Result<()> {
    let contents = match format {
        FormatKind::Json => serde_json::to_string(mesh).context("Cannot serialize JSON mesh")?,
        FormatKind::JsonPretty => {
            serde_json::to_string_pretty(mesh).context("Cannot serialize pretty JSON mesh")?
        }
        FormatKind::Yaml => serde_yaml::to_string(mesh).context("Cannot serialize YAML mesh")?,
        FormatKind::Obj => {
            let objects = ObjSet {
                material_library: None,
                objects: vec![mesh_object(mesh)],
            };
            return obj_exporter::export_to_file(&objects, path)
                .with_context(|| format!("Cannot save mesh file: {:?}", path));
        }
    };
    write(path, contents).with_context(|| format!("Cannot save mesh file: {:?}", path))
}

fn mesh_object(mesh: &PlaneMesh) -> Object {
    let vertices = (0..mesh.num_vertices())
        .filter_map(|i| mesh.vertex(i))
        .collect::<Vec<_>>();
    Object {
        name: "RiverLandscape".to_owned(),
        vertices: vertices
            .iter()
            .map(|[u, v, h]| Vertex {
                x: *u as _,
                y: *v as _,
                z: *h as _,
            })
            .collect::<Vec<_>>(),
        tex_vertices: vertices
            .iter()
            .map(|[u, v, _]| TVertex {
                u: *u as _,
                v: *v as _,
                w: 0.0,
            })
            .collect::<Vec<_>>(),
        normals: vec![],
        geometry: vec![Geometry {
            material_name: None,
            shapes: (0..mesh.num_triangles())
                .filter_map(|i| mesh.triangle(i))
                .map(|[a, b, c]| Shape {
                    primitive: Primitive::Triangle(
                        (a, Some(a), None),
                        (b, Some(b), None),
                        (c, Some(c), None),
                    ),
                    groups: vec![],
                    smoothing_groups: vec![],
                })
                .collect::<Vec<_>>(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_parse_generate() {
        let args = CliArgs::try_parse_from([
            "river-landscape",
            "generate",
            "-c",
            "landscape.yaml",
            "--seed",
            "42",
            "--json",
            "--verbose",
        ])
        .unwrap();
        assert!(args.verbose());
        match args.action {
            Action::Generate {
                config,
                seed,
                output,
                format,
                ..
            } => {
                assert_eq!(config, PathBuf::from("landscape.yaml"));
                assert_eq!(seed, Some(42));
                assert_eq!(output, None);
                assert_eq!(format.kind(), FormatKind::Json);
            }
            _ => panic!("expected generate action"),
        }
    }

    #[test]
    fn test_parse_default_format_and_conflicts() {
        let args =
            CliArgs::try_parse_from(["river-landscape", "generate", "-c", "a.json"]).unwrap();
        match args.action {
            Action::Generate { format, .. } => assert_eq!(format.kind(), FormatKind::Obj),
            _ => panic!("expected generate action"),
        }
        assert!(CliArgs::try_parse_from([
            "river-landscape",
            "generate",
            "-c",
            "a.json",
            "--json",
            "--yaml",
        ])
        .is_err());
        assert!(CliArgs::try_parse_from(["river-landscape", "generate"]).is_err());
    }

    #[test]
    fn test_parse_mesh() {
        let args = CliArgs::try_parse_from([
            "river-landscape",
            "mesh",
            "-i",
            "in.png",
            "-o",
            "out.yaml",
            "--width",
            "16",
            "--height",
            "8",
            "--height-source",
            "luma-alpha",
            "--yaml",
        ])
        .unwrap();
        match args.action {
            Action::Mesh {
                width,
                height,
                delta,
                height_source,
                format,
                ..
            } => {
                assert_eq!((width, height), (16, 8));
                assert_eq!(delta, 0.1);
                assert_eq!(
                    river_landscape_image::settings::ImageHeightSource::from(height_source),
                    river_landscape_image::settings::ImageHeightSource::LumaAlpha
                );
                assert_eq!(format.kind(), FormatKind::Yaml);
            }
            _ => panic!("expected mesh action"),
        }
    }

    const JSON_CONFIG: &str = r#"{
        "size": [128, 64],
        "perlin": {"weight": 0.5, "scale": 5.0, "octaves": 6},
        "voronoi": {"weight": 0.25, "scale": 5.0},
        "river": {"nodes": 4, "samples": 30, "thickness": 100.0, "seed": 7},
        "gauss": {"ksx": 10, "ksy": 10, "sigma": 5.0},
        "plane": {"delta": 0.1, "width": 256, "height": 256},
        "output_file": "Out.PNG"
    }"#;

    const YAML_CONFIG: &str = "\
width: 64
height: 64
perlin: { weight: 0.5, scale: 5.0, octaves: 4 }
voronoi: { weight: 0.25, scale: 5.0 }
river: { nodes: 10, samples: 30, thickness: 8.0, seed: 0 }
gauss: { ksx: 2, ksy: 2, sigma: 1.0 }
plane: { delta: 0.1, width: 8, height: 8 }
output_file: landscape.png
";

    fn load_str(name: &str, contents: &str) -> anyhow::Result<LandscapeSettings> {
        let path = output_path(name);
        write(&path, contents).unwrap();
        let result = load_settings(&path);
        let _ = std::fs::remove_file(&path);
        result
    }

    #[test]
    fn test_load_settings() {
        let settings = load_str("river-landscape-test-config.json", JSON_CONFIG).unwrap();
        assert_eq!(settings.dimensions().unwrap(), (128, 64));
        assert_eq!(settings.river.nodes, 4);
        assert_eq!(settings.river.seed, 7);
        assert_eq!(settings.mesh_file, None);
        assert_eq!(settings.image_path(), PathBuf::from("out.png"));
        assert!(settings.validate().is_ok());

        let settings = load_str("river-landscape-test-config.yaml", YAML_CONFIG).unwrap();
        assert_eq!(settings.dimensions().unwrap(), (64, 64));
        assert_eq!(settings.gauss.sigma, 1.0);
        assert_eq!(settings.perlin.octaves, 4);

        assert!(load_settings(Path::new("does-not-exist.json")).is_err());
    }

    #[test]
    fn test_load_settings_rejects_incomplete_config() {
        assert!(load_str("river-landscape-test-empty.json", "{}").is_err());
        assert!(load_str("river-landscape-test-size-only.json", r#"{"size": 64}"#).is_err());

        let without_river = YAML_CONFIG
            .lines()
            .filter(|l| !l.starts_with("river:"))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(load_str("river-landscape-test-no-river.yaml", &without_river).is_err());

        let without_seed = JSON_CONFIG.replace(r#", "seed": 7"#, "");
        assert!(!without_seed.contains("seed"));
        assert!(load_str("river-landscape-test-no-seed.json", &without_seed).is_err());

        let without_output = JSON_CONFIG.replace(",\n        \"output_file\": \"Out.PNG\"", "");
        assert!(!without_output.contains("output_file"));
        assert!(load_str("river-landscape-test-no-output.json", &without_output).is_err());

        let unknown = JSON_CONFIG.replace("\"river\"", "\"rivers\"");
        assert!(load_str("river-landscape-test-unknown.json", &unknown).is_err());

        let without_size = YAML_CONFIG.replace("height: 64\n", "");
        let settings = load_str("river-landscape-test-no-height.yaml", &without_size).unwrap();
        assert_eq!(settings.validate(), Err(SettingsError::IncompleteSize));
    }

    #[test]
    fn test_mesh_object() {
        let field = HeightField::from_data(2, 2, vec![0.0, 1.0, 0.5, 0.25]).unwrap();
        let mesh = triangulate_plane(&field, 2, 2).unwrap();
        let object = mesh_object(&mesh);
        assert_eq!(object.name, "RiverLandscape");
        assert_eq!(object.vertices.len(), 4);
        assert_eq!(object.tex_vertices.len(), 4);
        assert_eq!(object.geometry[0].shapes.len(), 2);
        assert_eq!(object.vertices[1].x, 1.0);
        assert_eq!(object.vertices[1].z, 1.0);
        assert_eq!(object.tex_vertices[2].v, 1.0);
    }

    #[test]
    fn test_write_mesh() {
        let field = HeightField::from_data(2, 2, vec![0.0, 1.0, 0.5, 0.25]).unwrap();
        let mesh = triangulate_plane(&field, 2, 2).unwrap();

        let obj = output_path("river-landscape-test-mesh.obj");
        write_mesh(&mesh, &obj, FormatKind::Obj).unwrap();
        let contents = read_to_string(&obj).unwrap();
        assert_eq!(contents.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(contents.lines().filter(|l| l.starts_with("f ")).count(), 2);
        assert!(contents.lines().any(|l| l.starts_with("f 1/1 ")));
        let _ = std::fs::remove_file(&obj);

        let json = output_path("river-landscape-test-mesh.json");
        write_mesh(&mesh, &json, FormatKind::JsonPretty).unwrap();
        let loaded: PlaneMesh = serde_json::from_str(&read_to_string(&json).unwrap()).unwrap();
        assert_eq!(loaded, mesh);
        let _ = std::fs::remove_file(&json);
    }

    #[test]
    fn test_noise_field() {
        let field = noise_field(32, 0.5, 5.0, 4, 3, 0.25, 5.0).unwrap();
        assert_eq!((field.width(), field.height()), (32, 32));
        assert!(!field.is_dirty());
        assert!(noise_field(0, 0.5, 5.0, 4, 3, 0.25, 5.0).is_err());
    }

    #[test]
    fn test_generate_app() {
        let config = output_path("river-landscape-test-app.yaml");
        let image = output_path("river-landscape-test-app.png");
        write(&config, YAML_CONFIG).unwrap();
        let args = CliArgs::try_parse_from([
            "river-landscape",
            "generate",
            "-c",
            config.to_str().unwrap(),
            "-o",
            image.to_str().unwrap(),
            "--json",
        ])
        .unwrap();
        run_app(args).unwrap();
        let mesh_path = PathBuf::from(image.to_string_lossy().to_lowercase()).with_extension("json");
        let mesh: PlaneMesh = serde_json::from_str(&read_to_string(&mesh_path).unwrap()).unwrap();
        assert_eq!(mesh.num_vertices(), 64);
        assert!(mesh.vertices.iter().skip(2).step_by(3).all(|h| *h <= 0.1 + 1.0e-5));
        let _ = std::fs::remove_file(&config);
        let _ = std::fs::remove_file(image.to_string_lossy().to_lowercase());
        let _ = std::fs::remove_file(&mesh_path);
    }
}
