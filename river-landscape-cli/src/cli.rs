use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use river_landscape_core::Scalar;
use river_landscape_image::settings::ImageHeightSource;

#[derive(Clone, Debug, Parser)]
#[command(name = "river-landscape", version, author, about)]
#[command(help_template = "\
{name} {version}
{about}
{author}

{usage-heading}
{tab}{usage}

{all-args}
")]
pub struct CliArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl CliArgs {
    pub fn verbose(&self) -> bool {
        match &self.action {
            Action::Generate { verbose, .. }
            | Action::Mesh { verbose, .. }
            | Action::Noise { verbose, .. } => *verbose,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, strum::Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum HeightSourceSelection {
    #[default]
    Luma,
    LumaAlpha,
    Red,
    Green,
    Blue,
    Alpha,
}
impl From<HeightSourceSelection> for ImageHeightSource {
    fn from(value: HeightSourceSelection) -> Self {
        use HeightSourceSelection as S; // source
        use ImageHeightSource as T; // target
        match value {
            S::Luma => T::Luma,
            S::LumaAlpha => T::LumaAlpha,
            S::Red => T::Red,
            S::Green => T::Green,
            S::Blue => T::Blue,
            S::Alpha => T::Alpha,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Action {
    /// Generate river landscape height map and its mesh
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Generate {
        /// Landscape config file path (JSON or YAML)
        #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        config: PathBuf,

        /// Override river seed
        #[arg(long, value_name = "INTEGER")]
        seed: Option<u64>,

        /// Override height map output file path
        #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        output: Option<PathBuf>,

        /// Override mesh output file path
        #[arg(long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        mesh: Option<PathBuf>,

        #[command(flatten)]
        format: Format,

        /// Display settings used and progress
        #[arg(long)]
        verbose: bool,
    },

    /// Triangulate height map image into plane mesh
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Mesh {
        /// Input image path
        #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        input: PathBuf,

        /// Output mesh path
        #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        output: PathBuf,

        /// Use an alternate channel as height source
        #[arg(long, value_name = "CHANNEL", default_value_t)]
        height_source: HeightSourceSelection,

        /// Image scale
        #[arg(long, value_name = "INTEGER", default_value_t = 1)]
        scale: usize,

        /// Number of plane vertices along X axis
        #[arg(long, value_name = "INTEGER", default_value_t = 256)]
        width: usize,

        /// Number of plane vertices along Y axis
        #[arg(long, value_name = "INTEGER", default_value_t = 256)]
        height: usize,

        /// Height scale applied to mesh vertices
        #[arg(long, value_name = "NUMBER", default_value_t = 0.1)]
        delta: Scalar,

        #[command(flatten)]
        format: Format,

        /// Display settings used
        #[arg(long)]
        verbose: bool,
    },

    /// Produce pure noise height map image
    #[command(help_template = "\
{name}
{about}

{usage-heading}
{tab}{usage}

{all-args}
")]
    Noise {
        /// Output image path
        #[arg(short, long, value_name = "PATH", value_hint(ValueHint::FilePath))]
        output: PathBuf,

        /// Image size (width and height)
        #[arg(long, value_name = "INTEGER", default_value_t = 1024)]
        size: usize,

        /// Fractal noise weight
        #[arg(long, value_name = "NUMBER", default_value_t = 0.5)]
        perlin_weight: Scalar,

        /// Fractal noise frequency scale
        #[arg(long, value_name = "NUMBER", default_value_t = 5.0)]
        perlin_scale: Scalar,

        /// Fractal noise octaves
        #[arg(long, value_name = "INTEGER", default_value_t = 6)]
        perlin_octaves: usize,

        /// Fractal noise seed
        #[arg(long, value_name = "INTEGER", default_value_t = 0)]
        seed: u32,

        /// Cellular noise weight
        #[arg(long, value_name = "NUMBER", default_value_t = 0.25)]
        voronoi_weight: Scalar,

        /// Cellular noise frequency scale
        #[arg(long, value_name = "NUMBER", default_value_t = 5.0)]
        voronoi_scale: Scalar,

        /// Display noise value range
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Clone, Debug, Default, Args)]
#[group(multiple = false)]
pub struct Format {
    /// Produce JSON mesh
    #[arg(long)]
    pub json: bool,

    /// Produce pretty JSON mesh
    #[arg(long)]
    pub json_pretty: bool,

    /// Produce YAML mesh
    #[arg(long)]
    pub yaml: bool,

    /// Produce OBJ mesh (default)
    #[arg(long)]
    pub obj: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    Json,
    JsonPretty,
    Yaml,
    Obj,
}

impl FormatKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json | Self::JsonPretty => "json",
            Self::Yaml => "yaml",
            Self::Obj => "obj",
        }
    }
}

impl Format {
    pub fn kind(&self) -> FormatKind {
        if self.json {
            FormatKind::Json
        } else if self.json_pretty {
            FormatKind::JsonPretty
        } else if self.yaml {
            FormatKind::Yaml
        } else {
            FormatKind::Obj
        }
    }
}
