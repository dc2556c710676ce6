use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use log::{info, warn};

use screenmark::{
    Bitmap, Canvas, Color, Config, Presenter, ScreenLocation, ScreenRegion, StyleConfigurator,
    backend,
    config::BackendKind,
    util::parse_color,
};

#[derive(Parser, Debug)]
#[command(name = "screenmark")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SCREENMARK_GIT_HASH"), ")"),
    about = "Show transient overlays marking screen regions",
    after_help = "Shape syntax:\n  box:X,Y,W,H\n  circle:X,Y\n  label:X,Y:TEXT\n  label-in:X,Y,W,H:TEXT\n  image:X,Y:PATH (PNG)"
)]
struct Cli {
    /// Element to draw, in paint order (repeatable)
    #[arg(long = "shape", short = 's', value_name = "SPEC")]
    shapes: Vec<ShapeArg>,

    #[command(flatten)]
    style: StyleArgs,

    /// Seconds the overlay stays up (defaults to the configured value)
    #[arg(long, short = 't', value_name = "SECONDS")]
    seconds: Option<f64>,

    /// Write the composite as PNG instead of showing it
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Never touch the display
    #[arg(long, action = ArgAction::SetTrue)]
    headless: bool,

    /// Screen size used without a display, e.g. 1920x1080
    #[arg(long, value_name = "WxH", value_parser = parse_screen_size)]
    screen_size: Option<(u32, u32)>,

    /// Write a commented default config file and exit
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["shapes", "output"])]
    init_config: bool,
}

/// Style overrides applied to every shape.
#[derive(clap::Args, Debug)]
struct StyleArgs {
    /// Stroke color of boxes and circles (name or #rrggbb[aa])
    #[arg(long, value_name = "COLOR", value_parser = parse_color_arg)]
    line_color: Option<Color>,

    /// Label text color
    #[arg(long, value_name = "COLOR", value_parser = parse_color_arg)]
    color: Option<Color>,

    /// Fill color behind shapes and label text
    #[arg(long, value_name = "COLOR", value_parser = parse_color_arg)]
    background: Option<Color>,

    /// Stroke width in pixels
    #[arg(long, value_name = "PX")]
    line_width: Option<i32>,

    /// Label font size in pixels
    #[arg(long, value_name = "PX")]
    font_size: Option<f64>,

    /// Horizontal label alignment
    #[arg(long, value_enum, value_name = "ALIGN")]
    align_h: Option<AlignH>,

    /// Vertical label alignment
    #[arg(long, value_enum, value_name = "ALIGN")]
    align_v: Option<AlignV>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlignH {
    Left,
    Center,
    Right,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlignV {
    Top,
    Middle,
    Bottom,
}

/// One `--shape` argument.
#[derive(Debug, Clone, PartialEq)]
enum ShapeArg {
    Box(ScreenRegion),
    Circle(ScreenLocation),
    Label(ScreenLocation, String),
    LabelIn(ScreenRegion, String),
    Image(ScreenLocation, PathBuf),
}

fn parse_ints<const N: usize>(value: &str) -> Result<[i32; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, value));
    }
    let mut out = [0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a whole number", part))?;
    }
    Ok(out)
}

fn split_payload<'a>(rest: &'a str, what: &str) -> Result<(&'a str, &'a str), String> {
    rest.split_once(':')
        .ok_or_else(|| format!("missing ':{}' after coordinates", what))
}

impl FromStr for ShapeArg {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = spec
            .split_once(':')
            .ok_or_else(|| format!("invalid shape '{}': expected KIND:ARGS", spec))?;

        match kind.to_ascii_lowercase().as_str() {
            "box" => {
                let [x, y, w, h] = parse_ints(rest)?;
                Ok(ShapeArg::Box(ScreenRegion::new(x, y, w, h)))
            }
            "circle" => {
                let [x, y] = parse_ints(rest)?;
                Ok(ShapeArg::Circle(ScreenLocation::new(x, y)))
            }
            "label" => {
                let (coords, text) = split_payload(rest, "TEXT")?;
                let [x, y] = parse_ints(coords)?;
                Ok(ShapeArg::Label(ScreenLocation::new(x, y), text.to_string()))
            }
            "label-in" => {
                let (coords, text) = split_payload(rest, "TEXT")?;
                let [x, y, w, h] = parse_ints(coords)?;
                Ok(ShapeArg::LabelIn(ScreenRegion::new(x, y, w, h), text.to_string()))
            }
            "image" => {
                let (coords, path) = split_payload(rest, "PATH")?;
                let [x, y] = parse_ints(coords)?;
                Ok(ShapeArg::Image(ScreenLocation::new(x, y), PathBuf::from(path)))
            }
            other => Err(format!(
                "unknown shape kind '{}' (expected box, circle, label, label-in or image)",
                other
            )),
        }
    }
}

fn parse_color_arg(value: &str) -> Result<Color, String> {
    parse_color(value).ok_or_else(|| format!("unknown color '{}'", value))
}

fn parse_screen_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", value))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if w == 0 || h == 0 {
        return Err("screen size must be at least 1x1".to_string());
    }
    Ok((w, h))
}

fn apply_style<'a, P: Presenter>(
    mut configurator: StyleConfigurator<'a, P>,
    style: &StyleArgs,
) -> StyleConfigurator<'a, P> {
    if let Some(color) = style.line_color {
        configurator = configurator.with_line_color(color);
    }
    if let Some(color) = style.color {
        configurator = configurator.with_color(color);
    }
    if let Some(color) = style.background {
        configurator = configurator.with_background_color(color);
    }
    if let Some(width) = style.line_width {
        configurator = configurator.with_line_width(width);
    }
    if let Some(size) = style.font_size {
        configurator = configurator.with_font_size(size);
    }
    configurator = match style.align_h {
        Some(AlignH::Left) => configurator.with_horizontal_alignment_left(),
        Some(AlignH::Center) => configurator.with_horizontal_alignment_center(),
        Some(AlignH::Right) => configurator.with_horizontal_alignment_right(),
        None => configurator,
    };
    match style.align_v {
        Some(AlignV::Top) => configurator.with_vertical_alignment_top(),
        Some(AlignV::Middle) => configurator.with_vertical_alignment_middle(),
        Some(AlignV::Bottom) => configurator.with_vertical_alignment_bottom(),
        None => configurator,
    }
}

fn add_shape<P: Presenter>(
    canvas: &mut Canvas<P>,
    shape: &ShapeArg,
    style: &StyleArgs,
) -> anyhow::Result<()> {
    let configurator = match shape {
        ShapeArg::Box(region) => canvas.add_box(*region),
        ShapeArg::Circle(location) => canvas.add_circle(*location),
        ShapeArg::Label(location, text) => canvas.add_label(*location, text.as_str()),
        ShapeArg::LabelIn(region, text) => canvas.add_label_in(*region, text.as_str()),
        ShapeArg::Image(location, path) => {
            let bitmap = Bitmap::load_png(path)
                .with_context(|| format!("Failed to load image {}", path.display()))?;
            canvas.add_image(*location, &bitmap)
        }
    };
    apply_style(configurator, style);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file()?;
        println!("Created default config at {}", path.display());
        return Ok(());
    }

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config: {:#}. Using defaults.", e);
            Config::default()
        }
    };

    if let Some((width, height)) = cli.screen_size {
        config.presentation.screen_width = width;
        config.presentation.screen_height = height;
    }
    if cli.headless || cli.output.is_some() {
        config.presentation.backend = BackendKind::Headless;
    }

    let presenter = backend::open(&config.presentation)?;
    let mut canvas = Canvas::with_config(presenter, &config);
    for shape in &cli.shapes {
        add_shape(&mut canvas, shape, &cli.style)?;
    }
    info!("Built overlay with {} element(s)", canvas.scene().len());

    if let Some(path) = &cli.output {
        let image = canvas.create_image()?;
        image
            .save_png(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "Wrote {}x{} overlay to {}",
            image.width(),
            image.height(),
            path.display()
        );
        return Ok(());
    }

    let seconds = cli.seconds.unwrap_or(config.presentation.default_seconds);
    canvas.display(seconds)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_specs_parse() {
        assert_eq!(
            "box:100,100,50,40".parse::<ShapeArg>().unwrap(),
            ShapeArg::Box(ScreenRegion::new(100, 100, 50, 40))
        );
        assert_eq!(
            "circle: 200, 200".parse::<ShapeArg>().unwrap(),
            ShapeArg::Circle(ScreenLocation::new(200, 200))
        );
        assert_eq!(
            "label:50,50:Hi: there".parse::<ShapeArg>().unwrap(),
            ShapeArg::Label(ScreenLocation::new(50, 50), "Hi: there".to_string())
        );
        assert_eq!(
            "label-in:0,0,10,10:".parse::<ShapeArg>().unwrap(),
            ShapeArg::LabelIn(ScreenRegion::new(0, 0, 10, 10), String::new())
        );
        assert_eq!(
            "image:1,2:/tmp/a.png".parse::<ShapeArg>().unwrap(),
            ShapeArg::Image(ScreenLocation::new(1, 2), PathBuf::from("/tmp/a.png"))
        );
    }

    #[test]
    fn bad_shape_specs_are_rejected() {
        assert!("triangle:1,2".parse::<ShapeArg>().is_err());
        assert!("box:1,2,3".parse::<ShapeArg>().is_err());
        assert!("circle:a,b".parse::<ShapeArg>().is_err());
        assert!("label:1,2".parse::<ShapeArg>().is_err());
        assert!("box".parse::<ShapeArg>().is_err());
    }

    #[test]
    fn screen_size_parses() {
        assert_eq!(parse_screen_size("1920x1080").unwrap(), (1920, 1080));
        assert!(parse_screen_size("0x10").is_err());
        assert!(parse_screen_size("1920").is_err());
    }
}
