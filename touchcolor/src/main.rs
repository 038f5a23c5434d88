#![warn(clippy::pedantic)]

use std::{num::NonZeroUsize, sync::Arc};

use anyhow::{Context, Result as AnyResult};
use touchcolor::{capture::SurfaceCapturer, host, palette, Settings, SurfaceHandle, TouchSession};
use touchcolor_core::{estimate::kmeans::KMeans, ColorSample, Point};

const USAGE: &str = "usage: touchcolor [--config <PATH>] [--reset-each] [--save-config] \
                     [--palette [K]] <IMAGE> [<X,Y>...]";

/// Palette size when `--palette` is given without one.
const DEFAULT_PALETTE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(k) => k,
    None => unreachable!(),
};

struct Args {
    config: Option<std::path::PathBuf>,
    reset_each: bool,
    save_config: bool,
    /// Print the whole image's dominant colors, with this many clusters.
    palette: Option<NonZeroUsize>,
    image: std::path::PathBuf,
    touches: Vec<Point>,
}
impl Args {
    fn parse(args: impl Iterator<Item = std::ffi::OsString>) -> AnyResult<Self> {
        let mut args = args.peekable();
        let mut config = None;
        let mut reset_each = false;
        let mut save_config = false;
        let mut palette = None;
        let mut positional = Vec::new();
        while let Some(arg) = args.next() {
            match arg.to_str() {
                Some("--config") => {
                    let path = args.next().context("--config needs a path")?;
                    config = Some(path.into());
                }
                Some("--reset-each") => reset_each = true,
                Some("--save-config") => save_config = true,
                Some("--palette") => {
                    // K is optional, so only take the next argument if it is one.
                    let k = args
                        .peek()
                        .and_then(|next| next.to_str())
                        .and_then(|next| next.parse::<NonZeroUsize>().ok());
                    if k.is_some() {
                        args.next();
                    }
                    palette = Some(k.unwrap_or(DEFAULT_PALETTE));
                }
                Some("-h" | "--help") => anyhow::bail!(USAGE),
                _ => positional.push(arg),
            }
        }
        let mut positional = positional.into_iter();
        let image = positional.next().context(USAGE)?.into();
        let touches = positional
            .map(|arg| {
                let arg = arg.to_string_lossy();
                parse_touch(&arg).with_context(|| format!("bad touch {arg:?}, expected X,Y"))
            })
            .collect::<AnyResult<Vec<_>>>()?;
        Ok(Self {
            config,
            reset_each,
            save_config,
            palette,
            image,
            touches,
        })
    }
}

fn parse_touch(arg: &str) -> AnyResult<Point> {
    let (x, y) = arg
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("missing comma"))?;
    let x: i32 = x.trim().parse()?;
    let y: i32 = y.trim().parse()?;
    Ok(Point::from((x, y)))
}

fn print_color(color: Option<ColorSample>) {
    match color {
        Some(color) => println!("{}", color.to_hex()),
        None => println!("none"),
    }
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let args = Args::parse(std::env::args_os().skip(1))?;
    let settings = Settings::load_or_default(args.config.as_deref());
    if args.save_config {
        if let Err(e) = settings.save(args.config.as_deref()) {
            log::warn!("Failed to save settings:\n{e:?}");
        }
    }

    let image = image::open(&args.image)
        .with_context(|| format!("failed to open image {:?}", args.image))?
        .into_rgba8();
    let display = Arc::new(host::VirtualDisplay::new(
        settings.display.extent()?,
        settings.display.background,
    ));
    let surface = Arc::new(host::ImageSurface::new(
        image,
        settings.display.surface_origin(),
    )?);
    display.attach(surface.clone());
    let handle = SurfaceHandle::new(surface).with_compositor(display);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(async {
        if let Some(k) = args.palette {
            let mut capturer = SurfaceCapturer::new(settings.capture, handle.clone());
            match palette::palette(&mut capturer, &KMeans::default(), k).await {
                Ok(colors) => {
                    for color in colors {
                        println!("{} {:.3}", color.color, color.weight);
                    }
                }
                Err(e) => log::warn!("palette capture failed: {e}"),
            }
        }
        let mut session = TouchSession::new(handle, &settings);
        for touch in args.touches {
            if args.reset_each {
                session.reset();
            }
            print_color(session.color_at(touch).await);
        }
        session.end();
    });
    Ok(())
}
