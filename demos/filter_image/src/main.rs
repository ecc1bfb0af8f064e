use argh::FromArgs;
use std::path::PathBuf;
use std::time::Instant;

use quadra::imgproc::catalog::{Filter, FilterKind};
use quadra::imgproc::parallel::{BorderMode, DispatchConfig, ExecutionStrategy, TileDispatcher};
use quadra::io::{read_image_rgba8, write_image_png_rgba8};

#[derive(FromArgs)]
/// Apply a catalog filter to an image, one quadrant per worker
struct Args {
    /// path to an input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path to the output PNG image
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// the filter to apply: menu number (1-8), name or identifier
    #[argh(option, short = 'f')]
    filter: Option<String>,

    /// gaussian kernel size, despeckle passes or boundary power
    #[argh(option, short = 'p')]
    param: Option<usize>,

    /// number of worker threads (default: the global pool)
    #[argh(option)]
    threads: Option<usize>,

    /// fill the unfiltered border band with the source image
    #[argh(switch)]
    passthrough: bool,

    /// list the available filters and exit
    #[argh(switch)]
    list: bool,
}

fn parse_filter_kind(name: &str) -> Result<FilterKind, Box<dyn std::error::Error>> {
    if let Ok(index) = name.parse::<usize>() {
        return FilterKind::from_index(index)
            .ok_or_else(|| format!("no filter at position {index}").into());
    }
    Ok(name.parse()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if args.list {
        for (i, kind) in FilterKind::ALL.iter().enumerate() {
            println!("{}. {} ({})", i + 1, kind, kind.id());
        }
        return Ok(());
    }

    let kind = match &args.filter {
        Some(name) => parse_filter_kind(name)?,
        None => return Err("missing --filter, see --list".into()),
    };
    let filter = Filter::from_kind(kind, args.param);

    // read the image
    let image = read_image_rgba8(&args.image_path)?;
    log::info!(
        "read {} ({}x{})",
        args.image_path.display(),
        image.width(),
        image.height()
    );

    let strategy = args
        .threads
        .map_or(ExecutionStrategy::Parallel, ExecutionStrategy::Fixed);
    let border_mode = if args.passthrough {
        BorderMode::Passthrough
    } else {
        BorderMode::Unprocessed
    };

    let mut dispatcher = TileDispatcher::new(
        DispatchConfig::new()
            .with_strategy(strategy)
            .with_border_mode(border_mode),
    );

    let start = Instant::now();
    let filtered = dispatcher.dispatch(&image, &filter)?;
    log::info!("{filter} applied in {:?}", start.elapsed());

    write_image_png_rgba8(&args.output_path, &filtered)?;
    println!("{filter}: wrote {}", args.output_path.display());

    Ok(())
}
