use hoverplot::{
    DocumentError, InteractivePlot, PageOptions, PlotDataContract, RenderContext, RuntimeOptions,
    TooltipArgs, TooltipInput, css, discover_axes,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HOVERPLOT_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Document(DocumentError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Document(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DocumentError> for CliError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<hoverplot::Error> for CliError {
    fn from(value: hoverplot::Error) -> Self {
        Self::Document(DocumentError::Core(value))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Classify,
    Axes,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    strict: bool,
    labels: Option<String>,
    groups: Option<String>,
    axis: Option<usize>,
    x_shift: i64,
    y_shift: i64,
    contract: Option<String>,
    css: Vec<String>,
    title: Option<String>,
    favicon: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "hoverplot-cli\n\
\n\
USAGE:\n\
  hoverplot-cli [render] [--labels <json>] [--groups <json>] [--axis <n>] [--x-shift <px>] [--y-shift <px>] [--contract <json>] [--css <path>]... [--title <text>] [--favicon <href>] [--strict] [--out <path>] [<svg>|-]\n\
  hoverplot-cli classify [--labels <json>] [--groups <json>] [--axis <n>] [--contract <json>] [--strict] [--pretty] [<svg>|-]\n\
  hoverplot-cli axes [--pretty] [<svg>|-]\n\
\n\
NOTES:\n\
  - If <svg> is omitted or '-', input is read from stdin.\n\
  - --labels/--groups name JSON files holding an array (or a {\"values\": [...]} series).\n\
  - --axis is 0-based; the first axis is used by default.\n\
  - --contract loads a prebuilt tooltip contract and replaces --labels/--groups.\n\
  - --css accepts stylesheet files; `.json` files are read as {selector: {property: value}}.\n\
  - render prints HTML to stdout by default; --out writes a file (.html is appended if missing).\n\
  - Set HOVERPLOT_LOG (e.g. `debug`) to control diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "classify" => args.command = Command::Classify,
            "axes" => args.command = Command::Axes,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--labels" => args.labels = Some(next_value(&mut it)?.clone()),
            "--groups" => args.groups = Some(next_value(&mut it)?.clone()),
            "--contract" => args.contract = Some(next_value(&mut it)?.clone()),
            "--css" => args.css.push(next_value(&mut it)?.clone()),
            "--title" => args.title = Some(next_value(&mut it)?.clone()),
            "--favicon" => args.favicon = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--axis" => {
                let n = next_value(&mut it)?;
                args.axis = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--x-shift" => {
                let n = next_value(&mut it)?;
                args.x_shift = n.parse::<i64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--y-shift" => {
                let n = next_value(&mut it)?;
                args.y_shift = n.parse::<i64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_json(path: &str) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn read_css(path: &str) -> Result<String, CliError> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(css::from_value(&read_json(path)?)?)
    } else {
        Ok(css::from_file(path)?)
    }
}

fn build_plot(svg: String, args: &Args) -> Result<InteractivePlot, CliError> {
    let options = if args.strict {
        RuntimeOptions::strict()
    } else {
        RuntimeOptions::default()
    };
    let mut plot = InteractivePlot::from_svg(svg)?.with_options(options);

    if let Some(path) = &args.contract {
        let text = std::fs::read_to_string(path)?;
        return Ok(plot.with_contract(PlotDataContract::from_json(&text)?));
    }

    let shifted = args.x_shift != 0 || args.y_shift != 0;
    if shifted || args.labels.is_some() || args.groups.is_some() || args.axis.is_some() {
        let mut tooltip = TooltipArgs::new().shift(args.x_shift, args.y_shift);
        if let Some(path) = &args.labels {
            tooltip = tooltip.labels(TooltipInput::from(read_json(path)?));
        }
        if let Some(path) = &args.groups {
            tooltip = tooltip.groups(TooltipInput::from(read_json(path)?));
        }
        if let Some(axis) = args.axis {
            tooltip = tooltip.axis(axis);
        }
        plot = plot.add_tooltip(tooltip)?;
    }
    Ok(plot)
}

fn run(args: Args) -> Result<(), CliError> {
    let svg = read_input(args.input.as_deref())?;

    match args.command {
        Command::Axes => {
            let axes = discover_axes(&svg)?;
            write_json(&axes, args.pretty)
        }
        Command::Classify => {
            let runtime = build_plot(svg, &args)?.runtime()?;
            write_json(runtime.classification(), args.pretty)
        }
        Command::Render => {
            let mut plot = build_plot(svg, &args)?;
            for path in &args.css {
                plot = plot.with_css(read_css(path)?);
            }

            let mut page = PageOptions::default();
            if let Some(title) = &args.title {
                page = page.title(title.clone());
            }
            if let Some(href) = &args.favicon {
                page = page.favicon(href.clone());
            }

            let ctx = RenderContext::bundled();
            match &args.out {
                None => print!("{}", plot.as_html(&ctx, &page)?),
                Some(out) => {
                    let written = plot.save(&ctx, out, &page)?;
                    tracing::info!(path = %written.display(), "wrote interactive plot");
                }
            }
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
