use clap::Parser;
use domboxes::rendering::{AnnotationStyle, Canvas};
use domboxes::{PageSession, PageTarget, SessionConfig, Viewport};
use log::{error, info};
use std::path::PathBuf;

/// Outline the text and image boxes of a page's DOM subtree
#[derive(Parser, Debug)]
#[command(name = "domboxes", version, about)]
struct Args {
    /// Page to load
    #[arg(long, default_value = "http://news.baidu.com/")]
    url: String,

    /// CSS selector of the subtree to annotate
    #[arg(long, default_value = "body")]
    selector: String,

    /// Output image (.jpg or .png)
    #[arg(short, long, default_value = "test.jpg")]
    output: PathBuf,

    /// Viewport and canvas width
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport and canvas height
    #[arg(long, default_value_t = 2000)]
    height: u32,

    /// Pause after navigation before capturing the DOM
    #[arg(long, default_value_t = 5000)]
    settle_ms: u64,

    /// Timeout for protocol calls
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Outline color as rrggbb hex
    #[arg(long, default_value = "0000ff")]
    color: String,

    /// Outline stroke width in pixels
    #[arg(long, default_value_t = 3)]
    stroke: u32,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Do not auto-resume debugger pauses
    #[arg(long)]
    no_pause_guard: bool,

    /// Optional user agent override
    #[arg(long)]
    user_agent: Option<String>,

    /// Write the run report (stats and annotations) as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the captured DOM subtree as JSON
    #[arg(long)]
    dump_tree: Option<PathBuf>,
}

fn run(args: Args) -> domboxes::Result<()> {
    let target = PageTarget::new(&args.url, &args.selector)?;
    let style = AnnotationStyle {
        color: AnnotationStyle::parse_color(&args.color)?,
        stroke: args.stroke,
    };
    style.validate()?;

    let config = SessionConfig {
        viewport: Viewport {
            width: args.width,
            height: args.height,
        },
        headless: !args.headed,
        timeout_ms: args.timeout_ms,
        settle_ms: args.settle_ms,
        user_agent: args.user_agent,
        resume_on_pause: !args.no_pause_guard,
    };

    let mut canvas = Canvas::for_viewport(config.viewport);
    let mut session = domboxes::new_session(config)?;

    session.load_url(target.url.as_str())?;
    let root = session.subtree(&target.selector)?;
    if let Some(path) = &args.dump_tree {
        std::fs::write(path, serde_json::to_vec_pretty(&root)?)?;
        info!("Wrote DOM subtree to {}", path.display());
    }

    let report = domboxes::annotate_tree(&session, &root, &target, &mut canvas, style)?;
    session.close()?;

    canvas.save(&args.output)?;
    info!("Wrote {} (sha256 {})", args.output.display(), canvas.digest());

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)?;
        info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
