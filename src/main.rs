//! QFORGE command-line entrypoint

use clap::{Args, Parser, Subcommand};
use qforge::export::ClipboardBackend;
use qforge::output::{Rendered, render_code, render_grid};
use qforge::{
    ColorPreset, ContentInput, ContentMode, Debouncer, Error, Exporter, FieldUpdate,
    GeneratedCode, GridIntrospector, QforgeConfig, QrEncoder, RasterSurface, RenderSettings,
    Result, Session, SessionState, SystemClipboard, Trigger, VectorReconstructor, WifiEncryption,
    copy_code, generate, logging,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "qforge",
    version,
    about = "Local-only QR code generator with PNG, SVG and clipboard export"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qforge.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Directory receiving exported files (takes precedence over config file)
    #[arg(long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Clipboard tool (`auto`, `wayland` or `x11`)
    #[arg(long, value_name = "BACKEND", global = true)]
    clipboard: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode content once and export it
    Generate(GenerateArgs),
    /// Edit fields line by line with live regeneration
    Interactive(RenderArgs),
    /// Recover the module grid from a reference-resolution PNG
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct RenderArgs {
    /// Output size in pixels (clamped to 128..=1024)
    #[arg(long, value_name = "PX")]
    size: Option<u32>,

    /// Error-correction level (L, M, Q or H)
    #[arg(long, value_name = "LEVEL")]
    level: Option<String>,

    /// Module color as #rgb or #rrggbb
    #[arg(long, value_name = "HEX")]
    fg: Option<String>,

    /// Background color as #rgb or #rrggbb
    #[arg(long, value_name = "HEX")]
    bg: Option<String>,

    /// Named color preset (classic, inverted, ocean, forest, sunset)
    #[arg(long, value_name = "NAME", conflicts_with_all = ["fg", "bg"])]
    preset: Option<String>,
}

#[derive(Args, Debug)]
struct ContentArgs {
    /// Plain text to encode
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,

    /// Web address; https:// is added when no protocol is given
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// WiFi network name
    #[arg(long, value_name = "SSID")]
    wifi_ssid: Option<String>,

    /// WiFi password
    #[arg(long, value_name = "PASSWORD", requires = "wifi_ssid")]
    wifi_password: Option<String>,

    /// WiFi authentication (WPA, WEP or nopass)
    #[arg(long, value_name = "TYPE", requires = "wifi_ssid")]
    wifi_encryption: Option<String>,

    /// Mark the WiFi network as hidden
    #[arg(long, requires = "wifi_ssid")]
    wifi_hidden: bool,

    /// Email recipient
    #[arg(long, value_name = "ADDRESS")]
    email: Option<String>,

    /// Email subject
    #[arg(long, value_name = "SUBJECT", requires = "email")]
    subject: Option<String>,

    /// Email body
    #[arg(long, value_name = "BODY", requires = "email")]
    body: Option<String>,
}

impl ContentArgs {
    fn into_input(self) -> Result<ContentInput> {
        let selected = [
            self.text.is_some(),
            self.url.is_some(),
            self.wifi_ssid.is_some(),
            self.email.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count();
        if selected != 1 {
            return Err(Error::Other(
                "Choose exactly one of --text, --url, --wifi-ssid or --email".to_string(),
            ));
        }

        let mut input = ContentInput::default();
        if let Some(text) = self.text {
            input.mode = Some(ContentMode::Text);
            input.text = text;
        } else if let Some(url) = self.url {
            input.mode = Some(ContentMode::Url);
            input.url = url;
        } else if let Some(ssid) = self.wifi_ssid {
            input.mode = Some(ContentMode::Wifi);
            input.wifi.ssid = ssid;
            input.wifi.password = self.wifi_password.unwrap_or_default();
            input.wifi.hidden = self.wifi_hidden;
            if let Some(encryption) = self.wifi_encryption {
                input.wifi.encryption = WifiEncryption::parse(&encryption).ok_or_else(|| {
                    Error::Other(format!(
                        "Unknown WiFi encryption '{encryption}'. Use WPA, WEP or nopass"
                    ))
                })?;
            }
        } else if let Some(address) = self.email {
            input.mode = Some(ContentMode::Email);
            input.email.address = address;
            input.email.subject = self.subject.unwrap_or_default();
            input.email.body = self.body.unwrap_or_default();
        }

        Ok(input)
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    content: ContentArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Write a PNG export (both formats are written when neither flag is given)
    #[arg(long)]
    png: bool,

    /// Write an SVG export
    #[arg(long)]
    svg: bool,

    /// Copy the PNG to the clipboard, falling back to a data URL
    #[arg(long)]
    copy: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// PNG rendered at the reference resolution
    #[arg(value_name = "PNG")]
    path: PathBuf,

    /// Reconstruct the recovered grid as SVG at this path
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

struct OutputSink {
    json: bool,
}

impl OutputSink {
    fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit(&self, rendered: &Rendered) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered.json)?);
        } else {
            for line in &rendered.human {
                println!("{line}");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QforgeConfig::load(cli.config.as_deref())?;

    if let Some(ref dir) = cli.output_dir {
        config.export.output_dir = dir.clone();
    }

    if let Some(ref backend) = cli.clipboard {
        config.export.clipboard = ClipboardBackend::parse(backend).ok_or_else(|| {
            Error::Config(format!(
                "Unknown clipboard backend '{backend}'. Use auto, wayland or x11"
            ))
        })?;
    }

    logging::init(&config.logging)?;

    match cli.command {
        Command::Generate(args) => handle_generate(&mut config, args).await,
        Command::Interactive(render) => {
            let settings = render_settings(&mut config, &render)?;
            handle_interactive(&config, settings).await
        }
        Command::Inspect(args) => handle_inspect(&mut config, args),
    }
}

/// Fold CLI render flags over the configured defaults.
fn render_settings(config: &mut QforgeConfig, args: &RenderArgs) -> Result<RenderSettings> {
    if let Some(size) = args.size {
        config.render.size = size;
    }
    if let Some(ref level) = args.level {
        config.render.level = level.clone();
    }
    if let Some(ref fg) = args.fg {
        config.render.foreground = fg.clone();
    }
    if let Some(ref bg) = args.bg {
        config.render.background = bg.clone();
    }

    let mut settings = config.render_settings()?;
    if let Some(ref name) = args.preset {
        let preset = ColorPreset::find(name)
            .ok_or_else(|| Error::Config(format!("Unknown color preset '{name}'")))?;
        settings.foreground = preset.foreground;
        settings.background = preset.background;
    }
    Ok(settings)
}

async fn handle_generate(config: &mut QforgeConfig, args: GenerateArgs) -> Result<()> {
    let settings = render_settings(config, &args.render)?;
    let input = args.content.into_input()?;
    let code = generate(&input, &settings, &QrEncoder::new())?;
    info!(
        payload_bytes = code.payload().len(),
        modules = code.grid().width(),
        "Generated QR code"
    );

    let exporter = Exporter::new(config.export.output_dir.clone());
    let (png, svg) = if args.png || args.svg {
        (args.png, args.svg)
    } else {
        (true, true)
    };

    let mut files = Vec::new();
    if png {
        files.push(exporter.save_png(&code)?);
    }
    if svg {
        files.push(exporter.save_svg(&code)?);
    }

    let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    let mut rendered = render_code(&code, &paths);

    if args.copy {
        let clipboard = SystemClipboard::new(config.export.clipboard);
        let (copied, notice) = match copy_code(&clipboard, &code).await {
            Ok(outcome) => (true, outcome.message().to_string()),
            Err(err) => (false, err.to_string()),
        };
        if let Some(obj) = rendered.json.as_object_mut() {
            obj.insert(
                "clipboard".to_string(),
                json!({ "copied": copied, "message": notice }),
            );
        }
        rendered.human.push(format!("  Clipboard: {notice}"));
    }

    OutputSink::new(args.json).emit(&rendered)
}

fn handle_inspect(config: &mut QforgeConfig, args: InspectArgs) -> Result<()> {
    let settings = render_settings(config, &args.render)?;
    let image = image::open(&args.path)?.to_rgba8();
    let surface = RasterSurface::from_image(image)?;

    let introspector = GridIntrospector::new(config.render.reference_size);
    let grid = introspector.introspect(&surface)?;

    let sink = OutputSink::new(args.json);
    let mut rendered = render_grid(&grid);

    if grid.is_degenerate() || !grid.is_valid_symbol_width() {
        sink.emit(&rendered)?;
        return Err(Error::GridRecovery(format!(
            "{} does not contain a recoverable QR symbol ({} modules at {}px)",
            args.path.display(),
            grid.width(),
            grid.cell_size()
        )));
    }

    if let Some(ref path) = args.svg {
        let document = VectorReconstructor::from_settings(&settings).reconstruct(&grid);
        std::fs::write(path, document.as_str())?;
        info!(path = %path.display(), rects = document.dark_rects(), "Reconstructed SVG");
        if let Some(obj) = rendered.json.as_object_mut() {
            obj.insert("svg".to_string(), Value::String(path.display().to_string()));
        }
        rendered.human.push(format!("  Saved: {}", path.display()));
    }

    sink.emit(&rendered)
}

const INTERACTIVE_HELP: &str = "\
Enter field=value to edit (mode, text, url, ssid, password, encryption, hidden,
email, subject, body, size, level, fg, bg, preset).
Commands: png, svg, copy, status, help, quit";

async fn handle_interactive(config: &QforgeConfig, settings: RenderSettings) -> Result<()> {
    let mut session = Session::new(settings);
    let (mut debouncer, mut due) = Debouncer::new(config.session.debounce());
    let exporter = Exporter::new(config.export.output_dir.clone());
    let clipboard = SystemClipboard::new(config.export.clipboard);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{INTERACTIVE_HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim_end_matches('\r');

                match line.trim() {
                    "" => {}
                    "quit" | "exit" => break,
                    "help" => println!("{INTERACTIVE_HELP}"),
                    "status" => print_status(&session),
                    command @ ("png" | "svg" | "copy") => {
                        // Exports reflect everything typed so far.
                        if debouncer.is_pending() {
                            debouncer.cancel();
                            report_state(session.regenerate());
                        }
                        let Some(code) = session.current() else {
                            println!("Nothing to export yet");
                            continue;
                        };
                        run_export(command, code, &exporter, &clipboard).await;
                    }
                    _ => match FieldUpdate::parse(line) {
                        Ok(update) => match session.apply(update) {
                            Trigger::Debounced => debouncer.trigger(()),
                            Trigger::Immediate => {
                                debouncer.cancel();
                                report_state(session.regenerate());
                            }
                            Trigger::Ignored => println!("Ignored: {line}"),
                        },
                        Err(err) => println!("{err}"),
                    },
                }
            }
            Some(()) = due.recv() => {
                report_state(session.regenerate());
            }
        }
    }

    Ok(())
}

async fn run_export(
    command: &str,
    code: &GeneratedCode,
    exporter: &Exporter,
    clipboard: &SystemClipboard,
) {
    let outcome = match command {
        "png" => exporter
            .save_png(code)
            .map(|path| format!("Saved {}", path.display())),
        "svg" => exporter
            .save_svg(code)
            .map(|path| format!("Saved {}", path.display())),
        _ => copy_code(clipboard, code)
            .await
            .map(|outcome| outcome.message().to_string()),
    };

    match outcome {
        Ok(message) => println!("{message}"),
        Err(err) => println!("{err}"),
    }
}

fn report_state(state: &SessionState) {
    match state.code() {
        Some(code) => println!(
            "QR ready: {} modules, {} bytes",
            code.grid().width(),
            code.payload().len()
        ),
        None => println!("Enter content to generate QR code"),
    }
}

fn print_status(session: &Session) {
    let input = session.input();
    let settings = session.settings();
    let mode = input.mode.map(ContentMode::as_str).unwrap_or("none");

    println!("Mode: {mode}");
    if input.mode == Some(ContentMode::Text) {
        println!("Characters: {}", input.char_count());
    }
    println!(
        "Size: {}px, level {}, {} on {}",
        settings.size,
        settings.level.as_str(),
        settings.foreground,
        settings.background
    );
    report_state(session.state());
    println!(
        "Exports: {}",
        if session.exports_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
}
