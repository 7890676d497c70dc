use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ika_assets::AssetManager;
use ika_core::{ChunkError, ChunkSet, Document, Language, OutputSink};
use ika_highlight::Highlighter;
use ika_runexec::{RunOutcome, Runner, RunnerConfig, SystemLauncher};
use ika_settings::{ConfigStore, IdeConfig, SnippetStore, DEFAULT_CONFIG_FILE};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ika-cli",
    about = "Command-line access to the IKA editor's tools",
    author,
    version
)]
struct Cli {
    /// 設定檔路徑；預設為目前目錄下的 ika.json。 / Config file (defaults to ./ika.json).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出檔案的語法著色範圍。 / Print the highlight spans of a file.
    Highlight(HighlightArgs),
    /// 管理程式碼片段。 / Manage snippets.
    #[command(subcommand)]
    Snippets(SnippetsCommand),
    /// 將多個檔案拼接成一份。 / Stitch files together as chunks.
    Stitch(StitchArgs),
    /// 管理圖片資源。 / Manage image assets.
    #[command(subcommand)]
    Assets(AssetsCommand),
    /// 執行 Python 檔或在瀏覽器開啟 HTML。 / Run a Python file or open an HTML file in the browser.
    Run(RunArgs),
    /// 檢視或修改設定檔。 / Inspect or change the config file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective config as JSON.
    Show,
    /// Update selected fields and write the config file.
    Set(ConfigSetArgs),
}

#[derive(Args)]
struct ConfigSetArgs {
    #[arg(long, value_name = "PROGRAM")]
    interpreter: Option<String>,
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,
    #[arg(long, value_name = "SIZE")]
    font_size: Option<u32>,
    #[arg(long, value_name = "true|false")]
    line_numbers: Option<bool>,
}

#[derive(Args)]
struct HighlightArgs {
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Overrides the language inferred from the extension.
    #[arg(long)]
    language: Option<Language>,
}

#[derive(Subcommand)]
enum SnippetsCommand {
    /// List the effective snippets (built-ins overlaid by user files).
    List {
        #[arg(long, default_value_t = Language::Python)]
        language: Language,
    },
    /// Print one snippet body.
    Show(SnippetNameArgs),
    /// Save a user snippet from a file or stdin.
    Save {
        #[command(flatten)]
        target: SnippetNameArgs,
        /// Read the body from this file instead of stdin.
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
    },
    /// Delete a user snippet.
    Remove(SnippetNameArgs),
}

#[derive(Args)]
struct SnippetNameArgs {
    #[arg(long)]
    language: Language,
    #[arg(long, short = 'n', value_name = "NAME")]
    name: String,
}

#[derive(Args)]
struct StitchArgs {
    /// 每個檔案為一個片段。 / Each file is one chunk, in order.
    #[arg(required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,
    /// Write the result here instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum AssetsCommand {
    /// Copy an image into the managed folder.
    Add {
        #[arg(value_name = "FILE")]
        source: PathBuf,
    },
    /// List managed images.
    List,
    /// Print the quoted absolute path of a managed image.
    Ref {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Args)]
struct RunArgs {
    #[arg(value_name = "FILE")]
    file: PathBuf,
    #[arg(long)]
    language: Option<Language>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    let store = load_config(config)?;
    let base = std::env::current_dir().context("determine current directory")?;
    let resolved = store.config().resolved_against(&base);
    match command {
        Commands::Highlight(args) => execute_highlight(args),
        Commands::Snippets(subcommand) => execute_snippets_command(subcommand, &resolved),
        Commands::Stitch(args) => execute_stitch(args),
        Commands::Assets(subcommand) => execute_assets_command(subcommand, &resolved),
        Commands::Run(args) => execute_run(args, &resolved),
        Commands::Config(subcommand) => execute_config_command(subcommand, store),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ConfigStore> {
    let path = match path {
        Some(path) => resolve_input_path(&path)?,
        None => resolve_input_path(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    let store = ConfigStore::load(&path)
        .with_context(|| format!("load config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(store)
}

fn execute_config_command(command: ConfigCommand, mut store: ConfigStore) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(store.config())?);
        }
        ConfigCommand::Set(args) => {
            store.update(|config| {
                if let Some(interpreter) = &args.interpreter {
                    config.runner.interpreter = interpreter.clone();
                }
                if let Some(debounce_ms) = args.debounce_ms {
                    config.preview.debounce_ms = debounce_ms;
                }
                if let Some(font_size) = args.font_size {
                    config.editor.font_size = font_size;
                }
                if let Some(show) = args.line_numbers {
                    config.editor.show_line_numbers = show;
                }
            })?;
            println!("Updated {}", store.path().display());
        }
    }
    Ok(())
}

fn open_document(path: &Path, language: Option<Language>) -> Result<Document> {
    let path = resolve_input_path(path)?;
    let mut document =
        Document::open(&path).with_context(|| format!("open {}", path.display()))?;
    if let Some(language) = language {
        document.set_language(language);
    }
    Ok(document)
}

fn execute_highlight(args: HighlightArgs) -> Result<()> {
    let document = open_document(&args.file, args.language)?;
    let text = document.contents();
    let mut stdout = io::stdout().lock();
    for token in Highlighter::new().highlight(document.language(), text) {
        let slice = &text[token.range.clone()];
        writeln!(
            stdout,
            "{} {} {} {:?}",
            token.kind.name(),
            token.range.start,
            token.range.end,
            slice
        )?;
    }
    Ok(())
}

fn execute_snippets_command(command: SnippetsCommand, config: &IdeConfig) -> Result<()> {
    let store = SnippetStore::new(&config.paths.snippets_root);
    match command {
        SnippetsCommand::List { language } => {
            for name in store.list(language)?.keys() {
                println!("{name}");
            }
        }
        SnippetsCommand::Show(target) => {
            let body = store
                .get(target.language, &target.name)?
                .ok_or_else(|| anyhow!("no {} snippet named '{}'", target.language, target.name))?;
            print!("{body}");
        }
        SnippetsCommand::Save { target, from } => {
            let body = match from {
                Some(path) => {
                    let path = resolve_input_path(&path)?;
                    fs::read_to_string(&path)
                        .with_context(|| format!("read {}", path.display()))?
                }
                None => {
                    let mut body = String::new();
                    io::stdin()
                        .read_to_string(&mut body)
                        .context("read snippet from stdin")?;
                    body
                }
            };
            let path = store.save(target.language, &target.name, &body)?;
            println!("Saved snippet '{}' to {}", target.name.trim(), path.display());
        }
        SnippetsCommand::Remove(target) => {
            store.remove(target.language, &target.name)?;
            println!("Removed snippet '{}'", target.name.trim());
        }
    }
    Ok(())
}

fn execute_stitch(args: StitchArgs) -> Result<()> {
    let mut fragments = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let path = resolve_input_path(input)?;
        fragments.push(
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?,
        );
    }
    let chunks = ChunkSet::from_fragments(fragments)?;

    let mut document = Document::new();
    match document.stitch_from(&chunks) {
        Ok(()) => {}
        Err(ChunkError::NothingToStitch) => {
            eprintln!("No chunks to stitch.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    match args.output {
        Some(output) => {
            let output = resolve_input_path(&output)?;
            document
                .save_as(&output)
                .with_context(|| format!("write {}", output.display()))?;
            println!("Stitched {} chunks into {}", chunks.len(), output.display());
        }
        None => println!("{}", document.contents()),
    }
    Ok(())
}

fn execute_assets_command(command: AssetsCommand, config: &IdeConfig) -> Result<()> {
    let manager = AssetManager::new(&config.paths.assets_dir);
    match command {
        AssetsCommand::Add { source } => {
            let source = resolve_input_path(&source)?;
            let dest = manager.add(&source)?;
            println!("Added {}", dest.display());
        }
        AssetsCommand::List => {
            for name in manager.list()? {
                println!("{name}");
            }
        }
        AssetsCommand::Ref { name } => {
            if !manager.path_for(&name).is_file() {
                bail!("no image named '{name}' in {}", manager.dir().display());
            }
            println!("{}", manager.reference_for(&name));
        }
    }
    Ok(())
}

fn execute_run(args: RunArgs, config: &IdeConfig) -> Result<()> {
    let document = open_document(&args.file, args.language)?;
    let runner = Runner::new(
        RunnerConfig::new(config.runner.interpreter.clone(), config.paths.run_dir.clone()),
        SystemLauncher::blocking(),
    );

    let (sink, rx) = OutputSink::channel();
    let printer = thread::spawn(move || {
        let mut stdout = io::stdout();
        for line in rx {
            let _ = stdout.write_all(line.as_bytes());
            let _ = stdout.flush();
        }
    });
    let outcome = runner.run(document.language(), document.contents(), &sink);
    drop(sink);
    if printer.join().is_err() {
        bail!("output printer thread panicked");
    }

    match outcome? {
        RunOutcome::LaunchFailed => bail!("could not start {}", config.runner.interpreter),
        RunOutcome::NothingToRun | RunOutcome::Started { .. } | RunOutcome::BrowserOpened { .. } => {
            Ok(())
        }
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
