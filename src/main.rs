// Defiler: remote memory debugger console

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use defiler::console::{Command, Console, LineKind, TranscriptLine};
use defiler::device::constants::{CODE_REGION_START, DATA_REGION_START, DEFAULT_MEMORY_LIMIT};
use defiler::device::simulated::{SimulatedConfig, SimulatedDevice};
use defiler::session::constants::ADDRESS_MASK;
use defiler::ui::App;

/// Remote memory debugger console.
#[derive(Parser, Debug)]
#[command(name = "defiler", version, about = "Remote memory debugger console")]
struct Cli {
    /// Command files to run before the console starts.
    #[arg(short, long = "script", value_name = "FILE")]
    scripts: Vec<PathBuf>,

    /// Read commands from stdin and print results instead of starting the TUI.
    #[arg(short, long)]
    batch: bool,

    /// Write logs to FILE.
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Bytes the simulated device may hand out.
    #[arg(long, default_value_t = DEFAULT_MEMORY_LIMIT)]
    memory_limit: u64,

    /// Base address of simulated data allocations.
    #[arg(long, value_parser = parse_address_arg, default_value_t = DATA_REGION_START)]
    data_base: u64,

    /// Base address of simulated code allocations.
    #[arg(long, value_parser = parse_address_arg, default_value_t = CODE_REGION_START)]
    code_base: u64,
}

fn parse_address_arg(text: &str) -> Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    let address = parsed.map_err(|e| format!("invalid address '{}': {}", text, e))?;
    if address == 0 || address > ADDRESS_MASK {
        return Err(format!(
            "address '{}' must be nonzero and fit in 32 bits",
            text
        ));
    }
    Ok(address)
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match &cli.log {
        Some(path) => {
            let log_file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(log_file)
                .with_ansi(false)
                .init();
        }
        // The TUI owns the terminal, so only batch mode logs to stderr
        None if cli.batch => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

fn print_lines(lines: &[TranscriptLine]) {
    for line in lines {
        match line.kind {
            LineKind::Error => eprintln!("{}", line.text),
            LineKind::Input | LineKind::Output => println!("{}", line.text),
        }
    }
}

fn run_batch(console: &mut Console<SimulatedDevice>) -> io::Result<bool> {
    let mut failed = false;
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let start = console.transcript().len();
        if console.execute_line(&line).is_err() {
            failed = true;
        }
        print_lines(console.transcript().lines_since(start));
        io::stdout().flush()?;

        if console.should_quit() {
            break;
        }
    }
    Ok(failed)
}

fn run_tui(console: Console<SimulatedDevice>) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(console);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let device = SimulatedDevice::new(SimulatedConfig {
        data_base: cli.data_base,
        code_base: cli.code_base,
        memory_limit: cli.memory_limit,
    });
    let mut console = Console::new(device);
    info!(
        data_base = cli.data_base,
        code_base = cli.code_base,
        "session started on simulated device"
    );

    for script in &cli.scripts {
        let start = console.transcript().len();
        let result = console.execute(Command::Script {
            file: script.clone(),
        });
        if cli.batch {
            print_lines(console.transcript().lines_since(start));
        }
        if let Err(e) = result {
            error!(error = %e, "startup script failed");
            if cli.batch {
                std::process::exit(1);
            }
        }
    }

    if cli.batch {
        if console.should_quit() {
            return Ok(());
        }
        let failed = run_batch(&mut console)?;
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    if console.should_quit() {
        return Ok(());
    }
    run_tui(console)
}
