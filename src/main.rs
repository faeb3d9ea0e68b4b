//! Sonogest CLI
//!
//! Usage:
//!   sonogest                                 # RPS trials until q
//!   sonogest --mode rps --trials 10          # fixed number of RPS trials
//!   sonogest --mode tracker --target steps   # continuous tracking trial
//!   sonogest --mode tracker --simulate 120   # headless, simulated 120ms lag
//!   sonogest --mode sandbox                  # live key probe
//!   sonogest --config harness.toml --json    # config file + JSON output

use clap::{Parser, ValueEnum};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use sonogest::config::HarnessConfig;
use sonogest::core::target::target_value;
use sonogest::core::{
    pick_opponent, resolve, AnalogProxy, ContinuousTrackerEngine, DiscreteTrialEngine, KeyBuffer,
    KeyInput, KeyboardSource, MonotonicClock, Scoreboard, SimulatedFollower,
};
use sonogest::types::{RoundRecord, TargetKind, TickSample, TrackerMetrics, TrialResult};
use sonogest::{Error, Result, VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Discrete Rock-Paper-Scissors trials
    Rps,
    /// Continuous target tracking
    Tracker,
    /// Live key probe
    Sandbox,
}

#[derive(Parser, Debug)]
#[command(
    name = "sonogest",
    version = VERSION,
    about = "Keyboard-proxy trial harness for ultrasound gesture control",
    long_about = "Sonogest evaluates discrete and continuous control with the keyboard\n\
                  standing in for an ultrasound gesture sensor.\n\n\
                  Modes:\n  \
                  rps      - r/p/s during each capture window, majority vote decides\n  \
                  tracker  - follow a moving target with Up/Down (or k/j), space recentres\n  \
                  sandbox  - print keys and the analog value as they arrive\n\n\
                  Press q or Esc to quit."
)]
struct Args {
    /// Trial mode
    #[arg(short, long, value_enum, default_value_t = Mode::Rps)]
    mode: Mode,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many RPS trials
    #[arg(short = 'n', long)]
    trials: Option<u32>,

    /// Countdown before each window (ms)
    #[arg(long)]
    countdown_ms: Option<u64>,

    /// Capture window (ms)
    #[arg(long)]
    window_ms: Option<u64>,

    /// Max samples per window
    #[arg(long)]
    k_samples: Option<usize>,

    /// Read the keyboard from the trial loop instead of the key buffer
    #[arg(long)]
    direct: bool,

    /// Tracker trial duration (seconds)
    #[arg(long)]
    duration: Option<f64>,

    /// Tracker target waveform (sine | steps)
    #[arg(long)]
    target: Option<TargetKind>,

    /// Target frequency (Hz)
    #[arg(long)]
    freq: Option<f64>,

    /// Target amplitude (0, 1]
    #[arg(long)]
    amplitude: Option<f64>,

    /// Smooth the user signal with this alpha (0, 1]
    #[arg(long)]
    smooth: Option<f64>,

    /// Replace the operator by a follower lagging this many ms
    #[arg(long)]
    simulate: Option<f64>,

    /// Output as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    sonogest::telemetry::init_tracing(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&args).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!(mode = ?args.mode, "session start");
    match args.mode {
        Mode::Rps => run_rps(&config, args).await,
        Mode::Tracker => run_tracker(&config, args).await,
        Mode::Sandbox => run_sandbox(&config).await,
    }
}

/// Config file (or defaults) with CLI overrides applied, then validated
fn build_config(args: &Args) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    if let Some(v) = args.countdown_ms {
        config.discrete.countdown_ms = v;
    }
    if let Some(v) = args.window_ms {
        config.discrete.window_ms = v;
    }
    if let Some(v) = args.k_samples {
        config.discrete.k_samples = v;
    }
    if let Some(v) = args.duration {
        config.tracker.duration_s = v;
    }
    if let Some(v) = args.target {
        config.tracker.target_kind = v;
    }
    if let Some(v) = args.freq {
        config.tracker.target_freq_hz = v;
    }
    if let Some(v) = args.amplitude {
        config.tracker.target_amplitude = v;
    }
    if let Some(alpha) = args.smooth {
        config.tracker.stabilize_user = true;
        config.tracker.stabilize_alpha = alpha;
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// RPS MODE
// =============================================================================

/// Run discrete trials until q or the trial limit
async fn run_rps(config: &HarnessConfig, args: &Args) -> Result<()> {
    let engine = config.discrete.engine();
    let mut board = Scoreboard::new();
    let mut rng = StdRng::from_entropy();

    if !args.json {
        print_header("Rock-Paper-Scissors");
        println!("Controls: r=ROCK, p=PAPER, s=SCISSORS during the window. q to quit.");
        println!(
            "Window: {} ms, up to {} samples",
            engine.window_ms, engine.k_samples
        );
        println!();
    }

    let mut trial: u32 = 0;
    loop {
        if args.trials.is_some_and(|max| trial >= max) {
            break;
        }
        trial += 1;

        if !args.json {
            println!("{}", format!("=== Trial {} ===", trial).bold());
            countdown(engine.countdown_secs()).await;
            println!("{}", "GO! (press r/p/s)".green().bold());
        }

        let (result, quit) = capture_window(&engine, config.input.queue_capacity, args.direct).await?;
        if quit {
            debug!(trial, "quit during capture window");
            break;
        }

        let opponent = pick_opponent(&mut rng);
        let outcome = resolve(result.prediction, opponent);
        board = board.fold(&result, outcome);

        let record = RoundRecord {
            trial,
            result,
            opponent,
            outcome,
        };
        if args.json {
            print_json(&record);
        } else {
            print_round(&record, &board);
        }
    }

    match board.summary() {
        Some(summary) if args.json => print_json(&summary),
        Some(summary) => {
            println!();
            println!("{}", "Summary".bold());
            println!("  Number of trials:      {}", summary.trials);
            println!(
                "  Wins / Losses / Ties:  {} / {} / {}",
                summary.wins, summary.losses, summary.ties
            );
            println!("  Average confidence:    {:.2}", summary.avg_confidence);
            println!("  Average n_samples:     {:.1}", summary.avg_n_samples);
            println!(
                "  Average latency (last input to decision):  {:.1} ms",
                summary.avg_latency_last_ms
            );
            println!(
                "  Average latency (first input to decision): {:.1} ms",
                summary.avg_latency_first_ms
            );
            println!("  Session length:        {} s", summary.session_secs);
        }
        None if !args.json => println!("\nSummary not available, no trials completed."),
        None => {}
    }

    Ok(())
}

/// Run one capture window on a blocking worker. Returns (result, quit).
///
/// Buffered input: a pump thread pushes gestures into a `KeyBuffer` while
/// the engine pulls from it. Direct input: the engine polls the keyboard.
async fn capture_window(
    engine: &DiscreteTrialEngine,
    queue_capacity: usize,
    direct: bool,
) -> Result<(TrialResult, bool)> {
    let engine = engine.clone();

    let worker = tokio::task::spawn_blocking(move || -> Result<(TrialResult, bool)> {
        let mut keyboard = KeyboardSource::new()?;
        keyboard.drain()?;

        if direct {
            let result = engine.run_trial(|| keyboard.read());
            return Ok((result, keyboard.quit_requested()));
        }

        let buffer = KeyBuffer::new(queue_capacity);
        let sender = buffer.sender();
        let done = AtomicBool::new(false);

        let result = std::thread::scope(|scope| {
            let pump = scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    match keyboard.poll_key() {
                        Ok(Some(KeyInput::Gesture(token))) => {
                            sender.push(token);
                        }
                        Ok(Some(KeyInput::Quit)) => break,
                        Ok(_) => std::thread::sleep(Duration::from_millis(1)),
                        Err(e) => {
                            tracing::warn!(error = %e, "key pump stopped");
                            break;
                        }
                    }
                }
            });
            let result = engine.run_trial(|| buffer.read());
            done.store(true, Ordering::Release);
            let _ = pump.join();
            result
        });

        Ok((result, keyboard.quit_requested()))
    });

    worker.await.map_err(|e| Error::Worker(e.to_string()))?
}

/// Print a `n...` countdown, one line per second
async fn countdown(secs: u64) {
    for i in (1..=secs).rev() {
        println!("{}...", i);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

fn print_round(record: &RoundRecord, board: &Scoreboard) {
    println!("  You:       {}", record.result.to_terminal_string());
    println!(
        "  Opponent:  {} {}",
        record.opponent.emoji(),
        record.opponent.to_string().bold()
    );
    println!("  Outcome:   {}   {}", record.outcome.colored(), board.score_line().dimmed());
    println!();
}

// =============================================================================
// TRACKER MODE
// =============================================================================

/// Run one continuous trial at the configured tick rate
async fn run_tracker(config: &HarnessConfig, args: &Args) -> Result<()> {
    let cfg = config.tracker.clone();
    let mut engine = ContinuousTrackerEngine::new(cfg.clone());
    let mut proxy = AnalogProxy::new(config.input.analog_step);
    let mut follower = args.simulate.map(SimulatedFollower::new);

    if !args.json {
        print_header("Continuous Tracker");
        println!(
            "Target: {} {:.2} Hz, amplitude {:.2}, {:.1} s at {} Hz{}",
            cfg.target_kind,
            cfg.target_freq_hz,
            cfg.target_amplitude,
            cfg.duration_s,
            cfg.tick_hz,
            if cfg.stabilize_user {
                format!(", smoothing a={}", cfg.stabilize_alpha)
            } else {
                String::new()
            }
        );
        match args.simulate {
            Some(lag) => println!("Simulated operator, {:.0} ms behind the target", lag),
            None => println!("Up/Down (or k/j) to move, space to recentre, q to quit."),
        }
        countdown(3).await;
    }

    let mut keyboard = match follower {
        Some(_) => None,
        None => Some(KeyboardSource::new()?),
    };

    let mut interval = tokio::time::interval(cfg.tick_period()?);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let t0 = MonotonicClock::seconds();
    engine.start_at(t0);
    let render_every = (cfg.tick_hz / 10.0).ceil().max(1.0) as usize;

    while engine.is_running() {
        interval.tick().await;
        let now = MonotonicClock::seconds();

        let user = match (&mut follower, &mut keyboard) {
            (Some(f), _) => {
                let elapsed = (now - t0).max(0.0);
                f.respond(elapsed, target_value(&cfg, elapsed))
            }
            (None, Some(kb)) => {
                while let Some(key) = kb.poll_key()? {
                    match key {
                        KeyInput::Up => {
                            proxy.nudge(1);
                        }
                        KeyInput::Down => {
                            proxy.nudge(-1);
                        }
                        KeyInput::Center => proxy.recenter(),
                        _ => {}
                    }
                }
                if kb.quit_requested() {
                    engine.stop();
                    break;
                }
                proxy.value()
            }
            (None, None) => 0.0,
        };

        let tick = engine.step(now, user);
        if !args.json && engine.len() % render_every == 0 {
            print_tick(&tick);
        }
    }

    // restore the terminal before printing results
    drop(keyboard);
    if !args.json {
        println!();
    }

    let metrics = engine.compute_metrics();
    info!(n = metrics.n, rmse = metrics.rmse, lag_ms = metrics.lag_ms, "tracker trial done");

    if args.json {
        print_json(&metrics);
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

fn print_tick(tick: &TickSample) {
    let err = tick.user - tick.target;
    print!(
        "\r  t={:6.2}s  target={:+.3}  you={:+.3}  err={}   ",
        tick.t,
        tick.target,
        tick.user,
        if err.abs() < 0.1 {
            format!("{:+.3}", err).green()
        } else {
            format!("{:+.3}", err).red()
        }
    );
    let _ = std::io::stdout().flush();
}

fn print_metrics(m: &TrackerMetrics) {
    println!("{}", "Tracking metrics".bold());
    println!("  RMSE:              {:.4}", m.rmse);
    println!("  Correlation r:     {:.3}", m.r);
    println!("  Lag:               {:+.1} ms {}", m.lag_ms, "(positive = you trail the target)".dimmed());
    println!("  RMSE at best lag:  {:.4}", m.rmse_best_lag);
    println!("  Samples:           {} over {:.2} s", m.n, m.duration_s);
}

// =============================================================================
// SANDBOX MODE
// =============================================================================

/// Echo gestures and the analog value until q
async fn run_sandbox(config: &HarnessConfig) -> Result<()> {
    print_header("Sandbox");
    println!("Press r/p/s, Up/Down, space. q to quit.");

    let mut keyboard = KeyboardSource::new()?;
    let mut proxy = AnalogProxy::new(config.input.analog_step);
    let t0 = MonotonicClock::seconds();
    let mut interval = tokio::time::interval(Duration::from_millis(10));

    // raw mode: lines need an explicit carriage return
    loop {
        interval.tick().await;
        while let Some(key) = keyboard.poll_key()? {
            let t = MonotonicClock::seconds() - t0;
            match key {
                KeyInput::Gesture(token) => {
                    print!("[{:8.3}s] {} {}\r\n", t, token.emoji(), token.to_string().bold())
                }
                KeyInput::Up => print!("[{:8.3}s] analog {:+.2}\r\n", t, proxy.nudge(1)),
                KeyInput::Down => print!("[{:8.3}s] analog {:+.2}\r\n", t, proxy.nudge(-1)),
                KeyInput::Center => {
                    proxy.recenter();
                    print!("[{:8.3}s] analog {:+.2}\r\n", t, proxy.value())
                }
                KeyInput::Quit | KeyInput::Other => {}
            }
        }
        let _ = std::io::stdout().flush();
        if keyboard.quit_requested() {
            break;
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_header(mode: &str) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  Sonogest v{} - {}", VERSION, mode).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize record: {}", e),
    }
}
