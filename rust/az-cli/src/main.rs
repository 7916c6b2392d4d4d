//! az: CLI binary for the Azul engine and MCTS bot.
//!
//! Subcommands:
//! - playout
//! - match
//! - bot-move
//! - show

use std::env;
use std::fmt::Display;
use std::process;
use std::str::FromStr;

use az_core::{initial_state, Azul, Config, OpponentKind, DEFAULT_MAX_ROUND_TIMEOUT};
use az_eval::{run_match_with_progress, run_sweep_with_progress, MatchOptions, Outcome};
use az_logging::{hash_config_bytes, NdjsonWriter};
use az_mcts::{MctsBot, MctsConfig};

fn fail(msg: impl Display) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

/// Parse the value following `flag`, exiting on a missing or malformed value.
fn flag_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let Some(raw) = args.get(i + 1) else {
        fail(format!("Missing value for {flag}"));
    };
    raw.parse()
        .unwrap_or_else(|_| fail(format!("Invalid {flag} value: {raw}")))
}

/// Parse a comma-separated list following `flag`, e.g. `--budgets 100,1000`.
fn flag_list<T: FromStr>(args: &[String], i: usize, flag: &str) -> Vec<T> {
    let raw: String = flag_value(args, i, flag);
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse()
                .unwrap_or_else(|_| fail(format!("Invalid {flag} entry: {part}")))
        })
        .collect()
}

fn unknown_option(cmd: &str, other: &str) -> ! {
    eprintln!("Unknown option for `az {cmd}`: {other}");
    fail(format!("Run `az {cmd} --help` for usage."));
}

fn cmd_playout(args: &[String]) {
    let mut games: u32 = 100;
    let mut seed: u64 = 0;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"az playout

USAGE:
    az playout [--games N] [--seed S]

OPTIONS:
    --games N    Number of random self-play games (default: 100)
    --seed S     RNG seed (default: 0)
"#
                );
                return;
            }
            "--games" => {
                games = flag_value(args, i, "--games");
                i += 2;
            }
            "--seed" => {
                seed = flag_value(args, i, "--seed");
                i += 2;
            }
            other => unknown_option("playout", other),
        }
    }
    if games == 0 {
        fail("--games must be > 0");
    }

    let mut engine = Azul::new(seed);
    let mut wins = [0u32; 2];
    let mut draws = 0u32;
    let mut score_sum = [0u64; 2];
    let mut rounds_sum = 0u64;
    let mut turns_sum = 0u64;

    for _ in 0..games {
        let start = initial_state(&mut engine).unwrap_or_else(|e| fail(e));
        let end = engine
            .playout(&start, DEFAULT_MAX_ROUND_TIMEOUT)
            .unwrap_or_else(|e| fail(e));

        let [a, b] = [end.players[0].score, end.players[1].score];
        score_sum[0] += a as u64;
        score_sum[1] += b as u64;
        rounds_sum += end.round_index as u64;
        turns_sum += end.turn_index as u64;
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => wins[0] += 1,
            std::cmp::Ordering::Less => wins[1] += 1,
            std::cmp::Ordering::Equal => draws += 1,
        }
    }

    let n = games as f64;
    println!("Random playouts:");
    println!("  - Games: {games}");
    println!(
        "  - Mean score: p0={:.2}, p1={:.2}",
        score_sum[0] as f64 / n,
        score_sum[1] as f64 / n
    );
    println!("  - Wins: p0={}, p1={}, draws={}", wins[0], wins[1], draws);
    println!(
        "  - Mean length: {:.2} rounds, {:.2} turns",
        rounds_sum as f64 / n,
        turns_sum as f64 / n
    );
}

fn cmd_match(args: &[String]) {
    let mut config_path: Option<String> = None;
    let mut games: Option<u32> = None;
    let mut seed: Option<u64> = None;
    let mut budget: Option<u32> = None;
    let mut opponent: Option<OpponentKind> = None;
    let mut log_path: Option<String> = None;
    let mut budgets: Option<Vec<u32>> = None;
    let mut weights: Option<Vec<f64>> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"az match

USAGE:
    az match [--config PATH] [--games N] [--seed S] [--budget B] [--opponent greedy|random] [--log PATH]
    az match --budgets B1,B2,.. --weights W1,W2,.. [OPTIONS]

OPTIONS:
    --config PATH        YAML config (default: built-in defaults)
    --games N            Number of games, seats alternate (default: config match.games)
    --seed S             Base seed for the game schedule (default: config match.seed)
    --budget B           MCTS steps per decision (default: config mcts.budget)
    --opponent KIND      Baseline opponent: greedy | random (default: config match.opponent)
    --log PATH           Append NDJSON events to PATH (default: config logging.events_path)
    --budgets LIST       Sweep these MCTS budgets (comma-separated)
    --weights LIST       Sweep these exploration weights (comma-separated)

With --budgets or --weights, every budget x weight pair plays the same games and one
summary line is printed per pair.
"#
                );
                return;
            }
            "--config" => {
                config_path = Some(flag_value(args, i, "--config"));
                i += 2;
            }
            "--games" => {
                games = Some(flag_value(args, i, "--games"));
                i += 2;
            }
            "--seed" => {
                seed = Some(flag_value(args, i, "--seed"));
                i += 2;
            }
            "--budget" => {
                budget = Some(flag_value(args, i, "--budget"));
                i += 2;
            }
            "--opponent" => {
                let Some(raw) = args.get(i + 1) else {
                    fail("Missing value for --opponent");
                };
                opponent = Some(raw.parse().unwrap_or_else(|e| fail(e)));
                i += 2;
            }
            "--log" => {
                log_path = Some(flag_value(args, i, "--log"));
                i += 2;
            }
            "--budgets" => {
                budgets = Some(flag_list(args, i, "--budgets"));
                i += 2;
            }
            "--weights" => {
                weights = Some(flag_list(args, i, "--weights"));
                i += 2;
            }
            other => unknown_option("match", other),
        }
    }

    let (mut cfg, config_hash) = match &config_path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .unwrap_or_else(|e| fail(format!("Failed to read config {path}: {e}")));
            let cfg = Config::load(path)
                .unwrap_or_else(|e| fail(format!("Failed to load config {path}: {e}")));
            (cfg, Some(hash_config_bytes(&bytes)))
        }
        None => (Config::default(), None),
    };
    if let Some(g) = games {
        cfg.match_.games = g;
    }
    if let Some(s) = seed {
        cfg.match_.seed = s;
    }
    if let Some(b) = budget {
        cfg.mcts.budget = b;
    }
    if let Some(o) = opponent {
        cfg.match_.opponent = o;
    }
    if log_path.is_some() {
        cfg.logging.events_path = log_path;
    }

    let mut opts = MatchOptions::from_config(&cfg);
    opts.config_hash = config_hash;

    let mut writer = cfg.logging.events_path.as_ref().map(|path| {
        NdjsonWriter::open_append_with_flush(path, cfg.logging.flush_every as u64)
            .unwrap_or_else(|e| fail(format!("Failed to open event log {path}: {e}")))
    });

    if budgets.is_some() || weights.is_some() {
        let budgets = budgets.unwrap_or_else(|| vec![opts.budget]);
        let weights = weights.unwrap_or_else(|| vec![opts.mcts.exploration_weight]);
        println!(
            "Sweep {}: {} budgets x {} weights, {} games each vs {:?}",
            opts.match_id,
            budgets.len(),
            weights.len(),
            opts.games,
            opts.opponent
        );
        println!("  budget   weight   mcts    opp     W   L   D   ms/move");
        run_sweep_with_progress(&opts, &budgets, &weights, writer.as_mut(), |p| {
            let r = &p.report;
            println!(
                "  {:>6}   {:>6.3}   {:>6.2} {:>6.2}  {:>3} {:>3} {:>3}   {:>8.2}",
                p.budget,
                p.exploration_weight,
                r.mean_mcts_score(),
                r.mean_opp_score(),
                r.mcts_wins,
                r.mcts_losses,
                r.draws,
                r.mean_decide_ms()
            );
        })
        .unwrap_or_else(|e| fail(format!("Sweep failed: {e}")));
        return;
    }

    println!(
        "Match {}: {} games, MCTS budget {} vs {:?}",
        opts.match_id, opts.games, opts.budget, opts.opponent
    );
    let report = run_match_with_progress(&opts, writer.as_mut(), |game_id, o| {
        let verdict = match o.outcome {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        };
        println!(
            "  game {:>3} (seat {}): mcts {:>3} - {:>3} opp  {}",
            game_id, o.spec.mcts_seat, o.mcts_score, o.opp_score, verdict
        );
    })
    .unwrap_or_else(|e| fail(format!("Match failed: {e}")));

    let (lo, hi) = report.score_diff_ci95();
    println!();
    println!("Summary:");
    println!(
        "  - Record: {}W {}L {}D, win rate {:.3}",
        report.mcts_wins,
        report.mcts_losses,
        report.draws,
        report.win_rate()
    );
    println!(
        "  - Mean score: mcts={:.2}, opp={:.2}",
        report.mean_mcts_score(),
        report.mean_opp_score()
    );
    println!(
        "  - Score diff: mean={:.2}, ci95=[{:.2}, {:.2}]",
        report.mean_score_diff(),
        lo,
        hi
    );
    println!("  - Decision time: {:.2} ms/move", report.mean_decide_ms());
    println!("  - Seeds hash: {}", report.seeds_hash);
}

fn cmd_bot_move(args: &[String]) {
    let mut seed: u64 = 0;
    let mut budget: u32 = Config::default().mcts.budget;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"az bot-move

USAGE:
    az bot-move [--seed S] [--budget B]

OPTIONS:
    --seed S     Seed for the deal and the search (default: 0)
    --budget B   MCTS steps (default: 200)
"#
                );
                return;
            }
            "--seed" => {
                seed = flag_value(args, i, "--seed");
                i += 2;
            }
            "--budget" => {
                budget = flag_value(args, i, "--budget");
                i += 2;
            }
            other => unknown_option("bot-move", other),
        }
    }
    if budget == 0 {
        fail("--budget must be > 0");
    }

    let mut engine = Azul::new(seed);
    let state = initial_state(&mut engine).unwrap_or_else(|e| fail(e));
    print!("{state}");

    let mut bot = MctsBot::new(engine, state, state.next_player, MctsConfig::default())
        .unwrap_or_else(|e| fail(e));
    let mv = bot.step_n(budget).unwrap_or_else(|e| fail(e));

    let mut edges = bot.root_edges();
    edges.sort_by(|a, b| b.1.cmp(&a.1));
    println!();
    println!("Top moves after {budget} steps:");
    for (m, plays, mean) in edges.iter().take(5) {
        println!("  {m}  plays={plays:>4}  mean={mean:.3}");
    }
    println!("Bot plays: {mv}");
}

fn cmd_show(args: &[String]) {
    let mut seed: u64 = 0;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"az show

USAGE:
    az show [--seed S]

OPTIONS:
    --seed S     Seed for the deal (default: 0)
"#
                );
                return;
            }
            "--seed" => {
                seed = flag_value(args, i, "--seed");
                i += 2;
            }
            other => unknown_option("show", other),
        }
    }

    let mut engine = Azul::new(seed);
    let state = initial_state(&mut engine).unwrap_or_else(|e| fail(e));
    print!("{state}");
}

fn print_help() {
    eprintln!(
        r#"az - Azul engine and MCTS bot CLI

USAGE:
    az <COMMAND> [OPTIONS]

COMMANDS:
    playout             Random self-play statistics
    match               MCTS bot vs a baseline agent
    bot-move            Deal a game and print the bot's first move
    show                Print a freshly dealt state

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `az <COMMAND> --help` for command options.
"#
    );
}

fn print_version() {
    println!("az {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "playout" => {
            cmd_playout(&args[2..]);
        }
        "match" => {
            cmd_match(&args[2..]);
        }
        "bot-move" => {
            cmd_bot_move(&args[2..]);
        }
        "show" => {
            cmd_show(&args[2..]);
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            fail("Run `az --help` for usage.");
        }
    }
}
