use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use kkutu_core::config::EngineConfig;
use kkutu_core::core::engine::{Phase, FAIL_CUE_MS};
use kkutu_core::core::rules::{turn_budget_ms, turn_speed, RandomSource, StdRandom};
use kkutu_core::core::types::{
    GameMode, GameSetting, HintMode, Lang, RoundSummary, SubmitOutcome, UsedWordEntry,
};
use kkutu_core::import::{parse_word_list, to_entries, WordFile};
use kkutu_core::persistence::{
    export_json, forget_word, import_json, store_word, FileWordStore, WordStore,
};
use kkutu_core::timer::RoundClock;
use kkutu_core::GameSession;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "kkutu.toml";

struct Ui {
    clock: Option<RoundClock>,
    last_message: Option<String>,
    auto_hint: Option<String>,
}

fn main() -> kkutu_core::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = EngineConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let random: Box<dyn RandomSource> = match config.seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::from_entropy()),
    };
    let mut store = FileWordStore::open(&config.dictionary_path)?;
    let mut session = GameSession::from_store(&store, config.setting.clone(), random)?;
    let mut ui = Ui { clock: None, last_message: None, auto_hint: None };

    loop {
        print_ui(&session, &ui)?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let now = Instant::now();
        let line = input.trim();

        if session.phase() == Phase::Active && check_timers(&mut session, &mut ui, now)? {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) => break,
            (":start", _) => match session.game_start() {
                Ok(start) => {
                    ui.clock = Some(RoundClock::start(now, start.turn_budget_ms));
                    ui.last_message = None;
                    refresh_auto_hint(&mut session, &mut ui);
                }
                Err(e) => ui.last_message = Some(e.to_string()),
            },
            (":end", _) => finish_round(&mut session, &mut ui)?,
            (":hint", _) => {
                ui.last_message = session.get_hint_word().map(|h| format!("Hint: {h}"));
            }
            (":reveal", _) => {
                ui.last_message = session.get_hint().map(|h| format!("Answer: {h}"));
            }
            (":add", rest) => {
                let mut parts = rest.split_whitespace();
                let word = parts.next().unwrap_or("");
                let themes: Vec<String> = parts.map(str::to_string).collect();
                let added = session.add_word_to_db(word, themes);
                if added {
                    store_word(session.dictionary(), &mut store, word)?;
                }
                ui.last_message = Some(format!("add {word}: {added}"));
            }
            (":edit", rest) => {
                let (old, new) = rest.split_once(' ').unwrap_or((rest, ""));
                let edited = session.edit_word_in_db(old.trim(), new.trim());
                if edited {
                    forget_word(&mut store, old)?;
                    store_word(session.dictionary(), &mut store, new)?;
                }
                ui.last_message = Some(format!("edit {old} -> {new}: {edited}"));
            }
            (":del", word) => {
                let word = word.trim();
                let deleted = session.delete_word_from_db(word);
                if deleted {
                    forget_word(&mut store, word)?;
                }
                ui.last_message = Some(format!("delete {word}: {deleted}"));
            }
            (":clear", _) => {
                session.clear_db();
                store.clear()?;
                ui.last_message = Some("dictionary cleared".to_string());
            }
            (":import", path) => {
                ui.last_message = Some(match import_file(&mut session, &mut store, Path::new(path)) {
                    Ok(msg) => msg,
                    Err(e) => format!("import failed: {e}"),
                });
            }
            (":export", path) => {
                export_json(session.dictionary(), Path::new(path))?;
                ui.last_message = Some(format!("exported {} words", session.dictionary().len()));
            }
            (":set", rest) => {
                let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
                let mut setting = session.setting().clone();
                ui.last_message = Some(match apply_setting(&mut setting, key, value.trim()) {
                    Ok(()) => match session.update_setting(setting) {
                        Ok(()) => format!("{key} updated"),
                        Err(e) => e.to_string(),
                    },
                    Err(msg) => msg,
                });
            }
            _ if session.phase() == Phase::Active => {
                let elapsed = ui.clock.map_or(0, |c| c.elapsed_ms(now));
                let outcome = session.submit_word(line, elapsed)?;
                on_outcome(&mut session, &mut ui, outcome, now);
            }
            _ => ui.last_message = Some("unknown command".to_string()),
        }
    }

    if let Some(clock) = ui.clock.as_mut() {
        clock.cancel_all();
    }
    println!("\nDictionary stored at '{}'", store.path().display());
    Ok(())
}

/// Handles an expired turn countdown or round clock. Returns true when the
/// pending input should be dropped.
fn check_timers(session: &mut GameSession, ui: &mut Ui, now: Instant) -> kkutu_core::Result<bool> {
    let Some(mut clock) = ui.clock else {
        return Ok(false);
    };
    let elapsed = clock.elapsed_ms(now);
    if elapsed >= session.setting().round_time {
        finish_round(session, ui)?;
        return Ok(true);
    }
    if clock.turn.fire(now) {
        let outcome = session.turn_timeout(elapsed)?;
        ui.clock = Some(clock);
        on_outcome(session, ui, outcome, now);
        ui.last_message = Some("Time is up for that turn.".to_string());
        return Ok(true);
    }
    if clock.fail_cue.fire(now) {
        ui.last_message = None;
    }
    ui.clock = Some(clock);
    Ok(false)
}

fn on_outcome(session: &mut GameSession, ui: &mut Ui, outcome: SubmitOutcome, now: Instant) {
    let Some(clock) = ui.clock.as_mut() else {
        return;
    };
    match outcome {
        SubmitOutcome::Accepted(accepted) => {
            clock.turn.arm(now, accepted.turn_budget_ms);
            clock.fail_cue.cancel();
            ui.last_message = Some(format!("{} (speed {})", accepted.word_entry.word, accepted.turn_speed));
            refresh_auto_hint(session, ui);
        }
        SubmitOutcome::Rejected { reason } => {
            if !clock.turn.is_armed() {
                let elapsed = clock.elapsed_ms(now);
                let remaining = session.setting().round_time.saturating_sub(elapsed);
                clock.turn.arm(now, turn_budget_ms(turn_speed(elapsed), remaining));
            }
            clock.fail_cue.arm(now, FAIL_CUE_MS);
            ui.last_message = Some(format!("✗ {reason}"));
        }
    }
}

fn refresh_auto_hint(session: &mut GameSession, ui: &mut Ui) {
    ui.auto_hint = match session.setting().hint_mode {
        HintMode::Auto => session.get_hint_word(),
        HintMode::Manual => None,
    };
}

fn finish_round(session: &mut GameSession, ui: &mut Ui) -> kkutu_core::Result<()> {
    if session.phase() != Phase::Active {
        ui.last_message = Some("no round is active".to_string());
        return Ok(());
    }
    if let Some(clock) = ui.clock.as_mut() {
        clock.cancel_all();
    }
    ui.clock = None;
    ui.auto_hint = None;
    let log = session.end_round()?;
    ui.last_message = Some(format_result(&log));
    Ok(())
}

fn format_result(log: &[UsedWordEntry]) -> String {
    let summary = RoundSummary::from_log(log);
    let mut out = format!(
        "Round over: {} accepted, {} failed, {} hints",
        summary.accepted, summary.failed, summary.hints_used
    );
    if let Some(word) = summary.longest_word {
        out.push_str(&format!(", longest '{word}'"));
    }
    for entry in log {
        let mark = if entry.failed { "✗" } else { "✓" };
        out.push_str(&format!("\n  {mark} [{}] {}", entry.prompt_char, entry.word));
    }
    out
}

fn import_file(
    session: &mut GameSession,
    store: &mut FileWordStore,
    path: &Path,
) -> kkutu_core::Result<String> {
    let entries = if path.extension().is_some_and(|e| e == "json") {
        import_json(path)?
    } else {
        let file = WordFile::from_path(path)?;
        to_entries(parse_word_list(&file)?)
    };
    let report = session.load_word_db(entries);
    session.save_dictionary(store)?;
    Ok(format!(
        "loaded {} words ({} rejected), can start: {}",
        report.loaded, report.rejected, report.can_start
    ))
}

fn apply_setting(setting: &mut GameSetting, key: &str, value: &str) -> Result<(), String> {
    match key {
        "lang" => {
            setting.lang = match value {
                "ko" => Lang::Ko,
                "en" => Lang::En,
                _ => return Err(format!("unknown lang {value}")),
            }
        }
        "mode" => {
            setting.mode = match value {
                "normal" => GameMode::Normal,
                "mission" => GameMode::Mission,
                _ => return Err(format!("unknown mode {value}")),
            }
        }
        "hint" => {
            setting.hint_mode = match value {
                "auto" => HintMode::Auto,
                "manual" => HintMode::Manual,
                _ => return Err(format!("unknown hint mode {value}")),
            }
        }
        "nodup" => setting.not_again_same_char = matches!(value, "on" | "true" | "1"),
        "time" => {
            setting.round_time = value.parse().map_err(|_| format!("bad round time {value}"))?;
        }
        "want" => {
            setting.want_start_char = if value == "-" { Default::default() } else { value.chars().collect() };
        }
        _ => return Err(format!("unknown setting {key}")),
    }
    Ok(())
}

fn print_ui(session: &GameSession, ui: &Ui) -> kkutu_core::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let setting = session.setting();
    println!("{}", "Kkutu Word Chain".bold());
    println!("---------------------------------------------------------------");
    println!(":start :end :hint :reveal :add :edit :del :clear :import :export :set :quit");
    println!(
        "lang={:?} mode={:?} hint={:?} nodup={} round={}ms words={}\n",
        setting.lang,
        setting.mode,
        setting.hint_mode,
        setting.not_again_same_char,
        setting.round_time,
        session.dictionary().len()
    );

    if let Some(state) = session.current_state() {
        let now = Instant::now();
        let mut prompt = format!("Start: {}", state.start_char).green().bold().to_string();
        if let Some(mission) = state.mission_char {
            prompt.push_str(&format!("   Mission: {}", mission).yellow().to_string());
        }
        println!("{prompt}");
        if let Some(clock) = ui.clock {
            let turn_left = clock.turn.remaining_ms(now).unwrap_or(0);
            println!("Round {}ms / turn left {}ms", clock.elapsed_ms(now), turn_left);
        }
        if let Some(hint) = &ui.auto_hint {
            println!("Hint: {}", hint.as_str().cyan());
        }
        println!("Turns so far: {}", session.history().len());
    } else if !session.can_game_start() {
        println!("{}", "No playable start character: import or add words first.".red());
    }

    if let Some(msg) = &ui.last_message {
        if msg.starts_with('✗') {
            println!("\n{}", msg.as_str().red());
        } else {
            println!("\n{msg}");
        }
    }
    print!("\n> ");
    out.flush()?;
    Ok(())
}
