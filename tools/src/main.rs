//! sched-runner: headless driver for the scheduling core.
//!
//! Usage:
//!   sched-runner --rep rep-42 --api-url https://portal.example.com/api
//!   sched-runner --rep rep-42 --db local.db --seed 7 --csv attendance.csv
//!   sched-runner --rep rep-42 --db local.db --ipc-mode

use anyhow::Result;
use chrono::NaiveDate;
use gigsched_core::{
    attendance::{write_cohort_csv, AttendanceWindow, CohortSort},
    clock::SchedClock,
    command::SlotCommand,
    config::SchedConfig,
    event::Notice,
    model::{DraftSlot, Rep, TimeSlot},
    planner::SessionPlanner,
    session::SchedSession,
    stats::WeeklyStats,
    store::{EnrollmentDirectory, HttpSlotStore, SlotStore, SqliteSlotStore},
    types::SlotHour,
};
use std::collections::BTreeSet;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    ClickHour { hour: SlotHour },
    ToggleHour { hour: SlotHour },
    RemoveDraft { start_time: SlotHour },
    SelectGig { gig_id: Option<String> },
    SelectDate { date: NaiveDate },
    Reserve,
    Slot { command: SlotCommand },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    today: NaiveDate,
    date: NaiveDate,
    rep_id: Option<&'a str>,
    selected_gig: Option<&'a str>,
    quick_start: Option<SlotHour>,
    quick_end: Option<SlotHour>,
    drafts: &'a [DraftSlot],
    slots: &'a [TimeSlot],
    stats: WeeklyStats,
    notices: Vec<Notice>,
}

struct Options {
    rep_id: String,
    seed: Option<u64>,
    date: Option<NaiveDate>,
    csv: Option<String>,
    ipc_mode: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let rep_id = string_arg(&args, "--rep")
        .ok_or_else(|| anyhow::anyhow!("--rep <id> is required"))?;
    let options = Options {
        rep_id,
        seed: string_arg(&args, "--seed").and_then(|s| s.parse().ok()),
        date: string_arg(&args, "--date")
            .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
            .transpose()?,
        csv: string_arg(&args, "--csv"),
        ipc_mode: args.iter().any(|a| a == "--ipc-mode"),
    };

    let mut config = match string_arg(&args, "--config") {
        Some(path) => SchedConfig::load(&path)?,
        None => SchedConfig::default_test(),
    };
    if let Some(url) = string_arg(&args, "--api-url") {
        config = config.with_base_url(&url);
    }

    let session = SchedSession::rep(&options.rep_id);

    match string_arg(&args, "--db") {
        Some(db) => {
            let store = SqliteSlotStore::open(&db)?;
            store.migrate()?;
            if !options.ipc_mode {
                println!("store:     sqlite {db}");
            }
            run(SessionPlanner::new(store, session, config, SchedClock::System), options).await
        }
        None => {
            let store = HttpSlotStore::new(&config.api)?;
            if !options.ipc_mode {
                println!("store:     {}", config.api.base_url);
            }
            run(SessionPlanner::new(store, session, config, SchedClock::System), options).await
        }
    }
}

async fn run<S: SlotStore + EnrollmentDirectory>(
    planner: SessionPlanner<S>,
    options: Options,
) -> Result<()> {
    let mut planner = match options.seed {
        Some(seed) => planner.with_seed(seed),
        None => planner,
    };
    if let Some(date) = options.date {
        planner.select_date(date);
    }
    planner.refresh().await;

    if options.ipc_mode {
        run_ipc_loop(&mut planner).await
    } else {
        print_summary(&mut planner, &options.rep_id)?;
        if let Some(path) = &options.csv {
            export_cohort(&planner, path)?;
        }
        Ok(())
    }
}

async fn run_ipc_loop<S: SlotStore + EnrollmentDirectory>(
    planner: &mut SessionPlanner<S>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = stdin.lock().read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::ClickHour { hour } => {
                planner.click_hour(hour);
            }
            IpcCommand::ToggleHour { hour } => {
                planner.toggle_hour(hour);
            }
            IpcCommand::RemoveDraft { start_time } => {
                planner.remove_draft(start_time);
            }
            IpcCommand::SelectGig { gig_id } => planner.select_gig(gig_id.as_deref()),
            IpcCommand::SelectDate { date } => planner.select_date(date),
            IpcCommand::Reserve => {
                let outcome = planner.reserve_block().await;
                log::debug!("reserve: {outcome:?}");
            }
            IpcCommand::Slot { command } => {
                let outcome = planner.execute(command).await;
                log::debug!("slot command: {outcome:?}");
            }
        }

        let state = build_ui_state(planner);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<S: SlotStore + EnrollmentDirectory>(planner: &mut SessionPlanner<S>) -> UiState<'_> {
    let notices = planner.take_notices();
    let stats = planner.weekly_stats();
    let planner = &*planner;
    let selection = planner.selection();
    UiState {
        today: planner.today(),
        date: selection.date(),
        rep_id: planner.selected_rep(),
        selected_gig: planner.selected_gig(),
        quick_start: selection.quick_start(),
        quick_end: selection.quick_end(),
        drafts: selection.drafts(),
        slots: planner.slots(),
        stats,
        notices,
    }
}

fn print_summary<S: SlotStore + EnrollmentDirectory>(
    planner: &mut SessionPlanner<S>,
    rep_id: &str,
) -> Result<()> {
    for notice in planner.take_notices() {
        println!("notice:    {:?} {}", notice.kind, notice.message);
    }

    let stats = planner.weekly_stats();
    println!("rep:       {rep_id}");
    println!("today:     {}", planner.today());
    println!("slots:     {}", planner.slots().len());
    println!();
    println!("=== WEEKLY STATS ===");
    println!("  total hours:     {}", stats.total_hours);
    println!("  reserved slots:  {}", stats.reserved_slots);
    println!("  available slots: {}", stats.available_slots);
    println!("  pending hours:   {}", stats.pending_hours);
    for (gig, hours) in &stats.hours_by_gig {
        println!("  gig {gig:<12} {hours}h");
    }

    let rep = planner.with_attendance(&Rep::new(rep_id, rep_id, ""));
    let attendance = planner.attendance(rep_id, AttendanceWindow::All);
    println!();
    println!("=== ATTENDANCE ===");
    println!(
        "  score: {}% ({}/{}) tier: {}",
        attendance.score,
        attendance.attended,
        attendance.tracked,
        attendance.tier.label()
    );

    println!();
    println!("=== BEST HOURS ===");
    let mut hours = planner.optimal_times(&rep);
    hours.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    for h in hours.iter().take(3).filter(|h| h.score > 0.0) {
        println!("  {:02}:00  {:.2}", h.hour, h.score);
    }

    println!();
    println!("=== WORKLOAD FORECAST ===");
    for day in planner.workload_forecast() {
        println!("  {} {:?}  {}h (from {} slots)", day.date, day.weekday, day.predicted_hours, day.sample_size);
    }
    Ok(())
}

fn export_cohort<S: SlotStore + EnrollmentDirectory>(
    planner: &SessionPlanner<S>,
    path: &str,
) -> Result<()> {
    let rep_ids: BTreeSet<&str> = planner.slots().iter().map(|s| s.rep_id.as_str()).collect();
    let reps: Vec<Rep> = rep_ids.into_iter().map(|id| Rep::new(id, id, "")).collect();
    let rows = planner.cohort(&reps, AttendanceWindow::All, CohortSort::Score);
    let file = std::fs::File::create(path)?;
    write_cohort_csv(&rows, file)?;
    println!();
    println!("attendance for {} rep(s) written to {path}", rows.len());
    Ok(())
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}
