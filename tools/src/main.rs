//! dashboard-runner: headless runner for the NovaMart metrics engine.
//!
//! Usage:
//!   dashboard-runner --data-dir ./data
//!   dashboard-runner --sample --seed 7
//!   dashboard-runner --config dashboard.json --ipc-mode

use anyhow::Result;
use novamart_core::{
    config::DashboardConfig,
    dashboard::{Dashboard, PageId, PageStatus},
    sample,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetPage { page: String },
    Reload,
    ListPages,
    Quit,
}

#[derive(serde::Serialize)]
struct PageEntry {
    page: PageId,
    title: &'static str,
    available: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let use_sample = args.iter().any(|a| a == "--sample");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].clone());

    let mut config = match config_path {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    if !ipc_mode {
        println!("NovaMart Marketing Analytics: dashboard-runner");
        if use_sample {
            println!("  source:    sample (seed {seed})");
        } else {
            println!("  data_dir:  {}", config.data_dir);
        }
        println!("  grain:     {:?}", config.default_time_grain);
        println!();
    }

    let mut dashboard = if use_sample {
        Dashboard::from_datasets(sample::generate(seed), config)
    } else {
        Dashboard::from_dir(config)?
    };

    if ipc_mode {
        run_ipc_loop(&mut dashboard)?;
    } else {
        print_summary(&dashboard)?;
    }

    Ok(())
}

fn run_ipc_loop(dashboard: &mut Dashboard) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetPage { page } => match page.parse::<PageId>() {
                Ok(id) => {
                    dashboard.refresh()?;
                    match dashboard.page_json(id) {
                        Ok(value) => writeln!(stdout, "{}", serde_json::to_string(&value)?)?,
                        Err(e) => write_error(&mut stdout, &e.to_string())?,
                    }
                }
                Err(e) => write_error(&mut stdout, &e)?,
            },
            IpcCommand::Reload => {
                log::info!("ipc: reload requested");
                dashboard.reload()?;
                writeln!(stdout, "{}", serde_json::to_string(&page_entries(dashboard))?)?;
            }
            IpcCommand::ListPages => {
                writeln!(stdout, "{}", serde_json::to_string(&page_entries(dashboard))?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn page_entries(dashboard: &Dashboard) -> Vec<PageEntry> {
    dashboard
        .page_list()
        .into_iter()
        .map(|(page, available)| PageEntry {
            page,
            title: page.title(),
            available,
        })
        .collect()
}

fn print_summary(dashboard: &Dashboard) -> Result<()> {
    let cur = dashboard.config().currency_symbol.clone();

    println!("=== PAGES ===");
    for (page, available) in dashboard.page_list() {
        let status = if available { "ready" } else { "data not available" };
        println!("  {:<22} {status}", page.title());
    }

    println!();
    println!("=== EXECUTIVE OVERVIEW ===");
    match dashboard.executive_overview() {
        PageStatus::Ready { page } => {
            let k = page.kpis;
            println!("  revenue:          {cur}{:.0}", k.total_revenue);
            println!("  spend:            {cur}{:.0}", k.total_spend);
            println!("  ROAS:             {:.2}", k.roas);
            println!("  conversions:      {:.0}", k.total_conversions);
            println!("  conversion rate:  {:.2}%", k.avg_conversion_rate);
            println!("  avg CTR:          {:.2}%", k.avg_ctr);
            if let Some(channel) = page.top_channel {
                println!("  top channel:      {channel}");
            }
        }
        PageStatus::Unavailable { missing } => println!("  (data not available: {missing})"),
    }

    println!();
    println!("=== FUNNEL ===");
    match dashboard.attribution_funnel() {
        PageStatus::Ready { page } => {
            if let Some(err) = &page.funnel_error {
                println!("  (funnel error: {err})");
            }
            for t in &page.transitions {
                println!(
                    "  {:>13} -> {:<13} {:>6.1}% | lost {}",
                    t.from.name(),
                    t.to.name(),
                    t.conversion_rate,
                    t.drop_off
                );
            }
            println!("  overall:          {:.2}%", page.overall_conversion_rate);
        }
        PageStatus::Unavailable { missing } => println!("  (data not available: {missing})"),
    }

    println!();
    println!("=== LEAD MODEL ===");
    match dashboard.model_evaluation() {
        PageStatus::Ready { page } => {
            if let Some(err) = &page.error {
                println!("  (evaluation failed: {err})");
            }
            if let Some(ev) = &page.evaluation {
                println!("  accuracy:         {:.3}", ev.metrics.accuracy);
                println!("  precision:        {:.3}", ev.metrics.precision);
                println!("  recall:           {:.3}", ev.metrics.sensitivity);
                println!("  F1:               {:.3}", ev.metrics.f1_score);
                println!("  AUC:              {:.3} ({:?})", ev.roc.auc, ev.roc.quality);
                println!("  best threshold:   {:.2}", ev.roc.optimal.threshold);
            }
            for f in &page.top_features {
                println!("  #{} {:<20} {:.3}", f.rank, f.feature, f.importance);
            }
        }
        PageStatus::Unavailable { missing } => println!("  (data not available: {missing})"),
    }

    println!();
    println!("=== TOP OPPORTUNITIES ===");
    match dashboard.geographic_analysis()? {
        PageStatus::Ready { page } => {
            for s in &page.top_opportunities {
                println!(
                    "  {:<16} score {:>5.1} | penetration {:.1}% | satisfaction {:.1}",
                    s.state, s.opportunity_score, s.market_penetration, s.satisfaction
                );
            }
        }
        PageStatus::Unavailable { missing } => println!("  (data not available: {missing})"),
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
