use std::io::{self, Write};

use anyhow::anyhow;
use chrono::{DateTime, Local};
use owo_colors::{OwoColorize, Style};
use rust_decimal::Decimal;

use crate::services::{
    config::PollerConfig, instruments::Instrument, market_data::RATE_DECIMALS,
    session::PollStatus,
};

pub fn format_rate(rate: Decimal) -> String {
    format!("{:.*}", RATE_DECIMALS as usize, rate)
}

pub fn format_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

pub fn format_change(change: Option<Decimal>) -> String {
    match change {
        Some(change) if change.is_sign_negative() && !change.is_zero() => {
            format!("{}", format_rate(change).style(Style::new().red().bold()))
        }
        Some(change) => format!(
            "{}",
            format!("+{}", format_rate(change)).style(Style::new().green().bold())
        ),
        None => "-".to_string(),
    }
}

/// One-line status banner for the terminal, styled by severity.
pub fn status_banner(
    status: &PollStatus,
    polled_at: Option<&DateTime<Local>>,
    refresh_secs: u64,
) -> String {
    let at = polled_at.map(format_time).unwrap_or_else(|| "--:--:--".to_string());
    match status {
        PollStatus::Pending => format!("Waiting for first update (every {}s)", refresh_secs),
        PollStatus::Live { .. } => format!(
            "{}",
            format!("Updated at {} | next update in {}s", at, refresh_secs)
                .style(Style::new().green())
        ),
        PollStatus::Degraded {
            fallback_rate,
            reason,
        } => format!(
            "{}",
            format!(
                "Live data unavailable at {}, showing fallback {} ({})",
                at,
                format_rate(*fallback_rate),
                reason
            )
            .style(Style::new().yellow())
        ),
        PollStatus::Failed { reason } => format!(
            "{}",
            format!("Error at {}: {}", at, reason).style(Style::new().red().bold())
        ),
    }
}

pub fn resolve_instrument(config: &PollerConfig, query: &str) -> anyhow::Result<Instrument> {
    config.find_instrument(query).cloned().ok_or_else(|| {
        anyhow!(
            "Unknown instrument '{}', run `forexwatch instruments` for the list",
            query
        )
    })
}

pub fn choose_instrument(instruments: &[Instrument]) -> anyhow::Result<Instrument> {
    if instruments.is_empty() {
        return Err(anyhow!("No instruments configured"));
    }

    println!("Instruments:");
    for (index, instrument) in instruments.iter().enumerate() {
        println!("{}: {} ({})", index + 1, instrument.label, instrument.code);
    }

    loop {
        print!("Please choose an instrument (1-{}): ", instruments.len());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(anyhow!("No instrument chosen"));
        }

        match input.trim().parse::<usize>() {
            Ok(index) if index > 0 && index <= instruments.len() => {
                return Ok(instruments[index - 1].clone());
            }
            _ => {
                println!(
                    "Invalid input. Please enter a number between 1 and {}.",
                    instruments.len()
                );
            }
        }
    }
}
