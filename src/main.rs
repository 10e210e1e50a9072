mod cli;
mod config;
mod domain;
mod engine;
mod format;
mod report;
mod store;

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::cli::{Cli, Command, SessionCmd, parse_session_line};
use crate::config::{AppConfig, app_paths, load_or_init_config, now_utc};
use crate::engine::Bank;
use crate::format::{Currency, Locale, format_currency, format_relative_date};
use crate::store::{AccountStore, demo_seed, load_seed_file};

const NOT_LOGGED_IN: &str = "Not logged in. Use: login <username> <pin>";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (cfg, _cfg_path) = load_or_init_config(&paths)?;

    match cli.command.unwrap_or(Command::Session) {
        Command::Seed => {
            let seeds = demo_seed()?;
            println!("{}", serde_json::to_string_pretty(&seeds)?);
            Ok(())
        }
        Command::Session => {
            let seeds = match &cli.accounts {
                Some(path) => load_seed_file(path)?,
                None => demo_seed()?,
            };
            let store = AccountStore::from_seeds(seeds)?;
            run_session(Bank::new(store), &cfg)
        }
    }
}

fn run_session(mut bank: Bank, cfg: &AppConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut session: Option<String> = None;
    let mut last_activity = Instant::now();

    loop {
        eprint!("caja> ");
        io::stderr().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        if session.is_some()
            && last_activity.elapsed() >= Duration::from_secs(cfg.session_timeout_secs)
        {
            session = None;
            println!("Session expired, logged out.");
        }
        last_activity = Instant::now();

        let cmd = match parse_session_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(err) => {
                println!("{err:#}");
                continue;
            }
        };

        // A session reference to a closed account is stale; drop it.
        if let Some(username) = &session {
            if bank.store().find_by_username(username).is_none() {
                session = None;
            }
        }

        match cmd {
            SessionCmd::Quit => break,
            SessionCmd::Help => print_help(),
            SessionCmd::Accounts => {
                for account in bank.store().iter() {
                    println!("{}\t{}", account.username, account.owner);
                }
            }
            SessionCmd::Login { username, pin } => match bank.authenticate(&username, pin) {
                Ok(account) => {
                    let username = account.username.clone();
                    println!("Welcome back, {}", account.first_name());
                    print_dashboard(&bank, &username, cfg);
                    session = Some(username);
                }
                Err(_) => println!("Login failed."),
            },
            SessionCmd::Logout => {
                if session.take().is_some() {
                    println!("Logged out.");
                } else {
                    println!("{NOT_LOGGED_IN}");
                }
            }
            SessionCmd::Whoami => match &session {
                Some(username) => match bank.store().find_by_username(username) {
                    Some(account) => println!("{}\t{}", account.username, account.owner),
                    None => println!("{NOT_LOGGED_IN}"),
                },
                None => println!("{NOT_LOGGED_IN}"),
            },
            SessionCmd::Balance => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                print_balance(&bank, &current, cfg);
            }
            SessionCmd::Summary => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                print_summary(&bank, &current, cfg);
            }
            SessionCmd::Movements { sorted } => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                print_movements(&bank, &current, sorted, cfg);
            }
            SessionCmd::Transfer { to, amount } => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                match bank.transfer(&current, &to, amount, now_utc()) {
                    Ok(()) => {
                        let (locale, currency) = display_prefs(&bank, &current, cfg);
                        println!(
                            "Transferred {} to {}.",
                            format_currency(amount, locale, currency),
                            to
                        );
                    }
                    Err(rejection) => println!("rejected: {rejection}"),
                }
            }
            SessionCmd::Loan { amount } => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                match bank.request_loan(&current, amount, now_utc()) {
                    Ok(granted) => {
                        let (locale, currency) = display_prefs(&bank, &current, cfg);
                        println!("Loan approved: {}.", format_currency(granted, locale, currency));
                    }
                    Err(rejection) => println!("rejected: {rejection}"),
                }
            }
            SessionCmd::Close { username, pin } => {
                let Some(current) = session.clone() else {
                    println!("{NOT_LOGGED_IN}");
                    continue;
                };
                match bank.close_account(&current, &username, pin) {
                    Ok(()) => {
                        session = None;
                        println!("Account closed. Goodbye.");
                    }
                    Err(rejection) => println!("rejected: {rejection}"),
                }
            }
        }
    }

    Ok(())
}

fn display_prefs(bank: &Bank, username: &str, cfg: &AppConfig) -> (Locale, Currency) {
    match bank.store().find_by_username(username) {
        Some(account) => (
            cfg.locale_override.unwrap_or(account.locale),
            account.currency,
        ),
        None => (cfg.locale_override.unwrap_or(Locale::EnUs), Currency::Usd),
    }
}

fn print_dashboard(bank: &Bank, username: &str, cfg: &AppConfig) {
    print_movements(bank, username, false, cfg);
    print_balance(bank, username, cfg);
    print_summary(bank, username, cfg);
}

fn print_balance(bank: &Bank, username: &str, cfg: &AppConfig) {
    let Some(account) = bank.store().find_by_username(username) else {
        return;
    };
    let locale = cfg.locale_override.unwrap_or(account.locale);
    println!(
        "balance\t{}",
        format_currency(report::balance(account), locale, account.currency)
    );
}

fn print_summary(bank: &Bank, username: &str, cfg: &AppConfig) {
    let Some(account) = bank.store().find_by_username(username) else {
        return;
    };
    let locale = cfg.locale_override.unwrap_or(account.locale);
    println!(
        "in\t{}",
        format_currency(report::total_income(account), locale, account.currency)
    );
    println!(
        "out\t{}",
        format_currency(report::total_expense(account), locale, account.currency)
    );
    println!(
        "interest\t{}",
        format_currency(report::qualifying_interest(account), locale, account.currency)
    );
}

fn print_movements(bank: &Bank, username: &str, sorted: bool, cfg: &AppConfig) {
    let Some(account) = bank.store().find_by_username(username) else {
        return;
    };
    let locale = cfg.locale_override.unwrap_or(account.locale);
    let now = now_utc();

    let rows = report::ordered_movements(account, sorted);
    if rows.is_empty() {
        println!("(no movements)");
        return;
    }

    // Newest on top; largest on top when sorted.
    for row in rows.iter().rev() {
        let kind = if row.amount > Decimal::ZERO {
            "deposit"
        } else {
            "withdrawal"
        };
        println!(
            "{}\t{}\t{}\t{}",
            row.seq,
            kind,
            format_relative_date(row.booked_at, now, locale),
            format_currency(row.amount, locale, account.currency)
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login <username> <pin>     authenticate and show the dashboard");
    println!("  logout                     end the current session");
    println!("  whoami                     show the authenticated account");
    println!("  accounts                   list usernames and owners");
    println!("  balance                    current balance");
    println!("  summary                    income, expenses and earned interest");
    println!("  movements [sorted]         ledger rows, optionally sorted by amount");
    println!("  transfer <username> <amount>  send money to another account");
    println!("  loan <amount>              request a loan");
    println!("  close <username> <pin>     close the current account (retype to confirm)");
    println!("  quit                       leave");
}
