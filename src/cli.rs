use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "caja")]
#[command(about = "Interactive in-memory banking ledger", long_about = None)]
pub struct Cli {
    /// Override Caja home directory (the config subdir will be created inside it).
    #[arg(long, env = "CAJA_HOME")]
    pub home: Option<std::path::PathBuf>,

    /// Load seed accounts from a JSON file instead of the built-in demo set.
    #[arg(long)]
    pub accounts: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive session (the default when no subcommand is given).
    Session,
    /// Print the built-in demo accounts as seed JSON, ready for --accounts.
    Seed,
}

/// One line of session input, already parsed to primitives. The ledger engine
/// only ever sees numbers, never raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCmd {
    Login { username: String, pin: u32 },
    Logout,
    Whoami,
    Accounts,
    Balance,
    Summary,
    Movements { sorted: bool },
    Transfer { to: String, amount: Decimal },
    Loan { amount: Decimal },
    Close { username: String, pin: u32 },
    Help,
    Quit,
}

/// Parses one session line. Blank lines yield `Ok(None)`; anything malformed
/// is a usage error for the session loop to print.
pub fn parse_session_line(line: &str) -> Result<Option<SessionCmd>> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();

    let cmd = match head {
        "login" => match rest[..] {
            [username, pin] => SessionCmd::Login {
                username: username.to_string(),
                pin: parse_pin(pin)?,
            },
            _ => return Err(anyhow!("Usage: login <username> <pin>")),
        },
        "logout" => no_args(SessionCmd::Logout, &rest, "logout")?,
        "whoami" => no_args(SessionCmd::Whoami, &rest, "whoami")?,
        "accounts" => no_args(SessionCmd::Accounts, &rest, "accounts")?,
        "balance" => no_args(SessionCmd::Balance, &rest, "balance")?,
        "summary" => no_args(SessionCmd::Summary, &rest, "summary")?,
        "movements" => match rest[..] {
            [] => SessionCmd::Movements { sorted: false },
            ["sorted"] => SessionCmd::Movements { sorted: true },
            _ => return Err(anyhow!("Usage: movements [sorted]")),
        },
        "transfer" => match rest[..] {
            [to, amount] => SessionCmd::Transfer {
                to: to.to_string(),
                amount: parse_amount(amount)?,
            },
            _ => return Err(anyhow!("Usage: transfer <username> <amount>")),
        },
        "loan" => match rest[..] {
            [amount] => SessionCmd::Loan {
                amount: parse_amount(amount)?,
            },
            _ => return Err(anyhow!("Usage: loan <amount>")),
        },
        "close" => match rest[..] {
            [username, pin] => SessionCmd::Close {
                username: username.to_string(),
                pin: parse_pin(pin)?,
            },
            _ => return Err(anyhow!("Usage: close <username> <pin>")),
        },
        "help" => no_args(SessionCmd::Help, &rest, "help")?,
        "quit" | "exit" => no_args(SessionCmd::Quit, &rest, "quit")?,
        other => {
            return Err(anyhow!("Unknown command: {other}. Type 'help' for commands."));
        }
    };

    Ok(Some(cmd))
}

fn no_args(cmd: SessionCmd, rest: &[&str], name: &'static str) -> Result<SessionCmd> {
    if rest.is_empty() {
        Ok(cmd)
    } else {
        Err(anyhow!("Usage: {name}"))
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid amount: {raw}"))
}

fn parse_pin(raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .with_context(|| format!("Invalid pin: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_the_session_vocabulary() {
        assert_eq!(
            parse_session_line("login js 1111").unwrap(),
            Some(SessionCmd::Login {
                username: "js".to_string(),
                pin: 1111
            })
        );
        assert_eq!(
            parse_session_line("transfer jd 42.50").unwrap(),
            Some(SessionCmd::Transfer {
                to: "jd".to_string(),
                amount: dec!(42.50)
            })
        );
        assert_eq!(
            parse_session_line("movements sorted").unwrap(),
            Some(SessionCmd::Movements { sorted: true })
        );
        assert_eq!(parse_session_line("   \n").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines_with_usage_errors() {
        assert!(parse_session_line("login js").is_err());
        assert!(parse_session_line("login js abc").is_err());
        assert!(parse_session_line("transfer jd ten").is_err());
        assert!(parse_session_line("movements backwards").is_err());
        assert!(parse_session_line("dance").is_err());
    }
}
