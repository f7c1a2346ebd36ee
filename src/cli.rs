//! Administrative command-line surface.
//!
//! The binary serves HTTP when invoked without a subcommand; user management
//! is only reachable here, never through the API. Passwords are prompted on
//! the terminal with echo replaced by asterisks, never taken as arguments.

use std::io::Write;

use clap::{Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use sqlx::PgPool;

use crate::auth::{is_valid_username, password::hash_password, repo::User};
use crate::error::ApiError;

#[derive(Parser, Debug)]
#[command(name = "codestash")]
#[command(about = "Discount code stash backend", long_about = None)]
pub struct Cli {
    /// Subcommand to run (if none, starts the server).
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a user (prompts for the password).
    CreateUser {
        #[arg(long)]
        username: String,
    },
    /// Reset an existing user's password (prompts for the new password).
    ResetPassword {
        #[arg(long)]
        username: String,
    },
}

pub async fn run(command: Command, db: &PgPool) -> anyhow::Result<()> {
    match command {
        Command::CreateUser { username } => {
            if !is_valid_username(&username) {
                eprintln!("invalid username: {username}");
                std::process::exit(2);
            }

            let password = prompt_password_twice()?;
            let hash = hash_password(&password)?;

            match User::create(db, &username, &hash).await {
                Ok(user) => println!("created user: {} ({})", user.username, user.id),
                Err(ApiError::DuplicateUser) => {
                    eprintln!("user already exists: {username}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::ResetPassword { username } => {
            let password = prompt_password_twice()?;
            let hash = hash_password(&password)?;

            match User::set_password_hash(db, &username, &hash).await {
                Ok(()) => println!("password reset for: {username}"),
                Err(ApiError::NotFound(_)) => {
                    eprintln!("user not found: {username}");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                anyhow::bail!("interrupted");
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> anyhow::Result<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    anyhow::bail!("too many attempts")
}
