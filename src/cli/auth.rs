//! Session CLI commands: login, logout, whoami

use crate::config::Settings;
use crate::error::{AsedexError, AsedexResult};
use crate::services::AuthService;
use crate::storage::Storage;

/// Log in, prompting for whatever was not given on the command line
pub fn handle_login(
    storage: &Storage,
    settings: &Settings,
    username: Option<String>,
    password: Option<String>,
) -> AsedexResult<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| AsedexError::Auth(format!("Failed to read password: {}", e)))?,
    };

    if AuthService::new(storage, settings).login(&username, &password)? {
        println!("Logged in as {}", username.trim());
        Ok(())
    } else {
        Err(AsedexError::Auth("Invalid username or password".into()))
    }
}

pub fn handle_logout(storage: &Storage, settings: &Settings) -> AsedexResult<()> {
    AuthService::new(storage, settings).logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn handle_whoami(storage: &Storage, settings: &Settings) -> AsedexResult<()> {
    let state = AuthService::new(storage, settings).state()?;
    match (state.is_authenticated, state.username) {
        (true, Some(username)) => match state.logged_in_at {
            Some(at) => println!("{} (since {})", username, at.format("%Y-%m-%d %H:%M UTC")),
            None => println!("{}", username),
        },
        _ => println!("Not logged in."),
    }
    Ok(())
}

fn prompt_line(prompt: &str) -> AsedexResult<String> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| AsedexError::Io(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| AsedexError::Io(e.to_string()))?;
    Ok(line.trim().to_string())
}
