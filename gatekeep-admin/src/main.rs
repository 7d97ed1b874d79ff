// Copyright 2026 S4Core Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gatekeep Admin - Main entry point.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Password;
use gatekeep_admin::{open_store, App, Cli};
use gatekeep_iam::{PasswordPolicy, PasswordSettings};
use tracing::debug;

fn prompt_password() -> Result<(String, String)> {
    // dialoguer re-prompts until both entries agree
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("failed to read password")?;
    Ok((password.clone(), password))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "gatekeep_iam=info,gatekeep_admin=info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Running admin command");

    let policy = PasswordPolicy::from_settings(&PasswordSettings::from_env()?)
        .context("invalid password policy settings")?;
    let store = open_store(&cli.database_url)?;
    let app = App::new(store).with_policy(policy);

    let output = app.run(cli.command, prompt_password).await?;
    println!("{}", output);

    Ok(())
}
