//! Account commands - login, logout and status against the stored session

use crate::output;
use anyhow::{Context, Result};
use ecoroute_api_client::{ClientConfig, EcoRouteClient, RegisterRequest};
use ecoroute_core::config::ConfigSchema;
use ecoroute_session::{FileStore, Session, SessionData, SessionState};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::env;

fn open_session(schema: &ConfigSchema) -> Result<Session<FileStore>> {
    let path = schema
        .session
        .store_path
        .as_ref()
        .map(Into::into)
        .unwrap_or_else(FileStore::default_path);
    let store = FileStore::open(&path)
        .with_context(|| format!("failed to open session store at {}", path.display()))?;

    let session = Session::new(store, None).with_default_points(schema.session.default_points);
    session.hydrate();
    Ok(session)
}

fn client_config(schema: &ConfigSchema) -> Result<ClientConfig> {
    if env::var_os("ECOROUTE_API_URL").is_some() {
        return Ok(ClientConfig::from_env()?);
    }
    Ok(ClientConfig::from(&schema.api))
}

#[derive(Serialize)]
struct StatusOutput<'a> {
    signed_in: bool,
    #[serde(flatten)]
    data: &'a SessionData,
    level: String,
    level_progress: f64,
}

fn print_profile(data: &SessionData) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("  Name:     {}", field(&data.name).bold());
    println!("  Email:    {}", field(&data.email));
    println!("  Role:     {}", field(&data.role));
    println!("  Phone:    {}", field(&data.phone));
    println!("  Address:  {}", field(&data.address));
    println!("  Sector:   {}", field(&data.sector));
    println!("  Points:   {}", data.points.to_string().cyan());
    println!("  Pickups:  {}", data.pickup_count.to_string().cyan());
}

pub async fn login(email: &str, password: &str, schema: &ConfigSchema, json: bool) -> Result<()> {
    let client = EcoRouteClient::with_config(client_config(schema)?)?;
    let session = open_session(schema)?;

    let data = session
        .sign_in(&client, email, password)
        .await
        .context("sign in failed")?;

    if json {
        return output::json_pretty(&StatusOutput {
            signed_in: true,
            data: &data,
            level: session.citizen_level().to_string(),
            level_progress: session.level_progress(),
        });
    }

    println!("{} Signed in", "✓".green());
    println!();
    print_profile(&data);
    Ok(())
}

pub async fn register(request: &RegisterRequest, schema: &ConfigSchema, json: bool) -> Result<()> {
    let client = EcoRouteClient::with_config(client_config(schema)?)?;
    let created = client
        .auth()
        .register(request)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("registration failed")?;

    if json {
        return output::json_pretty(&created);
    }

    println!(
        "{} Account created for {} <{}>",
        "✓".green(),
        created.username.bold(),
        created.email
    );
    println!("  Sign in with: ecoroute-sim login --email {}", created.email);
    Ok(())
}

pub fn logout(schema: &ConfigSchema) -> Result<()> {
    let session = open_session(schema)?;
    session.sign_out();
    println!("{} Signed out", "✓".green());
    Ok(())
}

pub fn status(schema: &ConfigSchema, json: bool) -> Result<()> {
    let session = open_session(schema)?;
    let data = session.data();
    let signed_in = session.state() == SessionState::SignedIn;

    if json {
        return output::json_pretty(&StatusOutput {
            signed_in,
            data: &data,
            level: session.citizen_level().to_string(),
            level_progress: session.level_progress(),
        });
    }

    output::header("👤 Session");
    if !signed_in {
        println!("  {}", "Not signed in".yellow());
        println!();
        return Ok(());
    }

    print_profile(&data);
    println!(
        "  Level:    {} ({:.0}% to next)",
        session.citizen_level().to_string().green(),
        session.level_progress() * 100.0
    );
    println!();
    Ok(())
}
