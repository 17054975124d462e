mod authenticator;

use std::{process::ExitCode, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use passkey_ceremony::{CeremonyFlows, CeremonyKind};

use crate::authenticator::CommandAuthenticator;

const USAGE: &str = "Usage: demo-ceremony <register|authenticate|both> <identity>";

fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!("passkey_ceremony=debug,{app_name}=debug,info").into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn kinds_for(command: &str) -> Option<Vec<CeremonyKind>> {
    match command {
        "register" => Some(vec![CeremonyKind::Registration]),
        "authenticate" => Some(vec![CeremonyKind::Authentication]),
        "both" => Some(vec![
            CeremonyKind::Registration,
            CeremonyKind::Authentication,
        ]),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_ceremony");

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(identity)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    };
    let Some(kinds) = kinds_for(&command) else {
        eprintln!("Unknown command '{command}'\n{USAGE}");
        return Ok(ExitCode::from(2));
    };

    let authenticator = Arc::new(CommandAuthenticator::from_env()?);
    let flows = CeremonyFlows::from_env(authenticator)?;

    let mut all_passed = true;
    for kind in kinds {
        let report = flows.run(kind, identity.as_str()).await?;
        println!("{kind} for {identity}: {}", report.status_text());
        println!("{}", report.trace_text());
        all_passed &= report.passed();
    }

    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
