use std::{sync::Arc, time::Duration};

use anyhow::{Context, bail};
use backend::{ApiClient, AuthApi, SignalsApi};
use chrono::Utc;
use common::{
    config::AppConfig,
    models::{ActionAck, ActionPayload, Filter, SignalId},
};
use review::{DetailPanel, ReviewController};
use tracing::{info, warn};

use crate::{cli::Command, render};

type Controller = ReviewController<SignalsApi>;

fn controller(client: ApiClient, filter: Filter) -> Controller {
    ReviewController::with_filter(Arc::new(SignalsApi::new(client)), filter)
}

pub async fn run(command: Command, client: ApiClient, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            AuthApi::new(client)
                .login(&username, &password)
                .await
                .context("Login failed")?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            AuthApi::new(client).logout().context("Logout failed")?;
            println!("Logged out");
        }
        Command::Health => {
            let body = AuthApi::new(client)
                .health()
                .await
                .context("Health check failed")?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::RefreshActive => {
            let body = SignalsApi::new(client)
                .update_active()
                .await
                .context("Failed to refresh active signals")?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::List { filter } => list(controller(client, filter)).await?,
        Command::Show { id } => show(controller(client, Filter::Pending), SignalId(id)).await?,
        Command::Approve {
            id,
            reason,
            execute,
        } => {
            let mut payload = ActionPayload::with_reason(reason.unwrap_or_default());
            if execute {
                payload = payload.executing(true);
            }
            let controller = controller(client, Filter::Pending);
            decide(&controller, SignalId(id), payload, true).await?;
        }
        Command::Reject { id, reason } => {
            let payload = ActionPayload::with_reason(reason.unwrap_or_default());
            let controller = controller(client, Filter::Pending);
            decide(&controller, SignalId(id), payload, false).await?;
        }
        Command::Watch {
            filter,
            interval_secs,
        } => {
            let interval = interval_secs
                .map(Duration::from_secs)
                .unwrap_or(config.poll_interval);
            watch(controller(client, filter), interval).await?;
        }
    }
    Ok(())
}

async fn list(controller: Controller) -> anyhow::Result<()> {
    controller.refresh().await;
    let state = controller.snapshot().await;
    if let Some(error) = state.last_error {
        bail!("Error fetching signals: {}", error);
    }
    print!("{}", render::signal_table(&state.signals));
    Ok(())
}

async fn show(controller: Controller, id: SignalId) -> anyhow::Result<()> {
    controller.refresh().await;
    let Some(panel) = DetailPanel::open(controller, id).await else {
        bail!("Signal {} not found", id);
    };
    print!(
        "{}",
        render::signal_detail(
            panel.signal(),
            panel.context_pretty().as_deref(),
            panel.actions_visible()
        )
    );
    Ok(())
}

async fn decide(
    controller: &Controller,
    id: SignalId,
    payload: ActionPayload,
    approve: bool,
) -> anyhow::Result<()> {
    controller.refresh().await;
    if controller.snapshot().await.find(id).is_none() {
        warn!("Signal {} is not in the pending list, sending anyway", id);
    }

    let (verb, result) = if approve {
        ("Approve", controller.approve(id, payload).await)
    } else {
        ("Reject", controller.reject(id, payload).await)
    };
    let ack = result.with_context(|| format!("{} of signal {} failed", verb, id))?;

    println!("{}", describe_ack(verb, id, &ack));
    Ok(())
}

fn describe_ack(verb: &str, id: SignalId, ack: &ActionAck) -> String {
    let mut line = format!(
        "{} of signal {}: {}",
        verb,
        id,
        ack.status.as_deref().unwrap_or("ok")
    );
    if let Some(message) = &ack.message {
        line.push_str(&format!(" ({})", message));
    }
    if let Some(order_id) = ack.order_id {
        line.push_str(&format!(", order #{}", order_id));
    }
    if let Some(position_id) = ack.position_id {
        line.push_str(&format!(", position #{}", position_id));
    }
    line
}

async fn watch(controller: Controller, interval: Duration) -> anyhow::Result<()> {
    let mut revisions = controller.subscribe();
    let handle = controller.start_polling(interval);
    let filter = controller.filter().await;
    info!("Watching {} signals every {:?}", filter, interval);

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = controller.snapshot().await;
                if !state.loading {
                    print!("{}", render::watch_frame(&state, Utc::now()));
                }
            }
        }
    }

    handle.stop().await;
    info!("Stopped watching");
    Ok(())
}
