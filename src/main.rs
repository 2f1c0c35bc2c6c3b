use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use prepsmart_client::api::PrepSmartApi;
use prepsmart_client::config::ClientConfig;
use prepsmart_client::crisis::TaskHandle;
use prepsmart_client::error::WizardError;
use prepsmart_client::progress::{DisplayModel, PlanTracker, PollOptions, TimeEstimate};
use prepsmart_client::session::{FileSessionStore, SessionStore, keys};
use prepsmart_client::wizard::WizardManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env()?;

    eprintln!("🛟 PrepSmart client v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Session: {}", config.session_dir.display());

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&config.session_dir));
    let api = Arc::new(PrepSmartApi::new(&config)?);

    // ── Submission (skipped when a job is already being tracked) ─────────
    let handle = match store.task_handle().await? {
        Some(handle) => {
            eprintln!("   Resuming task {handle}\n");
            handle
        }
        None => submit_saved_questionnaire(store.clone(), api.as_ref()).await?,
    };

    // ── Tracking ─────────────────────────────────────────────────────────
    let tracker = PlanTracker::new(api.clone(), PollOptions::from(&config));
    let session = tracker.session(handle.clone());

    let stopper = session.stopper();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping…");
            stopper.stop();
        }
    });

    let plan = tracker
        .track_stored(store.as_ref(), session, print_progress)
        .await
        .with_context(|| format!("Tracking task {handle} failed"))?;

    eprintln!("\n✅ Plan ready for {}", plan.task_id);
    if let Some(seconds) = plan.execution_time_seconds {
        eprintln!("   Generated in {seconds:.1}s");
    }

    // ── Artifact ─────────────────────────────────────────────────────────
    let path = api.save_pdf(&handle, Path::new("."), None).await?;
    eprintln!("   PDF saved to {}", path.display());

    store.remove(keys::TASK_ID).await?;
    Ok(())
}

/// Replay the questionnaire saved in the session through the wizard and
/// submit it.
async fn submit_saved_questionnaire(
    store: Arc<dyn SessionStore>,
    api: &PrepSmartApi,
) -> anyhow::Result<TaskHandle> {
    let Some(mut wizard) = WizardManager::resume(store).await? else {
        anyhow::bail!(
            "No questionnaire found in the session. Save a wizard record under the '{}' key first.",
            keys::FORM_DATA
        );
    };

    let mode = wizard.state().crisis_mode();
    while !wizard.state().current_step().is_review() {
        let step = wizard.state().current_step();
        wizard.next().await.with_context(|| {
            format!(
                "Step {} ({}) is incomplete: {:?}",
                step.number(),
                step.title(mode),
                wizard.state().invalid_fields()
            )
        })?;
        eprintln!("   ✓ {}", step.title(mode));
        for hint in wizard.state().hints() {
            eprintln!("   ⚠ {hint}");
        }
    }

    if let Some(summary) = wizard.state().summary() {
        eprintln!("{summary}");
    }

    let handle = match wizard.submit(api).await {
        Ok(handle) => handle,
        // The job is running; only a restart would lose track of it.
        Err(WizardError::HandleNotPersisted { handle, source }) => {
            eprintln!("   ⚠ Task handle not saved ({source}); keep this process running");
            handle
        }
        Err(e) => return Err(e.into()),
    };
    eprintln!("   Submitted as task {handle}\n");
    Ok(handle)
}

fn print_progress(model: &DisplayModel) {
    let eta = match model.time_estimate {
        TimeEstimate::Hidden => String::new(),
        ref estimate => format!(" ({estimate})"),
    };
    eprintln!("{} {}{}", model.percentage_label, model.progress_label, eta);
    for card in model.agents.iter().filter(|c| c.live_description) {
        eprintln!("   {} {}: {}", card.icon, card.name, card.description);
    }
    if let Some(error) = &model.error {
        eprintln!("   ✗ {error}");
    }
}
