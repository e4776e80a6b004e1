use crate::{PreviewInfo, StampCommand, StampUpdate};
use pdf_stamp::{
    DocumentCandidate, DocumentFailure, SelectionOrigin, Session, load_directory, load_files,
};
use tokio::sync::mpsc;

/// Async worker task that owns the session and answers every command with
/// exactly one update, in order
pub async fn worker_task(
    mut session: Session,
    mut command_rx: mpsc::UnboundedReceiver<StampCommand>,
    update_tx: mpsc::UnboundedSender<StampUpdate>,
) {
    while let Some(cmd) = command_rx.recv().await {
        let update = process_command(cmd, &mut session)
            .await
            .unwrap_or_else(|e| StampUpdate::Error {
                message: e.to_string(),
            });

        if update_tx.send(update).is_err() {
            log::debug!("Update receiver dropped, stopping worker");
            break;
        }
    }

    log::debug!("Worker stopped, revoking {} live handles", session.registry().live_count());
}

async fn process_command(
    cmd: StampCommand,
    session: &mut Session,
) -> pdf_stamp::Result<StampUpdate> {
    match cmd {
        StampCommand::Select { candidates, origin } => handle_select(session, candidates, origin),
        StampCommand::LoadFiles { paths } => {
            let candidates = load_files(paths.as_slice()).await?;
            handle_select(session, candidates, SelectionOrigin::Files)
        }
        StampCommand::LoadDirectory { path } => {
            let candidates = load_directory(&path).await?;
            handle_select(session, candidates, SelectionOrigin::Directory)
        }
        StampCommand::SetVariant { variant } => {
            session.set_variant(variant);
            Ok(StampUpdate::VariantChanged { variant })
        }
        StampCommand::GeneratePreviews => {
            let summary = session.preview().await?;
            Ok(StampUpdate::PreviewsGenerated {
                count: summary.stamped,
                failed: failed_names(&summary.failures),
                active: active_preview(session),
            })
        }
        StampCommand::Navigate { direction } => {
            session.advance(direction);
            Ok(StampUpdate::PreviewShown {
                preview: active_preview(session),
            })
        }
        StampCommand::ShowPreview { index } => {
            session.show_preview(index);
            Ok(StampUpdate::PreviewShown {
                preview: active_preview(session),
            })
        }
        StampCommand::Commit => {
            let summary = session.commit().await?;
            Ok(StampUpdate::Committed {
                count: summary.stamped,
                failed: failed_names(&summary.failures),
            })
        }
        StampCommand::Package => {
            let unit = session.download()?;
            log::info!("Packaged {} ({} bytes)", unit.name, unit.bytes.len());
            Ok(StampUpdate::Packaged { unit })
        }
        StampCommand::Clear => {
            session.clear();
            Ok(StampUpdate::Cleared)
        }
    }
}

fn handle_select(
    session: &mut Session,
    candidates: Vec<DocumentCandidate>,
    origin: SelectionOrigin,
) -> pdf_stamp::Result<StampUpdate> {
    session.select(candidates, origin)?;

    let sources = session.state().sources();
    Ok(StampUpdate::Selected {
        names: sources.iter().map(|s| s.name().to_string()).collect(),
        total_bytes: sources.iter().map(|s| s.size()).sum(),
    })
}

fn failed_names(failures: &[DocumentFailure]) -> Vec<String> {
    failures.iter().map(|f| f.source_name.clone()).collect()
}

fn active_preview(session: &Session) -> Option<PreviewInfo> {
    let previews = session.state().previews();
    let artifact = previews.active()?;
    let source_name = session
        .state()
        .sources()
        .get(artifact.source_index())
        .map(|s| s.name().to_string())
        .unwrap_or_default();

    Some(PreviewInfo {
        index: previews.active_index(),
        total: previews.len(),
        name: artifact.name().to_string(),
        source_name,
        handle: artifact.handle().id(),
    })
}
