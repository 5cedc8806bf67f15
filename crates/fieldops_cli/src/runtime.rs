//! Background work for the console: location lookups, photo reads and
//! delayed chat replies. Every task reports back through one channel and the
//! owner loop applies the result to the controller.

use fieldops_core::chat::{ChatSessionId, PendingReply};
use fieldops_core::config::Config;
use fieldops_core::error::AppError;
use fieldops_core::geolocation::{
    FailingPosition, FixedPosition, GeolocationError, GeolocationProvider,
};
use fieldops_core::model::Coordinates;
use fieldops_core::photo::{encode_data_url, image_mime_for_path};
use fieldops_core::task_form::{FormId, LocationRequest};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub enum AppEvent {
    LocationResolved {
        request: LocationRequest,
        outcome: Result<Coordinates, GeolocationError>,
    },
    PhotoLoaded {
        form: FormId,
        path: PathBuf,
        result: Result<String, AppError>,
    },
    ChatReplyDue(PendingReply),
}

/// What a background task belongs to. Closing the owner aborts its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOwner {
    Form(FormId),
    Chat(ChatSessionId),
}

#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Vec<(TaskOwner, JoinHandle<()>)>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, owner: TaskOwner, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.prune();
        self.tasks.push((owner, tokio::spawn(task)));
    }

    /// Aborts every task of `owner` and returns how many were still running.
    pub fn abort_owner(&mut self, owner: TaskOwner) -> usize {
        let mut aborted = 0;
        self.tasks.retain(|(task_owner, handle)| {
            if *task_owner != owner {
                return true;
            }
            if !handle.is_finished() {
                aborted += 1;
            }
            handle.abort();
            false
        });

        if aborted > 0 {
            tracing::debug!(?owner, aborted, "aborted background tasks");
        }
        aborted
    }

    pub fn abort_all(&mut self) {
        for (_, handle) in self.tasks.drain(..) {
            handle.abort();
        }
    }

    pub fn prune(&mut self) {
        self.tasks.retain(|(_, handle)| !handle.is_finished());
    }

    pub fn is_idle(&mut self) -> bool {
        self.prune();
        self.tasks.is_empty()
    }

    pub fn running(&mut self) -> usize {
        self.prune();
        self.tasks.len()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// The simulated device described by the configuration.
pub fn device_from_config(config: &Config) -> Arc<dyn GeolocationProvider> {
    match config.geolocation_outcome() {
        Ok(position) => Arc::new(FixedPosition(position)),
        Err(error) => Arc::new(FailingPosition(error)),
    }
}

/// Runs the provider off the owner loop, bounded by the request timeout.
pub fn spawn_location_lookup(
    tasks: &mut BackgroundTasks,
    tx: &UnboundedSender<AppEvent>,
    provider: Arc<dyn GeolocationProvider>,
    request: LocationRequest,
) {
    let tx = tx.clone();
    tasks.spawn(TaskOwner::Form(request.form), async move {
        let options = request.options;
        let lookup = tokio::task::spawn_blocking(move || provider.current_position(&options));
        let outcome = match tokio::time::timeout(options.timeout, lookup).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "location lookup panicked");
                Err(GeolocationError::PositionUnavailable)
            }
            Err(_) => Err(GeolocationError::Timeout),
        };
        let _ = tx.send(AppEvent::LocationResolved { request, outcome });
    });
}

/// Checks the file type up front, then reads the file in the background.
pub fn spawn_photo_load(
    tasks: &mut BackgroundTasks,
    tx: &UnboundedSender<AppEvent>,
    form: FormId,
    path: PathBuf,
) -> Result<(), AppError> {
    let mime = image_mime_for_path(&path)?;
    let tx = tx.clone();
    tasks.spawn(TaskOwner::Form(form), async move {
        let result = tokio::fs::read(&path)
            .await
            .map(|bytes| encode_data_url(mime, &bytes))
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)));
        let _ = tx.send(AppEvent::PhotoLoaded { form, path, result });
    });
    Ok(())
}

pub fn spawn_chat_reply(
    tasks: &mut BackgroundTasks,
    tx: &UnboundedSender<AppEvent>,
    reply: PendingReply,
) {
    let tx = tx.clone();
    tasks.spawn(TaskOwner::Chat(reply.session), async move {
        tokio::time::sleep(reply.delay).await;
        let _ = tx.send(AppEvent::ChatReplyDue(reply));
    });
}
