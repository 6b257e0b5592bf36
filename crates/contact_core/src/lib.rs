use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::Duration,
};

use shared::{
    domain::{ContactSnapshot, FieldKey, FormFields, SubmissionState},
    error::ContactFormError,
    protocol::RelaySubmission,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::AbortHandle,
};
use tracing::{debug, info, warn};

pub mod relay;

pub use relay::{HttpRelay, MessageRelay};

/// How long the sent confirmation stays up before the form resets.
pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub revert_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            revert_delay: DEFAULT_REVERT_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    StateChanged(SubmissionState),
    FieldUpdated { key: FieldKey, value: String },
}

struct ViewState {
    fields: FormFields,
    state: SubmissionState,
    mounted: bool,
}

/// Owns the fields and submission lifecycle of one contact view.
///
/// Every transition happens under a single lock that is released while the
/// relay call is outstanding; the `Submitting` state alone keeps a second
/// submission from starting.
pub struct ContactFormController {
    relay: Arc<dyn MessageRelay>,
    revert_delay: Duration,
    inner: Arc<Mutex<ViewState>>,
    // Kept outside `inner` so `Drop` can always reach it.
    revert_task: StdMutex<Option<AbortHandle>>,
    events: broadcast::Sender<ContactEvent>,
}

impl ContactFormController {
    pub fn mount(relay: Arc<dyn MessageRelay>, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(64);
        debug!(
            revert_delay_ms = options.revert_delay.as_millis() as u64,
            "contact view mounted"
        );
        Self {
            relay,
            revert_delay: options.revert_delay,
            inner: Arc::new(Mutex::new(ViewState {
                fields: FormFields::default(),
                state: SubmissionState::Idle,
                mounted: true,
            })),
            revert_task: StdMutex::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContactEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ContactSnapshot {
        let view = self.inner.lock().await;
        ContactSnapshot {
            fields: view.fields.clone(),
            state: view.state.clone(),
        }
    }

    pub async fn is_mounted(&self) -> bool {
        self.inner.lock().await.mounted
    }

    pub async fn update_field(
        &self,
        key: FieldKey,
        value: impl Into<String>,
    ) -> Result<(), ContactFormError> {
        let mut view = self.inner.lock().await;
        if !view.mounted {
            return Err(ContactFormError::Unmounted);
        }
        if !view.state.is_editable() {
            return Err(ContactFormError::FormLocked(view.state.label()));
        }
        // Any keystroke dismisses a previous error before the edit lands.
        if matches!(view.state, SubmissionState::Failed(_)) {
            set_state(&mut view, &self.events, SubmissionState::Idle);
        }

        let value = value.into();
        view.fields.set(key, value.clone());
        let _ = self.events.send(ContactEvent::FieldUpdated { key, value });
        Ok(())
    }

    pub async fn update_field_by_name(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ContactFormError> {
        let key = name.parse::<FieldKey>()?;
        self.update_field(key, value).await
    }

    /// Sends the current fields to the relay and returns the state it settled in.
    ///
    /// Relay failures never surface as `Err`; they become `Failed(message)`.
    pub async fn submit(&self) -> Result<SubmissionState, ContactFormError> {
        let submission = {
            let mut view = self.inner.lock().await;
            if !view.mounted {
                return Err(ContactFormError::Unmounted);
            }
            match view.state {
                SubmissionState::Submitting => return Err(ContactFormError::SubmissionInProgress),
                SubmissionState::Submitted => {
                    return Err(ContactFormError::FormLocked(view.state.label()))
                }
                SubmissionState::Idle | SubmissionState::Failed(_) => {}
            }
            view.fields.validate()?;
            set_state(&mut view, &self.events, SubmissionState::Submitting);
            RelaySubmission::from(&view.fields)
        };

        info!(
            subject_len = submission.subject.len(),
            message_len = submission.message.len(),
            "sending contact message to relay"
        );
        let result = self.relay.send(&submission).await;

        let mut view = self.inner.lock().await;
        if !view.mounted {
            info!("discarding relay response for unmounted contact view");
            return Err(ContactFormError::Unmounted);
        }

        let next = match result {
            Ok(()) => {
                info!("contact message delivered");
                view.fields.clear();
                self.schedule_revert();
                SubmissionState::Submitted
            }
            Err(err) => {
                warn!("contact message was not delivered: {err}");
                SubmissionState::Failed(err.user_message())
            }
        };
        set_state(&mut view, &self.events, next.clone());
        Ok(next)
    }

    /// Tears the view down. Pending resets are cancelled and late relay
    /// responses are dropped.
    pub async fn unmount(&self) {
        let mut view = self.inner.lock().await;
        if !view.mounted {
            return;
        }
        view.mounted = false;
        if self.cancel_revert() {
            debug!("cancelled pending contact form reset");
        }
        info!(state = view.state.label(), "contact view unmounted");
    }

    fn schedule_revert(&self) {
        self.cancel_revert();

        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();
        let delay = self.revert_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut view = inner.lock().await;
            if !view.mounted || view.state != SubmissionState::Submitted {
                return;
            }
            set_state(&mut view, &events, SubmissionState::Idle);
            debug!("contact form reset after confirmation");
        });
        *self
            .revert_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task.abort_handle());
    }

    /// Aborts the pending reset, returning whether one was scheduled.
    fn cancel_revert(&self) -> bool {
        let pending = self
            .revert_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ContactFormController {
    fn drop(&mut self) {
        self.cancel_revert();
        if let Ok(mut view) = self.inner.try_lock() {
            view.mounted = false;
        }
    }
}

fn set_state(
    view: &mut ViewState,
    events: &broadcast::Sender<ContactEvent>,
    next: SubmissionState,
) {
    if view.state == next {
        return;
    }
    debug!(from = view.state.label(), to = next.label(), "contact form state change");
    view.state = next.clone();
    let _ = events.send(ContactEvent::StateChanged(next));
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
