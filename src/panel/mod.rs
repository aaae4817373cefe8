//! Headless CRUD panels: the list/form state behind each admin screen.
//!
//! A panel owns its list and a transient message. Mutations validate first,
//! go through the resource service, and re-fetch the list once on success.
//! Methods take `&mut self`, so a panel never has two requests in flight.

pub mod cv;

pub use cv::CvPanel;

use serde::Serialize;

use crate::api::{Envelope, Resource};
use crate::error::{ClientError, ClientResult};
use crate::services::ResourceService;
use crate::validation::{validate_form, FormMode};

/// Guard for irreversible actions
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    /// The mutation went through but a follow-up step did not
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl PanelMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
        }
    }

    /// Outcome message for a mutation the server accepted, given how the
    /// reload that followed it went
    pub fn saved(text: String, reload: ClientResult<()>) -> Self {
        match reload {
            Ok(()) => Self::success(text),
            Err(e) => Self::warning(format!(
                "{}, but the list could not be reloaded: {}",
                text,
                e.message()
            )),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

pub struct CrudPanel<R: Resource> {
    service: ResourceService<R>,
    items: Vec<R>,
    editing: Option<String>,
    message: Option<PanelMessage>,
}

impl<R: Resource> CrudPanel<R> {
    pub fn new(service: ResourceService<R>) -> Self {
        Self {
            service,
            items: Vec::new(),
            editing: None,
            message: None,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn message(&self) -> Option<&PanelMessage> {
        self.message.as_ref()
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Switch the form to update mode for `id`
    pub fn begin_edit(&mut self, id: impl Into<String>) {
        self.editing = Some(id.into());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn refresh(&mut self) -> ClientResult<&[R]> {
        let outcome = self
            .service
            .get_all()
            .await
            .and_then(|envelope| envelope.into_data(&load_failed(R::LABEL)));

        match outcome {
            Ok(items) => {
                self.items = items;
                Ok(&self.items)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create, or update the record being edited, then reload the list.
    ///
    /// Once the server accepts the change the envelope is returned even if
    /// the reload fails; the message then carries a warning.
    pub async fn submit<B>(&mut self, fields: &B) -> ClientResult<Envelope<R>>
    where
        B: Serialize + ?Sized,
    {
        self.message = None;

        let mut form = serde_json::to_value(fields)
            .map_err(|e| ClientError::field("form", format!("unreadable form: {}", e)))?;
        R::normalize_form(&mut form);
        let mode = if self.editing.is_some() {
            FormMode::Update
        } else {
            FormMode::Create
        };
        if let Err(e) = validate_form::<R>(&form, mode) {
            return Err(self.fail(e));
        }

        let result = match &self.editing {
            Some(id) => self.service.update(id, &form).await,
            None => self.service.create(&form).await,
        };

        let envelope = match result.and_then(|env| env.ensure_success("Failed to save")) {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.fail(e)),
        };

        let verb = match mode {
            FormMode::Update => "updated",
            FormMode::Create => "created",
        };
        tracing::info!("{} {}", capitalize(R::LABEL), verb);
        self.editing = None;
        let reload = self.reload().await;
        self.message = Some(PanelMessage::saved(
            format!("{} {} successfully", capitalize(R::LABEL), verb),
            reload,
        ));
        Ok(envelope)
    }

    /// Delete after confirmation. `Ok(false)` means the user declined and
    /// nothing was sent.
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> ClientResult<bool> {
        if !confirm.confirm(&format!("Delete this {}?", R::LABEL)) {
            return Ok(false);
        }

        self.message = None;
        let result = self
            .service
            .delete(id)
            .await
            .and_then(|env| env.ensure_success("Failed to delete"));
        if let Err(e) = result {
            return Err(self.fail(e));
        }

        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        let reload = self.reload().await;
        self.message = Some(PanelMessage::saved(
            format!("{} deleted successfully", capitalize(R::LABEL)),
            reload,
        ));
        Ok(true)
    }

    /// Refresh after an accepted mutation; the failure is reported, not raised
    async fn reload(&mut self) -> ClientResult<()> {
        let outcome = self.refresh().await.map(|_| ());
        if let Err(e) = &outcome {
            tracing::warn!("Reloading {} list failed: {}", R::LABEL, e);
        }
        outcome
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        self.message = Some(PanelMessage::error(error.message()));
        error
    }
}

pub(crate) fn load_failed(label: &str) -> String {
    format!("Failed to load {} list", label)
}

pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
