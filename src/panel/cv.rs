use crate::api::{CvFile, Envelope};
use crate::error::{ClientError, ClientResult};
use crate::services::{CvService, UploadFile};

use super::{load_failed, Confirm, PanelMessage};

/// CV screen: list, upload, delete
pub struct CvPanel {
    service: CvService,
    items: Vec<CvFile>,
    message: Option<PanelMessage>,
}

impl CvPanel {
    pub fn new(service: CvService) -> Self {
        Self {
            service,
            items: Vec::new(),
            message: None,
        }
    }

    pub fn service(&self) -> &CvService {
        &self.service
    }

    pub fn items(&self) -> &[CvFile] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&CvFile> {
        self.items.iter().find(|cv| cv.id == id)
    }

    pub fn message(&self) -> Option<&PanelMessage> {
        self.message.as_ref()
    }

    pub async fn refresh(&mut self) -> ClientResult<&[CvFile]> {
        let outcome = self
            .service
            .get_all()
            .await
            .and_then(|envelope| envelope.into_data(&load_failed("CV")));

        match outcome {
            Ok(items) => {
                self.items = items;
                Ok(&self.items)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn upload(&mut self, file: UploadFile) -> ClientResult<Envelope<CvFile>> {
        self.message = None;

        let result = self
            .service
            .upload(file)
            .await
            .and_then(|env| env.ensure_success("Failed to upload"));
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.fail(e)),
        };

        tracing::info!("CV uploaded");
        let reload = self.reload().await;
        self.message = Some(PanelMessage::saved("CV uploaded successfully".to_string(), reload));
        Ok(envelope)
    }

    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> ClientResult<bool> {
        if !confirm.confirm("Delete this CV?") {
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

        let reload = self.reload().await;
        self.message = Some(PanelMessage::saved("CV deleted successfully".to_string(), reload));
        Ok(true)
    }

    async fn reload(&mut self) -> ClientResult<()> {
        let outcome = self.refresh().await.map(|_| ());
        if let Err(e) = &outcome {
            tracing::warn!("Reloading CV list failed: {}", e);
        }
        outcome
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        self.message = Some(PanelMessage::error(error.message()));
        error
    }
}
