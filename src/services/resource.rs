use std::marker::PhantomData;

use serde::Serialize;

use crate::api::{
    Certification, Envelope, Project, Resource, Technology, Testimonial, WorkExperience,
};
use crate::client::ApiClient;
use crate::error::ClientResult;

/// The list/create/update/delete contract for one resource kind.
///
/// Every call is a fresh round trip and returns the raw envelope; checking
/// `success` is up to the caller.
pub struct ResourceService<R: Resource> {
    client: ApiClient,
    _kind: PhantomData<fn() -> R>,
}

pub type WorkExperienceService = ResourceService<WorkExperience>;
pub type TestimonialService = ResourceService<Testimonial>;
pub type CertificationService = ResourceService<Certification>;
pub type ProjectService = ResourceService<Project>;
pub type TechnologyService = ResourceService<Technology>;

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        R::PATH
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn get_all(&self) -> ClientResult<Envelope<Vec<R>>> {
        self.client.get(R::PATH).await
    }

    pub async fn create<B>(&self, fields: &B) -> ClientResult<Envelope<R>>
    where
        B: Serialize + ?Sized,
    {
        self.client.post(R::PATH, fields).await
    }

    pub async fn update<B>(&self, id: &str, fields: &B) -> ClientResult<Envelope<R>>
    where
        B: Serialize + ?Sized,
    {
        self.client.put(&record_path(R::PATH, id), fields).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<Envelope<()>> {
        self.client.delete(&record_path(R::PATH, id)).await
    }
}

/// `{collection}/{id}`; the id is opaque and passed through as given
pub(crate) fn record_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}
