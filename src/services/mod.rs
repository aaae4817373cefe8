pub mod auth;
pub mod cv;
pub mod resource;

pub use auth::{AuthService, Credentials};
pub use cv::{CvService, UploadFile};
pub use resource::{
    CertificationService, ProjectService, ResourceService, TechnologyService, TestimonialService,
    WorkExperienceService,
};
