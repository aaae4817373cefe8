pub mod envelope;
pub mod models;

pub use envelope::Envelope;
pub use models::{
    Certification, CertificationFields, CvFile, Project, ProjectFields, Resource, Technology,
    TechnologyFields, Testimonial, TestimonialFields, WorkExperience, WorkExperienceFields,
};
pub use models::{format_file_size, split_points, split_technologies};
