mod common;

use anyhow::Result;
use portfolio_admin::api::*;
use portfolio_admin::services::ResourceService;
use serde::Serialize;
use serde_json::json;

use common::MockApi;

async fn round_trip<R: Resource>(mock: &MockApi, fields: &impl Serialize) -> Result<()> {
    let store = common::logged_in_store();
    let service: ResourceService<R> = ResourceService::new(common::client(&mock.config(), &store)?);

    let created = service.create(fields).await?;
    assert!(created.success, "{} create refused", R::LABEL);
    let id = created.id.expect("create returns the new id");

    let all = service.get_all().await?.into_data("load")?;
    let record = all
        .iter()
        .find(|record| record.id() == id)
        .unwrap_or_else(|| panic!("created {} missing from list", R::LABEL));

    let sent = serde_json::to_value(fields)?;
    let listed = serde_json::to_value(record)?;
    for (key, value) in sent.as_object().unwrap() {
        assert_eq!(&listed[key], value, "{}.{}", R::LABEL, key);
    }
    Ok(())
}

#[tokio::test]
async fn created_records_show_up_in_listing() -> Result<()> {
    let mock = MockApi::start().await?;

    round_trip::<WorkExperience>(&mock, &WorkExperienceFields {
        title: "Backend Engineer".into(),
        company: "Acme".into(),
        duration: "2021 - 2024".into(),
        points: vec!["Built the billing pipeline".into()],
    })
    .await?;
    round_trip::<Testimonial>(&mock, &TestimonialFields {
        name: "Ada".into(),
        role: "CTO".into(),
        content: "Reliable and fast".into(),
        image: None,
    })
    .await?;
    round_trip::<Certification>(&mock, &CertificationFields {
        title: "CKA".into(),
        description: "Certified Kubernetes Administrator".into(),
        link: Some("https://example.com/cka".into()),
        image: None,
    })
    .await?;
    round_trip::<Project>(&mock, &ProjectFields {
        name: "Folio".into(),
        description: "Portfolio admin".into(),
        technologies: vec!["Rust".into(), "React".into()],
        github: Some("https://github.com/example/folio".into()),
        demo: None,
        image: None,
    })
    .await?;
    round_trip::<Technology>(&mock, &TechnologyFields { name: "Rust".into() }).await?;

    Ok(())
}

#[tokio::test]
async fn each_kind_targets_its_own_collection() -> Result<()> {
    let mock = MockApi::start().await?;
    let store = common::logged_in_store();
    let client = common::client(&mock.config(), &store)?;

    ResourceService::<WorkExperience>::new(client.clone()).get_all().await?;
    ResourceService::<Testimonial>::new(client.clone()).get_all().await?;
    ResourceService::<Certification>::new(client.clone()).get_all().await?;
    ResourceService::<Project>::new(client.clone()).get_all().await?;
    ResourceService::<Technology>::new(client).get_all().await?;

    let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "admin/work-experiences",
            "admin/testimonials",
            "admin/certifications",
            "admin/projects",
            "admin/technologies",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn update_sends_only_the_given_fields() -> Result<()> {
    let mock = MockApi::start().await?;
    let id = mock.seed("projects", json!({
        "name": "Folio",
        "description": "Portfolio admin",
        "technologies": ["Rust"],
    }));
    let store = common::logged_in_store();
    let service = ResourceService::<Project>::new(common::client(&mock.config(), &store)?);

    let envelope = service.update(&id, &json!({ "description": "Rewritten" })).await?;
    assert!(envelope.success);

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, format!("admin/projects/{}", id));
    assert_eq!(request.json(), Some(json!({ "description": "Rewritten" })));

    let stored = &mock.records("projects")[0];
    assert_eq!(stored["description"], "Rewritten");
    assert_eq!(stored["name"], "Folio");
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_record() -> Result<()> {
    let mock = MockApi::start().await?;
    let id = mock.seed("technologies", json!({ "name": "Rust" }));
    mock.seed("technologies", json!({ "name": "Go" }));
    let store = common::logged_in_store();
    let service = ResourceService::<Technology>::new(common::client(&mock.config(), &store)?);

    let envelope = service.delete(&id).await?;

    assert!(envelope.success);
    let remaining = service.get_all().await?.into_data("load")?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Go");
    Ok(())
}

#[tokio::test]
async fn missing_record_is_an_http_error() -> Result<()> {
    let mock = MockApi::start().await?;
    let store = common::logged_in_store();
    let service = ResourceService::<Testimonial>::new(common::client(&mock.config(), &store)?);

    let err = service.delete("64f0000000000000000000ff").await.unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.message(), "Not found");
    Ok(())
}
