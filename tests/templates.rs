mod common;

use common::*;
use pretty_assertions::assert_eq;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use vereinonline_client_rs::{
    BlogTemplate, ConventionTemplate, Error, LayoutTemplate, MailTemplate, MemberTemplate,
    TemplateName,
};

const NEW_TEMPLATE_HREF: &str = "?action=admin_mailtemplates&cmd=neu.txt";

/// Serves the admin page of whichever template of `T` the request selects.
fn serve<T: TemplateName>(
    extra_hrefs: &'static [&'static str],
    subject: Option<&'static str>,
) -> MockBackend {
    MockBackend::with_handler(move |req| {
        let cmd = query(req, "cmd")?;
        let name = T::ALL.iter().find(|name| name.route().cmd == cmd)?;
        let body = format!("<p>{}</p>", name.as_str());
        Some(html(&template_page::<T>(
            name.route(),
            extra_hrefs,
            subject,
            &body,
        )))
    })
}

fn member_page(active: MemberTemplate, subject: &str, body: &str) -> String {
    template_page::<MemberTemplate>(active.route(), &[], Some(subject), body)
}

#[tokio::test]
async fn get_reads_the_active_template() {
    let backend = serve::<MemberTemplate>(&[], Some("Alles Gute"));
    let mut client = client_with(&backend);
    client.login("admin", "password", false).await.unwrap();

    let template = client
        .mail_templates()
        .members()
        .get(MemberTemplate::Birthday)
        .await
        .unwrap();
    assert_eq!(
        template,
        MailTemplate {
            name: "birthday".into(),
            index: Some(3),
            subject: Some("Alles Gute".into()),
            html_body: Some("<p>birthday</p>".into()),
        }
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(query(&requests[0], "action").as_deref(), Some("admin_mailtemplates"));
    assert_eq!(query(&requests[0], "cmd").as_deref(), Some("geburtstag.txt"));
    assert_eq!(query(&requests[0], "token").as_deref(), client.token());
}

#[tokio::test]
async fn layout_templates_have_no_subject() {
    let backend = serve::<LayoutTemplate>(&[], None);
    let client = client_with(&backend);

    let footer = client
        .mail_templates()
        .layout()
        .get(LayoutTemplate::Footer)
        .await
        .unwrap();
    assert_eq!(footer.subject, None);
    assert_eq!(footer.html_body.as_deref(), Some("<p>footer</p>"));
}

#[tokio::test]
async fn reset_requests_the_delete_command() {
    let backend = MockBackend::scripted(vec![html(&member_page(
        MemberTemplate::Birthday,
        "Herzlichen Glückwunsch",
        "<p>Standard</p>",
    ))]);
    let client = client_with(&backend);

    let template = client
        .mail_templates()
        .members()
        .reset_to_default(MemberTemplate::Birthday)
        .await
        .unwrap();
    assert_eq!(template.subject.as_deref(), Some("Herzlichen Glückwunsch"));
    assert_eq!(template.html_body.as_deref(), Some("<p>Standard</p>"));
    assert_eq!(
        query(&backend.requests()[0], "cmd").as_deref(),
        Some("deletegeburtstag.txt")
    );
}

#[tokio::test]
async fn reset_wraps_unreadable_pages() {
    let backend = MockBackend::scripted(vec![html("<p>Vorlage gelöscht</p>")]);
    let client = client_with(&backend);

    let err = client
        .mail_templates()
        .members()
        .reset_to_default(MemberTemplate::Birthday)
        .await
        .unwrap_err();
    match err {
        Error::Reset(cause) => assert!(matches!(*cause, Error::Scrape { .. })),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn set_submits_latin1_multipart_and_verifies() {
    let backend = MockBackend::scripted(vec![html(&member_page(
        MemberTemplate::Birthday,
        "Alles Gute",
        "<p>Grüße</p>",
    ))]);
    let client = client_with(&backend);

    let saved = client
        .mail_templates()
        .members()
        .set(
            MemberTemplate::Birthday,
            &MailTemplate::new("Alles Gute", "<p>Grüße</p>"),
        )
        .await
        .unwrap();
    assert_eq!(saved.name, "birthday");
    assert_eq!(saved.html_body.as_deref(), Some("<p>Grüße</p>"));

    let req = &backend.requests()[0];
    assert_eq!(req.method, Method::POST);
    let content_type = req.headers[CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    assert!(content_type.contains("charset=iso-8859-1"));
    assert!(body_contains(req, b"savegeburtstag.txt"));
    assert!(body_contains(req, b"name=\"werte\""));
    assert!(body_contains(req, b"<p>Gr\xFC\xDFe</p>"));
}

#[tokio::test]
async fn set_detects_unsaved_changes() {
    let backend = MockBackend::scripted(vec![html(&member_page(
        MemberTemplate::Birthday,
        "Alter Betreff",
        "<p>neu</p>",
    ))]);
    let client = client_with(&backend);

    let err = client
        .mail_templates()
        .members()
        .set(
            MemberTemplate::Birthday,
            &MailTemplate::new("Neuer Betreff", "<p>neu</p>"),
        )
        .await
        .unwrap_err();
    match err {
        Error::SaveVerification { expected, actual } => {
            assert_eq!(expected.subject.as_deref(), Some("Neuer Betreff"));
            assert_eq!(actual.subject.as_deref(), Some("Alter Betreff"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn set_with_uses_the_given_comparison() {
    let backend = MockBackend::scripted(vec![html(&member_page(
        MemberTemplate::Admission,
        "Willkommen",
        "<p>Hallo</p>   ",
    ))]);
    let client = client_with(&backend);

    let data = MailTemplate::new("Willkommen", "<p>Hallo</p>");
    let saved = client
        .mail_templates()
        .members()
        .set_with(MemberTemplate::Admission, &data, |expected, actual| {
            expected.subject == actual.subject
                && expected.html_body.as_deref().map(str::trim)
                    == actual.html_body.as_deref().map(str::trim)
        })
        .await
        .unwrap();
    assert_eq!(saved.html_body.as_deref(), Some("<p>Hallo</p>   "));
}

#[tokio::test]
async fn set_layout_ignores_the_subject() {
    let backend = MockBackend::scripted(vec![html(&template_page::<LayoutTemplate>(
        LayoutTemplate::Header.route(),
        &[],
        None,
        "<header/>",
    ))]);
    let client = client_with(&backend);

    let saved = client
        .mail_templates()
        .layout()
        .set(LayoutTemplate::Header, &MailTemplate::new("ignoriert", "<header/>"))
        .await
        .unwrap();
    assert_eq!(saved.subject, None);
}

#[tokio::test]
async fn template_names_fall_back_to_the_next_template() {
    let backend = MockBackend::scripted(vec![
        response(500, Some("text/html"), "Fehler"),
        html(&template_page::<ConventionTemplate>(
            ConventionTemplate::Protocol.route(),
            &[],
            Some(""),
            "",
        )),
    ]);
    let client = client_with(&backend);

    let names = client
        .mail_templates()
        .conventions()
        .fetch_all_template_names()
        .await
        .unwrap();
    let listed: Vec<(&str, bool)> = names
        .iter()
        .map(|e| (e.name.as_str(), e.is_active))
        .collect();
    assert_eq!(listed, vec![("agenda", false), ("protocol", true)]);

    let requests = backend.requests();
    assert_eq!(query(&requests[0], "cmd").as_deref(), Some("versammlungagenda.txt"));
    assert_eq!(
        query(&requests[1], "cmd").as_deref(),
        Some("versammlungprotokollmail.txt")
    );
}

#[tokio::test]
async fn template_names_collect_every_failure() {
    let backend = MockBackend::scripted(vec![]);
    let client = client_with(&backend);

    let err = client
        .mail_templates()
        .conventions()
        .fetch_all_template_names()
        .await
        .unwrap_err();
    match err {
        Error::TemplateNames(errors) => {
            assert_eq!(errors.len(), ConventionTemplate::ALL.len());
            assert!(errors.iter().all(|e| matches!(e, Error::Network(_))));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn template_names_skip_shared_notifications() {
    let backend = serve::<BlogTemplate>(
        &[
            "?action=admin_mailtemplates&cmd=forumnotify.txt",
            "?action=admin_mailtemplates&cmd=tasknotification.txt",
            "?action=admin_mailtemplates&cmd=datanotify.txt",
        ],
        Some(""),
    );
    let client = client_with(&backend);

    let names = client
        .mail_templates()
        .blog()
        .fetch_all_template_names()
        .await
        .unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].href, BlogTemplate::Notification.route().href());
}

#[tokio::test]
async fn get_all_fetches_every_template() {
    let backend = serve::<MemberTemplate>(&[], Some("Betreff"));
    let client = client_with(&backend);

    let all = client.mail_templates().members().get_all().await.unwrap();
    assert_eq!(all.len(), MemberTemplate::ALL.len());
    assert_eq!(
        all[&MemberTemplate::Termination].html_body.as_deref(),
        Some("<p>termination</p>")
    );
    assert_eq!(all[&MemberTemplate::Termination].index, Some(5));
    assert!(all.values().all(|t| t.subject.as_deref() == Some("Betreff")));

    // one navigation fetch plus one page per template
    assert_eq!(backend.requests().len(), 1 + MemberTemplate::ALL.len());
}

#[tokio::test]
async fn get_all_refuses_an_outdated_mapping() {
    let backend = serve::<MemberTemplate>(&[NEW_TEMPLATE_HREF], Some(""));
    let client = client_with(&backend);

    let err = client.mail_templates().members().get_all().await.unwrap_err();
    match err {
        Error::MappingOutOfDate {
            unexpected,
            missing,
        } => {
            assert_eq!(unexpected, vec![NEW_TEMPLATE_HREF.to_string()]);
            assert!(missing.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn category_handles_outlive_the_registry() {
    let backend = serve::<MemberTemplate>(&[], Some("Hallo"));
    let client = client_with(&backend);

    let members = client.mail_templates().members();
    let copy = members;
    let first = members.get(MemberTemplate::Jubilee).await.unwrap();
    let second = copy.get(MemberTemplate::Jubilee).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(members.all_template_names(), MemberTemplate::ALL);
    assert_eq!(client.mail_templates().layout().info().name, "layout");
    assert_eq!(backend.requests().len(), 2);
}
