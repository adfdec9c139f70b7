//! # VereinOnline client
//! Async client for a VereinOnline instance. It covers the JSON API
//! (`?api=<Endpoint>`, with typed members and groups endpoints) and the
//! legacy admin pages, which are scraped and submitted as HTML forms,
//! starting with the mail templates.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. Diagnostics are emitted as
//! `tracing` events; install a subscriber to see them.
//!
//! ## Example
//! ```no_run
//! use vereinonline_client_rs::{Client, MemberTemplate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vereinonline_client_rs::Error> {
//!     let mut client = Client::new("https://www.vereinonline.org/IHRVEREIN/")?;
//!     client.login("admin", "secret", true).await?;
//!
//!     let templates = client.mail_templates();
//!     let birthday = templates.members().get(MemberTemplate::Birthday).await?;
//!     println!("{:?}", birthday.subject);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cancel;
pub mod client;
pub mod codec;
pub mod constants;
pub mod error;
pub mod groups;
pub mod members;
pub mod models;
pub mod multipart;
pub mod repair;
pub mod scrape;
pub mod templates;

pub use backend::{HttpBackend, HttpRequest, HttpResponse, ReqwestBackend};
pub use cancel::{CancellationReceiver, CancellationToken};
pub use client::{
    connect, generate_token, Client, ClientBuilder, HtmlBody, HtmlRequest, JsonBody, JsonRequest,
};
pub use codec::Charset;
pub use error::{Error, Result};
pub use groups::GroupsApi;
pub use members::{MemberQuery, MembersApi};
pub use models::{Config, Group, MailTemplate, Member, MemberDetails, NavigationEntry};
pub use multipart::{FilePart, FormValue, MultipartBody, MultipartForm};
pub use repair::repair;
pub use templates::{
    AccountingTemplate, BlogTemplate, CategoryInfo, ConventionTemplate, DoubleOptInTemplate,
    EventTemplate, FieldSet, FileTemplate, ForumTemplate, LayoutTemplate, MailTemplateCategory,
    MailTemplates, MemberTemplate, ReservationTemplate, Route, ShopTemplate, TaskTemplate,
    TemplateName, VoteTemplate,
};
