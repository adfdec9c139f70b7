//! Mail template categories over the admin HTML pages.
//!
//! A category is a closed set of logical template names ([`TemplateName`]),
//! each routed to an `{action, cmd}` pair. [`MailTemplateCategory`] is the
//! single generic handle that reads, resets and writes them.

mod categories;

pub use categories::{
    AccountingTemplate, BlogTemplate, ConventionTemplate, DoubleOptInTemplate, EventTemplate,
    FileTemplate, ForumTemplate, LayoutTemplate, MemberTemplate, ReservationTemplate,
    ShopTemplate, TaskTemplate, VoteTemplate,
};

use crate::client::{Client, HtmlBody, HtmlRequest};
use crate::constants::{FORM_CHARSET, MAIL_TEMPLATES_ACTION};
use crate::error::{Error, Result};
use crate::models::{MailTemplate, NavigationEntry};
use crate::multipart::MultipartForm;
use crate::scrape::{scrape_navigation, scrape_template};
use futures_util::future::try_join_all;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// The two opaque parameters that select a template on the admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route {
    pub action: &'static str,
    pub cmd: &'static str,
}

impl Route {
    pub const fn mail(cmd: &'static str) -> Self {
        Self {
            action: MAIL_TEMPLATES_ACTION,
            cmd,
        }
    }

    /// The relative link the navigation uses for this route.
    pub fn href(&self) -> String {
        route_key(self.action, self.cmd)
    }
}

/// Which editable fields a category's templates have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    pub subject: bool,
    pub html_body: bool,
}

impl FieldSet {
    pub const ALL: FieldSet = FieldSet {
        subject: true,
        html_body: true,
    };
    pub const BODY_ONLY: FieldSet = FieldSet {
        subject: false,
        html_body: true,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub fields: FieldSet,
    /// Navigation links that belong to other categories sharing the page.
    pub ignore_hrefs: &'static [&'static str],
}

/// A closed set of template names belonging to one category.
pub trait TemplateName: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    const CATEGORY: CategoryInfo;
    /// All names, in declaration order.
    const ALL: &'static [Self];

    fn route(self) -> Route;
    fn as_str(self) -> &'static str;
}

fn route_key(action: &str, cmd: &str) -> String {
    format!("?action={action}&cmd={cmd}")
}

/// Normalizes a navigation href to its `?action=..&cmd=..` form so links
/// carrying extra parameters still compare equal.
fn href_key(href: &str) -> String {
    let query = href.split_once('?').map_or(href, |(_, q)| q);
    let query = query.split('#').next().unwrap_or_default();
    let mut action = None;
    let mut cmd = None;
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        match k.as_ref() {
            "action" => action = Some(v.into_owned()),
            "cmd" => cmd = Some(v.into_owned()),
            _ => {}
        }
    }
    match (action, cmd) {
        (Some(action), Some(cmd)) => route_key(&action, &cmd),
        _ => href.to_string(),
    }
}

fn is_ignored(info: &CategoryInfo, entry: &NavigationEntry) -> bool {
    let key = href_key(&entry.href);
    info.ignore_hrefs.iter().any(|ignored| href_key(ignored) == key)
}

/// Checks the declared routes of `T` against a live navigation list.
///
/// Every live entry must be declared and every declared template must be
/// listed; the error names both differences.
pub fn validate_mapping<T: TemplateName>(live: &[NavigationEntry]) -> Result<()> {
    let info = T::CATEGORY;
    let live: Vec<(String, &NavigationEntry)> = live
        .iter()
        .filter(|entry| !is_ignored(&info, entry))
        .map(|entry| (href_key(&entry.href), entry))
        .collect();

    let unexpected: Vec<String> = live
        .iter()
        .filter(|(key, _)| !T::ALL.iter().any(|name| name.route().href() == *key))
        .map(|(_, entry)| entry.href.clone())
        .collect();
    let missing: Vec<String> = T::ALL
        .iter()
        .filter(|name| !live.iter().any(|(key, _)| *key == name.route().href()))
        .map(|name| format!("{} ({})", name.as_str(), name.route().cmd))
        .collect();

    if unexpected.is_empty() && missing.is_empty() {
        return Ok(());
    }
    warn!(
        category = info.name,
        ?unexpected,
        ?missing,
        "template mapping does not match the server"
    );
    Err(Error::MappingOutOfDate {
        unexpected,
        missing,
    })
}

/// Handle on one mail template category. It only borrows the client, so
/// handles are free to create and copy.
pub struct MailTemplateCategory<'c, T> {
    client: &'c Client,
    _names: PhantomData<T>,
}

impl<T> Clone for MailTemplateCategory<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MailTemplateCategory<'_, T> {}

impl<'c, T: TemplateName> MailTemplateCategory<'c, T> {
    pub fn new(client: &'c Client) -> Self {
        Self {
            client,
            _names: PhantomData,
        }
    }

    pub fn info(&self) -> CategoryInfo {
        T::CATEGORY
    }

    /// The statically declared template names.
    pub fn all_template_names(&self) -> &'static [T] {
        T::ALL
    }

    pub async fn get(&self, name: T) -> Result<MailTemplate> {
        self.get_route(name.route()).await
    }

    async fn get_route(&self, route: Route) -> Result<MailTemplate> {
        let html = self
            .client
            .fetch_html("", page_request(route.action, route.cmd))
            .await?;
        scrape_template(&html, route, T::CATEGORY.fields)
    }

    /// Restores the server's default content and returns it.
    pub async fn reset_to_default(&self, name: T) -> Result<MailTemplate> {
        let route = name.route();
        let delete_cmd = format!("delete{}", route.cmd);
        let html = self
            .client
            .fetch_html("", page_request(route.action, &delete_cmd))
            .await?;
        scrape_template(&html, route, T::CATEGORY.fields).map_err(|e| Error::Reset(Box::new(e)))
    }

    /// Saves `data` and verifies the page shows exactly the submitted
    /// subject and body afterwards.
    pub async fn set(&self, name: T, data: &MailTemplate) -> Result<MailTemplate> {
        self.set_with(name, data, |expected, actual| {
            expected.subject == actual.subject && expected.html_body == actual.html_body
        })
        .await
    }

    /// Like [`set`](Self::set) with a custom comparison of the submitted
    /// template (first argument) and the one read back (second).
    pub async fn set_with<F>(&self, name: T, data: &MailTemplate, eq: F) -> Result<MailTemplate>
    where
        F: Fn(&MailTemplate, &MailTemplate) -> bool,
    {
        let route = name.route();
        let fields = T::CATEGORY.fields;
        let subject = data.subject.clone().unwrap_or_default();
        let html_body = data.html_body.clone().unwrap_or_default();

        let form = MultipartForm::new()
            .text("cmd", format!("save{}", route.cmd))
            .text("action", route.action)
            .text("dialog", "0")
            .text("sprache", "")
            .text("view", "")
            .text("subject", subject.clone())
            .text("werte", html_body.clone());
        let request = HtmlRequest::post(HtmlBody::Multipart(form)).charset(FORM_CHARSET);
        let html = self.client.fetch_html("", request).await?;
        let actual = scrape_template(&html, route, fields)?;

        let expected = MailTemplate {
            name: actual.name.clone(),
            index: actual.index,
            subject: fields.subject.then_some(subject),
            html_body: fields.html_body.then_some(html_body),
        };
        if eq(&expected, &actual) {
            debug!(category = T::CATEGORY.name, template = name.as_str(), "template saved");
            Ok(actual)
        } else {
            Err(Error::SaveVerification {
                expected: Box::new(expected),
                actual: Box::new(actual),
            })
        }
    }

    /// Reads the live navigation list of this category.
    ///
    /// Templates are tried in declaration order until one page yields a
    /// navigation list; entries on the ignore-list are dropped.
    pub async fn fetch_all_template_names(&self) -> Result<Vec<NavigationEntry>> {
        let info = T::CATEGORY;
        let mut errors = Vec::new();
        for name in T::ALL {
            let route = name.route();
            let attempt = match self
                .client
                .fetch_html("", page_request(route.action, route.cmd))
                .await
            {
                Ok(html) => scrape_navigation(&html, route),
                Err(err) => Err(err),
            };
            match attempt {
                Ok(entries) => {
                    return Ok(entries
                        .into_iter()
                        .filter(|entry| !is_ignored(&info, entry))
                        .collect())
                }
                Err(err) => {
                    debug!(
                        category = info.name,
                        template = name.as_str(),
                        error = %err,
                        "navigation attempt failed"
                    );
                    errors.push(err);
                }
            }
        }
        Err(Error::TemplateNames(errors))
    }

    /// Validates the declared mapping against the server, then fetches every
    /// template concurrently. Fails on the first error.
    pub async fn get_all(&self) -> Result<BTreeMap<T, MailTemplate>> {
        let live = self.fetch_all_template_names().await?;
        validate_mapping::<T>(&live)?;

        let mut routes: Vec<Route> = Vec::new();
        for name in T::ALL {
            if !routes.contains(&name.route()) {
                routes.push(name.route());
            }
        }
        let fetched = try_join_all(routes.iter().map(|route| self.get_route(*route))).await?;
        let by_route: HashMap<Route, MailTemplate> = routes.into_iter().zip(fetched).collect();

        Ok(T::ALL
            .iter()
            .filter_map(|name| by_route.get(&name.route()).map(|t| (*name, t.clone())))
            .collect())
    }
}

fn page_request(action: &str, cmd: &str) -> HtmlRequest {
    HtmlRequest::get().param("action", action).param("cmd", cmd)
}

macro_rules! mail_template_registry {
    ($($(#[$meta:meta])* $field:ident: $ty:ty,)+) => {
        /// All mail template categories of one client.
        #[derive(Clone, Copy)]
        pub struct MailTemplates<'c> {
            client: &'c Client,
        }

        impl<'c> MailTemplates<'c> {
            pub fn new(client: &'c Client) -> Self {
                Self { client }
            }

            $(
                $(#[$meta])*
                pub fn $field(&self) -> MailTemplateCategory<'c, $ty> {
                    MailTemplateCategory::new(self.client)
                }
            )+
        }
    };
}

mail_template_registry! {
    members: MemberTemplate,
    events: EventTemplate,
    votes: VoteTemplate,
    conventions: ConventionTemplate,
    shop: ShopTemplate,
    accounting: AccountingTemplate,
    reservations: ReservationTemplate,
    forum: ForumTemplate,
    tasks: TaskTemplate,
    files: FileTemplate,
    blog: BlogTemplate,
    /// Consent mails of the double opt-in process.
    double_opt_in: DoubleOptInTemplate,
    layout: LayoutTemplate,
}
