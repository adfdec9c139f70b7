//! Scraping of the mail template admin pages.
//!
//! An admin page carries a "register line" followed by a list of template
//! groups; the group containing the requested template lists its siblings
//! and marks the current one as active. The editable fields live in a
//! `subject` input and a `werte` textarea.

use crate::constants::{
    ACTIVE_CLASS, BODY_TEXTAREA_SELECTOR, REGISTER_LINE_SELECTOR, SUBJECT_INPUT_SELECTOR,
};
use crate::error::{Error, Result};
use crate::models::{MailTemplate, NavigationEntry};
use crate::templates::{FieldSet, Route};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Malformed(format!("invalid selector {css:?}: {e}")))
}

fn is_list(el: &ElementRef) -> bool {
    matches!(el.value().name(), "ul" | "ol")
}

fn list_items<'a>(list: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
}

/// Reads the template navigation for the group containing `route`.
pub fn scrape_navigation(html: &str, route: Route) -> Result<Vec<NavigationEntry>> {
    let doc = Html::parse_document(html);
    navigation_in(&doc, html, route)
}

fn navigation_in(doc: &Html, html: &str, route: Route) -> Result<Vec<NavigationEntry>> {
    let marker_sel = selector(REGISTER_LINE_SELECTOR)?;
    let list_sel = selector("ul, ol")?;
    let anchor_sel = selector("a[href]")?;

    let marker = doc
        .select(&marker_sel)
        .next()
        .ok_or_else(|| Error::scrape("register line not found", html))?;
    let list = marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(is_list)
        .ok_or_else(|| Error::scrape("no template list after the register line", html))?;

    let needle = format!("action={}&cmd={}", route.action, route.cmd);
    let matches_route = |li: ElementRef| {
        li.select(&anchor_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .is_some_and(|href| href.contains(&needle))
    };
    let sublist = list
        .select(&list_sel)
        .chain(std::iter::once(list))
        .find(|candidate| list_items(*candidate).any(matches_route))
        .ok_or_else(|| Error::scrape(format!("no template list links to {needle}"), html))?;

    let entries = list_items(sublist)
        .filter_map(|li| {
            let anchor = li.select(&anchor_sel).next()?;
            let href = anchor.value().attr("href")?.to_string();
            let name = anchor.text().collect::<String>().trim().to_string();
            let is_active = li.value().classes().any(|c| c == ACTIVE_CLASS);
            Some((name, href, is_active))
        })
        .enumerate()
        .map(|(index, (name, href, is_active))| NavigationEntry {
            name,
            href,
            is_active,
            index,
        })
        .collect();
    Ok(entries)
}

/// Reads the active template and the fields its category declares.
pub fn scrape_template(html: &str, route: Route, fields: FieldSet) -> Result<MailTemplate> {
    let doc = Html::parse_document(html);
    let navigation = navigation_in(&doc, html, route)?;

    let active: Vec<&NavigationEntry> = navigation.iter().filter(|e| e.is_active).collect();
    let [entry] = active.as_slice() else {
        return Err(Error::scrape(
            format!("expected exactly one active template, found {}", active.len()),
            html,
        ));
    };

    let subject = if fields.subject {
        let sel = selector(SUBJECT_INPUT_SELECTOR)?;
        let input = doc
            .select(&sel)
            .next()
            .ok_or_else(|| Error::scrape("no subject input found", html))?;
        Some(input.value().attr("value").unwrap_or_default().to_string())
    } else {
        None
    };

    let html_body = if fields.html_body {
        let sel = selector(BODY_TEXTAREA_SELECTOR)?;
        let textarea = doc
            .select(&sel)
            .next()
            .ok_or_else(|| Error::scrape("no body textarea found", html))?;
        Some(textarea.text().collect::<String>())
    } else {
        None
    };

    Ok(MailTemplate {
        name: entry.name.clone(),
        index: Some(entry.index),
        subject,
        html_body,
    })
}
