//! Server-rendered pages. Templates are compiled into the binary and rendered
//! with minijinja; every page gets the pending flash message and the
//! signed-in user merged into its context.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::{context, Environment, Value};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::user::User;
use crate::utils::flash::take_flash;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register_customer.html", include_str!("../templates/register_customer.html")),
    ("register_professional.html", include_str!("../templates/register_professional.html")),
    ("admin/dashboard.html", include_str!("../templates/admin/dashboard.html")),
    ("admin/search.html", include_str!("../templates/admin/search.html")),
    ("admin/summary.html", include_str!("../templates/admin/summary.html")),
    ("admin/service_form.html", include_str!("../templates/admin/service_form.html")),
    ("admin/category_form.html", include_str!("../templates/admin/category_form.html")),
    ("customer/dashboard.html", include_str!("../templates/customer/dashboard.html")),
    ("customer/category.html", include_str!("../templates/customer/category.html")),
    ("customer/feedback.html", include_str!("../templates/customer/feedback.html")),
    ("customer/search.html", include_str!("../templates/customer/search.html")),
    ("customer/summary.html", include_str!("../templates/customer/summary.html")),
    ("professional/dashboard.html", include_str!("../templates/professional/dashboard.html")),
    ("professional/search.html", include_str!("../templates/professional/search.html")),
    ("professional/summary.html", include_str!("../templates/professional/summary.html")),
];

#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("day", day);
        env.add_filter("moment", moment);
        env.add_filter("status_label", status_label);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let body = self.env.get_template(name)?.render(ctx)?;
        Ok(body)
    }

    /// Renders a full page. The flash cookie is consumed, so the returned
    /// response carries the updated jar.
    pub fn page(
        &self,
        jar: CookieJar,
        name: &str,
        user: Option<&User>,
        ctx: Value,
    ) -> Result<Response> {
        let (jar, flash) = take_flash(jar);
        let body = self.render(
            name,
            context! {
                flash => flash,
                current_user => user,
                ..ctx
            },
        )?;
        Ok((jar, Html(body)).into_response())
    }
}

fn text(value: &Value) -> String {
    if value.is_none() || value.is_undefined() {
        String::new()
    } else {
        value.to_string()
    }
}

/// `2026-03-01T10:15:00Z` -> `2026-03-01`.
fn day(value: Value) -> String {
    text(&value).chars().take(10).collect()
}

/// `2026-03-01T10:15:00.123Z` -> `2026-03-01 10:15`.
fn moment(value: Value) -> String {
    text(&value)
        .chars()
        .take(16)
        .collect::<String>()
        .replacen('T', " ", 1)
}

/// `in_progress` -> `In progress`.
fn status_label(value: Value) -> String {
    let spaced = text(&value).replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Bare error page. Kept outside the template environment so it still works
/// when rendering itself is what failed.
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    Html(format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{code} {title}</title></head>\n\
         <body><main class=\"container\"><h1>{code} {title}</h1><p>{message}</p>\
         <p><a href=\"/\">Back to the start page</a></p></main></body></html>\n",
        code = status.as_u16(),
        title = title,
        message = escape_html(message),
    ))
}
