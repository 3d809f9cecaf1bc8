//! HTML pages.
//!
//! Every page goes through [`base`], which renders the navigation, the pending
//! flash message and the footer from [`PageData`].

use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, html};

use crate::{
    auth::PageData,
    csrf::CSRF_FORM_FIELD,
    forms::{Form, GENERIC_ERROR_KEY},
    models::Snippet,
};

/// `02 Jan 2006 at 15:04` in UTC; empty for the Unix epoch.
pub fn human_date(t: DateTime<Utc>) -> String {
    if t.timestamp() == 0 {
        return String::new();
    }
    t.format("%d %b %Y at %H:%M").to_string()
}

/// Lowercases `name` and upper-cases the first letter of each word.
pub fn capitalize(name: &str) -> String {
    name.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn base(title: &str, page: &PageData, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                nav {
                    div {
                        a href="/" { "Home" }
                        @if page.user.is_some() {
                            a href="/snippet/create" { "Create snippet" }
                        }
                    }
                    div {
                        @if let Some(user) = &page.user {
                            form action="/user/logout" method="POST" {
                                (csrf_field(page))
                                button { "Logout (" (capitalize(&user.name)) ")" }
                            }
                        } @else {
                            a href="/user/signup" { "Signup" }
                            a href="/user/login" { "Login" }
                        }
                    }
                }
                main {
                    @if let Some(flash) = &page.flash {
                        div.flash { (flash) }
                    }
                    (content)
                }
                footer {
                    "Powered by Rust in " (page.current_year)
                }
            }
        }
    }
}

fn csrf_field(page: &PageData) -> Markup {
    html! {
        input type="hidden" name=(CSRF_FORM_FIELD) value=(page.csrf_token);
    }
}

fn field_error(form: &Form, field: &str) -> Markup {
    html! {
        @if let Some(message) = form.errors.get(field) {
            label.error { (message) }
        }
    }
}

pub fn home(page: &PageData, snippets: &[Snippet]) -> Markup {
    base(
        "Home",
        page,
        html! {
            h2 { "Latest Snippets" }
            @if snippets.is_empty() {
                p { "There's nothing to see here... yet!" }
            } @else {
                table {
                    tr {
                        th { "Title" }
                        th { "Created" }
                        th { "ID" }
                    }
                    @for snippet in snippets {
                        tr {
                            td { a href={ "/snippet/" (snippet.id) } { (snippet.title) } }
                            td { (human_date(snippet.created)) }
                            td { "#" (snippet.id) }
                        }
                    }
                }
            }
        },
    )
}

pub fn show(page: &PageData, snippet: &Snippet) -> Markup {
    base(
        &format!("Snippet #{}", snippet.id),
        page,
        html! {
            div.snippet {
                div.metadata {
                    strong { (snippet.title) }
                    span { "#" (snippet.id) }
                }
                pre { code { (snippet.content) } }
                div.metadata {
                    time { "Created: " (human_date(snippet.created)) }
                    time { "Expires: " (human_date(snippet.expires)) }
                }
            }
        },
    )
}

pub fn create(page: &PageData, form: &Form) -> Markup {
    let expires = match form.get("expires") {
        "" => "365",
        other => other,
    };
    base(
        "Create a New Snippet",
        page,
        html! {
            form action="/snippet/create" method="POST" {
                (csrf_field(page))
                div {
                    label { "Title:" }
                    (field_error(form, "title"))
                    input type="text" name="title" value=(form.get("title"));
                }
                div {
                    label { "Content:" }
                    (field_error(form, "content"))
                    textarea name="content" { (form.get("content")) }
                }
                div {
                    label { "Delete in:" }
                    (field_error(form, "expires"))
                    @for (value, label) in [("365", "One Year"), ("7", "One Week"), ("1", "One Day")] {
                        input type="radio" name="expires" value=(value) checked[expires == value];
                        " " (label) " "
                    }
                }
                div {
                    input type="submit" value="Publish snippet";
                }
            }
        },
    )
}

pub fn signup(page: &PageData, form: &Form) -> Markup {
    base(
        "Signup",
        page,
        html! {
            form action="/user/signup" method="POST" novalidate {
                (csrf_field(page))
                div {
                    label { "Name:" }
                    (field_error(form, "name"))
                    input type="text" name="name" value=(form.get("name"));
                }
                div {
                    label { "Email:" }
                    (field_error(form, "email"))
                    input type="email" name="email" value=(form.get("email"));
                }
                div {
                    label { "Password:" }
                    (field_error(form, "password"))
                    input type="password" name="password";
                }
                div {
                    input type="submit" value="Signup";
                }
            }
        },
    )
}

pub fn login(page: &PageData, form: &Form) -> Markup {
    base(
        "Login",
        page,
        html! {
            form action="/user/login" method="POST" novalidate {
                (csrf_field(page))
                @if let Some(message) = form.errors.get(GENERIC_ERROR_KEY) {
                    div.error { (message) }
                }
                div {
                    label { "Email:" }
                    input type="email" name="email" value=(form.get("email"));
                }
                div {
                    label { "Password:" }
                    input type="password" name="password";
                }
                div {
                    input type="submit" value="Login";
                }
            }
        },
    )
}
