//! Server-side HTML for the dashboard page.
//!
//! # Invariants
//! - Every descriptor becomes one `<section>`, in descriptor order.
//! - A descriptor without data renders an "unavailable" notice, never an
//!   empty page.

use flexpane_core::model::feed::{Email, Event};
use flexpane_core::{PaneData, PaneDescriptor, Todo};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const PAGE_TITLE: &str = "Flexpane";
const TIME_FORMAT: &str = "%a %H:%M";

pub fn render_dashboard(descriptors: &[PaneDescriptor]) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                style { (PreEscaped(styles())) }
            }
            body {
                header class="fp-topbar" { h1 { (PAGE_TITLE) } }
                main class="fp-grid" {
                    @for descriptor in descriptors {
                        (pane_section(descriptor))
                    }
                    @if descriptors.is_empty() {
                        p class="fp-muted" { "No panes are enabled." }
                    }
                }
            }
        }
    };
    markup.into_string()
}

fn pane_section(descriptor: &PaneDescriptor) -> Markup {
    html! {
        section class="fp-pane"
            id={ "pane-" (descriptor.id) }
            data-template=(descriptor.template)
            style=(grid_style(descriptor)) {
            h2 { (descriptor.title) }
            @match &descriptor.data {
                Some(PaneData::Calendar(calendar)) => {
                    (event_list(&calendar.events))
                }
                Some(PaneData::Todos(todos)) => {
                    (todo_list(&todos.todos))
                }
                Some(PaneData::Email(email)) => {
                    (email_list(&email.emails))
                }
                None => {
                    p class="fp-muted fp-error" { (descriptor.title) " is unavailable right now." }
                }
            }
        }
    }
}

fn grid_style(descriptor: &PaneDescriptor) -> String {
    let mut style = String::new();
    if !descriptor.grid_area.row.is_empty() {
        style.push_str(&format!("grid-row: {};", descriptor.grid_area.row));
    }
    if !descriptor.grid_area.column.is_empty() {
        style.push_str(&format!("grid-column: {};", descriptor.grid_area.column));
    }
    style
}

fn event_list(events: &[Event]) -> Markup {
    html! {
        @if events.is_empty() {
            p class="fp-muted" { "No upcoming events." }
        } @else {
            ul class="fp-list" {
                @for event in events {
                    li {
                        strong { (event.title) }
                        span class="fp-muted" {
                            " " (event.start.format(TIME_FORMAT).to_string()) " - " (event.end.format("%H:%M").to_string())
                        }
                        @if let Some(location) = &event.location {
                            span class="fp-muted" { " @ " (location) }
                        }
                    }
                }
            }
        }
    }
}

fn todo_list(todos: &[Todo]) -> Markup {
    html! {
        @if todos.is_empty() {
            p class="fp-muted" { "Nothing to do." }
        } @else {
            ol class="fp-list" {
                @for todo in todos {
                    li class={(if todo.done { "fp-done" } else { "fp-open" })} data-id=(todo.id.to_string()) {
                        (if todo.done { "[x] " } else { "[ ] " }) (todo.message)
                    }
                }
            }
        }
    }
}

fn email_list(emails: &[Email]) -> Markup {
    html! {
        @if emails.is_empty() {
            p class="fp-muted" { "Inbox is empty." }
        } @else {
            ul class="fp-list" {
                @for email in emails {
                    li class={(if email.read { "fp-read" } else { "fp-unread" })} {
                        strong { (email.subject) }
                        span class="fp-muted" { " " (email.from) " · " (email.time.format(TIME_FORMAT).to_string()) }
                        p { (email.preview) }
                    }
                }
            }
        }
    }
}

fn styles() -> &'static str {
    "body{margin:0;font-family:system-ui,sans-serif;background:#f4f5f7;color:#1d2330}\
     .fp-topbar{padding:12px 24px;background:#1d2330;color:#fff}\
     .fp-topbar h1{margin:0;font-size:20px}\
     .fp-grid{display:grid;grid-template-columns:repeat(2,minmax(0,1fr));gap:16px;padding:24px}\
     .fp-pane{background:#fff;border-radius:8px;padding:16px;box-shadow:0 1px 2px rgba(0,0,0,.08)}\
     .fp-pane h2{margin-top:0;font-size:16px}\
     .fp-list{margin:0;padding-left:20px}\
     .fp-list li{margin:6px 0}\
     .fp-muted{color:#6b7280}\
     .fp-error{color:#b42318}\
     .fp-done{text-decoration:line-through;color:#6b7280}\
     .fp-unread strong{color:#1849a9}"
}

#[cfg(test)]
mod tests {
    use super::render_dashboard;
    use flexpane_core::model::pane::TodoData;
    use flexpane_core::{GridArea, PaneData, PaneDescriptor, Todo};

    fn descriptor(id: &str, data: Option<PaneData>) -> PaneDescriptor {
        PaneDescriptor {
            id: id.to_string(),
            title: id.to_uppercase(),
            grid_area: GridArea {
                row: "1".to_string(),
                column: "2".to_string(),
            },
            data,
            template: format!("panes/{id}.html"),
        }
    }

    #[test]
    fn renders_sections_in_order_with_grid_placement() {
        let mut todo = Todo::new("<b>escape me</b>");
        todo.done = true;
        let html = render_dashboard(&[
            descriptor("todos", Some(PaneData::Todos(TodoData::new(vec![todo])))),
            descriptor("email", None),
        ]);

        let todos_at = html.find("pane-todos").expect("todos section");
        let email_at = html.find("pane-email").expect("email section");
        assert!(todos_at < email_at);
        assert!(html.contains("grid-row: 1;grid-column: 2;"));
        assert!(html.contains("&lt;b&gt;escape me&lt;/b&gt;"));
        assert!(html.contains("EMAIL is unavailable right now."));
    }

    #[test]
    fn empty_page_says_so() {
        assert!(render_dashboard(&[]).contains("No panes are enabled."));
    }
}
