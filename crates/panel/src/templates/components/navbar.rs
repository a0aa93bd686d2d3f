use maud::{html, Markup};

use crate::templates::layouts::CurrentPage;

/// Page navigation: the station view plus one recent view per table set
pub fn navbar(current_page: CurrentPage, table_sets: &[String]) -> Markup {
    html! {
        nav class="navbar mb-4" role="navigation" aria-label="main navigation" {
            div class="navbar-brand" {
                a role="button" class="navbar-burger" aria-label="menu"
                  aria-expanded="false" data-target="navbarMenu" {
                    span aria-hidden="true" {}
                    span aria-hidden="true" {}
                    span aria-hidden="true" {}
                }
            }

            div id="navbarMenu" class="navbar-menu" {
                div class="navbar-start" {
                    a href="/" class=(nav_item_class(current_page == CurrentPage::Station)) {
                        span class="icon-text" {
                            span class="icon" { (station_icon()) }
                            span { "Station" }
                        }
                    }

                    @for name in table_sets {
                        a href=(format!("/recent?tables={}", name))
                          class=(nav_item_class(current_page == CurrentPage::Recent(name))) {
                            span class="icon-text" {
                                span class="icon" { (map_icon()) }
                                span { "Recent 3h (" (name) ")" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn nav_item_class(active: bool) -> &'static str {
    if active {
        "navbar-item is-active"
    } else {
        "navbar-item"
    }
}

fn station_icon() -> Markup {
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" {
            path d="M14 14.76V3.5a2.5 2.5 0 0 0-5 0v11.26a4.5 4.5 0 1 0 5 0z" {}
        }
    }
}

fn map_icon() -> Markup {
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" {
            polygon points="1 6 1 22 8 18 16 22 23 18 23 2 16 6 8 2 1 6" {}
            line x1="8" y1="2" x2="8" y2="18" {}
            line x1="16" y1="6" x2="16" y2="22" {}
        }
    }
}
