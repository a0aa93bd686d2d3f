use maud::{html, Markup, DOCTYPE};

use crate::templates::components::navbar;

pub struct PageConfig<'a> {
    pub title: &'a str,
    pub current_page: CurrentPage<'a>,
    /// Table set names, one "Recent" entry each in the navigation
    pub table_sets: &'a [String],
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CurrentPage<'a> {
    Station,
    Recent(&'a str),
}

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub fn base(config: &PageConfig, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (config.title) }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bulma@1.0.4/css/bulma.min.css";
                link rel="stylesheet" href="/static/styles.min.css";
                script src="https://cdn.jsdelivr.net/npm/htmx.org@1.9.10/dist/htmx.min.js" {}
                script src=(PLOTLY_JS) charset="utf-8" {}
            }
            body {
                section class="section" {
                    div class="container is-fluid" {
                        nav class="level mb-4" {
                            div class="level-left" {
                                a href="/" class="has-text-current" style="text-decoration: none;" {
                                    h1 class="title level-item" { "Taiwan Weather Panel" }
                                }
                            }
                            div class="level-right" {
                                p class="level-item" {
                                    a href="/docs" class="button is-link is-light is-small" {
                                        "API Docs"
                                    }
                                }
                            }
                        }

                        (navbar(config.current_page, config.table_sets))

                        div id="main-content" {
                            (content)
                        }
                    }
                }

                script src="/static/app.min.js" {}
            }
        }
    }
}
