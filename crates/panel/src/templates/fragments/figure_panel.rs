use maud::{html, Markup, PreEscaped};

/// Mount point for a Plotly figure. `figure_json` must come from
/// `Figure::to_script_json`, which keeps it from closing the script element.
pub fn figure_panel(id: &str, figure_json: &str) -> Markup {
    html! {
        div class="plotly-figure" id=(id) data-figure=(format!("{}-data", id)) {}
        script type="application/json" id=(format!("{}-data", id)) {
            (PreEscaped(figure_json))
        }
    }
}

/// Tabbed panels; the first one starts active
pub fn tabs(id: &str, panels: &[(&str, Markup)]) -> Markup {
    html! {
        div class="tabbed" id=(id) {
            div class="tabs is-boxed" {
                ul {
                    @for (i, (label, _)) in panels.iter().enumerate() {
                        li class=[(i == 0).then_some("is-active")] data-tab=(i) {
                            a { (label) }
                        }
                    }
                }
            }
            @for (i, (_, content)) in panels.iter().enumerate() {
                div class=(if i == 0 { "tab-panel" } else { "tab-panel is-hidden" }) data-panel=(i) {
                    (content)
                }
            }
        }
    }
}
