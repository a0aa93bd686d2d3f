use maud::{html, Markup};

use crate::{
    db::{format_timestamp, StationId},
    pipeline::{RecentReport, EXCLUDED_STATIONS},
    render::{county_choropleth, row_cells, Aggregation, CountyGeometry, RenderError},
    templates::{
        fragments::{
            empty_notice, error_notice, figure_panel, maintenance_notice, observation_table, tabs,
            unmatched_notice,
        },
        layouts::{base, CurrentPage, PageConfig},
    },
};

/// Rendered views of one recent-window report
pub struct RecentSection {
    pub window_label: Option<String>,
    pub map_json: String,
    pub rows: Vec<[String; 15]>,
    pub unmatched: Vec<StationId>,
}

impl RecentSection {
    pub fn build(
        report: &RecentReport,
        geometry: &CountyGeometry,
        aggregation: Aggregation,
    ) -> Result<Self, RenderError> {
        let map = county_choropleth(&report.rows, geometry, aggregation)?;
        let rows = report
            .rows
            .iter()
            .map(|r| row_cells(&r.observation))
            .collect::<Result<Vec<_>, _>>()?;
        let window_label = match &report.window {
            Some(window) => Some(format!(
                "{} to {}",
                format_timestamp(window.start())?,
                format_timestamp(window.end())?
            )),
            None => None,
        };

        Ok(RecentSection {
            window_label,
            map_json: map.to_script_json()?,
            rows,
            unmatched: report.unmatched.clone(),
        })
    }
}

pub enum RecentOutcome {
    /// Waiting for the user to press Generate
    Idle,
    Report(RecentSection),
    Failed { title: String, message: String },
}

pub fn recent_page(
    table_sets: &[String],
    table_set: &str,
    aggregation: Aggregation,
    outcome: &RecentOutcome,
) -> Markup {
    let title = format!("Taiwan Weather Panel - Recent 3 Hours ({})", table_set);
    let config = PageConfig {
        title: &title,
        current_page: CurrentPage::Recent(table_set),
        table_sets,
    };

    base(&config, recent_content(table_set, aggregation, outcome))
}

pub fn recent_content(table_set: &str, aggregation: Aggregation, outcome: &RecentOutcome) -> Markup {
    html! {
        p class="mb-4" {
            "Temperature across Taiwan's counties and cities over the latest three hours, "
            "in 10 minute steps."
        }

        (maintenance_notice(&EXCLUDED_STATIONS))

        div class="box" {
            form method="get" action="/recent" class="is-flex is-align-items-flex-end" {
                input type="hidden" name="tables" value=(table_set);
                input type="hidden" name="generate" value="true";
                div class="field mb-0 mr-3" {
                    label class="label" for="agg-select" { "County value" }
                    div class="control" {
                        div class="select" {
                            select id="agg-select" name="agg" {
                                option value="mean" selected[aggregation == Aggregation::Mean] {
                                    "Mean of stations"
                                }
                                option value="latest" selected[aggregation == Aggregation::Latest] {
                                    "Latest reading"
                                }
                            }
                        }
                    }
                }
                button type="submit" class="button is-primary" { "Generate!" }
            }
        }

        @match outcome {
            RecentOutcome::Idle => {}
            RecentOutcome::Failed { title, message } => {
                (error_notice(title, message))
            }
            RecentOutcome::Report(section) => {
                div class="box recent-report" {
                    @if let Some(label) = &section.window_label {
                        p class="is-size-7 has-text-grey mb-3" { (label) }
                    }

                    (unmatched_notice(&section.unmatched))
                    @if section.rows.is_empty() {
                        (empty_notice(section.window_label.as_deref().unwrap_or("the latest three hours")))
                    }

                    (tabs("recent-tabs", &[
                        ("County Map", figure_panel("county-map", &section.map_json)),
                        ("Observations", observation_table(&section.rows)),
                    ]))
                }
            }
        }
    }
}
