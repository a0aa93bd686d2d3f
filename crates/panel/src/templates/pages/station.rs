use maud::{html, Markup};

use crate::{
    db::{format_timestamp, StationId},
    pipeline::StationReport,
    render::{row_cells, station_map, temperature_chart, RenderError},
    templates::{
        fragments::{
            empty_notice, error_notice, figure_panel, observation_table, selection_form, tabs,
            unmatched_notice, SelectionForm,
        },
        layouts::{base, CurrentPage, PageConfig},
    },
};

/// Rendered views of one station report
pub struct StationSection {
    pub heading: String,
    pub window_label: String,
    pub chart_json: String,
    pub map_json: String,
    pub rows: Vec<[String; 15]>,
    pub unmatched: Vec<StationId>,
}

impl StationSection {
    pub fn build(report: &StationReport) -> Result<Self, RenderError> {
        let chart = temperature_chart(&report.rows)?;
        let map = station_map(&report.station);
        let rows = report
            .rows
            .iter()
            .map(|r| row_cells(&r.observation))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StationSection {
            heading: format!(
                "{} ({})",
                report.station.station_name, report.station.station_id
            ),
            window_label: format!(
                "{} to {}",
                format_timestamp(report.window.start())?,
                format_timestamp(report.window.end())?
            ),
            chart_json: chart.to_script_json()?,
            map_json: map.to_script_json()?,
            rows,
            unmatched: report.unmatched.clone(),
        })
    }
}

/// What goes under the form
pub enum StationOutcome {
    /// Nothing submitted yet
    Idle,
    Report(StationSection),
    /// Page-level failure
    Failed { title: String, message: String },
}

pub fn station_page(table_sets: &[String], form: &SelectionForm, outcome: &StationOutcome) -> Markup {
    let config = PageConfig {
        title: "Taiwan Weather Panel - Station",
        current_page: CurrentPage::Station,
        table_sets,
    };

    base(&config, station_content(form, outcome))
}

pub fn station_content(form: &SelectionForm, outcome: &StationOutcome) -> Markup {
    html! {
        p class="mb-4" {
            "Pick a weather station and a date to see its readings over that day, "
            "every 10 minutes."
        }

        (selection_form(form))

        @match outcome {
            StationOutcome::Idle => {}
            StationOutcome::Failed { title, message } => {
                (error_notice(title, message))
            }
            StationOutcome::Report(section) => {
                div class="box station-report" {
                    h2 class="title is-5 mb-1" { (section.heading) }
                    p class="is-size-7 has-text-grey mb-3" { (section.window_label) }

                    (unmatched_notice(&section.unmatched))
                    @if section.rows.is_empty() {
                        (empty_notice(&section.window_label))
                    }

                    (tabs("station-tabs", &[
                        ("Temperature", figure_panel("temperature-chart", &section.chart_json)),
                        ("Location", figure_panel("station-map", &section.map_json)),
                        ("Weather Table", observation_table(&section.rows)),
                    ]))
                }
            }
        }
    }
}
