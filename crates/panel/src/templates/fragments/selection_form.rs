use maud::{html, Markup};
use time::Date;

use crate::db::Station;

/// A station as offered in the station dropdown
#[derive(Debug, Clone, PartialEq)]
pub struct StationOption {
    pub station_id: String,
    pub station_name: String,
    pub earliest: Date,
    pub latest: Date,
}

impl From<&Station> for StationOption {
    fn from(station: &Station) -> Self {
        StationOption {
            station_id: station.station_id.to_string(),
            station_name: station.station_name.clone(),
            earliest: station.earliest.date(),
            latest: station.latest.date(),
        }
    }
}

/// State of the station page form
#[derive(Debug, Clone, Default)]
pub struct SelectionForm {
    pub counties: Vec<String>,
    pub county: Option<String>,
    pub stations: Vec<StationOption>,
    /// Station id of the current selection
    pub station: Option<String>,
    pub date: Option<Date>,
    /// Validation message shown under the form
    pub error: Option<String>,
}

impl SelectionForm {
    fn selected_station(&self) -> Option<&StationOption> {
        let selected = self.station.as_deref()?;
        self.stations
            .iter()
            .find(|s| s.station_id == selected || s.station_name == selected)
    }
}

pub fn selection_form(form: &SelectionForm) -> Markup {
    let selected = form.selected_station().or(form.stations.first());
    let date = form.date.or(selected.map(|s| s.earliest));

    html! {
        div class="box" {
            form method="get" action="/" id="selection-form" {
                div class="columns" {
                    div class="column" {
                        div class="field" {
                            label class="label" for="county-select" { "County / City" }
                            div class="control" {
                                div class="select is-fullwidth" {
                                    select id="county-select" name="county"
                                      hx-get="/fragments/stations"
                                      hx-trigger="change"
                                      hx-target="#station-select"
                                      hx-swap="innerHTML" {
                                        option value="" selected[form.county.is_none()] { "All counties" }
                                        @for county in &form.counties {
                                            option value=(county) selected[form.county.as_ref() == Some(county)] {
                                                (county)
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="column" {
                        div class="field" {
                            label class="label" for="station-select" { "Station" }
                            div class="control" {
                                div class="select is-fullwidth" {
                                    select id="station-select" name="station" {
                                        (station_options(&form.stations, selected.map(|s| s.station_id.as_str())))
                                    }
                                }
                            }
                        }
                    }
                    div class="column" {
                        div class="field" {
                            label class="label" for="date-input" { "Date" }
                            div class="control" {
                                input id="date-input" class="input" type="date" name="date"
                                  min=[selected.map(|s| s.earliest.to_string())]
                                  max=[selected.map(|s| s.latest.to_string())]
                                  value=[date.map(|d| d.to_string())];
                            }
                        }
                    }
                }
                @if let Some(error) = &form.error {
                    p class="help is-danger mb-3 selection-error" { (error) }
                }
                button type="submit" class="button is-primary is-fullwidth" { "Submit" }
            }
        }
    }
}

/// `<option>` list for the station dropdown; each carries its date range for the date picker
pub fn station_options(stations: &[StationOption], selected: Option<&str>) -> Markup {
    html! {
        @if stations.is_empty() {
            option value="" disabled { "No stations" }
        }
        @for station in stations {
            option value=(station.station_id)
              data-earliest=(station.earliest)
              data-latest=(station.latest)
              selected[selected == Some(station.station_id.as_str())] {
                (station.station_name) " (" (station.station_id) ")"
            }
        }
    }
}
