use itertools::Itertools;
use maud::{html, Markup};

use crate::db::StationId;

/// Page-level failure of a pipeline run
pub fn error_notice(title: &str, message: &str) -> Markup {
    html! {
        div class="notification is-danger is-light" role="alert" {
            p class="has-text-weight-semibold" { (title) }
            p { (message) }
        }
    }
}

/// A valid run that matched no observations
pub fn empty_notice(scope: &str) -> Markup {
    html! {
        div class="notification is-warning is-light empty-notice" {
            "No observations for " (scope) "."
        }
    }
}

pub fn unmatched_notice(unmatched: &[StationId]) -> Markup {
    html! {
        @if !unmatched.is_empty() {
            div class="notification is-warning is-light unmatched-notice" {
                "Stations without location data are left out: "
                strong { (unmatched.iter().join(", ")) }
            }
        }
    }
}

pub fn maintenance_notice(excluded: &[&str]) -> Markup {
    html! {
        div class="notification is-info is-light" {
            "Stations " (excluded.join(", "))
            " are under maintenance, so their data is not shown."
        }
    }
}
