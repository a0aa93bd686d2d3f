use maud::{html, Markup};

use crate::render::COLUMNS;

/// Observation rows in canonical column order; cells come from `render::row_cells`
pub fn observation_table(rows: &[[String; 15]]) -> Markup {
    html! {
        div class="table-container observation-table" {
            table class="table is-fullwidth is-striped is-hoverable is-narrow" {
                thead {
                    tr {
                        @for column in COLUMNS {
                            th { (column) }
                        }
                    }
                }
                tbody {
                    @for row in rows {
                        tr {
                            @for cell in row {
                                td { (cell) }
                            }
                        }
                    }
                }
            }
        }
    }
}
