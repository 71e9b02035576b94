use crate::matrix::{Annotations, Matrix};
use crate::table::RawTable;
use egui_extras::{Column, TableBuilder};

pub fn display_matrix(matrix: &Matrix, annotations: &Annotations, ui: &mut egui::Ui) {
    let nr_cols = matrix.col_labels().len();
    let nr_rows = matrix.row_labels().len();

    TableBuilder::new(ui)
        .column(Column::auto())
        .columns(Column::auto().clip(true), nr_cols)
        .striped(true)
        .resizable(true)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.label("Entity");
            });
            for head in matrix.col_labels() {
                header.col(|ui| {
                    ui.strong(head);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, nr_rows, |mut row| {
                let row_index = row.index();
                row.col(|ui| {
                    ui.label(&matrix.row_labels()[row_index]);
                });
                for col_index in 0..nr_cols {
                    row.col(|ui| {
                        ui.label(annotations.get(row_index, col_index));
                    });
                }
            });
        });
}

pub fn display_table(table: &RawTable, ui: &mut egui::Ui) {
    let nr_cols = table.width();
    let nr_rows = table.height();

    TableBuilder::new(ui)
        .column(Column::auto())
        .columns(Column::auto().clip(true), nr_cols)
        .striped(true)
        .resizable(true)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.label("Row");
            });
            for head in table.column_names() {
                header.col(|ui| {
                    ui.strong(head);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, nr_rows, |mut row| {
                let row_index = row.index();
                row.col(|ui| {
                    ui.label(format!("{}", row_index));
                });
                for column in table.columns() {
                    row.col(|ui| {
                        if let Some(cell) = column.cells.get(row_index) {
                            ui.label(cell.to_string());
                        }
                    });
                }
            });
        });
}
