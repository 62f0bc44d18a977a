//! History screen — donation table, newest first.

use egui::Ui;
use egui_extras::{Column, TableBuilder};
use tokio::sync::mpsc;

use donation::{format_ether, AddressExt};

use crate::events::UiEvent;
use crate::state::AppState;

/// Render the history screen.
pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.horizontal(|ui| {
        ui.heading("Donations");
        ui.add_space(10.0);
        super::campaign_selector(ui, "history_campaign", state, Some("All campaigns"), ui_tx);
    });

    ui.separator();
    ui.add_space(5.0);

    if !state.ledger_loaded {
        ui.spinner();
        return;
    }

    if state.donations.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(
                egui::RichText::new("No donations yet")
                    .size(16.0)
                    .color(egui::Color32::GRAY)
                    .italics(),
            );
        });
        super::status_messages(ui, state);
        return;
    }

    ui.label(format!(
        "{} donations · {} ETH total",
        state.donations.len(),
        format_ether(state.total_donated)
    ));
    ui.add_space(5.0);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(130.0))
        .column(Column::auto().at_least(110.0))
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["#", "Donor", "Amount (ETH)", "Time", "Message"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, state.donations.len(), |mut row| {
                let donation = &state.donations[row.index()];
                row.col(|ui| {
                    ui.label(donation.index.to_string());
                });
                row.col(|ui| {
                    ui.label(egui::RichText::new(donation.donor.short()).monospace())
                        .on_hover_text(donation.donor.to_string());
                });
                row.col(|ui| {
                    ui.label(format_ether(donation.amount));
                });
                row.col(|ui| {
                    ui.label(format_timestamp(donation.timestamp));
                });
                row.col(|ui| {
                    ui.label(donation.message.as_deref().unwrap_or(""));
                });
            });
        });
}

fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}
