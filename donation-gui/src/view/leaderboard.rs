//! Leaderboard screen — top donors for the selected campaign.

use egui::Ui;
use egui_extras::{Column, TableBuilder};
use tokio::sync::mpsc;

use donation::format_ether;

use crate::events::UiEvent;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.horizontal(|ui| {
        ui.heading("Top donors");
        ui.add_space(10.0);
        super::campaign_selector(ui, "leaderboard_campaign", state, Some("All campaigns"), ui_tx);
    });

    ui.separator();
    ui.add_space(5.0);

    if !state.ledger_loaded {
        ui.spinner();
        return;
    }

    if state.leaderboard.is_empty() {
        ui.label(
            egui::RichText::new("Nobody has donated yet")
                .color(egui::Color32::GRAY)
                .italics(),
        );
        return;
    }

    let me = state.account;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(40.0))
        .column(Column::auto().at_least(340.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Rank", "Donor", "Total (ETH)", "Donations"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (rank, entry) in state.leaderboard.iter().enumerate() {
                body.row(22.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("{}", rank + 1));
                    });
                    row.col(|ui| {
                        let text = egui::RichText::new(entry.donor.to_string()).monospace();
                        if Some(entry.donor) == me {
                            ui.label(text.strong()).on_hover_text("You");
                        } else {
                            ui.label(text);
                        }
                    });
                    row.col(|ui| {
                        ui.label(format_ether(entry.total));
                    });
                    row.col(|ui| {
                        ui.label(entry.donations.to_string());
                    });
                });
            }
        });
}
