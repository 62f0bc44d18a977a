//! Donate screen — fiat amount form and contract address QR.

use egui::Ui;
use tokio::sync::mpsc;

use donation::{AddressExt, EntryMode};

use crate::events::UiEvent;
use crate::qr::{self, QrMatrix};
use crate::state::AppState;

/// Render the donate screen.
pub fn show(
    ui: &mut Ui,
    state: &mut AppState,
    contract_qr: Option<&QrMatrix>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    ui.heading("Donate");
    ui.separator();
    ui.add_space(10.0);

    let fiat = state.fiat_currency.to_uppercase();

    ui.horizontal(|ui| {
        // Form
        ui.vertical(|ui| {
            ui.set_max_width(420.0);
            ui.group(|ui| {
                ui.set_min_width(ui.available_width());

                match state.rate {
                    Some(ref rate) => ui.label(
                        egui::RichText::new(format!("1 ETH = {:.2} {}", rate.price, fiat))
                            .color(egui::Color32::GRAY),
                    ),
                    None => ui.label(
                        egui::RichText::new("Exchange rate unavailable — enter ETH directly")
                            .color(egui::Color32::YELLOW),
                    ),
                };
                ui.add_space(8.0);

                let mut mode = state.entry_mode;
                ui.horizontal(|ui| {
                    ui.label("Enter amount in");
                    ui.radio_value(&mut mode, EntryMode::Fiat, fiat.as_str());
                    ui.radio_value(&mut mode, EntryMode::Native, "ETH");
                });
                if mode != state.entry_mode {
                    state.set_entry_mode(mode);
                }

                let unit = match state.entry_mode {
                    EntryMode::Fiat => fiat.as_str(),
                    EntryMode::Native => "ETH",
                };
                ui.label(format!("Amount ({})", unit));
                let response = ui.add(
                    egui::TextEdit::singleline(&mut state.fiat_input)
                        .hint_text("0")
                        .desired_width(200.0),
                );
                if response.changed() {
                    state.recompute_converted();
                }

                if state.entry_mode == EntryMode::Fiat {
                    let converted = if state.converted_amount.is_empty() {
                        "—".to_string()
                    } else {
                        format!("≈ {} ETH", state.converted_amount)
                    };
                    ui.label(egui::RichText::new(converted).size(18.0).strong());
                }

                ui.add_space(10.0);

                if !state.campaigns.is_empty() {
                    ui.label("Campaign");
                    super::campaign_selector(ui, "donate_campaign", state, Some("General fund"), ui_tx);
                    if let Some(campaign) = state.selected() {
                        ui.add(
                            egui::ProgressBar::new(campaign.progress())
                                .text(super::progress_text(campaign))
                                .desired_width(300.0),
                        );
                    }
                    ui.add_space(8.0);

                    // Only campaign donations carry a message on-chain
                    if state.selected_campaign.is_some() {
                        ui.label("Message (optional)");
                        ui.add(
                            egui::TextEdit::multiline(&mut state.message_input)
                                .desired_rows(2)
                                .desired_width(ui.available_width()),
                        );
                    }
                }

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(
                            state.can_submit(),
                            egui::Button::new(egui::RichText::new("Donate").size(16.0))
                                .min_size(egui::vec2(200.0, 36.0)),
                        )
                        .clicked()
                    {
                        if let Some(request) = state.begin_submit() {
                            let _ = ui_tx.send(UiEvent::Submit(request));
                        }
                    }

                    if state.loading {
                        ui.spinner();
                        ui.label("Confirm in your wallet…");
                    }
                });
            });
        });

        ui.add_space(20.0);

        // Contract address
        if let Some(address) = state.contract_address {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("Contract").strong());
                if let Some(matrix) = contract_qr {
                    qr::paint(ui, matrix, 180.0);
                }
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(address.short()).monospace());
                    if ui.button("📋 Copy").clicked() {
                        ui.ctx().copy_text(address.to_string());
                    }
                });
            });
        }
    });

    super::status_messages(ui, state);
}
