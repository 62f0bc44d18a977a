//! Campaigns screen — campaign list, plus the owner's admin panel.

use egui::Ui;
use tokio::sync::mpsc;

use donation::format_ether;

use crate::events::UiEvent;
use crate::state::AppState;

/// Render the campaigns screen.
pub fn show(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.heading("Campaigns");
    ui.separator();
    ui.add_space(10.0);

    if state.campaigns.is_empty() {
        ui.label(
            egui::RichText::new("This contract has no campaigns.")
                .color(egui::Color32::GRAY)
                .italics(),
        );
    }

    let mut donate_to = None;
    egui::ScrollArea::vertical()
        .max_height(320.0)
        .show(ui, |ui| {
            for campaign in &state.campaigns {
                ui.group(|ui| {
                    ui.set_min_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&campaign.name).strong());
                        if !campaign.active {
                            ui.label(egui::RichText::new("closed").color(egui::Color32::GRAY));
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add_enabled(campaign.active, egui::Button::new("Donate"))
                                .clicked()
                            {
                                donate_to = Some(campaign.id);
                            }
                        });
                    });
                    if !campaign.description.is_empty() {
                        ui.label(&campaign.description);
                    }
                    ui.add(
                        egui::ProgressBar::new(campaign.progress())
                            .text(super::progress_text(campaign)),
                    );
                });
            }
        });

    if let Some(id) = donate_to {
        if state.select_campaign(Some(id)) {
            let _ = ui_tx.send(UiEvent::SelectCampaign(Some(id)));
        }
        state.screen = crate::events::Screen::Donate;
    }

    if state.is_owner() {
        ui.add_space(15.0);
        admin_panel(ui, state, ui_tx);
    }

    super::status_messages(ui, state);
}

fn admin_panel(ui: &mut Ui, state: &mut AppState, ui_tx: &mpsc::UnboundedSender<UiEvent>) {
    ui.label(egui::RichText::new("Owner tools").size(16.0).strong());
    ui.add_space(5.0);

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("New campaign").strong());
        ui.add(egui::TextEdit::singleline(&mut state.new_campaign_name).hint_text("Name"));
        ui.add(
            egui::TextEdit::multiline(&mut state.new_campaign_description)
                .hint_text("Description")
                .desired_rows(2),
        );
        ui.add(
            egui::TextEdit::singleline(&mut state.new_campaign_target)
                .hint_text("Target (ETH)")
                .desired_width(160.0),
        );
        if ui
            .add_enabled(!state.loading, egui::Button::new("Create campaign"))
            .clicked()
        {
            if let Some(request) = state.begin_create_campaign() {
                let _ = ui_tx.send(UiEvent::Submit(request));
            }
        }
    });

    ui.add_space(10.0);

    if state.campaigns.is_empty() {
        return;
    }

    ui.group(|ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("Withdraw").strong());
        ui.horizontal(|ui| {
            let current = state
                .withdraw_campaign
                .and_then(|id| state.campaigns.iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Select a campaign".to_string());
            let mut choice = state.withdraw_campaign;
            egui::ComboBox::from_id_salt("withdraw_campaign")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for campaign in &state.campaigns {
                        ui.selectable_value(
                            &mut choice,
                            Some(campaign.id),
                            format!(
                                "{} ({} ETH)",
                                campaign.name,
                                format_ether(campaign.total_donated)
                            ),
                        );
                    }
                });
            state.withdraw_campaign = choice;

            ui.add(
                egui::TextEdit::singleline(&mut state.withdraw_amount)
                    .hint_text("Amount (ETH)")
                    .desired_width(140.0),
            );

            if ui
                .add_enabled(!state.loading, egui::Button::new("Withdraw"))
                .clicked()
            {
                if let Some(request) = state.begin_withdraw() {
                    let _ = ui_tx.send(UiEvent::Submit(request));
                }
            }
        });

        if state.loading {
            ui.spinner();
        }
    });
}
